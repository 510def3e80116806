//! Module: config
//!
//! Purpose: Every tunable of the keyer in one place.
//!
//! Architecture:
//! - Constants: defaults of the deployed device
//! - `Config`: sectioned struct handed to each component at construction
//! - Components copy the section they need; nothing reads config globally
//!
//! Safety: Safe. Plain data.

use crate::logging::LogLevel;
use crate::sample::Axis;

// Centralize all configuration constants
pub const TICK_PERIOD_MS: u32 = 100;
pub const SERIAL_BAUDRATE: u32 = 9600;
pub const I2C_FREQUENCY_HZ: u32 = 400_000;
pub const TONE_FREQUENCY_HZ: u32 = 2000;

/// Menu gesture threshold (g).
pub const MENU_THRESHOLD_G: f32 = 0.40;
/// Window for the menu selection gesture.
pub const MENU_TIMER_LIMIT_US: i64 = 5_000_000;

/// Base LED echo unit for received symbols (dot on, gap).
pub const LED_UNIT_MS: u32 = 40;

/// Gyro bias calibration sample count.
pub const GYRO_CALIBRATION_SAMPLES: u16 = 64;

/// Maximum values the non-firing axes may show for a detector to fire.
///
/// The detector's own axis entry is ignored. Use `f32::INFINITY` to leave an
/// axis unconstrained.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SettleLimits {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl SettleLimits {
    pub const NONE: Self = Self {
        x: f32::INFINITY,
        y: f32::INFINITY,
        z: f32::INFINITY,
    };

    #[inline]
    pub fn limit(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

/// One axis detector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorConfig {
    pub axis: Axis,
    /// Fires above, re-arms below.
    pub threshold: f32,
    pub settle: SettleLimits,
}

/// Transmit-mode gesture classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureConfig {
    /// Forward tilt → dot. Checked first.
    pub dot: DetectorConfig,
    /// Face-up push → dash.
    pub dash: DetectorConfig,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            dot: DetectorConfig {
                axis: Axis::X,
                threshold: 0.4,
                settle: SettleLimits {
                    x: f32::INFINITY,
                    y: 0.4,
                    z: 1.1,
                },
            },
            dash: DetectorConfig {
                axis: Axis::Z,
                threshold: 1.3,
                settle: SettleLimits {
                    x: 0.4,
                    y: 0.4,
                    z: f32::INFINITY,
                },
            },
        }
    }
}

/// Menu navigation and mode switching.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MenuConfig {
    /// Axis that arms the menu from idle.
    pub confirm_axis: Axis,
    /// Axis that picks a mode while the menu is armed: positive → transmit,
    /// negative → light sensing.
    pub select_axis: Axis,
    pub threshold: f32,
    /// Selection window, measured in wall-clock time.
    pub timer_limit_us: i64,
    /// Return-to-menu: primary axis must read below `-return_threshold`...
    pub return_threshold: f32,
    /// ...the other two axes within `±return_settle`...
    pub return_settle: f32,
    /// ...and all angular rates within `±still_rate` (deg/s).
    pub still_rate: f32,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            confirm_axis: Axis::X,
            select_axis: Axis::Y,
            threshold: MENU_THRESHOLD_G,
            timer_limit_us: MENU_TIMER_LIMIT_US,
            return_threshold: 0.9,
            return_settle: 0.1,
            still_rate: 1.0,
        }
    }
}

/// Serial link framing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkConfig {
    pub baud_rate: u32,
    /// Send a trailing NUL after `\r\n` (older receivers expect 4-byte frames).
    pub append_nul: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baud_rate: SERIAL_BAUDRATE,
            append_nul: false,
        }
    }
}

/// Buzzer and LED feedback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeedbackConfig {
    pub tone_hz: u32,
    pub led_unit_ms: u32,
    /// Mute all buzzer cues (LED echo stays on).
    pub silent: bool,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            tone_hz: TONE_FREQUENCY_HZ,
            led_unit_ms: LED_UNIT_MS,
            silent: false,
        }
    }
}

/// Periodic task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopConfig {
    pub tick_period_ms: u32,
    /// Most verbose level that reaches the log ring.
    pub log_level: LogLevel,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: TICK_PERIOD_MS,
            log_level: LogLevel::Info,
        }
    }
}

/// Complete keyer configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Config {
    pub gesture: GestureConfig,
    pub menu: MenuConfig,
    pub link: LinkConfig,
    pub feedback: FeedbackConfig,
    pub run: LoopConfig,
}

impl Config {
    /// Default config with a different selection window.
    pub fn with_timer_limit_ms(ms: u32) -> Self {
        let mut config = Self::default();
        config.menu.timer_limit_us = i64::from(ms) * 1000;
        config
    }

    /// Tick period in microseconds.
    #[inline]
    pub fn tick_period_us(&self) -> i64 {
        i64::from(self.run.tick_period_ms) * 1000
    }
}
