//! Mode state machine: menu arbitration around the gesture classifier.
//!
//! Pure logic, no hardware dependencies. Time comes in as a timestamp.
//!
//! # States
//!
//! ```text
//!            confirm (+X)                 select (+Y)
//!   Idle ───────────────▶ MenuConfirming ─────────────▶ Transmit
//!    ▲                      │   │    ▲                     │
//!    │   window expired     │   │    └── return (−X held) ─┘
//!    └──────────────────────┘   │
//!    ▲                          │ select (−Y)
//!    │       button             ▼
//!    └──────────────────── LightSense
//! ```
//!
//! The menu window is measured by accumulating wall-clock deltas between
//! ticks, so a late or early tick does not stretch or shrink it.

use crate::config::{Config, MenuConfig};
use crate::feedback::Cue;
use crate::gesture::{EdgeLatch, GestureClassifier};
use crate::morse::Symbol;
use crate::sample::{within, Axis, ImuSample};

/// Top-level operating mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Waiting for the confirm gesture.
    Idle,
    /// Menu armed, waiting for a selection within the window.
    MenuConfirming,
    /// Gestures become Morse symbols.
    Transmit,
    /// Ambient light is sampled and reported every tick.
    LightSense,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::MenuConfirming => "menu",
            Mode::Transmit => "transmit",
            Mode::LightSense => "light",
        }
    }

    /// Which sensor the loop should sample in this mode.
    #[inline]
    pub fn samples_light(self) -> bool {
        self == Mode::LightSense
    }
}

/// Event handed to the output side of the loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OutboundEvent {
    Symbol(Symbol),
    WordSpace,
    CharacterReady(char),
}

/// Sensor input for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickInput {
    Motion(ImuSample),
    Light(f32),
}

/// Everything one tick produced.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Step {
    pub event: Option<OutboundEvent>,
    pub cue: Option<Cue>,
    /// `(from, to)` if the mode changed.
    pub transition: Option<(Mode, Mode)>,
    /// Light reading published in `LightSense`.
    pub lux: Option<f32>,
}

/// Gesture state: mode, menu timer and latches.
pub struct ModeStateMachine {
    config: MenuConfig,
    mode: Mode,
    classifier: GestureClassifier,
    confirm_latch: EdgeLatch,
    /// Elapsed time in the current menu window.
    timer_us: i64,
    last_tick_us: i64,
    last_lux: Option<f32>,
}

impl ModeStateMachine {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.menu,
            mode: Mode::Idle,
            classifier: GestureClassifier::new(config.gesture),
            confirm_latch: EdgeLatch::new(),
            timer_us: 0,
            last_tick_us: 0,
            last_lux: None,
        }
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Elapsed time in the menu window (0 outside `MenuConfirming`).
    #[inline]
    pub fn timer_us(&self) -> i64 {
        self.timer_us
    }

    /// Most recent published light reading.
    #[inline]
    pub fn last_lux(&self) -> Option<f32> {
        self.last_lux
    }

    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    /// Run one tick.
    pub fn tick(&mut self, now_us: i64, input: TickInput) -> Step {
        match (self.mode, input) {
            (Mode::LightSense, TickInput::Light(lux)) => {
                self.last_lux = Some(lux);
                Step {
                    lux: Some(lux),
                    ..Step::default()
                }
            }
            (Mode::LightSense, TickInput::Motion(_)) => Step::default(),
            (_, TickInput::Light(_)) => Step::default(),
            (Mode::Idle, TickInput::Motion(s)) => self.tick_idle(now_us, &s),
            (Mode::MenuConfirming, TickInput::Motion(s)) => self.tick_menu(now_us, &s),
            (Mode::Transmit, TickInput::Motion(s)) => self.tick_transmit(now_us, &s),
        }
    }

    /// Button pressed (edge).
    pub fn button_pressed(&mut self, now_us: i64) -> Step {
        match self.mode {
            Mode::Transmit => Step {
                event: Some(OutboundEvent::WordSpace),
                ..Step::default()
            },
            Mode::LightSense => Step {
                transition: Some(self.enter(Mode::Idle, now_us)),
                cue: Some(Cue::Enter),
                ..Step::default()
            },
            Mode::Idle | Mode::MenuConfirming => Step::default(),
        }
    }

    // --- Private methods ---

    fn tick_idle(&mut self, now_us: i64, sample: &ImuSample) -> Step {
        let confirm = sample.accel_on(self.config.confirm_axis);
        if self.confirm_latch.rising(confirm, self.config.threshold) {
            return Step {
                transition: Some(self.enter(Mode::MenuConfirming, now_us)),
                cue: Some(Cue::MenuArmed),
                ..Step::default()
            };
        }
        Step::default()
    }

    fn tick_menu(&mut self, now_us: i64, sample: &ImuSample) -> Step {
        // Keep the confirm latch tracking so a held tilt is not re-read as a
        // fresh confirm after a timeout.
        self.confirm_latch
            .rising(sample.accel_on(self.config.confirm_axis), self.config.threshold);

        self.timer_us += (now_us - self.last_tick_us).max(0);
        self.last_tick_us = now_us;

        let select = sample.accel_on(self.config.select_axis);
        let in_window = self.timer_us <= self.config.timer_limit_us;

        if in_window && select > self.config.threshold {
            return Step {
                transition: Some(self.enter(Mode::Transmit, now_us)),
                cue: Some(Cue::Enter),
                ..Step::default()
            };
        }
        if in_window && select < -self.config.threshold {
            return Step {
                transition: Some(self.enter(Mode::LightSense, now_us)),
                cue: Some(Cue::Enter),
                ..Step::default()
            };
        }
        if !in_window {
            return Step {
                transition: Some(self.enter(Mode::Idle, now_us)),
                cue: Some(Cue::MenuTimeout),
                ..Step::default()
            };
        }
        Step::default()
    }

    fn tick_transmit(&mut self, now_us: i64, sample: &ImuSample) -> Step {
        if self.is_return_gesture(sample) {
            return Step {
                transition: Some(self.enter(Mode::MenuConfirming, now_us)),
                cue: Some(Cue::Enter),
                ..Step::default()
            };
        }

        match self.classifier.classify(sample) {
            Some(symbol) => Step {
                event: Some(OutboundEvent::Symbol(symbol)),
                cue: Some(match symbol {
                    Symbol::Dot => Cue::Dot,
                    Symbol::Dash => Cue::Dash,
                }),
                ..Step::default()
            },
            None => Step::default(),
        }
    }

    /// Primary axis hard negative, other axes level, no rotation.
    fn is_return_gesture(&self, sample: &ImuSample) -> bool {
        let primary = self.config.confirm_axis;
        sample.accel_on(primary) < -self.config.return_threshold
            && Axis::ALL
                .iter()
                .filter(|&&axis| axis != primary)
                .all(|&axis| within(sample.accel_on(axis), self.config.return_settle))
            && sample.is_still(self.config.still_rate)
    }

    fn enter(&mut self, to: Mode, now_us: i64) -> (Mode, Mode) {
        let from = self.mode;
        self.mode = to;
        self.timer_us = 0;
        self.last_tick_us = now_us;
        if to == Mode::Transmit {
            self.classifier.reset();
        }
        (from, to)
    }
}
