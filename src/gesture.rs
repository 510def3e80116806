//! Gesture classifier: continuous IMU samples in, discrete symbols out.
//!
//! Pure logic, no hardware dependencies. Fully testable on host.
//!
//! # Latching
//!
//! Each detector owns a latch. A detector fires once when its axis rises
//! above threshold and stays silent until the axis falls back under it:
//!
//! ```text
//! ax  ──┐      ┌──────────┐        ┌───
//!       │      │          │        │
//!  thr ─┼──────┼──────────┼────────┼───
//!       └──────┘          └────────┘
//! Dot          ▲ fire      ▲ re-arm ▲ fire
//! ```
//!
//! Detectors are mutually exclusive: none fires while another is latched.
//! They are checked in a fixed order (dot, then dash), so when both trip on
//! the same tick the dot wins.

use crate::config::{DetectorConfig, GestureConfig};
use crate::morse::Symbol;
use crate::sample::{Axis, ImuSample};

/// One axis with threshold, settle check and latch.
#[derive(Clone, Copy, Debug)]
pub struct AxisDetector {
    config: DetectorConfig,
    symbol: Symbol,
    latched: bool,
}

impl AxisDetector {
    pub fn new(config: DetectorConfig, symbol: Symbol) -> Self {
        Self {
            config,
            symbol,
            latched: false,
        }
    }

    #[inline]
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    #[inline]
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// True if the axis is over threshold and every other axis is settled.
    fn triggered(&self, sample: &ImuSample) -> bool {
        if sample.accel_on(self.config.axis) <= self.config.threshold {
            return false;
        }
        Axis::ALL
            .iter()
            .filter(|&&axis| axis != self.config.axis)
            .all(|&axis| sample.accel_on(axis) < self.config.settle.limit(axis))
    }

    /// Clear the latch once the axis is back under threshold.
    fn release(&mut self, sample: &ImuSample) {
        if self.latched && sample.accel_on(self.config.axis) < self.config.threshold {
            self.latched = false;
        }
    }
}

/// Transmit-mode classifier.
#[derive(Clone, Debug)]
pub struct GestureClassifier {
    dot: AxisDetector,
    dash: AxisDetector,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            dot: AxisDetector::new(config.dot, Symbol::Dot),
            dash: AxisDetector::new(config.dash, Symbol::Dash),
        }
    }

    /// Classify one sample.
    ///
    /// Returns at most one symbol per tick: firing one detector latches it,
    /// which blocks the other for the rest of the tick.
    pub fn classify(&mut self, sample: &ImuSample) -> Option<Symbol> {
        let mut fired = None;

        if !self.dot.latched && !self.dash.latched && self.dot.triggered(sample) {
            self.dot.latched = true;
            fired = Some(Symbol::Dot);
        }

        if !self.dash.latched && !self.dot.latched && self.dash.triggered(sample) {
            self.dash.latched = true;
            fired = Some(Symbol::Dash);
        }

        self.dot.release(sample);
        self.dash.release(sample);

        fired
    }

    /// True while any gesture is held.
    #[inline]
    pub fn is_engaged(&self) -> bool {
        self.dot.latched || self.dash.latched
    }

    /// Re-arm both detectors (on mode entry).
    pub fn reset(&mut self) {
        self.dot.latched = false;
        self.dash.latched = false;
    }

    pub fn dot(&self) -> &AxisDetector {
        &self.dot
    }

    pub fn dash(&self) -> &AxisDetector {
        &self.dash
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

/// Bare latch on one axis, without settle checks.
///
/// Used by the menu to make the confirm gesture edge-triggered.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeLatch {
    latched: bool,
}

impl EdgeLatch {
    pub const fn new() -> Self {
        Self { latched: false }
    }

    /// Returns true on the tick `value` first exceeds `threshold`.
    pub fn rising(&mut self, value: f32, threshold: f32) -> bool {
        if value > threshold {
            let fire = !self.latched;
            self.latched = true;
            fire
        } else {
            self.latched = false;
            false
        }
    }

    #[inline]
    pub fn is_latched(&self) -> bool {
        self.latched
    }
}
