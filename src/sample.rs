//! Module: sample
//!
//! Purpose: Sensor sample types. One `ImuSample` is one tick's worth of
//! inertial data as handed over by the motion sensor.
//!
//! Architecture:
//! - Accelerations in g, angular rates in deg/s
//! - Plain `Copy` data; the classifier never keeps references into it
//!
//! Safety: Safe. No unsafe blocks. Copy types only.

/// Acceleration axis selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// A single inertial measurement.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ImuSample {
    /// Acceleration X (g)
    pub ax: f32,
    /// Acceleration Y (g)
    pub ay: f32,
    /// Acceleration Z (g)
    pub az: f32,
    /// Angular rate X (deg/s)
    pub gx: f32,
    /// Angular rate Y (deg/s)
    pub gy: f32,
    /// Angular rate Z (deg/s)
    pub gz: f32,
}

impl ImuSample {
    /// All-zero sample (free fall, no rotation). Handy for tests.
    pub const ZERO: Self = Self {
        ax: 0.0,
        ay: 0.0,
        az: 0.0,
        gx: 0.0,
        gy: 0.0,
        gz: 0.0,
    };

    /// Sample with only accelerations set.
    pub const fn accel(ax: f32, ay: f32, az: f32) -> Self {
        Self {
            ax,
            ay,
            az,
            gx: 0.0,
            gy: 0.0,
            gz: 0.0,
        }
    }

    /// Acceleration on one axis.
    #[inline]
    pub fn accel_on(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.ax,
            Axis::Y => self.ay,
            Axis::Z => self.az,
        }
    }

    /// True if every angular rate lies strictly inside `±limit`.
    #[inline]
    pub fn is_still(&self, limit: f32) -> bool {
        within(self.gx, limit) && within(self.gy, limit) && within(self.gz, limit)
    }
}

/// `-limit < value < limit`
#[inline]
pub(crate) fn within(value: f32, limit: f32) -> bool {
    value > -limit && value < limit
}
