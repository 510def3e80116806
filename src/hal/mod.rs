//! Hardware boundary.
//!
//! The keyer core only sees these traits. Board code implements them on top
//! of ESP-IDF drivers; tests implement them with scripted fakes.

pub mod mpu9250;
pub mod opt3001;

use crate::error::HalError;
use crate::sample::ImuSample;

/// Inertial sensor. `sample` is called once per tick.
pub trait MotionSensor {
    fn sample(&mut self) -> Result<ImuSample, HalError>;
}

/// Ambient light sensor.
pub trait LightSensor {
    fn sample_lux(&mut self) -> Result<f32, HalError>;
}

/// Outbound half of the serial link. Writes are bounded and fire-and-forget.
pub trait SerialTx {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, HalError>;
}

/// Tone generator.
pub trait Buzzer {
    fn tone_on(&mut self, frequency_hz: u32);
    fn tone_off(&mut self);
}

/// Status LED.
pub trait StatusLed {
    fn set(&mut self, on: bool);
}

/// Push button, sampled by level. Edge detection happens in the loop.
pub trait Button {
    fn is_pressed(&mut self) -> bool;
}

/// Turns button levels into press edges.
#[derive(Clone, Copy, Debug, Default)]
pub struct ButtonEdge {
    was_pressed: bool,
}

impl ButtonEdge {
    pub const fn new() -> Self {
        Self { was_pressed: false }
    }

    /// True on the first sample that reads pressed.
    pub fn update(&mut self, pressed: bool) -> bool {
        let edge = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        edge
    }
}
