//! Error types.
//!
//! Three tiers, matching how each failure is handled:
//! - [`InitError`]: fatal, reported once at startup then halt
//! - [`HalError`]: runtime I/O, logged and recorded, the loop keeps going
//! - [`MorseError`]: caller mistake at the encode boundary

use core::fmt;

/// Encode-boundary error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorseError {
    /// Character outside `[a-z0-9]`.
    UnsupportedCharacter(char),
}

impl fmt::Display for MorseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedCharacter(c) => write!(f, "unsupported character {:?}", c),
        }
    }
}

/// Peripheral access error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// H01: bus transaction failed (I2C NACK, arbitration, UART driver)
    Bus,
    /// H02: device answered with an unexpected identity
    WrongDevice,
    /// H03: no fresh measurement yet
    NotReady,
    /// H04: write accepted fewer bytes than requested
    ShortWrite,
}

impl HalError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Bus => "H01",
            Self::WrongDevice => "H02",
            Self::NotReady => "H03",
            Self::ShortWrite => "H04",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::Bus => "bus error",
            Self::WrongDevice => "unexpected device id",
            Self::NotReady => "no data ready",
            Self::ShortWrite => "short write",
        }
    }
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// Which collaborator failed to come up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peripheral {
    /// Chip peripheral singletons, already taken.
    Board,
    MotionSensor,
    LightSensor,
    Serial,
    Buzzer,
    Led,
    Button,
}

impl Peripheral {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Board => "board peripherals",
            Self::MotionSensor => "motion sensor",
            Self::LightSensor => "light sensor",
            Self::Serial => "serial port",
            Self::Buzzer => "buzzer",
            Self::Led => "led",
            Self::Button => "button",
        }
    }
}

/// Startup failure. The firmware cannot run without its peripherals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitError {
    pub peripheral: Peripheral,
    pub cause: HalError,
}

impl InitError {
    pub fn new(peripheral: Peripheral, cause: HalError) -> Self {
        Self { peripheral, cause }
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to initialize {}: {}", self.peripheral.as_str(), self.cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        assert_eq!(
            std::format!("{}", MorseError::UnsupportedCharacter('#')),
            "unsupported character '#'"
        );
        assert_eq!(std::format!("{}", HalError::NotReady), "H03: no data ready");
        assert_eq!(
            std::format!("{}", InitError::new(Peripheral::MotionSensor, HalError::WrongDevice)),
            "failed to initialize motion sensor: H02: unexpected device id"
        );
        assert_eq!(
            std::format!("{}", InitError::new(Peripheral::Board, HalError::NotReady)),
            "failed to initialize board peripherals: H03: no data ready"
        );
    }
}
