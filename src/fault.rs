//! Degradation record for TiltMorseKeyer.
//!
//! Nothing at runtime stops the keyer: an unreadable sensor skips a tick, a
//! failed serial write loses one symbol, a full RX ring loses a byte. Each of
//! those is recorded here so it can be reported and inspected, while the loop
//! keeps going.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// What degraded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    /// No fault (normal operation).
    None = 0,

    /// RX ring full, incoming bytes dropped. Data: bytes dropped.
    RxOverflow = 1,

    /// Motion sensor read failed, tick skipped.
    SensorRead = 2,

    /// Light sensor read failed, no reading published.
    LightRead = 3,

    /// Serial write failed, symbol lost.
    SerialWrite = 4,
}

impl FaultCode {
    /// Convert from raw u8 value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => FaultCode::RxOverflow,
            2 => FaultCode::SensorRead,
            3 => FaultCode::LightRead,
            4 => FaultCode::SerialWrite,
            _ => FaultCode::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FaultCode::None => "none",
            FaultCode::RxOverflow => "rx overflow",
            FaultCode::SensorRead => "sensor read",
            FaultCode::LightRead => "light read",
            FaultCode::SerialWrite => "serial write",
        }
    }
}

/// Thread-safe fault record.
///
/// Written by the transcription task, read by anyone (diagnostics, LED).
pub struct FaultState {
    /// True if a fault was recorded since the last clear.
    active: AtomicBool,

    /// Most recent fault code.
    code: AtomicU8,

    /// Additional data (meaning depends on code).
    data: AtomicU32,

    /// Total fault count since boot (never cleared).
    count: AtomicU32,
}

impl FaultState {
    /// Create new fault state (no fault).
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            code: AtomicU8::new(0),
            data: AtomicU32::new(0),
            count: AtomicU32::new(0),
        }
    }

    /// Record a fault.
    #[inline]
    pub fn set(&self, code: FaultCode, data: u32) {
        self.code.store(code as u8, Ordering::Release);
        self.data.store(data, Ordering::Release);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.active.store(true, Ordering::Release);
    }

    /// Check if a fault is currently flagged.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Get fault code (only meaningful if `is_active()` is true).
    #[inline]
    pub fn code(&self) -> FaultCode {
        FaultCode::from_u8(self.code.load(Ordering::Acquire))
    }

    /// Get fault data (meaning depends on fault code).
    #[inline]
    pub fn data(&self) -> u32 {
        self.data.load(Ordering::Acquire)
    }

    /// Get total fault count since boot.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Clear the active flag. The counter is kept for diagnostics.
    #[inline]
    pub fn clear(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Get a snapshot of the current fault state.
    #[inline]
    pub fn snapshot(&self) -> FaultSnapshot {
        FaultSnapshot {
            active: self.is_active(),
            code: self.code(),
            data: self.data(),
            count: self.count(),
        }
    }
}

impl Default for FaultState {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of fault state at a point in time.
#[derive(Clone, Copy, Debug)]
pub struct FaultSnapshot {
    pub active: bool,
    pub code: FaultCode,
    pub data: u32,
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_state_basic() {
        let fault = FaultState::new();

        assert!(!fault.is_active());
        assert_eq!(fault.code(), FaultCode::None);
        assert_eq!(fault.count(), 0);

        fault.set(FaultCode::RxOverflow, 42);

        assert!(fault.is_active());
        assert_eq!(fault.code(), FaultCode::RxOverflow);
        assert_eq!(fault.data(), 42);
        assert_eq!(fault.count(), 1);

        fault.clear();

        assert!(!fault.is_active());
        assert_eq!(fault.count(), 1); // Count preserved
    }

    #[test]
    fn test_fault_count_accumulates() {
        let fault = FaultState::new();

        fault.set(FaultCode::SensorRead, 1);
        fault.clear();
        fault.set(FaultCode::SerialWrite, 2);
        fault.clear();
        fault.set(FaultCode::LightRead, 3);

        let snap = fault.snapshot();
        assert_eq!(snap.count, 3);
        assert_eq!(snap.code, FaultCode::LightRead);
    }

    #[test]
    fn test_code_roundtrip_and_unknown() {
        for code in [
            FaultCode::None,
            FaultCode::RxOverflow,
            FaultCode::SensorRead,
            FaultCode::LightRead,
            FaultCode::SerialWrite,
        ] {
            assert_eq!(FaultCode::from_u8(code as u8), code);
        }
        assert_eq!(FaultCode::from_u8(200), FaultCode::None);
    }
}
