//! OPT3001 ambient light sensor driver.
//!
//! 16-bit registers, MSB first. Continuous conversion, automatic full-scale,
//! 800 ms conversion time.

use embedded_hal::i2c::I2c;

use super::LightSensor;
use crate::error::HalError;

/// I2C address with ADDR tied to GND.
pub const OPT3001_ADDR: u8 = 0x44;

/// Texas Instruments manufacturer ID ("TI").
pub const MANUFACTURER_ID: u16 = 0x5449;

/// Automatic range, 800 ms, continuous conversions, latched window.
pub const CONFIG_CONTINUOUS: u16 = 0xCC10;

/// Conversion-ready flag in the configuration register.
const CONFIG_CRF: u16 = 1 << 7;

mod regs {
    pub const RESULT: u8 = 0x00;
    pub const CONFIG: u8 = 0x01;
    pub const MANUFACTURER_ID: u8 = 0x7E;
}

/// Convert a raw result register to lux: `0.01 * 2^E * M`.
pub fn raw_to_lux(raw: u16) -> f32 {
    let exponent = u32::from(raw >> 12);
    let mantissa = f32::from(raw & 0x0FFF);
    0.01 * (1u32 << exponent) as f32 * mantissa
}

pub struct Opt3001<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Opt3001<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, OPT3001_ADDR)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Verify the manufacturer ID and start continuous conversions.
    pub fn init(&mut self) -> Result<(), HalError> {
        if self.read_reg(regs::MANUFACTURER_ID)? != MANUFACTURER_ID {
            return Err(HalError::WrongDevice);
        }
        self.write_reg(regs::CONFIG, CONFIG_CONTINUOUS)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_reg(&mut self, reg: u8) -> Result<u16, HalError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|_| HalError::Bus)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn write_reg(&mut self, reg: u8, value: u16) -> Result<(), HalError> {
        let [hi, lo] = value.to_be_bytes();
        self.i2c
            .write(self.address, &[reg, hi, lo])
            .map_err(|_| HalError::Bus)
    }
}

impl<I2C: I2c> LightSensor for Opt3001<I2C> {
    /// Latest conversion. `NotReady` until the first one completes.
    fn sample_lux(&mut self) -> Result<f32, HalError> {
        if self.read_reg(regs::CONFIG)? & CONFIG_CRF == 0 {
            return Err(HalError::NotReady);
        }
        Ok(raw_to_lux(self.read_reg(regs::RESULT)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    /// 16-bit register file.
    struct FakeBus {
        regs: [u16; 128],
    }

    impl FakeBus {
        fn new() -> Self {
            let mut regs = [0u16; 128];
            regs[regs::MANUFACTURER_ID as usize] = MANUFACTURER_ID;
            Self { regs }
        }
    }

    impl ErrorType for FakeBus {
        type Error = ErrorKind;
    }

    impl I2c for FakeBus {
        fn transaction(
            &mut self,
            _address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            let mut pointer = 0usize;
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        pointer = bytes[0] as usize;
                        if let [reg, hi, lo] = bytes[..] {
                            self.regs[reg as usize] = u16::from_be_bytes([hi, lo]);
                        }
                    }
                    Operation::Read(buf) => {
                        buf.copy_from_slice(&self.regs[pointer].to_be_bytes());
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_raw_to_lux() {
        assert_eq!(raw_to_lux(0x0000), 0.0);
        // E=0, M=100 -> 1.00 lux
        assert!((raw_to_lux(0x0064) - 1.0).abs() < 1e-4);
        // E=3, M=0x800 (2048) -> 0.01 * 8 * 2048 = 163.84
        assert!((raw_to_lux(0x3800) - 163.84).abs() < 1e-2);
    }

    #[test]
    fn test_init_writes_config() {
        let mut sensor = Opt3001::new(FakeBus::new());
        assert_eq!(sensor.init(), Ok(()));
        assert_eq!(sensor.release().regs[regs::CONFIG as usize], CONFIG_CONTINUOUS);
    }

    #[test]
    fn test_init_rejects_wrong_device() {
        let mut bus = FakeBus::new();
        bus.regs[regs::MANUFACTURER_ID as usize] = 0x1234;
        let mut sensor = Opt3001::new(bus);
        assert_eq!(sensor.init(), Err(HalError::WrongDevice));
    }

    #[test]
    fn test_sample_waits_for_conversion() {
        let mut sensor = Opt3001::new(FakeBus::new());
        sensor.init().unwrap();
        assert_eq!(sensor.sample_lux(), Err(HalError::NotReady));

        let mut bus = sensor.release();
        bus.regs[regs::CONFIG as usize] |= CONFIG_CRF;
        bus.regs[regs::RESULT as usize] = 0x0064;
        let mut sensor = Opt3001::new(bus);
        let lux = sensor.sample_lux().unwrap();
        assert!((lux - 1.0).abs() < 1e-4);
    }
}
