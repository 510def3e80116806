//! MPU-9250 inertial sensor driver (accelerometer + gyroscope only).
//!
//! I2C register interface, generic over `embedded_hal::i2c::I2c`.
//! Reference: MPU-9250 Register Map rev 1.6

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::MotionSensor;
use crate::error::HalError;
use crate::sample::ImuSample;

/// I2C address with AD0 low.
pub const MPU9250_ADDR: u8 = 0x68;

/// Accepted WHO_AM_I values (MPU-9250, MPU-9255).
pub const WHO_AM_I_IDS: [u8; 2] = [0x71, 0x73];

/// ±2 g full scale.
pub const ACCEL_LSB_PER_G: f32 = 16384.0;
/// ±250 deg/s full scale.
pub const GYRO_LSB_PER_DPS: f32 = 131.0;

#[allow(dead_code)]
mod regs {
    pub const SMPLRT_DIV: u8 = 0x19;
    pub const CONFIG: u8 = 0x1A;
    pub const GYRO_CONFIG: u8 = 0x1B;
    pub const ACCEL_CONFIG: u8 = 0x1C;
    pub const ACCEL_CONFIG2: u8 = 0x1D;
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    pub const PWR_MGMT_1: u8 = 0x6B;
    pub const PWR_MGMT_2: u8 = 0x6C;
    pub const WHO_AM_I: u8 = 0x75;
}

/// Gyro zero-rate offsets (deg/s), subtracted from every sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GyroBias {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// MPU-9250 driver.
pub struct Mpu9250<I2C> {
    i2c: I2C,
    address: u8,
    bias: GyroBias,
}

impl<I2C: I2c> Mpu9250<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, MPU9250_ADDR)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            bias: GyroBias::default(),
        }
    }

    /// Wake the chip, check identity and set ranges.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), HalError> {
        use regs::*;

        // Reset, then wake with PLL clock source
        self.write_reg(PWR_MGMT_1, 0x80)?;
        delay.delay_ms(100);
        self.write_reg(PWR_MGMT_1, 0x01)?;
        delay.delay_ms(10);

        let id = self.read_reg(WHO_AM_I)?;
        if !WHO_AM_I_IDS.contains(&id) {
            return Err(HalError::WrongDevice);
        }

        // All axes on, 41 Hz DLPF, 100 Hz sample rate
        self.write_reg(PWR_MGMT_2, 0x00)?;
        self.write_reg(CONFIG, 0x03)?;
        self.write_reg(SMPLRT_DIV, 9)?;
        self.write_reg(GYRO_CONFIG, 0x00)?; // ±250 deg/s
        self.write_reg(ACCEL_CONFIG, 0x00)?; // ±2 g
        self.write_reg(ACCEL_CONFIG2, 0x03)?;
        Ok(())
    }

    /// Average `samples` readings with the device at rest and store the gyro
    /// offset. Returns the measured bias.
    pub fn calibrate_gyro(
        &mut self,
        delay: &mut impl DelayNs,
        samples: u16,
    ) -> Result<GyroBias, HalError> {
        self.bias = GyroBias::default();
        if samples == 0 {
            return Ok(self.bias);
        }

        let (mut x, mut y, mut z) = (0.0f32, 0.0f32, 0.0f32);
        for _ in 0..samples {
            let s = self.read_raw()?;
            x += s.gx;
            y += s.gy;
            z += s.gz;
            delay.delay_ms(10);
        }

        let n = f32::from(samples);
        self.bias = GyroBias {
            x: x / n,
            y: y / n,
            z: z / n,
        };
        Ok(self.bias)
    }

    #[inline]
    pub fn bias(&self) -> GyroBias {
        self.bias
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// One scaled sample without bias correction.
    fn read_raw(&mut self) -> Result<ImuSample, HalError> {
        let mut buf = [0u8; 14];
        self.i2c
            .write_read(self.address, &[regs::ACCEL_XOUT_H], &mut buf)
            .map_err(|_| HalError::Bus)?;
        Ok(decode_burst(&buf))
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), HalError> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|_| HalError::Bus)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, HalError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|_| HalError::Bus)?;
        Ok(buf[0])
    }
}

impl<I2C: I2c> MotionSensor for Mpu9250<I2C> {
    fn sample(&mut self) -> Result<ImuSample, HalError> {
        let mut s = self.read_raw()?;
        s.gx -= self.bias.x;
        s.gy -= self.bias.y;
        s.gz -= self.bias.z;
        Ok(s)
    }
}

/// Decode the 14-byte burst starting at ACCEL_XOUT_H:
/// accel XYZ, temperature (skipped), gyro XYZ, big-endian i16 each.
pub fn decode_burst(buf: &[u8; 14]) -> ImuSample {
    let word = |i: usize| f32::from(i16::from_be_bytes([buf[i], buf[i + 1]]));
    ImuSample {
        ax: word(0) / ACCEL_LSB_PER_G,
        ay: word(2) / ACCEL_LSB_PER_G,
        az: word(4) / ACCEL_LSB_PER_G,
        gx: word(8) / GYRO_LSB_PER_DPS,
        gy: word(10) / GYRO_LSB_PER_DPS,
        gz: word(12) / GYRO_LSB_PER_DPS,
    }
}
