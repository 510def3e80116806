//! ESP-IDF board bring-up.
//!
//! Pin map (ESP32-S3 devkit):
//!
//! ```text
//! MPU-9250   I2C0  SDA GPIO8   SCL GPIO9
//! OPT3001    I2C1  SDA GPIO10  SCL GPIO11
//! Peer link  UART1 TX  GPIO17  RX  GPIO18
//! Buzzer     LEDC ch0 on GPIO4
//! LED        GPIO2 (active high)
//! Button     GPIO0 (active low, pull-up)
//! ```
//!
//! Each sensor gets its own controller so the two drivers never share a bus.

use std::fmt;
use std::io::Write as _;
use std::thread;
use std::time::Duration;

use esp_idf_svc::hal::delay::{FreeRtos, BLOCK};
use esp_idf_svc::hal::gpio::{
    AnyIOPin, AnyInputPin, AnyOutputPin, Input, InputPin, Output, OutputPin, PinDriver, Pull,
};
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver};
use esp_idf_svc::hal::peripherals::Peripherals as EspPeripherals;
use esp_idf_svc::hal::uart::{self, UartDriver, UartRxDriver, UartTxDriver};
use esp_idf_svc::hal::units::Hertz;

use tilt_morse_keyer::config::{Config, GYRO_CALIBRATION_SAMPLES, I2C_FREQUENCY_HZ};
use tilt_morse_keyer::hal::mpu9250::Mpu9250;
use tilt_morse_keyer::hal::opt3001::Opt3001;
use tilt_morse_keyer::hal::{Button, Buzzer, SerialTx, StatusLed};
use tilt_morse_keyer::{
    log_drain, HalError, InitError, Peripheral, Peripherals, FAULT_STATE, LOG_STREAM, SERIAL_RX,
};

pub type Imu = Mpu9250<I2cDriver<'static>>;
pub type Light = Opt3001<I2cDriver<'static>>;
pub type Board = Peripherals<Imu, Light, UartTx, LedcBuzzer, Led, PushButton>;

/// Microseconds since boot.
pub fn now_us() -> i64 {
    // SAFETY: plain read of the monotonic system timer.
    unsafe { esp_idf_svc::sys::esp_timer_get_time() }
}

/// Bring up every peripheral. Any failure is fatal to the caller.
///
/// Also starts the serial reader thread feeding [`SERIAL_RX`].
pub fn init(config: &Config) -> Result<Board, InitError> {
    let p = EspPeripherals::take()
        .map_err(|_| InitError::new(Peripheral::Board, HalError::NotReady))?;

    let i2c_config = I2cConfig::new().baudrate(Hertz(I2C_FREQUENCY_HZ));

    let motion = {
        let bus = I2cDriver::new(p.i2c0, p.pins.gpio8, p.pins.gpio9, &i2c_config)
            .map_err(|_| InitError::new(Peripheral::MotionSensor, HalError::Bus))?;
        let mut imu = Mpu9250::new(bus);
        imu.init(&mut FreeRtos)
            .map_err(|e| InitError::new(Peripheral::MotionSensor, e))?;
        imu.calibrate_gyro(&mut FreeRtos, GYRO_CALIBRATION_SAMPLES)
            .map_err(|e| InitError::new(Peripheral::MotionSensor, e))?;
        imu
    };

    let light = {
        let bus = I2cDriver::new(p.i2c1, p.pins.gpio10, p.pins.gpio11, &i2c_config)
            .map_err(|_| InitError::new(Peripheral::LightSensor, HalError::Bus))?;
        let mut sensor = Opt3001::new(bus);
        sensor.init().map_err(|e| InitError::new(Peripheral::LightSensor, e))?;
        sensor
    };

    let serial = {
        let uart_config = uart::config::Config::default().baudrate(Hertz(config.link.baud_rate));
        let driver = UartDriver::new(
            p.uart1,
            p.pins.gpio17,
            p.pins.gpio18,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &uart_config,
        )
        .map_err(|_| InitError::new(Peripheral::Serial, HalError::Bus))?;
        let (tx, rx) = driver.into_split();
        spawn_serial_reader(rx)?;
        UartTx(tx)
    };

    let buzzer = {
        let timer = LedcTimerDriver::new(
            p.ledc.timer0,
            &TimerConfig::new().frequency(Hertz(config.feedback.tone_hz)),
        )
        .map_err(|_| InitError::new(Peripheral::Buzzer, HalError::Bus))?;
        let mut channel = LedcDriver::new(p.ledc.channel0, timer, p.pins.gpio4)
            .map_err(|_| InitError::new(Peripheral::Buzzer, HalError::Bus))?;
        channel
            .set_duty(0)
            .map_err(|_| InitError::new(Peripheral::Buzzer, HalError::Bus))?;
        LedcBuzzer(channel)
    };

    let led = {
        let mut pin = PinDriver::output(p.pins.gpio2.downgrade_output())
            .map_err(|_| InitError::new(Peripheral::Led, HalError::Bus))?;
        pin.set_low()
            .map_err(|_| InitError::new(Peripheral::Led, HalError::Bus))?;
        Led(pin)
    };

    let button = {
        let mut pin = PinDriver::input(p.pins.gpio0.downgrade_input())
            .map_err(|_| InitError::new(Peripheral::Button, HalError::Bus))?;
        pin.set_pull(Pull::Up)
            .map_err(|_| InitError::new(Peripheral::Button, HalError::Bus))?;
        PushButton(pin)
    };

    Ok(Peripherals {
        motion,
        light,
        serial,
        buzzer,
        led,
        button,
    })
}

/// Blocking reader: one byte at a time into the RX ring.
fn spawn_serial_reader(mut rx: UartRxDriver<'static>) -> Result<(), InitError> {
    thread::Builder::new()
        .name("serial-rx".into())
        .stack_size(4096)
        .spawn(move || {
            let mut byte = [0u8; 1];
            loop {
                match rx.read(&mut byte, BLOCK) {
                    Ok(1) => {
                        // Full ring: counted by the channel, reported by the task
                        SERIAL_RX.try_write(byte[0]);
                    }
                    Ok(_) => {}
                    Err(_) => FreeRtos::delay_ms(10),
                }
            }
        })
        .map(|_| ())
        .map_err(|_| InitError::new(Peripheral::Serial, HalError::NotReady))
}

/// Log drain thread: ring and fault record → stdout (console UART).
pub fn spawn_log_drain() {
    let spawned = thread::Builder::new()
        .name("log-drain".into())
        .stack_size(4096)
        .spawn(|| {
            let mut out = ConsoleSink;
            loop {
                log_drain::report_dropped(&LOG_STREAM, &mut out);
                let faulted = log_drain::report_fault(&FAULT_STATE, &mut out);
                if log_drain::drain_to(&LOG_STREAM, &mut out) > 0 || faulted {
                    let _ = std::io::stdout().flush();
                }
                thread::sleep(Duration::from_millis(20));
            }
        });
    if let Err(e) = spawned {
        println!("[ERROR] log drain not started: {}", e);
    }
}

struct ConsoleSink;

impl fmt::Write for ConsoleSink {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        std::io::stdout()
            .write_all(s.as_bytes())
            .map_err(|_| fmt::Error)
    }
}

// --- Collaborator implementations ---

pub struct UartTx(UartTxDriver<'static>);

impl SerialTx for UartTx {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, HalError> {
        self.0.write(bytes).map_err(|_| HalError::Bus)
    }
}

/// Passive buzzer on LEDC. Frequency is fixed by the timer at init.
pub struct LedcBuzzer(LedcDriver<'static>);

impl Buzzer for LedcBuzzer {
    fn tone_on(&mut self, _frequency_hz: u32) {
        let half = self.0.get_max_duty() / 2;
        let _ = self.0.set_duty(half);
    }

    fn tone_off(&mut self) {
        let _ = self.0.set_duty(0);
    }
}

pub struct Led(PinDriver<'static, AnyOutputPin, Output>);

impl StatusLed for Led {
    fn set(&mut self, on: bool) {
        let _ = if on { self.0.set_high() } else { self.0.set_low() };
    }
}

pub struct PushButton(PinDriver<'static, AnyInputPin, Input>);

impl Button for PushButton {
    fn is_pressed(&mut self) -> bool {
        self.0.is_low()
    }
}
