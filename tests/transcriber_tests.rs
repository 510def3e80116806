//! Transcriber tests: two keyers wired back to back over a fake serial link

use std::cell::RefCell;
use std::rc::Rc;

use tilt_morse_keyer::hal::{Button, Buzzer, LightSensor, MotionSensor, SerialTx, StatusLed};
use tilt_morse_keyer::log_drain::drain_to;
use tilt_morse_keyer::{
    ByteChannel, Config, FaultState, HalError, ImuSample, LogStream, Mode, Peripherals, Transcriber,
};

const TICK: i64 = 100_000;

#[derive(Clone, Default)]
struct Hand(Rc<RefCell<(ImuSample, bool)>>);

impl Hand {
    fn tilt(&self, ax: f32, ay: f32, az: f32) {
        self.0.borrow_mut().0 = ImuSample::accel(ax, ay, az);
    }

    fn press(&self, pressed: bool) {
        self.0.borrow_mut().1 = pressed;
    }
}

struct Imu(Hand);
impl MotionSensor for Imu {
    fn sample(&mut self) -> Result<ImuSample, HalError> {
        Ok(self.0 .0.borrow().0)
    }
}

struct Key(Hand);
impl Button for Key {
    fn is_pressed(&mut self) -> bool {
        self.0 .0.borrow().1
    }
}

struct Dark;
impl LightSensor for Dark {
    fn sample_lux(&mut self) -> Result<f32, HalError> {
        Err(HalError::NotReady)
    }
}

#[derive(Clone, Default)]
struct Wire(Rc<RefCell<Vec<u8>>>);
impl SerialTx for Wire {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, HalError> {
        self.0.borrow_mut().extend_from_slice(bytes);
        Ok(bytes.len())
    }
}

struct Quiet;
impl Buzzer for Quiet {
    fn tone_on(&mut self, _frequency_hz: u32) {}
    fn tone_off(&mut self) {}
}
impl StatusLed for Quiet {
    fn set(&mut self, _on: bool) {}
}

type Keyer<'a> = Transcriber<'a, Imu, Dark, Wire, Quiet, Quiet, Key>;

fn keyer<'a>(
    hand: &Hand,
    wire: &Wire,
    rx: &'a ByteChannel,
    log: &'a LogStream,
    fault: &'a FaultState,
) -> Keyer<'a> {
    Transcriber::new(
        Config::default(),
        Peripherals {
            motion: Imu(hand.clone()),
            light: Dark,
            serial: wire.clone(),
            buzzer: Quiet,
            led: Quiet,
            button: Key(hand.clone()),
        },
        rx,
        log,
        fault,
    )
}

/// Deliver everything written so far to the peer's RX ring.
fn pump(wire: &Wire, peer: &ByteChannel) {
    for b in wire.0.borrow_mut().drain(..) {
        assert!(peer.try_write(b));
    }
}

#[test]
fn test_gestures_reach_peer_as_text() {
    let (rx_a, log_a, fault_a) = (ByteChannel::new(), LogStream::new(), FaultState::new());
    let (rx_b, log_b, fault_b) = (ByteChannel::new(), LogStream::new(), FaultState::new());
    let (hand, wire) = (Hand::default(), Wire::default());

    let mut a = keyer(&hand, &wire, &rx_a, &log_a, &fault_a);
    let mut b = keyer(&Hand::default(), &Wire::default(), &rx_b, &log_b, &fault_b);

    let mut t = 0;
    let mut step = |a: &mut Keyer<'_>, b: &mut Keyer<'_>| {
        a.tick(t);
        pump(&wire, &rx_b);
        b.tick(t);
        t += TICK;
    };

    // Arm the menu, pick transmit
    hand.tilt(0.9, 0.0, 1.0);
    step(&mut a, &mut b);
    hand.tilt(0.0, 0.9, 1.0);
    step(&mut a, &mut b);
    hand.tilt(0.0, 0.0, 1.0);
    step(&mut a, &mut b);
    assert_eq!(a.mode(), Mode::Transmit);
    assert_eq!(b.mode(), Mode::Idle);

    // "n" = -.
    hand.tilt(0.0, 0.0, 1.6);
    step(&mut a, &mut b);
    hand.tilt(0.0, 0.0, 1.0);
    step(&mut a, &mut b);
    hand.tilt(1.0, 0.0, 1.0);
    step(&mut a, &mut b);
    hand.tilt(0.0, 0.0, 1.0);
    step(&mut a, &mut b);

    // Character gap, then word gap
    hand.press(true);
    step(&mut a, &mut b);
    hand.press(false);
    step(&mut a, &mut b);
    hand.press(true);
    step(&mut a, &mut b);
    hand.press(false);
    step(&mut a, &mut b);

    assert_eq!(a.sent_text(), "n ");
    assert_eq!(b.received_text(), "n ");
    assert!(!fault_a.is_active());
    assert!(!fault_b.is_active());

    let mut out = String::new();
    drain_to(&log_b, &mut out);
    assert!(out.contains("INFO: rx 'n'"));
}

#[test]
fn test_wire_format() {
    let (rx, log, fault) = (ByteChannel::new(), LogStream::new(), FaultState::new());
    let (hand, wire) = (Hand::default(), Wire::default());
    let mut a = keyer(&hand, &wire, &rx, &log, &fault);

    hand.tilt(0.9, 0.0, 1.0);
    a.tick(0);
    hand.tilt(0.0, 0.9, 1.0);
    a.tick(TICK);
    hand.tilt(1.0, 0.0, 1.0);
    a.tick(2 * TICK);
    hand.tilt(0.0, 0.0, 1.0);
    hand.press(true);
    a.tick(3 * TICK);

    assert_eq!(wire.0.borrow().as_slice(), b".\r\n \r\n");
}

#[test]
fn test_mode_changes_logged() {
    let (rx, log, fault) = (ByteChannel::new(), LogStream::new(), FaultState::new());
    let (hand, wire) = (Hand::default(), Wire::default());
    let mut a = keyer(&hand, &wire, &rx, &log, &fault);

    hand.tilt(0.9, 0.0, 1.0);
    a.tick(0);
    hand.tilt(0.0, 0.0, 1.0);
    a.tick(6_000_000);
    assert_eq!(a.mode(), Mode::Idle);

    let mut out = String::new();
    drain_to(&log, &mut out);
    assert!(out.contains("mode idle -> menu"));
    assert!(out.contains("mode menu -> idle"));
}
