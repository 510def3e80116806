//! Transcription task: one tick of the keyer.
//!
//! Module: transcriber
//! Purpose: Wire sensors, the mode machine, the serial link and feedback
//!          outputs together. Called periodically by the firmware loop.
//!
//! # Tick order
//!
//! ```text
//! button edge ─┐
//! IMU / light ─┴─▶ ModeStateMachine ─▶ cues ─────────────▶ FeedbackScheduler
//!                        │                                       ▲
//!                        └─▶ symbols ─▶ serial TX (c \r \n)      │
//!                                 └──▶ outbound decoder ─▶ sent text
//! SERIAL_RX ─▶ inbound decoder ─▶ received text ─▶ LED echo ─────┘
//! ```
//!
//! Nothing here blocks. Runtime I/O errors are logged, recorded in the
//! fault state, and the tick carries on.

use heapless::String;

use crate::channel::ByteChannel;
use crate::config::Config;
use crate::error::HalError;
use crate::fault::{FaultCode, FaultState};
use crate::feedback::FeedbackScheduler;
use crate::hal::{Button, ButtonEdge, Buzzer, LightSensor, MotionSensor, SerialTx, StatusLed};
use crate::logging::LogStream;
use crate::mode::{Mode, ModeStateMachine, OutboundEvent, Step, TickInput};
use crate::morse::{
    DecodeOutcome, MorseDecoder, StreamSymbol, Symbol, DASH_BYTE, DOT_BYTE, TERMINATOR_BYTE,
};
use crate::{rt_debug, rt_info, rt_warn};

/// Capacity of the sent/received text lines. A full line is logged and
/// started over.
pub const TEXT_LINE_LEN: usize = 64;

/// Hardware the transcriber drives.
pub struct Peripherals<M, L, S, B, D, K> {
    pub motion: M,
    pub light: L,
    pub serial: S,
    pub buzzer: B,
    pub led: D,
    pub button: K,
}

/// Owns all task-local keyer state.
pub struct Transcriber<'a, M, L, S, B, D, K> {
    config: Config,
    hw: Peripherals<M, L, S, B, D, K>,
    machine: ModeStateMachine,
    feedback: FeedbackScheduler,
    button: ButtonEdge,
    /// Composes what we send, so the operator sees characters.
    tx_decoder: MorseDecoder,
    rx_decoder: MorseDecoder,
    sent: String<TEXT_LINE_LEN>,
    received: String<TEXT_LINE_LEN>,
    rx: &'a ByteChannel,
    log: &'a LogStream,
    fault: &'a FaultState,
}

impl<'a, M, L, S, B, D, K> Transcriber<'a, M, L, S, B, D, K>
where
    M: MotionSensor,
    L: LightSensor,
    S: SerialTx,
    B: Buzzer,
    D: StatusLed,
    K: Button,
{
    pub fn new(
        config: Config,
        hw: Peripherals<M, L, S, B, D, K>,
        rx: &'a ByteChannel,
        log: &'a LogStream,
        fault: &'a FaultState,
    ) -> Self {
        log.set_max_level(config.run.log_level);
        Self {
            config,
            hw,
            machine: ModeStateMachine::new(&config),
            feedback: FeedbackScheduler::new(config.feedback),
            button: ButtonEdge::new(),
            tx_decoder: MorseDecoder::new(),
            rx_decoder: MorseDecoder::new(),
            sent: String::new(),
            received: String::new(),
            rx,
            log,
            fault,
        }
    }

    /// Run one tick at `now_us`.
    ///
    /// Returns the mode machine's output for this tick (the sensor step; a
    /// button step is handled but not returned).
    pub fn tick(&mut self, now_us: i64) -> Step {
        // 1. Button
        if self.button.update(self.hw.button.is_pressed()) {
            self.feedback.flash();
            let step = self.machine.button_pressed(now_us);
            self.apply(now_us, &step);
        }

        // 2. Sensors → mode machine
        let step = match self.sample(now_us) {
            Some(input) => self.machine.tick(now_us, input),
            None => Step::default(),
        };
        self.apply(now_us, &step);

        // 3. Inbound bytes
        self.drain_rx(now_us);

        // 4. Outputs
        let changes = self.feedback.tick(now_us);
        match changes.buzzer {
            Some(true) => self.hw.buzzer.tone_on(self.feedback.tone_hz()),
            Some(false) => self.hw.buzzer.tone_off(),
            None => {}
        }
        if let Some(on) = changes.led {
            self.hw.led.set(on);
        }

        step
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.machine.mode()
    }

    pub fn machine(&self) -> &ModeStateMachine {
        &self.machine
    }

    pub fn feedback(&self) -> &FeedbackScheduler {
        &self.feedback
    }

    /// Characters composed from our own gestures since the line was last
    /// flushed.
    pub fn sent_text(&self) -> &str {
        self.sent.as_str()
    }

    /// Characters decoded from the peer since the line was last flushed.
    pub fn received_text(&self) -> &str {
        self.received.as_str()
    }

    pub fn peripherals(&self) -> &Peripherals<M, L, S, B, D, K> {
        &self.hw
    }

    pub fn peripherals_mut(&mut self) -> &mut Peripherals<M, L, S, B, D, K> {
        &mut self.hw
    }

    // --- Private methods ---

    fn sample(&mut self, now_us: i64) -> Option<TickInput> {
        if self.machine.mode().samples_light() {
            match self.hw.light.sample_lux() {
                Ok(lux) => Some(TickInput::Light(lux)),
                Err(HalError::NotReady) => None,
                Err(e) => {
                    rt_warn!(self.log, now_us, "light read: {}", e);
                    self.fault.set(FaultCode::LightRead, 0);
                    None
                }
            }
        } else {
            match self.hw.motion.sample() {
                Ok(sample) => Some(TickInput::Motion(sample)),
                Err(e) => {
                    rt_warn!(self.log, now_us, "imu read: {}", e);
                    self.fault.set(FaultCode::SensorRead, 0);
                    None
                }
            }
        }
    }

    fn apply(&mut self, now_us: i64, step: &Step) {
        if let Some((from, to)) = step.transition {
            rt_info!(self.log, now_us, "mode {} -> {}", from.as_str(), to.as_str());
            self.feedback.set_led_steady(to == Mode::MenuConfirming);
            if from == Mode::Transmit {
                self.tx_decoder.reset();
                self.flush_sent(now_us);
            }
        }
        if let Some(cue) = step.cue {
            self.feedback.play(cue);
        }
        if let Some(lux) = step.lux {
            rt_info!(self.log, now_us, "light {:.1} lux", lux);
        }
        let mut event = step.event;
        while let Some(current) = event.take() {
            event = match current {
                OutboundEvent::Symbol(symbol) => {
                    self.send_symbol(now_us, symbol);
                    None
                }
                OutboundEvent::WordSpace => self.send_space(now_us),
                OutboundEvent::CharacterReady(c) => {
                    self.character_sent(now_us, c);
                    None
                }
            };
        }
    }

    fn send_symbol(&mut self, now_us: i64, symbol: Symbol) {
        rt_debug!(self.log, now_us, "tx {}", symbol.as_byte() as char);
        self.send_frame(now_us, symbol.as_byte());
        self.tx_decoder.feed(StreamSymbol::from(symbol));
    }

    /// Returns the character the space completed, if any.
    fn send_space(&mut self, now_us: i64) -> Option<OutboundEvent> {
        self.send_frame(now_us, TERMINATOR_BYTE);
        match self.tx_decoder.feed(StreamSymbol::Terminator) {
            DecodeOutcome::CharacterComplete(c) => Some(OutboundEvent::CharacterReady(c)),
            DecodeOutcome::WordBoundary => {
                self.append_sent(now_us, ' ');
                None
            }
            _ => None,
        }
    }

    fn character_sent(&mut self, now_us: i64, c: char) {
        rt_info!(self.log, now_us, "sent '{}'", c);
        self.append_sent(now_us, c);
    }

    /// One frame: symbol byte, CR, LF, and a NUL if configured.
    fn send_frame(&mut self, now_us: i64, byte: u8) {
        let frame = [byte, b'\r', b'\n', 0];
        let len = if self.config.link.append_nul { 4 } else { 3 };

        let result = match self.hw.serial.write(&frame[..len]) {
            Ok(n) if n == len => Ok(()),
            Ok(_) => Err(HalError::ShortWrite),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            rt_warn!(self.log, now_us, "serial write: {}", e);
            self.fault.set(FaultCode::SerialWrite, u32::from(byte));
        }
    }

    fn drain_rx(&mut self, now_us: i64) {
        while let Some(byte) = self.rx.try_read() {
            match byte {
                DOT_BYTE => self.feedback.echo_symbol(Symbol::Dot),
                DASH_BYTE => self.feedback.echo_symbol(Symbol::Dash),
                _ => {}
            }

            match self.rx_decoder.feed_byte(byte) {
                DecodeOutcome::Pending => {}
                DecodeOutcome::CharacterComplete(c) => {
                    rt_info!(self.log, now_us, "rx '{}'", c);
                    self.feedback.echo_gap();
                    self.append_received(now_us, c);
                }
                DecodeOutcome::WordBoundary => self.append_received(now_us, ' '),
                DecodeOutcome::Noise(b) => {
                    rt_debug!(self.log, now_us, "rx noise 0x{:02x}", b);
                }
            }
        }

        let dropped = self.rx.take_dropped();
        if dropped > 0 {
            rt_warn!(self.log, now_us, "rx overflow: {} bytes dropped", dropped);
            self.fault.set(FaultCode::RxOverflow, dropped);
        }
    }

    /// Append to the sent line, flushing it first if full.
    fn append_sent(&mut self, now_us: i64, c: char) {
        if self.sent.push(c).is_err() {
            self.flush_sent(now_us);
            let _ = self.sent.push(c);
        }
    }

    fn append_received(&mut self, now_us: i64, c: char) {
        if self.received.push(c).is_err() {
            self.flush_received(now_us);
            let _ = self.received.push(c);
        }
    }

    fn flush_sent(&mut self, now_us: i64) {
        if !self.sent.is_empty() {
            rt_info!(self.log, now_us, "sent: {}", self.sent.as_str());
            self.sent.clear();
        }
    }

    fn flush_received(&mut self, now_us: i64) {
        if !self.received.is_empty() {
            rt_info!(self.log, now_us, "received: {}", self.received.as_str());
            self.received.clear();
        }
    }
}
