//! Non-blocking buzzer and LED feedback.
//!
//! Cues are queued as timed pulses and played out by [`FeedbackScheduler::tick`]
//! from the periodic loop. Nothing here sleeps: a 500 ms confirmation beep
//! spans several ticks instead of stalling one.
//!
//! Pulse edges land on tick boundaries, so durations are quantized to the
//! tick period.

use heapless::Deque;

use crate::config::FeedbackConfig;
use crate::morse::Symbol;

/// Queued pulses per output.
pub const PULSE_QUEUE_LEN: usize = 16;

/// Audible cue requested by the mode machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// Menu armed from idle: one long beep.
    MenuArmed,
    /// Menu window expired: two long beeps.
    MenuTimeout,
    /// Mode entered (transmit, light sensing, back to menu): one short beep.
    Enter,
    /// Dot sent.
    Dot,
    /// Dash sent.
    Dash,
}

const LONG_BEEP: [Pulse; 1] = [Pulse::new(500, 0)];
const TWO_LONG_BEEPS: [Pulse; 2] = [Pulse::new(500, 150), Pulse::new(500, 0)];
const SHORT_BEEP: [Pulse; 1] = [Pulse::new(100, 0)];

impl Cue {
    /// Pulse pattern in milliseconds.
    pub fn pattern(self) -> &'static [Pulse] {
        match self {
            Cue::MenuArmed | Cue::Dash => &LONG_BEEP,
            Cue::MenuTimeout => &TWO_LONG_BEEPS,
            Cue::Enter | Cue::Dot => &SHORT_BEEP,
        }
    }
}

/// One on/off period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pulse {
    pub on_ms: u32,
    pub off_ms: u32,
}

impl Pulse {
    pub const fn new(on_ms: u32, off_ms: u32) -> Self {
        Self { on_ms, off_ms }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TrackState {
    Idle,
    On { until_us: i64, off_ms: u32 },
    Gap { until_us: i64 },
}

/// Pulse queue driving one on/off output.
pub struct PulseTrack {
    queue: Deque<Pulse, PULSE_QUEUE_LEN>,
    state: TrackState,
    dropped: u32,
}

impl PulseTrack {
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            state: TrackState::Idle,
            dropped: 0,
        }
    }

    /// Queue a pulse. Returns `false` (and counts a drop) if the queue is full.
    pub fn push(&mut self, pulse: Pulse) -> bool {
        if self.queue.push_back(pulse).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            return false;
        }
        true
    }

    /// Check if the output is currently driven.
    #[inline]
    pub fn is_on(&self) -> bool {
        matches!(self.state, TrackState::On { .. })
    }

    /// Check if nothing is playing or queued.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == TrackState::Idle && self.queue.is_empty()
    }

    /// Pulses lost to a full queue.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Advance to `now_us`. Returns the new output level if it changed.
    pub fn tick(&mut self, now_us: i64) -> Option<bool> {
        let was_on = self.is_on();
        // Next pulse starts where the previous one ended, not at the tick.
        let mut start_us = now_us;

        loop {
            match self.state {
                TrackState::On { until_us, off_ms } if now_us >= until_us => {
                    start_us = until_us;
                    self.state = if off_ms > 0 {
                        TrackState::Gap {
                            until_us: until_us + i64::from(off_ms) * 1000,
                        }
                    } else {
                        TrackState::Idle
                    };
                }
                TrackState::Gap { until_us } if now_us >= until_us => {
                    start_us = until_us;
                    self.state = TrackState::Idle;
                }
                TrackState::Idle => match self.queue.pop_front() {
                    Some(pulse) if pulse.on_ms > 0 => {
                        let on_us = i64::from(pulse.on_ms) * 1000;
                        // Never swallow a whole pulse inside one late tick.
                        let begin = if start_us + on_us > now_us { start_us } else { now_us };
                        self.state = TrackState::On {
                            until_us: begin + on_us,
                            off_ms: pulse.off_ms,
                        };
                    }
                    Some(pulse) => {
                        // Pure pause
                        self.state = TrackState::Gap {
                            until_us: start_us + i64::from(pulse.off_ms) * 1000,
                        };
                    }
                    None => break,
                },
                _ => break,
            }
        }

        let is_on = self.is_on();
        (is_on != was_on).then_some(is_on)
    }

    /// Drop everything and go quiet.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.state = TrackState::Idle;
    }
}

impl Default for PulseTrack {
    fn default() -> Self {
        Self::new()
    }
}

/// Output changes produced by one scheduler tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeedbackChanges {
    pub buzzer: Option<bool>,
    pub led: Option<bool>,
}

/// Buzzer cues plus LED Morse echo.
///
/// The LED is lit while either the echo track is on or the steady level is
/// held (menu armed).
pub struct FeedbackScheduler {
    config: FeedbackConfig,
    buzzer: PulseTrack,
    led: PulseTrack,
    led_steady: bool,
    led_level: bool,
}

impl FeedbackScheduler {
    pub fn new(config: FeedbackConfig) -> Self {
        Self {
            config,
            buzzer: PulseTrack::new(),
            led: PulseTrack::new(),
            led_steady: false,
            led_level: false,
        }
    }

    /// Queue a buzzer cue. Fire-and-forget.
    pub fn play(&mut self, cue: Cue) {
        if self.config.silent {
            return;
        }
        for &pulse in cue.pattern() {
            self.buzzer.push(pulse);
        }
    }

    /// Echo one symbol on the LED: dot 1 unit, dash 3 units, 1 unit gap.
    pub fn echo_symbol(&mut self, symbol: Symbol) {
        let unit = self.config.led_unit_ms;
        let on = match symbol {
            Symbol::Dot => unit,
            Symbol::Dash => unit * 3,
        };
        self.led.push(Pulse::new(on, unit));
    }

    /// Echo a character gap on the LED (3 units dark).
    pub fn echo_gap(&mut self) {
        self.led.push(Pulse::new(0, self.config.led_unit_ms * 3));
    }

    /// Short LED blink acknowledging a button press.
    pub fn flash(&mut self) {
        self.led.push(Pulse::new(self.config.led_unit_ms, self.config.led_unit_ms));
    }

    /// Hold the LED on regardless of the echo track. Applied on the next tick.
    pub fn set_led_steady(&mut self, on: bool) {
        self.led_steady = on;
    }

    /// Advance both outputs.
    pub fn tick(&mut self, now_us: i64) -> FeedbackChanges {
        let buzzer = self.buzzer.tick(now_us);
        self.led.tick(now_us);

        let level = self.led_steady || self.led.is_on();
        let led = (level != self.led_level).then_some(level);
        self.led_level = level;

        FeedbackChanges { buzzer, led }
    }

    /// Tone frequency for buzzer-on edges.
    #[inline]
    pub fn tone_hz(&self) -> u32 {
        self.config.tone_hz
    }

    pub fn buzzer(&self) -> &PulseTrack {
        &self.buzzer
    }

    pub fn led(&self) -> &PulseTrack {
        &self.led
    }
}
