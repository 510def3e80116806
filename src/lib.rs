//! # TiltMorseKeyer
//!
//! Gesture-driven Morse keyer: tilt the board to send dots and dashes over a
//! serial link, decode what the peer sends back.
//!
//! ## Architecture
//!
//! One periodic task ([`Transcriber`]) owns all keyer state. The only data
//! that crosses contexts goes through lock-free rings:
//! - [`ByteChannel`]: serial reader → transcription task
//! - [`LogStream`]: transcription task → log drain
//!
//! Everything except `main.rs` and `board.rs` is `no_std` and runs on the
//! host under `cargo test`.

#![cfg_attr(not(test), no_std)]

pub mod channel;
pub mod config;
pub mod error;
pub mod fault;
pub mod feedback;
pub mod gesture;
pub mod globals;
pub mod hal;
pub mod log_drain;
pub mod logging;
pub mod mode;
pub mod morse;
pub mod sample;
pub mod transcriber;

pub use channel::ByteChannel;
pub use config::Config;
pub use error::{HalError, InitError, MorseError, Peripheral};
pub use fault::{FaultCode, FaultState};
pub use globals::{FAULT_STATE, LOG_STREAM, SERIAL_RX};
pub use logging::LogStream;
pub use mode::{Mode, ModeStateMachine, OutboundEvent, Step, TickInput};
pub use morse::{DecodeOutcome, MorseDecoder, Symbol, SymbolCode};
pub use sample::ImuSample;
pub use transcriber::{Peripherals, Transcriber};
