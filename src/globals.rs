//! Process-wide shared state.
//!
//! Only what genuinely crosses execution contexts lives here: the receive
//! ring (serial reader → transcription task), the log ring (transcription
//! task → log drain) and the fault record. Everything else is owned by the
//! [`Transcriber`](crate::transcriber::Transcriber).

use crate::channel::ByteChannel;
use crate::fault::FaultState;
use crate::logging::LogStream;

/// Bytes received from the peer device.
///
/// Single producer (serial reader), single consumer (transcription task).
pub static SERIAL_RX: ByteChannel = ByteChannel::new();

/// Log ring for the transcription task, drained by the log thread.
pub static LOG_STREAM: LogStream = LogStream::new();

pub static FAULT_STATE: FaultState = FaultState::new();
