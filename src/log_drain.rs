//! Log drain: moves entries out of a [`LogStream`] into a text sink.
//!
//! Runs outside the periodic task (blocking writes are fine here). On the
//! device the sink is the console UART; in tests it is a `String`.
//!
//! Line format: `[timestamp_us] LEVEL: message\n`

use core::fmt::Write;

use crate::fault::FaultState;
use crate::logging::{BufWriter, LogEntry, LogStream};

/// Largest formatted line.
pub const LINE_BUF_LEN: usize = 160;

/// Format log entry into `buf`. Returns the number of bytes written.
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    let mut writer = BufWriter::new(buf);
    let _ = writeln!(
        writer,
        "[{:10}] {}: {}",
        entry.timestamp_us,
        entry.level.as_str(),
        entry.text()
    );
    writer.len()
}

/// Write every pending entry to `sink`. Returns the number of entries written.
pub fn drain_to<const N: usize, W: Write>(stream: &LogStream<N>, sink: &mut W) -> usize {
    let mut buf = [0u8; LINE_BUF_LEN];
    let mut count = 0;

    while let Some(entry) = stream.drain() {
        let len = format_log_entry(&entry, &mut buf);
        // Formatted from valid UTF-8 pieces; truncation may split a char.
        let line = core::str::from_utf8(&buf[..len]).unwrap_or("<invalid utf8>\n");
        if sink.write_str(line).is_err() {
            break;
        }
        count += 1;
    }

    count
}

/// Report and reset the drop counter, if anything was dropped.
///
/// Returns the number of dropped messages reported.
pub fn report_dropped<const N: usize, W: Write>(stream: &LogStream<N>, sink: &mut W) -> u32 {
    let dropped = stream.dropped();
    if dropped > 0 {
        let _ = writeln!(sink, "[WARN] log messages dropped: {}", dropped);
        stream.reset_dropped();
    }
    dropped
}

/// Report the latest fault, if one is flagged, and clear the flag.
///
/// Only the most recent fault per call is shown; `total` counts every fault
/// since boot.
pub fn report_fault<W: Write>(fault: &FaultState, sink: &mut W) -> bool {
    let snap = fault.snapshot();
    if !snap.active {
        return false;
    }
    let _ = writeln!(
        sink,
        "[WARN] fault: {} (data {}, total {})",
        snap.code.as_str(),
        snap.data,
        snap.count
    );
    fault.clear();
    true
}
