//! Sending validated messages to an output sink.
//!
//! Each `send_*` function builds its message first and only then touches the
//! sink, so a range error never leaves a partial write behind.

use std::sync::Arc;

use tracing::trace;

use crate::error::Result;
use crate::message::{MidiMessage, MAX_CHANNEL};

/// Milliseconds on the sink's own clock.
pub type Timestamp = f64;

/// Gap between the two Bank Select messages when a timestamp is given.
pub const BANK_SELECT_LSB_DELAY_MS: Timestamp = 1.0;

/// An open, writable destination for MIDI bytes.
///
/// `timestamp` of `None` means "as soon as possible".
pub trait OutputSink {
    fn send(&self, data: &[u8], timestamp: Option<Timestamp>);
}

impl<S: OutputSink + ?Sized> OutputSink for &S {
    fn send(&self, data: &[u8], timestamp: Option<Timestamp>) {
        (**self).send(data, timestamp)
    }
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn send(&self, data: &[u8], timestamp: Option<Timestamp>) {
        (**self).send(data, timestamp)
    }
}

impl<S: OutputSink + ?Sized> OutputSink for Arc<S> {
    fn send(&self, data: &[u8], timestamp: Option<Timestamp>) {
        (**self).send(data, timestamp)
    }
}

fn dispatch<S: OutputSink + ?Sized>(output: &S, msg: &MidiMessage, timestamp: Option<Timestamp>) {
    trace!(bytes = ?msg.as_bytes(), ?timestamp, "midi send");
    output.send(msg.as_bytes(), timestamp);
}

pub fn send_note_on<S: OutputSink + ?Sized>(
    output: &S,
    channel: u8,
    note: u8,
    velocity: u8,
    timestamp: Option<Timestamp>,
) -> Result<()> {
    let msg = MidiMessage::note_on(channel, note, velocity)?;
    dispatch(output, &msg, timestamp);
    Ok(())
}

/// Release velocity is usually 0; pass it explicitly for devices that use it.
pub fn send_note_off<S: OutputSink + ?Sized>(
    output: &S,
    channel: u8,
    note: u8,
    velocity: u8,
    timestamp: Option<Timestamp>,
) -> Result<()> {
    let msg = MidiMessage::note_off(channel, note, velocity)?;
    dispatch(output, &msg, timestamp);
    Ok(())
}

pub fn send_control_change<S: OutputSink + ?Sized>(
    output: &S,
    channel: u8,
    controller: u8,
    value: u8,
    timestamp: Option<Timestamp>,
) -> Result<()> {
    let msg = MidiMessage::control_change(channel, controller, value)?;
    dispatch(output, &msg, timestamp);
    Ok(())
}

pub fn send_pitch_bend<S: OutputSink + ?Sized>(
    output: &S,
    channel: u8,
    value: i16,
    timestamp: Option<Timestamp>,
) -> Result<()> {
    let msg = MidiMessage::pitch_bend(channel, value)?;
    dispatch(output, &msg, timestamp);
    Ok(())
}

pub fn send_program_change<S: OutputSink + ?Sized>(
    output: &S,
    channel: u8,
    program: u8,
    timestamp: Option<Timestamp>,
) -> Result<()> {
    let msg = MidiMessage::program_change(channel, program)?;
    dispatch(output, &msg, timestamp);
    Ok(())
}

/// Sends CC#0 then CC#32. With a timestamp, the LSB goes out
/// `BANK_SELECT_LSB_DELAY_MS` later so transports that reorder
/// same-time events still deliver MSB first.
pub fn send_bank_select<S: OutputSink + ?Sized>(
    output: &S,
    channel: u8,
    bank: u16,
    timestamp: Option<Timestamp>,
) -> Result<()> {
    let [msb, lsb] = MidiMessage::bank_select(channel, bank)?;
    dispatch(output, &msb, timestamp);
    dispatch(output, &lsb, timestamp.map(|t| t + BANK_SELECT_LSB_DELAY_MS));
    Ok(())
}

pub fn send_all_notes_off<S: OutputSink + ?Sized>(
    output: &S,
    channel: u8,
    timestamp: Option<Timestamp>,
) -> Result<()> {
    let msg = MidiMessage::all_notes_off(channel)?;
    dispatch(output, &msg, timestamp);
    Ok(())
}

/// All Notes Off on every channel, lowest first.
pub fn send_panic<S: OutputSink + ?Sized>(output: &S) -> Result<()> {
    for channel in 0..=MAX_CHANNEL {
        send_all_notes_off(output, channel, None)?;
    }
    tracing::debug!("panic: all notes off sent on all channels");
    Ok(())
}
