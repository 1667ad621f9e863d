//! Channel voice message encoding.
//!
//! Every constructor validates its parameters before packing them, in argument
//! order, and stops at the first violation. A `MidiMessage` is only ever built
//! from in-range values, so every data byte it holds is 7-bit clean.

use crate::error::{Error, Result};

pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;
pub const CONTROL_CHANGE: u8 = 0xB0;
pub const PROGRAM_CHANGE: u8 = 0xC0;
pub const PITCH_BEND: u8 = 0xE0;

/// Controller carrying the bank number's upper 7 bits.
pub const CC_BANK_SELECT_MSB: u8 = 0;
/// Controller carrying the bank number's lower 7 bits.
pub const CC_BANK_SELECT_LSB: u8 = 32;
pub const CC_ALL_NOTES_OFF: u8 = 123;

pub const MAX_CHANNEL: u8 = 15;
pub const MAX_DATA: u8 = 127;
pub const MAX_BANK: u16 = 16383;
pub const PITCH_BEND_MIN: i16 = -8192;
pub const PITCH_BEND_MAX: i16 = 8191;
/// Offset that maps a signed bend onto the unsigned 14-bit wire range.
pub const PITCH_BEND_CENTER: u16 = 8192;

pub(crate) fn validate_channel(channel: u8) -> Result<()> {
    if channel > MAX_CHANNEL {
        return Err(Error::InvalidChannel(channel));
    }
    Ok(())
}

pub(crate) fn validate_value(value: u8, name: &'static str) -> Result<()> {
    if value > MAX_DATA {
        return Err(Error::InvalidValue { name, value });
    }
    Ok(())
}

pub(crate) fn validate_bank(bank: u16) -> Result<()> {
    if bank > MAX_BANK {
        return Err(Error::InvalidBank(bank));
    }
    Ok(())
}

pub(crate) fn validate_pitch_bend(value: i16) -> Result<()> {
    if !(PITCH_BEND_MIN..=PITCH_BEND_MAX).contains(&value) {
        return Err(Error::InvalidPitchBend(value));
    }
    Ok(())
}

/// A complete 2- or 3-byte MIDI channel message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MidiMessage {
    bytes: [u8; 3],
    len: usize,
}

impl MidiMessage {
    fn two(status: u8, data1: u8) -> Self {
        Self {
            bytes: [status, data1, 0],
            len: 2,
        }
    }

    fn three(status: u8, data1: u8, data2: u8) -> Self {
        Self {
            bytes: [status, data1, data2],
            len: 3,
        }
    }

    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Result<Self> {
        validate_channel(channel)?;
        validate_value(note, "note")?;
        validate_value(velocity, "velocity")?;
        Ok(Self::three(NOTE_ON | channel, note, velocity))
    }

    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Result<Self> {
        validate_channel(channel)?;
        validate_value(note, "note")?;
        validate_value(velocity, "velocity")?;
        Ok(Self::three(NOTE_OFF | channel, note, velocity))
    }

    pub fn control_change(channel: u8, controller: u8, value: u8) -> Result<Self> {
        validate_channel(channel)?;
        validate_value(controller, "controller")?;
        validate_value(value, "value")?;
        Ok(Self::three(CONTROL_CHANGE | channel, controller, value))
    }

    /// `value`: signed 14-bit (-8192 to 8191, 0 = center). Sent LSB first.
    pub fn pitch_bend(channel: u8, value: i16) -> Result<Self> {
        validate_channel(channel)?;
        validate_pitch_bend(value)?;
        let unsigned = (value as i32 + PITCH_BEND_CENTER as i32) as u16;
        let lsb = (unsigned & 0x7F) as u8;
        let msb = ((unsigned >> 7) & 0x7F) as u8;
        Ok(Self::three(PITCH_BEND | channel, lsb, msb))
    }

    pub fn program_change(channel: u8, program: u8) -> Result<Self> {
        validate_channel(channel)?;
        validate_value(program, "program")?;
        Ok(Self::two(PROGRAM_CHANGE | channel, program))
    }

    /// Bank Select as the CC#0 (MSB) / CC#32 (LSB) pair, in sending order.
    pub fn bank_select(channel: u8, bank: u16) -> Result<[Self; 2]> {
        validate_channel(channel)?;
        validate_bank(bank)?;
        let msb = ((bank >> 7) & 0x7F) as u8;
        let lsb = (bank & 0x7F) as u8;
        Ok([
            Self::three(CONTROL_CHANGE | channel, CC_BANK_SELECT_MSB, msb),
            Self::three(CONTROL_CHANGE | channel, CC_BANK_SELECT_LSB, lsb),
        ])
    }

    pub fn all_notes_off(channel: u8) -> Result<Self> {
        Self::control_change(channel, CC_ALL_NOTES_OFF, 0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn status(&self) -> u8 {
        self.bytes[0]
    }

    /// Message type nibble (upper four bits of the status byte).
    pub fn kind(&self) -> u8 {
        self.bytes[0] & 0xF0
    }

    pub fn channel(&self) -> u8 {
        self.bytes[0] & 0x0F
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl AsRef<[u8]> for MidiMessage {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
