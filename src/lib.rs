//! Virtual MIDI controller core.
//!
//! [`message`] packs validated channel voice messages, [`sender`] hands them
//! to an [`OutputSink`], and [`device`] wraps platform MIDI access behind
//! [`MidiPlatform`]. [`io`] provides the midir-backed platform.

pub mod config;
pub mod device;
pub mod error;
pub mod general;
pub mod io;
pub mod message;
pub mod note;
pub mod sender;

pub use config::Config;
pub use device::{
    get_output, list_output_devices, request_access, DeviceDescriptor, DeviceState, MidiAccess,
    MidiPlatform, PlatformError, PortRecord,
};
pub use error::{Error, Result};
pub use message::MidiMessage;
pub use note::{format_midi_note, keyboard_keys, HeldNotes, KeyInfo};
pub use sender::{
    send_all_notes_off, send_bank_select, send_control_change, send_note_off, send_note_on,
    send_panic, send_pitch_bend, send_program_change, OutputSink, Timestamp,
};
