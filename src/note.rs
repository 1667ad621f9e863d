//! Note names, the on-screen keyboard range and held-key tracking.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::message::validate_value;
use crate::sender::{send_note_off, OutputSink};

const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Lowest key on the virtual keyboard (C3).
pub const KEYBOARD_LOW: u8 = 48;
/// Highest key on the virtual keyboard (C5).
pub const KEYBOARD_HIGH: u8 = 72;

/// Note number to name with octave, middle C = "C4".
pub fn format_midi_note(note: u8) -> Result<String> {
    validate_value(note, "note")?;
    let octave = (note / 12) as i32 - 1;
    Ok(format!("{}{}", NOTE_NAMES[(note % 12) as usize], octave))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    pub note: u8,
    pub is_black: bool,
    pub label: String,
}

pub fn keyboard_keys() -> Vec<KeyInfo> {
    (KEYBOARD_LOW..=KEYBOARD_HIGH)
        .map(|note| {
            let name = NOTE_NAMES[(note % 12) as usize];
            KeyInfo {
                note,
                is_black: name.contains('#'),
                label: format!("{}{}", name, (note / 12) as i32 - 1),
            }
        })
        .collect()
}

/// Notes currently held down on one channel.
#[derive(Debug, Default)]
pub struct HeldNotes {
    notes: BTreeSet<u8>,
}

impl HeldNotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, note: u8) {
        self.notes.insert(note);
    }

    pub fn release(&mut self, note: u8) -> bool {
        self.notes.remove(&note)
    }

    pub fn contains(&self, note: u8) -> bool {
        self.notes.contains(&note)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Note Off (velocity 0) for every held note, then forget them.
    pub fn release_all<S: OutputSink + ?Sized>(&mut self, output: &S, channel: u8) -> Result<()> {
        for &note in &self.notes {
            send_note_off(output, channel, note, 0, None)?;
        }
        self.notes.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn names_follow_octave_convention() {
        assert_eq!(format_midi_note(60).unwrap(), "C4");
        assert_eq!(format_midi_note(0).unwrap(), "C-1");
        assert_eq!(format_midi_note(61).unwrap(), "C#4");
        assert_eq!(format_midi_note(127).unwrap(), "G9");
        assert!(matches!(
            format_midi_note(128),
            Err(Error::InvalidValue { name: "note", value: 128 })
        ));
    }

    #[test]
    fn keyboard_spans_two_octaves() {
        let keys = keyboard_keys();
        assert_eq!(keys.len(), 25);
        assert_eq!(keys.first().unwrap().label, "C3");
        assert_eq!(keys.last().unwrap().label, "C5");
        assert_eq!(keys.iter().filter(|k| !k.is_black).count(), 15);
        assert!(keys.iter().find(|k| k.note == 49).unwrap().is_black);
    }
}
