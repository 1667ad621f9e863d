//! Host MIDI transport.

pub mod output;

pub use output::{choose_output_device, match_output_device, MidirAccess, MidirOutput, MidirPlatform};
