use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::error::Error;

/// Writes one line in `color`, falling back to plain text when stdout is
/// not a terminal.
fn print_colored(color: Color, text: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_intense(true));
    let _ = writeln!(&mut stdout, "{}", text);
    let _ = stdout.reset();
}

pub fn print_quick_help() {
    print_colored(Color::Blue, "Type 'help' for commands, 'exit' to quit");
}

pub fn print_output_connected(device: &str, channel: u8) {
    print_colored(
        Color::Green,
        &format!("Output open: {} | channel {}", device, channel + 1),
    );
    print_quick_help();
}

pub fn print_no_devices() {
    print_colored(Color::Yellow, "No MIDI output devices available");
}

/// User-facing text for a failure to reach MIDI devices.
pub fn access_failure_message(err: &Error) -> String {
    match err {
        Error::NotSupported => "MIDI output is not supported on this platform".to_string(),
        Error::AccessDenied => {
            "MIDI access was denied. Please allow MIDI access and try again.".to_string()
        }
        Error::DeviceNotFound(id) => format!("MIDI device \"{}\" is gone; refresh the device list", id),
        other => format!("Failed to load MIDI devices: {}", other),
    }
}

pub fn print_access_failure(err: &Error) {
    print_colored(Color::Red, &access_failure_message(err));
}
