use std::io::{stdin, BufRead};
use std::str::FromStr;

use crate::device::DeviceDescriptor;
use crate::error::Result;
use crate::message::validate_channel;
use crate::note::{format_midi_note, keyboard_keys, HeldNotes};
use crate::sender::{
    send_bank_select, send_control_change, send_note_off, send_note_on, send_panic,
    send_pitch_bend, send_program_change, OutputSink,
};

/// Re-enumerates devices for the `devices` command.
pub type DeviceLister = Box<dyn Fn() -> Result<Vec<DeviceDescriptor>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Front-end state: the open output, the selected channel and the keys held.
pub struct Session<S: OutputSink> {
    output: S,
    channel: u8,
    velocity: u8,
    held: HeldNotes,
    list_devices: Option<DeviceLister>,
}

impl<S: OutputSink> Session<S> {
    pub fn new(output: S, channel: u8, velocity: u8) -> Result<Self> {
        validate_channel(channel)?;
        Ok(Self {
            output,
            channel,
            velocity,
            held: HeldNotes::new(),
            list_devices: None,
        })
    }

    pub fn with_device_lister(mut self, lister: DeviceLister) -> Self {
        self.list_devices = Some(lister);
        self
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn held(&self) -> &HeldNotes {
        &self.held
    }

    pub fn output(&self) -> &S {
        &self.output
    }

    /// Run one command line. Range errors are reported and the session goes on.
    pub fn handle_line(&mut self, line: &str) -> Flow {
        match self.dispatch(line) {
            Ok(flow) => flow,
            Err(err) => {
                println!("{}", err);
                Flow::Continue
            }
        }
    }

    fn dispatch(&mut self, line: &str) -> Result<Flow> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(cmd) = parts.first().map(|c| c.to_ascii_lowercase()) else {
            // empty line -> exit
            self.release_all()?;
            return Ok(Flow::Exit);
        };
        let args = &parts[1..];

        match cmd.as_str() {
            "exit" | "quit" | "q" => {
                self.release_all()?;
                return Ok(Flow::Exit);
            }
            "help" | "h" => print_help(),
            "on" => {
                let Some(note) = arg::<u8>(args, 0, "on <note> [velocity]") else {
                    return Ok(Flow::Continue);
                };
                let velocity = match args.get(1) {
                    Some(_) => match arg::<u8>(args, 1, "on <note> [velocity]") {
                        Some(v) => v,
                        None => return Ok(Flow::Continue),
                    },
                    None => self.velocity,
                };
                send_note_on(&self.output, self.channel, note, velocity, None)?;
                self.held.press(note);
            }
            "off" => {
                if args.is_empty() {
                    self.release_all()?;
                    return Ok(Flow::Continue);
                }
                let usage = "off [<note> [velocity]]";
                let Some(note) = arg::<u8>(args, 0, usage) else {
                    return Ok(Flow::Continue);
                };
                let velocity = match args.get(1) {
                    Some(_) => match arg::<u8>(args, 1, usage) {
                        Some(v) => v,
                        None => return Ok(Flow::Continue),
                    },
                    None => 0,
                };
                send_note_off(&self.output, self.channel, note, velocity, None)?;
                self.held.release(note);
            }
            "cc" => {
                let (Some(controller), Some(value)) = (
                    arg::<u8>(args, 0, "cc <controller> <value>"),
                    arg::<u8>(args, 1, "cc <controller> <value>"),
                ) else {
                    return Ok(Flow::Continue);
                };
                send_control_change(&self.output, self.channel, controller, value, None)?;
            }
            "pb" => {
                if let Some(value) = arg::<i16>(args, 0, "pb <-8192..8191>") {
                    send_pitch_bend(&self.output, self.channel, value, None)?;
                }
            }
            "pc" => {
                if let Some(program) = arg::<u8>(args, 0, "pc <program>") {
                    send_program_change(&self.output, self.channel, program, None)?;
                }
            }
            "bank" => {
                if let Some(bank) = arg::<u16>(args, 0, "bank <0..16383>") {
                    send_bank_select(&self.output, self.channel, bank, None)?;
                }
            }
            "ch" => {
                if let Some(display) = arg::<u8>(args, 0, "ch <1-16>") {
                    match display_to_channel(display) {
                        Some(channel) => {
                            self.set_channel(channel)?;
                            println!("Channel set to {}", display);
                        }
                        None => println!("Invalid channel: {}. Must be 1-16", display),
                    }
                }
            }
            "panic" => {
                send_panic(&self.output)?;
                self.held = HeldNotes::new();
                println!("All notes off sent on all channels");
            }
            "devices" => match &self.list_devices {
                Some(list) => {
                    let devices = list()?;
                    if devices.is_empty() {
                        println!("No devices available");
                    }
                    for device in devices {
                        println!("{}: {}", device.id, device);
                    }
                }
                None => println!("Device listing unavailable"),
            },
            "keys" => {
                for key in keyboard_keys() {
                    let marker = if self.held.contains(key.note) { "*" } else { " " };
                    println!("{}{:>4} {}", marker, key.note, key.label);
                }
            }
            "name" => {
                if let Some(note) = arg::<u8>(args, 0, "name <note>") {
                    println!("{}", format_midi_note(note)?);
                }
            }
            _ => println!(
                "Unrecognized command: '{}'. Type 'help' for available commands.",
                line.trim()
            ),
        }
        Ok(Flow::Continue)
    }

    /// Held notes are released on the old channel first so nothing is left
    /// hanging.
    fn set_channel(&mut self, channel: u8) -> Result<()> {
        validate_channel(channel)?;
        self.release_all()?;
        self.channel = channel;
        Ok(())
    }

    fn release_all(&mut self) -> Result<()> {
        self.held.release_all(&self.output, self.channel)
    }

    /// Read commands from stdin until `exit`, an empty line or end of input.
    pub fn run_stdin(&mut self) -> Result<()> {
        let stdin = stdin();
        let mut line = String::new();
        loop {
            line.clear();
            if stdin.lock().read_line(&mut line)? == 0 {
                self.release_all()?;
                break;
            }
            if self.handle_line(&line) == Flow::Exit {
                break;
            }
        }
        Ok(())
    }
}

/// Channel as shown to users (1-16) to its wire value (0-15).
fn display_to_channel(display: u8) -> Option<u8> {
    display.checked_sub(1).filter(|ch| validate_channel(*ch).is_ok())
}

fn arg<T: FromStr>(args: &[&str], idx: usize, usage: &str) -> Option<T> {
    let parsed = args.get(idx).and_then(|a| a.parse::<T>().ok());
    if parsed.is_none() {
        println!("Usage: {}", usage);
    }
    parsed
}

fn print_help() {
    println!("Commands:");
    println!("  on <note> [vel]   - Note On (velocity defaults to config)");
    println!("  off [<note>] [vel]- Note Off; no note releases all held keys");
    println!("  cc <ctl> <value>  - Control Change");
    println!("  pb <value>        - Pitch Bend (-8192..8191, 0 = center)");
    println!("  pc <program>      - Program Change");
    println!("  bank <bank>       - Bank Select (0..16383)");
    println!("  ch <1-16>         - Select channel");
    println!("  panic             - All Notes Off on every channel");
    println!("  devices           - List output devices");
    println!("  keys              - Show the keyboard range");
    println!("  name <note>       - Show a note's name");
    println!("  help/h            - Show this help");
    println!("  exit/quit/q       - Exit program");
}
