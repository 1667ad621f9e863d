use std::io::{stdin, stdout, Write};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use midir::{MidiOutput, MidiOutputConnection};
use tracing::{debug, error};

use crate::device::{DeviceDescriptor, MidiAccess, MidiPlatform, PlatformError, PortRecord};
use crate::error::{Error, Result};
use crate::sender::{OutputSink, Timestamp};

/// Default platform: the host MIDI system through midir.
#[derive(Debug, Clone)]
pub struct MidirPlatform {
    client_name: String,
}

impl MidirPlatform {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
        }
    }
}

impl MidiPlatform for MidirPlatform {
    type Access = MidirAccess;

    fn is_supported(&self) -> bool {
        cfg!(any(
            target_os = "linux",
            target_os = "macos",
            target_os = "ios",
            target_os = "windows",
            target_arch = "wasm32"
        ))
    }

    fn request_access(&self) -> std::result::Result<MidirAccess, PlatformError> {
        let output = open_client(&self.client_name)?;
        Ok(MidirAccess {
            client_name: self.client_name.clone(),
            output,
        })
    }
}

fn open_client(client_name: &str) -> std::result::Result<MidiOutput, PlatformError> {
    MidiOutput::new(client_name).map_err(|e| PlatformError::Other(Box::new(e)))
}

/// Granted midir access. Each opened output gets its own client, since
/// connecting consumes a `MidiOutput`.
pub struct MidirAccess {
    client_name: String,
    output: MidiOutput,
}

impl MidiAccess for MidirAccess {
    type Output = MidirOutput;

    fn output_ports(&self) -> Vec<PortRecord> {
        self.output
            .ports()
            .iter()
            .map(|port| PortRecord {
                id: port.id(),
                name: self.output.port_name(port).ok(),
                manufacturer: None,
                // midir only lists ports that are present right now
                state: "connected".to_string(),
            })
            .collect()
    }

    fn output(&self, id: &str) -> std::result::Result<Option<MidirOutput>, PlatformError> {
        let midi_out = open_client(&self.client_name)?;
        let Some(port) = midi_out.find_port_by_id(id.to_string()) else {
            return Ok(None);
        };
        let name = midi_out.port_name(&port).ok();
        let conn = midi_out
            .connect(&port, &format!("{}-output", self.client_name))
            .map_err(|e| PlatformError::Other(e.to_string().into()))?;
        Ok(Some(MidirOutput::spawn(id.to_string(), name, conn)))
    }
}

struct Scheduled {
    bytes: Vec<u8>,
    at: Option<Timestamp>,
}

/// An open midir connection driven by a forwarding thread.
///
/// Untimed messages go out immediately, in submission order. A timestamped
/// message is held until that many milliseconds after the output was opened
/// (see [`MidirOutput::now`]); dropping the output discards any still waiting.
pub struct MidirOutput {
    id: String,
    name: Option<String>,
    origin: Instant,
    tx: Option<Sender<Scheduled>>,
    worker: Option<JoinHandle<()>>,
}

impl MidirOutput {
    fn spawn(id: String, name: Option<String>, conn: MidiOutputConnection) -> Self {
        let origin = Instant::now();
        let (tx, rx) = channel::<Scheduled>();
        let worker = spawn_forwarder(conn, rx, origin);
        Self {
            id,
            name,
            origin,
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Current time on this output's clock, in milliseconds.
    pub fn now(&self) -> Timestamp {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

impl OutputSink for MidirOutput {
    fn send(&self, data: &[u8], timestamp: Option<Timestamp>) {
        let Some(tx) = &self.tx else { return };
        let msg = Scheduled {
            bytes: data.to_vec(),
            at: timestamp,
        };
        if tx.send(msg).is_err() {
            error!(device_id = %self.id, "MIDI output thread is gone, message dropped");
        }
    }
}

impl Drop for MidirOutput {
    fn drop(&mut self) {
        // Closing the channel wakes the forwarder, which exits without
        // waiting on messages scheduled for later.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        debug!(device_id = %self.id, "closed MIDI output");
    }
}

fn spawn_forwarder(
    mut conn: MidiOutputConnection,
    rx: Receiver<Scheduled>,
    origin: Instant,
) -> JoinHandle<()> {
    thread::spawn(move || {
        forward(rx, origin, |bytes| {
            if let Err(err) = conn.send(bytes) {
                error!("Error sending MIDI message to output: {}", err);
            }
        });
        conn.close();
    })
}

struct Pending {
    due: Instant,
    bytes: Vec<u8>,
}

/// Delivers untimed messages as they arrive and timestamped ones once due,
/// earliest first (equal due times keep submission order). Returns as soon
/// as the channel closes; messages still waiting for their time are dropped.
fn forward(rx: Receiver<Scheduled>, origin: Instant, mut deliver: impl FnMut(&[u8])) {
    let mut pending: Vec<Pending> = Vec::new();
    loop {
        let now = Instant::now();
        let ready = pending.iter().take_while(|p| p.due <= now).count();
        for p in pending.drain(..ready) {
            deliver(&p.bytes);
        }

        let next = match pending.first() {
            Some(p) => rx.recv_timeout(p.due.saturating_duration_since(now)),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        let msg = match next {
            Ok(msg) => msg,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        match msg.at.and_then(|at| due_instant(origin, at)) {
            Some(due) if due > Instant::now() => {
                let idx = pending.partition_point(|p| p.due <= due);
                pending.insert(idx, Pending { due, bytes: msg.bytes });
            }
            _ => deliver(&msg.bytes),
        }
    }
    if !pending.is_empty() {
        debug!(dropped = pending.len(), "output closed with scheduled messages pending");
    }
}

/// `None` for timestamps that cannot be placed on the clock (negative
/// overflow, NaN, infinity); those go out immediately.
fn due_instant(origin: Instant, at: Timestamp) -> Option<Instant> {
    let offset = Duration::try_from_secs_f64(at / 1000.0).ok()?;
    origin.checked_add(offset)
}

/// Index of the device whose id equals `wanted`, else the first whose name
/// contains it. An empty `wanted` matches nothing.
pub fn match_output_device(devices: &[DeviceDescriptor], wanted: &str) -> Option<usize> {
    if wanted.is_empty() {
        return None;
    }
    devices
        .iter()
        .position(|d| d.id == wanted)
        .or_else(|| devices.iter().position(|d| d.name.contains(wanted)))
}

/// Select an output device. Prefers the configured id/name, then the only
/// device, and otherwise lists the devices and asks on stdin.
/// `Ok(None)` when there are no devices at all.
pub fn choose_output_device(devices: &[DeviceDescriptor], wanted: &str) -> Result<Option<usize>> {
    if devices.is_empty() {
        return Ok(None);
    }

    if let Some(idx) = match_output_device(devices, wanted) {
        println!("Choosing output port matching '{}': {}", wanted, devices[idx]);
        return Ok(Some(idx));
    }

    if devices.len() == 1 {
        println!("Choosing the only available output port: {}", devices[0]);
        return Ok(Some(0));
    }

    println!("\nAvailable output ports:");
    for (i, device) in devices.iter().enumerate() {
        println!("{}: {}", i, device);
    }

    print!("Please select output port: ");
    stdout().flush()?;
    let mut choice = String::new();
    stdin().read_line(&mut choice)?;
    parse_port_choice(&choice, devices.len()).map(Some)
}

fn parse_port_choice(choice: &str, count: usize) -> Result<usize> {
    match choice.trim().parse::<usize>() {
        Ok(idx) if idx < count => Ok(idx),
        _ => Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "invalid output port selected",
        ))),
    }
}
