//! In-memory stand-ins for the platform MIDI transport.

#![allow(dead_code)]

use std::cell::Cell;
use std::sync::{Arc, Mutex};

use midi_tools::{MidiAccess, MidiPlatform, OutputSink, PlatformError, PortRecord, Timestamp};

#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<(Vec<u8>, Option<Timestamp>)>>,
}

impl RecordingSink {
    pub fn calls(&self) -> Vec<(Vec<u8>, Option<Timestamp>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.calls().into_iter().map(|(bytes, _)| bytes).collect()
    }
}

impl OutputSink for RecordingSink {
    fn send(&self, data: &[u8], timestamp: Option<Timestamp>) {
        self.calls.lock().unwrap().push((data.to_vec(), timestamp));
    }
}

#[derive(Debug)]
pub struct FakePort {
    pub record: PortRecord,
    pub sink: Arc<RecordingSink>,
}

impl FakePort {
    pub fn new(id: &str, name: Option<&str>, manufacturer: Option<&str>, state: &str) -> Self {
        Self {
            record: PortRecord {
                id: id.to_string(),
                name: name.map(str::to_string),
                manufacturer: manufacturer.map(str::to_string),
                state: state.to_string(),
            },
            sink: Arc::new(RecordingSink::default()),
        }
    }

    pub fn connected(id: &str, name: &str) -> Self {
        Self::new(id, Some(name), None, "connected")
    }
}

#[derive(Debug)]
pub struct FakeAccess {
    pub ports: Vec<FakePort>,
}

impl MidiAccess for FakeAccess {
    type Output = Arc<RecordingSink>;

    fn output_ports(&self) -> Vec<PortRecord> {
        self.ports.iter().map(|p| p.record.clone()).collect()
    }

    fn output(&self, id: &str) -> Result<Option<Arc<RecordingSink>>, PlatformError> {
        Ok(self
            .ports
            .iter()
            .find(|p| p.record.id == id)
            .map(|p| Arc::clone(&p.sink)))
    }
}

pub enum Behavior {
    Unsupported,
    Deny,
    Fail(&'static str),
    Grant(Vec<(&'static str, Option<&'static str>, Option<&'static str>, &'static str)>),
}

pub struct FakePlatform {
    pub behavior: Behavior,
    pub requests: Cell<usize>,
}

impl FakePlatform {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            requests: Cell::new(0),
        }
    }
}

impl MidiPlatform for FakePlatform {
    type Access = FakeAccess;

    fn is_supported(&self) -> bool {
        !matches!(self.behavior, Behavior::Unsupported)
    }

    fn request_access(&self) -> Result<FakeAccess, PlatformError> {
        self.requests.set(self.requests.get() + 1);
        match &self.behavior {
            Behavior::Unsupported => unreachable!("request on unsupported platform"),
            Behavior::Deny => Err(PlatformError::Security("Access denied".to_string())),
            Behavior::Fail(msg) => Err(PlatformError::Other((*msg).into())),
            Behavior::Grant(ports) => Ok(FakeAccess {
                ports: ports
                    .iter()
                    .map(|(id, name, maker, state)| FakePort::new(id, *name, *maker, state))
                    .collect(),
            }),
        }
    }
}
