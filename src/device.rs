//! Output device access.
//!
//! The platform's MIDI transport is reached only through [`MidiPlatform`] and
//! its access handle ([`MidiAccess`]). Platform failures are folded into the
//! crate [`Error`]: a missing entry point becomes `NotSupported`, a security
//! refusal becomes `AccessDenied`, and anything else passes through as
//! `Platform` with its original message.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, PlatformFailure, Result};
use crate::sender::OutputSink;

pub const UNKNOWN_DEVICE_NAME: &str = "Unknown Device";

/// Raw failure reported by a platform backend while granting access.
#[derive(Debug)]
pub enum PlatformError {
    /// The user or a platform policy refused MIDI access.
    Security(String),
    Other(PlatformFailure),
}

impl From<PlatformError> for Error {
    fn from(e: PlatformError) -> Self {
        match e {
            PlatformError::Security(reason) => {
                warn!(%reason, "MIDI access refused");
                Error::AccessDenied
            }
            PlatformError::Other(inner) => Error::Platform(inner),
        }
    }
}

/// One output port as the platform reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortRecord {
    pub id: String,
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    /// Platform connection state, e.g. "connected", "disconnected", "pending".
    pub state: String,
}

/// A granted access handle: enumerates output ports and opens them by id.
pub trait MidiAccess {
    type Output: OutputSink;

    /// Output ports in platform enumeration order.
    fn output_ports(&self) -> Vec<PortRecord>;

    /// `Ok(None)` when no port has this id.
    fn output(&self, id: &str) -> std::result::Result<Option<Self::Output>, PlatformError>;
}

/// The host capability that grants MIDI access.
pub trait MidiPlatform {
    type Access: MidiAccess;

    /// False when the platform has no MIDI access entry point at all.
    fn is_supported(&self) -> bool;

    fn request_access(&self) -> std::result::Result<Self::Access, PlatformError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    Connected,
    Disconnected,
}

impl DeviceState {
    /// Anything other than "connected" counts as disconnected.
    pub fn from_platform(state: &str) -> Self {
        if state == "connected" {
            DeviceState::Connected
        } else {
            DeviceState::Disconnected
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    pub state: DeviceState,
}

impl From<PortRecord> for DeviceDescriptor {
    fn from(port: PortRecord) -> Self {
        Self {
            state: DeviceState::from_platform(&port.state),
            name: port.name.unwrap_or_else(|| UNKNOWN_DEVICE_NAME.to_string()),
            manufacturer: port.manufacturer,
            id: port.id,
        }
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.state == DeviceState::Disconnected {
            write!(f, " (disconnected)")?;
        }
        Ok(())
    }
}

/// Asks the platform for MIDI access.
pub fn request_access<P: MidiPlatform + ?Sized>(platform: &P) -> Result<P::Access> {
    if !platform.is_supported() {
        warn!("no MIDI access entry point on this platform");
        return Err(Error::NotSupported);
    }
    let access = platform.request_access()?;
    debug!("MIDI access granted");
    Ok(access)
}

/// Lists output devices, requesting access first when no handle is given.
/// Nothing is cached: every call re-reads the platform.
pub fn list_output_devices<P: MidiPlatform + ?Sized>(
    platform: &P,
    access: Option<&P::Access>,
) -> Result<Vec<DeviceDescriptor>> {
    let requested;
    let access = match access {
        Some(access) => access,
        None => {
            requested = request_access(platform)?;
            &requested
        }
    };

    let devices: Vec<DeviceDescriptor> = access
        .output_ports()
        .into_iter()
        .map(DeviceDescriptor::from)
        .collect();
    debug!(count = devices.len(), "enumerated MIDI outputs");
    Ok(devices)
}

/// Resolves the live output for `device_id`, requesting access first when no
/// handle is given.
pub fn get_output<P: MidiPlatform + ?Sized>(
    platform: &P,
    device_id: &str,
    access: Option<&P::Access>,
) -> Result<<P::Access as MidiAccess>::Output> {
    let requested;
    let access = match access {
        Some(access) => access,
        None => {
            requested = request_access(platform)?;
            &requested
        }
    };

    match access.output(device_id)? {
        Some(output) => {
            debug!(device_id, "opened MIDI output");
            Ok(output)
        }
        None => Err(Error::DeviceNotFound(device_id.to_string())),
    }
}
