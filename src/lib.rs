#[macro_use]
extern crate bitflags;

use std::sync::Arc;

mod error;
mod imp;
pub mod report;

pub use crate::error::{Error, ErrorKind, InitError, Status};
pub use crate::imp::backend::{Backend, Connection, ObjectRecord, ObjectStream};
pub use crate::imp::mock;
#[cfg(windows)]
pub use crate::imp::wmi::WmiBackend;

/// Scoped guard over the process-wide communication subsystem. Teardown
/// runs when the guard is dropped, after every session and iterator
/// holding a reference to it has been released.
#[derive(Clone, Debug)]
pub struct Subsystem {
    inner: Arc<imp::SubsystemInner>,
}

/// An authorized connection to one namespace of the management interface.
#[derive(Clone)]
pub struct Session {
    inner: Arc<imp::SessionInner>,
}

// Note: Do not make this cloneable
/// Forward-only cursor over the records matched by one query. Finite and
/// not restartable.
pub struct ResultSet {
    inner: imp::ResultSetInner,
}

/// One enumerated device record, held only for the duration of one
/// iteration step.
pub struct DeviceObject {
    inner: imp::DeviceObjectInner,
}

/// Raw variant tag observed in a field read. The numeric values follow
/// the interface's own type system.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ValueTag(pub u16);

impl ValueTag {
    pub const EMPTY: ValueTag = ValueTag(0);
    pub const NULL: ValueTag = ValueTag(1);
    pub const STRING: ValueTag = ValueTag(8);
    pub const U32: ValueTag = ValueTag(19);
}

impl std::fmt::Display for ValueTag {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

/// A dynamically tagged scalar returned by a field read. Only the string
/// and u32 variants are consumed here; anything else the interface hands
/// back is carried as `Other` with its raw tag.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    U32(u32),
    Empty,
    Null,
    Other(ValueTag),
}

impl Value {
    pub fn tag(&self) -> ValueTag {
        match self {
            Value::String(_) => ValueTag::STRING,
            Value::U32(_) => ValueTag::U32,
            Value::Empty => ValueTag::EMPTY,
            Value::Null => ValueTag::NULL,
            Value::Other(tag) => *tag,
        }
    }
}

/// Result of a tag-checked field extraction. `Unavailable` carries the
/// raw read status and the observed tag for diagnostics; it is never a
/// hard error.
#[derive(Clone, Debug, PartialEq)]
pub enum Extracted<T> {
    Available(T),
    Unavailable { status: Status, tag: ValueTag },
}

impl<T> Extracted<T> {
    pub fn available(self) -> Option<T> {
        match self {
            Extracted::Available(value) => Some(value),
            Extracted::Unavailable { .. } => None,
        }
    }
}

bitflags! {
    /// Enumeration behavior requested with a query. The defaults stream
    /// results instead of materializing the whole set.
    pub struct QueryFlags: u32 {
        const RETURN_IMMEDIATELY = 0x10;
        const FORWARD_ONLY = 0x20;
    }
}

impl Default for QueryFlags {
    fn default() -> QueryFlags {
        QueryFlags::FORWARD_ONLY | QueryFlags::RETURN_IMMEDIATELY
    }
}

/// An immutable structured query: language, text, and enumeration flags.
#[derive(Clone, Debug)]
pub struct QuerySpec {
    pub language: String,
    pub text: String,
    pub flags: QueryFlags,
}

impl QuerySpec {
    pub fn wql<T: Into<String>>(text: T) -> QuerySpec {
        QuerySpec {
            language: "WQL".to_owned(),
            text: text.into(),
            flags: QueryFlags::default(),
        }
    }
}

/// Wait bound for one iterator pull.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Timeout {
    Infinite,
    Millis(u32),
}

#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AuthenticationService {
    Default = 0xFFFF_FFFF,
    Winnt = 10,
}

impl Default for AuthenticationService {
    fn default() -> AuthenticationService {
        AuthenticationService::Winnt
    }
}

#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AuthorizationService {
    None = 0,
    Name = 1,
    Dce = 2,
}

impl Default for AuthorizationService {
    fn default() -> AuthorizationService {
        AuthorizationService::None
    }
}

#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AuthenticationLevel {
    Default = 0,
    None = 1,
    Connect = 2,
    Call = 3,
    Pkt = 4,
}

impl Default for AuthenticationLevel {
    fn default() -> AuthenticationLevel {
        AuthenticationLevel::Call
    }
}

#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImpersonationLevel {
    Anonymous = 1,
    Identify = 2,
    Impersonate = 3,
    Delegate = 4,
}

impl Default for ImpersonationLevel {
    fn default() -> ImpersonationLevel {
        ImpersonationLevel::Impersonate
    }
}

/// Per-connection transport authorization. The defaults mirror the
/// reference posture: host authentication, no authorization service,
/// call-level authentication, impersonation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthOptions {
    pub authentication: AuthenticationService,
    pub authorization: AuthorizationService,
    pub level: AuthenticationLevel,
    pub impersonation: ImpersonationLevel,
}

/// Hardware vendor derived from the adapter name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Vendor {
    Nvidia,
    Amd,
    Intel,
    Unknown,
}

impl Vendor {
    pub fn classify(name: &str) -> Vendor {
        let name = name.to_ascii_lowercase();
        if name.contains("nvidia") || name.contains("geforce") || name.contains("quadro") {
            Vendor::Nvidia
        } else if name.contains("amd") || name.contains("radeon") {
            Vendor::Amd
        } else if name.contains("intel") {
            Vendor::Intel
        } else {
            Vendor::Unknown
        }
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Vendor::Nvidia => write!(fmt, "NVIDIA"),
            Vendor::Amd => write!(fmt, "AMD"),
            Vendor::Intel => write!(fmt, "INTEL"),
            Vendor::Unknown => write!(fmt, "UNKNOWN"),
        }
    }
}
