use backtrace::Backtrace;

use std::error::Error as StdError;
use std::fmt::{self, Display};

/// Numeric status code reported by the management interface, in the
/// HRESULT layout (negative values are failures).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Status(pub i32);

impl Status {
    pub const OK: Status = Status(0);
    pub const FAIL: Status = Status(0x8000_4005_u32 as i32);
    pub const NOT_FOUND: Status = Status(0x8004_1002_u32 as i32);
    pub const ACCESS_DENIED: Status = Status(0x8004_1003_u32 as i32);
    pub const INVALID_NAMESPACE: Status = Status(0x8004_100E_u32 as i32);
    pub const INVALID_QUERY: Status = Status(0x8004_1017_u32 as i32);

    pub fn is_success(self) -> bool {
        self.0 >= 0
    }

    pub fn is_failure(self) -> bool {
        self.0 < 0
    }
}

impl Display for Status {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{:#010x}", self.0 as u32)
    }
}

#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
    backtrace: Option<Backtrace>,
}

impl PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        // ignore the backtrace
        self.kind.eq(&other.kind)
    }
}

impl Eq for Error {}

fn backtrace() -> Option<Backtrace> {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Once;

    static ENABLED: AtomicBool = AtomicBool::new(false);
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let enabled = std::env::var("RUST_BACKTRACE")
            .map(|v| v != "0" && v != "false")
            .unwrap_or(false);
        ENABLED.store(enabled, Ordering::Relaxed);
    });

    if ENABLED.load(Ordering::Relaxed) {
        Some(Backtrace::new())
    } else {
        None
    }
}

impl<'a> From<&'a Error> for Error {
    fn from(e: &'a Error) -> Error {
        e.clone()
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Error {
        Error {
            kind: ErrorKind::Message(msg),
            backtrace: backtrace(),
        }
    }
}

impl<'a> From<&'a str> for Error {
    fn from(msg: &'a str) -> Error {
        Error {
            kind: ErrorKind::Message(msg.to_owned()),
            backtrace: backtrace(),
        }
    }
}

impl From<Status> for Error {
    fn from(status: Status) -> Error {
        Error {
            kind: ErrorKind::Code(status),
            backtrace: backtrace(),
        }
    }
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The underlying status code; message-only errors report a generic
    /// failure code.
    pub fn status(&self) -> Status {
        match self.kind {
            ErrorKind::Code(status) => status,
            ErrorKind::Message(_) => Status::FAIL,
        }
    }

    /// Set `RUST_BACKTRACE=1` to enable backtraces
    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_ref()
    }
}

impl StdError for Error {}

impl Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{:?}", self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Code(Status),
    Message(String),
}

/// Subsystem bring-up failure. Startup failures leave nothing to release;
/// security-posture failures happen with the subsystem live, so teardown
/// is still owed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitError {
    Startup(Error),
    Security(Error),
}

impl InitError {
    pub fn status(&self) -> Status {
        match self {
            InitError::Startup(e) => e.status(),
            InitError::Security(e) => e.status(),
        }
    }
}

impl From<InitError> for Error {
    fn from(e: InitError) -> Error {
        match e {
            InitError::Startup(e) => e,
            InitError::Security(e) => e,
        }
    }
}

impl StdError for InitError {}

impl Display for InitError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{:?}", self)
    }
}
