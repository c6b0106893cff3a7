use parking_lot::Mutex;

use std::fmt::{self, Debug};
use std::sync::Arc;

pub mod backend;
mod extract;
pub mod mock;
mod results;
mod session;
mod subsystem;
#[cfg(windows)]
pub mod wmi;

use crate::imp::backend::{Backend, Connection, ObjectRecord, ObjectStream};

pub struct SubsystemInner {
    backend: Arc<dyn Backend>,
}

impl Debug for SubsystemInner {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "SubsystemInner")
    }
}

#[allow(dead_code)]
pub struct SessionInner {
    // Field order matters: the connection must be released before the
    // subsystem reference is given up.
    conn: Mutex<Box<dyn Connection>>,
    subsystem: Arc<SubsystemInner>,
}

// Note: Do not make this cloneable
#[allow(dead_code)]
pub struct ResultSetInner {
    stream: Box<dyn ObjectStream>,
    session: Arc<SessionInner>,
}

pub struct DeviceObjectInner {
    record: Box<dyn ObjectRecord>,
}
