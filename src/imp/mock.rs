//! Scripted backend for driving the pipeline without a live host
//! management subsystem. Records every acquisition and release so tests
//! can assert ordering.

use parking_lot::Mutex;

use std::sync::Arc;

use crate::imp::backend::{Backend, Connection, ObjectRecord, ObjectStream};
use crate::{AuthOptions, Error, QuerySpec, Status, Timeout, Value};

/// Everything the backend observed, in order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Startup,
    ConfigureSecurity,
    Connect,
    Authorize,
    Query,
    Pull,
    ReleaseRecord,
    ReleaseStream,
    ReleaseConnection,
    Shutdown,
}

/// One scripted device record: field name, read status, tagged value.
#[derive(Clone, Debug, Default)]
pub struct MockDevice {
    fields: Vec<(String, Status, Value)>,
}

impl MockDevice {
    pub fn new() -> MockDevice {
        MockDevice::default()
    }

    pub fn field<N: Into<String>>(self, name: N, value: Value) -> MockDevice {
        self.set(name.into(), Status::OK, value)
    }

    /// A field whose read reports `status` instead of a value.
    pub fn failed_field<N: Into<String>>(self, name: N, status: Status) -> MockDevice {
        self.set(name.into(), status, Value::Empty)
    }

    // Later definitions of a field replace earlier ones.
    fn set(mut self, name: String, status: Status, value: Value) -> MockDevice {
        self.fields.retain(|(n, _, _)| *n != name);
        self.fields.push((name, status, value));
        self
    }

    fn get(&self, field: &str) -> (Status, Value) {
        for (name, status, value) in &self.fields {
            if name == field {
                return (*status, value.clone());
            }
        }
        (Status::NOT_FOUND, Value::Empty)
    }
}

/// Scripted backend. Clones share the same event log, so a test can keep
/// one handle for assertions while the pipeline owns another.
#[derive(Clone, Default)]
pub struct MockBackend {
    devices: Vec<MockDevice>,
    fail_startup: Option<Status>,
    fail_security: Option<Status>,
    fail_connect: Option<Status>,
    fail_authorize: Option<Status>,
    fail_query: Option<Status>,
    fail_pull_after: Option<(usize, Status)>,
    events: Arc<Mutex<Vec<Event>>>,
}

impl MockBackend {
    pub fn new() -> MockBackend {
        MockBackend::default()
    }

    pub fn device(mut self, device: MockDevice) -> MockBackend {
        self.devices.push(device);
        self
    }

    pub fn fail_startup(mut self, status: Status) -> MockBackend {
        self.fail_startup = Some(status);
        self
    }

    pub fn fail_security(mut self, status: Status) -> MockBackend {
        self.fail_security = Some(status);
        self
    }

    pub fn fail_connect(mut self, status: Status) -> MockBackend {
        self.fail_connect = Some(status);
        self
    }

    pub fn fail_authorize(mut self, status: Status) -> MockBackend {
        self.fail_authorize = Some(status);
        self
    }

    pub fn fail_query(mut self, status: Status) -> MockBackend {
        self.fail_query = Some(status);
        self
    }

    /// Makes every pull past the first `count` records fail with
    /// `status`.
    pub fn fail_pull_after(mut self, count: usize, status: Status) -> MockBackend {
        self.fail_pull_after = Some((count, status));
        self
    }

    /// Events observed so far, in order.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    fn push(&self, event: Event) {
        self.events.lock().push(event);
    }

    fn check(&self, fail: Option<Status>) -> Result<(), Error> {
        match fail {
            Some(status) => Err(Error::from(status)),
            None => Ok(()),
        }
    }
}

impl Backend for MockBackend {
    fn startup(&self) -> Result<(), Error> {
        self.push(Event::Startup);
        self.check(self.fail_startup)
    }

    fn configure_security(&self) -> Result<(), Error> {
        self.push(Event::ConfigureSecurity);
        self.check(self.fail_security)
    }

    fn connect(&self, namespace: &str) -> Result<Box<dyn Connection>, Error> {
        self.push(Event::Connect);
        self.check(self.fail_connect)?;
        log::debug!("mock connect to {}", namespace);
        Ok(Box::new(MockConnection {
            backend: self.clone(),
        }))
    }

    fn shutdown(&self) {
        self.push(Event::Shutdown);
    }
}

struct MockConnection {
    backend: MockBackend,
}

impl Connection for MockConnection {
    fn authorize(&mut self, _auth: &AuthOptions) -> Result<(), Error> {
        self.backend.push(Event::Authorize);
        self.backend.check(self.backend.fail_authorize)
    }

    fn exec_query(&self, spec: &QuerySpec) -> Result<Box<dyn ObjectStream>, Error> {
        self.backend.push(Event::Query);
        self.backend.check(self.backend.fail_query)?;
        log::debug!("mock query: {} [{}]", spec.text, spec.language);
        Ok(Box::new(MockStream {
            backend: self.backend.clone(),
            cursor: 0,
        }))
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.backend.push(Event::ReleaseConnection);
    }
}

struct MockStream {
    backend: MockBackend,
    cursor: usize,
}

impl ObjectStream for MockStream {
    fn next(&mut self, _timeout: Timeout) -> Result<Option<Box<dyn ObjectRecord>>, Error> {
        self.backend.push(Event::Pull);
        if let Some((count, status)) = self.backend.fail_pull_after {
            if self.cursor >= count {
                return Err(Error::from(status));
            }
        }
        match self.backend.devices.get(self.cursor) {
            Some(device) => {
                self.cursor += 1;
                Ok(Some(Box::new(MockRecord {
                    backend: self.backend.clone(),
                    device: device.clone(),
                })))
            }
            None => Ok(None),
        }
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        self.backend.push(Event::ReleaseStream);
    }
}

struct MockRecord {
    backend: MockBackend,
    device: MockDevice,
}

impl ObjectRecord for MockRecord {
    fn get(&self, field: &str) -> (Status, Value) {
        self.device.get(field)
    }
}

impl Drop for MockRecord {
    fn drop(&mut self) {
        self.backend.push(Event::ReleaseRecord);
    }
}
