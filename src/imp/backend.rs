use crate::{AuthOptions, Error, QuerySpec, Status, Timeout, Value};

/// Entry point to one management transport. Exactly one production
/// implementation talks to the live host subsystem; test doubles script
/// the same four operations.
pub trait Backend {
    /// Bring up the process-wide communication subsystem with
    /// multithreaded apartment semantics. At most once per process.
    fn startup(&self) -> Result<(), Error>;

    /// Configure the process-wide authorization posture: default
    /// authentication level, impersonation-level authorization, no
    /// special capabilities. Must follow `startup`.
    fn configure_security(&self) -> Result<(), Error>;

    /// Open a connection scoped to one namespace.
    fn connect(&self, namespace: &str) -> Result<Box<dyn Connection>, Error>;

    /// Tear down the communication subsystem. Runs exactly once, after
    /// every connection, stream, and record has been released.
    fn shutdown(&self);
}

/// One namespace-scoped connection.
pub trait Connection {
    /// Set the per-connection transport authorization. Mandatory before
    /// `exec_query`; the host may silently reject calls on an
    /// unauthorized connection.
    fn authorize(&mut self, auth: &AuthOptions) -> Result<(), Error>;

    /// Issue one structured query. Results stream as they become
    /// available; nothing is materialized eagerly.
    fn exec_query(&self, spec: &QuerySpec) -> Result<Box<dyn ObjectStream>, Error>;
}

/// Forward-only stream of enumerated records.
pub trait ObjectStream {
    /// Pull the next record, waiting up to `timeout`. `Ok(None)` signals
    /// exhaustion, which is not an error.
    fn next(&mut self, timeout: Timeout) -> Result<Option<Box<dyn ObjectRecord>>, Error>;
}

/// One enumerated device record.
pub trait ObjectRecord {
    /// Read one named field: the raw read status plus the tagged value
    /// cell. Consumers must check both before interpreting the value.
    fn get(&self, field: &str) -> (Status, Value);
}
