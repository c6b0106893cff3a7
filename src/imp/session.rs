use parking_lot::Mutex;

use std::sync::Arc;

use crate::imp::{ResultSetInner, SessionInner, SubsystemInner};
use crate::{AuthOptions, Error, QuerySpec, ResultSet, Session};

impl Session {
    /// Sets the per-connection transport authorization. Mandatory before
    /// `query`.
    pub fn authorize(&self, auth: AuthOptions) -> Result<(), Error> {
        self.inner.conn.lock().authorize(&auth)
    }

    /// Issues one structured query and returns the streaming cursor over
    /// its results.
    pub fn query(&self, spec: QuerySpec) -> Result<ResultSet, Error> {
        let results = ResultSetInner::new(self.inner.clone(), &spec)?;
        Ok(results.into())
    }
}

impl SessionInner {
    pub fn connect(subsystem: Arc<SubsystemInner>, namespace: &str) -> Result<SessionInner, Error> {
        let conn = subsystem.backend.connect(namespace)?;
        log::debug!("connected to namespace {}", namespace);
        Ok(SessionInner {
            conn: Mutex::new(conn),
            subsystem,
        })
    }
}

impl Into<Session> for SessionInner {
    fn into(self) -> Session {
        Session { inner: Arc::new(self) }
    }
}
