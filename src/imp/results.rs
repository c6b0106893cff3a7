use std::sync::Arc;

use crate::imp::{DeviceObjectInner, ResultSetInner, SessionInner};
use crate::{DeviceObject, Error, QuerySpec, ResultSet, Timeout};

impl ResultSet {
    /// Pulls the next device record, waiting up to `timeout`. `None`
    /// signals exhaustion. A pull failure after the stream opened ends
    /// the enumeration the same way; only the status is logged.
    pub fn next(&mut self, timeout: Timeout) -> Option<DeviceObject> {
        match self.inner.stream.next(timeout) {
            Ok(Some(record)) => {
                log::debug!("pulled device record");
                Some(DeviceObject {
                    inner: DeviceObjectInner { record },
                })
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("device enumeration ended early: {}", e.status());
                None
            }
        }
    }
}

impl ResultSetInner {
    pub fn new(session: Arc<SessionInner>, spec: &QuerySpec) -> Result<ResultSetInner, Error> {
        let stream = session.conn.lock().exec_query(spec)?;
        Ok(ResultSetInner { stream, session })
    }
}

impl Into<ResultSet> for ResultSetInner {
    fn into(self) -> ResultSet {
        ResultSet { inner: self }
    }
}
