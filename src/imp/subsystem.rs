use std::sync::Arc;

use crate::imp::backend::Backend;
use crate::imp::{SessionInner, SubsystemInner};
use crate::{Error, InitError, Session, Subsystem};

impl Subsystem {
    /// Starts the communication subsystem and configures the default
    /// authorization posture. The returned guard tears the subsystem
    /// down when dropped.
    pub fn initialize(backend: Arc<dyn Backend>) -> Result<Subsystem, InitError> {
        backend.startup().map_err(InitError::Startup)?;
        // Teardown is owed from this point on, even if the security
        // posture step fails.
        let subsystem = Subsystem {
            inner: Arc::new(SubsystemInner { backend }),
        };
        subsystem
            .inner
            .backend
            .configure_security()
            .map_err(InitError::Security)?;
        Ok(subsystem)
    }

    pub fn connect(&self, namespace: &str) -> Result<Session, Error> {
        let session = SessionInner::connect(self.inner.clone(), namespace)?;
        Ok(session.into())
    }
}

impl Drop for SubsystemInner {
    fn drop(&mut self) {
        log::debug!("tearing down communication subsystem");
        self.backend.shutdown();
    }
}
