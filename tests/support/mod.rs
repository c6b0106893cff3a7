// TODO: Figure out a better way to have shared code for the integration tests. Currently, this
//       module is declared repeatedly and any unused functions for a particular test suite are
//       reported as unused.
#![allow(dead_code)]

use std::sync::Arc;

use gpu_query::mock::{MockBackend, MockDevice};
use gpu_query::{Backend, Value};

pub const MOCK_NAME: &str = "Mock GPU";
pub const MOCK_RAM: u32 = 2_147_483_648;
pub const MOCK_DRIVER: &str = "1.2.3.4";

pub fn init_environment() {
    let _ = pretty_env_logger::try_init();
}

/// One well-formed adapter record with all three reference fields.
pub fn mock_adapter() -> MockDevice {
    MockDevice::new()
        .field("Name", Value::String(MOCK_NAME.to_owned()))
        .field("AdapterRAM", Value::U32(MOCK_RAM))
        .field("DriverVersion", Value::String(MOCK_DRIVER.to_owned()))
}

pub fn single_adapter() -> MockBackend {
    MockBackend::new().device(mock_adapter())
}

/// Runs the full pipeline against `backend`, returning the exit code and
/// the captured console output.
pub fn run(backend: &MockBackend) -> (i32, String) {
    init_environment();
    let mut out = Vec::new();
    let shared: Arc<dyn Backend> = Arc::new(backend.clone());
    let code = gpu_query::report::run(shared, &mut out).expect("report writes to memory");
    (code, String::from_utf8(out).expect("report output is utf-8"))
}
