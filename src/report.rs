//! The sequential query/report pipeline: lifecycle init, connect,
//! authorize, query, iterate, extract, print. Release order on every
//! path is reverse-acquisition, enforced by scope.

use std::io::{self, Write};
use std::sync::Arc;

use crate::{
    AuthOptions, Backend, Extracted, InitError, QuerySpec, Subsystem, Timeout, Vendor,
};

/// Namespace holding the hardware device classes.
pub const NAMESPACE: &str = "ROOT\\CIMV2";

/// The three display-adapter attributes this tool reports.
pub const QUERY: &str = "SELECT Name, AdapterRAM, DriverVersion FROM Win32_VideoController";

const BYTES_PER_MB: u32 = 1024 * 1024;

/// Runs the whole pipeline against `backend`, writing the report to
/// `out`. Returns the process exit code: 0 on the happy path (including
/// zero devices found), 1 on any fatal failure. Per-field extraction
/// failures are reported inline and never affect the exit code.
pub fn run<W: Write>(backend: Arc<dyn Backend>, out: &mut W) -> io::Result<i32> {
    let subsystem = match Subsystem::initialize(backend) {
        Ok(subsystem) => subsystem,
        Err(InitError::Startup(e)) => {
            writeln!(out, "Error initializing COM: {}", e.status())?;
            return Ok(1);
        }
        Err(InitError::Security(e)) => {
            writeln!(out, "Error setting COM security level: {}", e.status())?;
            return Ok(1);
        }
    };

    let session = match subsystem.connect(NAMESPACE) {
        Ok(session) => session,
        Err(e) => {
            writeln!(out, "Error connecting to WMI: {}", e.status())?;
            return Ok(1);
        }
    };
    writeln!(out, "Connected to WMI successfully.")?;

    if let Err(e) = session.authorize(AuthOptions::default()) {
        writeln!(out, "Error setting proxy: {}", e.status())?;
        return Ok(1);
    }
    writeln!(out, "Proxy set successfully.")?;

    let mut results = match session.query(QuerySpec::wql(QUERY)) {
        Ok(results) => results,
        Err(e) => {
            writeln!(out, "Error executing query: {}", e.status())?;
            return Ok(1);
        }
    };
    writeln!(out, "Query executed successfully.")?;

    while let Some(device) = results.next(Timeout::Infinite) {
        writeln!(out, "Processing GPU information...")?;

        match device.string("Name") {
            Extracted::Available(name) => {
                log::debug!("adapter vendor: {}", Vendor::classify(&name));
                writeln!(out, "GPU name: {}", name)?;
            }
            Extracted::Unavailable { status, tag } => {
                writeln!(out, "GPU name: Not available (HRESULT: {} , Type: {})", status, tag)?;
            }
        }

        match device.u32("AdapterRAM") {
            Extracted::Available(bytes) => {
                writeln!(out, "Video memory: {} MB", bytes / BYTES_PER_MB)?;
            }
            Extracted::Unavailable { status, tag } => {
                writeln!(
                    out,
                    "Video memory: Not available (HRESULT: {} , Type: {})",
                    status, tag
                )?;
            }
        }

        match device.string("DriverVersion") {
            Extracted::Available(version) => {
                writeln!(out, "Driver version: {}", version)?;
            }
            Extracted::Unavailable { status, tag } => {
                writeln!(
                    out,
                    "Driver version: Not available (HRESULT: {} , Type: {})",
                    status, tag
                )?;
            }
        }
    }

    writeln!(out, "DONE.")?;
    Ok(0)
}
