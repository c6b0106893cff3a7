use crate::imp::DeviceObjectInner;
use crate::{DeviceObject, Extracted, Value};

/// Display buffer bound for string fields, terminator included.
const MAX_DISPLAY: usize = 256;

impl DeviceObject {
    /// Reads a string field. Fails closed: a failed read status or a
    /// non-string tag yields `Unavailable` with the observed status and
    /// tag. Overlong values are truncated to the display bound, never
    /// rejected.
    pub fn string(&self, field: &str) -> Extracted<String> {
        extract_string(&self.inner, field)
    }

    /// Reads an unsigned 32-bit field, failing closed on status or tag
    /// mismatch.
    pub fn u32(&self, field: &str) -> Extracted<u32> {
        extract_u32(&self.inner, field)
    }
}

fn extract_string(inner: &DeviceObjectInner, field: &str) -> Extracted<String> {
    let (status, value) = inner.record.get(field);
    if status.is_failure() {
        return Extracted::Unavailable {
            status,
            tag: value.tag(),
        };
    }
    match value {
        Value::String(s) => Extracted::Available(truncate_display(s)),
        other => {
            log::debug!("field {} carried tag {} instead of a string", field, other.tag());
            Extracted::Unavailable {
                status,
                tag: other.tag(),
            }
        }
    }
}

fn extract_u32(inner: &DeviceObjectInner, field: &str) -> Extracted<u32> {
    let (status, value) = inner.record.get(field);
    if status.is_failure() {
        return Extracted::Unavailable {
            status,
            tag: value.tag(),
        };
    }
    match value {
        Value::U32(n) => Extracted::Available(n),
        other => {
            log::debug!("field {} carried tag {} instead of a u32", field, other.tag());
            Extracted::Unavailable {
                status,
                tag: other.tag(),
            }
        }
    }
}

/// Caps a display string at 255 characters (256-unit buffer with a
/// terminator in the reference behavior).
fn truncate_display(s: String) -> String {
    if s.chars().count() < MAX_DISPLAY {
        return s;
    }
    s.chars().take(MAX_DISPLAY - 1).collect()
}
