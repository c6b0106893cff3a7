mod support;

use std::sync::Arc;

use gpu_query::mock::{MockBackend, MockDevice};
use gpu_query::{
    AuthOptions, Backend, DeviceObject, Extracted, QueryFlags, QuerySpec, Status, Subsystem,
    Timeout, Value, ValueTag, Vendor,
};

fn first_device(backend: MockBackend) -> DeviceObject {
    support::init_environment();
    let shared: Arc<dyn Backend> = Arc::new(backend);
    let subsystem = Subsystem::initialize(shared).unwrap();
    let session = subsystem.connect(gpu_query::report::NAMESPACE).unwrap();
    session.authorize(AuthOptions::default()).unwrap();
    let mut results = session.query(QuerySpec::wql(gpu_query::report::QUERY)).unwrap();
    results.next(Timeout::Infinite).expect("one device scripted")
}

#[test]
fn string_extraction_succeeds_on_matching_tag() {
    let device = first_device(support::single_adapter());
    assert_eq!(
        device.string("Name"),
        Extracted::Available("Mock GPU".to_owned())
    );
    assert_eq!(device.u32("AdapterRAM"), Extracted::Available(support::MOCK_RAM));
}

#[test]
fn tag_mismatch_fails_closed() {
    let device = first_device(support::single_adapter());

    // AdapterRAM carries a u32; reading it as a string must not panic or
    // coerce.
    assert_eq!(
        device.string("AdapterRAM"),
        Extracted::Unavailable {
            status: Status::OK,
            tag: ValueTag::U32,
        }
    );
    assert_eq!(
        device.u32("Name"),
        Extracted::Unavailable {
            status: Status::OK,
            tag: ValueTag::STRING,
        }
    );
}

#[test]
fn missing_field_reports_not_found_with_empty_tag() {
    let device = first_device(support::single_adapter());
    assert_eq!(
        device.u32("NoSuchField"),
        Extracted::Unavailable {
            status: Status::NOT_FOUND,
            tag: ValueTag::EMPTY,
        }
    );
}

#[test]
fn failed_read_reports_status_even_for_known_fields() {
    let device = first_device(
        MockBackend::new().device(
            MockDevice::new().failed_field("Name", Status::ACCESS_DENIED),
        ),
    );
    assert_eq!(
        device.string("Name"),
        Extracted::Unavailable {
            status: Status::ACCESS_DENIED,
            tag: ValueTag::EMPTY,
        }
    );
}

#[test]
fn unavailable_is_never_a_value() {
    let device = first_device(
        MockBackend::new().device(MockDevice::new().field("Name", Value::Null)),
    );
    assert_eq!(device.string("Name").available(), None);
    assert_eq!(device.u32("Name").available(), None);
}

#[test]
fn string_truncation_boundaries() {
    let exact = "a".repeat(255);
    let over = "b".repeat(256);
    let device = first_device(
        MockBackend::new().device(
            MockDevice::new()
                .field("Exact", Value::String(exact.clone()))
                .field("Over", Value::String(over)),
        ),
    );

    // 255 characters fit the 256-unit buffer with the terminator.
    assert_eq!(device.string("Exact"), Extracted::Available(exact));
    match device.string("Over") {
        Extracted::Available(s) => assert_eq!(s.chars().count(), 255),
        other => panic!("expected a truncated value, got {:?}", other),
    }
}

#[test]
fn other_tags_are_carried_through() {
    let device = first_device(
        MockBackend::new().device(
            MockDevice::new().field("Weird", Value::Other(ValueTag(11))),
        ),
    );
    assert_eq!(
        device.string("Weird"),
        Extracted::Unavailable {
            status: Status::OK,
            tag: ValueTag(11),
        }
    );
}

#[test]
fn value_tags_match_the_interface_type_system() {
    assert_eq!(Value::String(String::new()).tag(), ValueTag(8));
    assert_eq!(Value::U32(0).tag(), ValueTag(19));
    assert_eq!(Value::Empty.tag(), ValueTag(0));
    assert_eq!(Value::Null.tag(), ValueTag(1));
    assert_eq!(Value::Other(ValueTag(72)).tag(), ValueTag(72));
}

#[test]
fn default_query_flags_stream() {
    let flags = QueryFlags::default();
    assert!(flags.contains(QueryFlags::FORWARD_ONLY));
    assert!(flags.contains(QueryFlags::RETURN_IMMEDIATELY));
    assert_eq!(flags.bits(), 0x30);
}

#[test]
fn vendor_classification_from_adapter_name() {
    assert_eq!(Vendor::classify("NVIDIA GeForce RTX 3080"), Vendor::Nvidia);
    assert_eq!(Vendor::classify("AMD Radeon RX 6800 XT"), Vendor::Amd);
    assert_eq!(Vendor::classify("Intel(R) UHD Graphics 630"), Vendor::Intel);
    assert_eq!(Vendor::classify("Matrox Millennium"), Vendor::Unknown);
}
