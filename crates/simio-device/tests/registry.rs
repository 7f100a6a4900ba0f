//! Registry ownership and concurrency behavior.

use std::sync::Arc;
use std::thread;

use simio_blocks::BlockLayout;
use simio_device::{
    AnalogRole, Device, DeviceError, DeviceHandle, DeviceRegistry, Topology, TopologyLayout,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn reopening_returns_the_same_device() {
    init_tracing();
    let registry = DeviceRegistry::new();
    let first = registry.open_or_build("reflect").unwrap();
    let second = registry.open_or_build("reflect").unwrap();
    assert!(DeviceHandle::ptr_eq(&first, &second));
}

#[test]
fn unknown_names_are_not_supported() {
    init_tracing();
    let registry = DeviceRegistry::new();
    let err = registry.open_or_build("loopback-9000").unwrap_err();
    assert!(matches!(
        err,
        DeviceError::UnsupportedTopology { name } if name == "loopback-9000"
    ));
}

#[test]
fn concurrent_opens_build_exactly_one_device() {
    init_tracing();
    let registry = Arc::new(DeviceRegistry::new());

    let mut workers = Vec::new();
    for _ in 0..8 {
        let registry = registry.clone();
        workers.push(thread::spawn(move || {
            registry.open_or_build("reflect").unwrap()
        }));
    }
    let handles: Vec<DeviceHandle> =
        workers.into_iter().map(|t| t.join().unwrap()).collect();

    for pair in handles.windows(2) {
        assert!(DeviceHandle::ptr_eq(&pair[0], &pair[1]));
    }
    assert_eq!(registry.names(), vec!["reflect".to_string()]);
}

#[test]
fn registering_an_in_use_name_is_a_duplicate() {
    init_tracing();
    let registry = DeviceRegistry::new();
    let _open = registry.open_or_build("reflect").unwrap();

    let bypass = Device::for_topology("reflect", Topology::Reflect).unwrap();
    let err = registry.register(bypass).unwrap_err();
    assert!(matches!(
        err,
        DeviceError::DuplicateDevice { name } if name == "reflect"
    ));
}

#[test]
fn custom_devices_register_but_do_not_route() {
    init_tracing();
    let registry = DeviceRegistry::new();
    let layout = TopologyLayout {
        logic: BlockLayout::uniform(4, 2),
        scalable: BlockLayout::uniform(4, 2),
    };
    let handle = registry
        .register(Device::with_layout("bench-rig", layout).unwrap())
        .unwrap();
    assert_eq!(registry.names(), vec!["bench-rig".to_string()]);

    let err = handle.real_channel(AnalogRole::OutSimOut, 0).unwrap_err();
    assert!(matches!(
        err,
        DeviceError::UnsupportedDevice { name } if name == "bench-rig"
    ));
}

#[test]
fn close_then_open_yields_a_fresh_device() {
    init_tracing();
    let registry = DeviceRegistry::new();
    let first = registry.open_or_build("reflect").unwrap();
    let stale = first.clone();
    registry.close(first);

    let second = registry.open_or_build("reflect").unwrap();
    assert!(!DeviceHandle::ptr_eq(&stale, &second));
}

#[test]
fn closing_a_stale_handle_leaves_the_registry_alone() {
    init_tracing();
    let registry = DeviceRegistry::new();
    let first = registry.open_or_build("reflect").unwrap();
    let stale = first.clone();
    registry.close(first);

    let second = registry.open_or_build("reflect").unwrap();
    registry.close(stale);

    let reopened = registry.open_or_build("reflect").unwrap();
    assert!(DeviceHandle::ptr_eq(&second, &reopened));
}

#[test]
fn registry_drop_releases_every_device() {
    init_tracing();
    let registry = DeviceRegistry::new();
    let device = registry.open_or_build("reflect").unwrap();
    drop(registry);

    // The handle keeps the device alive; its worker is still ticking.
    assert!(device.wait_for_ticks(2, std::time::Duration::from_millis(500)));
}
