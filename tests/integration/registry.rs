//! Handle registry tests.

use sonic::prelude::*;

use crate::helpers::*;

#[test]
fn test_create_destroy_leaves_no_state() {
    let registry = HandleRegistry::new();
    for _ in 0..1000 {
        let handle = StreamBuilder::new().speed(1.5).register(&registry).unwrap();
        registry
            .with(handle, |s| s.put_bytes(&[0u8; 256]))
            .unwrap()
            .unwrap();
        registry.destroy(handle).unwrap();
    }
    assert!(registry.is_empty());
}

#[test]
fn test_stale_handles_rejected() {
    let registry = HandleRegistry::new();
    let handle = registry.create(TEST_SAMPLE_RATE, 1).unwrap();
    let raw = handle.as_raw();
    registry.destroy(handle).unwrap();

    let stale = StreamHandle::from_raw(raw).unwrap();
    assert!(!registry.contains(stale));
    assert!(matches!(
        registry.destroy(stale),
        Err(sonic::bridge::Error::UnknownHandle(h)) if h == stale
    ));
    assert!(registry.with(stale, |s| s.available_bytes()).is_err());
}

#[test]
fn test_handles_drive_independent_streams() {
    let registry = HandleRegistry::new();
    let speeds = [0.5f32, 1.0, 1.5, 2.0];
    let handles: Vec<StreamHandle> = speeds
        .iter()
        .map(|&speed| {
            StreamBuilder::new()
                .sample_rate(TEST_SAMPLE_RATE)
                .speed(speed)
                .register(&registry)
                .unwrap()
        })
        .collect();

    let input: Vec<u8> = generate_sine(TEST_TONE_HZ, TEST_SAMPLE_RATE, 22050, 1, 9000.0)
        .iter()
        .flat_map(|s| s.to_le_bytes())
        .collect();

    std::thread::scope(|scope| {
        for &handle in &handles {
            let registry = &registry;
            let input = &input;
            scope.spawn(move || {
                for chunk in input.chunks(2048) {
                    registry
                        .with(handle, |s| s.put_bytes(chunk))
                        .unwrap()
                        .unwrap();
                }
                registry.with(handle, |s| s.flush()).unwrap().unwrap();
            });
        }
    });

    for (&handle, &speed) in handles.iter().zip(&speeds) {
        let frames = registry.with(handle, |s| s.available_bytes() / 2).unwrap();
        assert_close(
            frames as f32,
            22050.0 / speed,
            crate::helpers::tolerances::DURATION_TOLERANCE,
            "frames per handle",
        );
    }
}
