//! Integration test: registry lifecycle and the end-to-end 100-byte scenario.

use mempool_arena::{AllocPolicy, PoolError, Registry, RegistryConfig, SegmentInfo, Status};

fn seg(offset: usize, size: usize, allocated: bool) -> SegmentInfo {
    SegmentInfo {
        offset,
        size,
        allocated,
    }
}

#[test]
fn hundred_byte_first_fit_scenario() {
    let mut reg = Registry::new();
    reg.init().unwrap();
    let pool = reg.open(100, AllocPolicy::FirstFit).unwrap();

    let a = reg.allocate(pool, 40).unwrap();
    assert_eq!(
        reg.inspect(pool).unwrap(),
        vec![seg(0, 40, true), seg(40, 60, false)]
    );

    let b = reg.allocate(pool, 60).unwrap();
    assert_eq!(
        reg.inspect(pool).unwrap(),
        vec![seg(0, 40, true), seg(40, 60, true)]
    );
    assert_eq!(reg.stats(pool).unwrap().gaps, 0);

    reg.free(pool, a).unwrap();
    assert_eq!(
        reg.inspect(pool).unwrap(),
        vec![seg(0, 40, false), seg(40, 60, true)]
    );

    reg.free(pool, b).unwrap();
    assert_eq!(reg.inspect(pool).unwrap(), vec![seg(0, 100, false)]);

    reg.close(pool).unwrap();
    reg.teardown().unwrap();
}

#[test]
fn close_guard_rejects_fragmented_pool_without_mutation() {
    let mut reg = Registry::new();
    reg.init().unwrap();
    let pool = reg.open(30, AllocPolicy::BestFit).unwrap();
    let a = reg.allocate(pool, 10).unwrap();
    let _b = reg.allocate(pool, 10).unwrap();
    reg.free(pool, a).unwrap();

    // Two gaps, one allocation.
    let before = reg.inspect(pool).unwrap();
    let result = reg.close(pool);
    assert_eq!(
        result,
        Err(PoolError::NotFree {
            allocations: 1,
            gaps: 2
        })
    );
    assert_eq!(Status::from(&result), Status::NotFree);
    assert_eq!(reg.inspect(pool).unwrap(), before);
    assert_eq!(reg.open_pools(), 1);
}

#[test]
fn lifecycle_misuse_statuses() {
    let mut reg = Registry::new();
    assert_eq!(
        Status::from(&reg.teardown()),
        Status::AlreadyTornDown
    );
    assert_eq!(
        Status::from(&reg.open(8, AllocPolicy::FirstFit)),
        Status::Uninitialized
    );
    assert!(Status::from(&reg.init()).is_ok());
    assert_eq!(Status::from(&reg.init()), Status::AlreadyInitialized);

    let pool = reg.open(8, AllocPolicy::FirstFit).unwrap();
    assert_eq!(Status::from(&reg.teardown()), Status::NotEmpty);
    reg.close(pool).unwrap();
    assert!(Status::from(&reg.teardown()).is_ok());
}

#[test]
fn exhaustion_returns_no_space_and_keeps_partition() {
    let mut reg = Registry::new();
    reg.init().unwrap();
    let pool = reg.open(100, AllocPolicy::FirstFit).unwrap();

    let mut handles = Vec::new();
    let err = loop {
        match reg.allocate(pool, 7) {
            Ok(h) => handles.push(h),
            Err(e) => break e,
        }
    };
    assert_eq!(handles.len(), 14);
    assert_eq!(
        err,
        PoolError::NoSpace {
            requested: 7,
            largest_gap: 2
        }
    );
    reg.pool(pool).unwrap().validate().unwrap();

    for h in handles {
        reg.free(pool, h).unwrap();
    }
    reg.close(pool).unwrap();
}

#[test]
fn many_pools_grow_the_handle_table() {
    let config = RegistryConfig {
        pool_table_capacity: 2,
        ..RegistryConfig::default()
    };
    let mut reg = Registry::with_config(config);
    reg.init().unwrap();

    let pools: Vec<_> = (0..50)
        .map(|i| {
            let policy = if i % 2 == 0 {
                AllocPolicy::FirstFit
            } else {
                AllocPolicy::BestFit
            };
            reg.open(16 + i, policy).unwrap()
        })
        .collect();
    // 2 -> 4 -> 8 -> 16 -> 32 -> 64 -> 128, each step once more than 75%
    // of the table was occupied.
    assert_eq!(reg.table_capacity(), Some(128));
    for (i, &pool) in pools.iter().enumerate() {
        assert_eq!(reg.stats(pool).unwrap().capacity, 16 + i);
    }
    for pool in pools {
        reg.close(pool).unwrap();
    }
    reg.teardown().unwrap();
}

#[test]
fn handle_is_rejected_by_same_numbered_pool_of_another_registry() {
    let mut first = Registry::new();
    let mut second = Registry::new();
    first.init().unwrap();
    second.init().unwrap();
    let p1 = first.open(32, AllocPolicy::BestFit).unwrap();
    let p2 = second.open(32, AllocPolicy::BestFit).unwrap();
    assert_eq!(p1, p2);

    let h1 = first.allocate(p1, 8).unwrap();
    let h2 = second.allocate(p2, 8).unwrap();
    assert_eq!(
        Status::from(&second.free(p2, h1)),
        Status::InvalidHandle
    );
    assert_eq!(second.stats(p2).unwrap().allocations, 1);

    first.free(p1, h1).unwrap();
    second.free(p2, h2).unwrap();
    first.close(p1).unwrap();
    second.close(p2).unwrap();
}

#[test]
fn allocation_bytes_round_trip_through_registry() {
    let mut reg = Registry::new();
    reg.init().unwrap();
    let pool = reg.open(64, AllocPolicy::BestFit).unwrap();
    let h = reg.allocate(pool, 5).unwrap();
    reg.bytes_mut(pool, h).unwrap().copy_from_slice(b"hello");
    assert_eq!(reg.bytes(pool, h).unwrap(), b"hello");
    reg.free(pool, h).unwrap();
    assert_eq!(reg.bytes(pool, h), Err(PoolError::InvalidHandle));
    reg.close(pool).unwrap();
}
