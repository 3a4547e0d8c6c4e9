//! Integration tests for exactly-once singleton construction under contention.

use singleton_factory::{
    define_singleton, BoxError, FactoryEvent, SingletonSlot, SlotError, SlotState,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[derive(Debug)]
struct ConnectionPool {
    size: usize,
}

static POOL_BUILDS: AtomicUsize = AtomicUsize::new(0);

fn build_pool() -> Result<ConnectionPool, BoxError> {
    POOL_BUILDS.fetch_add(1, Ordering::SeqCst);
    thread::sleep(Duration::from_millis(10));
    Ok(ConnectionPool { size: 8 })
}

define_singleton!(POOL: ConnectionPool = build_pool);

#[test]
fn test_static_singleton_under_contention() {
    const THREADS: usize = 32;
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                POOL.get_instance().unwrap()
            })
        })
        .collect();

    let pools: Vec<Arc<ConnectionPool>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(POOL_BUILDS.load(Ordering::SeqCst), 1);
    assert!(pools.iter().all(|p| Arc::ptr_eq(p, &pools[0])));
    assert_eq!(pools[0].size, 8);
    assert_eq!(POOL.state(), SlotState::Ready);
}

#[test]
fn test_state_is_initializing_while_constructor_runs() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = parking_lot::Mutex::new(release_rx);

    let slot = Arc::new(SingletonSlot::new(move || {
        entered_tx.send(()).unwrap();
        release_rx.lock().recv().unwrap();
        Ok::<_, BoxError>(ConnectionPool { size: 2 })
    }));

    let builder = {
        let slot = slot.clone();
        thread::spawn(move || slot.get_instance().unwrap())
    };

    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(slot.state(), SlotState::Initializing);
    assert!(slot.get().is_none());

    release_tx.send(()).unwrap();
    let pool = builder.join().unwrap();
    assert_eq!(slot.state(), SlotState::Ready);
    assert!(Arc::ptr_eq(&pool, &slot.get().unwrap()));
}

#[test]
fn test_abandoned_waiter_does_not_cancel_construction() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = parking_lot::Mutex::new(release_rx);

    let slot = Arc::new(SingletonSlot::new(move || {
        entered_tx.send(()).unwrap();
        release_rx.lock().recv().unwrap();
        Ok::<_, BoxError>(ConnectionPool { size: 4 })
    }));

    let builder = {
        let slot = slot.clone();
        thread::spawn(move || slot.get_instance().unwrap())
    };
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    // a caller with a deadline waits on a helper thread and gives up
    let (result_tx, result_rx) = mpsc::channel();
    let waiter = {
        let slot = slot.clone();
        thread::spawn(move || {
            let _ = result_tx.send(slot.get_instance());
        })
    };
    assert!(result_rx.recv_timeout(Duration::from_millis(20)).is_err());
    drop(result_rx);

    release_tx.send(()).unwrap();
    let built = builder.join().unwrap();
    waiter.join().unwrap();

    assert_eq!(built.size, 4);
    assert!(Arc::ptr_eq(&built, &slot.get_instance().unwrap()));
}

#[test]
fn test_failed_attempt_then_success() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_clone = attempts.clone();
    let slot = SingletonSlot::new(move || {
        if attempts_clone.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "database refused connection",
            ))
        } else {
            Ok(ConnectionPool { size: 1 })
        }
    });

    match slot.get_instance() {
        Err(SlotError::InitializationFailure { cause }) => {
            assert_eq!(cause.to_string(), "database refused connection")
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(slot.state(), SlotState::Uninitialized);

    let pool = slot.get_instance().unwrap();
    assert_eq!(pool.size, 1);
    assert_eq!(slot.state(), SlotState::Ready);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_waiters_do_not_retry_on_their_own() {
    const THREADS: usize = 4;

    let attempts = Arc::new(AtomicUsize::new(0));
    let waiting = Arc::new(AtomicUsize::new(0));

    let attempts_in_ctor = attempts.clone();
    let waiting_in_ctor = waiting.clone();
    let slot = Arc::new(SingletonSlot::new(move || {
        attempts_in_ctor.fetch_add(1, Ordering::SeqCst);
        while waiting_in_ctor.load(Ordering::SeqCst) < THREADS - 1 {
            thread::yield_now();
        }
        Err::<ConnectionPool, _>("cold start failed")
    }));

    let waiting_in_trace = waiting.clone();
    slot.set_trace_callback(move |event| {
        if let FactoryEvent::SlotWaiting { .. } = event {
            waiting_in_trace.fetch_add(1, Ordering::SeqCst);
        }
    });

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let slot = slot.clone();
            thread::spawn(move || slot.get_instance().unwrap_err())
        })
        .collect();
    let errors: Vec<SlotError> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // one attempt, one constructor error, everyone else sees the same cause
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(
        errors
            .iter()
            .filter(|e| matches!(e, SlotError::ConcurrentWaitFailure { .. }))
            .count(),
        THREADS - 1
    );
    for err in &errors {
        assert_eq!(err.cause().to_string(), "cold start failed");
        assert!(Arc::ptr_eq(err.cause(), errors[0].cause()));
    }
}

#[test]
fn test_fresh_slot_per_test_case() {
    let make = || SingletonSlot::new(|| Ok::<_, BoxError>(ConnectionPool { size: 3 }));

    let first = make();
    let second = make();

    let a = first.get_instance().unwrap();
    let b = second.get_instance().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}
