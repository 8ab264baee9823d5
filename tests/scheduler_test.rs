//! Scheduling order: pure propagation, mutation phase, listener phase,
//! reentrancy, introspection, and recovery after a panicking effect.

use std::cell::RefCell;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;

use eventflow::{
    Config, QueueDepths, configure, create_event, create_listener, create_mutation_listener,
    flush_queues, introspect_queues, with_scope,
};

type Log<T> = Rc<RefCell<Vec<T>>>;

fn log<T>() -> Log<T> {
    Rc::new(RefCell::new(Vec::new()))
}

fn push<T: 'static>(log: &Log<T>) -> impl FnMut(T) {
    let log = Rc::clone(log);
    move |value| log.borrow_mut().push(value)
}

// =========================================================================
// Cross-handler ordering
// =========================================================================

#[test]
fn listeners_fire_after_full_pure_propagation_in_enqueue_order() {
    let seen: Log<u32> = log();

    let (emit, scope) = with_scope(|| {
        let (on, emit) = create_event::<u32>();

        create_listener(&on, push(&seen));
        let doubled = on.map(|n| n * 2);
        let quadrupled = doubled.map(|n| n * 2);
        create_listener(&quadrupled, push(&seen));
        create_listener(&doubled, push(&seen));
        create_listener(&on, push(&seen));

        emit
    });

    emit.emit(1);

    // Propagation reaches the whole graph before any listener runs; the
    // listener queue then drains in the order effects were enqueued.
    assert_eq!(*seen.borrow(), [1, 1, 2, 4]);
    scope.dispose();
}

#[test]
fn mutation_effects_run_between_transforms_and_listeners() {
    let seen: Log<u32> = log();

    let (emit, scope) = with_scope(|| {
        let (on, emit) = create_event::<String>();

        let sink = Rc::clone(&seen);
        let _tap = on.subscribe(move |p: String| {
            // Side effect inside a transform: runs during pure propagation.
            sink.borrow_mut().push(1);
            Ok(p)
        });
        create_listener(&on, {
            let mut push = push(&seen);
            move |_| push(3)
        });
        create_mutation_listener(&on, {
            let mut push = push(&seen);
            move |_| push(2)
        });

        emit
    });

    emit.emit("hello".into());
    assert_eq!(*seen.borrow(), [1, 2, 3]);
    scope.dispose();
}

// =========================================================================
// Reentrant emits
// =========================================================================

#[test]
fn emit_inside_a_transform_defers_effects_to_their_phases() {
    let seen: Log<String> = log();

    let (emit_a, scope) = with_scope(|| {
        let (on_a, emit_a) = create_event::<u32>();
        let (on_b, emit_b) = create_event::<u32>();

        let forward = emit_b.clone();
        let _bridge = on_a.subscribe(move |n| {
            forward.emit(n * 10);
            Ok(n)
        });

        let sink = Rc::clone(&seen);
        create_listener(&on_a, move |n| sink.borrow_mut().push(format!("listener-a:{n}")));
        let sink = Rc::clone(&seen);
        create_mutation_listener(&on_b, move |n| {
            sink.borrow_mut().push(format!("mutation-b:{n}"))
        });
        let sink = Rc::clone(&seen);
        create_listener(&on_b, move |n| sink.borrow_mut().push(format!("listener-b:{n}")));

        emit_a
    });

    emit_a.emit(1);

    // The nested emit's pure work joins the same pass; its effects wait for
    // their queue's phase.
    assert_eq!(
        *seen.borrow(),
        ["mutation-b:10", "listener-a:1", "listener-b:10"]
    );
    scope.dispose();
}

#[test]
fn emit_inside_a_listener_effect_runs_a_full_later_cycle() {
    let seen: Log<String> = log();

    let (emit, scope) = with_scope(|| {
        let (on, emit) = create_event::<u32>();

        let sink = Rc::clone(&seen);
        create_mutation_listener(&on, move |n| sink.borrow_mut().push(format!("m{n}")));

        let sink = Rc::clone(&seen);
        let reemit = emit.clone();
        create_listener(&on, move |n| {
            sink.borrow_mut().push(format!("l{n}"));
            if n == 1 {
                reemit.emit(2);
            }
        });

        emit
    });

    emit.emit(1);

    // The second emission keeps phase order relative to itself.
    assert_eq!(*seen.borrow(), ["m1", "l1", "m2", "l2"]);
    scope.dispose();
}

// =========================================================================
// Introspection and explicit flush
// =========================================================================

#[test]
fn queues_are_empty_between_emissions() {
    let (emit, scope) = with_scope(|| {
        let (on, emit) = create_event::<u32>();
        create_listener(&on, |_| {});
        emit
    });

    emit.emit(1);
    flush_queues(); // idempotent on empty queues

    assert_eq!(introspect_queues(), QueueDepths::default());
    scope.dispose();
}

#[test]
fn introspection_sees_pending_listeners_during_mutation_phase() {
    let observed = Rc::new(RefCell::new(None));

    let (emit, scope) = with_scope(|| {
        let (on, emit) = create_event::<u32>();

        create_listener(&on, |_| {});
        let snapshot = Rc::clone(&observed);
        create_mutation_listener(&on, move |_| {
            *snapshot.borrow_mut() = Some(introspect_queues());
        });

        emit
    });

    emit.emit(1);

    let depths = (*observed.borrow()).expect("mutation effect ran");
    assert_eq!(depths.pure, 0);
    assert_eq!(depths.mutation, 0); // the running snapshot was taken out
    assert_eq!(depths.listener, 1);
    scope.dispose();
}

#[test]
fn configure_applies_only_before_first_use() {
    assert!(configure(Config {
        queue_capacity: 8,
        warn_depth: 16,
    }));
    // The scheduler now exists on this thread; reconfiguration is refused.
    assert!(!configure(Config::default()));
}

// =========================================================================
// Panicking effects
// =========================================================================

#[test]
fn scheduler_recovers_after_a_panicking_listener_effect() {
    let seen: Log<u32> = log();

    let (emit, scope) = with_scope(|| {
        let (on, emit) = create_event::<u32>();

        create_listener(&on, |n| {
            if n == 1 {
                panic!("effect failure");
            }
        });
        create_listener(&on, push(&seen));

        emit
    });

    // The panic surfaces at the emit call site and drops the rest of the
    // listener snapshot.
    let result = std::panic::catch_unwind(AssertUnwindSafe(|| emit.emit(1)));
    assert!(result.is_err());
    assert!(seen.borrow().is_empty());

    // Flags were cleared on unwind; the next emission drains normally.
    emit.emit(2);
    assert_eq!(*seen.borrow(), [2]);
    scope.dispose();
}
