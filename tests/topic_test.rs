//! Topic tree: keyed subscription, payload fan-out, partial application.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};

use eventflow::{create_listener, create_topic, with_scope};

type Log = Rc<RefCell<Vec<Value>>>;

fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn push(log: &Log) -> impl FnMut(Value) {
    let log = Rc::clone(log);
    move |value| log.borrow_mut().push(value)
}

// =========================================================================
// Fan-out
// =========================================================================

#[test]
fn emissions_fan_out_across_every_subscribed_level() {
    let seen = log();

    let (emit, scope) = with_scope(|| {
        let (on, emit) = create_topic();

        let at_a = on.on(&["a"], Ok);
        create_listener(&at_a, push(&seen));

        // Subscriber at an object-valued key projects out the field itself.
        let at_b = on.on(&["b"], |p: Value| Ok(p["c"].clone()));
        create_listener(&at_b, push(&seen));

        let at_bc = on.on(&["b", "c"], Ok);
        create_listener(&at_bc, push(&seen));

        emit
    });

    emit.emit(&["a"], json!(1));
    emit.emit(&["b"], json!({"c": 2}));
    emit.emit(&["b", "c"], json!(3));
    emit.emit(&[], json!({"a": 4, "b": {"c": 5}}));

    assert_eq!(
        *seen.borrow(),
        [
            json!(1), // a: direct
            json!(2), // b: object emission, projected
            json!(2), // b.c: descent from the object
            json!(3), // b: wrapped reconstruction of the deep emission
            json!(3), // b.c: direct
            json!(4), // a: descent from the root object
            json!(5), // b: projected
            json!(5), // b.c: descent
        ]
    );
    scope.dispose();
}

#[test]
fn ancestors_see_deep_emissions_wrapped() {
    let at_root = log();
    let at_b = log();

    let (emit, scope) = with_scope(|| {
        let (on, emit) = create_topic();
        create_listener(&on.handler(), push(&at_root));
        create_listener(&on.at("b").handler(), push(&at_b));
        emit
    });

    emit.emit(&["b", "c"], json!(3));

    assert_eq!(*at_root.borrow(), [json!({"b": {"c": 3}})]);
    assert_eq!(*at_b.borrow(), [json!({"c": 3})]);
    scope.dispose();
}

#[test]
fn keyed_emit_and_object_emit_are_equivalent() {
    let seen = log();

    let (emit, scope) = with_scope(|| {
        let (on, emit) = create_topic();
        let at_a = on.on(&["a"], Ok);
        create_listener(&at_a, push(&seen));
        emit
    });

    emit.emit(&["a"], json!(7));
    emit.emit(&[], json!({"a": 7}));

    assert_eq!(*seen.borrow(), [json!(7), json!(7)]);
    scope.dispose();
}

#[test]
fn fan_out_treats_arrays_as_leaves() {
    let at_xs = log();
    let at_first = log();

    let (emit, scope) = with_scope(|| {
        let (on, emit) = create_topic();
        create_listener(&on.at("xs").handler(), push(&at_xs));
        create_listener(&on.at("xs").at("0").handler(), push(&at_first));
        emit
    });

    emit.emit(&[], json!({"xs": [1, 2]}));

    assert_eq!(*at_xs.borrow(), [json!([1, 2])]);
    assert!(at_first.borrow().is_empty(), "no descent into arrays");
    scope.dispose();
}

#[test]
fn emitting_where_no_one_subscribed_is_a_no_op() {
    let (_, emit) = create_topic();

    emit.emit(&["deep", "unused", "path"], json!(1));
    emit.emit(&[], json!({"other": {"branch": 2}}));
}

// =========================================================================
// Partial application
// =========================================================================

#[test]
fn partially_applied_handles_reach_the_same_node() {
    let via_path = log();
    let via_partial = log();

    let (emit, scope) = with_scope(|| {
        let (on, emit) = create_topic();

        let direct = on.on(&["a", "b"], Ok);
        create_listener(&direct, push(&via_path));

        let nested = on.at("a").on(&["b"], Ok);
        create_listener(&nested, push(&via_partial));

        emit
    });

    emit.emit(&["a", "b"], json!(42));

    assert_eq!(*via_path.borrow(), [json!(42)]);
    assert_eq!(*via_partial.borrow(), [json!(42)]);
    scope.dispose();
}

// =========================================================================
// Composition with core primitives
// =========================================================================

#[test]
fn topic_handlers_compose_like_ordinary_handlers() {
    let seen = log();

    let (emit, scope) = with_scope(|| {
        let (on, emit) = create_topic();

        let doubled = on
            .on(&["n"], |v: Value| Ok(v.as_i64().unwrap_or(0)))
            .map(|n| n * 2);
        let sink = Rc::clone(&seen);
        create_listener(&doubled, move |n| sink.borrow_mut().push(json!(n)));

        emit
    });

    emit.emit(&["n"], json!(21));

    assert_eq!(*seen.borrow(), [json!(42)]);
    scope.dispose();
}

#[test]
fn subscriptions_die_with_their_scope() {
    let seen = log();

    let (emit, scope) = with_scope(|| {
        let (on, emit) = create_topic();
        let at_a = on.on(&["a"], Ok);
        create_listener(&at_a, push(&seen));
        emit
    });

    emit.emit(&["a"], json!(1));
    scope.dispose();
    emit.emit(&["a"], json!(2));

    assert_eq!(*seen.borrow(), [json!(1)]);
}
