//! Lone action tests.
//!
//! Dispatching something that is not a list bypasses the executor entirely.

use serde_json::{json, Value};

use crate::{action, async_value, Completion, Dispatched, Element, Error, Middleware};

use super::common::{middleware, Flag};

/// A plain action reaches the store, and the store's return value comes back.
#[test]
fn vanilla_action_is_forwarded() {
    let mw = middleware();

    let output = mw
        .dispatch(action!("VANILLA", load: "some data"))
        .expect("plain action")
        .into_forwarded()
        .expect("lone actions are forwarded");

    assert_eq!(output, json!({"type": "VANILLA", "load": "some data"}));
    assert_eq!(
        mw.store().actions(),
        vec![json!({"type": "VANILLA", "load": "some data"})]
    );
}

/// Test that a lone action can't use async values, since no task has run.
#[test]
fn vanilla_action_cannot_reference_async_values() {
    let mw = middleware();

    let result = mw.dispatch_action(action!("PHUNKY", val: async_value("val").expect("name")));

    assert!(matches!(
        result,
        Err(Error::UnresolvedReference { ref name, .. }) if name.as_ref() == "val"
    ));
    assert!(mw.store().is_empty());
}

/// Test that an action type can never be an async value.
#[test]
fn vanilla_action_type_cannot_be_async() {
    let mw = middleware();

    let element = Element::new().with("type", async_value("theType").expect("name"));
    let result = mw.dispatch(element);

    assert!(matches!(result, Err(Error::AsyncType)));
    assert!(mw.store().is_empty());
}

/// Test that a lone task is rejected without running.
///
/// Verifies:
/// - Dispatch fails with `LoneTask`
/// - The task function is never called
/// - Nothing reaches the store
#[test]
fn lone_task_is_rejected() {
    let mw = middleware();
    let called = Flag::default();
    let marker = called.clone();

    let task = Element::task("lonely", move |_| {
        marker.set();
        Completion::resolved(Value::Null)
    });
    let result = mw.dispatch(task);

    assert!(matches!(result, Err(Error::LoneTask)));
    assert!(!called.is_set());
    assert!(mw.store().is_empty());
}

/// Test that a malformed lone task reports its shape error.
#[test]
fn lone_task_with_type_is_malformed() {
    let mw = middleware();

    let task = Element::task("typed", |_| Completion::resolved(1)).with("type", "FETCH");

    match mw.dispatch(task) {
        Err(e) => assert!(e.is_malformed()),
        Ok(other) => panic!("Expected an error, got {:?}", other),
    };
}

/// A lone recovery handler is only data: its fields are forwarded and the
/// handler never runs.
#[test]
fn lone_recovery_handler_is_forwarded_as_data() {
    let mw = middleware();
    let called = Flag::default();
    let marker = called.clone();

    let handler = Element::recovery(move |_| {
        marker.set();
        Completion::value(Value::Null)
    })
    .with("note", "cleanup");

    let output = mw.dispatch_action(handler).expect("forwarded");

    assert_eq!(output, json!({"note": "cleanup"}));
    assert!(!called.is_set());
}

/// Test that the store's own return type is passed through untouched.
#[test]
fn closure_store_output_is_passed_through() {
    let mw = Middleware::new(|action: Value| action["type"].as_str().map(str::len));

    let output = mw.dispatch_action(action!("FOUR")).expect("plain action");
    assert_eq!(output, Some(4));

    match mw.dispatch(action!("SIX___")) {
        Ok(Dispatched::Forwarded(len)) => assert_eq!(len, Some(6)),
        other => panic!("Expected Forwarded, got {:?}", other.map(|d| d.is_pending())),
    };
}
