//! End-to-end scenarios with the demonstration resources.

use std::cell::RefCell;

use pretty_assertions::assert_eq;
use warden_block::{Resource, scoped};

#[test]
fn success_path_runs_body_once_without_alternate() {
    let out = RefCell::new(Vec::<String>::new());

    let result = scoped::<Resource>("foo")
        .with(|r| {
            assert_eq!(r.name(), "foo");
            out.borrow_mut().push("Doing work".into());
            Ok(())
        })
        .else_()
        .otherwise(|| {
            out.borrow_mut().push("Can't do work".into());
            Ok(())
        });

    assert!(result.is_ok());
    assert_eq!(out.into_inner(), ["Doing work"]);
}

#[test]
fn logical_acquisition_failure_runs_fallback() {
    let out = RefCell::new(Vec::<String>::new());

    let result = scoped::<Resource>(("bar", false))
        .with(|r| {
            out.borrow_mut().push(r.say("Hello"));
            Ok(())
        })
        .else_()
        .otherwise(|| {
            out.borrow_mut().push("Can't do work".into());
            Ok(())
        });

    assert!(result.is_ok());
    assert_eq!(out.into_inner(), ["Can't do work"]);
}

#[test]
fn mid_body_failure_runs_fallback_and_surfaces_original() {
    let out = RefCell::new(Vec::<String>::new());

    let failure = scoped::<Resource>(("bar", true))
        .with(|r| {
            out.borrow_mut().push(r.say("Hello"));
            Err("lost connection".into())
        })
        .else_()
        .otherwise(|| {
            out.borrow_mut().push("Can't do work".into());
            Ok(())
        })
        .unwrap_err();

    assert_eq!(failure.message(), "lost connection");
    assert_eq!(
        out.into_inner(),
        ["Resource(bar) says: Hello", "Can't do work"]
    );
}

#[test]
fn loop_over_outcomes_matches_expected_transcript() {
    let mut transcript = Vec::new();

    for succeed in [true, false] {
        let lines = RefCell::new(Vec::<String>::new());
        scoped::<Resource>(("bar", succeed))
            .with(|r| {
                lines.borrow_mut().push(r.say("Hello"));
                lines.borrow_mut().push("Doing work".into());
                Ok(())
            })
            .else_()
            .otherwise(|| {
                lines.borrow_mut().push("Can't do work".into());
                Ok(())
            })
            .unwrap();
        transcript.extend(lines.into_inner());
    }

    assert_eq!(
        transcript,
        [
            "Resource(bar) says: Hello",
            "Doing work",
            "Can't do work",
        ]
    );
}
