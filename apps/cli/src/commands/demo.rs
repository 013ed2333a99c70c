//! The scoped-block walkthrough

use std::cell::RefCell;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use warden_block::{FileArgs, Failure, OpenMode, Resource, scoped};

pub fn run() -> anyhow::Result<()> {
    println!("== acquisition succeeds ==");
    greet(("foo", true))?;

    println!("== acquisition fails ==");
    greet(("bar", false))?;

    println!("== body fails ==");
    match failing_body() {
        Ok(()) => println!("no failure surfaced"),
        Err(failure) => println!("re-raised: {failure}"),
    }

    println!("== file handle ==");
    let path = std::env::temp_dir().join(format!("warden-demo-{}.txt", std::process::id()));
    let result = file_round_trip(&path);
    // Best effort: the file may never have been created.
    let _ = std::fs::remove_file(&path);
    println!("file round trip: {}", result?);
    Ok(())
}

fn greet(spec: (&str, bool)) -> anyhow::Result<()> {
    scoped::<Resource>(spec)
        .with(|r| {
            println!("{}", r.say("Hello"));
            println!("Doing work");
            Ok(())
        })
        .else_()
        .otherwise(|| {
            println!("Can't do work");
            Ok(())
        })
        .map_err(surface)
}

fn failing_body() -> Result<(), Failure> {
    scoped::<Resource>(("bar", true))
        .with(|r| {
            println!("{}", r.say("Hello"));
            Err("lost connection".into())
        })
        .else_()
        .otherwise(|| {
            println!("Can't do work");
            Ok(())
        })
}

fn file_round_trip(path: &Path) -> anyhow::Result<String> {
    scoped::<File>(FileArgs::new(path, OpenMode::Write))
        .with(|file| {
            file.write_all(b"hello from warden")?;
            Ok(())
        })
        .else_()
        .otherwise(|| Err(format!("could not open {} for writing", path.display()).into()))
        .map_err(surface)?;

    let contents = RefCell::new(String::new());
    scoped::<File>(FileArgs::new(path, OpenMode::Read))
        .with(|file| {
            file.read_to_string(&mut contents.borrow_mut())?;
            Ok(())
        })
        .finish()
        .map_err(surface)?;
    Ok(contents.into_inner())
}

/// Convert a replayed failure for `anyhow`, resuming panics.
///
/// Raised errors keep their source chain.
pub(crate) fn surface(failure: Failure) -> anyhow::Error {
    if failure.is_panic() {
        failure.resume();
    }
    let message = failure.message();
    failure
        .into_error()
        .map_or_else(|| anyhow::anyhow!(message), |error| anyhow::anyhow!(error))
}
