//! File handle participant: custom adapter storing the handle directly.

use std::cell::Cell;
use std::fs::File;
use std::io::{Read, Write};

use pretty_assertions::assert_eq;
use warden_block::{FileArgs, OpenMode, ScopedBlock, scoped};

#[test]
fn writes_then_reads_through_blocks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");

    scoped::<File>(FileArgs::new(&path, OpenMode::Write))
        .with(|file| {
            file.write_all(b"hello block")?;
            Ok(())
        })
        .finish()
        .unwrap();

    let mut contents = String::new();
    scoped::<File>(FileArgs::parse(&path, "rb").unwrap())
        .with(|file| {
            file.read_to_string(&mut contents)?;
            Ok(())
        })
        .finish()
        .unwrap();

    assert_eq!(contents, "hello block");
}

#[test]
fn successful_open_skips_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("present.txt");
    std::fs::write(&path, "present").unwrap();
    let mut contents = String::new();
    let fallback_ran = Cell::new(false);

    scoped::<File>(FileArgs::new(&path, OpenMode::Read))
        .with(|file| {
            file.read_to_string(&mut contents)?;
            Ok(())
        })
        .else_()
        .otherwise(|| {
            fallback_ran.set(true);
            Ok(())
        })
        .unwrap();

    assert_eq!(contents, "present");
    assert!(!fallback_ran.get());
}

#[test]
fn open_failure_runs_fallback_only() {
    let dir = tempfile::tempdir().unwrap();
    let body_ran = Cell::new(false);
    let fallback_ran = Cell::new(false);

    scoped::<File>(FileArgs::new(dir.path().join("missing.txt"), OpenMode::Read))
        .with(|_| {
            body_ran.set(true);
            Ok(())
        })
        .else_()
        .otherwise(|| {
            fallback_ran.set(true);
            Ok(())
        })
        .unwrap();

    assert!(!body_ran.get());
    assert!(fallback_ran.get());
}

#[test]
fn io_error_in_body_is_replayed_after_close() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readonly.txt");
    std::fs::write(&path, "data").unwrap();

    let fallback_ran = Cell::new(false);
    let failure = scoped::<File>(FileArgs::new(&path, OpenMode::Read))
        .with(|file| {
            file.write_all(b"not allowed")?;
            Ok(())
        })
        .otherwise(|| {
            fallback_ran.set(true);
            Ok(())
        })
        .unwrap_err();

    assert!(fallback_ran.get());
    assert!(failure.downcast_ref::<std::io::Error>().is_some());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "data");
}

#[test]
fn try_new_reports_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let args = FileArgs::new(dir.path().join("nope"), OpenMode::Read);
    let failure = ScopedBlock::<warden_block::FileManager>::try_new(args).unwrap_err();

    let io = failure.downcast_ref::<std::io::Error>().unwrap();
    assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
}
