//! # Warden Block
//!
//! Scoped acquire/use/release blocks for arbitrary resource types.
//!
//! A [`ScopedBlock`] enters its adapter at construction, runs a primary body
//! if acquisition succeeded, runs an alternate body if anything failed, and
//! exits the adapter exactly once. A failure raised by a body is held until
//! after release and then handed back, unless the adapter consumed it.
//!
//! ```rust
//! use warden_block::{Resource, scoped};
//!
//! let result = scoped::<Resource>(("bar", false))
//!     .with(|r| {
//!         r.say("Hello");
//!         Ok(())
//!     })
//!     .else_()
//!     .otherwise(|| {
//!         println!("Can't do work");
//!         Ok(())
//!     });
//! assert!(result.is_ok());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod block;
pub mod error;
pub mod manager;
pub mod resources;

pub use block::{ScopedBlock, Stage, Step, scoped};
pub use error::{BoxError, Failure, Result};
pub use manager::{ContextManager, Emplace, Holder, Managed};
pub use resources::{FileArgs, FileManager, InvalidMode, OpenMode, Resource, ResourceSpec};
