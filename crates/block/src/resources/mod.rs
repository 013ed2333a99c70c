//! Example participants used to exercise the protocol.
//!
//! [`Resource`] goes through the generic [`Holder`](crate::Holder) and
//! overrides the acquisition check; [`FileManager`] is a hand-written adapter
//! over a raw [`std::fs::File`].

mod file;
mod resource;

pub use file::{FileArgs, FileManager, InvalidMode, OpenMode};
pub use resource::{Resource, ResourceSpec};
