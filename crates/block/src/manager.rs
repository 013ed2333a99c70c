//! Protocol adapters: how a resource type is entered, accessed and exited.
//!
//! Every type that takes part in a [`ScopedBlock`](crate::ScopedBlock) does so
//! through a [`ContextManager`]. Types that can simply be built in place from
//! arguments implement [`Emplace`] and use the generic [`Holder`]; types that
//! wrap a handle with its own release rules get a hand-written adapter.

use crate::error::{BoxError, Failure, capture};

/// Adapter driving one resource through enter, get and exit.
///
/// The block calls `enter` once at construction, `get` only between a
/// successful enter and exit, and `exit` exactly once.
pub trait ContextManager {
    /// The managed value handed to block bodies.
    type Value;

    /// Arguments used to acquire the value.
    type Args;

    /// Acquire the value, reporting construction failures as `Err`.
    ///
    /// Must not unwind: panics during construction are returned as
    /// [`Failure::Panicked`]. `Ok(false)` means the value exists but the
    /// logical acquisition failed.
    fn try_enter(&mut self, args: Self::Args) -> Result<bool, Failure>;

    /// Acquire the value; construction failures become `false`.
    fn enter(&mut self, args: Self::Args) -> bool {
        match self.try_enter(args) {
            Ok(acquired) => acquired,
            Err(failure) => {
                tracing::debug!(error = %failure, "acquisition failed during construction");
                false
            }
        }
    }

    /// Borrow the live value.
    ///
    /// # Panics
    /// Panics when called before a successful enter or after exit.
    fn get(&mut self) -> &mut Self::Value;

    /// Release the resource.
    ///
    /// Runs unconditionally, with the failure captured by the block (if
    /// any). Returns `true` when the failure has been consumed and must not
    /// be re-raised.
    fn exit(&mut self, failure: Option<&Failure>) -> bool;
}

/// Associates a resource type with the adapter that manages it.
pub trait Managed: Sized {
    /// Adapter used when a block is opened for this type.
    type Manager: ContextManager<Value = Self> + Default;
}

/// A type that can be constructed in place from arguments.
pub trait Emplace: Sized {
    /// Construction arguments.
    type Args;

    /// Build the value.
    fn emplace(args: Self::Args) -> Result<Self, BoxError>;

    /// Whether the freshly built value represents a successful acquisition.
    fn is_acquired(&self) -> bool {
        true
    }
}

/// Default adapter storing an [`Emplace`] value in an optional slot.
///
/// `exit` clears the slot and never consumes a failure.
#[derive(Debug)]
pub struct Holder<T> {
    slot: Option<T>,
}

impl<T> Default for Holder<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T> Holder<T> {
    /// Whether a value is currently held.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.slot.is_some()
    }
}

impl<T: Emplace> ContextManager for Holder<T> {
    type Value = T;
    type Args = T::Args;

    fn try_enter(&mut self, args: T::Args) -> Result<bool, Failure> {
        let value = capture(|| T::emplace(args))?;
        let acquired = value.is_acquired();
        self.slot = Some(value);
        Ok(acquired)
    }

    fn get(&mut self) -> &mut T {
        self.slot
            .as_mut()
            .expect("managed value accessed outside an entered block")
    }

    fn exit(&mut self, _failure: Option<&Failure>) -> bool {
        self.slot = None;
        false
    }
}
