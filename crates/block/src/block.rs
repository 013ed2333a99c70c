//! Block driver: enter at construction, run the chained bodies, exit once.
//!
//! A [`ScopedBlock`] moves through three stages:
//!
//! ```text
//! With ──primary body──▶ Else ──alternate body / finish / drop──▶ Done
//! ```
//!
//! The primary body runs only if acquisition succeeded. The alternate body
//! runs only if the block is not `ok` when it is reached. The adapter's
//! `exit` runs exactly once, on the transition to `Done`, and an unconsumed
//! failure is handed back to the caller only after that.

use std::fmt;

use crate::error::{BoxError, Failure, Result, capture};
use crate::manager::{ContextManager, Managed};

/// Position of a block in its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Primary body not yet attached.
    With,
    /// Primary body ran or was skipped; the alternate branch may follow.
    Else,
    /// The adapter has been exited.
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::With => write!(f, "with"),
            Self::Else => write!(f, "else"),
            Self::Done => write!(f, "done"),
        }
    }
}

type ValueBody<'a, T, R> = Box<dyn FnOnce(&mut T) -> std::result::Result<R, BoxError> + 'a>;
type BareBody<'a, R> = Box<dyn FnOnce() -> std::result::Result<R, BoxError> + 'a>;

/// A body attached to a block, tagged by its shape.
///
/// Bodies either borrow the managed value or take nothing, and either
/// return nothing or a success flag. Returning `Err` (or panicking) raises
/// a failure that the block captures.
pub enum Step<'a, T> {
    /// Borrows the managed value.
    Use(ValueBody<'a, T, ()>),
    /// Borrows the managed value and reports success.
    Check(ValueBody<'a, T, bool>),
    /// Takes nothing.
    Run(BareBody<'a, ()>),
    /// Takes nothing and reports success.
    RunCheck(BareBody<'a, bool>),
}

impl<'a, T> Step<'a, T> {
    /// Body borrowing the managed value.
    pub fn using(f: impl FnOnce(&mut T) -> std::result::Result<(), BoxError> + 'a) -> Self {
        Self::Use(Box::new(f))
    }

    /// Body borrowing the managed value and returning a success flag.
    pub fn check(f: impl FnOnce(&mut T) -> std::result::Result<bool, BoxError> + 'a) -> Self {
        Self::Check(Box::new(f))
    }

    /// Body taking no input.
    pub fn run(f: impl FnOnce() -> std::result::Result<(), BoxError> + 'a) -> Self {
        Self::Run(Box::new(f))
    }

    /// Body taking no input and returning a success flag.
    pub fn run_check(f: impl FnOnce() -> std::result::Result<bool, BoxError> + 'a) -> Self {
        Self::RunCheck(Box::new(f))
    }
}

impl<T> fmt::Debug for Step<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Use(_) => "Use",
            Self::Check(_) => "Check",
            Self::Run(_) => "Run",
            Self::RunCheck(_) => "RunCheck",
        };
        f.debug_tuple("Step").field(&kind).finish()
    }
}

/// Scoped acquire/use/release block over one protocol adapter.
///
/// Dropping a block that never reached [`Stage::Done`] exits the adapter
/// and, if the captured failure was not consumed, resumes it as a panic.
/// Prefer [`finish`](Self::finish) or [`otherwise`](Self::otherwise) to
/// receive the failure as a value.
pub struct ScopedBlock<M: ContextManager> {
    manager: M,
    ok: bool,
    stage: Stage,
    failure: Option<Failure>,
}

/// Open a block for a resource type using its registered adapter.
pub fn scoped<T: Managed>(
    args: impl Into<<T::Manager as ContextManager>::Args>,
) -> ScopedBlock<T::Manager> {
    ScopedBlock::new(args)
}

impl<M: ContextManager + Default> ScopedBlock<M> {
    /// Create a block and enter the adapter.
    ///
    /// Construction failures are folded into `ok = false`.
    pub fn new(args: impl Into<M::Args>) -> Self {
        let mut manager = M::default();
        let ok = manager.enter(args.into());
        tracing::debug!(ok, "entered scoped block");
        Self::entered(manager, ok)
    }

    /// Create a block, passing construction failures through to the caller.
    ///
    /// On failure no block exists; the adapter is dropped and releases
    /// whatever it holds.
    pub fn try_new(args: impl Into<M::Args>) -> Result<Self> {
        let mut manager = M::default();
        let ok = manager.try_enter(args.into())?;
        tracing::debug!(ok, "entered scoped block");
        Ok(Self::entered(manager, ok))
    }
}

impl<M: ContextManager> ScopedBlock<M> {
    /// Wrap an adapter that has already been entered with outcome `ok`.
    pub fn entered(manager: M, ok: bool) -> Self {
        Self {
            manager,
            ok,
            stage: Stage::With,
            failure: None,
        }
    }

    /// Current success flag of the chain.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Failure captured so far and not yet handed back.
    #[must_use]
    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    /// Primary body borrowing the managed value.
    ///
    /// # Panics
    /// Panics unless the block is in [`Stage::With`].
    pub fn with<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut M::Value) -> std::result::Result<(), BoxError>,
    {
        self.primary(|manager| f(manager.get()).map(|()| None));
        self
    }

    /// Primary body borrowing the managed value; `false` demotes the block.
    ///
    /// # Panics
    /// Panics unless the block is in [`Stage::With`].
    pub fn with_check<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut M::Value) -> std::result::Result<bool, BoxError>,
    {
        self.primary(|manager| f(manager.get()).map(Some));
        self
    }

    /// Primary body taking no input.
    ///
    /// # Panics
    /// Panics unless the block is in [`Stage::With`].
    pub fn run<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> std::result::Result<(), BoxError>,
    {
        self.primary(|_| f().map(|()| None));
        self
    }

    /// Primary body taking no input; `false` demotes the block.
    ///
    /// # Panics
    /// Panics unless the block is in [`Stage::With`].
    pub fn run_check<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> std::result::Result<bool, BoxError>,
    {
        self.primary(|_| f().map(Some));
        self
    }

    /// Readability marker between the primary body and the alternate branch.
    ///
    /// # Panics
    /// Panics unless the block is in [`Stage::Else`].
    pub fn else_(self) -> Self {
        assert_eq!(
            self.stage,
            Stage::Else,
            "else marker must follow the primary body"
        );
        self
    }

    /// Alternate branch, run only when the block is not ok, then exit.
    ///
    /// Returns the captured failure if `exit` did not consume it.
    ///
    /// # Panics
    /// Panics unless the block is in [`Stage::Else`].
    pub fn otherwise<F>(mut self, f: F) -> Result<()>
    where
        F: FnOnce() -> std::result::Result<(), BoxError>,
    {
        self.alternate(|| f().map(|()| None))
    }

    /// Alternate branch returning a flag. The flag never re-enables the block.
    ///
    /// # Panics
    /// Panics unless the block is in [`Stage::Else`].
    pub fn otherwise_check<F>(mut self, f: F) -> Result<()>
    where
        F: FnOnce() -> std::result::Result<bool, BoxError>,
    {
        self.alternate(|| f().map(Some))
    }

    /// Close the block, exiting the adapter if that has not happened yet.
    ///
    /// Returns the captured failure if `exit` did not consume it.
    pub fn finish(mut self) -> Result<()> {
        if self.stage == Stage::Done {
            return Ok(());
        }
        self.release()
    }

    /// Attach the next body, dispatching on the current stage.
    ///
    /// In `With` any body is the primary body. In `Else` a body taking no
    /// input is the alternate branch, after which the adapter is exited and
    /// an unconsumed failure is returned.
    ///
    /// # Panics
    /// Panics when the block is `Done`, or when a value-borrowing body is
    /// attached in `Else`.
    pub fn step(&mut self, step: Step<'_, M::Value>) -> Result<&mut Self> {
        match self.stage {
            Stage::With => {
                self.primary(|manager| match step {
                    Step::Use(f) => f(manager.get()).map(|()| None),
                    Step::Check(f) => f(manager.get()).map(Some),
                    Step::Run(f) => f().map(|()| None),
                    Step::RunCheck(f) => f().map(Some),
                });
            }
            Stage::Else => match step {
                Step::Run(f) => self.alternate(|| f().map(|()| None))?,
                Step::RunCheck(f) => self.alternate(|| f().map(Some))?,
                Step::Use(_) | Step::Check(_) => {
                    panic!("the alternate branch cannot borrow the managed value")
                }
            },
            Stage::Done => panic!("body attached to a block that has already exited"),
        }
        Ok(self)
    }

    /// Apply an ordered list of bodies, then finish the block.
    ///
    /// # Panics
    /// Panics if the list violates the stage rules of [`step`](Self::step).
    pub fn run_steps<'a, I>(mut self, steps: I) -> Result<()>
    where
        I: IntoIterator<Item = Step<'a, M::Value>>,
        M::Value: 'a,
    {
        for step in steps {
            self.step(step)?;
        }
        self.finish()
    }

    fn primary<F>(&mut self, body: F)
    where
        F: FnOnce(&mut M) -> std::result::Result<Option<bool>, BoxError>,
    {
        assert_eq!(
            self.stage,
            Stage::With,
            "primary body attached after the with stage"
        );
        if self.ok {
            let manager = &mut self.manager;
            match capture(|| body(manager)) {
                Ok(Some(flag)) => self.ok = flag,
                Ok(None) => {}
                Err(failure) => self.record(failure),
            }
        } else {
            tracing::debug!("acquisition failed; primary body skipped");
        }
        self.stage = Stage::Else;
        tracing::debug!(ok = self.ok, "scoped block moved to else stage");
    }

    fn alternate<F>(&mut self, body: F) -> Result<()>
    where
        F: FnOnce() -> std::result::Result<Option<bool>, BoxError>,
    {
        assert_eq!(
            self.stage,
            Stage::Else,
            "alternate branch attached outside the else stage"
        );
        if self.ok {
            tracing::debug!("block ok; alternate branch skipped");
        } else if let Err(failure) = capture(body) {
            self.record(failure);
        }
        self.release()
    }

    /// Store a failure; the first one captured wins.
    fn record(&mut self, failure: Failure) {
        self.ok = false;
        match &self.failure {
            Some(first) => tracing::warn!(
                kept = %first,
                dropped = %failure,
                "block already holds a failure; dropping the later one"
            ),
            None => self.failure = Some(failure),
        }
    }

    fn release(&mut self) -> Result<()> {
        self.stage = Stage::Done;
        let failure = self.failure.take();
        let consumed = self.manager.exit(failure.as_ref());
        tracing::debug!(
            failed = failure.is_some(),
            consumed,
            "scoped block exited"
        );
        match failure {
            Some(failure) if !consumed => Err(failure),
            _ => Ok(()),
        }
    }
}

impl<M: ContextManager> Drop for ScopedBlock<M> {
    fn drop(&mut self) {
        if self.stage == Stage::Done {
            return;
        }
        if let Err(failure) = self.release() {
            if std::thread::panicking() {
                tracing::error!(error = %failure, "discarding block failure while unwinding");
            } else {
                failure.resume();
            }
        }
    }
}

impl<M: ContextManager> fmt::Debug for ScopedBlock<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedBlock")
            .field("ok", &self.ok)
            .field("stage", &self.stage)
            .field("failure", &self.failure)
            .finish_non_exhaustive()
    }
}
