//! Shared instrumented adapter for protocol tests.

use std::cell::Cell;
use std::rc::Rc;

use warden_block::{ContextManager, Failure};

/// Counts every protocol call made against a [`Probe`].
#[derive(Debug, Default)]
pub struct Counters {
    pub enters: Cell<u32>,
    pub exits: Cell<u32>,
    pub exit_saw_failure: Cell<bool>,
}

#[derive(Debug, Clone)]
pub struct ProbeArgs {
    pub counters: Rc<Counters>,
    pub acquire: bool,
    pub consume: bool,
}

impl ProbeArgs {
    pub fn new(counters: &Rc<Counters>, acquire: bool) -> Self {
        Self {
            counters: Rc::clone(counters),
            acquire,
            consume: false,
        }
    }

    pub fn consuming(mut self) -> Self {
        self.consume = true;
        self
    }
}

/// Adapter whose outcomes are fixed by its arguments.
#[derive(Debug, Default)]
pub struct Probe {
    counters: Option<Rc<Counters>>,
    value: Option<String>,
    consume: bool,
}

impl ContextManager for Probe {
    type Value = String;
    type Args = ProbeArgs;

    fn try_enter(&mut self, args: ProbeArgs) -> Result<bool, Failure> {
        let counters = args.counters;
        counters.enters.set(counters.enters.get() + 1);
        self.counters = Some(counters);
        self.value = Some("probe".to_string());
        self.consume = args.consume;
        Ok(args.acquire)
    }

    fn get(&mut self) -> &mut String {
        self.value.as_mut().expect("probe value accessed outside block")
    }

    fn exit(&mut self, failure: Option<&Failure>) -> bool {
        if let Some(counters) = &self.counters {
            counters.exits.set(counters.exits.get() + 1);
            counters.exit_saw_failure.set(failure.is_some());
        }
        self.value = None;
        self.consume
    }
}
