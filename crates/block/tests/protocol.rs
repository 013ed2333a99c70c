//! Protocol guarantees: acquisition gate, exactly-once release, failure
//! replay, boolean demotion, and rejection of steps after exit.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use warden_block::{ScopedBlock, Stage, Step};

use common::{Counters, Probe, ProbeArgs};

fn open(counters: &Rc<Counters>, acquire: bool) -> ScopedBlock<Probe> {
    ScopedBlock::new(ProbeArgs::new(counters, acquire))
}

#[derive(Debug, Clone, Copy)]
enum Body {
    Succeed,
    ReturnFalse,
    Raise,
    Panic,
}

impl Body {
    fn call(self) -> Result<bool, warden_block::BoxError> {
        match self {
            Self::Succeed => Ok(true),
            Self::ReturnFalse => Ok(false),
            Self::Raise => Err("raised".into()),
            Self::Panic => panic!("panicked body"),
        }
    }

    fn fails(self) -> bool {
        !matches!(self, Self::Succeed)
    }

    fn replays(self) -> bool {
        matches!(self, Self::Raise | Self::Panic)
    }
}

#[rstest]
#[case::value_body(true)]
#[case::bare_body(false)]
fn failed_acquisition_gates_primary_and_runs_alternate_once(#[case] takes_value: bool) {
    let counters = Rc::new(Counters::default());
    let primary_runs = Cell::new(0);
    let alternate_runs = Cell::new(0);

    let block = open(&counters, false);
    let block = if takes_value {
        block.with(|_| {
            primary_runs.set(primary_runs.get() + 1);
            Ok(())
        })
    } else {
        block.run(|| {
            primary_runs.set(primary_runs.get() + 1);
            Ok(())
        })
    };
    block
        .else_()
        .otherwise(|| {
            alternate_runs.set(alternate_runs.get() + 1);
            Ok(())
        })
        .unwrap();

    assert_eq!(primary_runs.get(), 0);
    assert_eq!(alternate_runs.get(), 1);
    assert_eq!(counters.exits.get(), 1);
}

#[rstest]
#[case::no_steps(0)]
#[case::primary_only(1)]
#[case::primary_and_alternate(2)]
fn exit_runs_once_for_any_chain_length(#[case] steps: usize) {
    let counters = Rc::new(Counters::default());
    {
        let block = open(&counters, true);
        match steps {
            0 => drop(block),
            1 => drop(block.run(|| Ok(()))),
            _ => block.run(|| Ok(())).otherwise(|| Ok(())).unwrap(),
        }
    }
    assert_eq!(counters.enters.get(), 1);
    assert_eq!(counters.exits.get(), 1);
}

#[test]
fn failure_is_hidden_until_exit_then_replayed() {
    let counters = Rc::new(Counters::default());
    let block = open(&counters, true).with(|_| Err("disk full".into()));

    assert_eq!(counters.exits.get(), 0);
    assert_eq!(block.failure().map(warden_block::Failure::message), Some("disk full".into()));

    let failure = block.finish().unwrap_err();
    assert_eq!(failure.message(), "disk full");
    assert_eq!(counters.exits.get(), 1);
    assert!(counters.exit_saw_failure.get());
}

#[test]
fn consumed_failure_does_not_surface() {
    let counters = Rc::new(Counters::default());
    let block: ScopedBlock<Probe> = ScopedBlock::new(ProbeArgs::new(&counters, true).consuming());

    let result = block
        .with(|_| Err("swallowed".into()))
        .otherwise(|| Ok(()));

    assert!(result.is_ok());
    assert!(counters.exit_saw_failure.get());
}

#[test]
fn boolean_demotion_runs_alternate_without_replay() {
    let counters = Rc::new(Counters::default());
    let alternate_ran = Cell::new(false);

    let result = open(&counters, true)
        .with_check(|value| Ok(value.is_empty()))
        .else_()
        .otherwise(|| {
            alternate_ran.set(true);
            Ok(())
        });

    assert!(result.is_ok());
    assert!(alternate_ran.get());
    assert!(!counters.exit_saw_failure.get());
}

#[test]
fn successful_chain_skips_alternate() {
    let counters = Rc::new(Counters::default());
    let mut block = open(&counters, true);

    block.step(Step::run_check(|| Ok(true))).unwrap();
    assert_eq!(block.stage(), Stage::Else);
    assert!(block.is_ok());

    block
        .step(Step::run(|| panic!("alternate must not run")))
        .unwrap();
    assert_eq!(block.stage(), Stage::Done);
    assert_eq!(counters.exits.get(), 1);
}

#[test]
#[should_panic(expected = "already exited")]
fn attaching_after_done_is_a_contract_violation() {
    let counters = Rc::new(Counters::default());
    let mut block = open(&counters, true);
    block.step(Step::run(|| Ok(()))).unwrap();
    block.step(Step::run(|| Ok(()))).unwrap();
    let _ = block.step(Step::run(|| Ok(())));
}

#[test]
#[should_panic(expected = "primary body attached after the with stage")]
fn second_primary_body_is_a_contract_violation() {
    let counters = Rc::new(Counters::default());
    let _ = open(&counters, true).run(|| Ok(())).run(|| Ok(()));
}

#[test]
fn dropped_block_resumes_original_panic_after_exit() {
    let counters = Rc::new(Counters::default());
    let payload = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _block = open(&counters, true).run(|| std::panic::panic_any(41_u64));
    }))
    .unwrap_err();

    assert_eq!(payload.downcast_ref::<u64>(), Some(&41));
    assert_eq!(counters.exits.get(), 1);
}

#[test]
fn dropped_block_unwinds_with_raised_failure() {
    let counters = Rc::new(Counters::default());
    let payload = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _block = open(&counters, true).run(|| Err("late".into()));
    }))
    .unwrap_err();

    let failure = payload.downcast::<warden_block::Failure>().unwrap();
    assert_eq!(failure.message(), "late");
    assert_eq!(counters.exits.get(), 1);
}

#[test]
fn try_new_passes_construction_failure_through() {
    use warden_block::{Emplace, Holder};

    #[derive(Debug)]
    struct Refuses;

    impl Emplace for Refuses {
        type Args = ();

        fn emplace((): ()) -> Result<Self, warden_block::BoxError> {
            Err("refused".into())
        }
    }

    let failure = ScopedBlock::<Holder<Refuses>>::try_new(()).unwrap_err();
    assert_eq!(failure.message(), "refused");

    let block = ScopedBlock::<Holder<Refuses>>::new(());
    assert!(!block.is_ok());
    block.finish().unwrap();
}

proptest! {
    #[test]
    fn exit_runs_exactly_once(
        acquire in any::<bool>(),
        consume in any::<bool>(),
        body in prop_oneof![
            Just(Body::Succeed),
            Just(Body::ReturnFalse),
            Just(Body::Raise),
            Just(Body::Panic),
        ],
        with_alternate in any::<bool>(),
    ) {
        let counters = Rc::new(Counters::default());
        let alternate_runs = Cell::new(0);
        let mut args = ProbeArgs::new(&counters, acquire);
        args.consume = consume;

        let block: ScopedBlock<Probe> = ScopedBlock::new(args).with_check(|_| body.call());
        let result = if with_alternate {
            block.otherwise(|| {
                alternate_runs.set(alternate_runs.get() + 1);
                Ok(())
            })
        } else {
            block.finish()
        };

        prop_assert_eq!(counters.exits.get(), 1);
        let expect_failed = !acquire || body.fails();
        if with_alternate {
            prop_assert_eq!(alternate_runs.get(), u32::from(expect_failed));
        }
        let expect_replay = acquire && body.replays() && !consume;
        prop_assert_eq!(result.is_err(), expect_replay);
    }
}
