//! Dispatch behaviour through the engine.

use overcast::{
    Candidate, DiscoveryError, DispatchError, Engine, NoSiblings, Param, SiblingSource, TypeDesc,
    Value, args, dispatcher, register,
    testing::{CallLog, CountingSource, StaticSource, recording},
};
use std::{
    sync::{Arc, Barrier},
    thread,
    time::Duration,
};

mod common;
use common::{Circle, Square, area_circle, area_of, area_square, init_tracing};

#[test]
fn test_disjoint_dispatch() {
    init_tracing();
    let engine = Engine::new();
    let area = engine
        .operation(&Arc::new(area_circle()))
        .overload(area_square())
        .finish();

    let circle = engine.dispatch(&area, args![Circle { radius: 1.0 }]).unwrap();
    assert!((area_of(&circle.ready().unwrap()) - std::f64::consts::PI).abs() < 1e-9);

    let square = engine.dispatch(&area, args![Square { side: 2.0 }]).unwrap();
    assert_eq!(area_of(&square.ready().unwrap()), 4.0);
}

#[test]
fn test_order_is_the_tie_break() {
    let log = CallLog::new();
    let engine = Engine::new();
    let entry = engine
        .operation(&Arc::new(recording(
            "describe",
            "int",
            &log,
            [Param::positional("x").of::<i32>()],
        )))
        .overload(recording(
            "describe",
            "any",
            &log,
            [Param::positional("x")],
        ))
        .finish();

    engine.dispatch(&entry, args![1]).unwrap();
    engine.dispatch(&entry, args!["text"]).unwrap();
    assert_eq!(log.entries(), ["int", "any"]);

    let log = CallLog::new();
    let reversed = engine
        .operation(&Arc::new(recording("describe", "any", &log, [Param::positional("x")])))
        .overload(recording(
            "describe",
            "int",
            &log,
            [Param::positional("x").of::<i32>()],
        ))
        .finish();

    engine.dispatch(&reversed, args![1]).unwrap();
    assert_eq!(log.entries(), ["any"]);
}

#[test]
fn test_unregistered_fails_fast() {
    let source = CountingSource::new(NoSiblings);
    let calls = source.counter();
    let engine = Arc::new(Engine::builder().source(source).build());
    let entry = Arc::new(area_circle());

    let call = dispatcher(&engine, &entry);
    match call.call(args![Circle { radius: 1.0 }]) {
        Err(DispatchError::UnregisteredOperation { operation, id }) => {
            assert_eq!(operation, "tests::geometry::area");
            assert_eq!(id, entry.id());
        }
        other => panic!("expected UnregisteredOperation, got {other:?}"),
    }
    assert_eq!(calls.get(), 0);
    assert!(engine.is_empty());

    let inert = register(&engine, &entry);
    assert!(inert.call(args![1, 2, 3]).is_unit());
    assert!(call.call(args![Circle { radius: 1.0 }]).is_ok());
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_no_match_names_operation_and_arguments() {
    let engine = Engine::new();
    let area = engine
        .operation(&Arc::new(area_circle()))
        .overload(area_square())
        .finish();

    let err = engine.dispatch(&area, args![7_i32]).unwrap_err();
    match &err {
        DispatchError::NoMatchingCandidate {
            operation,
            received,
            tried,
        } => {
            assert_eq!(operation, "tests::geometry::area");
            assert_eq!(received, "(i32)");
            assert_eq!(*tried, 2);
        }
        other => panic!("expected NoMatchingCandidate, got {other:?}"),
    }
    assert!(err.to_string().contains("(i32)"));

    let err = engine
        .dispatch(&area, args![Circle { radius: 1.0 }; scale = 2.0])
        .unwrap_err();
    assert!(err.to_string().contains("(Circle, scale=f64)"));
}

#[test]
fn test_discovery_runs_once() {
    let source = CountingSource::new(StaticSource::new([Arc::new(area_square())]));
    let calls = source.counter();
    let engine = Engine::builder().source(source).build();
    let area = Arc::new(area_circle());
    engine.register(&area);

    assert_eq!(engine.is_discovered(&area), Some(false));
    for _ in 0..3 {
        engine.dispatch(&area, args![Square { side: 1.0 }]).unwrap();
    }

    assert_eq!(calls.get(), 1);
    assert_eq!(engine.is_discovered(&area), Some(true));
    assert_eq!(engine.candidates(&area).map(|c| c.len()), Some(2));
}

/// Holds every caller inside discovery long enough for them to overlap.
struct SlowSource(StaticSource);

impl SiblingSource for SlowSource {
    fn siblings(&self, entry: &Candidate) -> Result<Vec<Arc<Candidate>>, DiscoveryError> {
        thread::sleep(Duration::from_millis(50));
        self.0.siblings(entry)
    }
}

#[test]
fn test_concurrent_first_dispatch_discovers_once() {
    const THREADS: usize = 8;
    let source = CountingSource::new(SlowSource(StaticSource::new([Arc::new(area_square())])));
    let calls = source.counter();
    let engine = Arc::new(Engine::builder().source(source).build());
    let area = Arc::new(area_circle());
    engine.register(&area);
    let start = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let area = Arc::clone(&area);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                let args = if i % 2 == 0 {
                    args![Circle { radius: 1.0 }]
                } else {
                    args![Square { side: 1.0 }]
                };
                start.wait();
                engine.dispatch(&area, args).map(|outcome| outcome.is_pending())
            })
        })
        .collect();

    for handle in handles {
        assert!(!handle.join().unwrap().unwrap());
    }
    assert_eq!(calls.get(), 1);
    assert_eq!(engine.candidates(&area).map(|c| c.len()), Some(2));
}

#[test]
fn test_same_name_in_other_scope_does_not_collide() {
    let engine = Engine::new();
    let geometry = Arc::new(area_circle());
    let other = Arc::new(
        Candidate::builder("area")
            .scope("tests::other")
            .param(Param::positional("x"))
            .body(|_| Ok(Value::new("other"))),
    );
    engine.register(&geometry);
    engine.register(&other);
    assert_eq!(engine.len(), 2);

    let out = engine.dispatch(&other, args![Circle { radius: 1.0 }]).unwrap();
    assert_eq!(out.ready().unwrap().downcast_ref::<&str>(), Some(&"other"));
}

#[test]
fn test_keywords_defaults_and_rest() {
    let engine = Engine::new();
    let entry = Arc::new(
        Candidate::builder("sum")
            .param(Param::positional("first").of::<i64>())
            .param(Param::var_positional("rest").of::<i64>())
            .param(Param::keyword_only("scale").of::<i64>().with_default(1_i64))
            .body(|bound| {
                let first = *bound.get::<i64>("first")?;
                let rest: i64 = bound
                    .rest("rest")
                    .iter()
                    .filter_map(|v| v.downcast_ref::<i64>())
                    .sum();
                let scale = *bound.get::<i64>("scale")?;
                Ok(Value::new((first + rest) * scale))
            }),
    );
    engine.register(&entry);

    let sum = |args: overcast::Args| {
        *engine
            .dispatch(&entry, args)
            .unwrap()
            .ready()
            .unwrap()
            .downcast_ref::<i64>()
            .unwrap()
    };
    assert_eq!(sum(args![1_i64]), 1);
    assert_eq!(sum(args![1_i64, 2_i64, 3_i64]), 6);
    assert_eq!(sum(args![1_i64, 2_i64; scale = 10_i64]), 30);

    assert!(matches!(
        engine.dispatch(&entry, args![1_i64, "two"]),
        Err(DispatchError::NoMatchingCandidate { .. })
    ));
}

#[test]
fn test_union_and_sequence_descriptors() {
    let engine = Engine::new();
    let entry = Arc::new(
        Candidate::builder("total")
            .param(Param::positional("shapes").typed(TypeDesc::seq_of(
                TypeDesc::of::<Circle>() | TypeDesc::of::<Square>(),
            )))
            .body(|bound| {
                let shapes = bound.require("shapes")?.as_seq().map_or(0, |s| s.len());
                Ok(Value::new(shapes))
            }),
    );
    engine.register(&entry);

    let shapes = Value::seq(vec![
        Value::new(Circle { radius: 1.0 }),
        Value::new(Square { side: 1.0 }),
    ]);
    let out = engine.dispatch(&entry, args![shapes]).unwrap();
    assert_eq!(out.ready().unwrap().downcast_ref::<usize>(), Some(&2));

    let mixed = Value::seq(vec![Value::new(Circle { radius: 1.0 }), Value::new(3_u8)]);
    assert!(engine.dispatch(&entry, args![mixed]).is_err());
}

#[test]
fn test_candidate_errors_pass_through() {
    #[derive(Debug, thiserror::Error)]
    #[error("negative radius {0}")]
    struct NegativeRadius(f64);

    let engine = Engine::new();
    let entry = Arc::new(
        Candidate::builder("area")
            .param(Param::positional("shape").of::<Circle>())
            .body(|bound| {
                let circle = bound.get::<Circle>("shape")?;
                Err(NegativeRadius(circle.radius).into())
            }),
    );
    engine.register(&entry);

    let err = engine
        .dispatch(&entry, args![Circle { radius: -1.0 }])
        .unwrap_err()
        .into_candidate_error()
        .unwrap();
    assert!(err.downcast_ref::<NegativeRadius>().is_some());
    assert_eq!(err.to_string(), "negative radius -1");
}
