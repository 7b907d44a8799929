#![allow(dead_code)]

use overcast::{Candidate, Param, Value};
use std::f64::consts::PI;

// ============================================================================
// Test Shapes
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    pub radius: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Square {
    pub side: f64,
}

pub const SCOPE: &str = "tests::geometry";

// ============================================================================
// Test Candidates
// ============================================================================

pub fn area_circle() -> Candidate {
    Candidate::builder("area")
        .scope(SCOPE)
        .param(Param::positional("shape").of::<Circle>())
        .body(|bound| {
            let circle = bound.get::<Circle>("shape")?;
            Ok(Value::new(PI * circle.radius * circle.radius))
        })
}

pub fn area_square() -> Candidate {
    Candidate::builder("area")
        .scope(SCOPE)
        .param(Param::positional("shape").of::<Square>())
        .body(|bound| {
            let square = bound.get::<Square>("shape")?;
            Ok(Value::new(square.side * square.side))
        })
}

pub fn area_of(value: &Value) -> f64 {
    *value.downcast_ref::<f64>().expect("area is an f64")
}

/// Install a test subscriber printing engine events.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::TRACE)
        .with_test_writer()
        .try_init();
}
