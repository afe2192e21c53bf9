//! Sample record types.
//!
//! `ExampleStruct` is the conformance record: its `ExampleFunc` method has the
//! mixed signature `(i64, String, Vec<i64>, Nanos) -> (i64, i64, Option<String>)`.
//! `Counter` is a small stateful record used by the CLI and the tests.

use std::sync::LazyLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::method::MethodSet;
use crate::object::{Kind, Object};

/// A signed duration in nanoseconds, carried on the wire as a plain integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nanos(pub i64);

impl Nanos {
    pub fn as_nanos(&self) -> i64 {
        self.0
    }
}

impl From<Duration> for Nanos {
    /// Saturates at `i64::MAX` (about 292 years).
    fn from(d: Duration) -> Self {
        Nanos(i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
    }
}

#[derive(Debug, Default)]
pub struct ExampleStruct {
    pub member: i64,
}

impl ExampleStruct {
    pub fn example_func(
        &mut self,
        _int_arg: i64,
        _string_arg: String,
        _slice_arg: Vec<i64>,
        dur: Nanos,
    ) -> (i64, i64, Option<String>) {
        (100, dur.as_nanos(), None)
    }
}

static EXAMPLE_METHODS: LazyLock<MethodSet> = LazyLock::new(|| {
    MethodSet::builder::<ExampleStruct>("ExampleStruct")
        .method("ExampleFunc", ExampleStruct::example_func)
        .build()
});

impl Object for ExampleStruct {
    fn kind(&self) -> Kind {
        Kind::Record
    }

    fn method_set(&self) -> Option<&'static MethodSet> {
        Some(&*EXAMPLE_METHODS)
    }
}

/// Running total with a label.
#[derive(Debug, Default)]
pub struct Counter {
    pub count: i64,
    pub label: String,
}

impl Counter {
    fn add(&mut self, by: i64) -> (i64,) {
        self.count += by;
        (self.count,)
    }

    fn get(&mut self) -> (i64,) {
        (self.count,)
    }

    fn reset(&mut self) {
        self.count = 0;
    }

    fn rename(&mut self, label: String) -> (String, usize) {
        let old = std::mem::replace(&mut self.label, label);
        (old, self.label.len())
    }

    // Integer division; a zero divisor panics.
    fn divide(&mut self, divisor: i64) -> (i64,) {
        self.count /= divisor;
        (self.count,)
    }
}

static COUNTER_METHODS: LazyLock<MethodSet> = LazyLock::new(|| {
    MethodSet::builder::<Counter>("Counter")
        .method("Add", Counter::add)
        .method("Get", Counter::get)
        .method("Reset", Counter::reset)
        .method("Rename", Counter::rename)
        .method("Divide", Counter::divide)
        .build()
});

impl Object for Counter {
    fn kind(&self) -> Kind {
        Kind::Record
    }

    fn method_set(&self) -> Option<&'static MethodSet> {
        Some(&*COUNTER_METHODS)
    }
}
