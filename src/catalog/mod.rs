//! Built-in demo targets (what `-t/--target` can name).
//!
//! parse_target -> TargetSpec { Example | Counter | Int | Nil }
//! TargetSpec::instantiate -> Instance, which lends out a `Target` for one call.
//!
use anyhow::{Result, bail};
use std::fmt;

use invoke::sample::{Counter, ExampleStruct};
use invoke::{MethodSet, Object, Target};

/// A parsed `--target` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSpec {
    /// The conformance record (`ExampleFunc`).
    Example,
    /// A stateful counter record.
    Counter,
    /// A plain integer; not a record, every call is rejected.
    Int,
    /// No object at all.
    Nil,
}

impl TargetSpec {
    pub const fn all() -> &'static [TargetSpec] {
        &[
            TargetSpec::Example,
            TargetSpec::Counter,
            TargetSpec::Int,
            TargetSpec::Nil,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            TargetSpec::Example => "example",
            TargetSpec::Counter => "counter",
            TargetSpec::Int => "int",
            TargetSpec::Nil => "nil",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TargetSpec::Example => "ExampleStruct record with the mixed-signature ExampleFunc",
            TargetSpec::Counter => "Counter record: Add, Get, Reset, Rename, Divide",
            TargetSpec::Int => "plain integer (not a record)",
            TargetSpec::Nil => "absent target",
        }
    }

    /// Method set of the record type behind this target, if it is a record.
    pub fn method_set(&self) -> Option<&'static MethodSet> {
        match self {
            TargetSpec::Example => ExampleStruct::default().method_set(),
            TargetSpec::Counter => Counter::default().method_set(),
            TargetSpec::Int | TargetSpec::Nil => None,
        }
    }

    /// Create a fresh object for this target.
    pub fn instantiate(&self) -> Instance {
        match self {
            TargetSpec::Example => Instance::Object(Box::new(ExampleStruct::default())),
            TargetSpec::Counter => Instance::Object(Box::new(Counter::default())),
            TargetSpec::Int => Instance::Object(Box::new(0_i64)),
            TargetSpec::Nil => Instance::Nil,
        }
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An owned demo object.
pub enum Instance {
    Object(Box<dyn Object>),
    Nil,
}

impl Instance {
    /// Borrow as a dispatch target (by reference).
    pub fn target(&mut self) -> Target<'_> {
        match self {
            Instance::Object(obj) => Target::Ref(obj.as_mut()),
            Instance::Nil => Target::Nil,
        }
    }
}

/// Parse a `--target` value (case-insensitive, surrounding whitespace ignored).
pub fn parse_target(raw: &str) -> Result<TargetSpec> {
    let norm = raw.trim().to_ascii_lowercase();
    if norm.is_empty() {
        bail!("Target string is empty");
    }
    match TargetSpec::all().iter().find(|t| t.name() == norm) {
        Some(spec) => Ok(*spec),
        None => {
            let known: Vec<&str> = TargetSpec::all().iter().map(|t| t.name()).collect();
            bail!("unknown target '{}' (known: {})", raw.trim(), known.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invoke::Kind;

    #[test]
    fn parse_known_targets() {
        assert_eq!(parse_target("example").unwrap(), TargetSpec::Example);
        assert_eq!(parse_target(" Counter ").unwrap(), TargetSpec::Counter);
        assert_eq!(parse_target("NIL").unwrap(), TargetSpec::Nil);
    }

    #[test]
    fn empty_target_rejected() {
        let err = parse_target("   ").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn unknown_target_lists_known_names() {
        let err = parse_target("server").unwrap_err().to_string();
        assert!(err.contains("unknown target 'server'"));
        assert!(err.contains("example, counter, int, nil"));
    }

    #[test]
    fn instances_match_specs() {
        let mut inst = TargetSpec::Int.instantiate();
        assert_eq!(inst.target().kind(), Some(Kind::Int));
        let mut inst = TargetSpec::Nil.instantiate();
        assert!(inst.target().is_nil());
        assert_eq!(TargetSpec::Counter.method_set().unwrap().len(), 5);
        assert!(TargetSpec::Int.method_set().is_none());
    }
}
