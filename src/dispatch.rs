//! # Dispatcher
//!
//! Late-bound method invocation on a record object.
//!
//! Both entry points share the same gates, each returning immediately:
//!
//! 1. target is absent            -> `NilTarget`
//! 2. target is not a reference to a record -> `InvalidTargetShape`
//! 3. no method with that exact name        -> `MethodNotFound`
//! 4. argument count != parameter count     -> `ArityMismatch`
//!
//! then bind the arguments (as given, or decoded from raw JSON payloads into
//! the declared parameter types), call the method and return its results in
//! declared order. The gates, binding and call all run inside the fault
//! boundary, so a panic in an `Object` impl or a `Deserialize` impl is
//! recovered like a panic in the method body. Every failure comes back as a
//! single-element [`Results`] holding an [`InvokeError`]; nothing unwinds past
//! the dispatcher.

use serde_json::value::RawValue;
use tracing::{debug, trace, warn};

use crate::error::InvokeError;
use crate::fault;
use crate::method::{BindFault, Method};
use crate::object::{Kind, Object, Target};
use crate::value::Value;

/// Ordered results of one invocation, or a single error descriptor.
#[derive(Debug)]
pub struct Results(Vec<Value>);

impl Results {
    fn ok(values: Vec<Value>) -> Self {
        Self(values)
    }

    fn failure(err: InvokeError) -> Self {
        Self(vec![Value::new(err)])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    /// The error descriptor, when this is a failure reply.
    ///
    /// A reply is a failure only if it has exactly one element and that
    /// element is an [`InvokeError`].
    pub fn error(&self) -> Option<&InvokeError> {
        match self.0.as_slice() {
            [only] => only.downcast_ref::<InvokeError>(),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }

    /// Split into the result values or the error descriptor.
    pub fn into_result(self) -> Result<Vec<Value>, InvokeError> {
        match <[Value; 1]>::try_from(self.0) {
            Ok([only]) => only.take::<InvokeError>().map_or_else(|v| Ok(vec![v]), Err),
            Err(values) => Ok(values),
        }
    }

    /// Raw positional values, error descriptor included.
    pub fn into_values(self) -> Vec<Value> {
        self.0
    }

    /// JSON rendering of the result values. Values that cannot be rendered
    /// (only possible for error descriptors) become their display text.
    pub fn to_json(&self) -> serde_json::Value {
        let items = self
            .0
            .iter()
            .map(|v| match (v.to_json(), v.downcast_ref::<InvokeError>()) {
                (Some(json), _) => json,
                (None, Some(err)) => serde_json::Value::String(err.to_string()),
                (None, None) => serde_json::Value::String(format!("<{}>", v.type_name())),
            })
            .collect();
        serde_json::Value::Array(items)
    }
}

impl IntoIterator for Results {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Invoke `name` on `target` with already typed arguments.
///
/// Arguments are bound positionally without conversion; a value whose type
/// differs from the declared parameter type is reported as a recovered fault.
pub fn invoke<'a>(target: impl Into<Target<'a>>, name: &str, args: Vec<Value>) -> Results {
    let target = target.into();
    debug!(method = name, args = args.len(), "invoke");

    guarded("invoke", name, move || {
        let (receiver, method) = match resolve(target, name, args.len()) {
            Ok(found) => found,
            Err(err) => return reject(err),
        };
        call(receiver, method, args, "invoke")
    })
}

/// Invoke `name` on `target`, decoding each raw payload into the type the
/// method declares for that slot.
///
/// Decoding stops at the first failing slot; the method is not called.
pub fn invoke_raw<'a>(
    target: impl Into<Target<'a>>,
    name: &str,
    payloads: &[Box<RawValue>],
) -> Results {
    let target = target.into();
    debug!(method = name, payloads = payloads.len(), "invoke_raw");

    guarded("invoke_raw", name, move || {
        let (receiver, method) = match resolve(target, name, payloads.len()) {
            Ok(found) => found,
            Err(err) => return reject(err),
        };

        let mut args = Vec::with_capacity(payloads.len());
        for (slot, raw) in payloads.iter().enumerate() {
            trace!(
                method = name,
                slot,
                param = %method.signature().params[slot],
                "decoding payload"
            );
            match method.decode_slot(slot, raw) {
                Ok(value) => args.push(value),
                Err(source) => {
                    return reject(InvokeError::Decode {
                        slot,
                        payload: raw.get().to_string(),
                        method: name.to_string(),
                        source,
                    });
                }
            }
        }

        call(receiver, method, args, "invoke_raw")
    })
}

/// Run one whole invocation (gates, binding, call) inside the fault boundary.
fn guarded(op: &'static str, name: &str, f: impl FnOnce() -> Results) -> Results {
    match fault::guard(f) {
        Ok(results) => results,
        Err(caught) => {
            let detail = match &caught.location {
                Some(loc) => format!("{} at {}", caught.message, loc),
                None => caught.message,
            };
            warn!(method = name, panic = %detail, "recovered from panic");
            Results::failure(InvokeError::Panic {
                op,
                detail,
                backtrace: caught.backtrace,
            })
        }
    }
}

/// Gates 1-4: target present, reference to a record, method exists, arity.
fn resolve<'a>(
    target: Target<'a>,
    name: &str,
    given: usize,
) -> Result<(&'a mut dyn Object, &'static Method), InvokeError> {
    let receiver = match target {
        Target::Nil => return Err(InvokeError::NilTarget),
        Target::Value(obj) => {
            return Err(InvokeError::InvalidTargetShape {
                kind: obj.kind(),
                by_ref: false,
            });
        }
        Target::Ref(obj) => obj,
    };

    let kind = receiver.kind();
    if kind != Kind::Record {
        return Err(InvokeError::InvalidTargetShape { kind, by_ref: true });
    }

    let method = match receiver.method_set() {
        Some(set) => set.get(name).ok_or_else(|| InvokeError::MethodNotFound {
            name: name.to_string(),
            type_name: set.type_name(),
            num_methods: set.len(),
        })?,
        None => {
            return Err(InvokeError::MethodNotFound {
                name: name.to_string(),
                type_name: "record",
                num_methods: 0,
            });
        }
    };

    let expected = method.signature().num_in();
    if given != expected {
        return Err(InvokeError::ArityMismatch { given, expected });
    }
    Ok((receiver, method))
}

/// Bind the arguments and call; a binding failure becomes a fault descriptor.
fn call(receiver: &mut dyn Object, method: &Method, args: Vec<Value>, op: &'static str) -> Results {
    match method.call(receiver, args) {
        Ok(values) => Results::ok(values),
        Err(bind) => {
            let detail = match &bind {
                BindFault::Mismatch { .. } => format!("{} in call to {}", bind, method.name()),
                _ => bind.to_string(),
            };
            warn!(method = method.name(), %bind, "argument binding failed");
            Results::failure(InvokeError::Fault {
                op,
                detail,
                backtrace: fault::capture_here(),
            })
        }
    }
}

fn reject(err: InvokeError) -> Results {
    debug!(code = err.code(), error = %err, "invocation rejected");
    Results::failure(err)
}
