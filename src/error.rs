use std::fmt;

use crate::object::Kind;

/// Error descriptor returned in place of a method's results.
#[derive(Debug)]
pub enum InvokeError {
    /// No target object was supplied.
    NilTarget,
    /// The target is not a reference to a record.
    InvalidTargetShape { kind: Kind, by_ref: bool },
    /// The record type has no method with this exact name.
    MethodNotFound {
        name: String,
        type_name: &'static str,
        num_methods: usize,
    },
    /// Argument count differs from the declared parameter count.
    ArityMismatch { given: usize, expected: usize },
    /// A raw payload could not be decoded into its slot's declared type.
    Decode {
        slot: usize,
        payload: String,
        method: String,
        source: serde_json::Error,
    },
    /// An argument could not be bound to its parameter.
    Fault {
        op: &'static str,
        detail: String,
        backtrace: String,
    },
    /// A panic raised anywhere in the invocation: target inspection, payload
    /// decoding or the method body.
    Panic {
        op: &'static str,
        detail: String,
        backtrace: String,
    },
}

impl InvokeError {
    /// Short, stable name of the variant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NilTarget => "nil_target",
            Self::InvalidTargetShape { .. } => "invalid_target_shape",
            Self::MethodNotFound { .. } => "method_not_found",
            Self::ArityMismatch { .. } => "arity_mismatch",
            Self::Decode { .. } => "decode_failure",
            Self::Fault { .. } | Self::Panic { .. } => "invocation_fault",
        }
    }
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NilTarget => write!(f, "invoke: nil target passed for invocation"),
            Self::InvalidTargetShape {
                kind,
                by_ref: false,
            } => write!(f, "invoke: target is not a reference : {}", kind),
            Self::InvalidTargetShape { kind, by_ref: true } => {
                write!(f, "invoke: target is a reference to {}, not to a record", kind)
            }
            Self::MethodNotFound {
                name,
                type_name,
                num_methods,
            } => write!(
                f,
                "invoke: could not find method {} for type {} num_methods={}",
                name, type_name, num_methods
            ),
            Self::ArityMismatch { given, expected } => write!(
                f,
                "invoke: mismatch in number of params {} and func inputs {}",
                given, expected
            ),
            Self::Decode {
                slot,
                payload,
                method,
                source,
            } => write!(
                f,
                "invoke: error decoding param[{}] {} for func {} :: {}",
                slot, payload, method, source
            ),
            Self::Fault {
                op,
                detail,
                backtrace,
            } => write!(
                f,
                "invoke: recovered from fault in {} :: {}\n{}",
                op, detail, backtrace
            ),
            Self::Panic {
                op,
                detail,
                backtrace,
            } => write!(
                f,
                "invoke: recovered from panic in {} :: {}\n{}",
                op, detail, backtrace
            ),
        }
    }
}

impl std::error::Error for InvokeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_diagnostics() {
        let e = InvokeError::MethodNotFound {
            name: "Nope".into(),
            type_name: "Thing",
            num_methods: 3,
        };
        assert_eq!(
            e.to_string(),
            "invoke: could not find method Nope for type Thing num_methods=3"
        );

        let e = InvokeError::ArityMismatch {
            given: 1,
            expected: 4,
        };
        assert!(e.to_string().contains("params 1 and func inputs 4"));

        let e = InvokeError::InvalidTargetShape {
            kind: Kind::Int,
            by_ref: false,
        };
        assert!(e.to_string().ends_with(": int"));
        assert_eq!(e.code(), "invalid_target_shape");
    }

    #[test]
    fn decode_exposes_source() {
        use std::error::Error;
        let source = serde_json::from_str::<i64>("\"x\"").unwrap_err();
        let e = InvokeError::Decode {
            slot: 2,
            payload: "\"x\"".into(),
            method: "F".into(),
            source,
        };
        assert!(e.to_string().starts_with("invoke: error decoding param[2] \"x\" for func F"));
        assert!(e.source().is_some());
    }

    #[test]
    fn panic_and_bind_faults_use_distinct_markers() {
        let bind = InvokeError::Fault {
            op: "invoke",
            detail: "argument 0 has type i64, method expects alloc::string::String".into(),
            backtrace: "bt".into(),
        };
        let panic = InvokeError::Panic {
            op: "invoke_raw",
            detail: "boom at src/x.rs:1:1".into(),
            backtrace: "bt".into(),
        };
        assert!(bind.to_string().starts_with("invoke: recovered from fault in invoke :: "));
        assert!(panic.to_string().starts_with("invoke: recovered from panic in invoke_raw :: boom"));
        assert!(panic.to_string().ends_with("\nbt"));
        assert_eq!(bind.code(), panic.code());
    }
}
