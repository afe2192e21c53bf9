//! Dispatch targets.
//!
//! `Object` is the runtime view the dispatcher has of whatever sits behind a
//! target: its shape (`Kind`) and, for records, the method set of its type.
//! `Target` adds the two things a bare reference cannot express in Rust:
//! absence, and value (rather than reference) semantics.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::method::MethodSet;

/// Runtime shape of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Unit,
    Bool,
    Int,
    Uint,
    Float,
    Char,
    String,
    Slice,
    Map,
    Record,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Unit => "unit",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::Char => "char",
            Kind::String => "string",
            Kind::Slice => "slice",
            Kind::Map => "map",
            Kind::Record => "record",
        };
        f.write_str(s)
    }
}

/// Anything that can be handed to the dispatcher as a target.
///
/// Record types return `Kind::Record` and the method set of their type,
/// usually a `LazyLock` static; everything else reports its own kind and no
/// methods.
pub trait Object: std::any::Any + Send {
    fn kind(&self) -> Kind;

    fn method_set(&self) -> Option<&'static MethodSet> {
        None
    }
}

macro_rules! plain_object {
    ($kind:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Object for $ty {
                fn kind(&self) -> Kind {
                    $kind
                }
            }
        )+
    };
}

plain_object!(Kind::Unit => ());
plain_object!(Kind::Bool => bool);
plain_object!(Kind::Int => i8, i16, i32, i64, i128, isize);
plain_object!(Kind::Uint => u8, u16, u32, u64, u128, usize);
plain_object!(Kind::Float => f32, f64);
plain_object!(Kind::Char => char);
plain_object!(Kind::String => String, &'static str);

impl<T: Send + 'static> Object for Vec<T> {
    fn kind(&self) -> Kind {
        Kind::Slice
    }
}

impl<K: Send + 'static, V: Send + 'static, H: Send + 'static> Object for HashMap<K, V, H> {
    fn kind(&self) -> Kind {
        Kind::Map
    }
}

impl<K: Send + 'static, V: Send + 'static> Object for BTreeMap<K, V> {
    fn kind(&self) -> Kind {
        Kind::Map
    }
}

/// The receiver argument of a dispatch call.
pub enum Target<'a> {
    /// No object at all.
    Nil,
    /// An object passed by value. Methods can only be invoked through a reference.
    Value(Box<dyn Object>),
    /// An object passed by reference.
    Ref(&'a mut dyn Object),
}

impl<'a> Target<'a> {
    pub fn nil() -> Self {
        Target::Nil
    }

    pub fn by_value<T: Object>(value: T) -> Self {
        Target::Value(Box::new(value))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Target::Nil)
    }

    /// Kind of the object behind the target, if any.
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Target::Nil => None,
            Target::Value(obj) => Some(obj.kind()),
            Target::Ref(obj) => Some(obj.kind()),
        }
    }
}

impl<'a, T: Object> From<&'a mut T> for Target<'a> {
    fn from(obj: &'a mut T) -> Self {
        Target::Ref(obj)
    }
}

impl<'a, T: Object> From<Option<&'a mut T>> for Target<'a> {
    fn from(obj: Option<&'a mut T>) -> Self {
        match obj {
            Some(obj) => Target::Ref(obj),
            None => Target::Nil,
        }
    }
}

impl<'a> From<&'a mut dyn Object> for Target<'a> {
    fn from(obj: &'a mut dyn Object) -> Self {
        Target::Ref(obj)
    }
}

impl fmt::Debug for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Nil => f.write_str("Target::Nil"),
            Target::Value(obj) => write!(f, "Target::Value({})", obj.kind()),
            Target::Ref(obj) => write!(f, "Target::Ref({})", obj.kind()),
        }
    }
}
