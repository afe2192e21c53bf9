//! Type-erased argument and result values.
//!
//! A `Value` owns exactly one concrete Rust value behind `dyn Any` and keeps
//! the static type name around for diagnostics. Results produced by a method
//! additionally remember how to render themselves as JSON.

use std::any::{Any, TypeId, type_name};
use std::fmt;

use serde::Serialize;

type JsonRender = fn(&(dyn Any + Send)) -> Option<serde_json::Value>;

/// An owned, dynamically typed value passed to or returned from a method.
pub struct Value {
    inner: Box<dyn Any + Send>,
    type_name: &'static str,
    render: Option<JsonRender>,
}

impl Value {
    /// Wrap any owned value. Used for plain (already typed) arguments.
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: type_name::<T>(),
            render: None,
        }
    }

    /// Wrap a value that can also be rendered as JSON (method results).
    pub fn serializable<T: Any + Send + Serialize>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: type_name::<T>(),
            render: Some(render_json::<T>),
        }
    }

    /// Rust type name of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_id(&self) -> TypeId {
        (*self.inner).type_id()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Move the wrapped value out. On a type mismatch the value is handed back.
    pub fn take<T: Any>(self) -> Result<T, Value> {
        let Value {
            inner,
            type_name,
            render,
        } = self;
        inner.downcast::<T>().map(|b| *b).map_err(|inner| Value {
            inner,
            type_name,
            render,
        })
    }

    /// JSON rendering, if the value was built with [`Value::serializable`].
    pub fn to_json(&self) -> Option<serde_json::Value> {
        self.render.and_then(|render| render(&*self.inner))
    }
}

fn render_json<T: Any + Serialize>(value: &(dyn Any + Send)) -> Option<serde_json::Value> {
    value
        .downcast_ref::<T>()
        .and_then(|v| serde_json::to_value(v).ok())
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            Some(json) => write!(f, "Value<{}>({})", self.type_name, json),
            None => write!(f, "Value<{}>", self.type_name),
        }
    }
}

/// Build a `Vec<Value>` of plain arguments.
///
/// ```
/// let args = invoke::args![1_i64, String::from("x")];
/// assert_eq!(args.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => { ::std::vec::Vec::<$crate::Value>::new() };
    ($($arg:expr),+ $(,)?) => { ::std::vec![$($crate::Value::new($arg)),+] };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_returns_value_on_mismatch() {
        let v = Value::new(7_i64);
        let back = v.take::<String>().unwrap_err();
        assert_eq!(back.type_name(), "i64");
        assert_eq!(back.take::<i64>().unwrap(), 7);
    }

    #[test]
    fn plain_values_do_not_render() {
        assert!(Value::new(1_u8).to_json().is_none());
        assert_eq!(
            Value::serializable(vec![1, 2]).to_json(),
            Some(serde_json::json!([1, 2]))
        );
    }

    #[test]
    fn args_macro_wraps_each_expression() {
        let args = args![1_i64, "s".to_string(), vec![1_i64]];
        assert!(args[0].is::<i64>());
        assert!(args[1].is::<String>());
        assert!(args[2].is::<Vec<i64>>());
        assert!(args![].is_empty());
    }
}
