//! Invoke: call methods on record objects by name.
//!
//! A record type exposes a [`MethodSet`] through the [`Object`] trait. The
//! dispatcher looks a method up by its exact name, checks the argument count
//! against the declared signature, binds the arguments and calls it:
//!
//!   invoke(target, name, args)        plain, already typed [`Value`]s
//!   invoke_raw(target, name, raw)     one JSON payload per parameter, decoded
//!                                     into the type the method declares
//!
//! Both return [`Results`]: the method's return values in declared order, or
//! a single [`InvokeError`] element when anything fails, including a panic in
//! the method body.

pub mod dispatch;
pub mod error;
pub mod fault;
pub mod method;
pub mod object;
pub mod sample;
pub mod value;

pub use dispatch::{Results, invoke, invoke_raw};
pub use error::InvokeError;
pub use method::{
    BindFault, Handler, IntoResults, Method, MethodSet, MethodSetBuilder, Signature, TypeDesc,
};
pub use object::{Kind, Object, Target};
pub use value::Value;
