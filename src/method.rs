//! # Method tables
//!
//! Rust has no runtime reflection, so every record type carries an explicit
//! capability table: a [`MethodSet`] mapping method names to type-erased
//! [`Method`]s. A table is built once from ordinary Rust methods through
//! [`MethodSetBuilder::method`]; the parameter and result types of each entry
//! are read off the function's own generic signature, so the dispatcher can
//! use them as the decoding schema for raw payloads.
//!
//! ```
//! use std::sync::LazyLock;
//! use invoke::{Kind, MethodSet, Object};
//!
//! #[derive(Default)]
//! struct Greeter { greeted: u32 }
//!
//! impl Greeter {
//!     fn greet(&mut self, name: String) -> (String,) {
//!         self.greeted += 1;
//!         (format!("hello {name}"),)
//!     }
//! }
//!
//! static GREETER: LazyLock<MethodSet> = LazyLock::new(|| {
//!     MethodSet::builder::<Greeter>("Greeter").method("Greet", Greeter::greet).build()
//! });
//!
//! impl Object for Greeter {
//!     fn kind(&self) -> Kind { Kind::Record }
//!     fn method_set(&self) -> Option<&'static MethodSet> { Some(&*GREETER) }
//! }
//!
//! let mut g = Greeter::default();
//! let results = invoke::invoke(&mut g, "Greet", invoke::args!["bob".to_string()]);
//! assert_eq!(results.get(0).and_then(|v| v.downcast_ref::<String>()).unwrap(), "hello bob");
//! ```

use std::any::{Any, TypeId, type_name};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use crate::value::Value;

/// Static description of one parameter or result slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDesc {
    pub name: &'static str,
    pub id: TypeId,
}

impl TypeDesc {
    pub fn of<T: Any>() -> Self {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Declared parameter and result types of a method, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<TypeDesc>,
    pub results: Vec<TypeDesc>,
}

impl Signature {
    pub fn num_in(&self) -> usize {
        self.params.len()
    }

    pub fn num_out(&self) -> usize {
        self.results.len()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |slots: &[TypeDesc]| {
            slots
                .iter()
                .map(|t| t.name)
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(f, "({}) -> ({})", join(&self.params), join(&self.results))
    }
}

/// Why a set of arguments could not be bound to a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindFault {
    /// The receiver is not the record type the method belongs to.
    Receiver { expected: &'static str },
    /// Wrong number of arguments.
    Arity { given: usize, expected: usize },
    /// A positional argument whose runtime type differs from the declared one.
    Mismatch {
        slot: usize,
        expected: &'static str,
        supplied: &'static str,
    },
}

impl fmt::Display for BindFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Receiver { expected } => write!(f, "receiver is not a {expected}"),
            Self::Arity { given, expected } => {
                write!(f, "{given} arguments supplied, method takes {expected}")
            }
            Self::Mismatch {
                slot,
                expected,
                supplied,
            } => write!(
                f,
                "argument {slot} has type {supplied}, method expects {expected}"
            ),
        }
    }
}

type Invoker =
    Box<dyn Fn(&mut dyn Any, Vec<Value>) -> Result<Vec<Value>, BindFault> + Send + Sync>;
type SlotDecoder = fn(&RawValue) -> Result<Value, serde_json::Error>;

/// One callable entry of a method set.
pub struct Method {
    name: String,
    signature: Signature,
    decoders: Vec<SlotDecoder>,
    invoker: Invoker,
}

impl Method {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Decode a raw payload into the exact type declared for `slot`.
    pub fn decode_slot(&self, slot: usize, raw: &RawValue) -> Result<Value, serde_json::Error> {
        match self.decoders.get(slot) {
            Some(decode) => decode(raw),
            None => Err(serde::de::Error::custom(format!(
                "method {} has no parameter slot {slot}",
                self.name
            ))),
        }
    }

    /// Bind `args` positionally and call the method on `receiver`.
    ///
    /// The receiver must be the record type the set was built for; the
    /// dispatcher guarantees this by taking the set from the receiver itself.
    pub fn call(&self, receiver: &mut dyn Any, args: Vec<Value>) -> Result<Vec<Value>, BindFault> {
        (self.invoker)(receiver, args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish()
    }
}

/// Method table of one record type.
#[derive(Debug)]
pub struct MethodSet {
    type_name: &'static str,
    methods: BTreeMap<String, Method>,
}

impl MethodSet {
    pub fn builder<S: Any>(type_name: &'static str) -> MethodSetBuilder<S> {
        MethodSetBuilder {
            set: MethodSet {
                type_name,
                methods: BTreeMap::new(),
            },
            _receiver: PhantomData,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Method names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Method> {
        self.methods.values()
    }
}

pub struct MethodSetBuilder<S> {
    set: MethodSet,
    _receiver: PhantomData<fn(&mut S)>,
}

impl<S: Any> MethodSetBuilder<S> {
    /// Add `handler` under `name`. A later entry with the same name replaces
    /// the earlier one; overloading is not supported.
    pub fn method<H, Args>(mut self, name: &str, handler: H) -> Self
    where
        H: Handler<S, Args>,
    {
        let invoker: Invoker = Box::new(move |receiver: &mut dyn Any, args: Vec<Value>| {
            match receiver.downcast_mut::<S>() {
                Some(receiver) => handler.call(receiver, args),
                None => Err(BindFault::Receiver {
                    expected: type_name::<S>(),
                }),
            }
        });
        let method = Method {
            name: name.to_string(),
            signature: Signature {
                params: H::params(),
                results: H::results(),
            },
            decoders: H::decoders(),
            invoker,
        };
        self.set.methods.insert(name.to_string(), method);
        self
    }

    pub fn build(self) -> MethodSet {
        self.set
    }
}

/// Conversion of a method's return tuple into ordered result values.
pub trait IntoResults {
    fn descs() -> Vec<TypeDesc>;
    fn into_results(self) -> Vec<Value>;
}

impl IntoResults for () {
    fn descs() -> Vec<TypeDesc> {
        Vec::new()
    }

    fn into_results(self) -> Vec<Value> {
        Vec::new()
    }
}

macro_rules! impl_into_results {
    ($($ty:ident $idx:tt),+) => {
        impl<$($ty),+> IntoResults for ($($ty,)+)
        where
            $($ty: Any + Send + Serialize,)+
        {
            fn descs() -> Vec<TypeDesc> {
                vec![$(TypeDesc::of::<$ty>()),+]
            }

            fn into_results(self) -> Vec<Value> {
                vec![$(Value::serializable(self.$idx)),+]
            }
        }
    };
}

impl_into_results!(R0 0);
impl_into_results!(R0 0, R1 1);
impl_into_results!(R0 0, R1 1, R2 2);
impl_into_results!(R0 0, R1 1, R2 2, R3 3);
impl_into_results!(R0 0, R1 1, R2 2, R3 3, R4 4);
impl_into_results!(R0 0, R1 1, R2 2, R3 3, R4 4, R5 5);

/// A Rust function usable as a method of receiver type `S`.
///
/// Implemented for every `Fn(&mut S, A0, .., An) -> R` up to eight
/// parameters, where each parameter can be decoded from JSON and `R`
/// implements [`IntoResults`].
pub trait Handler<S, Args>: Send + Sync + 'static {
    fn params() -> Vec<TypeDesc>;
    fn results() -> Vec<TypeDesc>;
    fn decoders() -> Vec<SlotDecoder>;
    fn call(&self, receiver: &mut S, args: Vec<Value>) -> Result<Vec<Value>, BindFault>;
}

fn decode_as<T>(raw: &RawValue) -> Result<Value, serde_json::Error>
where
    T: DeserializeOwned + Any + Send,
{
    serde_json::from_str::<T>(raw.get()).map(Value::new)
}

fn bind<T: Any>(slot: usize, arg: Value) -> Result<T, BindFault> {
    arg.take::<T>().map_err(|arg| BindFault::Mismatch {
        slot,
        expected: type_name::<T>(),
        supplied: arg.type_name(),
    })
}

macro_rules! impl_handler {
    ($($ty:ident $var:ident),*) => {
        impl<S, F, R, $($ty,)*> Handler<S, ($($ty,)*)> for F
        where
            S: 'static,
            F: Fn(&mut S, $($ty),*) -> R + Send + Sync + 'static,
            R: IntoResults,
            $($ty: DeserializeOwned + Any + Send,)*
        {
            fn params() -> Vec<TypeDesc> {
                vec![$(TypeDesc::of::<$ty>()),*]
            }

            fn results() -> Vec<TypeDesc> {
                R::descs()
            }

            fn decoders() -> Vec<SlotDecoder> {
                vec![$(decode_as::<$ty> as SlotDecoder),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn call(&self, receiver: &mut S, args: Vec<Value>) -> Result<Vec<Value>, BindFault> {
                let given = args.len();
                let expected = <[&str]>::len(&[$(stringify!($var)),*]);
                if given != expected {
                    return Err(BindFault::Arity { given, expected });
                }
                let mut args = args.into_iter().enumerate();
                $(
                    let $var: $ty = match args.next() {
                        Some((slot, arg)) => bind::<$ty>(slot, arg)?,
                        None => return Err(BindFault::Arity { given, expected }),
                    };
                )*
                Ok((self)(receiver, $($var),*).into_results())
            }
        }
    };
}

impl_handler!();
impl_handler!(A0 a0);
impl_handler!(A0 a0, A1 a1);
impl_handler!(A0 a0, A1 a1, A2 a2);
impl_handler!(A0 a0, A1 a1, A2 a2, A3 a3);
impl_handler!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4);
impl_handler!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_handler!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_handler!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);

#[cfg(test)]
mod tests {
    use super::*;

    struct Acc {
        total: i64,
    }

    impl Acc {
        fn add(&mut self, n: i64) -> (i64,) {
            self.total += n;
            (self.total,)
        }

        fn clear(&mut self) {
            self.total = 0;
        }

        fn pair(&mut self, a: String, b: Vec<u8>) -> (usize, usize) {
            (a.len(), b.len())
        }
    }

    fn acc_set() -> MethodSet {
        MethodSet::builder::<Acc>("Acc")
            .method("Add", Acc::add)
            .method("Clear", Acc::clear)
            .method("Pair", Acc::pair)
            .build()
    }

    #[test]
    fn signatures_follow_rust_types() {
        let set = acc_set();
        assert_eq!(set.len(), 3);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["Add", "Clear", "Pair"]);

        let pair = set.get("Pair").unwrap().signature();
        assert_eq!(pair.num_in(), 2);
        assert_eq!(pair.params[0], TypeDesc::of::<String>());
        assert_eq!(pair.params[1], TypeDesc::of::<Vec<u8>>());
        assert_eq!(pair.results, vec![TypeDesc::of::<usize>(), TypeDesc::of::<usize>()]);

        let clear = set.get("Clear").unwrap().signature();
        assert_eq!((clear.num_in(), clear.num_out()), (0, 0));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let set = acc_set();
        assert!(set.get("Add").is_some());
        assert!(set.get("add").is_none());
    }

    #[test]
    fn call_binds_and_mutates_receiver() {
        let set = acc_set();
        let mut acc = Acc { total: 1 };
        let out = set
            .get("Add")
            .unwrap()
            .call(&mut acc, vec![Value::new(4_i64)])
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].downcast_ref::<i64>(), Some(&5));
        assert_eq!(acc.total, 5);
    }

    #[test]
    fn call_reports_mismatched_slot() {
        let set = acc_set();
        let mut acc = Acc { total: 0 };
        let fault = set
            .get("Pair")
            .unwrap()
            .call(&mut acc, vec![Value::new("a".to_string()), Value::new(3_i32)])
            .unwrap_err();
        assert_eq!(
            fault,
            BindFault::Mismatch {
                slot: 1,
                expected: type_name::<Vec<u8>>(),
                supplied: "i32",
            }
        );
    }

    #[test]
    fn call_rejects_foreign_receiver_and_bad_arity() {
        let set = acc_set();
        let add = set.get("Add").unwrap();

        let mut other = 0_u8;
        let fault = add.call(&mut other, vec![Value::new(1_i64)]).unwrap_err();
        assert!(matches!(fault, BindFault::Receiver { .. }));

        let mut acc = Acc { total: 0 };
        let fault = add.call(&mut acc, Vec::new()).unwrap_err();
        assert_eq!(fault, BindFault::Arity { given: 0, expected: 1 });
        assert!(add.decode_slot(3, &RawValue::from_string("1".into()).unwrap()).is_err());
    }

    #[test]
    fn decode_slot_uses_declared_type() {
        let set = acc_set();
        let pair = set.get("Pair").unwrap();
        let raw = RawValue::from_string("[1,2,3]".to_string()).unwrap();
        let v = pair.decode_slot(1, &raw).unwrap();
        assert_eq!(v.downcast_ref::<Vec<u8>>(), Some(&vec![1, 2, 3]));

        let bad = RawValue::from_string("\"nope\"".to_string()).unwrap();
        assert!(pair.decode_slot(1, &bad).is_err());
    }

    #[test]
    fn signature_display() {
        let set = acc_set();
        assert_eq!(set.get("Add").unwrap().signature().to_string(), "(i64) -> (i64)");
    }
}
