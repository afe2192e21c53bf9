//! Fault boundary around one invocation.
//!
//! `guard` runs a closure under `catch_unwind`. While a guard is active on the
//! current thread, a chained panic hook records the panic message, location
//! and a backtrace taken at the panic site; outside a guard the previously
//! installed hook runs unchanged.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

/// A panic intercepted by [`guard`].
#[derive(Debug, Clone)]
pub struct Caught {
    pub message: String,
    pub location: Option<String>,
    pub backtrace: String,
}

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST: RefCell<Option<Caught>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if DEPTH.with(Cell::get) == 0 {
                previous(info);
                return;
            }
            let caught = Caught {
                message: payload_message(info.payload()),
                location: info.location().map(ToString::to_string),
                backtrace: Backtrace::force_capture().to_string(),
            };
            LAST.with(|slot| *slot.borrow_mut() = Some(caught));
        }));
    });
}

/// Run `f`, converting a panic into [`Caught`].
///
/// The closure is treated as unwind safe: state it mutated before panicking
/// is left as is.
pub fn guard<R>(f: impl FnOnce() -> R) -> Result<R, Caught> {
    install_hook();
    LAST.with(|slot| slot.borrow_mut().take());
    DEPTH.with(|d| d.set(d.get() + 1));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    DEPTH.with(|d| d.set(d.get() - 1));

    outcome.map_err(|payload| {
        // The hook may have been replaced after installation; fall back to
        // the payload and a backtrace of the boundary itself.
        LAST.with(|slot| slot.borrow_mut().take()).unwrap_or_else(|| Caught {
            message: payload_message(&*payload),
            location: None,
            backtrace: Backtrace::force_capture().to_string(),
        })
    })
}

/// Backtrace of the caller, for faults detected without unwinding.
pub fn capture_here() -> String {
    Backtrace::force_capture().to_string()
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_values_through() {
        assert_eq!(guard(|| 41 + 1).unwrap(), 42);
    }

    #[test]
    fn captures_panic_message_and_location() {
        let caught = guard(|| -> u8 { panic!("boom {}", 7) }).unwrap_err();
        assert_eq!(caught.message, "boom 7");
        assert!(caught.location.unwrap().contains("fault.rs"));
        assert!(!caught.backtrace.is_empty());
    }

    #[test]
    fn nested_guards_unwind_independently() {
        let outer = guard(|| {
            let inner = guard(|| -> u8 { panic!("inner") });
            assert_eq!(inner.unwrap_err().message, "inner");
            "outer ok"
        });
        assert_eq!(outer.unwrap(), "outer ok");
    }
}
