//! Safe RAII layer over the QuickJS-ng C API
//!
//! Wraps the raw bindings from `qjs-sys` in ownership-typed handles:
//! [`OwnedValue`] releases its engine reference on drop, [`ValueRef`] borrows
//! without touching the refcount, and [`Runtime`]/[`Context`] own the engine
//! lifecycle. Host integration points (function dispatch, module resolution,
//! interrupts) are per-runtime closures registered on [`Runtime`].
//!
//! # Example
//!
//! ```
//! use qjs_core::{Context, EvalMode, Runtime};
//!
//! let rt = Runtime::new().unwrap();
//! let ctx = Context::new(&rt).unwrap();
//! let value = ctx.eval("6 * 7", "example.js", EvalMode::Global).unwrap();
//! assert_eq!(ctx.to_f64(value.as_ref()), 42.0);
//! ```
//!
//! # Thread Safety
//!
//! A runtime and everything created from it is bound to one thread. All
//! handle types are `!Send` and `!Sync`:
//!
//! ```compile_fail
//! use qjs_core::Runtime;
//!
//! let rt = Runtime::new().unwrap();
//! std::thread::spawn(move || drop(rt)); // Runtime is !Send
//! ```

mod atom;
mod classify;
mod context;
mod dump;
mod error;
mod hooks;
mod memory;
mod runtime;
mod value;

pub use atom::{Atom, EnumFilter, PropertyNames};
pub use classify::{JsKind, classify, type_of};
pub use context::{Context, EvalMode, PropertyDescriptor};
pub use dump::dump;
pub use error::{QjsError, QjsResult};
pub use hooks::{HostCall, HostDispatcher, InterruptPredicate, ModuleLoader};
pub use memory::MemoryUsage;
pub use runtime::{JobsOutcome, Runtime};
pub use value::{OwnedValue, ValueRef};

// Raw bindings, for the FFI boundary crate
pub use qjs_sys as sys;
