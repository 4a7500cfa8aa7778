//! Flat C ABI over the QuickJS-ng bridge
//!
//! Everything crossing this boundary is pointer sized: runtimes and contexts
//! travel as raw engine pointers, values as heap-boxed handles (see
//! [`heap`]), strings as NUL-terminated buffers released through
//! [`qjsb_free_cstring`].
//!
//! Ownership rules, uniformly:
//! - returned value handles are owned by the caller and released with
//!   [`qjsb_free_value_ptr`], except the four constant singletons, which are
//!   borrowed and never freed
//! - value handles passed as arguments are borrowed; the callee takes its
//!   own references where it needs them
//! - a result handle may box the exception sentinel; resolve it with
//!   [`qjsb_resolve_exception`]
//!
//! [`qjsb_free_cstring`]: values::qjsb_free_cstring
//! [`qjsb_free_value_ptr`]: heap::qjsb_free_value_ptr
//! [`qjsb_resolve_exception`]: diag::qjsb_resolve_exception

pub mod calls;
pub mod diag;
pub mod heap;
pub mod hooks;
pub mod lifecycle;
pub mod props;
pub mod values;

pub use calls::*;
pub use diag::*;
pub use heap::{qjsb_dup_value_ptr, qjsb_free_value_ptr, qjsb_get_false, qjsb_get_null,
    qjsb_get_true, qjsb_get_undefined};
pub use hooks::*;
pub use lifecycle::*;
pub use props::*;
pub use values::*;
