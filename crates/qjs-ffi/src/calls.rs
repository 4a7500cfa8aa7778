//! Call and construct exports
//!
//! Arguments arrive as an array of handle pointers; each call materializes
//! the borrowed values into a contiguous block for the engine.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

use qjs_core::ValueRef;
use qjs_sys as q;

use crate::heap::{ctx_ref, heap_get, value_to_heap};

unsafe fn materialize<'a>(
    ctx: *mut q::JSContext,
    argc: c_int,
    argv: *const *const q::JSValue,
) -> Vec<ValueRef<'a>> {
    // SAFETY: argv holds argc live handle pointers per the C contract
    unsafe {
        (0..argc as usize)
            .map(|i| ValueRef::from_raw(ctx, heap_get(*argv.add(i))))
            .collect()
    }
}

/// Invokes a callable. The result handle may box the exception sentinel;
/// resolve it with `qjsb_resolve_exception`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_call(
    ctx: *mut q::JSContext,
    func: *const q::JSValue,
    this: *const q::JSValue,
    argc: c_int,
    argv: *const *const q::JSValue,
) -> *mut q::JSValue {
    // SAFETY: all handles are live borrows for this call
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        let func = ValueRef::from_raw(raw, heap_get(func));
        let this = ValueRef::from_raw(raw, heap_get(this));
        let args = materialize(raw, argc, argv);
        value_to_heap(raw, ctx.call(func, this, &args).into_raw())
    }
}

/// Invokes a callable and discards the result. Returns 0, or -1 when the
/// call threw (exception left pending).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_call_void(
    ctx: *mut q::JSContext,
    func: *const q::JSValue,
    this: *const q::JSValue,
    argc: c_int,
    argv: *const *const q::JSValue,
) -> c_int {
    // SAFETY: as in qjsb_call
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        let func = ValueRef::from_raw(raw, heap_get(func));
        let this = ValueRef::from_raw(raw, heap_get(this));
        let args = materialize(raw, argc, argv);
        let result = ctx.call(func, this, &args);
        if result.is_exception() { -1 } else { 0 }
    }
}

/// `new`-constructs through a constructor function.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_call_constructor(
    ctx: *mut q::JSContext,
    func: *const q::JSValue,
    argc: c_int,
    argv: *const *const q::JSValue,
) -> *mut q::JSValue {
    // SAFETY: as in qjsb_call
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        let func = ValueRef::from_raw(raw, heap_get(func));
        let args = materialize(raw, argc, argv);
        value_to_heap(raw, ctx.call_constructor(func, &args).into_raw())
    }
}

/// Marks a function object as constructable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_to_constructor(ctx: *mut q::JSContext, func: *const q::JSValue) {
    // SAFETY: handles are live borrows
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        ctx.set_constructor_bit(ValueRef::from_raw(raw, heap_get(func)), true);
    }
}

/// Creates a function object routing through the runtime's host callback.
/// `data` is the closure-data value attached to the function; `name` may be
/// null. Returns null on failure.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_new_function(
    ctx: *mut q::JSContext,
    data: *const q::JSValue,
    name: *const c_char,
) -> *mut q::JSValue {
    // SAFETY: handles are live borrows; name is NUL-terminated when non-null
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        let data = ValueRef::from_raw(raw, heap_get(data));
        let name = if name.is_null() {
            None
        } else {
            Some(CStr::from_ptr(name).to_string_lossy())
        };
        match ctx.new_function(data, name.as_deref()) {
            Ok(func) => value_to_heap(raw, func.into_raw()),
            Err(_) => std::ptr::null_mut(),
        }
    }
}
