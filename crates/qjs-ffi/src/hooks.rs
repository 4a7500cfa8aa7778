//! Host callback and module resolver registration
//!
//! Each registration is per runtime and idempotent: registering again
//! replaces the previous host function.

use std::os::raw::{c_char, c_int};

use qjs_core::OwnedValue;
use qjs_sys as q;

use crate::heap::{heap_take, value_to_heap};
use crate::lifecycle::rt_ref;

/// Host implementation behind every bridge-created function object.
///
/// Receives borrowed pointers to `this`, the argument block and the
/// closure-data value. Returns an owned value handle for the result, or null
/// for `undefined`. To throw, install the exception on the context and
/// return a handle boxing the exception sentinel.
pub type QjsbHostCallbackFn = unsafe extern "C" fn(
    ctx: *mut q::JSContext,
    this: *const q::JSValue,
    argc: c_int,
    argv: *const q::JSValue,
    data: *const q::JSValue,
) -> *mut q::JSValue;

/// Module source provider. Returns the UTF-8 source for `name` with its
/// length in `len_out`, or null when the module is unknown. The returned
/// buffer stays owned by the host and must remain valid until the import
/// that triggered the load completes; the bridge copies it immediately.
pub type QjsbModuleSourceFn = unsafe extern "C" fn(
    rt: *mut q::JSRuntime,
    ctx: *mut q::JSContext,
    name: *const c_char,
    len_out: *mut usize,
) -> *const c_char;

/// Registers the host callback for a runtime, replacing any previous one.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_set_host_callback(
    rt: *mut q::JSRuntime,
    callback: QjsbHostCallbackFn,
) {
    // SAFETY: rt is a live borrowed runtime; the closure only runs on its
    // thread while the runtime is alive
    let rt = unsafe { rt_ref(rt) };
    rt.set_host_dispatcher(Box::new(move |call| {
        let ctx = call.context.as_raw();
        let this = call.this.raw();
        let argv: Vec<q::JSValue> = call.args.iter().map(|a| a.raw()).collect();
        let data = call.data.raw();
        // SAFETY: every pointer below stays valid for the duration of the
        // host call
        unsafe {
            let result = callback(ctx, &this, argv.len() as c_int, argv.as_ptr(), &data);
            if result.is_null() {
                None
            } else {
                Some(OwnedValue::from_raw(ctx, heap_take(result)))
            }
        }
    }));
}

/// Registers the module source provider for a runtime, replacing any
/// previous one.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_set_module_loader(
    rt: *mut q::JSRuntime,
    loader: QjsbModuleSourceFn,
) {
    // SAFETY: as in qjsb_set_host_callback
    let raw_rt = rt;
    let rt = unsafe { rt_ref(rt) };
    rt.set_module_loader(Box::new(move |ctx, name| {
        let cname = std::ffi::CString::new(name).ok()?;
        let mut len = 0usize;
        // SAFETY: cname is NUL-terminated; the host buffer is copied before
        // this closure returns
        unsafe {
            let source = loader(raw_rt, ctx.as_raw(), cname.as_ptr(), &mut len);
            if source.is_null() {
                return None;
            }
            Some(std::slice::from_raw_parts(source as *const u8, len).to_vec())
        }
    }));
}

/// Boxes a value for handing results back from a host callback. Primitive
/// construction helpers plus this cover the callback result path.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_box_exception() -> *mut q::JSValue {
    // SAFETY: the exception sentinel carries no reference, so no context is
    // needed for the failure path
    unsafe { value_to_heap(std::ptr::null_mut(), q::JS_EXCEPTION) }
}
