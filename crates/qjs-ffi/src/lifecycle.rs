//! Runtime and context lifecycle exports

use std::mem::ManuallyDrop;
use std::os::raw::c_int;

use qjs_core::{Context, Runtime};
use qjs_sys as q;

/// Borrows the runtime behind a raw pointer for the duration of one call.
///
/// # Safety
/// `rt` must be a live runtime handle owned by the caller.
pub(crate) unsafe fn rt_ref(rt: *mut q::JSRuntime) -> ManuallyDrop<Runtime> {
    // SAFETY: ManuallyDrop keeps the borrow from freeing the runtime
    ManuallyDrop::new(unsafe { Runtime::from_raw(rt) })
}

/// Creates a runtime. Returns null on allocation failure.
#[unsafe(no_mangle)]
pub extern "C" fn qjsb_new_runtime() -> *mut q::JSRuntime {
    match Runtime::new() {
        Ok(rt) => rt.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Frees a runtime. All contexts and values created from it must already be
/// freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_free_runtime(rt: *mut q::JSRuntime) {
    // SAFETY: ownership of the handle transfers back to the wrapper
    drop(unsafe { Runtime::from_raw(rt) });
}

/// Creates a context on a runtime. Returns null on failure.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_new_context(rt: *mut q::JSRuntime) -> *mut q::JSContext {
    // SAFETY: rt is a live borrowed runtime
    let rt = unsafe { rt_ref(rt) };
    match Context::new(&rt) {
        Ok(ctx) => ctx.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Frees a context. All values created on it must already be freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_free_context(ctx: *mut q::JSContext) {
    // SAFETY: ownership of the handle transfers back to the wrapper
    drop(unsafe { Context::from_raw(ctx) });
}

/// Caps the runtime heap in bytes. Negative disables the cap.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_set_memory_limit(rt: *mut q::JSRuntime, limit_bytes: i64) {
    // SAFETY: rt is a live borrowed runtime
    let rt = unsafe { rt_ref(rt) };
    if limit_bytes < 0 {
        rt.set_memory_limit(None);
    } else {
        rt.set_memory_limit(Some(limit_bytes as usize));
    }
}

/// Host-side interrupt poll: nonzero means abandon execution.
pub type QjsbInterruptFn = unsafe extern "C" fn(rt: *mut q::JSRuntime) -> c_int;

/// Installs an interrupt poll, replacing any previous one.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_runtime_enable_interrupt(
    rt: *mut q::JSRuntime,
    poll: QjsbInterruptFn,
) {
    // SAFETY: rt stays valid while the predicate is registered; the closure
    // only runs on this runtime's thread
    let raw_rt = rt;
    let rt = unsafe { rt_ref(rt) };
    rt.set_interrupt(Box::new(move || unsafe { poll(raw_rt) } != 0));
}

/// Removes the interrupt poll.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_runtime_disable_interrupt(rt: *mut q::JSRuntime) {
    // SAFETY: rt is a live borrowed runtime
    let rt = unsafe { rt_ref(rt) };
    rt.clear_interrupt();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_roundtrip() {
        let rt = qjsb_new_runtime();
        assert!(!rt.is_null());
        // SAFETY: handles created just above, freed in reverse order
        unsafe {
            let ctx = qjsb_new_context(rt);
            assert!(!ctx.is_null());
            qjsb_set_memory_limit(rt, 32 * 1024 * 1024);
            qjsb_set_memory_limit(rt, -1);
            qjsb_free_context(ctx);
            qjsb_free_runtime(rt);
        }
    }
}
