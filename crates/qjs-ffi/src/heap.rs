//! Heap-boxed value handles
//!
//! The C boundary only moves pointer-sized handles. Every engine value that
//! crosses outward is boxed into a one-slot heap allocation; the pointer is
//! the handle. Freeing a handle releases the engine reference and the box in
//! one step. Handles are never aliased: the only way to get a second handle
//! to the same value is an explicit duplicate, which takes its own engine
//! reference.

use std::alloc::{Layout, alloc, dealloc};
use std::mem::ManuallyDrop;

use qjs_core::Context;
use qjs_sys as q;

/// Boxes a value into a fresh handle, taking over the engine reference.
/// Returns null when the allocation fails; the reference is released first,
/// so a null handle never strands a live value.
///
/// # Safety
/// `ctx` must be live, or null when `value` carries no reference.
pub(crate) unsafe fn value_to_heap(ctx: *mut q::JSContext, value: q::JSValue) -> *mut q::JSValue {
    let layout = Layout::new::<q::JSValue>();
    // SAFETY: layout is non-zero sized; null is checked before the write
    unsafe {
        let ptr = alloc(layout) as *mut q::JSValue;
        if ptr.is_null() {
            if !ctx.is_null() {
                q::JS_FreeValue(ctx, value);
            }
            return ptr;
        }
        ptr.write(value);
        ptr
    }
}

/// Consumes a handle, returning the boxed value and freeing the box. The
/// engine reference is transferred to the caller.
///
/// # Safety
/// `handle` must be a live handle produced by [`value_to_heap`]; it is dead
/// after this call.
pub(crate) unsafe fn heap_take(handle: *mut q::JSValue) -> q::JSValue {
    // SAFETY: per contract, handle points at a live boxed value
    unsafe {
        let value = handle.read();
        dealloc(handle as *mut u8, Layout::new::<q::JSValue>());
        value
    }
}

/// Reads through a handle without consuming it.
///
/// # Safety
/// `handle` must be a live handle.
pub(crate) unsafe fn heap_get(handle: *const q::JSValue) -> q::JSValue {
    // SAFETY: per contract
    unsafe { *handle }
}

/// Borrows the context behind a raw pointer for the duration of one call.
///
/// # Safety
/// `ctx` must be a live context handle owned by the caller.
pub(crate) unsafe fn ctx_ref(ctx: *mut q::JSContext) -> ManuallyDrop<Context> {
    // SAFETY: ManuallyDrop keeps the borrow from freeing the context
    ManuallyDrop::new(unsafe { Context::from_raw(ctx) })
}

/// Releases the engine reference held by a handle, then the handle itself.
/// The handle is dead afterwards; freeing it again is undefined behavior.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_free_value_ptr(ctx: *mut q::JSContext, handle: *mut q::JSValue) {
    // SAFETY: caller owns the handle and the context is live
    unsafe {
        let value = heap_take(handle);
        q::JS_FreeValue(ctx, value);
    }
}

/// Creates a new handle to the same value, with its own engine reference.
/// The input handle stays owned by the caller.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_dup_value_ptr(
    ctx: *mut q::JSContext,
    handle: *const q::JSValue,
) -> *mut q::JSValue {
    // SAFETY: caller guarantees a live handle and context
    unsafe { value_to_heap(ctx, q::JS_DupValue(ctx, heap_get(handle))) }
}

// Constant singletons, handed out as borrowed pointers. Hosts must never
// free them.
#[repr(transparent)]
struct ConstValue(q::JSValue);

// SAFETY: the constants are immutable primitive-tagged values
unsafe impl Sync for ConstValue {}

static UNDEFINED: ConstValue = ConstValue(q::JS_UNDEFINED);
static NULL: ConstValue = ConstValue(q::JS_NULL);
static TRUE: ConstValue = ConstValue(q::JS_TRUE);
static FALSE: ConstValue = ConstValue(q::JS_FALSE);

#[unsafe(no_mangle)]
pub extern "C" fn qjsb_get_undefined() -> *const q::JSValue {
    &UNDEFINED.0
}

#[unsafe(no_mangle)]
pub extern "C" fn qjsb_get_null() -> *const q::JSValue {
    &NULL.0
}

#[unsafe(no_mangle)]
pub extern "C" fn qjsb_get_true() -> *const q::JSValue {
    &TRUE.0
}

#[unsafe(no_mangle)]
pub extern "C" fn qjsb_get_false() -> *const q::JSValue {
    &FALSE.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_roundtrip() {
        // SAFETY: an int carries no reference, so no context is needed; the
        // handle is live and consumed exactly once
        unsafe {
            let handle = value_to_heap(std::ptr::null_mut(), q::JS_NewInt32(7));
            assert!(!handle.is_null());
            let value = heap_take(handle);
            assert_eq!(q::JS_VALUE_GET_INT(value), 7);
        }
    }

    #[test]
    fn test_constants_are_borrowed_statics() {
        assert_eq!(qjsb_get_undefined(), qjsb_get_undefined());
        // SAFETY: reading through a static
        unsafe {
            assert!(q::JS_IsUndefined(*qjsb_get_undefined()));
            assert!(q::JS_IsNull(*qjsb_get_null()));
            assert!(q::JS_VALUE_GET_BOOL(*qjsb_get_true()));
            assert!(!q::JS_VALUE_GET_BOOL(*qjsb_get_false()));
        }
    }
}
