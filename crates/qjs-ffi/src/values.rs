//! Value constructors and extractors

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};

use qjs_sys as q;

use crate::heap::{ctx_ref, heap_get, value_to_heap};

#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_new_object(ctx: *mut q::JSContext) -> *mut q::JSValue {
    // SAFETY: ctx is a live borrowed context
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        value_to_heap(raw, ctx.new_object().into_raw())
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_new_object_proto(
    ctx: *mut q::JSContext,
    proto: *const q::JSValue,
) -> *mut q::JSValue {
    // SAFETY: ctx and proto are live borrowed handles
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        let proto = qjs_core::ValueRef::from_raw(raw, heap_get(proto));
        value_to_heap(raw, ctx.new_object_with_proto(proto).into_raw())
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_new_array(ctx: *mut q::JSContext) -> *mut q::JSValue {
    // SAFETY: ctx is a live borrowed context
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        value_to_heap(raw, ctx.new_array().into_raw())
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_new_error(ctx: *mut q::JSContext) -> *mut q::JSValue {
    // SAFETY: ctx is a live borrowed context
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        value_to_heap(raw, ctx.new_error().into_raw())
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_new_float64(ctx: *mut q::JSContext, value: f64) -> *mut q::JSValue {
    // SAFETY: ctx is a live borrowed context
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        value_to_heap(raw, ctx.new_float64(value).into_raw())
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_new_bool(ctx: *mut q::JSContext, value: c_int) -> *mut q::JSValue {
    // SAFETY: ctx is a live borrowed context
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        value_to_heap(raw, ctx.new_bool(value != 0).into_raw())
    }
}

/// New string from a NUL-terminated UTF-8 buffer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_new_string(
    ctx: *mut q::JSContext,
    text: *const c_char,
) -> *mut q::JSValue {
    // SAFETY: text is NUL-terminated per the C contract
    unsafe {
        let raw = ctx;
        let text = CStr::from_ptr(text).to_string_lossy();
        let ctx = ctx_ref(raw);
        value_to_heap(raw, ctx.new_string(&text).into_raw())
    }
}

/// `new Date(epoch_ms)`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_new_date(ctx: *mut q::JSContext, epoch_ms: f64) -> *mut q::JSValue {
    // SAFETY: ctx is a live borrowed context
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        value_to_heap(raw, ctx.new_date(epoch_ms).into_raw())
    }
}

/// Numeric coercion; NaN when the value cannot be coerced.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_get_float64(
    ctx: *mut q::JSContext,
    value: *const q::JSValue,
) -> f64 {
    // SAFETY: ctx and value are live borrowed handles
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        ctx.to_f64(qjs_core::ValueRef::from_raw(raw, heap_get(value)))
    }
}

/// String coercion. Returns a heap C string the caller must release with
/// [`qjsb_free_cstring`], or null on failure.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_get_string(
    ctx: *mut q::JSContext,
    value: *const q::JSValue,
) -> *mut c_char {
    // SAFETY: ctx and value are live borrowed handles
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        match ctx.to_string_lossy(qjs_core::ValueRef::from_raw(raw, heap_get(value))) {
            Ok(s) => match CString::new(s) {
                Ok(cs) => cs.into_raw(),
                Err(_) => std::ptr::null_mut(),
            },
            Err(_) => std::ptr::null_mut(),
        }
    }
}

/// Releases a C string returned by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_free_cstring(text: *mut c_char) {
    if text.is_null() {
        return;
    }
    // SAFETY: text came from CString::into_raw in this library
    drop(unsafe { CString::from_raw(text) });
}

/// Boolean coercion: 1, 0, or -1 on failure.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_to_bool(ctx: *mut q::JSContext, value: *const q::JSValue) -> c_int {
    // SAFETY: ctx and value are live borrowed handles
    unsafe { q::JS_ToBool(ctx, heap_get(value)) }
}

/// Array check: 1 or 0.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_is_array(_ctx: *mut q::JSContext, value: *const q::JSValue) -> c_int {
    // SAFETY: value is a live borrowed handle
    unsafe { q::JS_IsArray(heap_get(value)) as c_int }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_get_global_object(ctx: *mut q::JSContext) -> *mut q::JSValue {
    // SAFETY: ctx is a live borrowed context
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        value_to_heap(raw, ctx.global_object().into_raw())
    }
}

/// Creates a promise capability. The promise is returned; the resolve and
/// reject functions land in the out parameters. All three are owned handles.
/// Returns null (with the out parameters untouched) on failure.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_new_promise_capability(
    ctx: *mut q::JSContext,
    resolve_out: *mut *mut q::JSValue,
    reject_out: *mut *mut q::JSValue,
) -> *mut q::JSValue {
    // SAFETY: ctx is live, out parameters point at writable slots
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        match ctx.new_promise_capability() {
            Ok((promise, resolve, reject)) => {
                *resolve_out = value_to_heap(raw, resolve.into_raw());
                *reject_out = value_to_heap(raw, reject.into_raw());
                value_to_heap(raw, promise.into_raw())
            }
            Err(_) => std::ptr::null_mut(),
        }
    }
}

/// New ArrayBuffer with a copy of the byte range.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_new_array_buffer_copy(
    ctx: *mut q::JSContext,
    data: *const u8,
    len: usize,
) -> *mut q::JSValue {
    // SAFETY: data holds len readable bytes per the C contract
    unsafe {
        let raw = ctx;
        let bytes = std::slice::from_raw_parts(data, len);
        let ctx = ctx_ref(raw);
        value_to_heap(raw, ctx.new_array_buffer_copy(bytes).into_raw())
    }
}

/// Backing store of an ArrayBuffer, or null for other values. The pointer
/// stays valid while the buffer handle is alive and undetached.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_get_array_buffer(
    ctx: *mut q::JSContext,
    value: *const q::JSValue,
    len_out: *mut usize,
) -> *mut u8 {
    // SAFETY: ctx and value are live borrowed handles; len_out is writable
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        match ctx.array_buffer_bytes(qjs_core::ValueRef::from_raw(raw, heap_get(value))) {
            Some((ptr, len)) => {
                *len_out = len;
                ptr
            }
            None => {
                *len_out = 0;
                std::ptr::null_mut()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::qjsb_free_value_ptr;
    use crate::lifecycle::{qjsb_free_context, qjsb_free_runtime, qjsb_new_context, qjsb_new_runtime};

    #[test]
    fn test_string_roundtrip_over_handles() {
        let rt = qjsb_new_runtime();
        // SAFETY: the handles below are created and freed in this scope
        unsafe {
            let ctx = qjsb_new_context(rt);
            let s = qjsb_new_string(ctx, c"bridge".as_ptr());
            let text = qjsb_get_string(ctx, s);
            assert_eq!(CStr::from_ptr(text).to_str().unwrap(), "bridge");
            qjsb_free_cstring(text);
            qjsb_free_value_ptr(ctx, s);
            qjsb_free_context(ctx);
            qjsb_free_runtime(rt);
        }
    }

    #[test]
    fn test_array_buffer_over_handles() {
        let rt = qjsb_new_runtime();
        // SAFETY: as above
        unsafe {
            let ctx = qjsb_new_context(rt);
            let buf = qjsb_new_array_buffer_copy(ctx, [9u8, 8, 7].as_ptr(), 3);
            let mut len = 0usize;
            let ptr = qjsb_get_array_buffer(ctx, buf, &mut len);
            assert_eq!(len, 3);
            assert_eq!(std::slice::from_raw_parts(ptr, len), &[9, 8, 7]);

            let not_buf = qjsb_new_float64(ctx, 1.0);
            assert!(qjsb_get_array_buffer(ctx, not_buf, &mut len).is_null());
            assert_eq!(len, 0);

            qjsb_free_value_ptr(ctx, not_buf);
            qjsb_free_value_ptr(ctx, buf);
            qjsb_free_context(ctx);
            qjsb_free_runtime(rt);
        }
    }
}
