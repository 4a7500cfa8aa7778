//! Evaluation, exceptions, classification and diagnostics exports

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};

use qjs_core::ValueRef;
use qjs_sys as q;

use crate::heap::{ctx_ref, heap_get, value_to_heap};
use crate::lifecycle::rt_ref;

/// Evaluates source text. `flags` is the raw engine eval flag word
/// (`JS_EVAL_TYPE_MODULE`, `JS_EVAL_FLAG_COMPILE_ONLY`, ...). The result
/// handle may box the exception sentinel.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_eval(
    ctx: *mut q::JSContext,
    source: *const c_char,
    source_len: usize,
    filename: *const c_char,
    flags: c_int,
) -> *mut q::JSValue {
    // SAFETY: source holds source_len readable bytes, filename is
    // NUL-terminated
    unsafe {
        let raw = ctx;
        let source =
            String::from_utf8_lossy(std::slice::from_raw_parts(source as *const u8, source_len));
        let filename = CStr::from_ptr(filename).to_string_lossy();
        let ctx = ctx_ref(raw);
        match ctx.eval_flags(&source, &filename, flags) {
            Ok(value) => value_to_heap(raw, value.into_raw()),
            Err(_) => std::ptr::null_mut(),
        }
    }
}

/// `typeof` string for a value. Release with `qjsb_free_cstring`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_typeof(
    ctx: *mut q::JSContext,
    value: *const q::JSValue,
) -> *mut c_char {
    // SAFETY: handles are live borrows
    unsafe {
        let name = qjs_core::type_of(ValueRef::from_raw(ctx, heap_get(value)));
        match CString::new(name) {
            Ok(cs) => cs.into_raw(),
            Err(_) => std::ptr::null_mut(),
        }
    }
}

/// Fine-grained classification code for a value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_handy_typeof(
    ctx: *mut q::JSContext,
    value: *const q::JSValue,
) -> c_int {
    // SAFETY: handles are live borrows
    unsafe { qjs_core::classify(ValueRef::from_raw(ctx, heap_get(value))).code() }
}

/// JSON dump of a value, with error diagnostics preserved. Release with
/// `qjsb_free_cstring`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_dump(
    ctx: *mut q::JSContext,
    value: *const q::JSValue,
) -> *mut c_char {
    // SAFETY: handles are live borrows
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        let rendered = qjs_core::dump(&ctx, ValueRef::from_raw(raw, heap_get(value)));
        match CString::new(rendered) {
            Ok(cs) => cs.into_raw(),
            Err(_) => std::ptr::null_mut(),
        }
    }
}

/// Error-resolution protocol: when the handle boxes the exception sentinel,
/// returns the pending exception as an owned handle (clearing it); otherwise
/// returns null. The input handle stays owned by the caller either way.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_resolve_exception(
    ctx: *mut q::JSContext,
    maybe_exception: *const q::JSValue,
) -> *mut q::JSValue {
    // SAFETY: handles are live borrows
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        match ctx.resolve_exception(ValueRef::from_raw(raw, heap_get(maybe_exception))) {
            Some(exception) => value_to_heap(raw, exception.into_raw()),
            None => std::ptr::null_mut(),
        }
    }
}

/// Fetches and clears the pending exception unconditionally.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_get_exception(ctx: *mut q::JSContext) -> *mut q::JSValue {
    // SAFETY: ctx is a live borrowed context
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        value_to_heap(raw, ctx.take_exception().into_raw())
    }
}

/// Throws a value. The argument handle stays owned by the caller; the
/// returned handle boxes the exception sentinel.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_throw(
    ctx: *mut q::JSContext,
    error: *const q::JSValue,
) -> *mut q::JSValue {
    // SAFETY: handles are live borrows
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        value_to_heap(raw, ctx.throw(ValueRef::from_raw(raw, heap_get(error))).into_raw())
    }
}

/// True when promise jobs are queued on the runtime.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_is_job_pending(rt: *mut q::JSRuntime) -> c_int {
    // SAFETY: rt is a live borrowed runtime
    let rt = unsafe { rt_ref(rt) };
    rt.is_job_pending() as c_int
}

/// Drains up to `max_jobs` queued jobs (negative drains until empty).
/// Returns the number of jobs executed. When a job threw, the exception is
/// written to `exception_out` as an owned handle; otherwise null is written.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_execute_pending_jobs(
    rt: *mut q::JSRuntime,
    max_jobs: c_int,
    exception_out: *mut *mut q::JSValue,
) -> c_int {
    // SAFETY: rt is live; exception_out points at a writable slot
    unsafe {
        let rt = rt_ref(rt);
        let max = if max_jobs < 0 { None } else { Some(max_jobs as u32) };
        let outcome = rt.execute_pending_jobs(max);
        *exception_out = match outcome.exception {
            Some(exception) => {
                let job_ctx = exception.context();
                value_to_heap(job_ctx, exception.into_raw())
            }
            None => std::ptr::null_mut(),
        };
        outcome.executed as c_int
    }
}

/// Memory accounting snapshot, materialized as a script object on `ctx`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_compute_memory_usage(
    rt: *mut q::JSRuntime,
    ctx: *mut q::JSContext,
) -> *mut q::JSValue {
    // SAFETY: rt and ctx are live borrowed handles of the same runtime
    unsafe {
        let raw_ctx = ctx;
        let rt = rt_ref(rt);
        let ctx = ctx_ref(raw_ctx);
        value_to_heap(raw_ctx, rt.memory_usage().to_object(&ctx).into_raw())
    }
}

/// Renders a memory report into the caller's buffer, truncating when it
/// does not fit. Returns the number of bytes written.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_dump_memory_usage(
    rt: *mut q::JSRuntime,
    buf: *mut u8,
    buf_len: usize,
) -> usize {
    // SAFETY: buf holds buf_len writable bytes per the C contract
    unsafe {
        let rt = rt_ref(rt);
        let out = std::slice::from_raw_parts_mut(buf, buf_len);
        rt.memory_usage().render_into(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::qjsb_free_value_ptr;
    use crate::lifecycle::{qjsb_free_context, qjsb_free_runtime, qjsb_new_context, qjsb_new_runtime};
    use crate::values::qjsb_free_cstring;

    unsafe fn eval_global(ctx: *mut q::JSContext, source: &str) -> *mut q::JSValue {
        let csource = CString::new(source).unwrap();
        // SAFETY: forwarded test contract
        unsafe {
            qjsb_eval(
                ctx,
                csource.as_ptr(),
                source.len(),
                c"test.js".as_ptr(),
                q::JS_EVAL_TYPE_GLOBAL,
            )
        }
    }

    #[test]
    fn test_eval_and_resolve_exception() {
        let rt = qjsb_new_runtime();
        // SAFETY: handles created and freed within the test
        unsafe {
            let ctx = qjsb_new_context(rt);

            let ok = eval_global(ctx, "2 + 2");
            assert!(qjsb_resolve_exception(ctx, ok).is_null());
            qjsb_free_value_ptr(ctx, ok);

            let bad = eval_global(ctx, "throw new RangeError('r')");
            let exc = qjsb_resolve_exception(ctx, bad);
            assert!(!exc.is_null());
            let dumped = qjsb_dump(ctx, exc);
            let text = CStr::from_ptr(dumped).to_string_lossy();
            assert!(text.contains("RangeError"));
            qjsb_free_cstring(dumped);
            qjsb_free_value_ptr(ctx, exc);
            qjsb_free_value_ptr(ctx, bad);

            qjsb_free_context(ctx);
            qjsb_free_runtime(rt);
        }
    }

    #[test]
    fn test_typeof_exports() {
        let rt = qjsb_new_runtime();
        // SAFETY: as above
        unsafe {
            let ctx = qjsb_new_context(rt);
            let arr = eval_global(ctx, "[1]");
            let name = qjsb_typeof(ctx, arr);
            assert_eq!(CStr::from_ptr(name).to_str().unwrap(), "object");
            qjsb_free_cstring(name);
            assert_eq!(qjsb_handy_typeof(ctx, arr), 21);
            qjsb_free_value_ptr(ctx, arr);
            qjsb_free_context(ctx);
            qjsb_free_runtime(rt);
        }
    }

    #[test]
    fn test_job_drain_over_handles() {
        let rt = qjsb_new_runtime();
        // SAFETY: as above
        unsafe {
            let ctx = qjsb_new_context(rt);
            let setup = eval_global(ctx, "Promise.resolve(1).then(() => {})");
            qjsb_free_value_ptr(ctx, setup);
            assert_eq!(qjsb_is_job_pending(rt), 1);

            let mut exception: *mut q::JSValue = std::ptr::null_mut();
            let executed = qjsb_execute_pending_jobs(rt, -1, &mut exception);
            assert_eq!(executed, 1);
            assert!(exception.is_null());
            assert_eq!(qjsb_is_job_pending(rt), 0);

            qjsb_free_context(ctx);
            qjsb_free_runtime(rt);
        }
    }

    #[test]
    fn test_memory_report_truncation() {
        let rt = qjsb_new_runtime();
        // SAFETY: as above
        unsafe {
            let mut buf = [0u8; 64];
            let n = qjsb_dump_memory_usage(rt, buf.as_mut_ptr(), buf.len());
            assert_eq!(n, 64);
            qjsb_free_runtime(rt);
        }
    }
}
