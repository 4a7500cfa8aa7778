//! Host hook slots and the engine-side trampolines
//!
//! Each runtime owns a [`HostHooks`] block stored behind the engine's opaque
//! pointer. The three trampolines below are the only C functions the engine
//! ever calls back into; they recover the hook block from the opaque pointer
//! and fan out to the registered Rust closures.
//!
//! Host calls can re-enter the bridge: a dispatched callback may evaluate
//! script that hits another bridge function, or trigger an import. The slots
//! therefore live in `RefCell`s holding `Rc`ed closures; a trampoline clones
//! the `Rc` out and drops the slot borrow before the closure runs, so nested
//! entry and mid-call re-registration only touch the slot, never a live
//! borrow. A closure replaced while executing stays alive through the clone
//! until its frame returns.

use std::cell::RefCell;
use std::ffi::{CStr, c_void};
use std::mem::ManuallyDrop;
use std::os::raw::c_int;
use std::rc::Rc;

use qjs_sys as q;

use crate::context::Context;
use crate::value::{OwnedValue, ValueRef};

/// One invocation of a bridge-created function object.
pub struct HostCall<'a> {
    /// Context the call arrived on.
    pub context: &'a Context,
    /// Receiver (`this`).
    pub this: ValueRef<'a>,
    /// Positional arguments.
    pub args: &'a [ValueRef<'a>],
    /// The closure-data value attached when the function was created.
    pub data: ValueRef<'a>,
}

/// Dispatcher for all bridge-created function objects of a runtime.
///
/// `None` results map to `undefined`. To signal a script exception, throw on
/// the context and return the exception sentinel as an owned value. The
/// closure may re-enter the bridge; mutable state it carries goes in a
/// `Cell`/`RefCell`.
pub type HostDispatcher = Box<dyn Fn(HostCall<'_>) -> Option<OwnedValue>>;

/// Module resolver: module name to source bytes, `None` when unknown. The
/// context is the one whose import triggered the load.
pub type ModuleLoader = Box<dyn Fn(&Context, &str) -> Option<Vec<u8>>>;

/// Interrupt predicate: `true` abandons the running script.
pub type InterruptPredicate = Box<dyn Fn() -> bool>;

/// Per-runtime hook slots, owned by the runtime wrapper.
#[derive(Default)]
pub struct HostHooks {
    pub(crate) dispatcher: RefCell<Option<Rc<dyn Fn(HostCall<'_>) -> Option<OwnedValue>>>>,
    pub(crate) loader: RefCell<Option<Rc<dyn Fn(&Context, &str) -> Option<Vec<u8>>>>>,
    pub(crate) interrupt: RefCell<Option<Rc<dyn Fn() -> bool>>>,
}

unsafe fn hooks_from_ctx<'a>(ctx: *mut q::JSContext) -> &'a HostHooks {
    // SAFETY: every runtime created by this crate installs a HostHooks block
    // as its opaque pointer before any script can run
    unsafe {
        let rt = q::JS_GetRuntime(ctx);
        &*(q::JS_GetRuntimeOpaque(rt) as *const HostHooks)
    }
}

/// Shared C entry point for every bridge-created function object.
///
/// `func_data[0]` is the closure-data value distinguishing the callbacks.
pub(crate) unsafe extern "C" fn dispatch_trampoline(
    ctx: *mut q::JSContext,
    this_val: q::JSValue,
    argc: c_int,
    argv: *mut q::JSValue,
    _magic: c_int,
    func_data: *mut q::JSValue,
) -> q::JSValue {
    // SAFETY: the engine passes a live context and argc valid argument slots
    unsafe {
        let dispatcher = hooks_from_ctx(ctx).dispatcher.borrow().clone();
        let Some(dispatcher) = dispatcher else {
            // A function object survived past its dispatcher. There is no
            // value that can be returned soundly, so treat it as fatal.
            tracing::error!("host function invoked with no dispatcher registered");
            std::process::abort();
        };

        let context = ManuallyDrop::new(Context::from_raw(ctx));
        let this = ValueRef::from_raw(ctx, this_val);
        let data = ValueRef::from_raw(ctx, *func_data);
        let args: Vec<ValueRef<'_>> = (0..argc as usize)
            .map(|i| ValueRef::from_raw(ctx, *argv.add(i)))
            .collect();

        let result = dispatcher(HostCall {
            context: &context,
            this,
            args: &args,
            data,
        });

        match result {
            Some(value) => value.into_raw(),
            None => q::JS_UNDEFINED,
        }
    }
}

/// Module loader installed through `JS_SetModuleLoaderFunc`.
///
/// Compiles resolved source in compile-only module mode and stamps
/// `import.meta.url` and `import.meta.main` on the fresh module.
pub(crate) unsafe extern "C" fn module_loader_trampoline(
    ctx: *mut q::JSContext,
    module_name: *const std::os::raw::c_char,
    opaque: *mut c_void,
) -> *mut q::JSModuleDef {
    // SAFETY: opaque is the runtime's HostHooks block; module_name is a
    // NUL-terminated engine string valid for this call
    unsafe {
        let loader = (*(opaque as *const HostHooks)).loader.borrow().clone();
        let Some(loader) = loader else {
            q::JS_ThrowReferenceError(ctx, c"module loader not set".as_ptr());
            return std::ptr::null_mut();
        };

        let name = CStr::from_ptr(module_name).to_string_lossy().into_owned();
        let context = ManuallyDrop::new(Context::from_raw(ctx));
        let Some(mut source) = loader(&context, &name) else {
            q::JS_ThrowReferenceError(
                ctx,
                c"could not load module '%s'".as_ptr(),
                module_name,
            );
            return std::ptr::null_mut();
        };

        // The engine wants a NUL-terminated buffer; the length excludes the
        // terminator, so interior NULs in the source survive
        let source_len = source.len();
        source.push(0);
        let func_val = q::JS_Eval(
            ctx,
            source.as_ptr().cast(),
            source_len,
            module_name,
            q::JS_EVAL_TYPE_MODULE | q::JS_EVAL_FLAG_COMPILE_ONLY,
        );
        if q::JS_IsException(func_val) {
            // Compile errors propagate as the pending exception
            return std::ptr::null_mut();
        }

        let m = q::JS_VALUE_GET_PTR(func_val) as *mut q::JSModuleDef;

        let meta = q::JS_GetImportMeta(ctx, m);
        if !q::JS_IsException(meta) {
            let url = q::JS_NewString(ctx, module_name);
            q::JS_DefinePropertyValueStr(ctx, meta, c"url".as_ptr(), url, q::JS_PROP_C_W_E);
            q::JS_DefinePropertyValueStr(
                ctx,
                meta,
                c"main".as_ptr(),
                q::JS_FALSE,
                q::JS_PROP_C_W_E,
            );
            q::JS_FreeValue(ctx, meta);
        }

        // The module stays registered with the context; release the
        // compiled-function wrapper
        q::JS_FreeValue(ctx, func_val);
        m
    }
}

/// Interrupt handler installed through `JS_SetInterruptHandler`.
pub(crate) unsafe extern "C" fn interrupt_trampoline(
    _rt: *mut q::JSRuntime,
    opaque: *mut c_void,
) -> c_int {
    // SAFETY: opaque is the runtime's HostHooks block
    unsafe {
        let predicate = (*(opaque as *const HostHooks)).interrupt.borrow().clone();
        match predicate {
            Some(predicate) => predicate() as c_int,
            None => {
                tracing::warn!("interrupt handler fired with no predicate registered");
                0
            }
        }
    }
}
