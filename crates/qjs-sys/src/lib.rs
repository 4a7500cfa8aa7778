//! Raw FFI bindings to the QuickJS-ng C API
//!
//! This crate provides low-level unsafe bindings to the QuickJS engine.
//! Use the safe wrappers in `qjs-core` for higher-level access.
//!
//! The engine's `static inline` header helpers (value constructors, tag
//! accessors, refcount duplicate/release) have no linkable symbols, so they
//! are re-implemented here as `#[inline]` Rust functions with the same
//! semantics.

#![allow(non_camel_case_types)]
#![allow(non_upper_case_globals)]
#![allow(non_snake_case)]

use std::ffi::c_void;
use std::os::raw::{c_char, c_int};

// Opaque engine handles
#[repr(C)]
pub struct JSRuntime {
    _private: [u8; 0],
}

#[repr(C)]
pub struct JSContext {
    _private: [u8; 0],
}

#[repr(C)]
pub struct JSModuleDef {
    _private: [u8; 0],
}

pub type JSAtom = u32;
pub type JSClassID = u32;

// Tagged value representation (64-bit, no NaN boxing)
#[repr(C)]
#[derive(Clone, Copy)]
pub union JSValueUnion {
    pub int32: i32,
    pub float64: f64,
    pub ptr: *mut c_void,
    pub short_big_int: i64,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct JSValue {
    pub u: JSValueUnion,
    pub tag: i64,
}

// Values with these tags point at a refcounted heap allocation
pub const JS_TAG_FIRST: i32 = -9;
pub const JS_TAG_BIG_INT: i32 = -9;
pub const JS_TAG_SYMBOL: i32 = -8;
pub const JS_TAG_STRING: i32 = -7;
pub const JS_TAG_STRING_ROPE: i32 = -6;
pub const JS_TAG_MODULE: i32 = -3;
pub const JS_TAG_FUNCTION_BYTECODE: i32 = -2;
pub const JS_TAG_OBJECT: i32 = -1;

pub const JS_TAG_INT: i32 = 0;
pub const JS_TAG_BOOL: i32 = 1;
pub const JS_TAG_NULL: i32 = 2;
pub const JS_TAG_UNDEFINED: i32 = 3;
pub const JS_TAG_UNINITIALIZED: i32 = 4;
pub const JS_TAG_CATCH_OFFSET: i32 = 5;
pub const JS_TAG_EXCEPTION: i32 = 6;
pub const JS_TAG_SHORT_BIG_INT: i32 = 7;
pub const JS_TAG_FLOAT64: i32 = 8;

// Header shared by all refcounted heap allocations
#[repr(C)]
pub struct JSRefCountHeader {
    pub ref_count: c_int,
}

// Built-in class ids, mirroring the engine's internal class table.
// Must be kept in sync with the pinned engine version.
pub const JS_CLASS_OBJECT: JSClassID = 1;
pub const JS_CLASS_ARRAY: JSClassID = 2;
pub const JS_CLASS_ERROR: JSClassID = 3;
pub const JS_CLASS_NUMBER: JSClassID = 4;
pub const JS_CLASS_STRING: JSClassID = 5;
pub const JS_CLASS_BOOLEAN: JSClassID = 6;
pub const JS_CLASS_SYMBOL: JSClassID = 7;
pub const JS_CLASS_ARGUMENTS: JSClassID = 8;
pub const JS_CLASS_MAPPED_ARGUMENTS: JSClassID = 9;
pub const JS_CLASS_DATE: JSClassID = 10;
pub const JS_CLASS_MODULE_NS: JSClassID = 11;
pub const JS_CLASS_C_FUNCTION: JSClassID = 12;
pub const JS_CLASS_BYTECODE_FUNCTION: JSClassID = 13;
pub const JS_CLASS_BOUND_FUNCTION: JSClassID = 14;
pub const JS_CLASS_C_FUNCTION_DATA: JSClassID = 15;
pub const JS_CLASS_GENERATOR_FUNCTION: JSClassID = 16;
pub const JS_CLASS_FOR_IN_ITERATOR: JSClassID = 17;
pub const JS_CLASS_REGEXP: JSClassID = 18;
pub const JS_CLASS_ARRAY_BUFFER: JSClassID = 19;
pub const JS_CLASS_SHARED_ARRAY_BUFFER: JSClassID = 20;
pub const JS_CLASS_UINT8C_ARRAY: JSClassID = 21;
pub const JS_CLASS_INT8_ARRAY: JSClassID = 22;
pub const JS_CLASS_UINT8_ARRAY: JSClassID = 23;
pub const JS_CLASS_INT16_ARRAY: JSClassID = 24;
pub const JS_CLASS_UINT16_ARRAY: JSClassID = 25;
pub const JS_CLASS_INT32_ARRAY: JSClassID = 26;
pub const JS_CLASS_UINT32_ARRAY: JSClassID = 27;
pub const JS_CLASS_BIG_INT64_ARRAY: JSClassID = 28;
pub const JS_CLASS_BIG_UINT64_ARRAY: JSClassID = 29;
pub const JS_CLASS_FLOAT16_ARRAY: JSClassID = 30;
pub const JS_CLASS_FLOAT32_ARRAY: JSClassID = 31;
pub const JS_CLASS_FLOAT64_ARRAY: JSClassID = 32;
pub const JS_CLASS_DATAVIEW: JSClassID = 33;
pub const JS_CLASS_BIG_INT: JSClassID = 34;
pub const JS_CLASS_MAP: JSClassID = 35;
pub const JS_CLASS_SET: JSClassID = 36;
pub const JS_CLASS_WEAKMAP: JSClassID = 37;
pub const JS_CLASS_WEAKSET: JSClassID = 38;
pub const JS_CLASS_ITERATOR: JSClassID = 39;
pub const JS_CLASS_ITERATOR_HELPER: JSClassID = 40;
pub const JS_CLASS_ITERATOR_WRAP: JSClassID = 41;
pub const JS_CLASS_MAP_ITERATOR: JSClassID = 42;
pub const JS_CLASS_SET_ITERATOR: JSClassID = 43;
pub const JS_CLASS_ARRAY_ITERATOR: JSClassID = 44;
pub const JS_CLASS_STRING_ITERATOR: JSClassID = 45;
pub const JS_CLASS_REGEXP_STRING_ITERATOR: JSClassID = 46;
pub const JS_CLASS_GENERATOR: JSClassID = 47;
pub const JS_CLASS_PROXY: JSClassID = 48;
pub const JS_CLASS_PROMISE: JSClassID = 49;
pub const JS_CLASS_PROMISE_RESOLVE_FUNCTION: JSClassID = 50;
pub const JS_CLASS_PROMISE_REJECT_FUNCTION: JSClassID = 51;
pub const JS_CLASS_ASYNC_FUNCTION: JSClassID = 52;
pub const JS_CLASS_ASYNC_FUNCTION_RESOLVE: JSClassID = 53;
pub const JS_CLASS_ASYNC_FUNCTION_REJECT: JSClassID = 54;
pub const JS_CLASS_ASYNC_FROM_SYNC_ITERATOR: JSClassID = 55;
pub const JS_CLASS_ASYNC_GENERATOR_FUNCTION: JSClassID = 56;
pub const JS_CLASS_ASYNC_GENERATOR: JSClassID = 57;

// Eval flags
pub const JS_EVAL_TYPE_GLOBAL: c_int = 0 << 0;
pub const JS_EVAL_TYPE_MODULE: c_int = 1 << 0;
pub const JS_EVAL_TYPE_DIRECT: c_int = 2 << 0;
pub const JS_EVAL_TYPE_INDIRECT: c_int = 3 << 0;
pub const JS_EVAL_TYPE_MASK: c_int = 3 << 0;
pub const JS_EVAL_FLAG_STRICT: c_int = 1 << 3;
pub const JS_EVAL_FLAG_COMPILE_ONLY: c_int = 1 << 5;
pub const JS_EVAL_FLAG_BACKTRACE_BARRIER: c_int = 1 << 6;
pub const JS_EVAL_FLAG_ASYNC: c_int = 1 << 7;

// Property flags
pub const JS_PROP_CONFIGURABLE: c_int = 1 << 0;
pub const JS_PROP_WRITABLE: c_int = 1 << 1;
pub const JS_PROP_ENUMERABLE: c_int = 1 << 2;
pub const JS_PROP_C_W_E: c_int = JS_PROP_CONFIGURABLE | JS_PROP_WRITABLE | JS_PROP_ENUMERABLE;
pub const JS_PROP_THROW: c_int = 1 << 14;

pub const JS_PROP_HAS_SHIFT: c_int = 8;
pub const JS_PROP_HAS_CONFIGURABLE: c_int = 1 << 8;
pub const JS_PROP_HAS_WRITABLE: c_int = 1 << 9;
pub const JS_PROP_HAS_ENUMERABLE: c_int = 1 << 10;
pub const JS_PROP_HAS_GET: c_int = 1 << 11;
pub const JS_PROP_HAS_SET: c_int = 1 << 12;
pub const JS_PROP_HAS_VALUE: c_int = 1 << 13;

// Own-property enumeration flags
pub const JS_GPN_STRING_MASK: c_int = 1 << 0;
pub const JS_GPN_SYMBOL_MASK: c_int = 1 << 1;
pub const JS_GPN_PRIVATE_MASK: c_int = 1 << 2;
pub const JS_GPN_ENUM_ONLY: c_int = 1 << 4;
pub const JS_GPN_SET_ENUM: c_int = 1 << 5;

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct JSPropertyEnum {
    pub is_enumerable: bool,
    pub atom: JSAtom,
}

// Memory accounting snapshot filled by JS_ComputeMemoryUsage
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct JSMemoryUsage {
    pub malloc_size: i64,
    pub malloc_limit: i64,
    pub memory_used_size: i64,
    pub malloc_count: i64,
    pub memory_used_count: i64,
    pub atom_count: i64,
    pub atom_size: i64,
    pub str_count: i64,
    pub str_size: i64,
    pub obj_count: i64,
    pub obj_size: i64,
    pub prop_count: i64,
    pub prop_size: i64,
    pub shape_count: i64,
    pub shape_size: i64,
    pub js_func_count: i64,
    pub js_func_size: i64,
    pub js_func_code_size: i64,
    pub js_func_pc2line_count: i64,
    pub js_func_pc2line_size: i64,
    pub c_func_count: i64,
    pub array_count: i64,
    pub fast_array_count: i64,
    pub fast_array_elements: i64,
    pub binary_object_count: i64,
    pub binary_object_size: i64,
}

// Callback types
pub type JSInterruptHandler =
    unsafe extern "C" fn(rt: *mut JSRuntime, opaque: *mut c_void) -> c_int;

pub type JSCFunctionData = unsafe extern "C" fn(
    ctx: *mut JSContext,
    this_val: JSValue,
    argc: c_int,
    argv: *mut JSValue,
    magic: c_int,
    func_data: *mut JSValue,
) -> JSValue;

pub type JSModuleNormalizeFunc = unsafe extern "C" fn(
    ctx: *mut JSContext,
    module_base_name: *const c_char,
    module_name: *const c_char,
    opaque: *mut c_void,
) -> *mut c_char;

pub type JSModuleLoaderFunc = unsafe extern "C" fn(
    ctx: *mut JSContext,
    module_name: *const c_char,
    opaque: *mut c_void,
) -> *mut JSModuleDef;

unsafe extern "C" {
    // Runtime lifecycle
    pub fn JS_NewRuntime() -> *mut JSRuntime;
    pub fn JS_FreeRuntime(rt: *mut JSRuntime);
    pub fn JS_GetRuntime(ctx: *mut JSContext) -> *mut JSRuntime;
    pub fn JS_SetRuntimeOpaque(rt: *mut JSRuntime, opaque: *mut c_void);
    pub fn JS_GetRuntimeOpaque(rt: *mut JSRuntime) -> *mut c_void;
    pub fn JS_SetMemoryLimit(rt: *mut JSRuntime, limit: usize);
    pub fn JS_SetInterruptHandler(
        rt: *mut JSRuntime,
        cb: Option<JSInterruptHandler>,
        opaque: *mut c_void,
    );
    pub fn JS_ComputeMemoryUsage(rt: *mut JSRuntime, s: *mut JSMemoryUsage);

    // Context lifecycle
    pub fn JS_NewContext(rt: *mut JSRuntime) -> *mut JSContext;
    pub fn JS_FreeContext(ctx: *mut JSContext);

    // Value creation
    pub fn JS_NewObject(ctx: *mut JSContext) -> JSValue;
    pub fn JS_NewObjectProto(ctx: *mut JSContext, proto: JSValue) -> JSValue;
    pub fn JS_NewArray(ctx: *mut JSContext) -> JSValue;
    pub fn JS_NewError(ctx: *mut JSContext) -> JSValue;
    pub fn JS_NewStringLen(ctx: *mut JSContext, s: *const c_char, len: usize) -> JSValue;
    pub fn JS_NewArrayBufferCopy(ctx: *mut JSContext, buf: *const u8, len: usize) -> JSValue;
    pub fn JS_GetArrayBuffer(ctx: *mut JSContext, psize: *mut usize, obj: JSValue) -> *mut u8;
    pub fn JS_NewPromiseCapability(ctx: *mut JSContext, resolving_funcs: *mut JSValue) -> JSValue;

    // Refcounting (exported functions in quickjs-ng; not header inlines)
    pub fn JS_FreeValue(ctx: *mut JSContext, v: JSValue);
    pub fn JS_FreeValueRT(rt: *mut JSRuntime, v: JSValue);

    // Atoms
    pub fn JS_NewAtom(ctx: *mut JSContext, s: *const c_char) -> JSAtom;
    pub fn JS_NewAtomLen(ctx: *mut JSContext, s: *const c_char, len: usize) -> JSAtom;
    pub fn JS_ValueToAtom(ctx: *mut JSContext, val: JSValue) -> JSAtom;
    pub fn JS_DupAtom(ctx: *mut JSContext, v: JSAtom) -> JSAtom;
    pub fn JS_FreeAtom(ctx: *mut JSContext, atom: JSAtom);
    pub fn JS_AtomToString(ctx: *mut JSContext, atom: JSAtom) -> JSValue;

    // Properties
    pub fn JS_GetProperty(ctx: *mut JSContext, this_obj: JSValue, prop: JSAtom) -> JSValue;
    pub fn JS_GetPropertyStr(
        ctx: *mut JSContext,
        this_obj: JSValue,
        prop: *const c_char,
    ) -> JSValue;
    pub fn JS_SetProperty(
        ctx: *mut JSContext,
        this_obj: JSValue,
        prop: JSAtom,
        val: JSValue,
    ) -> c_int;
    pub fn JS_SetPropertyStr(
        ctx: *mut JSContext,
        this_obj: JSValue,
        prop: *const c_char,
        val: JSValue,
    ) -> c_int;
    pub fn JS_HasProperty(ctx: *mut JSContext, this_obj: JSValue, prop: JSAtom) -> c_int;
    pub fn JS_DefineProperty(
        ctx: *mut JSContext,
        this_obj: JSValue,
        prop: JSAtom,
        val: JSValue,
        getter: JSValue,
        setter: JSValue,
        flags: c_int,
    ) -> c_int;
    pub fn JS_DefinePropertyValue(
        ctx: *mut JSContext,
        this_obj: JSValue,
        prop: JSAtom,
        val: JSValue,
        flags: c_int,
    ) -> c_int;
    pub fn JS_DefinePropertyValueStr(
        ctx: *mut JSContext,
        this_obj: JSValue,
        prop: *const c_char,
        val: JSValue,
        flags: c_int,
    ) -> c_int;
    pub fn JS_GetOwnPropertyNames(
        ctx: *mut JSContext,
        ptab: *mut *mut JSPropertyEnum,
        plen: *mut u32,
        obj: JSValue,
        flags: c_int,
    ) -> c_int;
    pub fn JS_FreePropertyEnum(ctx: *mut JSContext, tab: *mut JSPropertyEnum, len: u32);

    // Calls
    pub fn JS_Call(
        ctx: *mut JSContext,
        func_obj: JSValue,
        this_obj: JSValue,
        argc: c_int,
        argv: *mut JSValue,
    ) -> JSValue;
    pub fn JS_CallConstructor(
        ctx: *mut JSContext,
        func_obj: JSValue,
        argc: c_int,
        argv: *mut JSValue,
    ) -> JSValue;
    pub fn JS_SetConstructorBit(ctx: *mut JSContext, func_obj: JSValue, val: bool) -> bool;
    pub fn JS_NewCFunctionData(
        ctx: *mut JSContext,
        func: Option<JSCFunctionData>,
        length: c_int,
        magic: c_int,
        data_len: c_int,
        data: *mut JSValue,
    ) -> JSValue;

    // Evaluation and globals
    pub fn JS_Eval(
        ctx: *mut JSContext,
        input: *const c_char,
        input_len: usize,
        filename: *const c_char,
        eval_flags: c_int,
    ) -> JSValue;
    pub fn JS_GetGlobalObject(ctx: *mut JSContext) -> JSValue;

    // Exceptions
    pub fn JS_GetException(ctx: *mut JSContext) -> JSValue;
    pub fn JS_Throw(ctx: *mut JSContext, obj: JSValue) -> JSValue;
    pub fn JS_ThrowReferenceError(ctx: *mut JSContext, fmt: *const c_char, ...) -> JSValue;

    // Conversions
    pub fn JS_ToBool(ctx: *mut JSContext, val: JSValue) -> c_int;
    pub fn JS_ToFloat64(ctx: *mut JSContext, pres: *mut f64, val: JSValue) -> c_int;
    pub fn JS_ToCStringLen2(
        ctx: *mut JSContext,
        plen: *mut usize,
        val: JSValue,
        cesu8: bool,
    ) -> *const c_char;
    pub fn JS_FreeCString(ctx: *mut JSContext, ptr: *const c_char);

    // Structural predicates (not derivable from the tag alone)
    pub fn JS_IsFunction(ctx: *mut JSContext, val: JSValue) -> bool;
    pub fn JS_IsArray(val: JSValue) -> bool;
    pub fn JS_GetClassID(v: JSValue) -> JSClassID;

    // JSON
    pub fn JS_JSONStringify(
        ctx: *mut JSContext,
        obj: JSValue,
        replacer: JSValue,
        space0: JSValue,
    ) -> JSValue;
    pub fn JS_ParseJSON(
        ctx: *mut JSContext,
        buf: *const c_char,
        buf_len: usize,
        filename: *const c_char,
    ) -> JSValue;

    // Modules
    pub fn JS_SetModuleLoaderFunc(
        rt: *mut JSRuntime,
        module_normalize: Option<JSModuleNormalizeFunc>,
        module_loader: Option<JSModuleLoaderFunc>,
        opaque: *mut c_void,
    );
    pub fn JS_GetImportMeta(ctx: *mut JSContext, m: *mut JSModuleDef) -> JSValue;

    // Job queue
    pub fn JS_IsJobPending(rt: *mut JSRuntime) -> bool;
    pub fn JS_ExecutePendingJob(rt: *mut JSRuntime, pctx: *mut *mut JSContext) -> c_int;
}

// ---------------------------------------------------------------------------
// Inline helpers (mirrors of the C header's static inline functions)
// ---------------------------------------------------------------------------

#[inline]
pub const fn JS_MKVAL(tag: i32, val: i32) -> JSValue {
    JSValue {
        u: JSValueUnion { int32: val },
        tag: tag as i64,
    }
}

#[inline]
pub const fn JS_MKPTR(tag: i32, ptr: *mut c_void) -> JSValue {
    JSValue {
        u: JSValueUnion { ptr },
        tag: tag as i64,
    }
}

pub const JS_UNDEFINED: JSValue = JS_MKVAL(JS_TAG_UNDEFINED, 0);
pub const JS_NULL: JSValue = JS_MKVAL(JS_TAG_NULL, 0);
pub const JS_FALSE: JSValue = JS_MKVAL(JS_TAG_BOOL, 0);
pub const JS_TRUE: JSValue = JS_MKVAL(JS_TAG_BOOL, 1);
pub const JS_EXCEPTION: JSValue = JS_MKVAL(JS_TAG_EXCEPTION, 0);
pub const JS_UNINITIALIZED: JSValue = JS_MKVAL(JS_TAG_UNINITIALIZED, 0);

#[inline]
pub fn JS_VALUE_GET_TAG(v: JSValue) -> i32 {
    v.tag as i32
}

#[inline]
pub fn JS_VALUE_GET_PTR(v: JSValue) -> *mut c_void {
    // SAFETY: only meaningful for pointer-tagged values; reading the union
    // field itself is always defined
    unsafe { v.u.ptr }
}

#[inline]
pub fn JS_VALUE_GET_INT(v: JSValue) -> i32 {
    unsafe { v.u.int32 }
}

#[inline]
pub fn JS_VALUE_GET_BOOL(v: JSValue) -> bool {
    unsafe { v.u.int32 != 0 }
}

#[inline]
pub fn JS_VALUE_GET_FLOAT64(v: JSValue) -> f64 {
    unsafe { v.u.float64 }
}

#[inline]
pub fn JS_TAG_IS_FLOAT64(tag: i32) -> bool {
    tag == JS_TAG_FLOAT64
}

#[inline]
pub fn JS_VALUE_HAS_REF_COUNT(v: JSValue) -> bool {
    let tag = JS_VALUE_GET_TAG(v);
    (JS_TAG_FIRST..=JS_TAG_OBJECT).contains(&tag)
}

#[inline]
pub const fn JS_NewBool(val: bool) -> JSValue {
    JS_MKVAL(JS_TAG_BOOL, val as i32)
}

#[inline]
pub const fn JS_NewInt32(val: i32) -> JSValue {
    JS_MKVAL(JS_TAG_INT, val)
}

#[inline]
pub const fn JS_NewFloat64(val: f64) -> JSValue {
    JSValue {
        u: JSValueUnion { float64: val },
        tag: JS_TAG_FLOAT64 as i64,
    }
}

/// Small integers keep the int tag; everything else becomes a float64.
#[inline]
pub fn JS_NewInt64(val: i64) -> JSValue {
    if let Ok(v) = i32::try_from(val) {
        JS_NewInt32(v)
    } else {
        JS_NewFloat64(val as f64)
    }
}

#[inline]
pub fn JS_IsUndefined(v: JSValue) -> bool {
    JS_VALUE_GET_TAG(v) == JS_TAG_UNDEFINED
}

#[inline]
pub fn JS_IsNull(v: JSValue) -> bool {
    JS_VALUE_GET_TAG(v) == JS_TAG_NULL
}

#[inline]
pub fn JS_IsBool(v: JSValue) -> bool {
    JS_VALUE_GET_TAG(v) == JS_TAG_BOOL
}

#[inline]
pub fn JS_IsNumber(v: JSValue) -> bool {
    let tag = JS_VALUE_GET_TAG(v);
    tag == JS_TAG_INT || JS_TAG_IS_FLOAT64(tag)
}

#[inline]
pub fn JS_IsBigInt(v: JSValue) -> bool {
    let tag = JS_VALUE_GET_TAG(v);
    tag == JS_TAG_BIG_INT || tag == JS_TAG_SHORT_BIG_INT
}

#[inline]
pub fn JS_IsString(v: JSValue) -> bool {
    let tag = JS_VALUE_GET_TAG(v);
    tag == JS_TAG_STRING || tag == JS_TAG_STRING_ROPE
}

#[inline]
pub fn JS_IsSymbol(v: JSValue) -> bool {
    JS_VALUE_GET_TAG(v) == JS_TAG_SYMBOL
}

#[inline]
pub fn JS_IsObject(v: JSValue) -> bool {
    JS_VALUE_GET_TAG(v) == JS_TAG_OBJECT
}

#[inline]
pub fn JS_IsException(v: JSValue) -> bool {
    JS_VALUE_GET_TAG(v) == JS_TAG_EXCEPTION
}

#[inline]
pub fn JS_IsUninitialized(v: JSValue) -> bool {
    JS_VALUE_GET_TAG(v) == JS_TAG_UNINITIALIZED
}

/// Increment the refcount of a heap value and return it.
///
/// # Safety
/// `v` must be a live value belonging to `ctx`'s runtime.
#[inline]
pub unsafe fn JS_DupValue(_ctx: *mut JSContext, v: JSValue) -> JSValue {
    if JS_VALUE_HAS_REF_COUNT(v) {
        // SAFETY: refcounted tags always carry a valid header pointer
        unsafe {
            let header = JS_VALUE_GET_PTR(v) as *mut JSRefCountHeader;
            (*header).ref_count += 1;
        }
    }
    v
}

/// Create a string from a NUL-terminated UTF-8 buffer.
///
/// Mirrors the header's `static inline JS_NewString`, which forwards to
/// `JS_NewStringLen` with `strlen`.
///
/// # Safety
/// `s` must point at a valid NUL-terminated string.
#[inline]
pub unsafe fn JS_NewString(ctx: *mut JSContext, s: *const c_char) -> JSValue {
    // SAFETY: forwarded caller contract
    unsafe { JS_NewStringLen(ctx, s, std::ffi::CStr::from_ptr(s).to_bytes().len()) }
}

/// UTF-8 view of a value, without length.
///
/// # Safety
/// `ctx` and `val` must be valid; the result must be released with
/// [`JS_FreeCString`].
#[inline]
pub unsafe fn JS_ToCString(ctx: *mut JSContext, val: JSValue) -> *const c_char {
    let mut len = 0usize;
    // SAFETY: forwarded caller contract
    unsafe { JS_ToCStringLen2(ctx, &mut len, val, false) }
}
