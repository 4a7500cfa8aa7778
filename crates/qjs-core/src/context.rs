//! Execution contexts: evaluation, value construction, property access and
//! call dispatch

use std::ffi::CString;
use std::marker::PhantomData;

use qjs_sys as q;

use crate::atom::{Atom, EnumFilter, PropertyNames};
use crate::error::{QjsError, QjsResult};
use crate::hooks::dispatch_trampoline;
use crate::runtime::Runtime;
use crate::value::{OwnedValue, ValueRef};

/// How a source text is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalMode {
    /// Classic script, result is the completion value.
    Global,
    /// ES module, evaluated immediately.
    Module,
    /// ES module, compiled but not evaluated.
    ModuleCompileOnly,
}

impl EvalMode {
    fn to_flags(self) -> std::os::raw::c_int {
        match self {
            EvalMode::Global => q::JS_EVAL_TYPE_GLOBAL,
            EvalMode::Module => q::JS_EVAL_TYPE_MODULE,
            EvalMode::ModuleCompileOnly => q::JS_EVAL_TYPE_MODULE | q::JS_EVAL_FLAG_COMPILE_ONLY,
        }
    }
}

/// Descriptor arguments for [`Context::define_property`].
pub struct PropertyDescriptor<'a> {
    pub value: ValueRef<'a>,
    pub getter: Option<ValueRef<'a>>,
    pub setter: Option<ValueRef<'a>>,
    pub configurable: bool,
    pub enumerable: bool,
    /// Data-descriptor writability; only meaningful together with
    /// `has_value`.
    pub writable: bool,
    /// Whether `value` participates in the definition. Accessor-only
    /// definitions pass `false` with an undefined `value`.
    pub has_value: bool,
}

/// An execution context bound to a [`Runtime`].
///
/// All value operations go through a context. Not `Send` or `Sync`.
pub struct Context {
    ctx: *mut q::JSContext,
    _not_send: PhantomData<*mut ()>,
}

impl Context {
    pub fn new(runtime: &Runtime) -> QjsResult<Self> {
        // SAFETY: the runtime handle is live
        let ctx = unsafe { q::JS_NewContext(runtime.as_raw()) };
        if ctx.is_null() {
            return Err(QjsError::context_creation("engine returned null context"));
        }
        Ok(Context {
            ctx,
            _not_send: PhantomData,
        })
    }

    pub fn as_raw(&self) -> *mut q::JSContext {
        self.ctx
    }

    /// Releases the wrapper without freeing the context.
    pub fn into_raw(self) -> *mut q::JSContext {
        let ctx = self.ctx;
        std::mem::forget(self);
        ctx
    }

    /// Reassembles a wrapper from a raw handle produced by [`into_raw`].
    ///
    /// # Safety
    /// `ctx` must come from `into_raw` and must not be freed elsewhere.
    ///
    /// [`into_raw`]: Context::into_raw
    pub unsafe fn from_raw(ctx: *mut q::JSContext) -> Self {
        Context {
            ctx,
            _not_send: PhantomData,
        }
    }

    fn own(&self, raw: q::JSValue) -> OwnedValue {
        // SAFETY: raw was just produced by an engine call returning ownership
        unsafe { OwnedValue::from_raw(self.ctx, raw) }
    }

    // -----------------------------------------------------------------
    // Evaluation
    // -----------------------------------------------------------------

    /// Evaluates source text. The result may be the exception sentinel; use
    /// [`resolve_exception`] or [`check`] to inspect it.
    ///
    /// [`resolve_exception`]: Context::resolve_exception
    /// [`check`]: Context::check
    pub fn eval_raw(&self, source: &str, filename: &str, mode: EvalMode) -> QjsResult<OwnedValue> {
        self.eval_flags(source, filename, mode.to_flags())
    }

    /// Evaluation entry with a raw engine flag word, for callers that carry
    /// flags across the C boundary.
    pub fn eval_flags(
        &self,
        source: &str,
        filename: &str,
        flags: std::os::raw::c_int,
    ) -> QjsResult<OwnedValue> {
        // The engine wants a NUL-terminated buffer but takes the length
        // separately, so interior NULs in the source are legal input
        let mut source_z = Vec::with_capacity(source.len() + 1);
        source_z.extend_from_slice(source.as_bytes());
        source_z.push(0);
        let cfilename = CString::new(filename).map_err(|_| QjsError::SourceEncoding)?;
        // SAFETY: both buffers are NUL-terminated and live across the call
        let raw = unsafe {
            q::JS_Eval(
                self.ctx,
                source_z.as_ptr().cast(),
                source.len(),
                cfilename.as_ptr(),
                flags,
            )
        };
        Ok(self.own(raw))
    }

    /// Evaluates source text and converts a thrown exception into a
    /// structured error.
    pub fn eval(&self, source: &str, filename: &str, mode: EvalMode) -> QjsResult<OwnedValue> {
        let value = self.eval_raw(source, filename, mode)?;
        self.check(value)
    }

    /// Maps the exception sentinel to a structured [`QjsError::Script`],
    /// passing every other value through.
    pub fn check(&self, value: OwnedValue) -> QjsResult<OwnedValue> {
        if value.is_exception() {
            Err(self.exception_to_error())
        } else {
            Ok(value)
        }
    }

    // -----------------------------------------------------------------
    // Value construction
    // -----------------------------------------------------------------

    pub fn global_object(&self) -> OwnedValue {
        // SAFETY: ctx is live
        self.own(unsafe { q::JS_GetGlobalObject(self.ctx) })
    }

    pub fn new_object(&self) -> OwnedValue {
        // SAFETY: ctx is live
        self.own(unsafe { q::JS_NewObject(self.ctx) })
    }

    pub fn new_object_with_proto(&self, proto: ValueRef<'_>) -> OwnedValue {
        // SAFETY: proto is borrowed, not consumed, by the engine
        self.own(unsafe { q::JS_NewObjectProto(self.ctx, proto.raw()) })
    }

    pub fn new_array(&self) -> OwnedValue {
        // SAFETY: ctx is live
        self.own(unsafe { q::JS_NewArray(self.ctx) })
    }

    pub fn new_error(&self) -> OwnedValue {
        // SAFETY: ctx is live
        self.own(unsafe { q::JS_NewError(self.ctx) })
    }

    pub fn new_float64(&self, value: f64) -> OwnedValue {
        self.own(q::JS_NewFloat64(value))
    }

    pub fn new_int32(&self, value: i32) -> OwnedValue {
        self.own(q::JS_NewInt32(value))
    }

    pub fn new_bool(&self, value: bool) -> OwnedValue {
        self.own(q::JS_NewBool(value))
    }

    pub fn new_string(&self, value: &str) -> OwnedValue {
        // SAFETY: the engine copies `len` bytes, embedded NULs allowed
        self.own(unsafe {
            q::JS_NewStringLen(self.ctx, value.as_ptr() as *const _, value.len())
        })
    }

    /// `new Date(epoch_ms)` through the context's own Date constructor.
    pub fn new_date(&self, epoch_ms: f64) -> OwnedValue {
        let global = self.global_object();
        let ctor = self.get_property_str(global.as_ref(), "Date");
        let arg = self.new_float64(epoch_ms);
        let date = self.call_constructor(ctor.as_ref(), &[arg.as_ref()]);
        date
    }

    pub fn new_array_buffer_copy(&self, bytes: &[u8]) -> OwnedValue {
        // SAFETY: the engine copies the byte range
        self.own(unsafe { q::JS_NewArrayBufferCopy(self.ctx, bytes.as_ptr(), bytes.len()) })
    }

    /// Backing store of an ArrayBuffer, or `None` for other values. The
    /// pointer stays valid while the buffer is alive and undetached.
    pub fn array_buffer_bytes(&self, value: ValueRef<'_>) -> Option<(*mut u8, usize)> {
        let mut len = 0usize;
        // SAFETY: ctx and value are live; a non-buffer yields null
        let ptr = unsafe { q::JS_GetArrayBuffer(self.ctx, &mut len, value.raw()) };
        if ptr.is_null() { None } else { Some((ptr, len)) }
    }

    /// Creates a promise with its resolving functions:
    /// `(promise, resolve, reject)`.
    pub fn new_promise_capability(&self) -> QjsResult<(OwnedValue, OwnedValue, OwnedValue)> {
        let mut funcs = [q::JS_UNDEFINED; 2];
        // SAFETY: funcs has the two slots the engine fills
        let promise = unsafe { q::JS_NewPromiseCapability(self.ctx, funcs.as_mut_ptr()) };
        let promise = self.check(self.own(promise))?;
        Ok((promise, self.own(funcs[0]), self.own(funcs[1])))
    }

    /// Wraps a closure-data value in a callable function object that routes
    /// through the runtime's host dispatcher.
    pub fn new_function(&self, data: ValueRef<'_>, name: Option<&str>) -> QjsResult<OwnedValue> {
        let mut fn_data = data.raw();
        // SAFETY: NewCFunctionData duplicates the data slot, fn_data stays
        // owned by the caller
        let func = self.own(unsafe {
            q::JS_NewCFunctionData(self.ctx, Some(dispatch_trampoline), 0, 0, 1, &mut fn_data)
        });
        let func = self.check(func)?;
        if let Some(name) = name {
            let name_value = self.new_string(name);
            // SAFETY: DefinePropertyValueStr consumes the name value
            unsafe {
                q::JS_DefinePropertyValueStr(
                    self.ctx,
                    func.raw(),
                    c"name".as_ptr(),
                    name_value.into_raw(),
                    q::JS_PROP_CONFIGURABLE,
                );
            }
        }
        Ok(func)
    }

    // -----------------------------------------------------------------
    // Property access
    // -----------------------------------------------------------------

    /// Property lookup by arbitrary key value. The key is interned for the
    /// duration of the lookup only.
    pub fn get_property(&self, obj: ValueRef<'_>, key: ValueRef<'_>) -> OwnedValue {
        let atom = Atom::from_value(key);
        self.get_property_atom(obj, &atom)
    }

    pub fn get_property_atom(&self, obj: ValueRef<'_>, atom: &Atom) -> OwnedValue {
        // SAFETY: obj is borrowed, the result is owned
        self.own(unsafe { q::JS_GetProperty(self.ctx, obj.raw(), atom.raw()) })
    }

    pub fn get_property_str(&self, obj: ValueRef<'_>, name: &str) -> OwnedValue {
        match Atom::from_str(self.ctx, name) {
            Ok(atom) => self.get_property_atom(obj, &atom),
            Err(_) => self.own(q::JS_UNDEFINED),
        }
    }

    /// Property store by arbitrary key value. The stored value is borrowed;
    /// an extra reference is taken for the consuming engine call.
    pub fn set_property(&self, obj: ValueRef<'_>, key: ValueRef<'_>, value: ValueRef<'_>) {
        let atom = Atom::from_value(key);
        self.set_property_atom(obj, &atom, value);
    }

    pub fn set_property_atom(&self, obj: ValueRef<'_>, atom: &Atom, value: ValueRef<'_>) {
        // SAFETY: SetProperty consumes one reference to value, which the dup
        // provides; a failed store leaves the exception pending
        unsafe {
            let owned = q::JS_DupValue(self.ctx, value.raw());
            q::JS_SetProperty(self.ctx, obj.raw(), atom.raw(), owned);
        }
    }

    pub fn has_property(&self, obj: ValueRef<'_>, key: ValueRef<'_>) -> QjsResult<bool> {
        let atom = Atom::from_value(key);
        self.has_property_atom(obj, &atom)
    }

    pub fn has_property_atom(&self, obj: ValueRef<'_>, atom: &Atom) -> QjsResult<bool> {
        // SAFETY: obj is borrowed
        let status = unsafe { q::JS_HasProperty(self.ctx, obj.raw(), atom.raw()) };
        if status < 0 {
            return Err(self.exception_to_error());
        }
        Ok(status != 0)
    }

    /// Full descriptor definition, assembling the engine flag word from the
    /// descriptor fields.
    pub fn define_property(
        &self,
        obj: ValueRef<'_>,
        key: ValueRef<'_>,
        desc: &PropertyDescriptor<'_>,
    ) -> QjsResult<()> {
        let atom = Atom::from_value(key);
        let mut flags = q::JS_PROP_THROW;
        if desc.configurable {
            flags |= q::JS_PROP_HAS_CONFIGURABLE | q::JS_PROP_CONFIGURABLE;
        }
        if desc.enumerable {
            flags |= q::JS_PROP_HAS_ENUMERABLE | q::JS_PROP_ENUMERABLE;
        }
        let getter = desc.getter.map(|g| g.raw()).unwrap_or(q::JS_UNDEFINED);
        let setter = desc.setter.map(|s| s.raw()).unwrap_or(q::JS_UNDEFINED);
        if !q::JS_IsUndefined(getter) {
            flags |= q::JS_PROP_HAS_GET;
        }
        if !q::JS_IsUndefined(setter) {
            flags |= q::JS_PROP_HAS_SET;
        }
        if desc.has_value {
            flags |= q::JS_PROP_HAS_VALUE | q::JS_PROP_HAS_WRITABLE;
            if desc.writable {
                flags |= q::JS_PROP_WRITABLE;
            }
        }
        // SAFETY: DefineProperty borrows value/getter/setter
        let status = unsafe {
            q::JS_DefineProperty(
                self.ctx,
                obj.raw(),
                atom.raw(),
                desc.value.raw(),
                getter,
                setter,
                flags,
            )
        };
        if status < 0 {
            return Err(self.exception_to_error());
        }
        Ok(())
    }

    /// Enumerates own property keys, transferring each atom into an owned
    /// [`PropertyNames`] collection.
    pub fn own_property_names(
        &self,
        obj: ValueRef<'_>,
        filter: EnumFilter,
    ) -> QjsResult<PropertyNames> {
        let mut tab: *mut q::JSPropertyEnum = std::ptr::null_mut();
        let mut len: u32 = 0;
        // SAFETY: tab/len receive the engine-allocated enumeration
        let status = unsafe {
            q::JS_GetOwnPropertyNames(self.ctx, &mut tab, &mut len, obj.raw(), filter.to_flags())
        };
        if status < 0 {
            return Err(self.exception_to_error());
        }
        let mut atoms = Vec::with_capacity(len as usize);
        // SAFETY: tab holds len entries; each atom is duplicated so that
        // freeing the enumeration below does not invalidate the collection
        unsafe {
            for i in 0..len as usize {
                let entry = *tab.add(i);
                atoms.push(Atom::from_raw(self.ctx, q::JS_DupAtom(self.ctx, entry.atom)));
            }
            q::JS_FreePropertyEnum(self.ctx, tab, len);
        }
        Ok(PropertyNames::new(atoms))
    }

    // -----------------------------------------------------------------
    // Calls
    // -----------------------------------------------------------------

    fn materialize_args(args: &[ValueRef<'_>]) -> Vec<q::JSValue> {
        args.iter().map(|a| a.raw()).collect()
    }

    /// Invokes a callable. The result may be the exception sentinel.
    pub fn call(
        &self,
        func: ValueRef<'_>,
        this: ValueRef<'_>,
        args: &[ValueRef<'_>],
    ) -> OwnedValue {
        let mut argv = Self::materialize_args(args);
        // SAFETY: argv is a contiguous borrowed argument block for the call
        self.own(unsafe {
            q::JS_Call(
                self.ctx,
                func.raw(),
                this.raw(),
                argv.len() as _,
                argv.as_mut_ptr(),
            )
        })
    }

    /// Invokes a callable and discards the result, reporting only whether it
    /// threw.
    pub fn call_void(
        &self,
        func: ValueRef<'_>,
        this: ValueRef<'_>,
        args: &[ValueRef<'_>],
    ) -> QjsResult<()> {
        let result = self.call(func, this, args);
        self.check(result).map(drop)
    }

    /// `new`-constructs through a constructor function.
    pub fn call_constructor(&self, func: ValueRef<'_>, args: &[ValueRef<'_>]) -> OwnedValue {
        let mut argv = Self::materialize_args(args);
        // SAFETY: as in call
        self.own(unsafe {
            q::JS_CallConstructor(self.ctx, func.raw(), argv.len() as _, argv.as_mut_ptr())
        })
    }

    /// Marks a function object as constructable.
    pub fn set_constructor_bit(&self, func: ValueRef<'_>, constructable: bool) -> bool {
        // SAFETY: func is borrowed
        unsafe { q::JS_SetConstructorBit(self.ctx, func.raw(), constructable) }
    }

    // -----------------------------------------------------------------
    // Conversions
    // -----------------------------------------------------------------

    /// Numeric coercion; NaN when the value cannot be coerced.
    pub fn to_f64(&self, value: ValueRef<'_>) -> f64 {
        let mut out = 0f64;
        // SAFETY: value is borrowed
        let status = unsafe { q::JS_ToFloat64(self.ctx, &mut out, value.raw()) };
        if status < 0 { f64::NAN } else { out }
    }

    /// Boolean coercion.
    pub fn to_bool(&self, value: ValueRef<'_>) -> QjsResult<bool> {
        // SAFETY: value is borrowed
        let status = unsafe { q::JS_ToBool(self.ctx, value.raw()) };
        if status < 0 {
            return Err(self.exception_to_error());
        }
        Ok(status != 0)
    }

    /// String coercion, lossy on invalid UTF-8. Embedded U+0000 code points
    /// survive; the engine reports the byte length alongside the buffer.
    pub fn to_string_lossy(&self, value: ValueRef<'_>) -> QjsResult<String> {
        // SAFETY: value is borrowed; the C string is released before return
        unsafe {
            let mut len = 0usize;
            let ptr = q::JS_ToCStringLen2(self.ctx, &mut len, value.raw(), false);
            if ptr.is_null() {
                return Err(QjsError::StringEncoding(
                    "engine could not stringify value".into(),
                ));
            }
            let bytes = std::slice::from_raw_parts(ptr as *const u8, len);
            let s = String::from_utf8_lossy(bytes).into_owned();
            q::JS_FreeCString(self.ctx, ptr);
            Ok(s)
        }
    }

    /// Deserializes a value through its JSON representation.
    pub fn deserialize<T: serde::de::DeserializeOwned>(
        &self,
        value: ValueRef<'_>,
    ) -> QjsResult<T> {
        let json = self.json_stringify(value)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub(crate) fn json_stringify(&self, value: ValueRef<'_>) -> QjsResult<String> {
        // SAFETY: all inputs borrowed, result owned
        let raw = unsafe {
            q::JS_JSONStringify(self.ctx, value.raw(), q::JS_UNDEFINED, q::JS_UNDEFINED)
        };
        let owned = self.check(self.own(raw))?;
        if owned.is_undefined() {
            // JSON.stringify yields undefined for symbols and functions
            return Err(QjsError::StringEncoding(
                "value has no JSON representation".into(),
            ));
        }
        self.to_string_lossy(owned.as_ref())
    }

    pub(crate) fn json_parse(&self, text: &str, filename: &str) -> QjsResult<OwnedValue> {
        let ctext = CString::new(text).map_err(|_| QjsError::SourceEncoding)?;
        let cfilename = CString::new(filename).map_err(|_| QjsError::SourceEncoding)?;
        // SAFETY: both strings are NUL-terminated
        let raw = unsafe {
            q::JS_ParseJSON(self.ctx, ctext.as_ptr(), text.len(), cfilename.as_ptr())
        };
        self.check(self.own(raw))
    }

    // -----------------------------------------------------------------
    // Exceptions
    // -----------------------------------------------------------------

    /// Throws a value as an exception. The argument is borrowed; a reference
    /// is taken for the consuming throw primitive. Returns the exception
    /// sentinel.
    pub fn throw(&self, error: ValueRef<'_>) -> OwnedValue {
        // SAFETY: the dup provides the reference JS_Throw consumes
        self.own(unsafe {
            let owned = q::JS_DupValue(self.ctx, error.raw());
            q::JS_Throw(self.ctx, owned)
        })
    }

    /// Fetches and clears the pending exception.
    pub fn take_exception(&self) -> OwnedValue {
        // SAFETY: ctx is live; GetException transfers the pending value
        self.own(unsafe { q::JS_GetException(self.ctx) })
    }

    /// The error-resolution protocol: the exception sentinel resolves to the
    /// pending exception (fetched and cleared); anything else to `None`.
    pub fn resolve_exception(&self, maybe_exception: ValueRef<'_>) -> Option<OwnedValue> {
        if maybe_exception.is_exception() {
            Some(self.take_exception())
        } else {
            None
        }
    }

    /// Converts the pending exception into a structured error with the
    /// JavaScript error name, message and stack.
    pub fn exception_to_error(&self) -> QjsError {
        let exception = self.take_exception();
        let exc = exception.as_ref();
        let message = self
            .to_string_lossy(exc)
            .unwrap_or_else(|_| "unknown error".to_string());
        if !exc.is_object() {
            return QjsError::script("Error", message);
        }
        let name = self.get_property_str(exc, "name");
        let error_type = if name.is_undefined() {
            "Error".to_string()
        } else {
            self.to_string_lossy(name.as_ref())
                .unwrap_or_else(|_| "Error".to_string())
        };
        let stack = self.get_property_str(exc, "stack");
        if stack.is_undefined() {
            QjsError::script(error_type, message)
        } else {
            match self.to_string_lossy(stack.as_ref()) {
                Ok(stack) => QjsError::script_with_stack(error_type, message, stack),
                Err(_) => QjsError::script(error_type, message),
            }
        }
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        // SAFETY: the wrapper holds the only reference to this context
        unsafe { q::JS_FreeContext(self.ctx) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Runtime, Context) {
        let rt = Runtime::new().unwrap();
        let ctx = Context::new(&rt).unwrap();
        (rt, ctx)
    }

    #[test]
    fn test_eval_number() {
        let (_rt, ctx) = fixture();
        let v = ctx.eval("40 + 2", "test.js", EvalMode::Global).unwrap();
        assert_eq!(ctx.to_f64(v.as_ref()), 42.0);
    }

    #[test]
    fn test_eval_string() {
        let (_rt, ctx) = fixture();
        let v = ctx
            .eval("'hello' + ' ' + 'world'", "test.js", EvalMode::Global)
            .unwrap();
        assert_eq!(ctx.to_string_lossy(v.as_ref()).unwrap(), "hello world");
    }

    #[test]
    fn test_eval_source_with_interior_nul() {
        let (_rt, ctx) = fixture();
        let v = ctx
            .eval("'a\0b'.length", "test.js", EvalMode::Global)
            .unwrap();
        assert_eq!(ctx.to_f64(v.as_ref()), 3.0);
    }

    #[test]
    fn test_string_with_embedded_nul_survives_coercion() {
        let (_rt, ctx) = fixture();
        let v = ctx
            .eval("'a' + String.fromCharCode(0) + 'b'", "test.js", EvalMode::Global)
            .unwrap();
        assert_eq!(ctx.to_string_lossy(v.as_ref()).unwrap(), "a\0b");
    }

    #[test]
    fn test_eval_error() {
        let (_rt, ctx) = fixture();
        let err = ctx
            .eval("nosuchvariable", "test.js", EvalMode::Global)
            .unwrap_err();
        assert!(err.is_script_error());
        assert_eq!(err.error_type(), Some("ReferenceError"));
    }

    #[test]
    fn test_set_get_global() {
        let (_rt, ctx) = fixture();
        let global = ctx.global_object();
        let key = ctx.new_string("answer");
        let value = ctx.new_float64(42.0);
        ctx.set_property(global.as_ref(), key.as_ref(), value.as_ref());
        let back = ctx.eval("answer", "test.js", EvalMode::Global).unwrap();
        assert_eq!(ctx.to_f64(back.as_ref()), 42.0);
    }

    #[test]
    fn test_property_by_value_key() {
        let (_rt, ctx) = fixture();
        let obj = ctx.new_object();
        let key = ctx.new_string("k");
        let value = ctx.new_string("v");
        ctx.set_property(obj.as_ref(), key.as_ref(), value.as_ref());
        assert!(ctx.has_property(obj.as_ref(), key.as_ref()).unwrap());
        let got = ctx.get_property(obj.as_ref(), key.as_ref());
        assert_eq!(ctx.to_string_lossy(got.as_ref()).unwrap(), "v");
    }

    #[test]
    fn test_define_non_enumerable_property() {
        let (_rt, ctx) = fixture();
        let obj = ctx.new_object();
        let key = ctx.new_string("hidden");
        let value = ctx.new_float64(1.0);
        ctx.define_property(
            obj.as_ref(),
            key.as_ref(),
            &PropertyDescriptor {
                value: value.as_ref(),
                getter: None,
                setter: None,
                configurable: true,
                enumerable: false,
                writable: true,
                has_value: true,
            },
        )
        .unwrap();
        let names = ctx
            .own_property_names(
                obj.as_ref(),
                EnumFilter {
                    strings: true,
                    symbols: false,
                    enumerable_only: true,
                },
            )
            .unwrap();
        assert!(names.is_empty());
        let all = ctx
            .own_property_names(obj.as_ref(), EnumFilter::default())
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_enumeration_names() {
        let (_rt, ctx) = fixture();
        let obj = ctx
            .eval("({a: 1, b: 2})", "test.js", EvalMode::Global)
            .unwrap();
        let names = ctx
            .own_property_names(obj.as_ref(), EnumFilter::default())
            .unwrap();
        let rendered: Vec<String> = names
            .iter()
            .map(|a| ctx.to_string_lossy(a.to_value().as_ref()).unwrap())
            .collect();
        assert_eq!(rendered, vec!["a", "b"]);
    }

    #[test]
    fn test_call_function() {
        let (_rt, ctx) = fixture();
        let func = ctx
            .eval("(function (a, b) { return a * b; })", "test.js", EvalMode::Global)
            .unwrap();
        let a = ctx.new_float64(6.0);
        let b = ctx.new_float64(7.0);
        let result = ctx.call(
            func.as_ref(),
            ctx.global_object().as_ref(),
            &[a.as_ref(), b.as_ref()],
        );
        let result = ctx.check(result).unwrap();
        assert_eq!(ctx.to_f64(result.as_ref()), 42.0);
    }

    #[test]
    fn test_call_constructor() {
        let (_rt, ctx) = fixture();
        let ctor = ctx
            .eval(
                "(class Point { constructor(x) { this.x = x; } })",
                "test.js",
                EvalMode::Global,
            )
            .unwrap();
        let x = ctx.new_float64(3.0);
        let point = ctx.call_constructor(ctor.as_ref(), &[x.as_ref()]);
        let point = ctx.check(point).unwrap();
        let got = ctx.get_property_str(point.as_ref(), "x");
        assert_eq!(ctx.to_f64(got.as_ref()), 3.0);
    }

    #[test]
    fn test_resolve_exception_protocol() {
        let (_rt, ctx) = fixture();
        let ok = ctx.eval_raw("1 + 1", "test.js", EvalMode::Global).unwrap();
        assert!(ctx.resolve_exception(ok.as_ref()).is_none());

        let bad = ctx
            .eval_raw("throw new TypeError('boom')", "test.js", EvalMode::Global)
            .unwrap();
        let exc = ctx.resolve_exception(bad.as_ref()).unwrap();
        let message = ctx.get_property_str(exc.as_ref(), "message");
        assert_eq!(ctx.to_string_lossy(message.as_ref()).unwrap(), "boom");
        // Resolving cleared the pending slot
        let cleared = ctx.take_exception();
        assert!(cleared.is_null() || cleared.is_undefined());
    }

    #[test]
    fn test_throw_sets_pending() {
        let (_rt, ctx) = fixture();
        let error = ctx.new_error();
        let sentinel = ctx.throw(error.as_ref());
        assert!(sentinel.is_exception());
        let pending = ctx.take_exception();
        assert!(pending.is_object());
    }

    #[test]
    fn test_new_date() {
        let (_rt, ctx) = fixture();
        let date = ctx.new_date(86_400_000.0);
        let date = ctx.check(date).unwrap();
        let get_time = ctx.get_property_str(date.as_ref(), "getTime");
        let ms = ctx.call(get_time.as_ref(), date.as_ref(), &[]);
        let ms = ctx.check(ms).unwrap();
        assert_eq!(ctx.to_f64(ms.as_ref()), 86_400_000.0);
    }

    #[test]
    fn test_array_buffer_roundtrip() {
        let (_rt, ctx) = fixture();
        let buf = ctx.new_array_buffer_copy(&[1, 2, 3, 4]);
        let (ptr, len) = ctx.array_buffer_bytes(buf.as_ref()).unwrap();
        assert_eq!(len, 4);
        // SAFETY: buf is alive and undetached for this scope
        let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
        assert_eq!(bytes, &[1, 2, 3, 4]);
        assert!(ctx.array_buffer_bytes(ctx.new_float64(1.0).as_ref()).is_none());
    }

    #[test]
    fn test_promise_capability() {
        let (_rt, ctx) = fixture();
        let (promise, resolve, reject) = ctx.new_promise_capability().unwrap();
        assert!(promise.is_object());
        assert!(resolve.as_ref().is_function());
        assert!(reject.as_ref().is_function());
    }

    #[test]
    fn test_deserialize() {
        let (_rt, ctx) = fixture();
        let v = ctx
            .eval("({x: 1, y: [true, null]})", "test.js", EvalMode::Global)
            .unwrap();
        let parsed: serde_json::Value = ctx.deserialize(v.as_ref()).unwrap();
        assert_eq!(parsed["x"], 1);
        assert_eq!(parsed["y"][0], true);
    }

    #[test]
    fn test_to_f64_nan_default() {
        let (_rt, ctx) = fixture();
        let sym = ctx
            .eval("Symbol('s')", "test.js", EvalMode::Global)
            .unwrap();
        assert!(ctx.to_f64(sym.as_ref()).is_nan());
        // Coercion failure leaves an exception pending; clear it
        let _ = ctx.take_exception();
    }
}
