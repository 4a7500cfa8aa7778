//! Ownership-typed handles for engine values
//!
//! Heap values in the engine are reference counted. [`OwnedValue`] holds one
//! reference and releases it on drop; cloning takes an additional reference.
//! [`ValueRef`] is a read-only borrow view that never touches the refcount,
//! used for parameters that must not consume their argument.

use std::marker::PhantomData;

use qjs_sys as q;

/// An owned reference to an engine value.
///
/// Dropping releases the reference. Primitive tags (int, bool, undefined, ...)
/// carry no refcount and the release is a no-op for them.
pub struct OwnedValue {
    raw: q::JSValue,
    ctx: *mut q::JSContext,
    // Engine values are bound to their thread
    _not_send: PhantomData<*mut ()>,
}

impl OwnedValue {
    /// Takes ownership of a raw value reference.
    ///
    /// # Safety
    /// `raw` must be a live value belonging to `ctx`, with one reference
    /// transferred to the wrapper. The context must outlive the wrapper.
    pub unsafe fn from_raw(ctx: *mut q::JSContext, raw: q::JSValue) -> Self {
        OwnedValue {
            raw,
            ctx,
            _not_send: PhantomData,
        }
    }

    /// Releases the wrapper without releasing the value, transferring the
    /// reference back to the caller.
    pub fn into_raw(self) -> q::JSValue {
        let raw = self.raw;
        std::mem::forget(self);
        raw
    }

    /// Raw value without affecting ownership.
    pub fn raw(&self) -> q::JSValue {
        self.raw
    }

    /// Context the value belongs to. A job exception, for example, lives on
    /// the context its job ran on, not necessarily the caller's.
    pub fn context(&self) -> *mut q::JSContext {
        self.ctx
    }

    /// Borrow view of this value.
    pub fn as_ref(&self) -> ValueRef<'_> {
        // SAFETY: the borrow keeps self (and its reference) alive
        unsafe { ValueRef::from_raw(self.ctx, self.raw) }
    }

    pub fn is_undefined(&self) -> bool {
        q::JS_IsUndefined(self.raw)
    }

    pub fn is_null(&self) -> bool {
        q::JS_IsNull(self.raw)
    }

    pub fn is_exception(&self) -> bool {
        q::JS_IsException(self.raw)
    }

    pub fn is_object(&self) -> bool {
        q::JS_IsObject(self.raw)
    }

    pub fn is_string(&self) -> bool {
        q::JS_IsString(self.raw)
    }

    pub fn is_number(&self) -> bool {
        q::JS_IsNumber(self.raw)
    }
}

impl Clone for OwnedValue {
    fn clone(&self) -> Self {
        // SAFETY: self holds a live reference; dup takes another one
        let raw = unsafe { q::JS_DupValue(self.ctx, self.raw) };
        OwnedValue {
            raw,
            ctx: self.ctx,
            _not_send: PhantomData,
        }
    }
}

impl Drop for OwnedValue {
    fn drop(&mut self) {
        // SAFETY: the wrapper holds exactly one reference, released here
        unsafe { q::JS_FreeValue(self.ctx, self.raw) }
    }
}

impl std::fmt::Debug for OwnedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnedValue")
            .field("tag", &q::JS_VALUE_GET_TAG(self.raw))
            .finish()
    }
}

/// A borrowed view of an engine value.
///
/// Never adjusts the refcount; valid for as long as the owner it was derived
/// from.
#[derive(Clone, Copy)]
pub struct ValueRef<'a> {
    raw: q::JSValue,
    ctx: *mut q::JSContext,
    _marker: PhantomData<&'a OwnedValue>,
}

impl<'a> ValueRef<'a> {
    /// Wraps a raw value as a borrow.
    ///
    /// # Safety
    /// `raw` must stay alive for `'a` and belong to `ctx`.
    pub unsafe fn from_raw(ctx: *mut q::JSContext, raw: q::JSValue) -> Self {
        ValueRef {
            raw,
            ctx,
            _marker: PhantomData,
        }
    }

    pub fn raw(&self) -> q::JSValue {
        self.raw
    }

    pub(crate) fn context(&self) -> *mut q::JSContext {
        self.ctx
    }

    /// Takes a fresh owned reference to the same value.
    pub fn to_owned(&self) -> OwnedValue {
        // SAFETY: the borrowed value is live, dup takes a new reference
        unsafe { OwnedValue::from_raw(self.ctx, q::JS_DupValue(self.ctx, self.raw)) }
    }

    pub fn is_undefined(&self) -> bool {
        q::JS_IsUndefined(self.raw)
    }

    pub fn is_null(&self) -> bool {
        q::JS_IsNull(self.raw)
    }

    pub fn is_exception(&self) -> bool {
        q::JS_IsException(self.raw)
    }

    pub fn is_object(&self) -> bool {
        q::JS_IsObject(self.raw)
    }

    pub fn is_string(&self) -> bool {
        q::JS_IsString(self.raw)
    }

    pub fn is_number(&self) -> bool {
        q::JS_IsNumber(self.raw)
    }

    pub fn is_bool(&self) -> bool {
        q::JS_IsBool(self.raw)
    }

    pub fn is_symbol(&self) -> bool {
        q::JS_IsSymbol(self.raw)
    }

    pub fn is_uninitialized(&self) -> bool {
        q::JS_IsUninitialized(self.raw)
    }

    /// Callable check. Requires the context because bound and proxy
    /// functions are not visible from the tag.
    pub fn is_function(&self) -> bool {
        // SAFETY: ctx and value are live for 'a
        unsafe { q::JS_IsFunction(self.ctx, self.raw) }
    }

    /// Array check, following the prototype chain rules of Array.isArray.
    pub fn is_array(&self) -> bool {
        // SAFETY: value is live for 'a
        unsafe { q::JS_IsArray(self.raw) }
    }
}

impl std::fmt::Debug for ValueRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueRef")
            .field("tag", &q::JS_VALUE_GET_TAG(self.raw))
            .finish()
    }
}
