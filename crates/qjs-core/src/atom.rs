//! Interned property keys
//!
//! Atoms are the engine's interned strings for property lookup. They are
//! refcounted like heap values; [`Atom`] releases its reference on drop.

use std::ffi::CString;
use std::marker::PhantomData;

use qjs_sys as q;

use crate::error::{QjsError, QjsResult};
use crate::value::{OwnedValue, ValueRef};

/// An owned atom reference, released on drop.
pub struct Atom {
    raw: q::JSAtom,
    ctx: *mut q::JSContext,
    _not_send: PhantomData<*mut ()>,
}

impl Atom {
    /// Takes ownership of a raw atom reference.
    ///
    /// # Safety
    /// `raw` must be a live atom of `ctx` with one reference transferred in.
    pub unsafe fn from_raw(ctx: *mut q::JSContext, raw: q::JSAtom) -> Self {
        Atom {
            raw,
            ctx,
            _not_send: PhantomData,
        }
    }

    /// Interns an arbitrary value as a property key.
    pub fn from_value(key: ValueRef<'_>) -> Self {
        // SAFETY: the borrowed key is live; ValueToAtom returns a new reference
        unsafe {
            let raw = q::JS_ValueToAtom(key.context(), key.raw());
            Atom::from_raw(key.context(), raw)
        }
    }

    /// Interns a string as a property key.
    pub fn from_str(ctx: *mut q::JSContext, name: &str) -> QjsResult<Self> {
        let cname = CString::new(name).map_err(|_| QjsError::SourceEncoding)?;
        // SAFETY: ctx is live and cname is NUL-terminated
        unsafe {
            let raw = q::JS_NewAtomLen(ctx, cname.as_ptr(), name.len());
            Ok(Atom::from_raw(ctx, raw))
        }
    }

    pub fn raw(&self) -> q::JSAtom {
        self.raw
    }

    /// String value for this atom.
    pub fn to_value(&self) -> OwnedValue {
        // SAFETY: the atom is live; AtomToString returns an owned value
        unsafe { OwnedValue::from_raw(self.ctx, q::JS_AtomToString(self.ctx, self.raw)) }
    }

    /// Releases the wrapper without releasing the atom.
    pub fn into_raw(self) -> q::JSAtom {
        let raw = self.raw;
        std::mem::forget(self);
        raw
    }
}

impl Drop for Atom {
    fn drop(&mut self) {
        // SAFETY: the wrapper holds exactly one atom reference
        unsafe { q::JS_FreeAtom(self.ctx, self.raw) }
    }
}

/// Which own properties an enumeration returns.
#[derive(Clone, Copy, Debug)]
pub struct EnumFilter {
    pub strings: bool,
    pub symbols: bool,
    pub enumerable_only: bool,
}

impl Default for EnumFilter {
    fn default() -> Self {
        EnumFilter {
            strings: true,
            symbols: false,
            enumerable_only: false,
        }
    }
}

impl EnumFilter {
    pub(crate) fn to_flags(self) -> std::os::raw::c_int {
        let mut flags = 0;
        if self.strings {
            flags |= q::JS_GPN_STRING_MASK;
        }
        if self.symbols {
            flags |= q::JS_GPN_SYMBOL_MASK;
        }
        if self.enumerable_only {
            flags |= q::JS_GPN_ENUM_ONLY;
        }
        flags
    }
}

/// The own property keys of an object, as owned atoms.
///
/// Every atom is released when the collection drops.
pub struct PropertyNames {
    atoms: Vec<Atom>,
}

impl PropertyNames {
    pub(crate) fn new(atoms: Vec<Atom>) -> Self {
        PropertyNames { atoms }
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Atom> {
        self.atoms.iter()
    }

    /// Consumes the collection, transferring every atom reference out.
    pub fn into_raw_atoms(self) -> Vec<q::JSAtom> {
        self.atoms.into_iter().map(Atom::into_raw).collect()
    }
}

impl<'a> IntoIterator for &'a PropertyNames {
    type Item = &'a Atom;
    type IntoIter = std::slice::Iter<'a, Atom>;

    fn into_iter(self) -> Self::IntoIter {
        self.atoms.iter()
    }
}
