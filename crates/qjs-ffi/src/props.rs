//! Property access exports
//!
//! Keys arrive as value handles or as raw atoms. Value-keyed operations
//! intern the key only for the duration of the call.

use std::alloc::{Layout, alloc, dealloc};
use std::os::raw::c_int;

use qjs_core::{Atom, EnumFilter, PropertyDescriptor, ValueRef};
use qjs_sys as q;

use crate::heap::{ctx_ref, heap_get, value_to_heap};

#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_get_prop(
    ctx: *mut q::JSContext,
    this: *const q::JSValue,
    key: *const q::JSValue,
) -> *mut q::JSValue {
    // SAFETY: all handles are live borrows for this call
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        let this = ValueRef::from_raw(raw, heap_get(this));
        let key = ValueRef::from_raw(raw, heap_get(key));
        value_to_heap(raw, ctx.get_property(this, key).into_raw())
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_get_prop_atom(
    ctx: *mut q::JSContext,
    this: *const q::JSValue,
    atom: q::JSAtom,
) -> *mut q::JSValue {
    // SAFETY: handles are live; the atom reference stays with the caller
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        let this = ValueRef::from_raw(raw, heap_get(this));
        let atom = std::mem::ManuallyDrop::new(Atom::from_raw(raw, atom));
        value_to_heap(raw, ctx.get_property_atom(this, &*atom).into_raw())
    }
}

/// Stores a property. The value handle stays owned by the caller.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_set_prop(
    ctx: *mut q::JSContext,
    this: *const q::JSValue,
    key: *const q::JSValue,
    value: *const q::JSValue,
) {
    // SAFETY: all handles are live borrows for this call
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        let this = ValueRef::from_raw(raw, heap_get(this));
        let key = ValueRef::from_raw(raw, heap_get(key));
        let value = ValueRef::from_raw(raw, heap_get(value));
        ctx.set_property(this, key, value);
    }
}

/// Presence check: 1, 0, or -1 with the exception pending.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_has_prop(
    ctx: *mut q::JSContext,
    this: *const q::JSValue,
    key: *const q::JSValue,
) -> c_int {
    // SAFETY: all handles are live borrows for this call
    unsafe {
        let atom = q::JS_ValueToAtom(ctx, heap_get(key));
        let status = q::JS_HasProperty(ctx, heap_get(this), atom);
        q::JS_FreeAtom(ctx, atom);
        status
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_has_prop_atom(
    ctx: *mut q::JSContext,
    this: *const q::JSValue,
    atom: q::JSAtom,
) -> c_int {
    // SAFETY: handles are live; the atom reference stays with the caller
    unsafe { q::JS_HasProperty(ctx, heap_get(this), atom) }
}

/// Full descriptor definition. `getter` and `setter` may be null; `has_value`
/// selects whether `value` participates. Returns 0 on success, -1 with the
/// exception pending.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_define_prop(
    ctx: *mut q::JSContext,
    this: *const q::JSValue,
    key: *const q::JSValue,
    value: *const q::JSValue,
    getter: *const q::JSValue,
    setter: *const q::JSValue,
    configurable: c_int,
    enumerable: c_int,
    writable: c_int,
    has_value: c_int,
) -> c_int {
    // SAFETY: all non-null handles are live borrows for this call
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        let this = ValueRef::from_raw(raw, heap_get(this));
        let key = ValueRef::from_raw(raw, heap_get(key));
        let value = ValueRef::from_raw(raw, heap_get(value));
        let getter = if getter.is_null() {
            None
        } else {
            Some(ValueRef::from_raw(raw, heap_get(getter)))
        };
        let setter = if setter.is_null() {
            None
        } else {
            Some(ValueRef::from_raw(raw, heap_get(setter)))
        };
        let desc = PropertyDescriptor {
            value,
            getter,
            setter,
            configurable: configurable != 0,
            enumerable: enumerable != 0,
            writable: writable != 0,
            has_value: has_value != 0,
        };
        match ctx.define_property(this, key, &desc) {
            Ok(()) => 0,
            Err(_) => -1,
        }
    }
}

/// Enumerates own property keys into a freshly allocated atom array written
/// to `atoms_out`. Returns the count, or -1 with the exception pending. The
/// caller releases the result with [`qjsb_free_atom_array`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_get_own_property_name_atoms(
    ctx: *mut q::JSContext,
    atoms_out: *mut *mut q::JSAtom,
    obj: *const q::JSValue,
    strings: c_int,
    symbols: c_int,
    enumerable_only: c_int,
) -> c_int {
    // SAFETY: handles are live borrows; atoms_out points at a writable slot
    unsafe {
        let raw = ctx;
        let ctx = ctx_ref(raw);
        let obj = ValueRef::from_raw(raw, heap_get(obj));
        let filter = EnumFilter {
            strings: strings != 0,
            symbols: symbols != 0,
            enumerable_only: enumerable_only != 0,
        };
        let names = match ctx.own_property_names(obj, filter) {
            Ok(names) => names,
            Err(_) => return -1,
        };
        let atoms = names.into_raw_atoms();
        if atoms.is_empty() {
            *atoms_out = std::ptr::null_mut();
            return 0;
        }
        let Ok(layout) = Layout::array::<q::JSAtom>(atoms.len()) else {
            for atom in atoms {
                q::JS_FreeAtom(raw, atom);
            }
            return -1;
        };
        let out = alloc(layout) as *mut q::JSAtom;
        if out.is_null() {
            for atom in atoms {
                q::JS_FreeAtom(raw, atom);
            }
            return -1;
        }
        std::ptr::copy_nonoverlapping(atoms.as_ptr(), out, atoms.len());
        *atoms_out = out;
        atoms.len() as c_int
    }
}

/// Releases an atom array from [`qjsb_get_own_property_name_atoms`]: every
/// atom reference, then the array.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_free_atom_array(
    ctx: *mut q::JSContext,
    atoms: *mut q::JSAtom,
    len: c_int,
) {
    if atoms.is_null() || len <= 0 {
        return;
    }
    // SAFETY: the array came from qjsb_get_own_property_name_atoms with
    // exactly len live atom references
    unsafe {
        for i in 0..len as usize {
            q::JS_FreeAtom(ctx, *atoms.add(i));
        }
        if let Ok(layout) = Layout::array::<q::JSAtom>(len as usize) {
            dealloc(atoms as *mut u8, layout);
        }
    }
}

/// String value of an atom, as an owned handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_atom_to_string(
    ctx: *mut q::JSContext,
    atom: q::JSAtom,
) -> *mut q::JSValue {
    // SAFETY: the atom reference stays with the caller
    unsafe { value_to_heap(ctx, q::JS_AtomToString(ctx, atom)) }
}

/// Releases one atom reference.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn qjsb_free_atom(ctx: *mut q::JSContext, atom: q::JSAtom) {
    // SAFETY: caller owns the reference being released
    unsafe { q::JS_FreeAtom(ctx, atom) }
}
