//! Structured value dumping
//!
//! Renders a value as JSON. Error objects keep their non-enumerable
//! `name`/`message`/`stack` fields, which plain stringification would drop.
//! Values that cannot be JSON-encoded fall back to string coercion.

use crate::context::Context;
use crate::value::ValueRef;

const DUMP_PROPS: &[&str] = &["name", "message", "stack"];

/// JSON dump of a value, with error fields preserved.
pub fn dump(ctx: &Context, value: ValueRef<'_>) -> String {
    match dump_json(ctx, value) {
        Ok(json) => json,
        Err(_) => ctx
            .to_string_lossy(value)
            .unwrap_or_else(|_| "<unserializable value>".to_string()),
    }
}

fn dump_json(ctx: &Context, value: ValueRef<'_>) -> crate::error::QjsResult<String> {
    let json = ctx.json_stringify(value)?;
    if !value.is_object() {
        return Ok(json);
    }

    // Round-trip through a parsed copy so the extra fields become plain
    // enumerable properties
    let copy = ctx.json_parse(&json, "<dump>")?;
    if !copy.is_object() {
        return Ok(json);
    }

    let mut copied = false;
    for prop in DUMP_PROPS {
        let present = ctx.get_property_str(copy.as_ref(), prop);
        if !present.is_undefined() {
            continue;
        }
        let original = ctx.get_property_str(value, prop);
        if original.is_undefined() {
            continue;
        }
        let key = ctx.new_string(prop);
        ctx.set_property(copy.as_ref(), key.as_ref(), original.as_ref());
        copied = true;
    }

    if copied {
        ctx.json_stringify(copy.as_ref())
    } else {
        Ok(json)
    }
}
