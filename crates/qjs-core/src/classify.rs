//! Value classification
//!
//! Two granularities: [`type_of`] matches the `typeof` operator (plus the
//! bignum buckets), [`classify`] distinguishes common object classes behind
//! a single enum with stable numeric codes for the C boundary.

use qjs_sys as q;

use crate::value::ValueRef;

/// Fine-grained value kind with a stable numeric code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JsKind {
    Unknown,
    Uninitialized,
    Undefined,
    Null,
    Boolean,
    String,
    Symbol,
    Function,
    Int,
    Float,
    BigInt,
    BigFloat,
    BigDecimal,
    Promise,
    ArrayBuffer,
    SharedArrayBuffer,
    Date,
    StringObject,
    NumberObject,
    BooleanObject,
    Error,
    RegExp,
    Array,
    Object,
}

impl JsKind {
    /// Numeric code exposed across the C boundary.
    pub fn code(self) -> i32 {
        match self {
            JsKind::Unknown => 0,
            JsKind::Uninitialized => -1,
            JsKind::Undefined => 1,
            JsKind::Null => 2,
            JsKind::Boolean => 3,
            JsKind::String => 4,
            JsKind::Symbol => 5,
            JsKind::Function => 6,
            JsKind::Int => 7,
            JsKind::Float => 8,
            JsKind::BigInt => 9,
            JsKind::BigFloat => 10,
            JsKind::BigDecimal => 11,
            JsKind::Promise => 12,
            JsKind::ArrayBuffer => 13,
            JsKind::SharedArrayBuffer => 14,
            JsKind::Date => 15,
            JsKind::StringObject => 16,
            JsKind::NumberObject => 17,
            JsKind::BooleanObject => 18,
            JsKind::Error => 19,
            JsKind::RegExp => 20,
            JsKind::Array => 21,
            JsKind::Object => 22,
        }
    }
}

/// Classifies a value.
///
/// For objects, function-ness is decided before any class match so that
/// callable classes report as functions, and array-ness is decided before
/// the plain-object fallback.
pub fn classify(value: ValueRef<'_>) -> JsKind {
    let raw = value.raw();
    match q::JS_VALUE_GET_TAG(raw) {
        q::JS_TAG_UNINITIALIZED => JsKind::Uninitialized,
        q::JS_TAG_UNDEFINED => JsKind::Undefined,
        q::JS_TAG_NULL => JsKind::Null,
        q::JS_TAG_BOOL => JsKind::Boolean,
        q::JS_TAG_STRING | q::JS_TAG_STRING_ROPE => JsKind::String,
        q::JS_TAG_SYMBOL => JsKind::Symbol,
        q::JS_TAG_INT => JsKind::Int,
        q::JS_TAG_FLOAT64 => JsKind::Float,
        q::JS_TAG_BIG_INT | q::JS_TAG_SHORT_BIG_INT => JsKind::BigInt,
        q::JS_TAG_OBJECT => {
            if value.is_function() {
                return JsKind::Function;
            }
            // SAFETY: tag is object, so the class id is defined
            match unsafe { q::JS_GetClassID(raw) } {
                q::JS_CLASS_PROMISE => JsKind::Promise,
                q::JS_CLASS_ARRAY_BUFFER => JsKind::ArrayBuffer,
                q::JS_CLASS_SHARED_ARRAY_BUFFER => JsKind::SharedArrayBuffer,
                q::JS_CLASS_DATE => JsKind::Date,
                q::JS_CLASS_STRING => JsKind::StringObject,
                q::JS_CLASS_NUMBER => JsKind::NumberObject,
                q::JS_CLASS_BOOLEAN => JsKind::BooleanObject,
                q::JS_CLASS_ERROR => JsKind::Error,
                q::JS_CLASS_REGEXP => JsKind::RegExp,
                _ if value.is_array() => JsKind::Array,
                _ => JsKind::Object,
            }
        }
        _ => JsKind::Unknown,
    }
}

/// `typeof`-compatible coarse classification.
pub fn type_of(value: ValueRef<'_>) -> &'static str {
    let raw = value.raw();
    match q::JS_VALUE_GET_TAG(raw) {
        q::JS_TAG_INT | q::JS_TAG_FLOAT64 => "number",
        q::JS_TAG_BIG_INT | q::JS_TAG_SHORT_BIG_INT => "bigint",
        q::JS_TAG_BOOL => "boolean",
        q::JS_TAG_UNDEFINED | q::JS_TAG_UNINITIALIZED => "undefined",
        q::JS_TAG_NULL => "object",
        q::JS_TAG_STRING | q::JS_TAG_STRING_ROPE => "string",
        q::JS_TAG_SYMBOL => "symbol",
        q::JS_TAG_OBJECT => {
            if value.is_function() {
                "function"
            } else {
                "object"
            }
        }
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Context, EvalMode};
    use crate::runtime::Runtime;

    fn kind_of(ctx: &Context, source: &str) -> JsKind {
        let v = ctx.eval(source, "classify.js", EvalMode::Global).unwrap();
        classify(v.as_ref())
    }

    #[test]
    fn test_classify_primitives() {
        let rt = Runtime::new().unwrap();
        let ctx = Context::new(&rt).unwrap();
        assert_eq!(kind_of(&ctx, "undefined"), JsKind::Undefined);
        assert_eq!(kind_of(&ctx, "null"), JsKind::Null);
        assert_eq!(kind_of(&ctx, "true"), JsKind::Boolean);
        assert_eq!(kind_of(&ctx, "'s'"), JsKind::String);
        assert_eq!(kind_of(&ctx, "Symbol('x')"), JsKind::Symbol);
        assert_eq!(kind_of(&ctx, "12"), JsKind::Int);
        assert_eq!(kind_of(&ctx, "12.5"), JsKind::Float);
        assert_eq!(kind_of(&ctx, "12n"), JsKind::BigInt);
    }

    #[test]
    fn test_classify_objects() {
        let rt = Runtime::new().unwrap();
        let ctx = Context::new(&rt).unwrap();
        assert_eq!(kind_of(&ctx, "(() => 1)"), JsKind::Function);
        assert_eq!(kind_of(&ctx, "(class A {})"), JsKind::Function);
        assert_eq!(kind_of(&ctx, "Promise.resolve(1)"), JsKind::Promise);
        assert_eq!(kind_of(&ctx, "new ArrayBuffer(8)"), JsKind::ArrayBuffer);
        assert_eq!(kind_of(&ctx, "new Date(0)"), JsKind::Date);
        assert_eq!(kind_of(&ctx, "new String('s')"), JsKind::StringObject);
        assert_eq!(kind_of(&ctx, "new Number(2)"), JsKind::NumberObject);
        assert_eq!(kind_of(&ctx, "new Boolean(true)"), JsKind::BooleanObject);
        assert_eq!(kind_of(&ctx, "new TypeError('t')"), JsKind::Error);
        assert_eq!(kind_of(&ctx, "/x/"), JsKind::RegExp);
        assert_eq!(kind_of(&ctx, "[1, 2]"), JsKind::Array);
        assert_eq!(kind_of(&ctx, "({})"), JsKind::Object);
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(JsKind::Uninitialized.code(), -1);
        assert_eq!(JsKind::Unknown.code(), 0);
        assert_eq!(JsKind::Undefined.code(), 1);
        assert_eq!(JsKind::Function.code(), 6);
        assert_eq!(JsKind::Object.code(), 22);
    }

    #[test]
    fn test_type_of_strings() {
        let rt = Runtime::new().unwrap();
        let ctx = Context::new(&rt).unwrap();
        let cases = [
            ("1.5", "number"),
            ("10n", "bigint"),
            ("false", "boolean"),
            ("undefined", "undefined"),
            ("null", "object"),
            ("'x'", "string"),
            ("Symbol()", "symbol"),
            ("(() => 0)", "function"),
            ("[]", "object"),
        ];
        for (source, expected) in cases {
            let v = ctx.eval(source, "typeof.js", EvalMode::Global).unwrap();
            assert_eq!(type_of(v.as_ref()), expected, "typeof {source}");
        }
    }
}
