//! Memory accounting snapshots

use serde::Serialize;

use qjs_sys as q;

use crate::context::Context;
use crate::value::OwnedValue;

/// Snapshot of the runtime's memory counters, one field per engine counter.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct MemoryUsage {
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

impl From<q::JSMemoryUsage> for MemoryUsage {
    fn from(u: q::JSMemoryUsage) -> Self {
        MemoryUsage {
            malloc_size: u.malloc_size,
            malloc_limit: u.malloc_limit,
            memory_used_size: u.memory_used_size,
            malloc_count: u.malloc_count,
            memory_used_count: u.memory_used_count,
            atom_count: u.atom_count,
            atom_size: u.atom_size,
            str_count: u.str_count,
            str_size: u.str_size,
            obj_count: u.obj_count,
            obj_size: u.obj_size,
            prop_count: u.prop_count,
            prop_size: u.prop_size,
            shape_count: u.shape_count,
            shape_size: u.shape_size,
            js_func_count: u.js_func_count,
            js_func_size: u.js_func_size,
            js_func_code_size: u.js_func_code_size,
            js_func_pc2line_count: u.js_func_pc2line_count,
            js_func_pc2line_size: u.js_func_pc2line_size,
            c_func_count: u.c_func_count,
            array_count: u.array_count,
            fast_array_count: u.fast_array_count,
            fast_array_elements: u.fast_array_elements,
            binary_object_count: u.binary_object_count,
            binary_object_size: u.binary_object_size,
        }
    }
}

impl MemoryUsage {
    /// Field table driving the object and text renderings.
    pub fn entries(&self) -> [(&'static str, i64); 26] {
        [
            ("malloc_size", self.malloc_size),
            ("malloc_limit", self.malloc_limit),
            ("memory_used_size", self.memory_used_size),
            ("malloc_count", self.malloc_count),
            ("memory_used_count", self.memory_used_count),
            ("atom_count", self.atom_count),
            ("atom_size", self.atom_size),
            ("str_count", self.str_count),
            ("str_size", self.str_size),
            ("obj_count", self.obj_count),
            ("obj_size", self.obj_size),
            ("prop_count", self.prop_count),
            ("prop_size", self.prop_size),
            ("shape_count", self.shape_count),
            ("shape_size", self.shape_size),
            ("js_func_count", self.js_func_count),
            ("js_func_size", self.js_func_size),
            ("js_func_code_size", self.js_func_code_size),
            ("js_func_pc2line_count", self.js_func_pc2line_count),
            ("js_func_pc2line_size", self.js_func_pc2line_size),
            ("c_func_count", self.c_func_count),
            ("array_count", self.array_count),
            ("fast_array_count", self.fast_array_count),
            ("fast_array_elements", self.fast_array_elements),
            ("binary_object_count", self.binary_object_count),
            ("binary_object_size", self.binary_object_size),
        ]
    }

    /// Materializes the snapshot as a script object, field by field.
    pub fn to_object(&self, ctx: &Context) -> OwnedValue {
        let obj = ctx.new_object();
        for (name, count) in self.entries() {
            let key = ctx.new_string(name);
            let value = ctx.new_float64(count as f64);
            ctx.set_property(obj.as_ref(), key.as_ref(), value.as_ref());
        }
        obj
    }

    /// Renders a text report into `buf`, truncating when it does not fit.
    /// Returns the number of bytes written.
    pub fn render_into(&self, buf: &mut [u8]) -> usize {
        let mut report = String::new();
        for (name, count) in self.entries() {
            report.push_str(name);
            report.push_str(": ");
            report.push_str(&count.to_string());
            report.push('\n');
        }
        let n = report.len().min(buf.len());
        buf[..n].copy_from_slice(&report.as_bytes()[..n]);
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EvalMode;
    use crate::runtime::Runtime;

    #[test]
    fn test_snapshot_as_object() {
        let rt = Runtime::new().unwrap();
        let ctx = Context::new(&rt).unwrap();
        let usage = rt.memory_usage();
        let obj = usage.to_object(&ctx);
        let count = ctx.get_property_str(obj.as_ref(), "malloc_count");
        assert!(ctx.to_f64(count.as_ref()) > 0.0);
        let limit = ctx.get_property_str(obj.as_ref(), "malloc_limit");
        assert!(!limit.is_undefined());
    }

    #[test]
    fn test_snapshot_serializes() {
        let rt = Runtime::new().unwrap();
        let usage = rt.memory_usage();
        let json = serde_json::to_value(usage).unwrap();
        assert!(json["atom_count"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_render_truncates() {
        let rt = Runtime::new().unwrap();
        let ctx = Context::new(&rt).unwrap();
        ctx.eval("globalThis.x = [1, 2, 3]", "mem.js", EvalMode::Global)
            .unwrap();
        let usage = rt.memory_usage();

        let mut big = [0u8; 4096];
        let n = usage.render_into(&mut big);
        assert!(n > 0 && n <= big.len());
        let text = std::str::from_utf8(&big[..n]).unwrap();
        assert!(text.contains("obj_count: "));

        let mut small = [0u8; 8];
        assert_eq!(usage.render_into(&mut small), 8);
    }
}
