//! Integration tests for the host bridges: function dispatch, module
//! resolution, interrupts and the job queue.

use std::cell::Cell;
use std::rc::Rc;

use serial_test::serial;

use qjs_core::{Context, EvalMode, Runtime};

fn fixture() -> (Runtime, Context) {
    let rt = Runtime::new().unwrap();
    let ctx = Context::new(&rt).unwrap();
    (rt, ctx)
}

fn install_global(ctx: &Context, name: &str, value: qjs_core::ValueRef<'_>) {
    let global = ctx.global_object();
    let key = ctx.new_string(name);
    ctx.set_property(global.as_ref(), key.as_ref(), value);
}

#[test]
fn host_callback_receives_args_and_data() {
    let (rt, ctx) = fixture();
    rt.set_host_dispatcher(Box::new(|call| {
        let base = call.context.to_f64(call.data);
        let sum: f64 = call.args.iter().map(|a| call.context.to_f64(*a)).sum();
        Some(call.context.new_float64(base + sum))
    }));

    let data = ctx.new_float64(100.0);
    let func = ctx.new_function(data.as_ref(), Some("adder")).unwrap();
    install_global(&ctx, "adder", func.as_ref());

    let result = ctx.eval("adder(1, 2, 3)", "cb.js", EvalMode::Global).unwrap();
    assert_eq!(ctx.to_f64(result.as_ref()), 106.0);

    let name = ctx.eval("adder.name", "cb.js", EvalMode::Global).unwrap();
    assert_eq!(ctx.to_string_lossy(name.as_ref()).unwrap(), "adder");
}

#[test]
fn host_callback_none_maps_to_undefined() {
    let (rt, ctx) = fixture();
    rt.set_host_dispatcher(Box::new(|_call| None));

    let data = ctx.new_float64(0.0);
    let func = ctx.new_function(data.as_ref(), None).unwrap();
    install_global(&ctx, "noop", func.as_ref());

    let result = ctx
        .eval("noop() === undefined", "cb.js", EvalMode::Global)
        .unwrap();
    assert!(ctx.to_bool(result.as_ref()).unwrap());
}

#[test]
fn host_callback_distinguishes_by_data() {
    let (rt, ctx) = fixture();
    rt.set_host_dispatcher(Box::new(|call| Some(call.data.to_owned())));

    let one = ctx.new_string("one");
    let two = ctx.new_string("two");
    let f1 = ctx.new_function(one.as_ref(), None).unwrap();
    let f2 = ctx.new_function(two.as_ref(), None).unwrap();
    install_global(&ctx, "f1", f1.as_ref());
    install_global(&ctx, "f2", f2.as_ref());

    let result = ctx
        .eval("f1() + '/' + f2()", "cb.js", EvalMode::Global)
        .unwrap();
    assert_eq!(ctx.to_string_lossy(result.as_ref()).unwrap(), "one/two");
}

#[test]
fn host_callback_can_reenter_the_bridge() {
    let (rt, ctx) = fixture();
    rt.set_host_dispatcher(Box::new(|call| {
        let which = call.context.to_string_lossy(call.data).unwrap();
        if which == "outer" {
            // Evaluating script from inside a dispatched call dispatches
            // again before this frame returns
            let inner = call
                .context
                .eval("inner()", "nested.js", EvalMode::Global)
                .unwrap();
            let n = call.context.to_f64(inner.as_ref());
            Some(call.context.new_float64(n + 1.0))
        } else {
            Some(call.context.new_float64(41.0))
        }
    }));

    let outer_tag = ctx.new_string("outer");
    let inner_tag = ctx.new_string("inner");
    let outer = ctx.new_function(outer_tag.as_ref(), None).unwrap();
    let inner = ctx.new_function(inner_tag.as_ref(), None).unwrap();
    install_global(&ctx, "outer", outer.as_ref());
    install_global(&ctx, "inner", inner.as_ref());

    let result = ctx.eval("outer()", "cb.js", EvalMode::Global).unwrap();
    assert_eq!(ctx.to_f64(result.as_ref()), 42.0);
}

#[test]
fn dispatcher_can_be_replaced_while_executing() {
    let (rt, ctx) = fixture();
    rt.set_host_dispatcher(Box::new(|call| {
        // Replacing the dispatcher from inside a dispatched call; the
        // executing closure finishes on its own clone of the slot
        let raw_rt = unsafe { qjs_core::sys::JS_GetRuntime(call.context.as_raw()) };
        let rt = std::mem::ManuallyDrop::new(unsafe { Runtime::from_raw(raw_rt) });
        rt.set_host_dispatcher(Box::new(|call| Some(call.context.new_float64(2.0))));
        Some(call.context.new_float64(1.0))
    }));

    let data = ctx.new_float64(0.0);
    let func = ctx.new_function(data.as_ref(), None).unwrap();
    install_global(&ctx, "f", func.as_ref());

    let first = ctx.eval("f()", "cb.js", EvalMode::Global).unwrap();
    assert_eq!(ctx.to_f64(first.as_ref()), 1.0);
    let second = ctx.eval("f()", "cb.js", EvalMode::Global).unwrap();
    assert_eq!(ctx.to_f64(second.as_ref()), 2.0);
}

#[test]
fn host_callback_can_trigger_module_load() {
    let (rt, ctx) = fixture();
    rt.set_module_loader(Box::new(|_ctx, name| {
        (name == "five").then(|| b"export default 5; globalThis.five = 5;".to_vec())
    }));
    rt.set_host_dispatcher(Box::new(|call| {
        // An import from inside a dispatched call runs the loader while
        // this dispatch frame is still live
        call.context
            .eval("import 'five';", "inner.js", EvalMode::Module)
            .unwrap();
        Some(call.context.new_float64(30.0))
    }));

    let data = ctx.new_float64(0.0);
    let func = ctx.new_function(data.as_ref(), None).unwrap();
    install_global(&ctx, "loadFive", func.as_ref());

    let result = ctx
        .eval("loadFive() + (globalThis.five | 0)", "cb.js", EvalMode::Global)
        .unwrap();
    assert_eq!(ctx.to_f64(result.as_ref()), 35.0);
}

#[test]
fn module_loader_provides_source_and_meta() {
    let (rt, ctx) = fixture();
    rt.set_module_loader(Box::new(|_ctx, name| {
        if name == "math" {
            Some(
                b"globalThis.mathUrl = import.meta.url;\n\
                  globalThis.mathMain = import.meta.main;\n\
                  export const twelve = 12;"
                    .to_vec(),
            )
        } else {
            None
        }
    }));

    ctx.eval(
        "import { twelve } from 'math'; globalThis.out = twelve;",
        "main.js",
        EvalMode::Module,
    )
    .unwrap();

    let out = ctx.eval("out", "check.js", EvalMode::Global).unwrap();
    assert_eq!(ctx.to_f64(out.as_ref()), 12.0);

    let url = ctx.eval("mathUrl", "check.js", EvalMode::Global).unwrap();
    assert_eq!(ctx.to_string_lossy(url.as_ref()).unwrap(), "math");

    let main = ctx.eval("mathMain", "check.js", EvalMode::Global).unwrap();
    assert!(!ctx.to_bool(main.as_ref()).unwrap());
}

#[test]
fn module_loader_unknown_name_is_reference_error() {
    let (rt, ctx) = fixture();
    rt.set_module_loader(Box::new(|_ctx, _name| None));

    let err = ctx
        .eval("import 'missing';", "main.js", EvalMode::Module)
        .unwrap_err();
    assert!(err.is_script_error());
    assert!(err.to_string().contains("could not load module"));
}

#[test]
fn module_import_without_loader_is_reference_error() {
    let (_rt, ctx) = fixture();
    let err = ctx
        .eval("import 'anything';", "main.js", EvalMode::Module)
        .unwrap_err();
    assert!(err.is_script_error());
    assert!(err.to_string().contains("module loader not set"));
}

#[test]
fn module_compile_error_propagates() {
    let (rt, ctx) = fixture();
    rt.set_module_loader(Box::new(|_ctx, _name| Some(b"export const = ;".to_vec())));

    let err = ctx
        .eval("import 'broken';", "main.js", EvalMode::Module)
        .unwrap_err();
    assert_eq!(err.error_type(), Some("SyntaxError"));
}

#[test]
fn module_compile_only_does_not_evaluate() {
    let (_rt, ctx) = fixture();
    let module = ctx
        .eval(
            "globalThis.ranCompileOnly = true; export {};",
            "mod.js",
            EvalMode::ModuleCompileOnly,
        )
        .unwrap();
    assert!(!module.is_undefined());
    let ran = ctx
        .eval("'ranCompileOnly' in globalThis", "check.js", EvalMode::Global)
        .unwrap();
    assert!(!ctx.to_bool(ran.as_ref()).unwrap());
}

#[test]
#[serial]
fn interrupt_predicate_abandons_execution() {
    let (rt, ctx) = fixture();
    let polls = Rc::new(Cell::new(0u32));
    let seen = polls.clone();
    rt.set_interrupt(Box::new(move || {
        seen.set(seen.get() + 1);
        seen.get() > 3
    }));

    let err = ctx
        .eval("for (;;) {}", "loop.js", EvalMode::Global)
        .unwrap_err();
    assert!(err.is_script_error());
    assert!(polls.get() > 3);

    rt.clear_interrupt();
    let v = ctx.eval("1 + 1", "after.js", EvalMode::Global).unwrap();
    assert_eq!(ctx.to_f64(v.as_ref()), 2.0);
}

#[test]
fn job_queue_drains_and_reports_count() {
    let (rt, ctx) = fixture();
    ctx.eval(
        "Promise.resolve(41).then(v => { globalThis.r = v + 1; });",
        "jobs.js",
        EvalMode::Global,
    )
    .unwrap();
    assert!(rt.is_job_pending());

    let outcome = rt.execute_pending_jobs(None);
    assert!(outcome.executed >= 1);
    assert!(outcome.exception.is_none());
    assert!(!rt.is_job_pending());

    let r = ctx.eval("r", "check.js", EvalMode::Global).unwrap();
    assert_eq!(ctx.to_f64(r.as_ref()), 42.0);
}

#[test]
fn job_queue_respects_max() {
    let (rt, ctx) = fixture();
    ctx.eval(
        "Promise.resolve().then(() => {}); Promise.resolve().then(() => {});",
        "jobs.js",
        EvalMode::Global,
    )
    .unwrap();

    let outcome = rt.execute_pending_jobs(Some(1));
    assert_eq!(outcome.executed, 1);
    assert!(rt.is_job_pending());

    let rest = rt.execute_pending_jobs(None);
    assert_eq!(rest.executed, 1);
    assert!(!rt.is_job_pending());
}

#[test]
fn job_queue_surfaces_job_exception() {
    let (rt, ctx) = fixture();
    ctx.eval(
        "Promise.resolve().then(() => { throw new Error('job fail'); });",
        "jobs.js",
        EvalMode::Global,
    )
    .unwrap();

    let outcome = rt.execute_pending_jobs(None);
    let exception = outcome.exception.expect("failing job reports its exception");
    let message = ctx.get_property_str(exception.as_ref(), "message");
    assert_eq!(ctx.to_string_lossy(message.as_ref()).unwrap(), "job fail");
}

#[test]
fn dispatcher_can_throw_back_into_script() {
    let (rt, ctx) = fixture();
    rt.set_host_dispatcher(Box::new(|call| {
        let error = call.context.new_error();
        let key = call.context.new_string("message");
        let msg = call.context.new_string("host says no");
        call.context
            .set_property(error.as_ref(), key.as_ref(), msg.as_ref());
        Some(call.context.throw(error.as_ref()))
    }));

    let data = ctx.new_float64(0.0);
    let func = ctx.new_function(data.as_ref(), None).unwrap();
    install_global(&ctx, "refuse", func.as_ref());

    let caught = ctx
        .eval(
            "(() => { try { refuse(); return 'no throw'; } catch (e) { return e.message; } })()",
            "cb.js",
            EvalMode::Global,
        )
        .unwrap();
    assert_eq!(ctx.to_string_lossy(caught.as_ref()).unwrap(), "host says no");
}
