//! Runtime lifecycle, host hook registration and the job queue

use std::ffi::c_void;
use std::marker::PhantomData;
use std::rc::Rc;

use qjs_sys as q;

use crate::error::{QjsError, QjsResult};
use crate::hooks::{
    HostDispatcher, HostHooks, InterruptPredicate, ModuleLoader, interrupt_trampoline,
    module_loader_trampoline,
};
use crate::memory::MemoryUsage;
use crate::value::OwnedValue;

/// Outcome of draining the pending job queue.
///
/// `executed` counts the jobs that ran. When a job threw, draining stops and
/// the exception is carried here instead of being left pending.
pub struct JobsOutcome {
    pub executed: u32,
    pub exception: Option<OwnedValue>,
}

/// An engine runtime: heap, GC, atom table and job queue.
///
/// Not `Send` or `Sync`; a runtime and everything created from it stays on
/// the thread that created it.
pub struct Runtime {
    rt: *mut q::JSRuntime,
    _not_send: PhantomData<*mut ()>,
}

impl Runtime {
    pub fn new() -> QjsResult<Self> {
        // SAFETY: plain constructor call; null checked below
        let rt = unsafe { q::JS_NewRuntime() };
        if rt.is_null() {
            return Err(QjsError::RuntimeCreation);
        }
        let hooks = Box::into_raw(Box::new(HostHooks::default()));
        // SAFETY: rt is live; the hook block stays allocated until Drop. The
        // loader trampoline is installed up front so an import with no
        // registered resolver throws instead of hitting engine defaults.
        unsafe {
            q::JS_SetRuntimeOpaque(rt, hooks as *mut c_void);
            q::JS_SetModuleLoaderFunc(
                rt,
                None,
                Some(module_loader_trampoline),
                hooks as *mut c_void,
            );
        }
        Ok(Runtime {
            rt,
            _not_send: PhantomData,
        })
    }

    pub fn as_raw(&self) -> *mut q::JSRuntime {
        self.rt
    }

    /// Releases the wrapper without freeing the runtime. The hook block stays
    /// reachable through the engine opaque pointer.
    pub fn into_raw(self) -> *mut q::JSRuntime {
        let rt = self.rt;
        std::mem::forget(self);
        rt
    }

    /// Reassembles a wrapper from a raw handle produced by [`into_raw`].
    ///
    /// # Safety
    /// `rt` must come from `into_raw` and must not be freed elsewhere.
    ///
    /// [`into_raw`]: Runtime::into_raw
    pub unsafe fn from_raw(rt: *mut q::JSRuntime) -> Self {
        Runtime {
            rt,
            _not_send: PhantomData,
        }
    }

    fn hooks(&self) -> *mut HostHooks {
        // SAFETY: the opaque pointer is set once in new() and cleared in Drop
        unsafe { q::JS_GetRuntimeOpaque(self.rt) as *mut HostHooks }
    }

    /// Caps the runtime heap. `None` removes the cap.
    pub fn set_memory_limit(&self, limit: Option<usize>) {
        // SAFETY: rt is live; usize::MAX disables the limit engine-side
        unsafe { q::JS_SetMemoryLimit(self.rt, limit.unwrap_or(usize::MAX)) };
    }

    /// Registers the dispatcher all bridge function objects route through.
    /// Replaces any previous dispatcher; a replaced dispatcher that is
    /// mid-call finishes on its own clone of the slot.
    pub fn set_host_dispatcher(&self, dispatcher: HostDispatcher) {
        // SAFETY: the hook block is live; only the RefCell slot is touched,
        // never a reference held across a host call
        unsafe { *(*self.hooks()).dispatcher.borrow_mut() = Some(Rc::from(dispatcher)) };
    }

    /// Registers the module resolver. Replaces any previous resolver.
    pub fn set_module_loader(&self, loader: ModuleLoader) {
        // SAFETY: as in set_host_dispatcher; the trampoline is already
        // installed engine-side
        unsafe { *(*self.hooks()).loader.borrow_mut() = Some(Rc::from(loader)) };
    }

    /// Installs an interrupt predicate, polled during execution. Returning
    /// `true` abandons the running script with an interrupted exception.
    pub fn set_interrupt(&self, predicate: InterruptPredicate) {
        let hooks = self.hooks();
        // SAFETY: as in set_host_dispatcher
        unsafe {
            *(*hooks).interrupt.borrow_mut() = Some(Rc::from(predicate));
            q::JS_SetInterruptHandler(self.rt, Some(interrupt_trampoline), hooks as *mut c_void);
        }
    }

    /// Removes the interrupt predicate.
    pub fn clear_interrupt(&self) {
        // SAFETY: as in set_interrupt
        unsafe {
            *(*self.hooks()).interrupt.borrow_mut() = None;
            q::JS_SetInterruptHandler(self.rt, None, std::ptr::null_mut());
        }
    }

    /// True when promise jobs are queued.
    pub fn is_job_pending(&self) -> bool {
        // SAFETY: rt is live
        unsafe { q::JS_IsJobPending(self.rt) }
    }

    /// Runs queued jobs until the queue is empty, a job throws, or `max`
    /// jobs have run. `None` drains until empty.
    pub fn execute_pending_jobs(&self, max: Option<u32>) -> JobsOutcome {
        let mut executed = 0u32;
        loop {
            if let Some(max) = max {
                if executed >= max {
                    break;
                }
            }
            let mut job_ctx: *mut q::JSContext = std::ptr::null_mut();
            // SAFETY: rt is live; job_ctx receives the context the job ran on
            let status = unsafe { q::JS_ExecutePendingJob(self.rt, &mut job_ctx) };
            if status <= 0 {
                if status < 0 {
                    // SAFETY: a failing job leaves its exception pending on
                    // the context it ran on
                    let exception =
                        unsafe { OwnedValue::from_raw(job_ctx, q::JS_GetException(job_ctx)) };
                    return JobsOutcome {
                        executed,
                        exception: Some(exception),
                    };
                }
                break;
            }
            executed += 1;
        }
        JobsOutcome {
            executed,
            exception: None,
        }
    }

    /// Snapshot of the runtime's memory accounting counters.
    pub fn memory_usage(&self) -> MemoryUsage {
        let mut usage = q::JSMemoryUsage::default();
        // SAFETY: rt is live, usage is a plain counter struct
        unsafe { q::JS_ComputeMemoryUsage(self.rt, &mut usage) };
        MemoryUsage::from(usage)
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        let hooks = self.hooks();
        // SAFETY: contexts and values must already be gone per the engine
        // contract; the hook block is freed after the engine can no longer
        // call back into it
        unsafe {
            q::JS_SetRuntimeOpaque(self.rt, std::ptr::null_mut());
            q::JS_FreeRuntime(self.rt);
            drop(Box::from_raw(hooks));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_creation() {
        let rt = Runtime::new().unwrap();
        assert!(!rt.as_raw().is_null());
        assert!(!rt.is_job_pending());
    }

    #[test]
    fn test_memory_limit_roundtrip() {
        let rt = Runtime::new().unwrap();
        rt.set_memory_limit(Some(16 * 1024 * 1024));
        rt.set_memory_limit(None);
    }

    #[test]
    fn test_memory_usage_counts_something() {
        let rt = Runtime::new().unwrap();
        let usage = rt.memory_usage();
        assert!(usage.malloc_count > 0);
    }

    #[test]
    fn test_drain_empty_queue() {
        let rt = Runtime::new().unwrap();
        let outcome = rt.execute_pending_jobs(None);
        assert_eq!(outcome.executed, 0);
        assert!(outcome.exception.is_none());
    }
}
