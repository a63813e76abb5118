//! JIT-compiled code wrapper
//!
//! `JitCode` owns the native function pointer, the module holding its
//! memory, and the tables the trampolines read: the constant pool and the
//! helper called at each call site.

use cranelift_jit::JITModule;

use crate::lir::{Helper, Ty};
use crate::value::DatumP;

/// Frees the module's executable memory on drop.
struct ModuleHolder(Option<JITModule>);

impl Drop for ModuleHolder {
    fn drop(&mut self) {
        if let Some(module) = self.0.take() {
            // Safety: the only function pointer into this module lives in
            // the owning `JitCode`, and a running call holds the entry point
            // alive, so no frame can still be executing this code.
            unsafe { module.free_memory() };
        }
    }
}

/// Compiled native code for one LIR function
pub struct JitCode {
    fn_ptr: *const u8,
    pub(crate) constants: Vec<DatumP>,
    /// Helper for each call site index
    pub(crate) helpers: Vec<Helper>,
    pub(crate) reg_types: Vec<Ty>,
    _module: ModuleHolder,
}

impl JitCode {
    pub(crate) fn new(
        fn_ptr: *const u8,
        module: JITModule,
        constants: Vec<DatumP>,
        helpers: Vec<Helper>,
        reg_types: Vec<Ty>,
    ) -> Self {
        JitCode {
            fn_ptr,
            constants,
            helpers,
            reg_types,
            _module: ModuleHolder(Some(module)),
        }
    }

    pub fn fn_ptr(&self) -> *const u8 {
        self.fn_ptr
    }

    /// Call the compiled function.
    ///
    /// # Safety
    /// `frame` must point to a live frame built for this code.
    #[inline]
    pub(crate) unsafe fn call(&self, frame: *mut super::runtime::JitFrame, block_id: i32) -> i64 {
        let f: unsafe extern "C" fn(*mut super::runtime::JitFrame, i32) -> i64 =
            std::mem::transmute(self.fn_ptr);
        f(frame, block_id)
    }
}

impl std::fmt::Debug for JitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JitCode")
            .field("fn_ptr", &self.fn_ptr)
            .field("call_sites", &self.helpers.len())
            .finish()
    }
}
