//! Trampolines called from JIT-compiled code
//!
//! Every function here takes the frame pointer the compiled function was
//! entered with. Arguments to bridge helpers arrive as an array of 8-byte
//! words: doubles as their bits, booleans as 0 or 1, datums as the index of
//! the datum register holding them.

use smallvec::SmallVec;
use tracing::error;

use super::code::JitCode;
use crate::lir::Ty;
use crate::runtime::{Evaluator, RegValue};
use crate::value::DatumP;

/// State of one call into compiled code.
pub(crate) struct JitFrame<'a> {
    ev: *mut Evaluator,
    code: &'a JitCode,
    regs: Vec<DatumP>,
}

/// Run `code` from block `block_id`.
pub(crate) fn run(code: &JitCode, ev: &mut Evaluator, block_id: i32) -> DatumP {
    let mut frame = JitFrame {
        ev: ev as *mut Evaluator,
        code,
        regs: vec![DatumP::nothing(); code.reg_types.len()],
    };
    // Safety: the frame outlives the call and was built for this code.
    let result = unsafe { code.call(&mut frame as *mut JitFrame, block_id) };
    match frame.regs.get_mut(result as usize) {
        Some(slot) if result >= 0 => std::mem::replace(slot, DatumP::nothing()),
        _ => {
            error!(result, "compiled code returned no datum register");
            DatumP::nothing()
        }
    }
}

/// Load constant `index` into datum register `dst`.
pub(crate) extern "C" fn qlogo_jit_const(frame: *mut JitFrame, dst: i64, index: i64) {
    // Safety: native code passes back the frame it was entered with.
    let frame = unsafe { &mut *frame };
    let value = frame
        .code
        .constants
        .get(index as usize)
        .cloned()
        .unwrap_or_else(DatumP::nothing);
    frame.regs[dst as usize] = value;
}

/// Copy datum register `src` to `dst`.
pub(crate) extern "C" fn qlogo_jit_move(frame: *mut JitFrame, dst: i64, src: i64) {
    let frame = unsafe { &mut *frame };
    frame.regs[dst as usize] = frame.regs[src as usize].clone();
}

/// Call the bridge helper for call site `site`. A datum result is stored in
/// register `dst`; doubles and booleans are returned as bits.
pub(crate) extern "C" fn qlogo_jit_call(
    frame: *mut JitFrame,
    site: i64,
    args: *const u64,
    nargs: i64,
    dst: i64,
) -> u64 {
    let frame = unsafe { &mut *frame };
    let Some(&helper) = frame.code.helpers.get(site as usize) else {
        error!(site, "unknown call site");
        return 0;
    };
    let sig = helper.signature();
    let raw: &[u64] = if nargs > 0 {
        // Safety: the caller stored `nargs` words at `args`.
        unsafe { std::slice::from_raw_parts(args, nargs as usize) }
    } else {
        &[]
    };
    let argv: SmallVec<[RegValue; 4]> = raw
        .iter()
        .enumerate()
        .map(|(i, &bits)| {
            match sig.params.get(i).copied().or(sig.rest).unwrap_or(Ty::Datum) {
                Ty::F64 => RegValue::F64(f64::from_bits(bits)),
                Ty::Bool => RegValue::Bool(bits != 0),
                Ty::Datum => RegValue::Datum(frame.regs[bits as usize].clone()),
            }
        })
        .collect();

    // Safety: the evaluator outlives the call; no other reference to it is
    // live while compiled code runs.
    let ev = unsafe { &mut *frame.ev };
    match ev.call_helper(helper, &argv) {
        RegValue::F64(v) => v.to_bits(),
        RegValue::Bool(b) => b as u64,
        RegValue::Datum(d) => {
            if dst >= 0 {
                frame.regs[dst as usize] = d;
            }
            0
        }
        RegValue::Void => 0,
    }
}
