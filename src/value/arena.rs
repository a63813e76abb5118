//! Per-kind allocation ledger.
//!
//! Values live behind `Rc`, so the ledger does not own storage. It records
//! every acquire and release per [`DatumKind`], tracks the number of pages a
//! kind has grown to, and hands out source identities and timestamps.
//! `stats()` is the allocation-count probe used to check that dropping the
//! last handle to a value releases it exactly once.

use std::cell::{Cell, RefCell};

use super::DatumKind;

/// Values accounted per page when a kind grows.
pub const PAGE_SIZE: usize = 256;

/// Counters for one value kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindStats {
    /// Values currently alive
    pub live: usize,
    /// Total values ever acquired
    pub acquired: u64,
    /// Total values ever released
    pub released: u64,
    /// Pages grown so far (never shrinks)
    pub pages: usize,
}

/// Snapshot of the whole ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaStats {
    kinds: [KindStats; DatumKind::COUNT],
}

impl ArenaStats {
    pub fn kind(&self, kind: DatumKind) -> KindStats {
        self.kinds[kind.index()]
    }

    /// Live values across all kinds.
    pub fn live(&self) -> usize {
        self.kinds.iter().map(|k| k.live).sum()
    }

    pub fn released(&self) -> u64 {
        self.kinds.iter().map(|k| k.released).sum()
    }

    pub fn acquired(&self) -> u64 {
        self.kinds.iter().map(|k| k.acquired).sum()
    }
}

thread_local! {
    static LEDGER: RefCell<ArenaStats> = RefCell::new(ArenaStats::default());
    static NEXT_SOURCE_ID: Cell<u64> = const { Cell::new(1) };
    static CLOCK: Cell<u64> = const { Cell::new(0) };
}

pub(crate) fn acquire(kind: DatumKind) {
    LEDGER.with(|ledger| {
        let mut ledger = ledger.borrow_mut();
        let entry = &mut ledger.kinds[kind.index()];
        entry.live += 1;
        entry.acquired += 1;
        if entry.live > entry.pages * PAGE_SIZE {
            entry.pages += 1;
        }
    });
}

pub(crate) fn release(kind: DatumKind) {
    // The ledger may already be gone when thread-local values drop at thread exit.
    let _ = LEDGER.try_with(|ledger| {
        let mut ledger = ledger.borrow_mut();
        let entry = &mut ledger.kinds[kind.index()];
        debug_assert!(entry.live > 0, "double release of {:?}", kind);
        entry.live = entry.live.saturating_sub(1);
        entry.released += 1;
    });
}

/// Current ledger snapshot for this thread.
pub fn stats() -> ArenaStats {
    LEDGER.with(|ledger| *ledger.borrow())
}

/// Identity of a source list or node, stable for the value's lifetime and
/// never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

pub(crate) fn next_source_id() -> SourceId {
    NEXT_SOURCE_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        SourceId(id)
    })
}

/// Advance the process clock used for parse and definition timestamps.
pub fn tick() -> u64 {
    CLOCK.with(|clock| {
        let now = clock.get() + 1;
        clock.set(now);
        now
    })
}

/// Read the clock without advancing it.
pub fn now() -> u64 {
    CLOCK.with(|clock| clock.get())
}
