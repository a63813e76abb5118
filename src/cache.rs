//! Compilation cache
//!
//! Maps a source list (or node) to the entry point compiled from it. An
//! entry is valid only for the parse it was compiled from: a lookup with a
//! different parse stamp drops the entry, and with it the compiled code.
//! Entries whose source has been freed are swept periodically.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::backend::EntryPoint;
use crate::value::{DatumP, SourceId, WeakDatum};

/// Inserts between sweeps for dead sources.
const PURGE_INTERVAL: usize = 64;

struct CacheEntry {
    entry: Rc<EntryPoint>,
    source: WeakDatum,
    stamp: u64,
}

#[derive(Default)]
pub struct CompileCache {
    entries: FxHashMap<SourceId, CacheEntry>,
    inserts: usize,
    hits: u64,
    misses: u64,
}

impl CompileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiled code for `id` at parse `stamp`. A stale entry is removed.
    pub fn lookup(&mut self, id: SourceId, stamp: u64) -> Option<Rc<EntryPoint>> {
        match self.entries.get(&id) {
            Some(cached) if cached.stamp == stamp && !cached.source.is_dead() => {
                self.hits += 1;
                Some(cached.entry.clone())
            }
            Some(cached) => {
                debug!(
                    source = id.0,
                    cached = cached.stamp,
                    current = stamp,
                    "invalidating stale compiled code"
                );
                self.entries.remove(&id);
                self.misses += 1;
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, id: SourceId, source: &DatumP, stamp: u64, entry: Rc<EntryPoint>) {
        self.inserts += 1;
        if self.inserts % PURGE_INTERVAL == 0 {
            self.purge();
        }
        trace!(source = id.0, stamp, entry = entry.id(), "cached compiled code");
        self.entries.insert(
            id,
            CacheEntry {
                entry,
                source: source.downgrade(),
                stamp,
            },
        );
    }

    /// Drop the entry for `id`, if any.
    pub fn invalidate(&mut self, id: SourceId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Drop every entry whose source list has been freed.
    pub fn purge(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, cached| !cached.source.is_dead());
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, "purged compiled code for freed sources");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
