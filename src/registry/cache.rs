//! Content-addressed program cache

use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::digest::ProgramDigest;
use crate::compiler::compile;
use crate::expression::Expression;
use crate::ir::CompiledProgram;

/// Thread-safe store of compiled programs keyed by their digest
#[derive(Debug, Default)]
pub struct ProgramCache {
    programs: DashMap<ProgramDigest, Arc<CompiledProgram>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Cache hit and miss counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of stored programs
    pub entries: usize,
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries, {} hits, {} misses ({:.1}% hit rate)",
            self.entries,
            self.hits,
            self.misses,
            self.hit_rate() * 100.0
        )
    }
}

impl ProgramCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `program`, returning its digest and the shared copy
    ///
    /// Storing a program equal to one already cached returns the existing copy.
    pub fn insert(&self, program: CompiledProgram) -> (ProgramDigest, Arc<CompiledProgram>) {
        let digest = ProgramDigest::of(&program);
        let shared = self
            .programs
            .entry(digest)
            .or_insert_with(|| Arc::new(program))
            .clone();
        log::debug!("Cached program {digest}");
        (digest, shared)
    }

    /// Program stored under `digest`
    pub fn get(&self, digest: &ProgramDigest) -> Option<Arc<CompiledProgram>> {
        match self.programs.get(digest) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(entry.value()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Compile `expression` and return the cached copy of the result
    ///
    /// Compilation is deterministic, so the digest of a fresh compilation finds
    /// any earlier copy of the same program.
    pub fn get_or_compile<T>(&self, expression: &Expression<T>) -> (ProgramDigest, Arc<CompiledProgram>) {
        let program = compile(expression);
        let digest = ProgramDigest::of(&program);
        if let Some(existing) = self.get(&digest) {
            return (digest, existing);
        }
        self.insert(program)
    }

    /// Whether a program is stored under `digest`
    pub fn contains(&self, digest: &ProgramDigest) -> bool {
        self.programs.contains_key(digest)
    }

    /// Number of stored programs
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Current counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.programs.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Drop every program and reset the counters
    pub fn clear(&self) {
        self.programs.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

/// Process-wide program cache
static GLOBAL_CACHE: Lazy<ProgramCache> = Lazy::new(ProgramCache::new);

/// The process-wide program cache
pub fn global_cache() -> &'static ProgramCache {
    &GLOBAL_CACHE
}
