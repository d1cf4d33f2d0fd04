//! CpuSetBuilder - two-phase construction of a [`CpuSet`]
//!
//! A builder is open until [`CpuSetBuilder::freeze`] is called, and frozen
//! forever after. Additions to a frozen builder are silently dropped so call
//! sites can stop building without special-casing.
//!
//! `add` takes `&mut self`. Sharing one builder across threads requires the
//! caller's own synchronization.

use std::collections::HashSet;
use std::mem;

use crate::cpuset::CpuSet;

/// Mutable accumulator producing an immutable [`CpuSet`]
#[derive(Debug, Default)]
pub struct CpuSetBuilder {
    /// Elements added while open
    elems: HashSet<isize>,
    /// Set once frozen
    result: Option<CpuSet>,
}

impl CpuSetBuilder {
    /// Create an open builder with no elements
    pub fn new() -> Self {
        Self::default()
    }

    /// Add CPU ids. No effect once frozen.
    pub fn add<I>(&mut self, cpus: I)
    where
        I: IntoIterator<Item = isize>,
    {
        if self.result.is_some() {
            log::trace!("Ignoring add on frozen CPU set builder");
            return;
        }
        self.elems.extend(cpus);
    }

    /// Add a single CPU id. No effect once frozen.
    pub fn add_one(&mut self, cpu: isize) {
        self.add([cpu]);
    }

    /// Freeze the builder and return the result.
    ///
    /// Every call returns the same set; elements added after the first call
    /// are never part of it.
    pub fn freeze(&mut self) -> CpuSet {
        if let Some(result) = &self.result {
            return result.clone();
        }

        let result = CpuSet::from_storage(mem::take(&mut self.elems));
        self.result = Some(result.clone());
        result
    }

    /// Whether [`CpuSetBuilder::freeze`] has been called
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.result.is_some()
    }
}

impl Extend<isize> for CpuSetBuilder {
    fn extend<I: IntoIterator<Item = isize>>(&mut self, iter: I) {
        self.add(iter);
    }
}
