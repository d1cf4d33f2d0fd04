//! CpuSet - immutable set of CPU identifiers
//!
//! A `CpuSet` is only produced by [`CpuSetBuilder::freeze`]. Its storage is
//! never written after that point, which is the whole of its thread-safety
//! story: clones share the storage through an `Arc`, and any number of
//! threads may read it without locking. The builder has no such guarantee.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::builder::CpuSetBuilder;
use crate::error::CpuSetError;

/// Immutable set of CPU ids
#[derive(Clone)]
pub struct CpuSet {
    elems: Arc<HashSet<isize>>,
}

impl CpuSet {
    /// Wrap storage handed over by a builder at freeze time
    pub(crate) fn from_storage(elems: HashSet<isize>) -> Self {
        Self {
            elems: Arc::new(elems),
        }
    }

    /// Create a set containing the supplied CPU ids
    pub fn new<I>(cpus: I) -> Self
    where
        I: IntoIterator<Item = isize>,
    {
        let mut builder = CpuSetBuilder::new();
        builder.add(cpus);
        builder.freeze()
    }

    /// Create an empty set
    pub fn empty() -> Self {
        CpuSetBuilder::new().freeze()
    }

    /// Create a set from 64-bit CPU ids.
    ///
    /// Each id is narrowed with a checked conversion. Ids that do not fit in
    /// `isize` are rejected rather than truncated.
    pub fn from_i64<I>(cpus: I) -> Result<Self, CpuSetError>
    where
        I: IntoIterator<Item = i64>,
    {
        let mut builder = CpuSetBuilder::new();
        for cpu in cpus {
            builder.add_one(narrow(cpu)?);
        }
        Ok(builder.freeze())
    }

    /// Number of distinct CPU ids
    #[inline]
    pub fn size(&self) -> usize {
        self.elems.len()
    }

    /// Alias of [`CpuSet::size`]
    #[inline]
    pub fn len(&self) -> usize {
        self.size()
    }

    /// True if the set has no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Check membership
    #[inline]
    pub fn contains(&self, cpu: isize) -> bool {
        self.elems.contains(&cpu)
    }

    /// True if both sets hold exactly the same CPU ids
    pub fn equals(&self, other: &CpuSet) -> bool {
        Arc::ptr_eq(&self.elems, &other.elems) || *self.elems == *other.elems
    }

    /// Iterate over the CPU ids in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = isize> + '_ {
        self.elems.iter().copied()
    }

    /// CPU ids in ascending order
    pub fn to_sorted_vec(&self) -> Vec<isize> {
        let mut cpus: Vec<_> = self.iter().collect();
        cpus.sort_unstable();
        cpus
    }
}

fn narrow(value: i64) -> Result<isize, CpuSetError> {
    isize::try_from(value).map_err(|_| CpuSetError::OutOfRange { value })
}

impl Default for CpuSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for CpuSet {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for CpuSet {}

impl Hash for CpuSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_sorted_vec().hash(state);
    }
}

impl FromIterator<isize> for CpuSet {
    fn from_iter<I: IntoIterator<Item = isize>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<&[isize]> for CpuSet {
    fn from(cpus: &[isize]) -> Self {
        Self::new(cpus.iter().copied())
    }
}

impl From<Vec<isize>> for CpuSet {
    fn from(cpus: Vec<isize>) -> Self {
        Self::new(cpus)
    }
}

/// Linux cpu-list notation: ascending ids with consecutive runs collapsed,
/// e.g. `0-2,5,7-8`. The empty set formats as an empty string.
impl fmt::Display for CpuSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cpus = self.to_sorted_vec();
        let mut i = 0;
        let mut first = true;

        while i < cpus.len() {
            let start = cpus[i];
            let mut end = start;
            while i + 1 < cpus.len() && cpus[i + 1] == end + 1 {
                i += 1;
                end = cpus[i];
            }

            if !first {
                f.write_str(",")?;
            }
            first = false;

            if start == end {
                write!(f, "{}", start)?;
            } else {
                write!(f, "{}-{}", start, end)?;
            }
            i += 1;
        }

        Ok(())
    }
}

impl fmt::Debug for CpuSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CpuSet({})", self)
    }
}
