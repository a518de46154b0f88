//! Concurrent per-foundation fan-out.

use crate::models::Source;
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::future::Future;

/// Per-foundation requests allowed in flight when none is configured.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// A per-foundation contribution that can be combined with others.
pub trait Merge: Default {
    /// Fold `other` into `self`.
    fn merge(&mut self, other: Self);

    /// Number of elements held.
    fn size(&self) -> usize;
}

/// Sequences concatenate, preserving contribution order.
impl<T> Merge for Vec<T> {
    fn merge(&mut self, mut other: Self) {
        self.append(&mut other);
    }

    fn size(&self) -> usize {
        self.len()
    }
}

/// Sets union; duplicates across foundations collapse.
impl<T: Ord> Merge for BTreeSet<T> {
    fn merge(&mut self, mut other: Self) {
        self.append(&mut other);
    }

    fn size(&self) -> usize {
        self.len()
    }
}

/// Merge contributions in the order given.
pub fn merge_all<M: Merge>(parts: impl IntoIterator<Item = M>) -> M {
    parts.into_iter().fold(M::default(), |mut merged, part| {
        merged.merge(part);
        merged
    })
}

/// Run `unit` once per source with at most `concurrency` units in flight.
///
/// A slot frees as soon as its unit finishes, so a slow source delays only
/// its own result, never the start of the sources queued behind it. Results
/// are returned in source order regardless of completion order, once every
/// unit has completed.
pub async fn fan_out<'a, I, F, Fut, T>(sources: I, concurrency: usize, mut unit: F) -> Vec<T>
where
    I: IntoIterator<Item = &'a Source>,
    F: FnMut(&'a Source) -> Fut,
    Fut: Future<Output = T>,
{
    let mut finished: Vec<(usize, T)> = stream::iter(sources.into_iter().enumerate())
        .map(|(index, source)| {
            let work = unit(source);
            async move { (index, work.await) }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    finished.sort_by_key(|(index, _)| *index);
    finished.into_iter().map(|(_, result)| result).collect()
}
