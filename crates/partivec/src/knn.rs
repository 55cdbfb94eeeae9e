//! Exact k-nearest-neighbour selection.
//!
//! Scores every candidate and keeps the `k` best in a bounded max-heap.
//! Candidates are ordered by distance, then by the order in which they were
//! offered, so equal distances resolve to the earlier candidate.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::distance::euclidean_distance;
use crate::model::VectorId;

/// A search hit: the matched ID and its distance from the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: VectorId,
    pub distance: f32,
}

impl Neighbor {
    #[must_use]
    pub fn new(id: VectorId, distance: f32) -> Self {
        Self { id, distance }
    }
}

#[derive(Debug)]
struct HeapEntry<'a> {
    distance: f32,
    ordinal: usize,
    id: &'a VectorId,
}

impl HeapEntry<'_> {
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.ordinal.cmp(&other.ordinal))
    }
}

impl PartialEq for HeapEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.key_cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry<'_> {}

impl PartialOrd for HeapEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry<'_> {
    // Max-heap on (distance, ordinal): the worst kept candidate sits on top.
    fn cmp(&self, other: &Self) -> Ordering {
        self.key_cmp(other)
    }
}

/// Return the `k` candidates nearest to `query`, nearest first.
///
/// `candidates` yields `(id, vector)` pairs; every vector must have the same
/// length as `query`, which the collection guarantees by validating both
/// sides against its dimension. Returns fewer than `k` hits when there are
/// fewer candidates, and nothing when `k` is zero.
pub(crate) fn k_nearest<'a, I>(candidates: I, query: &[f32], k: usize) -> Vec<Neighbor>
where
    I: IntoIterator<Item = (&'a VectorId, &'a [f32])>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<HeapEntry<'a>> =
        BinaryHeap::with_capacity(k.saturating_add(1).min(1024));

    for (ordinal, (id, vector)) in candidates.into_iter().enumerate() {
        let entry = HeapEntry {
            distance: euclidean_distance(query, vector),
            ordinal,
            id,
        };

        if heap.len() < k {
            heap.push(entry);
        } else if let Some(worst) = heap.peek() {
            if entry < *worst {
                heap.pop();
                heap.push(entry);
            }
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|e| Neighbor::new(e.id.clone(), e.distance))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<VectorId> {
        (0..n).map(|i| VectorId::new(format!("v{i}"))).collect()
    }

    #[test]
    fn test_returns_nearest_first() {
        let ids = ids(3);
        let vectors = [vec![5.0, 0.0], vec![1.0, 0.0], vec![3.0, 0.0]];
        let hits = k_nearest(
            ids.iter().zip(vectors.iter().map(Vec::as_slice)),
            &[0.0, 0.0],
            3,
        );

        let order: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(order, vec!["v1", "v2", "v0"]);
        assert!((hits[0].distance - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_truncates_to_k() {
        let ids = ids(5);
        let vectors: Vec<Vec<f32>> = (0..5).map(|i| vec![i as f32]).collect();
        let hits = k_nearest(
            ids.iter().zip(vectors.iter().map(Vec::as_slice)),
            &[10.0],
            2,
        );

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id.as_str(), "v4");
        assert_eq!(hits[1].id.as_str(), "v3");
    }

    #[test]
    fn test_ties_keep_offer_order() {
        let ids = ids(4);
        let vectors = [vec![1.0], vec![-1.0], vec![1.0], vec![-1.0]];
        let hits = k_nearest(
            ids.iter().zip(vectors.iter().map(Vec::as_slice)),
            &[0.0],
            3,
        );

        let order: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(order, vec!["v0", "v1", "v2"]);
    }

    #[test]
    fn test_zero_k_and_empty_input() {
        let ids = ids(1);
        let vectors = [vec![1.0]];
        assert!(k_nearest(
            ids.iter().zip(vectors.iter().map(Vec::as_slice)),
            &[0.0],
            0
        )
        .is_empty());
        assert!(k_nearest(std::iter::empty::<(&VectorId, &[f32])>(), &[0.0], 3).is_empty());
    }

    #[test]
    fn test_k_larger_than_candidates() {
        let ids = ids(2);
        let vectors = [vec![1.0], vec![2.0]];
        let hits = k_nearest(
            ids.iter().zip(vectors.iter().map(Vec::as_slice)),
            &[0.0],
            usize::MAX,
        );
        assert_eq!(hits.len(), 2);
    }
}
