use crate::index::Index;
use crate::query::QueryVector;
use crate::{DocId, DocMeta};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Result list cutoff.
pub const TOP_K: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub doc_id: DocId,
    pub score: f64,
}

/// A ranked result joined with the document's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    pub meta: Option<DocMeta>,
}

/// Score every document and keep the best [`TOP_K`].
pub fn score_and_rank(query: &QueryVector, index: &Index) -> Vec<RankedResult> {
    rank_top_k(query, index, TOP_K)
}

/// Sparse dot product of `query` with each document vector, sorted by
/// score descending then document id ascending, truncated to `k`.
/// Zero-score documents are ranked too; an empty query ranks nothing.
pub fn rank_top_k(query: &QueryVector, index: &Index, k: usize) -> Vec<RankedResult> {
    if query.is_empty() || k == 0 {
        return Vec::new();
    }
    let mut scored: Vec<RankedResult> = index
        .vectors()
        .iter()
        .enumerate()
        .map(|(doc_id, doc)| {
            let score = query.iter().map(|(term, qw)| doc.weight(term) * qw).sum();
            RankedResult { doc_id: doc_id as DocId, score }
        })
        .collect();
    if scored.len() > k {
        scored.select_nth_unstable_by(k - 1, by_score_then_id);
        scored.truncate(k);
    }
    scored.sort_by(by_score_then_id);
    scored
}

fn by_score_then_id(a: &RankedResult, b: &RankedResult) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.doc_id.cmp(&b.doc_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_ranks_nothing() {
        let index = Index::from_texts(["a b", "c"]);
        let q = QueryVector::from_text("   ", &index);
        assert!(score_and_rank(&q, &index).is_empty());
    }

    #[test]
    fn ties_break_by_doc_id() {
        let index = Index::from_texts(["x", "y", "x", "z"]);
        let q = QueryVector::from_text("x", &index);
        let ids: Vec<DocId> = score_and_rank(&q, &index).iter().map(|r| r.doc_id).collect();
        assert_eq!(ids, vec![0, 2, 1, 3]);
    }

    #[test]
    fn truncates_to_top_k() {
        let texts: Vec<String> = (0..25).map(|i| format!("common t{i}")).collect();
        let index = Index::from_texts(texts);
        let q = QueryVector::from_text("t7 t19", &index);
        let results = score_and_rank(&q, &index);
        assert_eq!(results.len(), TOP_K);
        assert_eq!(results[0].doc_id, 7);
        assert_eq!(results[1].doc_id, 19);
        assert_eq!(results[2].doc_id, 0);
        assert_eq!(results[2].score, 0.0);
        assert!(results.windows(2).all(|w| by_score_then_id(&w[0], &w[1]) != Ordering::Greater));
    }

    #[test]
    fn smaller_k() {
        let index = Index::from_texts(["a", "a a", "b"]);
        let q = QueryVector::from_text("a", &index);
        assert_eq!(rank_top_k(&q, &index, 1).len(), 1);
        assert!(rank_top_k(&q, &index, 0).is_empty());
    }
}
