use crate::index::Index;
use crate::tokenizer::{log_tf, term_counts, tokenize};
use std::collections::BTreeMap;

/// Inverse document frequency of a normalized term.
///
/// Seen terms use `log10(N / (df + 1))`. Terms absent from the corpus fall
/// back to `log10(N)`, so they still carry weight and never divide by zero.
/// An empty corpus yields 0.
pub fn idf(term: &str, index: &Index) -> f64 {
    let n = index.num_docs() as f64;
    if n == 0.0 {
        return 0.0;
    }
    match index.df().get(term) {
        0 => n.log10(),
        df => (n / (df as f64 + 1.0)).log10(),
    }
}

/// ltn-weighted query: log tf times idf, left unnormalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryVector {
    weights: BTreeMap<String, f64>,
}

impl QueryVector {
    pub fn from_text(text: &str, index: &Index) -> Self {
        let tokens = tokenize(text);
        let weights = term_counts(&tokens)
            .into_iter()
            .map(|(term, tf)| (term.to_string(), log_tf(tf) * idf(term, index)))
            .collect();
        Self { weights }
    }

    pub fn weight(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.weights.iter().map(|(t, &w)| (t.as_str(), w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Index {
        Index::from_texts(["cat dog cat", "dog bird", "cat cat cat bird bird", "fish"])
    }

    #[test]
    fn empty_query_is_empty() {
        let index = corpus();
        assert!(QueryVector::from_text("", &index).is_empty());
        assert!(QueryVector::from_text(" - ", &index).is_empty());
    }

    #[test]
    fn seen_term_weight() {
        let index = corpus();
        let q = QueryVector::from_text("Cat cat", &index);
        let expected = (1.0 + 2f64.log10()) * (4.0f64 / 3.0).log10();
        assert!((q.weight("cat") - expected).abs() < 1e-12);
    }

    #[test]
    fn unseen_term_falls_back_to_log_n() {
        let index = corpus();
        assert!((idf("unicorn", &index) - 4f64.log10()).abs() < 1e-12);
        let q = QueryVector::from_text("unicorn", &index);
        assert!(q.weight("unicorn").is_finite());
        assert!(q.weight("unicorn") > 0.0);
    }

    #[test]
    fn empty_corpus_has_zero_idf() {
        let index = Index::from_texts(Vec::<String>::new());
        assert_eq!(idf("anything", &index), 0.0);
    }
}
