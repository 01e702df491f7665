use crate::error::Result;
use crate::ingest::{Document, DocumentSource, IngestOptions, Row};
use crate::query::QueryVector;
use crate::scorer::{rank_top_k, RankedResult, SearchHit, TOP_K};
use crate::tokenizer::{distinct_terms, log_tf, term_counts, tokenize};
use crate::{DocId, DocMeta};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Number of documents each term occurs in at least once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFrequency {
    counts: HashMap<String, u32>,
}

impl DocumentFrequency {
    /// df of an already normalized term; 0 when unseen.
    pub fn get(&self, term: &str) -> u32 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.counts.iter().map(|(t, &df)| (t.as_str(), df))
    }

    fn record_document(&mut self, tokens: &[String]) {
        for term in distinct_terms(tokens) {
            *self.counts.entry(term.to_string()).or_insert(0) += 1;
        }
    }
}

/// Sparse lnc-weighted document vector. Non-empty vectors have unit norm.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocVector {
    weights: BTreeMap<String, f64>,
}

impl DocVector {
    /// Log tf per distinct term, then cosine normalization. A document
    /// without terms stays empty.
    pub fn lnc(tokens: &[String]) -> Self {
        let mut weights: BTreeMap<String, f64> = term_counts(tokens)
            .into_iter()
            .map(|(term, tf)| (term.to_string(), log_tf(tf)))
            .collect();
        let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for w in weights.values_mut() {
                *w /= norm;
            }
        }
        Self { weights }
    }

    /// Weight of `term`, 0 when the document lacks it.
    pub fn weight(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    pub fn norm(&self) -> f64 {
        self.weights.values().map(|w| w * w).sum::<f64>().sqrt()
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

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub documents: u32,
    pub skipped: u32,
    pub terms: usize,
}

/// A (term, document, weight) entry from [`Index::top_terms`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermWeight {
    pub term: String,
    pub doc_id: DocId,
    pub weight: f64,
}

/// Accumulates documents, then runs the vocabulary and vectorization
/// passes in [`IndexBuilder::finish`].
#[derive(Debug, Default)]
pub struct IndexBuilder {
    options: IngestOptions,
    tokens: Vec<Vec<String>>,
    meta: Vec<Option<DocMeta>>,
    skipped: u32,
}

impl IndexBuilder {
    pub fn new(options: IngestOptions) -> Self {
        Self { options, ..Self::default() }
    }

    pub fn push_document(&mut self, doc: Document) -> DocId {
        let doc_id = self.tokens.len() as DocId;
        let text = if self.options.strip_leading_token { strip_leading_word(&doc.text) } else { doc.text.as_str() };
        self.tokens.push(tokenize(text));
        self.meta.push(doc.meta);
        doc_id
    }

    pub fn push_row(&mut self, row: Row) -> DocId {
        match row {
            Row::Parsed(doc) => self.push_document(doc),
            Row::Malformed { line, reason } => {
                let doc_id = self.tokens.len() as DocId;
                tracing::warn!(line, doc_id, %reason, "skipping malformed record");
                self.skipped += 1;
                self.tokens.push(Vec::new());
                self.meta.push(None);
                doc_id
            }
        }
    }

    pub fn finish(self) -> Index {
        let num_docs = self.tokens.len() as u32;

        // Pass 1: document frequencies over the whole corpus.
        let mut df = DocumentFrequency::default();
        for tokens in &self.tokens {
            df.record_document(tokens);
        }
        tracing::debug!(num_docs, num_terms = df.len(), "vocabulary pass complete");

        // Pass 2: per-document lnc vectors.
        let vectors: Vec<DocVector> = self.tokens.iter().map(|t| DocVector::lnc(t)).collect();

        let stats = BuildStats { documents: num_docs, skipped: self.skipped, terms: df.len() };
        tracing::info!(num_docs, num_terms = stats.terms, skipped = stats.skipped, "index build complete");
        Index { vectors, df, num_docs, meta: self.meta, stats }
    }
}

/// Text after the first whitespace-delimited word.
fn strip_leading_word(text: &str) -> &str {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => &text[end..],
        None => "",
    }
}

/// Immutable in-memory index; document ids are positions in ingestion order.
#[derive(Debug, Clone)]
pub struct Index {
    vectors: Vec<DocVector>,
    df: DocumentFrequency,
    num_docs: u32,
    meta: Vec<Option<DocMeta>>,
    stats: BuildStats,
}

impl Index {
    /// Drain `source` and build the index. Only a fatal source error fails
    /// the build; malformed rows keep an empty slot.
    pub fn build<S: DocumentSource + ?Sized>(source: &mut S, options: IngestOptions) -> Result<Self> {
        let mut builder = IndexBuilder::new(options);
        while let Some(row) = source.next_row()? {
            builder.push_row(row);
        }
        Ok(builder.finish())
    }

    pub fn from_texts<I, T>(texts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut builder = IndexBuilder::default();
        for text in texts {
            builder.push_document(Document::new(text));
        }
        builder.finish()
    }

    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    pub fn vectors(&self) -> &[DocVector] {
        &self.vectors
    }

    pub fn vector(&self, doc_id: DocId) -> Option<&DocVector> {
        self.vectors.get(doc_id as usize)
    }

    pub fn meta(&self, doc_id: DocId) -> Option<&DocMeta> {
        self.meta.get(doc_id as usize).and_then(Option::as_ref)
    }

    pub fn df(&self) -> &DocumentFrequency {
        &self.df
    }

    /// Case-insensitive document frequency lookup; 0 for unseen terms.
    pub fn document_frequency(&self, term: &str) -> u32 {
        self.df.get(&term.to_lowercase())
    }

    pub fn vocabulary_size(&self) -> usize {
        self.df.len()
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// The `n` highest individual document weights in the index, ties
    /// broken by term then document id.
    pub fn top_terms(&self, n: usize) -> Vec<TermWeight> {
        let mut all: Vec<TermWeight> = self
            .vectors
            .iter()
            .enumerate()
            .flat_map(|(doc_id, v)| {
                v.iter().map(move |(term, weight)| TermWeight { term: term.to_string(), doc_id: doc_id as DocId, weight })
            })
            .collect();
        all.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| a.term.cmp(&b.term))
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        all.truncate(n);
        all
    }

    /// Rank documents against a raw query string, best [`TOP_K`] first.
    pub fn search(&self, query: &str) -> Vec<RankedResult> {
        self.search_k(query, TOP_K)
    }

    pub fn search_k(&self, query: &str, k: usize) -> Vec<RankedResult> {
        let qv = QueryVector::from_text(query, self);
        let results = rank_top_k(&qv, self, k);
        tracing::debug!(query, terms = qv.len(), hits = results.len(), "query ranked");
        results
    }

    /// Join ranked results with their metadata for display.
    pub fn hits(&self, results: &[RankedResult]) -> Vec<SearchHit> {
        results
            .iter()
            .map(|r| SearchHit { doc_id: r.doc_id, score: r.score, meta: self.meta(r.doc_id).cloned() })
            .collect()
    }
}

impl PartialEq for Index {
    fn eq(&self, other: &Self) -> bool {
        self.num_docs == other.num_docs
            && self.vectors == other.vectors
            && self.df == other.df
            && self.meta == other.meta
    }
}
