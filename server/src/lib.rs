use anyhow::{Context, Result};
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use lyric_core::ingest::{open_source, DEFAULT_TEXT_FIELD};
use lyric_core::{DocId, Index, IngestOptions, SourceFormat, TermWeight, TOP_K};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const DEFAULT_TOP_TERMS: usize = 20;
const MAX_TOP_TERMS: usize = 1000;

/// Where and how to read the corpus the server indexes at startup.
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    pub path: PathBuf,
    pub format: Option<SourceFormat>,
    pub text_field: String,
    pub options: IngestOptions,
}

impl CorpusConfig {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into(), format: None, text_field: DEFAULT_TEXT_FIELD.to_string(), options: IngestOptions::default() }
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { TOP_K }

#[derive(Deserialize)]
pub struct TopTermsParams {
    #[serde(default = "default_top_terms")]
    pub n: usize,
}
fn default_top_terms() -> usize { DEFAULT_TOP_TERMS }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    pub artist: Option<String>,
    pub title: Option<String>,
}

#[derive(Serialize)]
pub struct DocResponse {
    pub doc_id: DocId,
    pub terms: usize,
    pub artist: Option<String>,
    pub title: Option<String>,
}

#[derive(Serialize)]
pub struct DfResponse {
    pub term: String,
    pub df: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<Index>,
}

/// Build the index from `corpus`, then the router serving it.
pub fn build_app(corpus: &CorpusConfig) -> Result<Router> {
    let format = corpus.format.unwrap_or_else(|| SourceFormat::from_path(&corpus.path));
    let mut source = open_source(&corpus.path, format, &corpus.text_field)
        .with_context(|| format!("opening corpus {}", corpus.path.display()))?;
    let index = Index::build(&mut source, corpus.options)
        .with_context(|| format!("reading corpus {}", corpus.path.display()))?;
    let stats = index.stats();
    tracing::info!(documents = stats.documents, terms = stats.terms, skipped = stats.skipped, "index loaded");
    Ok(router(Arc::new(index)))
}

pub fn router(index: Arc<Index>) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/df/:term", get(df_handler))
        .route("/top-terms", get(top_terms_handler))
        .with_state(AppState { index })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let index = &state.index;
    let k = params.k.clamp(1, TOP_K);

    // Rank everything once so total_hits can count every matching document.
    let mut ranked = index.search_k(&params.q, index.num_docs() as usize);
    let total_hits = ranked.iter().filter(|r| r.score > 0.0).count();
    ranked.truncate(k);

    let results = index
        .hits(&ranked)
        .into_iter()
        .map(|hit| {
            let (artist, title) = match hit.meta {
                Some(meta) => (Some(meta.artist), Some(meta.title)),
                None => (None, None),
            };
            SearchHit { doc_id: hit.doc_id, score: hit.score, artist, title }
        })
        .collect();

    let took_s = start.elapsed().as_secs_f64();
    Json(SearchResponse { query: params.q, took_s, total_hits, results })
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Result<Json<DocResponse>, (StatusCode, String)> {
    let vector = state
        .index
        .vector(doc_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("no document {doc_id}")))?;
    let meta = state.index.meta(doc_id);
    Ok(Json(DocResponse {
        doc_id,
        terms: vector.len(),
        artist: meta.map(|m| m.artist.clone()),
        title: meta.map(|m| m.title.clone()),
    }))
}

pub async fn df_handler(State(state): State<AppState>, Path(term): Path<String>) -> Json<DfResponse> {
    let df = state.index.document_frequency(&term);
    Json(DfResponse { term, df })
}

pub async fn top_terms_handler(State(state): State<AppState>, Query(params): Query<TopTermsParams>) -> Json<Vec<TermWeight>> {
    Json(state.index.top_terms(params.n.min(MAX_TOP_TERMS)))
}
