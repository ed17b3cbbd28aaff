use axum::{extract::{Query, State}, http::{HeaderMap, StatusCode}, routing::get, Json, Router};
use parking_lot::Mutex;
use searchcore::pipeline::Prepared;
use searchcore::{CacheStats, CoRelevanceGraph, PageRank, ReplyOrigin, ScoredDoc, SearchSession};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

const DEFAULT_TOP: usize = 10;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Deserialize)]
pub struct CacheParams {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct NodeParams {
    pub id: String,
}

#[derive(Deserialize)]
pub struct TopParams {
    // Kept as text so a malformed count falls back to the default instead of a 400.
    pub n: Option<String>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub origin: ReplyOrigin,
    pub took_s: f64,
    pub result: String,
    pub top_docs: Option<Vec<ScoredDoc>>,
}

#[derive(Serialize)]
pub struct Neighbor {
    pub doc_id: String,
    pub weight: u32,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub graph_nodes: usize,
    pub graph_edges: usize,
    pub pagerank_docs: usize,
    pub cache: CacheStats,
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub cache_len: usize,
    pub cache_capacity: usize,
}

/// The index is immutable behind the session's processor; the cache and its
/// counters are mutated only under `session`'s lock. Graph and PageRank are
/// frozen snapshots from the batch pass.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<SearchSession>>,
    pub graph: Arc<CoRelevanceGraph>,
    pub pagerank: Arc<PageRank>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(prepared: Prepared, admin_token: Option<String>) -> Self {
        Self {
            session: Arc::new(Mutex::new(prepared.session)),
            graph: Arc::new(prepared.graph),
            pagerank: Arc::new(prepared.pagerank),
            admin_token,
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/cache", get(cache_handler).delete(clear_cache_handler))
        .route("/graph", get(graph_handler))
        .route("/pagerank", get(pagerank_handler))
        .route("/pagerank/top", get(top_pagerank_handler))
        .route("/stats", get(stats_handler))
        .with_state(state)
        .layer(cors_layer())
}

// CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
fn cors_layer() -> CorsLayer {
    let any = || CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                any()
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => any(),
    }
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let reply = state.session.lock().search(&params.q);
    let elapsed = start.elapsed();
    Json(SearchResponse {
        query: params.q,
        origin: reply.origin,
        took_s: elapsed.as_secs_f64(),
        result: reply.text,
        top_docs: reply.top_docs,
    })
}

/// With `q`: peek at one entry. Without: list every entry, most recent first,
/// reading each one through the promoting lookup.
pub async fn cache_handler(State(state): State<AppState>, Query(params): Query<CacheParams>) -> Json<serde_json::Value> {
    let mut session = state.session.lock();
    match params.q {
        Some(q) => {
            let result = session.peek(&q).map(str::to_string);
            Json(serde_json::json!({ "query": q, "cached": result.is_some(), "result": result }))
        }
        None => {
            let entries = session.cache_entries();
            Json(serde_json::json!({
                "len": session.cache_len(),
                "capacity": session.cache_capacity(),
                "entries": entries,
            }))
        }
    }
}

pub async fn clear_cache_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let removed = state.session.lock().clear_cache();
    Ok(Json(serde_json::json!({ "removed": removed })))
}

pub async fn graph_handler(State(state): State<AppState>, Query(params): Query<NodeParams>) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    if !state.graph.contains(&params.id) {
        return Err((StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found", "id": params.id }))));
    }
    let neighbors: Vec<Neighbor> = state
        .graph
        .neighbors(&params.id)
        .iter()
        .map(|(doc_id, weight)| Neighbor { doc_id: doc_id.clone(), weight: *weight })
        .collect();
    Ok(Json(serde_json::json!({ "id": params.id, "neighbors": neighbors })))
}

pub async fn pagerank_handler(State(state): State<AppState>, Query(params): Query<NodeParams>) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    match (state.pagerank.score(&params.id), state.pagerank.position(&params.id)) {
        (Some(score), Some(position)) => Ok(Json(serde_json::json!({
            "id": params.id,
            "score": score,
            "position": position,
            "total": state.pagerank.len(),
        }))),
        _ => Err((StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found", "id": params.id })))),
    }
}

pub async fn top_pagerank_handler(State(state): State<AppState>, Query(params): Query<TopParams>) -> Json<serde_json::Value> {
    let n = params.n.as_deref().and_then(|s| s.trim().parse::<usize>().ok()).unwrap_or(DEFAULT_TOP);
    let results: Vec<serde_json::Value> = state
        .pagerank
        .top(n)
        .into_iter()
        .map(|(doc_id, score)| serde_json::json!({ "doc_id": doc_id, "score": score }))
        .collect();
    Json(serde_json::json!({ "n": n, "results": results }))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let session = state.session.lock();
    let cache = session.stats();
    Json(StatsResponse {
        graph_nodes: state.graph.node_count(),
        graph_edges: state.graph.edge_count(),
        pagerank_docs: state.pagerank.len(),
        cache,
        hit_rate: cache.hit_rate(),
        miss_rate: cache.miss_rate(),
        cache_len: session.cache_len(),
        cache_capacity: session.cache_capacity(),
    })
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
