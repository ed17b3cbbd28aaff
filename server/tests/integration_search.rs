use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use searchcore::persist::OutputPaths;
use searchcore::pipeline::{prepare, IndexSource};
use searchcore::{EngineConfig, StopWords};
use serde_json::Value;
use server::{build_app, AppState};
use std::fs;
use tempfile::tempdir;
use tower::ServiceExt;

fn build_tiny_app(admin_token: Option<&str>) -> Router {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("corpus.dat");
    let log = dir.path().join("queries.dat");
    fs::write(&corpus, "a|| cat dog\nb|| dog\nc|| bird\n").unwrap();
    fs::write(&log, "dog\nbird dog\n").unwrap();
    let config = EngineConfig { cache_capacity: 2, ..EngineConfig::default() };
    let prepared = prepare(
        &IndexSource::Corpus(corpus),
        StopWords::english(),
        &config,
        Some(log.as_path()),
        &OutputPaths::new(dir.path()),
    )
    .unwrap();
    build_app(AppState::new(prepared, admin_token.map(str::to_string)))
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    call(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn search_returns_ranked_results_then_hits_cache() {
    let app = build_tiny_app(None);

    let (status, json) = get(&app, "/search?q=cat%20dog").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["origin"], "stored");
    let docs = json["top_docs"].as_array().unwrap();
    assert_eq!(docs[0]["doc_id"], "a||");
    assert_eq!(docs[0]["score"], 2);
    assert_eq!(docs[1]["doc_id"], "b||");

    let (_, again) = get(&app, "/search?q=cat%20dog").await;
    assert_eq!(again["origin"], "hit");
    assert_eq!(again["result"], json["result"]);
    assert!(again["top_docs"].is_null());
}

#[tokio::test]
async fn stopword_only_query_is_not_cached() {
    let app = build_tiny_app(None);
    let (_, json) = get(&app, "/search?q=the%20of").await;
    assert_eq!(json["origin"], "uncached");
    let (_, peek) = get(&app, "/cache?q=the%20of").await;
    assert_eq!(peek["cached"], false);
}

#[tokio::test]
async fn cache_listing_is_most_recent_first() {
    let app = build_tiny_app(None);
    let (_, json) = get(&app, "/cache").await;
    assert_eq!(json["capacity"], 2);
    let queries: Vec<&str> = json["entries"].as_array().unwrap().iter().map(|e| e["query"].as_str().unwrap()).collect();
    assert_eq!(queries, vec!["bird dog", "dog"]);
}

#[tokio::test]
async fn clearing_the_cache_requires_the_admin_token() {
    let app = build_tiny_app(Some("secret"));
    let (status, _) = call(&app, Request::delete("/cache").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::delete("/cache").header("X-ADMIN-TOKEN", "secret").body(Body::empty()).unwrap();
    let (status, json) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 2);

    let (_, stats) = get(&app, "/stats").await;
    assert_eq!(stats["cache"]["total_queries"], 0);
    assert_eq!(stats["cache_len"], 0);
}

#[tokio::test]
async fn graph_and_pagerank_reflect_the_replayed_log() {
    let app = build_tiny_app(None);

    let (status, json) = get(&app, "/graph?id=a%7C%7C").await;
    assert_eq!(status, StatusCode::OK);
    let neighbors = json["neighbors"].as_array().unwrap();
    assert_eq!(neighbors[0]["doc_id"], "b||");
    assert_eq!(neighbors[0]["weight"], 2);
    assert_eq!(neighbors[1]["doc_id"], "c||");

    let (status, _) = get(&app, "/graph?id=zzz").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, pr) = get(&app, "/pagerank?id=a%7C%7C").await;
    assert_eq!(pr["position"], 1);
    assert_eq!(pr["total"], 3);

    let (_, top) = get(&app, "/pagerank/top?n=abc").await;
    assert_eq!(top["n"], 10);
    assert_eq!(top["results"].as_array().unwrap().len(), 3);
    assert_eq!(top["results"][0]["doc_id"], "a||");
}
