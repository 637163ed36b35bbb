use axum::http::StatusCode;
use tempfile::tempdir;

mod helpers;
use helpers::{get_json, make_router_for_dir};

#[tokio::test]
async fn missing_manifest_is_404_everywhere() {
    let dir = tempdir().unwrap();

    for uri in ["/api/stats", "/api/search?q=x", "/api/by-id/1"] {
        let app = make_router_for_dir(dir.path());
        let (status, _) = get_json(app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}
