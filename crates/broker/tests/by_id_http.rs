use axum::http::StatusCode;
use tempfile::tempdir;

mod helpers;
use helpers::{get_json, make_router_for_dir, write_sample_export};

#[tokio::test]
async fn by_id_returns_full_record() {
    let dir = tempdir().unwrap();
    write_sample_export(dir.path());
    let app = make_router_for_dir(dir.path());

    let (status, v) = get_json(app, "/api/by-id/w4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["objectId"], "w4");
    assert_eq!(v["query"], "Домик");
    assert_eq!(v["translation"], "小房子");
}

#[tokio::test]
async fn by_id_missing_is_404() {
    let dir = tempdir().unwrap();
    write_sample_export(dir.path());
    let app = make_router_for_dir(dir.path());

    let (status, v) = get_json(app, "/api/by-id/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["error"], "Not found");
}
