use crate::common::{PDF_BYTES, TestApp, routes};

#[tokio::test]
async fn serves_blob_by_id() {
    let app = TestApp::spawn().await;
    let upload = app.upload_reference("k", PDF_BYTES).await;

    let res = app.get_bytes(&routes::file(&upload.file_id()), None).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(res.bytes, PDF_BYTES);
}

#[tokio::test]
async fn etag_match_is_not_modified() {
    let app = TestApp::spawn().await;
    let upload = app.upload_reference("k", PDF_BYTES).await;
    let path = routes::file(&upload.file_id());

    let first = app.get_bytes(&path, None).await;
    let etag = first.etag.expect("download should carry an ETag");

    let second = app.get_bytes(&path, Some(&etag)).await;
    assert_eq!(second.status, 304);
    assert!(second.bytes.is_empty());
}

#[tokio::test]
async fn unknown_or_malformed_id_is_not_found() {
    let app = TestApp::spawn().await;

    for id in ["999", "0", "-1", "abc"] {
        let res = app.get(&routes::file(id)).await;
        assert_eq!(res.status, 404, "{id:?}");
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::HEALTH).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body, serde_json::json!({"ok": true}));
}
