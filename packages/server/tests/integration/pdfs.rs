use reqwest::multipart::Form;

use crate::common::{PDF_BYTES, TestApp, file_part, routes};

mod reference_upload {
    use super::*;

    #[tokio::test]
    async fn registers_pdf_under_key() {
        let app = TestApp::spawn().await;

        let res = app.upload_reference("alfabeto_v1", PDF_BYTES).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["message"], "PDF cadastrado/atualizado");
        assert_eq!(res.body["reference_key"], "alfabeto_v1");
        assert!(res.body.get("letter").is_none());
        assert!(!res.file_id().is_empty());
    }

    #[tokio::test]
    async fn same_bytes_under_two_keys_share_one_blob() {
        let app = TestApp::spawn().await;

        let a = app.upload_reference("k1", PDF_BYTES).await;
        let b = app.upload_reference("k2", PDF_BYTES).await;

        assert_eq!(a.status, 200);
        assert_eq!(b.status, 200);
        assert_eq!(a.file_id(), b.file_id());
    }

    #[tokio::test]
    async fn reupload_replaces_entry() {
        let app = TestApp::spawn().await;

        app.upload_reference("k", b"%PDF first").await;
        let second = app.upload_reference("k", b"%PDF second").await;

        let download = app.get_bytes(&routes::pdf_download("k"), None).await;
        assert_eq!(download.status, 200);
        assert_eq!(download.bytes, b"%PDF second");

        let list = app.get(routes::PDFS).await;
        let entries = list.body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["file_id"].as_str().unwrap(), second.file_id());
    }

    #[tokio::test]
    async fn missing_key_is_rejected() {
        let app = TestApp::spawn().await;

        let form = Form::new().part("file", file_part(PDF_BYTES, "a.pdf", "application/pdf"));
        let res = app.post_form(routes::PDFS, form).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn blank_key_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.upload_reference("   ", PDF_BYTES).await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn non_pdf_is_rejected() {
        let app = TestApp::spawn().await;

        let form = Form::new()
            .text("reference_key", "k")
            .part("file", file_part(b"PNG", "a.png", "image/png"));
        let res = app.post_form(routes::PDFS, form).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unsafe_filename_is_sanitized() {
        let app = TestApp::spawn().await;

        let form = Form::new()
            .text("reference_key", "k")
            .part(
                "file",
                file_part(PDF_BYTES, "../../etc/alfabeto.pdf", "application/pdf"),
            );
        let res = app.post_form(routes::PDFS, form).await;
        assert_eq!(res.status, 200);

        let list = app.get(routes::PDFS).await;
        assert_eq!(list.body[0]["filename"], "alfabeto.pdf");
    }
}

mod reference_listing {
    use super::*;

    #[tokio::test]
    async fn lists_newest_first() {
        let app = TestApp::spawn().await;

        app.upload_reference("old", b"%PDF old").await;
        app.upload_reference("new", b"%PDF new").await;

        let res = app.get(routes::PDFS).await;

        assert_eq!(res.status, 200);
        let keys: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["reference_key"].as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn empty_index_lists_nothing() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::PDFS).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 0);
    }
}

mod reference_download {
    use super::*;

    #[tokio::test]
    async fn serves_pdf_inline() {
        let app = TestApp::spawn().await;
        app.upload_reference("k", PDF_BYTES).await;

        let res = app.get_bytes(&routes::pdf_download("k"), None).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.content_type.as_deref(), Some("application/pdf"));
        assert!(res.disposition.unwrap().starts_with("inline; filename=\"alfabeto.pdf\""));
        assert_eq!(res.bytes, PDF_BYTES);
    }

    #[tokio::test]
    async fn keys_are_case_sensitive() {
        let app = TestApp::spawn().await;
        app.upload_reference("Alfabeto", PDF_BYTES).await;

        let res = app.get(&routes::pdf_download("alfabeto")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn entry_without_blob_is_not_found() {
        let app = TestApp::spawn().await;
        app.store
            .references()
            .upsert("orphan", 9999, "orphan.pdf", "application/pdf")
            .await
            .unwrap();

        let res = app.get(&routes::pdf_download("orphan")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn unknown_key_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::pdf_download("nope")).await;

        assert_eq!(res.status, 404);
    }
}
