use crate::common::{PDF_BYTES, TestApp, routes};

mod letter_upload {
    use super::*;

    #[tokio::test]
    async fn letter_is_normalized() {
        let app = TestApp::spawn().await;

        let res = app.upload_letter(" a ", PDF_BYTES).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["letter"], "A");
        assert!(res.body.get("reference_key").is_none());
    }

    #[tokio::test]
    async fn invalid_letters_are_rejected() {
        let app = TestApp::spawn().await;

        for bad in ["AB", "1", "?"] {
            let res = app.upload_letter(bad, PDF_BYTES).await;
            assert_eq!(res.status, 400, "{bad:?} should be rejected");
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
        assert_eq!(app.get(routes::LETTERS).await.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn case_variants_share_one_entry() {
        let app = TestApp::spawn().await;

        app.upload_letter("b", b"%PDF one").await;
        let second = app.upload_letter("B", b"%PDF two").await;

        let list = app.get(routes::LETTERS).await;
        let entries = list.body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["letter"], "B");
        assert_eq!(entries[0]["file_id"].as_str().unwrap(), second.file_id());
    }

    #[tokio::test]
    async fn one_pdf_can_serve_several_letters() {
        let app = TestApp::spawn().await;

        let c = app.upload_letter("C", PDF_BYTES).await;
        let b = app.upload_letter("B", PDF_BYTES).await;
        assert_eq!(b.file_id(), c.file_id());

        let list = app.get(routes::LETTERS).await;
        let letters: Vec<&str> = list
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["letter"].as_str().unwrap())
            .collect();
        assert_eq!(letters, vec!["B", "C"]);
    }
}

mod letter_download {
    use super::*;

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let app = TestApp::spawn().await;
        app.upload_letter("a", PDF_BYTES).await;

        let res = app.get_bytes(&routes::letter_download("A"), None).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.bytes, PDF_BYTES);

        let res = app.get_bytes(&routes::letter_download("a"), None).await;
        assert_eq!(res.status, 200);
    }

    #[tokio::test]
    async fn entry_without_blob_is_not_found() {
        let app = TestApp::spawn().await;
        app.store
            .letters()
            .upsert("q", 9999, "q.pdf", "application/pdf")
            .await
            .unwrap();

        let res = app.get(&routes::letter_download("Q")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn oversized_upload_is_payload_too_large() {
        let app = TestApp::spawn().await;

        let big = vec![0u8; crate::common::MAX_UPLOAD as usize + 128 * 1024];
        let res = app.upload_letter("A", &big).await;

        assert_eq!(res.status, 413, "{}", res.text);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn unknown_letter_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::letter_download("Z")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
