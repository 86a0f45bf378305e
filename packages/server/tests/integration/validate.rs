use libras_server::evaluator::Evaluation;
use reqwest::multipart::Form;

use crate::common::{PDF_BYTES, TestApp, file_part, routes};

const PHOTO: &[u8] = b"\x89PNG mao fechada";

mod validate_with_letter_index {
    use super::*;

    #[tokio::test]
    async fn verdict_is_returned_and_logged() {
        let app = TestApp::spawn().await;
        let pdf = app.upload_letter("A", PDF_BYTES).await;

        let res = app.validate("a", PHOTO, "image/png", None).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["resultado"], "Sim, está correto. A mão forma a letra.");
        assert_eq!(res.body["finish_reason"], "STOP");
        assert_eq!(res.body["pdf_file_id"].as_str().unwrap(), pdf.file_id());
        let photo_id = res.body["photo_file_id"].as_str().unwrap();

        let photo = app.get_bytes(&routes::file(photo_id), None).await;
        assert_eq!(photo.bytes, PHOTO);
        assert_eq!(photo.content_type.as_deref(), Some("image/png"));

        let calls = app.evaluator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].letter, "A");
        assert_eq!(calls[0].photo_mime, "image/png");
        assert_eq!(calls[0].photo, PHOTO);
        assert_eq!(calls[0].reference_mime, "application/pdf");
        assert_eq!(calls[0].reference, PDF_BYTES);

        let log = app.get(routes::VALIDATIONS).await;
        let records = log.body.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["letter"], "A");
        assert_eq!(records[0]["model"], "models/fake-model");
        assert_eq!(records[0]["photo_filename"], "foto_aluno.png");
        assert_eq!(records[0]["photo_size_bytes"], PHOTO.len() as i64);
        assert_eq!(records[0]["reference_meta"]["source"], "letter_index");
        assert_eq!(records[0]["reference_meta"]["letter"], "A");
    }

    #[tokio::test]
    async fn no_reference_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.validate("Q", PHOTO, "image/png", None).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
        assert!(app.evaluator.calls().is_empty());
        assert_eq!(app.get(routes::VALIDATIONS).await.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn reference_key_index_is_not_consulted() {
        let app = TestApp::spawn().await;
        app.upload_reference("A", PDF_BYTES).await;

        let res = app.validate("A", PHOTO, "image/png", None).await;

        assert_eq!(res.status, 404);
    }
}

mod validate_with_explicit_pdf {
    use super::*;

    #[tokio::test]
    async fn explicit_id_wins_over_letter_index() {
        let app = TestApp::spawn().await;
        app.upload_letter("A", b"%PDF letter index").await;
        let explicit = app.upload_reference("alt", b"%PDF explicit").await;

        let res = app
            .validate("A", PHOTO, "image/jpeg", Some(&explicit.file_id()))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["pdf_file_id"].as_str().unwrap(), explicit.file_id());
        assert_eq!(app.evaluator.calls()[0].reference, b"%PDF explicit");

        let log = app.get(routes::VALIDATIONS).await;
        assert_eq!(log.body[0]["reference_meta"]["source"], "blob_id");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let app = TestApp::spawn().await;
        app.upload_letter("A", PDF_BYTES).await;

        for id in ["999", "not-an-id"] {
            let res = app.validate("A", PHOTO, "image/png", Some(id)).await;
            assert_eq!(res.status, 404, "{id:?}");
        }
        assert!(app.evaluator.calls().is_empty());
    }
}

mod blocked_responses {
    use super::*;

    #[tokio::test]
    async fn empty_answer_is_bad_gateway_and_still_logged() {
        let app = TestApp::spawn().await;
        let pdf = app.upload_letter("A", PDF_BYTES).await;
        app.evaluator.answer_with(Evaluation {
            result_text: None,
            finish_reason: Some("SAFETY".into()),
        });

        let res = app.validate("A", PHOTO, "image/png", None).await;

        assert_eq!(res.status, 502);
        assert_eq!(res.body["erro"], "A resposta do modelo foi bloqueada ou vazia.");
        assert_eq!(res.body["finish_reason"], "SAFETY");
        assert_eq!(res.body["pdf_file_id"].as_str().unwrap(), pdf.file_id());
        assert!(res.body["photo_file_id"].as_str().is_some());

        let log = app.get(routes::VALIDATIONS).await;
        assert_eq!(log.body[0]["result_text"], serde_json::Value::Null);
        assert_eq!(log.body[0]["finish_reason"], "SAFETY");
    }

    #[tokio::test]
    async fn missing_finish_reason_defaults() {
        let app = TestApp::spawn().await;
        app.upload_letter("A", PDF_BYTES).await;
        app.evaluator.answer_with(Evaluation::default());

        let res = app.validate("A", PHOTO, "image/png", None).await;

        assert_eq!(res.status, 502);
        assert_eq!(res.body["finish_reason"], "DESCONHECIDO");
    }

    #[tokio::test]
    async fn transport_failure_is_upstream_error_and_not_logged() {
        let app = TestApp::spawn().await;
        app.upload_letter("A", PDF_BYTES).await;
        app.evaluator.fail_with("connection refused");

        let res = app.validate("A", PHOTO, "image/png", None).await;

        assert_eq!(res.status, 502);
        assert_eq!(res.body["code"], "UPSTREAM_ERROR");
        assert_eq!(app.get(routes::VALIDATIONS).await.body.as_array().unwrap().len(), 0);
    }
}

mod request_validation {
    use super::*;

    #[tokio::test]
    async fn missing_letter_is_rejected() {
        let app = TestApp::spawn().await;
        app.upload_letter("A", PDF_BYTES).await;

        let form = Form::new().part("photo", file_part(PHOTO, "f.png", "image/png"));
        let res = app.post_form(routes::VALIDATE, form).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn non_image_photo_is_rejected() {
        let app = TestApp::spawn().await;
        app.upload_letter("A", PDF_BYTES).await;

        let res = app.validate("A", PDF_BYTES, "application/pdf", None).await;

        assert_eq!(res.status, 400);
        assert!(app.evaluator.calls().is_empty());
    }

    #[tokio::test]
    async fn untyped_photo_is_recognised_by_extension() {
        let app = TestApp::spawn().await;
        app.upload_letter("A", PDF_BYTES).await;

        let form = Form::new()
            .text("letter", "A")
            .part("photo", file_part(PHOTO, "mao.png", "application/octet-stream"));
        let res = app.post_form(routes::VALIDATE, form).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(app.evaluator.calls()[0].photo_mime, "image/png");
    }

    #[tokio::test]
    async fn oversized_photo_is_rejected() {
        let app = TestApp::spawn().await;
        app.upload_letter("A", PDF_BYTES).await;

        let big = vec![0u8; crate::common::MAX_UPLOAD as usize + 1];
        let res = app.validate("A", &big, "image/png", None).await;

        assert_eq!(res.status, 413);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn body_over_route_limit_is_payload_too_large() {
        let app = TestApp::spawn().await;
        app.upload_letter("A", PDF_BYTES).await;

        let big = vec![0u8; crate::common::MAX_UPLOAD as usize + 128 * 1024];
        let res = app.validate("A", &big, "image/png", None).await;

        assert_eq!(res.status, 413, "{}", res.text);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
        assert!(app.evaluator.calls().is_empty());
    }

    #[tokio::test]
    async fn dangling_letter_entry_is_not_found() {
        let app = TestApp::spawn().await;
        app.store
            .letters()
            .upsert("Q", 9999, "q.pdf", "application/pdf")
            .await
            .unwrap();

        let res = app.validate("Q", PHOTO, "image/png", None).await;

        assert_eq!(res.status, 404, "{}", res.text);
        assert_eq!(res.body["code"], "NOT_FOUND");
        assert!(app.evaluator.calls().is_empty());
    }
}

mod validation_log {
    use super::*;

    #[tokio::test]
    async fn repeated_requests_append_distinct_records_newest_first() {
        let app = TestApp::spawn().await;
        app.upload_letter("A", PDF_BYTES).await;
        app.upload_letter("B", PDF_BYTES).await;

        app.validate("A", PHOTO, "image/png", None).await;
        app.validate("A", PHOTO, "image/png", None).await;
        app.validate("B", PHOTO, "image/png", None).await;

        let log = app.get(routes::VALIDATIONS).await;
        let records = log.body.as_array().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["letter"], "B");
        assert_ne!(records[1]["id"], records[2]["id"]);
        // Same photo bytes every time: stored once.
        assert_eq!(records[1]["photo_file_id"], records[2]["photo_file_id"]);

        let limited = app.get(&format!("{}?limit=1", routes::VALIDATIONS)).await;
        assert_eq!(limited.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn limit_is_clamped() {
        let app = TestApp::spawn().await;
        app.upload_letter("A", PDF_BYTES).await;
        app.validate("A", PHOTO, "image/png", None).await;
        app.validate("A", PHOTO, "image/png", None).await;

        let zero = app.get(&format!("{}?limit=0", routes::VALIDATIONS)).await;
        assert_eq!(zero.status, 200, "{}", zero.text);
        assert_eq!(zero.body.as_array().unwrap().len(), 1);

        let huge = app.get(&format!("{}?limit=1000", routes::VALIDATIONS)).await;
        assert_eq!(huge.body.as_array().unwrap().len(), 2);
    }
}
