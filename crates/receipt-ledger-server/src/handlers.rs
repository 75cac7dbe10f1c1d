//! HTTP handlers.

use actix_web::{get, post, web, HttpResponse, Responder};
use tracing::debug;

use crate::app::AppWriter;
use crate::response::submit_response;

/// Fixed text returned by the liveness probe.
pub const LIVENESS_TEXT: &str = "Receipt ledger is running.";

#[get("/")]
async fn liveness() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(LIVENESS_TEXT)
}

#[post("/")]
async fn submit_root(writer: web::Data<AppWriter>, body: web::Bytes) -> HttpResponse {
    submit(&writer, &body).await
}

#[post("/receipts")]
async fn submit_receipts(writer: web::Data<AppWriter>, body: web::Bytes) -> HttpResponse {
    submit(&writer, &body).await
}

async fn submit(writer: &AppWriter, body: &[u8]) -> HttpResponse {
    debug!(bytes = body.len(), "receipt submission received");
    submit_response(writer.submit_json(body).await)
}

/// Register every route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(liveness)
        .service(submit_root)
        .service(submit_receipts);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use receipt_ledger::{LedgerConfig, LedgerWriter};
    use receipt_ledger_testkit::fixtures::FailingStore;
    use serde_json::{json, Value};

    use super::*;
    use crate::app::SharedStore;
    use receipt_ledger::store::MemoryStore;

    fn writer_over(store: SharedStore) -> web::Data<AppWriter> {
        web::Data::new(LedgerWriter::new(store, LedgerConfig::default()))
    }

    fn memory_writer() -> web::Data<AppWriter> {
        writer_over(Arc::new(MemoryStore::new()))
    }

    fn acme() -> Value {
        json!({"merchantName": "Acme", "date": "2024-01-01", "total": "10.00"})
    }

    #[actix_web::test]
    async fn test_liveness() {
        let app = test::init_service(App::new().app_data(memory_writer()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, LIVENESS_TEXT.as_bytes());
    }

    #[actix_web::test]
    async fn test_submit_then_duplicate() {
        let app = test::init_service(App::new().app_data(memory_writer()).configure(configure)).await;

        let req = test::TestRequest::post().uri("/").set_json(acme()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["row"], 2);

        let req = test::TestRequest::post()
            .uri("/receipts")
            .set_json(json!({"merchantName": "  ACME ", "date": "2024-01-01", "total": "10.00"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["isDuplicate"], true);
        assert_eq!(body["row"], 2);
        assert_eq!(body["existingReceipt"]["merchant"], "Acme");
        assert_eq!(body["existingReceipt"]["date"], "2024-01-01");
        assert_eq!(body["existingReceipt"]["total"], "10.00");
    }

    #[actix_web::test]
    async fn test_force_appends() {
        let app = test::init_service(App::new().app_data(memory_writer()).configure(configure)).await;

        let mut forced = acme();
        forced["force"] = json!(true);
        for expected_row in [2, 3] {
            let req = test::TestRequest::post().uri("/").set_json(&forced).to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["success"], true);
            assert_eq!(body["row"], expected_row);
        }
    }

    #[actix_web::test]
    async fn test_malformed_body_is_bad_request() {
        let app = test::init_service(App::new().app_data(memory_writer()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"merchantName\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("parse error"));
    }

    #[actix_web::test]
    async fn test_storage_failure_is_server_error() {
        let data = writer_over(Arc::new(FailingStore::broken()));
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;

        let req = test::TestRequest::post().uri("/receipts").set_json(acme()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn test_body_limit() {
        let app = test::init_service(
            App::new()
                .app_data(memory_writer())
                .app_data(web::PayloadConfig::new(64))
                .configure(configure),
        )
        .await;

        let padded = json!({"merchantName": "x".repeat(200)});
        let req = test::TestRequest::post().uri("/").set_json(padded).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
