pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::extraction::handlers as extraction;
use crate::pipeline::handlers as pipeline;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless extraction API
        .route("/api/v1/catalogue", get(extraction::handle_catalogue))
        .route("/api/v1/extract", post(extraction::handle_extract))
        .route("/api/v1/metrics", post(extraction::handle_metrics))
        // Processing API
        .route(
            "/api/v1/resumes/:userid/process",
            post(pipeline::handle_process_user),
        )
        .route("/api/v1/resumes/batch", post(pipeline::handle_process_batch))
        // Maintenance
        .route(
            "/api/v1/maintenance/locations/fix",
            post(pipeline::handle_fix_locations),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::extraction::catalogue::default_catalogue;
    use crate::extraction::fields::FieldValue;
    use crate::extraction::merge::MergePolicy;
    use crate::pipeline::tests::{CannedCompletion, CANNED_RESPONSE};
    use crate::pipeline::{ProcessorSettings, ResumeProcessor};
    use crate::records::memory::MemoryRecordStore;
    use crate::records::RecordStore;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/test".into(),
            anthropic_api_key: "test-key".into(),
            llm_model: "test-model".into(),
            port: 0,
            rust_log: "debug".into(),
            batch_size: 10,
            max_workers: 2,
            update_max_retries: 0,
            max_resume_chars: 1_000,
            merge_policy: MergePolicy::PreferComputed,
        }
    }

    fn app(store: Arc<MemoryRecordStore>) -> Router {
        let config = test_config();
        let processor = ResumeProcessor::new(
            Arc::new(CannedCompletion::new(CANNED_RESPONSE)),
            store,
            default_catalogue(),
            config.processor_settings(),
        );
        build_router(AppState {
            processor: Arc::new(processor),
            catalogue: default_catalogue(),
            config,
        })
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(Arc::default()), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["merge_policy"], "prefer_computed");
    }

    #[tokio::test]
    async fn test_extract_endpoint() {
        let (status, body) = send(
            app(Arc::default()),
            "POST",
            "/api/v1/extract",
            Some(json!({
                "response_text": "- Their Email: jane@example.com\n- Bachelors: NULL\n- Top 10 Technical Skills: Go, Rust"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fields"]["Email"], "jane@example.com");
        assert_eq!(body["fields"]["Bachelors"], "NULL");
        assert_eq!(body["fields"]["FirstName"], "NULL");
        assert_eq!(body["fields"]["Skill2"], "Rust");
        assert_eq!(body["fields"]["Skill3"], "NULL");
        assert_eq!(body["coverage"]["filled_fields"], 4);
    }

    #[tokio::test]
    async fn test_extract_rejects_empty_text() {
        let (status, body) = send(
            app(Arc::default()),
            "POST",
            "/api/v1/extract",
            Some(json!({ "response_text": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (status, body) = send(
            app(Arc::default()),
            "POST",
            "/api/v1/metrics",
            Some(json!({
                "reference_date": "2024-01-01",
                "jobs": [
                    { "company": "Acme", "start": "Jan 2020", "end": "Present", "location": "Austin, TX" },
                    { "company": "Globex", "start": "Jan 2018", "end": "Jan 2020", "location": "Paris, France" },
                    { "company": "NULL", "start": "2010", "end": "2012" }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_experience"], 6.0);
        assert_eq!(body["avg_tenure"], 3.0);
        assert_eq!(body["us_experience"], 4.0);
        assert_eq!(body["job_metrics"].as_array().unwrap().len(), 2);
        assert_eq!(body["job_metrics"][0]["is_current"], true);
    }

    #[tokio::test]
    async fn test_catalogue_endpoint() {
        let (status, body) = send(app(Arc::default()), "GET", "/api/v1/catalogue", None).await;
        assert_eq!(status, StatusCode::OK);
        let fields = body.as_array().unwrap();
        assert_eq!(fields.len(), 80);
        assert_eq!(fields[0]["name"], "FirstName");
        assert_eq!(fields[0]["group"], "personal_information");
        assert!(fields[0]["rule_count"].as_u64().unwrap() > 0);
        let skill = fields.iter().find(|f| f["name"] == "Skill1").unwrap();
        assert_eq!(skill["rule_count"], 0);
        assert_eq!(skill["label"], Value::Null);
    }

    #[tokio::test]
    async fn test_process_user_endpoint() {
        let store = Arc::new(MemoryRecordStore::new());
        store.insert_resume(42, "Jane Doe, Acme 2020 - Present");

        let (status, body) = send(
            app(store.clone()),
            "POST",
            "/api/v1/resumes/42/process",
            Some(json!({ "reference_date": "2024-01-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userid"], 42);
        assert_eq!(body["metrics"]["total_experience"], 8.0);
        assert_eq!(
            store.record(42).unwrap().value("YearsofExperience"),
            &FieldValue::Present("8.0".into())
        );

        let (status, body) = send(app(store), "POST", "/api/v1/resumes/7/process", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_batch_and_location_fix_endpoints() {
        let store = Arc::new(MemoryRecordStore::new());
        store.insert_resume(1, "resume one");
        store.insert_resume(2, "resume two");

        let (status, body) = send(app(store.clone()), "POST", "/api/v1/resumes/batch", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["attempted"], 2);
        assert_eq!(body["succeeded"], json!([1, 2]));

        store
            .update_column(1, "MostRecentLocation", &FieldValue::from_raw("Austin, NULL"))
            .await
            .unwrap();
        let (status, body) = send(
            app(store.clone()),
            "POST",
            "/api/v1/maintenance/locations/fix",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fixes"].as_array().unwrap().len(), 1);
        assert_eq!(body["fixes"][0]["after"], "Austin");
    }

    #[test]
    fn test_settings_from_config() {
        let settings: ProcessorSettings = test_config().processor_settings();
        assert_eq!(settings.max_workers, 2);
        assert_eq!(settings.update_max_retries, 0);
        assert_eq!(settings.max_resume_chars, 1_000);
    }
}
