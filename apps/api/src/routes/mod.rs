pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;

use crate::analysis::handlers as analysis;
use crate::errors::AppError;
use crate::history::handlers as history;
use crate::journey::handlers as journey;
use crate::questionnaire::handlers as questionnaire;
use crate::state::AppState;

/// `?confirm=true` guard for destructive endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

impl ConfirmQuery {
    pub fn require(&self, action: &str) -> Result<(), AppError> {
        if self.confirm {
            Ok(())
        } else {
            Err(AppError::ConfirmationRequired(format!(
                "{action} cannot be undone; repeat the request with confirm=true"
            )))
        }
    }
}

/// Allowance for multipart boundaries and the small form fields sent with an image.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;
    let analysis_limit = upload_limit.saturating_add(MULTIPART_OVERHEAD_BYTES);
    // base64 inflates images by a third, plus the JSON around them
    let journey_limit = upload_limit.saturating_mul(2);

    Router::new()
        .route("/health", get(health::health_handler))
        // Questionnaire
        .route(
            "/api/v1/questionnaire/options",
            get(questionnaire::handle_options),
        )
        .route(
            "/api/v1/questionnaire/transition",
            post(questionnaire::handle_transition),
        )
        .route(
            "/api/v1/questionnaire/recommend",
            post(questionnaire::handle_recommend),
        )
        // AI analysis
        .route(
            "/api/v1/analysis",
            post(analysis::handle_analyze).layer(DefaultBodyLimit::max(analysis_limit)),
        )
        .route(
            "/api/v1/recommendations",
            post(analysis::handle_recommendations),
        )
        // Local history
        .route(
            "/api/v1/history",
            get(history::handle_list_history).delete(history::handle_clear_history),
        )
        .route(
            "/api/v1/history/:id",
            delete(history::handle_delete_history_entry),
        )
        // Journey (authenticated)
        .route(
            "/api/v1/journey",
            get(journey::handle_list_journey)
                .post(journey::handle_create_journey_entry)
                .layer(DefaultBodyLimit::max(journey_limit)),
        )
        .route(
            "/api/v1/journey/:id",
            delete(journey::handle_delete_journey_entry),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::analysis::advisor::stub::StubAdvisor;
    use crate::analysis::advisor::{ANALYSIS_FAILED, RECOMMENDATIONS_FAILED};
    use crate::auth::stub::StubIdentity;
    use crate::auth::AuthUser;
    use crate::config::Config;
    use crate::history::HistoryStore;

    const BOUNDARY: &str = "aura-test-boundary";
    const TOKEN: &str = "valid-token";

    struct Harness {
        router: Router,
        advisor: Arc<StubAdvisor>,
        _dir: tempfile::TempDir,
    }

    async fn harness(advisor: StubAdvisor) -> Harness {
        harness_with_upload_limit(advisor, None).await
    }

    async fn harness_with_upload_limit(advisor: StubAdvisor, limit: Option<usize>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::for_tests(dir.path().to_path_buf());
        if let Some(limit) = limit {
            config.max_upload_bytes = limit;
        }
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let history = Arc::new(HistoryStore::open(dir.path()).await.unwrap());
        let advisor = Arc::new(advisor);
        let state = AppState {
            db,
            advisor: advisor.clone(),
            identity: Arc::new(StubIdentity {
                token: TOKEN,
                user: AuthUser {
                    id: Uuid::new_v4(),
                    email: None,
                },
            }),
            history,
            config,
        };
        Harness {
            router: build_router(state),
            advisor,
            _dir: dir,
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> Response {
        router.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    /// (name, optional (filename, content type), value)
    fn multipart_request(fields: &[(&str, Option<(&str, &str)>, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file, value) in fields {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file {
                Some((filename, content_type)) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(value);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/analysis")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    const JPEG: &[u8] = b"\xff\xd8\xff\xe0fakejpeg";

    #[tokio::test]
    async fn test_health() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(&h.router, empty_request(Method::GET, "/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["history_entries"], 0);
    }

    #[tokio::test]
    async fn test_questionnaire_transition_from_default_state() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(
            &h.router,
            json_request(
                Method::POST,
                "/api/v1/questionnaire/transition",
                json!({"event": {"event": "select_skin_type", "skin_type": "oily"}}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["state"]["state"], "collecting_concerns");
        assert_eq!(body["step"], 2);
        assert_eq!(body["progress_percent"], 50);
        assert!(body.get("recommendation").is_none());
    }

    #[tokio::test]
    async fn test_questionnaire_final_step_returns_recommendation() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(
            &h.router,
            json_request(
                Method::POST,
                "/api/v1/questionnaire/transition",
                json!({
                    "state": {
                        "state": "collecting_routine",
                        "skin_type": "dry",
                        "concerns": ["aging", "acne"],
                        "age_bracket": "26-35"
                    },
                    "event": {"event": "select_routine", "routine_level": "basic"}
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["state"]["state"], "showing_results");
        let products = body["recommendation"]["products"].as_array().unwrap();
        assert_eq!(products.len(), 8);
        assert_eq!(products[3], "BHA Exfoliant");
        assert_eq!(products[5], "Retinol Serum");
    }

    #[tokio::test]
    async fn test_questionnaire_empty_concerns_rejected() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(
            &h.router,
            json_request(
                Method::POST,
                "/api/v1/questionnaire/transition",
                json!({
                    "state": {"state": "collecting_concerns", "skin_type": "dry", "concerns": []},
                    "event": {"event": "continue"}
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_questionnaire_out_of_order_event_is_422() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(
            &h.router,
            json_request(
                Method::POST,
                "/api/v1/questionnaire/transition",
                json!({"event": {"event": "continue"}}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_questionnaire_recommend_direct() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(
            &h.router,
            json_request(
                Method::POST,
                "/api/v1/questionnaire/recommend",
                json!({
                    "skin_type": "sensitive",
                    "concerns": [],
                    "age_bracket": "46+",
                    "routine_level": "none"
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body["products"],
            json!(["Gentle Cleanser", "Fragrance-Free Moisturizer", "Soothing Serum"])
        );
    }

    #[tokio::test]
    async fn test_questionnaire_options_lists_labels() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(
            &h.router,
            empty_request(Method::GET, "/api/v1/questionnaire/options"),
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(body["concerns"][2]["id"], "dark-spots");
        assert_eq!(body["concerns"][2]["label"], "Dark Spots");
        assert_eq!(
            body["routine_levels"][0]["description"],
            "Just cleanser and moisturizer"
        );
    }

    #[tokio::test]
    async fn test_analysis_without_image_is_validation_error() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(&h.router, multipart_request(&[("latitude", None, b"10.5")])).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Please upload an image first.");
        assert_eq!(h.advisor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_analysis_rejects_non_image_upload() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(
            &h.router,
            multipart_request(&[("image", Some(("notes.txt", "text/plain")), b"hello")]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analysis_forwards_coordinates() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(
            &h.router,
            multipart_request(&[
                ("image", Some(("selfie.jpg", "image/jpeg")), JPEG),
                ("latitude", None, b"40.7128"),
                ("longitude", None, b"-74.006"),
            ]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["result"]["skinType"], "Combination");
        assert!(body.get("location_notice").is_none());

        let location = h.advisor.last_location.lock().unwrap().unwrap();
        assert_eq!(location.latitude, 40.7128);
        assert_eq!(location.longitude, -74.006);
        assert_eq!(
            h.advisor.last_mime.lock().unwrap().as_deref(),
            Some("image/jpeg")
        );
    }

    #[tokio::test]
    async fn test_analysis_location_failure_is_advisory() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(
            &h.router,
            multipart_request(&[
                ("image", Some(("selfie.png", "image/png")), JPEG),
                ("location_error", None, b"permission_denied"),
            ]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body["location_notice"],
            "Note: Location access denied. Please enable it in your browser settings. Providing general environmental advice."
        );
        assert!(h.advisor.last_location.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_analysis_failure_is_generic_bad_gateway() {
        let h = harness(StubAdvisor::failing()).await;
        let response = send(
            &h.router,
            multipart_request(&[("image", Some(("selfie.jpg", "image/jpeg")), JPEG)]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], ANALYSIS_FAILED);
        assert_eq!(h.advisor.calls.load(Ordering::SeqCst), 1);
    }

    fn analysis_body() -> Value {
        json!({
            "skinType": "Oily",
            "concerns": ["Acne"],
            "environmentalAdvice": "Humid today."
        })
    }

    #[tokio::test]
    async fn test_recommendations_are_recorded_in_history() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(
            &h.router,
            json_request(Method::POST, "/api/v1/recommendations", analysis_body()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["recommendations"]["serum"]["name"], "Niacinamide 10% Serum");
        let id = body["history_entry_id"].as_str().unwrap().to_string();

        let history = body_json(send(&h.router, empty_request(Method::GET, "/api/v1/history")).await).await;
        let entries = history.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["id"], id.as_str());
        assert_eq!(entries[0]["analysisResult"]["skinType"], "Oily");
    }

    #[tokio::test]
    async fn test_recommendation_failure_records_nothing() {
        let h = harness(StubAdvisor::failing()).await;
        let response = send(
            &h.router,
            json_request(Method::POST, "/api/v1/recommendations", analysis_body()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], RECOMMENDATIONS_FAILED);

        let history = body_json(send(&h.router, empty_request(Method::GET, "/api/v1/history")).await).await;
        assert!(history.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_history_requires_confirmation() {
        let h = harness(StubAdvisor::default()).await;
        send(
            &h.router,
            json_request(Method::POST, "/api/v1/recommendations", analysis_body()),
        )
        .await;

        let response = send(&h.router, empty_request(Method::DELETE, "/api/v1/history")).await;
        assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);
        let history = body_json(send(&h.router, empty_request(Method::GET, "/api/v1/history")).await).await;
        assert_eq!(history.as_array().unwrap().len(), 1);

        let response = send(
            &h.router,
            empty_request(Method::DELETE, "/api/v1/history?confirm=true"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let history = body_json(send(&h.router, empty_request(Method::GET, "/api/v1/history")).await).await;
        assert!(history.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_history_entry_is_no_content() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(
            &h.router,
            empty_request(Method::DELETE, "/api/v1/history/rec_0_doesnotex"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_journey_requires_bearer_token() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(&h.router, empty_request(Method::GET, "/api/v1/journey")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .uri("/api/v1/journey")
            .header(header::AUTHORIZATION, "Bearer wrong-token")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&h.router, request).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_journey_delete_requires_confirmation() {
        let h = harness(StubAdvisor::default()).await;
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/v1/journey/{}", Uuid::new_v4()))
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .body(Body::empty())
            .unwrap();
        let response = send(&h.router, request).await;
        assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);
    }

    #[tokio::test]
    async fn test_journey_create_rejects_bad_image_before_touching_db() {
        let h = harness(StubAdvisor::default()).await;
        let mut request = json_request(
            Method::POST,
            "/api/v1/journey",
            json!({
                "image_data": "%%%",
                "analysis_result": analysis_body()
            }),
        );
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {TOKEN}").parse().unwrap(),
        );
        let response = send(&h.router, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analysis_ignores_partial_coordinates() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(
            &h.router,
            multipart_request(&[
                ("image", Some(("selfie.jpg", "image/jpeg")), JPEG),
                ("latitude", None, b"40.7128"),
            ]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(h.advisor.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*h.advisor.last_location.lock().unwrap(), None);
    }

    #[tokio::test]
    async fn test_analysis_forwards_zero_coordinates() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(
            &h.router,
            multipart_request(&[
                ("image", Some(("selfie.jpg", "image/jpeg")), JPEG),
                ("latitude", None, b"0"),
                ("longitude", None, b"0"),
            ]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let location = h.advisor.last_location.lock().unwrap().unwrap();
        assert_eq!(location.latitude, 0.0);
        assert_eq!(location.longitude, 0.0);
    }

    #[tokio::test]
    async fn test_analysis_bad_coordinates_fall_back_to_general_advice() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(
            &h.router,
            multipart_request(&[
                ("image", Some(("selfie.jpg", "image/jpeg")), JPEG),
                ("latitude", None, b"123.0"),
                ("longitude", None, b"north"),
            ]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*h.advisor.last_location.lock().unwrap(), None);

        let response = send(
            &h.router,
            multipart_request(&[
                ("image", Some(("selfie.jpg", "image/jpeg")), JPEG),
                ("latitude", None, b"95.0"),
                ("longitude", None, b"10.0"),
            ]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*h.advisor.last_location.lock().unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_image_reported_before_coordinate_problems() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(
            &h.router,
            multipart_request(&[("latitude", None, b"95.0"), ("longitude", None, b"500")]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Please upload an image first.");
    }

    #[tokio::test]
    async fn test_analysis_accepts_image_at_upload_limit() {
        let limit = 4 * 1024;
        let h = harness_with_upload_limit(StubAdvisor::default(), Some(limit)).await;
        let image = vec![0xffu8; limit];
        let response = send(
            &h.router,
            multipart_request(&[("image", Some(("selfie.jpg", "image/jpeg")), image.as_slice())]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_analysis_rejects_oversized_image() {
        let limit = 4 * 1024;
        let h = harness_with_upload_limit(StubAdvisor::default(), Some(limit)).await;
        let image = vec![0xffu8; limit + MULTIPART_OVERHEAD_BYTES + 1];
        let response = send(
            &h.router,
            multipart_request(&[("image", Some(("selfie.jpg", "image/jpeg")), image.as_slice())]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(h.advisor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_huge_upload_limit_does_not_overflow() {
        let h = harness_with_upload_limit(StubAdvisor::default(), Some(usize::MAX)).await;
        let response = send(&h.router, empty_request(Method::GET, "/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_confirm_flag_uses_error_body() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(
            &h.router,
            empty_request(Method::DELETE, "/api/v1/history?confirm=yes"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_body() {
        let h = harness(StubAdvisor::default()).await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/questionnaire/recommend")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = send(&h.router, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_answer_value_is_422_with_error_body() {
        let h = harness(StubAdvisor::default()).await;
        let response = send(
            &h.router,
            json_request(
                Method::POST,
                "/api/v1/questionnaire/recommend",
                json!({
                    "skin_type": "normal",
                    "concerns": [],
                    "age_bracket": "18-25",
                    "routine_level": "basic"
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    }

    #[tokio::test]
    async fn test_journey_bad_id_uses_error_body() {
        let h = harness(StubAdvisor::default()).await;
        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/api/v1/journey/not-a-uuid?confirm=true")
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .body(Body::empty())
            .unwrap();
        let response = send(&h.router, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
