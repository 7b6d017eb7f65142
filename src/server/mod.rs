//! HTTP surface for the lead backend.
//!
//! - `GET /health`, `GET /ping`
//! - `POST /summarize`: lead JSON in, estimate markup out
//! - `POST /save_user_data`: persist the lead and notify sales
//! - `POST /upload_cv`: multipart `file` (PDF) plus optional `state_json`
//!
//! Every response is JSON with an `ok` flag.

pub mod types;

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, warn};

use crate::backend::LeadSnapshot;
use crate::config::CorsPolicy;
use crate::error::UploadError;
use crate::service::LeadService;
use crate::uploads::{CvFile, MAX_CV_BYTES};

use self::types::{ErrorBody, HealthBody, PingBody, SaveBody, SummaryBody, UploadBody};

/// Request bodies above this are cut off before reaching a handler. Leaves
/// room for multipart framing around a maximum-size CV.
const BODY_LIMIT: usize = MAX_CV_BYTES + 1024 * 1024;

/// Shared state for the lead routes.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LeadService>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

/// GET /health
async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        ok: true,
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// GET /ping
async fn ping() -> Json<PingBody> {
    Json(PingBody { ok: true, pong: true })
}

/// POST /summarize
///
/// An unreadable or empty body is a 400.
async fn summarize(
    State(state): State<AppState>,
    payload: Result<Json<LeadSnapshot>, JsonRejection>,
) -> Response {
    let lead = match payload {
        Ok(Json(lead)) if lead != LeadSnapshot::default() => lead,
        _ => return error_response(StatusCode::BAD_REQUEST, "No data received"),
    };
    Json(SummaryBody {
        ok: true,
        summary: state.service.summary(&lead),
    })
    .into_response()
}

/// POST /save_user_data
///
/// Missing or malformed JSON is saved as an empty lead.
async fn save_user_data(
    State(state): State<AppState>,
    payload: Result<Json<LeadSnapshot>, JsonRejection>,
) -> Json<SaveBody> {
    let lead = match payload {
        Ok(Json(lead)) => lead,
        Err(e) => {
            warn!("save_user_data: unreadable body, saving empty lead: {}", e);
            LeadSnapshot::default()
        }
    };
    let outcome = state.service.save_lead(&lead).await;
    Json(SaveBody {
        ok: true,
        message: "User data processed".to_string(),
        db_saved: outcome.db_saved,
        email_sent: outcome.email_sent,
        email_error: outcome.email_error,
    })
}

fn multipart_error(e: MultipartError) -> Response {
    let status = e.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return error_response(status, UploadError::TooLarge { size: BODY_LIMIT }.to_string());
    }
    error_response(status, e.body_text())
}

/// POST /upload_cv
async fn upload_cv(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut file: Option<CvFile> = None;
    let mut lead = LeadSnapshot::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return multipart_error(e),
        };
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => file = Some(CvFile::new(filename, bytes.to_vec())),
                    Err(e) => return multipart_error(e),
                }
            }
            Some("state_json") => match field.text().await {
                Ok(text) => lead = serde_json::from_str(&text).unwrap_or_default(),
                Err(e) => return multipart_error(e),
            },
            _ => {}
        }
    }

    let Some(file) = file.filter(|f| !f.filename.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, UploadError::NoFile.to_string());
    };

    match state.service.upload_cv(file, &lead).await {
        Ok(outcome) => Json(UploadBody {
            ok: true,
            filename: outcome.filename,
            db_saved: outcome.db_saved,
            email_sent: outcome.email_sent,
            email_error: outcome.email_error,
        })
        .into_response(),
        Err(e @ UploadError::TooLarge { .. }) => {
            error_response(StatusCode::PAYLOAD_TOO_LARGE, e.to_string())
        }
        Err(e @ UploadError::Io(_)) => {
            error!("upload_cv: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

/// Build the lead routes.
pub fn lead_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ping", get(ping))
        .route("/summarize", post(summarize))
        .route("/save_user_data", post(save_user_data))
        .route("/upload_cv", post(upload_cv))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}

/// Translate the configured policy into a CORS layer, if any.
pub fn cors_layer(policy: &CorsPolicy) -> Option<CorsLayer> {
    let origin = match policy {
        CorsPolicy::Disabled => return None,
        CorsPolicy::Any => AllowOrigin::any(),
        CorsPolicy::Origins(origins) => {
            let values: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match HeaderValue::from_str(o) {
                    Ok(v) => Some(v),
                    Err(e) => {
                        warn!(origin = %o, "Ignoring invalid CORS origin: {}", e);
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        }
    };
    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

/// Lead routes with the configured CORS policy applied.
pub fn build_router(state: AppState, cors: &CorsPolicy) -> Router {
    let router = lead_routes(state);
    match cors_layer(cors) {
        Some(layer) => router.layer(layer),
        None => router,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::config::ContactConfig;
    use crate::notify::DisabledNotifier;
    use crate::store::{LeadStore, LibSqlLeadStore};
    use crate::uploads::CvStorage;

    struct TestApp {
        router: Router,
        store: Arc<LibSqlLeadStore>,
        _dir: tempfile::TempDir,
    }

    async fn app() -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LibSqlLeadStore::new_memory().await.unwrap());
        let service = LeadService::new(
            store.clone(),
            Arc::new(DisabledNotifier),
            CvStorage::new(dir.path()),
            ContactConfig::default(),
        );
        TestApp {
            router: lead_routes(AppState {
                service: Arc::new(service),
            }),
            store,
            _dir: dir,
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_post(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_post(filename: Option<&str>, content: &[u8], state_json: Option<&str>) -> Request<Body> {
        let boundary = "leadbot-test-boundary";
        let mut body = Vec::new();
        if let Some(filename) = filename {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        if let Some(state) = state_json {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"state_json\"\r\n\r\n{state}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        Request::post("/upload_cv")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_and_ping() {
        let app = app().await;
        let response = app
            .router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["ok"], true);
        assert_eq!(json["status"], "healthy");

        let response = app
            .router
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await["pong"], true);
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let app = app().await;
        let response = app
            .router
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "Not found");
    }

    #[tokio::test]
    async fn summarize_renders_estimate() {
        let app = app().await;
        let response = app
            .router
            .oneshot(json_post(
                "/summarize",
                r#"{"category":"Web Development","budget":"Custom","budget_amount":100000}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["ok"], true);
        let summary = json["summary"].as_str().unwrap();
        assert!(summary.contains("₹50,000"));
        assert!(summary.contains("indicative"));
    }

    #[tokio::test]
    async fn summarize_without_data_is_400() {
        for body in ["", "{}", "not json"] {
            let app = app().await;
            let response = app.router.oneshot(json_post("/summarize", body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(response).await["error"], "No data received");
        }
    }

    #[tokio::test]
    async fn save_user_data_reports_outcome() {
        let app = app().await;
        let response = app
            .router
            .oneshot(json_post(
                "/save_user_data",
                r#"{"name":"Ann","company_name":"Acme","category":"SEO","employee_size":"0-10"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["ok"], true);
        assert_eq!(json["db_saved"], true);
        assert_eq!(json["email_sent"], false);
        assert!(!json["email_error"].as_str().unwrap().is_empty());

        let leads = app.store.recent_leads(5).await.unwrap();
        assert_eq!(leads[0].lead.name.as_deref(), Some("Ann"));
    }

    #[tokio::test]
    async fn upload_cv_stores_file() {
        let app = app().await;
        let response = app
            .router
            .oneshot(multipart_post(
                Some("cv.pdf"),
                b"%PDF-1.4 test",
                Some(r#"{"name":"Ann","email":"ann@acme.com"}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["ok"], true);
        assert!(json["filename"].as_str().unwrap().ends_with("_cv.pdf"));

        let apps = app.store.recent_applications(5).await.unwrap();
        assert_eq!(apps[0].lead.name.as_deref(), Some("Ann"));
    }

    #[tokio::test]
    async fn upload_cv_rejections() {
        let app = app().await;
        let response = app
            .router
            .clone()
            .oneshot(multipart_post(None, b"", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "No file selected");

        let response = app
            .router
            .clone()
            .oneshot(multipart_post(Some("cv.docx"), b"data", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Only PDF files allowed");

        let big = vec![b'a'; MAX_CV_BYTES + 1];
        let response = app
            .router
            .oneshot(multipart_post(Some("cv.pdf"), &big, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(response).await["error"], "File size exceeds 5 MB");
    }

    #[test]
    fn cors_policy_to_layer() {
        assert!(cors_layer(&CorsPolicy::Disabled).is_none());
        assert!(cors_layer(&CorsPolicy::Any).is_some());
        assert!(cors_layer(&CorsPolicy::Origins(vec!["https://a.example".into()])).is_some());
    }
}
