use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, AUTHORIZATION,
};
use hyper::{Body, Method, Request, Response, StatusCode};
use log::debug;
use std::convert::Infallible;
use std::sync::Arc;

pub mod _404;
pub mod api_error;
pub mod health;
pub mod history;
pub mod index;
pub mod latest;
pub mod range;
pub mod response_body;
pub mod summary;

pub use api_error::ApiError;
pub use response_body::{error_response, json_response, ResponseBody};

use crate::auth::{self, AuthError};
use crate::config::Settings;
use crate::health::{HealthReporter, HostProbe};
use crate::persistence::SensorStore;
use crate::query::QueryService;

pub const ROUTES: &[&str] = &["/", "/latest", "/history", "/range", "/summary", "/health"];

/// What every request handler may use. Holds no connection: storage is
/// opened per operation by the query service.
pub struct ApiContext {
    pub api_token: String,
    pub api_title: String,
    pub queries: QueryService,
    pub health: HealthReporter,
}

impl ApiContext {
    pub fn new(settings: &Settings, store: SensorStore, probe: Arc<dyn HostProbe>) -> Self {
        ApiContext {
            api_token: settings.api_token.clone(),
            api_title: settings.api_title.clone(),
            queries: QueryService::new(store),
            health: HealthReporter::new(probe),
        }
    }
}

pub async fn req_handler(
    req: Request<Body>,
    ctx: Arc<ApiContext>,
) -> Result<Response<Body>, Infallible> {
    // no route reads a body
    let (parts, _body) = req.into_parts();
    let req = Request::from_parts(parts, ());

    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let mut response = match dispatch(&req, &ctx).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    };

    allow_any_origin(&mut response);

    debug!("{} {} -> {}", method, path, response.status().as_u16());

    Ok(response)
}

async fn dispatch(req: &Request<()>, ctx: &ApiContext) -> Result<Response<Body>, ApiError> {
    match (req.method(), req.uri().path()) {
        (&Method::OPTIONS, _) => Ok(preflight()),
        (&Method::GET, "/") => index::index(req, ctx),
        (&Method::GET, "/latest") => latest::latest(req, ctx).await,
        (&Method::GET, "/history") => history::history(req, ctx).await,
        (&Method::GET, "/range") => range::range(req, ctx).await,
        (&Method::GET, "/summary") => summary::summary(req, ctx).await,
        (&Method::GET, "/health") => health::health(req, ctx).await,
        (_, path) if ROUTES.contains(&path) => Err(ApiError::MethodNotAllowed),
        (_, _) => Err(_404::_404()),
    }
}

/// Rejects the request unless it carries the configured bearer token.
/// Runs before any storage or probe work.
fn authenticate(req: &Request<()>, ctx: &ApiContext) -> Result<(), ApiError> {
    let auth_header = match req.headers().get(AUTHORIZATION) {
        Some(h) => Some(h.to_str().map_err(|_| AuthError::Malformed)?),
        None => None,
    };

    auth::token::validate_token(auth_header, &ctx.api_token)?;

    Ok(())
}

fn query_param(req: &Request<()>, name: &str) -> Option<String> {
    let query_str = req.uri().query()?;

    form_urlencoded::parse(query_str.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn required_param(req: &Request<()>, name: &str) -> Result<String, ApiError> {
    query_param(req, name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::Validation(format!("Missing query parameter {}", name)))
}

fn preflight() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;

    let headers = response.headers_mut();
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Authorization, Content-Type"),
    );

    response
}

// the dashboard is served from another port
fn allow_any_origin(response: &mut Response<Body>) {
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::health::tests::FakeProbe;
    use crate::models::Reading;
    use crate::persistence::test_utils::reading;

    const TOKEN: &str = "supersecrettoken";

    struct Harness {
        ctx: Arc<ApiContext>,
        probe: Arc<FakeProbe>,
        db_path: PathBuf,
        _dir: tempfile::TempDir,
    }

    async fn harness(rows: &[Reading], probe: FakeProbe) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("sensor_data.db");
        let store = SensorStore::new(db_path.clone());

        if !rows.is_empty() {
            store.ensure_schema().await.unwrap();
            for row in rows {
                store.append(row).await.unwrap();
            }
        }

        let settings = Settings::from_lookup(|key| match key {
            "API_TOKEN" => Some(TOKEN.to_string()),
            _ => None,
        })
        .unwrap();
        let probe = Arc::new(probe);
        let ctx = Arc::new(ApiContext::new(
            &settings,
            store,
            probe.clone() as Arc<dyn HostProbe>,
        ));

        Harness {
            ctx,
            probe,
            db_path,
            _dir: dir,
        }
    }

    async fn call(
        h: &Harness,
        method: Method,
        uri: &str,
        auth: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header("Authorization", auth);
        }
        let req = builder.body(Body::empty()).unwrap();

        let res = req_handler(req, h.ctx.clone()).await.unwrap();
        let status = res.status();
        let bytes = hyper::body::to_bytes(res.into_body()).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    async fn get(h: &Harness, uri: &str) -> (StatusCode, serde_json::Value) {
        call(h, Method::GET, uri, Some(&format!("Bearer {}", TOKEN))).await
    }

    fn april_rows() -> Vec<Reading> {
        vec![
            reading("2025-04-01 00:00:00", 18.0, 960.0),
            reading("2025-04-02 00:00:00", 20.0, 962.0),
            reading("2025-04-03 00:00:00", 19.0, 961.0),
        ]
    }

    #[tokio::test]
    async fn rejects_before_any_work_test() {
        // no schema yet: any storage access would create the database file
        let h = harness(&[], FakeProbe::healthy()).await;

        let uris = [
            "/",
            "/latest",
            "/history?limit=5",
            "/range?start=2025-04-01&end=2025-04-02",
            "/summary?start=2025-04-01&end=2025-04-02",
            "/health",
        ];
        for uri in uris {
            for auth in [None, Some("Bearer wrong"), Some(TOKEN), Some("Basic YWRtaW46cGFzc3dvcmQ=")] {
                let (status, body) = call(&h, Method::GET, uri, auth).await;
                assert_eq!(status, StatusCode::FORBIDDEN, "{uri} with {auth:?}");
                assert!(body["error"].is_string());
            }
        }

        assert!(!h.db_path.exists());
        assert_eq!(h.probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn latest_test() {
        let h = harness(&april_rows(), FakeProbe::healthy()).await;

        let (status, body) = get(&h, "/latest").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timestamp"], "2025-04-03 00:00:00");
        assert_eq!(body["temperature"], 19.0);
        assert_eq!(body["pressure"], 961.0);
    }

    #[tokio::test]
    async fn latest_on_empty_table_test() {
        let h = harness(&[], FakeProbe::healthy()).await;
        SensorStore::new(h.db_path.clone())
            .ensure_schema()
            .await
            .unwrap();

        let (status, body) = get(&h, "/latest").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No data found");
    }

    #[tokio::test]
    async fn history_test() {
        let h = harness(&april_rows(), FakeProbe::healthy()).await;

        let (status, body) = get(&h, "/history").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (status, body) = get(&h, "/history?limit=2").await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["timestamp"], "2025-04-03 00:00:00");
        assert_eq!(rows[1]["timestamp"], "2025-04-02 00:00:00");

        let (status, _) = get(&h, "/history?limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = get(&h, "/history?limit=lots").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn range_test() {
        let h = harness(&april_rows(), FakeProbe::healthy()).await;

        let (status, body) = get(&h, "/range?start=2025-04-01&end=2025-04-02").await;

        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["timestamp"], "2025-04-01 00:00:00");
        assert_eq!(rows[1]["timestamp"], "2025-04-02 00:00:00");
    }

    #[tokio::test]
    async fn percent_encoded_dates_test() {
        let h = harness(&april_rows(), FakeProbe::healthy()).await;

        let (status, body) = get(&h, "/range?start=2025%2D04%2D01&end=2025-04-02").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, body) = get(&h, "/summary?start=2025%2D04%2D01&end=2025%2D04%2D02").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["temperature"]["avg"].is_number());
    }

    #[tokio::test]
    async fn malformed_dates_test() {
        let h = harness(&[], FakeProbe::healthy()).await;

        for uri in [
            "/range?start=2025-13-40&end=2025-04-02",
            "/range?start=2025-04-01&end=04-09-2025",
            "/range?start=2025-04-01",
            "/summary?start=04-09-2025&end=2025-04-02",
            "/summary?end=2025-04-02",
        ] {
            let (status, body) = get(&h, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].is_string());
        }

        assert!(!h.db_path.exists());
    }

    #[tokio::test]
    async fn summary_test() {
        let h = harness(&april_rows(), FakeProbe::healthy()).await;

        let (status, body) = get(&h, "/summary?start=2025-04-01&end=2025-04-03").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "temperature": {"min": 18.0, "max": 20.0, "avg": 19.0},
                "pressure": {"min": 960.0, "max": 962.0, "avg": 961.0},
            })
        );

        let (status, _) = get(&h, "/summary?start=2025-05-01&end=2025-05-02").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_without_cpu_temp_test() {
        let h = harness(
            &[],
            FakeProbe {
                temp_c: None,
                ..Default::default()
            },
        )
        .await;

        let (status, body) = get(&h, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cpu"]["temp_c"], serde_json::Value::Null);
        assert_eq!(body["cpu"]["percent"], 12.5);
        assert_eq!(body["hostname"], "station01");
        assert_eq!(body["ip"], "192.168.1.23");
        assert_eq!(body["disk"]["total_gb"], 28.0);
        assert_eq!(body["ram"]["total_mb"], 512.0);
        assert!(!h.db_path.exists());
    }

    #[tokio::test]
    async fn health_collection_failure_test() {
        let h = harness(
            &[],
            FakeProbe {
                panics: true,
                ..FakeProbe::healthy()
            },
        )
        .await;

        let (status, body) = get(&h, "/health").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        // the panic message stays in the log
        assert_eq!(body["error"], "Health check failed");
    }

    #[tokio::test]
    async fn routing_test() {
        let h = harness(&[], FakeProbe::healthy()).await;
        let bearer = format!("Bearer {}", TOKEN);

        let (status, body) = get(&h, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Environmental Sensor API");

        let (status, _) = get(&h, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&h, Method::POST, "/latest", Some(&bearer)).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn cors_test() {
        let h = harness(&[], FakeProbe::healthy()).await;

        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/latest")
            .body(Body::empty())
            .unwrap();
        let res = req_handler(req, h.ctx.clone()).await.unwrap();

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(res.headers().contains_key(ACCESS_CONTROL_ALLOW_HEADERS));

        let req = Request::builder()
            .uri("/latest")
            .body(Body::empty())
            .unwrap();
        let res = req_handler(req, h.ctx.clone()).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn query_param_test() {
        let req = Request::builder()
            .uri("/range?start=2025-04-01&end=2025-04-02&flag")
            .body(())
            .unwrap();

        assert_eq!(query_param(&req, "start").as_deref(), Some("2025-04-01"));
        assert_eq!(query_param(&req, "end").as_deref(), Some("2025-04-02"));
        assert_eq!(query_param(&req, "flag").as_deref(), Some(""));
        assert_eq!(query_param(&req, "limit"), None);
        assert!(required_param(&req, "flag").is_err());

        let req = Request::builder()
            .uri("/range?st%61rt=2025%2D04%2D01&end=2025-04-02%20&note=a+b")
            .body(())
            .unwrap();

        assert_eq!(query_param(&req, "start").as_deref(), Some("2025-04-01"));
        assert_eq!(query_param(&req, "end").as_deref(), Some("2025-04-02 "));
        assert_eq!(query_param(&req, "note").as_deref(), Some("a b"));
    }
}
