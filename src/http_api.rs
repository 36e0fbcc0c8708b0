//! HTTP surface over the shared state.

use std::path::Path;
use std::sync::Arc;

use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::services::ServeFile;
use tracing::info;

use crate::shared_state::SharedStateStore;
use crate::smoother::SmoothedState;

/// `GET /power` returns the current snapshot, every other path serves the dashboard
/// page.
pub fn router(store: Arc<SharedStateStore>, page: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/power", get(get_power))
        .fallback_service(ServeFile::new(page))
        .with_state(store)
}

/// Serves until the process exits.
pub async fn serve(
    listener: TcpListener,
    store: Arc<SharedStateStore>,
    page: impl AsRef<Path>,
) -> std::io::Result<()> {
    info!("Serving HTTP on {}", listener.local_addr()?);
    axum::serve(listener, router(store, page)).await
}

async fn get_power(State(store): State<Arc<SharedStateStore>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        power_body(&store.snapshot()),
    )
}

/// Always a well-formed body; an unreachable meter simply reads as zeros.
pub fn power_body(state: &SmoothedState) -> String {
    format!(
        "{{\"watts\": {:.0}, \"volts\": {:.2}, \"frequency\": {:.4}}}\n",
        state.watts_ewma, state.volts, state.frequency_hz
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meter_session::Reading;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    async fn request(app: Router, method: Method, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_power_body_format() {
        let state = SmoothedState {
            watts_ewma: 1523.6,
            volts: 229.876,
            frequency_hz: 50.01234,
            initialized: true,
        };
        assert_eq!(
            power_body(&state),
            "{\"watts\": 1524, \"volts\": 229.88, \"frequency\": 50.0123}\n"
        );
    }

    #[test]
    fn test_power_body_is_json() {
        let state = SmoothedState {
            watts_ewma: -250.4,
            volts: 231.0,
            frequency_hz: 49.95,
            initialized: true,
        };
        let parsed: serde_json::Value = serde_json::from_str(&power_body(&state)).unwrap();
        assert_eq!(parsed["watts"], -250);
        assert_eq!(parsed["volts"], 231.0);
        assert_eq!(parsed["frequency"], 49.95);
    }

    #[tokio::test]
    async fn test_get_power_before_any_reading() {
        let store = Arc::new(SharedStateStore::new());
        let (status, body) = request(router(store, "missing.html"), Method::GET, "/power").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            "{\"watts\": 0, \"volts\": 0.00, \"frequency\": 0.0000}\n"
        );
    }

    #[tokio::test]
    async fn test_get_power_steady_state() {
        let store = Arc::new(SharedStateStore::new());
        for _ in 0..100 {
            store.publish(Reading::new(1000.0, 230.0, 50.0));
        }
        let (status, body) = request(router(store, "missing.html"), Method::GET, "/power").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            "{\"watts\": 1000, \"volts\": 230.00, \"frequency\": 50.0000}\n"
        );
    }

    #[tokio::test]
    async fn test_get_power_content_type() {
        let store = Arc::new(SharedStateStore::new());
        let response = router(store, "missing.html")
            .oneshot(Request::get("/power").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_post_power_not_allowed() {
        let store = Arc::new(SharedStateStore::new());
        let (status, _) = request(router(store, "missing.html"), Method::POST, "/power").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_serves_page_at_root() {
        let page =
            std::env::temp_dir().join(format!("powermon-test-{}.html", std::process::id()));
        std::fs::write(&page, "<html>power</html>").unwrap();

        let store = Arc::new(SharedStateStore::new());
        let (status, body) = request(router(store, &page), Method::GET, "/").await;
        std::fs::remove_file(&page).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<html>power</html>");
    }

    #[tokio::test]
    async fn test_serves_page_for_any_other_path() {
        let page = std::env::temp_dir().join(format!(
            "powermon-test-fallback-{}.html",
            std::process::id()
        ));
        std::fs::write(&page, "<html>dashboard</html>").unwrap();

        let store = Arc::new(SharedStateStore::new());
        let (status, body) =
            request(router(store.clone(), &page), Method::GET, "/index.html").await;
        let (nested_status, nested_body) =
            request(router(store, &page), Method::GET, "/some/deeper/path").await;
        std::fs::remove_file(&page).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<html>dashboard</html>");
        assert_eq!(nested_status, StatusCode::OK);
        assert_eq!(nested_body, "<html>dashboard</html>");
    }

    #[tokio::test]
    async fn test_missing_page_is_not_found() {
        let store = Arc::new(SharedStateStore::new());
        let (status, _) = request(
            router(store, "definitely-not-here.html"),
            Method::GET,
            "/",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
