use axum::{http::header, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::watch;
use crate::error::Result;
use crate::observability::metrics;

pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(scrape_metrics))
}

async fn health_check() -> &'static str {
    "OK"
}

async fn scrape_metrics() -> ([(header::HeaderName, &'static str); 1], String) {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}

/// Serves the router on `listen` until `shutdown` flips to true.
pub async fn serve(listen: &str, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    let listener = TcpListener::bind(listen).await?;
    tracing::info!(listen, "Serving metrics");

    axum::serve(listener, create_router())
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn get_body(uri: &str) -> (StatusCode, String) {
        let response = create_router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_metrics_are_scrapeable() {
        let _ = metrics::register_metrics();
        metrics::TICKS_SKIPPED.inc();

        let (status, body) = get_body("/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("oracle_ticks_skipped_total"));
        assert!(body.contains("oracle_submission_attempts_total"));
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, body) = get_body("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_stops_on_shutdown() {
        let (tx, rx) = watch::channel(false);
        let server = tokio::spawn(async move { serve("127.0.0.1:0", rx).await });
        tx.send(true).unwrap();
        assert!(server.await.unwrap().is_ok());
    }
}
