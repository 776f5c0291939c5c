//! HTTP query surface over the collected disk data

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, TimeZone, Utc};
use hostwatch_core::problem::{bad_request, internal_server_error, Problem};
use serde::Deserialize;
use utoipa::OpenApi;

use crate::collector::DiskMonitor;
use crate::projection::{project, to_timeseries};
use crate::relative::{parse_relative, relative_range};

/// Shared state for the monitoring routes.
pub struct MonitoringState {
    pub monitor: Arc<DiskMonitor>,
}

/// OpenAPI documentation for the monitoring endpoints
#[derive(OpenApi)]
#[openapi(
    paths(live_snapshot, range_query, relative_query, scrape_metrics),
    components(schemas(
        crate::snapshot::Snapshot,
        crate::snapshot::PartitionReading,
        crate::projection::TimeseriesResponse,
    )),
    tags(
        (name = "Disk Monitoring", description = "Disk usage snapshots and time-series queries")
    )
)]
pub struct MonitoringApiDoc;

pub fn configure_routes() -> Router<Arc<MonitoringState>> {
    Router::new()
        .route("/metrics/disk", get(live_snapshot))
        .route("/grafana", get(range_query))
        .route("/grafana/simple", get(relative_query))
        .route("/metrics", get(scrape_metrics))
}

#[derive(Deserialize)]
struct RangeQuery {
    path: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

#[derive(Deserialize)]
struct RelativeQuery {
    path: Option<String>,
    time: Option<String>,
}

/// One bound of the query range: a millisecond epoch integer, truncated
/// to the store's second resolution.
fn parse_epoch_ms(value: Option<&str>, name: &str) -> Result<DateTime<Utc>, Problem> {
    let raw = value
        .ok_or_else(|| bad_request().with_detail(format!("missing '{name}' parameter")))?;
    let millis: i64 = raw.trim().parse().map_err(|_| {
        bad_request().with_detail(format!(
            "invalid '{name}' parameter: expected a millisecond epoch integer"
        ))
    })?;
    Utc.timestamp_opt(millis / 1000, 0)
        .single()
        .ok_or_else(|| bad_request().with_detail(format!("'{name}' is out of range")))
}

/// Collect and return the current disk usage
#[utoipa::path(
    get,
    path = "/metrics/disk",
    responses(
        (status = 200, description = "Fresh snapshot of all partitions", body = crate::snapshot::Snapshot),
        (status = 500, description = "Partition enumeration failed"),
    ),
    tag = "Disk Monitoring"
)]
async fn live_snapshot(
    State(state): State<Arc<MonitoringState>>,
) -> Result<impl IntoResponse, Problem> {
    match state.monitor.collect_once().await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            tracing::error!("On-demand collection failed: {}", e);
            Err(internal_server_error().with_detail(e.to_string()))
        }
    }
}

/// Query stored history as Grafana time series
#[utoipa::path(
    get,
    path = "/grafana",
    params(
        ("from" = i64, Query, description = "Range start, millisecond epoch"),
        ("to" = i64, Query, description = "Range end, millisecond epoch"),
        ("path" = Option<String>, Query, description = "Exact mount point filter"),
    ),
    responses(
        (status = 200, description = "Named series with [value, timestampMillis] pairs", body = Vec<crate::projection::TimeseriesResponse>),
        (status = 400, description = "Missing or malformed range parameter"),
    ),
    tag = "Disk Monitoring"
)]
async fn range_query(
    State(state): State<Arc<MonitoringState>>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, Problem> {
    let from = parse_epoch_ms(query.from.as_deref(), "from")?;
    let to = parse_epoch_ms(query.to.as_deref(), "to")?;

    let snapshots = state.monitor.range(from, to).await;
    let series = project(&snapshots, query.path.as_deref());
    Ok(Json(to_timeseries(series)))
}

/// Resolve a relative-time expression and redirect to the range query
#[utoipa::path(
    get,
    path = "/grafana/simple",
    params(
        ("time" = String, Query, description = "Relative range, e.g. 30m, 2h, 7d"),
        ("path" = Option<String>, Query, description = "Exact mount point filter"),
    ),
    responses(
        (status = 307, description = "Redirect to /grafana with computed from/to"),
        (status = 400, description = "Missing or malformed time expression"),
    ),
    tag = "Disk Monitoring"
)]
async fn relative_query(Query(query): Query<RelativeQuery>) -> Result<impl IntoResponse, Problem> {
    let expr = query
        .time
        .as_deref()
        .ok_or_else(|| bad_request().with_detail("missing 'time' parameter"))?;
    let duration = parse_relative(expr)
        .map_err(|e| bad_request().with_detail(format!("invalid time format: {e}")))?;

    let (from, to) = relative_range(Utc::now(), duration);
    let url = match query.path.as_deref() {
        Some(path) => format!(
            "/grafana?path={}&from={from}&to={to}",
            urlencoding::encode(path)
        ),
        None => format!("/grafana?from={from}&to={to}"),
    };
    Ok(Redirect::temporary(&url))
}

/// Prometheus text exposition of the live gauges
#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "Gauge state in Prometheus text format", body = String, content_type = "text/plain"),
        (status = 500, description = "Exposition encoding failed"),
    ),
    tag = "Disk Monitoring"
)]
async fn scrape_metrics(
    State(state): State<Arc<MonitoringState>>,
) -> Result<impl IntoResponse, Problem> {
    // Reads gauge state only; never triggers a collection cycle.
    match state.monitor.render_gauges() {
        Ok(body) => Ok((
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )),
        Err(e) => {
            tracing::error!("Gauge exposition failed: {}", e);
            Err(internal_server_error().with_detail(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::tests::{reading, MockProbe};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use hostwatch_core::MonitorSettings;
    use tower::ServiceExt;

    fn app_with(probe: MockProbe) -> (Router, Arc<DiskMonitor>) {
        let monitor = Arc::new(
            DiskMonitor::new(Arc::new(probe), &MonitorSettings::default()).unwrap(),
        );
        let state = Arc::new(MonitoringState {
            monitor: monitor.clone(),
        });
        (configure_routes().with_state(state), monitor)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_live_snapshot_collects_fresh_data() {
        let (app, monitor) = app_with(MockProbe::with_readings(vec![reading("/", 40)]));

        let response = app
            .oneshot(Request::get("/metrics/disk").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["partitions"][0]["path"], "/");
        assert_eq!(json["partitions"][0]["usagePercent"], 40.0);
        // The fresh snapshot also lands in the store
        assert_eq!(monitor.stored_snapshots().await, 1);
    }

    #[tokio::test]
    async fn test_live_snapshot_failure_returns_500_problem() {
        let (app, _) = app_with(MockProbe::failing());

        let response = app
            .oneshot(Request::get("/metrics/disk").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/problem+json"
        );
    }

    #[tokio::test]
    async fn test_range_query_requires_from_and_to() {
        let (app, _) = app_with(MockProbe::with_readings(vec![reading("/", 40)]));

        let response = app
            .clone()
            .oneshot(Request::get("/grafana?to=2000").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["detail"].as_str().unwrap().contains("'from'"));

        let response = app
            .oneshot(
                Request::get("/grafana?from=1000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_range_query_rejects_non_integer_bounds() {
        let (app, _) = app_with(MockProbe::with_readings(vec![reading("/", 40)]));

        let response = app
            .oneshot(
                Request::get("/grafana?from=yesterday&to=2000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["detail"].as_str().unwrap().contains("'from'"));
    }

    #[tokio::test]
    async fn test_range_query_returns_series_for_stored_data() {
        let (app, monitor) = app_with(MockProbe::with_readings(vec![reading("/", 40)]));
        monitor.collect_once().await.unwrap();

        let to = Utc::now().timestamp_millis() + 60_000;
        let response = app
            .oneshot(
                Request::get(format!("/grafana?from=0&to={to}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let targets: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["target"].as_str().unwrap())
            .collect();
        assert_eq!(targets, vec!["/ - Used", "/ - Free", "/ - Usage %"]);
        assert_eq!(json[0]["datapoints"][0][0], 40.0);
    }

    #[tokio::test]
    async fn test_range_query_with_unmatched_filter_is_empty() {
        let (app, monitor) = app_with(MockProbe::with_readings(vec![reading("/", 40)]));
        monitor.collect_once().await.unwrap();

        let to = Utc::now().timestamp_millis() + 60_000;
        let response = app
            .oneshot(
                Request::get(format!("/grafana?path=/data&from=0&to={to}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_relative_query_redirects_with_computed_range() {
        let (app, _) = app_with(MockProbe::with_readings(vec![reading("/", 40)]));

        let before = Utc::now().timestamp_millis();
        let response = app
            .oneshot(
                Request::get("/grafana/simple?time=1h&path=/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let after = Utc::now().timestamp_millis();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(location.starts_with("/grafana?path=%2F&from="));

        let query: std::collections::HashMap<&str, i64> = location
            .split_once('?')
            .unwrap()
            .1
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .filter_map(|(k, v)| v.parse().ok().map(|v| (k, v)))
            .collect();
        let from = query["from"];
        let to = query["to"];
        assert_eq!(to - from, 3_600_000);
        assert!(to >= before && to <= after);
    }

    #[tokio::test]
    async fn test_relative_query_rejects_bad_expression() {
        let (app, _) = app_with(MockProbe::with_readings(vec![reading("/", 40)]));

        for uri in ["/grafana/simple", "/grafana/simple?time=30x"] {
            let response = app
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_relative_query_rejects_oversized_values() {
        let (app, _) = app_with(MockProbe::with_readings(vec![reading("/", 40)]));

        // Values past the duration bounds must come back as 400s, not
        // take the handler down.
        for uri in [
            "/grafana/simple?time=999999999999999m",
            "/grafana/simple?time=18446744073709551615m",
        ] {
            let response = app
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let json = body_json(response).await;
            assert!(json["detail"].as_str().unwrap().contains("out of range"));
        }
    }

    #[tokio::test]
    async fn test_scrape_serves_gauges_without_collecting() {
        let (app, monitor) = app_with(MockProbe::with_readings(vec![reading("/", 40)]));
        monitor.collect_once().await.unwrap();
        let stored_before = monitor.stored_snapshots().await;

        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains(r#"disk_usage_bytes{path="/",type="used"} 40"#));
        assert!(text.contains(r#"disk_usage_percent{path="/"} 40"#));

        // Scraping must not trigger a new collection cycle
        assert_eq!(monitor.stored_snapshots().await, stored_before);
    }
}
