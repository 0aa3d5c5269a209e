//! HTTP surface: report attributes under `/rcal/{attribute}` and Prometheus text under `/metrics`

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::Arc;

use crate::host::AttributeGroup;

pub struct AppState {
    pub attributes: AttributeGroup,
    pub registry: Arc<Registry>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/rcal/{attribute}", get(attribute_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Each read performs a fresh traversal, which busy-polls the energy
/// counter, so it runs on the blocking pool.
async fn attribute_handler(
    State(state): State<Arc<AppState>>,
    Path(attribute): Path<String>,
) -> impl IntoResponse {
    tracing::debug!("Read of {}/{}", state.attributes.name(), attribute);

    let result = tokio::task::spawn_blocking(move || state.attributes.read(&attribute)).await;

    match result {
        Ok(Some(body)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "no such attribute\n".to_string(),
        ),
        Err(e) => {
            tracing::error!("Attribute read task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                "read failed\n".to_string(),
            )
        }
    }
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&state.registry.gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }

    let content_type = encoder.format_type().to_string();
    (
        [(header::CONTENT_TYPE, content_type)],
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ScriptedAccess, SteppingClock};
    use crate::config::CalibrationConfig;
    use crate::host::register_calibrator;
    use crate::orchestrator::Calibrator;
    use axum::body::to_bytes;
    use axum::response::Response;
    use raplcal_raw::Vendor;

    fn state(access: ScriptedAccess) -> Arc<AppState> {
        let config = CalibrationConfig {
            vendor: Vendor::Amd,
            ..Default::default()
        };
        let calibrator =
            Arc::new(Calibrator::new(access, SteppingClock::new(100, 977_000), config).unwrap());
        let registry = calibrator.metrics().registry();
        Arc::new(AppState {
            attributes: register_calibrator(calibrator),
            registry,
        })
    }

    async fn body(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_time_attribute() {
        let access = ScriptedAccess::supported(Vendor::Amd)
            .with_register(0xC001_0299, 0x0000_0A00)
            .with_sequence(0xC001_029B, [1, 2, 2, 3]);
        let state = state(access);

        let response = attribute_handler(State(Arc::clone(&state)), Path("rcal_time".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, "{\"start\": 100, \"end\": 977100}\n");

        let response = metrics_handler(State(state)).await.into_response();
        let text = body(response).await;
        assert!(text.contains("raplcal_last_tick_period_ns 977000"));
        assert!(text.contains("endpoint=\"time\""));
    }

    #[tokio::test]
    async fn test_unsupported_hardware_still_answers() {
        let state = state(ScriptedAccess::new());

        let response = attribute_handler(State(state), Path("rcal_calibrate".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, "{\"error\": \"rdmsr failed\"}\n");
    }

    #[tokio::test]
    async fn test_unknown_attribute_is_not_found() {
        let state = state(ScriptedAccess::new());

        let response = attribute_handler(State(state), Path("rcal_power".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
