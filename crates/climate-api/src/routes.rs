use crate::cors::{apply_cors, CorsPolicy};
use crate::error::ApiError;
use crate::mock::{
    custom_location_impact, forecast_impact, mock_region_impact, COMPARISON_PRECIPITATION_DIFF,
    COMPARISON_TEMPERATURE_DIFF,
};
use crate::pages::{dashboard_page, map_page};
use crate::registry::{resolve_region, ModelRegistry};
use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::middleware;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use climate_store::RunStore;
use climate_types::{
    Alert, AlertsResponse, Comparison, ComparisonResponse, EndpointMap, HealthResponse,
    LoadedRuns, PredictionRequest, RefreshResponse, RegionImpact, RootInfo, Severity,
    StatusResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

const SERVICE_NAME: &str = "climate-api";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) registry: Arc<RwLock<ModelRegistry>>,
    pub(crate) store: Arc<RunStore>,
}

impl AppState {
    pub(crate) fn new(store: RunStore) -> Self {
        Self {
            registry: Arc::new(RwLock::new(ModelRegistry::default())),
            store: Arc::new(store),
        }
    }

    /// Loads the latest runs off the async runtime and swaps them in.
    pub(crate) async fn reload(&self) -> anyhow::Result<()> {
        let mut registry = self.registry.read().await.clone();
        let store = Arc::clone(&self.store);
        let registry = tokio::task::spawn_blocking(move || {
            registry.load_latest_artifacts(&store);
            registry
        })
        .await
        .context("artifact reload task failed")?;
        *self.registry.write().await = registry;
        Ok(())
    }
}

pub(crate) fn router(state: AppState, cors: CorsPolicy) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/refresh", post(refresh_artifacts))
        .route("/predictions/:region_name", get(get_region_predictions))
        .route("/predict", post(predict_custom_location))
        .route("/map", get(get_interactive_map))
        .route("/dashboard/:region_name", get(get_dashboard))
        .route("/alerts", get(get_active_alerts))
        .route("/compare", get(compare_regions))
        .with_state(state)
        .layer(middleware::from_fn_with_state(cors, apply_cors))
}

async fn root(State(state): State<AppState>) -> Json<RootInfo> {
    let registry = state.registry.read().await;
    Json(RootInfo {
        message: "Climate Impact Predictor API v1.0".to_string(),
        documentation: "/docs".to_string(),
        endpoints: EndpointMap::default(),
        loaded_runs: LoadedRuns {
            training: registry.training_run_id.clone(),
            refresh: registry.refresh_run_id.clone(),
            last_updated: registry.last_updated_label(),
        },
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let registry = state.registry.read().await;
    Json(StatusResponse {
        status: "running".to_string(),
        models_loaded: registry.models.is_some(),
        predictions_loaded: registry.predictions.is_some(),
        training_run_id: registry.training_run_id.clone(),
        refresh_run_id: registry.refresh_run_id.clone(),
        last_updated: registry.last_updated_label(),
        available_regions: registry.available_regions(),
    })
}

async fn refresh_artifacts(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, ApiError> {
    state
        .reload()
        .await
        .map_err(|err| ApiError::Internal(format!("Failed to reload artifacts: {err:#}")))?;
    let registry = state.registry.read().await;
    info!(
        training_run_id = ?registry.training_run_id,
        refresh_run_id = ?registry.refresh_run_id,
        "artifacts reloaded"
    );
    Ok(Json(RefreshResponse {
        status: "success".to_string(),
        training_run_id: registry.training_run_id.clone(),
        refresh_run_id: registry.refresh_run_id.clone(),
        message: "Artifacts reloaded successfully".to_string(),
    }))
}

async fn get_region_predictions(
    Path(region_name): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RegionImpact>, ApiError> {
    let registry = state.registry.read().await;
    let Some(predictions) = registry.predictions.as_ref() else {
        warn!(region = %region_name, "no predictions loaded, returning mock data");
        return Ok(Json(mock_region_impact(&region_name)));
    };
    let (name, forecast) = resolve_region(predictions, &region_name)?;
    Ok(Json(forecast_impact(
        name,
        forecast,
        registry.last_updated_label(),
    )))
}

async fn predict_custom_location(
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<RegionImpact>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;
    info!(
        latitude = request.latitude,
        longitude = request.longitude,
        horizon_years = request.horizon_years,
        "custom location prediction"
    );
    Ok(Json(custom_location_impact(&request)))
}

async fn get_interactive_map(State(state): State<AppState>) -> Html<String> {
    let regions = state.registry.read().await.available_regions();
    Html(map_page(&regions))
}

async fn get_dashboard(
    Path(region_name): Path<String>,
    State(state): State<AppState>,
) -> Html<String> {
    let registry = state.registry.read().await;
    let impact = registry.predictions.as_ref().and_then(|predictions| {
        resolve_region(predictions, &region_name)
            .ok()
            .map(|(name, forecast)| {
                forecast_impact(name, forecast, registry.last_updated_label())
            })
    });
    Html(dashboard_page(&region_name, impact.as_ref()))
}

async fn get_active_alerts(State(state): State<AppState>) -> Json<AlertsResponse> {
    let registry = state.registry.read().await;
    let Some(anomalies) = registry.anomalies.as_ref() else {
        warn!("no anomalies loaded, returning empty list");
        return Json(AlertsResponse {
            alerts: Vec::new(),
            count: 0,
            last_updated: None,
            message: Some("No anomaly data loaded yet".to_string()),
        });
    };
    let last_updated = registry.last_updated_label();
    let issued_at = last_updated.clone().unwrap_or_else(|| "unknown".to_string());
    let alerts: Vec<Alert> = anomalies
        .iter()
        .map(|anomaly| Alert {
            event: anomaly.event,
            region: anomaly.region.clone(),
            probability: anomaly.probability,
            severity: Severity::from_probability(anomaly.probability),
            issued_at: issued_at.clone(),
        })
        .collect();
    Json(AlertsResponse {
        count: alerts.len(),
        alerts,
        last_updated,
        message: None,
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompareQuery {
    region1: Option<String>,
    region2: Option<String>,
}

async fn compare_regions(
    Query(query): Query<CompareQuery>,
) -> Result<Json<ComparisonResponse>, ApiError> {
    let region1 = query.region1.ok_or(ApiError::MissingQuery("region1"))?;
    let region2 = query.region2.ok_or(ApiError::MissingQuery("region2"))?;
    let comparison = Comparison {
        temperature_change_diff: COMPARISON_TEMPERATURE_DIFF,
        precipitation_change_diff: COMPARISON_PRECIPITATION_DIFF,
        higher_risk_region: region1.clone(),
    };
    Ok(Json(ComparisonResponse {
        region1,
        region2,
        comparison,
    }))
}
