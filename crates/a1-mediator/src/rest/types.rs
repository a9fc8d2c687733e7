//! `/a1-p/policytypes[/{policy_type_id}]`

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use a1_core::error::A1Error;
use a1_core::model::{PolicyTypeId, PolicyTypeSchema};

use super::{type_id, validate, ApiError, ApiPath};
use crate::app_state::AppState;

pub async fn list_types(State(state): State<AppState>) -> Result<Json<Vec<PolicyTypeId>>, ApiError> {
    Ok(Json(state.store().list_types().await?))
}

pub async fn put_type(
    State(state): State<AppState>,
    ApiPath(raw_type): ApiPath<u64>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let t = type_id(raw_type)?;
    let Json(body) = body?;
    let schema: PolicyTypeSchema = serde_json::from_value(body)
        .map_err(|e| A1Error::BadRequest(format!("invalid policy type body: {e}")))?;

    validate::schema_compiles(t, &schema.create_schema)?;

    state.store().register_type(t, &schema).await?;
    Ok(StatusCode::CREATED)
}

pub async fn get_type(
    State(state): State<AppState>,
    ApiPath(raw_type): ApiPath<u64>,
) -> Result<Json<PolicyTypeSchema>, ApiError> {
    let t = type_id(raw_type)?;
    Ok(Json(state.store().get_type(t).await?))
}

pub async fn delete_type(State(state): State<AppState>, ApiPath(raw_type): ApiPath<u64>) -> Result<StatusCode, ApiError> {
    let t = type_id(raw_type)?;
    state.store().delete_type(t).await?;
    Ok(StatusCode::NO_CONTENT)
}
