//! `/a1-p/policytypes/{policy_type_id}/policies[/{policy_instance_id}[/status[/{handler_id}]]]`

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use a1_core::error::A1Error;
use a1_core::model::{HandlerId, HandlerStatus, InstanceStatus, PolicyInstanceId};

use super::{instance_id, type_id, validate, ApiError, ApiPath};
use crate::app_state::AppState;

/// 404 when the type itself is unknown, otherwise the (possibly empty) id list.
pub async fn list_instances(
    State(state): State<AppState>,
    ApiPath(raw_type): ApiPath<u64>,
) -> Result<Json<Vec<PolicyInstanceId>>, ApiError> {
    let t = type_id(raw_type)?;
    let store = state.store();
    store.get_type(t).await?;
    Ok(Json(store.list_instances(t).await?))
}

pub async fn put_instance(
    State(state): State<AppState>,
    ApiPath((raw_type, raw_instance)): ApiPath<(u64, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let t = type_id(raw_type)?;
    let i = instance_id(raw_instance)?;
    let Json(payload) = body?;

    let store = state.store();
    let schema = store.get_type(t).await?;
    validate::conforms(t, &schema.create_schema, &payload)?;

    store.create_or_replace_instance(t, &i, &payload).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn get_instance(
    State(state): State<AppState>,
    ApiPath((raw_type, raw_instance)): ApiPath<(u64, String)>,
) -> Result<Json<Value>, ApiError> {
    let t = type_id(raw_type)?;
    let i = instance_id(raw_instance)?;
    Ok(Json(state.store().get_instance(t, &i).await?))
}

pub async fn delete_instance(
    State(state): State<AppState>,
    ApiPath((raw_type, raw_instance)): ApiPath<(u64, String)>,
) -> Result<StatusCode, ApiError> {
    let t = type_id(raw_type)?;
    let i = instance_id(raw_instance)?;
    state.store().delete_instance(t, &i).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_instance_status(
    State(state): State<AppState>,
    ApiPath((raw_type, raw_instance)): ApiPath<(u64, String)>,
) -> Result<Json<InstanceStatus>, ApiError> {
    let t = type_id(raw_type)?;
    let i = instance_id(raw_instance)?;
    Ok(Json(state.store().instance_status(t, &i).await?))
}

/// Acknowledgement body sent by a handler for one instance.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandlerStatusReport {
    pub status: HandlerStatus,
}

pub async fn put_handler_status(
    State(state): State<AppState>,
    ApiPath((raw_type, raw_instance, raw_handler)): ApiPath<(u64, String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let t = type_id(raw_type)?;
    let i = instance_id(raw_instance)?;
    let h = HandlerId::new(raw_handler)?;
    let Json(body) = body?;
    let report: HandlerStatusReport = serde_json::from_value(body)
        .map_err(|e| A1Error::BadRequest(format!("invalid handler status body: {e}")))?;

    state.store().record_handler_status(t, &i, &h, report.status).await?;
    Ok(StatusCode::NO_CONTENT)
}
