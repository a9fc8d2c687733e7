//! Axum router wiring for the A1-P REST surface.

use axum::{
    routing::{get, put},
    Router,
};

use crate::{app_state::AppState, rest};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/a1-p/healthcheck", get(rest::ops::healthcheck))
        .route("/a1-p/policytypes", get(rest::types::list_types))
        .route(
            "/a1-p/policytypes/:policy_type_id",
            get(rest::types::get_type)
                .put(rest::types::put_type)
                .delete(rest::types::delete_type),
        )
        .route(
            "/a1-p/policytypes/:policy_type_id/policies",
            get(rest::instances::list_instances),
        )
        .route(
            "/a1-p/policytypes/:policy_type_id/policies/:policy_instance_id",
            get(rest::instances::get_instance)
                .put(rest::instances::put_instance)
                .delete(rest::instances::delete_instance),
        )
        .route(
            "/a1-p/policytypes/:policy_type_id/policies/:policy_instance_id/status",
            get(rest::instances::get_instance_status),
        )
        .route(
            "/a1-p/policytypes/:policy_type_id/policies/:policy_instance_id/status/:handler_id",
            put(rest::instances::put_handler_status),
        )
        .route("/metrics", get(rest::ops::metrics))
        .with_state(state)
}
