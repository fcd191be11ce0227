use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    models::{ActingUser, ConnectedElderly, Connection, Role},
    AppError, AppResult, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectionsResponse {
    /// Only filled for caregivers
    pub connected_elderly: Vec<ConnectedElderly>,
    pub connections: Vec<Connection>,
}

/// GET /api/connections - The caller's roster
#[utoipa::path(
    get,
    path = "/api/connections",
    responses(
        (status = 200, description = "Active connections and, for caregivers, connected elderly users", body = ConnectionsResponse),
        (status = 401, description = "Missing identity headers")
    ),
    tag = "connections"
)]
pub async fn get_connections(
    State(state): State<Arc<AppState>>,
    user: ActingUser,
) -> AppResult<Json<ConnectionsResponse>> {
    let api = state.care_api.as_ref();

    let (connected_elderly, connections) = match user.role {
        Role::Caregiver => {
            let (roster, connections) = tokio::try_join!(
                state.roster.connected_elderly(api, &user),
                api.get_connections(&user),
            )?;
            (roster.as_ref().clone(), connections)
        }
        Role::Elderly => (Vec::new(), api.get_connections(&user).await?),
        Role::Unrecognized => return Err(AppError::Forbidden("Unrecognized role".to_string())),
    };

    let connections = connections.into_iter().filter(Connection::is_active).collect();

    Ok(Json(ConnectionsResponse { connected_elderly, connections }))
}
