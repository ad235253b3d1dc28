//! Pocket endpoints.

use api_types::pocket::{
    PocketBalancesResponse, PocketCreated, PocketKind, PocketNew, PocketUpdate, PocketView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{CurrentUser, ServerState},
};
use engine::Money;

fn engine_kind(kind: PocketKind) -> engine::PocketKind {
    match kind {
        PocketKind::General => engine::PocketKind::General,
        PocketKind::Savings => engine::PocketKind::Savings,
        PocketKind::Debt => engine::PocketKind::Debt,
        PocketKind::Future => engine::PocketKind::Future,
    }
}

fn api_kind(kind: engine::PocketKind) -> PocketKind {
    match kind {
        engine::PocketKind::General => PocketKind::General,
        engine::PocketKind::Savings => PocketKind::Savings,
        engine::PocketKind::Debt => PocketKind::Debt,
        engine::PocketKind::Future => PocketKind::Future,
    }
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<PocketNew>,
) -> Result<(StatusCode, Json<PocketCreated>), ServerError> {
    let id = state
        .engine
        .new_pocket(
            &user.0,
            &payload.name,
            engine_kind(payload.kind),
            payload.goal_minor.map(Money::new),
            payload.target_period.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(PocketCreated { id })))
}

/// Pockets with their derived amounts plus the unassigned bucket.
pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<PocketBalancesResponse>, ServerError> {
    let (balances, unassigned) = state.engine.pocket_balances(&user.0).await?;
    Ok(Json(PocketBalancesResponse {
        pockets: balances
            .into_iter()
            .map(|(pocket, amount)| PocketView {
                id: pocket.id,
                name: pocket.name,
                kind: api_kind(pocket.kind),
                goal_minor: pocket.goal.map(Money::minor),
                target_period: pocket.target_period,
                amount_minor: amount.minor(),
            })
            .collect(),
        unassigned_minor: unassigned.minor(),
    }))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(pocket_id): Path<Uuid>,
    Json(payload): Json<PocketUpdate>,
) -> Result<StatusCode, ServerError> {
    if payload.name.is_none() && payload.goal_minor.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of name or goal_minor".to_string(),
        ));
    }
    state
        .engine
        .update_pocket(
            &user.0,
            pocket_id,
            payload.name.as_deref(),
            payload.goal_minor.map(Money::new),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(pocket_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_pocket(&user.0, pocket_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
