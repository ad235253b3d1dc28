//! Instrument endpoints.

use api_types::instrument::{
    InstrumentCreated, InstrumentKind, InstrumentListResponse, InstrumentNew, InstrumentUpdate,
    InstrumentView, PayNew, PendingListResponse, PendingView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    ServerError,
    server::{CurrentUser, ServerState},
};
use engine::{InstrumentPending, Money, PayInstrumentCmd};

fn engine_kind(kind: InstrumentKind) -> engine::InstrumentKind {
    match kind {
        InstrumentKind::Debit => engine::InstrumentKind::Debit,
        InstrumentKind::Credit => engine::InstrumentKind::Credit,
    }
}

fn api_kind(kind: engine::InstrumentKind) -> InstrumentKind {
    match kind {
        engine::InstrumentKind::Debit => InstrumentKind::Debit,
        engine::InstrumentKind::Credit => InstrumentKind::Credit,
    }
}

fn pending_view(pending: InstrumentPending) -> PendingView {
    PendingView {
        instrument_id: pending.instrument_id,
        pending_minor: pending.display().minor(),
        overpaid: pending.overpaid,
    }
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<InstrumentNew>,
) -> Result<(StatusCode, Json<InstrumentCreated>), ServerError> {
    let id = state
        .engine
        .new_instrument(
            &user.0,
            &payload.issuer,
            engine_kind(payload.kind),
            &payload.last4,
            &payload.display_name,
            payload.credit_limit_minor.map(Money::new),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(InstrumentCreated { id })))
}

pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<InstrumentListResponse>, ServerError> {
    let instruments = state.engine.list_instruments(&user.0).await?;
    Ok(Json(InstrumentListResponse {
        instruments: instruments
            .into_iter()
            .map(|instrument| InstrumentView {
                id: instrument.id,
                issuer: instrument.issuer,
                kind: api_kind(instrument.kind),
                last4: instrument.last4,
                display_name: instrument.display_name,
                credit_limit_minor: instrument.credit_limit.map(Money::minor),
            })
            .collect(),
    }))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(instrument_id): Path<Uuid>,
    Json(payload): Json<InstrumentUpdate>,
) -> Result<StatusCode, ServerError> {
    if payload.display_name.is_none() && payload.issuer.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of display_name or issuer".to_string(),
        ));
    }
    state
        .engine
        .update_instrument(
            &user.0,
            instrument_id,
            payload.display_name.as_deref(),
            payload.issuer.as_deref(),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(instrument_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_instrument(&user.0, instrument_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn pending(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(instrument_id): Path<Uuid>,
) -> Result<Json<PendingView>, ServerError> {
    let pending = state.engine.pending_of(&user.0, instrument_id).await?;
    Ok(Json(pending_view(pending)))
}

/// Pending amounts across all the caller's credit instruments.
pub async fn pending_all(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<PendingListResponse>, ServerError> {
    let pendings = state.engine.credit_pendings(&user.0).await?;
    Ok(Json(PendingListResponse {
        pendings: pendings
            .into_iter()
            .map(|(_, pending)| pending_view(pending))
            .collect(),
    }))
}

pub async fn pay(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(instrument_id): Path<Uuid>,
    Json(payload): Json<PayNew>,
) -> Result<(StatusCode, Json<api_types::record::RecordCreated>), ServerError> {
    let mut cmd = PayInstrumentCmd::new(
        user.0,
        instrument_id,
        Money::new(payload.amount_minor),
        payload.created_at.with_timezone(&Utc),
    );
    cmd.note = payload.note;

    let id = state.engine.pay_instrument(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(api_types::record::RecordCreated { id }),
    ))
}
