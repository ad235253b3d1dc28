//! Record and transfer endpoints.

use api_types::record::{
    RecordCreated, RecordList, RecordListResponse, RecordNew, RecordUpdate, RecordView,
};
use api_types::transfer::{TransferCreated, TransferNew};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    ServerError,
    server::{CurrentUser, ServerState},
};
use engine::{
    Category, Money, PaymentMethod, Record, RecordListFilter, RecordNewCmd, RecordUpdateCmd,
    TransferCmd,
};

pub(crate) fn engine_kind(kind: api_types::RecordKind) -> engine::RecordKind {
    match kind {
        api_types::RecordKind::Income => engine::RecordKind::Income,
        api_types::RecordKind::Expense => engine::RecordKind::Expense,
    }
}

pub(crate) fn api_kind(kind: engine::RecordKind) -> api_types::RecordKind {
    match kind {
        engine::RecordKind::Income => api_types::RecordKind::Income,
        engine::RecordKind::Expense => api_types::RecordKind::Expense,
    }
}

pub(crate) fn parse_payment(
    payment: Option<&str>,
) -> Result<Option<PaymentMethod>, ServerError> {
    payment
        .map(PaymentMethod::parse_wire)
        .transpose()
        .map_err(ServerError::from)
}

fn record_view(record: Record) -> RecordView {
    RecordView {
        id: record.id,
        kind: api_kind(record.kind),
        amount_minor: record.amount.minor(),
        category: record.category.label().to_string(),
        payment: record.payment.map(PaymentMethod::as_wire),
        pocket_id: record.pocket_id,
        linked_transfer_id: record.linked_transfer_id,
        note: record.note,
        created_at: record.created_at.fixed_offset(),
    }
}

pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<RecordList>,
) -> Result<Json<RecordListResponse>, ServerError> {
    let filter = RecordListFilter {
        pocket_id: query.pocket_id,
        kind: query.kind.map(engine_kind),
        include_transfers: query.include_transfers.unwrap_or(true),
        limit: query.limit,
    };
    let records = state.engine.list_records(&user.0, filter).await?;
    Ok(Json(RecordListResponse {
        records: records.into_iter().map(record_view).collect(),
    }))
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<RecordNew>,
) -> Result<(StatusCode, Json<RecordCreated>), ServerError> {
    let mut cmd = RecordNewCmd::new(
        user.0,
        engine_kind(payload.kind),
        Money::new(payload.amount_minor),
        Category::parse(&payload.category),
        payload.created_at.with_timezone(&Utc),
    );
    cmd.payment = parse_payment(payload.payment.as_deref())?;
    cmd.pocket_id = payload.pocket_id;
    cmd.note = payload.note;

    let id = state.engine.add_record(cmd).await?;
    Ok((StatusCode::CREATED, Json(RecordCreated { id })))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(record_id): Path<Uuid>,
    Json(payload): Json<RecordUpdate>,
) -> Result<StatusCode, ServerError> {
    let mut cmd = RecordUpdateCmd::new(
        user.0,
        record_id,
        engine_kind(payload.kind),
        Money::new(payload.amount_minor),
        Category::parse(&payload.category),
    );
    cmd.payment = parse_payment(payload.payment.as_deref())?;
    cmd.pocket_id = payload.pocket_id;
    cmd.note = payload.note;
    cmd.created_at = payload.created_at.map(|at| at.with_timezone(&Utc));

    state.engine.update_record(cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(record_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_record(&user.0, record_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn transfer(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<(StatusCode, Json<TransferCreated>), ServerError> {
    let mut cmd = TransferCmd::new(
        user.0,
        Money::new(payload.amount_minor),
        payload.created_at.with_timezone(&Utc),
    );
    cmd.from_pocket_id = payload.from_pocket_id;
    cmd.to_pocket_id = payload.to_pocket_id;
    cmd.note = payload.note;

    let (expense_record_id, income_record_id) = state.engine.transfer(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(TransferCreated {
            expense_record_id,
            income_record_id,
        }),
    ))
}
