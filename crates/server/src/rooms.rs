//! Room, membership and settlement endpoints.

use api_types::room::{
    DebtView, DebtsResponse, ExpenseCreated, ExpenseNew, ExpenseUpdate, ExpenseView, MemberAdd,
    MemberView, NetPositionView, NetPositionsResponse, RoomCreated, RoomNew, RoomView, ShareView,
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
use engine::{ExpenseNewCmd, ExpenseUpdateCmd, Money, SharedExpense};

fn expense_view(expense: SharedExpense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        amount_minor: expense.amount.minor(),
        payer_id: expense.payer_id,
        shares: expense
            .shares
            .into_iter()
            .map(|(member_id, weight)| ShareView { member_id, weight })
            .collect(),
        note: expense.note,
        created_by: expense.created_by,
        created_at: expense.created_at.fixed_offset(),
    }
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<RoomNew>,
) -> Result<(StatusCode, Json<RoomCreated>), ServerError> {
    let room = state
        .engine
        .new_room(&payload.name, &user.0, &payload.display_name)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RoomCreated {
            id: room.id,
            join_code: room.join_code,
        }),
    ))
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<RoomView>, ServerError> {
    let (room, members, expenses) = state.engine.room_snapshot(room_id, &user.0).await?;
    Ok(Json(RoomView {
        id: room.id,
        name: room.name,
        join_code: room.join_code,
        members: members
            .into_iter()
            .map(|member| MemberView {
                user_id: member.user_id,
                display_name: member.display_name,
            })
            .collect(),
        expenses: expenses.into_iter().map(expense_view).collect(),
    }))
}

pub async fn add_member(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(room_id): Path<Uuid>,
    Json(payload): Json<MemberAdd>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .add_room_member(room_id, &payload.user_id, &payload.display_name, &user.0)
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn new_expense(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(room_id): Path<Uuid>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseCreated>), ServerError> {
    let mut cmd = ExpenseNewCmd::new(
        room_id,
        Money::new(payload.amount_minor),
        payload.payer_id,
        user.0,
        payload.created_at.with_timezone(&Utc),
    );
    cmd.shares = payload
        .shares
        .into_iter()
        .map(|share| (share.member_id, share.weight))
        .collect();
    cmd.note = payload.note;

    let id = state.engine.new_expense(cmd).await?;
    Ok((StatusCode::CREATED, Json(ExpenseCreated { id })))
}

pub async fn update_expense(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path((room_id, expense_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<StatusCode, ServerError> {
    let mut cmd = ExpenseUpdateCmd::new(
        room_id,
        expense_id,
        user.0,
        Money::new(payload.amount_minor),
        payload.payer_id,
    );
    cmd.shares = payload
        .shares
        .into_iter()
        .map(|share| (share.member_id, share.weight))
        .collect();
    cmd.note = payload.note;

    state.engine.update_expense(cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_expense(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path((room_id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_expense(room_id, expense_id, &user.0)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn net_positions(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<NetPositionsResponse>, ServerError> {
    let positions = state.engine.room_net_positions(room_id, &user.0).await?;
    Ok(Json(NetPositionsResponse {
        positions: positions
            .into_iter()
            .map(|(member_id, amount)| NetPositionView {
                member_id,
                amount_minor: amount.minor(),
            })
            .collect(),
    }))
}

pub async fn pairwise_debts(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<DebtsResponse>, ServerError> {
    let debts = state.engine.room_pairwise_debts(room_id, &user.0).await?;
    Ok(Json(DebtsResponse {
        debts: debts
            .into_iter()
            .map(|debt| DebtView {
                from: debt.from,
                to: debt.to,
                amount_minor: debt.amount.minor(),
            })
            .collect(),
    }))
}
