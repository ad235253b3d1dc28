//! Recurring-rule endpoints (storage only; nothing executes rules).

use api_types::recurring::{
    Frequency, RuleCreated, RuleListResponse, RuleNew, RuleUpdate, RuleView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    records::{api_kind, engine_kind, parse_payment},
    server::{CurrentUser, ServerState},
};
use engine::{Category, Money, PaymentMethod, RuleNewCmd, RuleUpdateCmd};

fn engine_frequency(frequency: Frequency) -> engine::Frequency {
    match frequency {
        Frequency::Daily => engine::Frequency::Daily,
        Frequency::Weekly => engine::Frequency::Weekly,
        Frequency::Monthly => engine::Frequency::Monthly,
    }
}

fn api_frequency(frequency: engine::Frequency) -> Frequency {
    match frequency {
        engine::Frequency::Daily => Frequency::Daily,
        engine::Frequency::Weekly => Frequency::Weekly,
        engine::Frequency::Monthly => Frequency::Monthly,
    }
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<RuleNew>,
) -> Result<(StatusCode, Json<RuleCreated>), ServerError> {
    let mut cmd = RuleNewCmd::new(
        user.0,
        engine_kind(payload.kind),
        Money::new(payload.amount_minor),
        Category::parse(&payload.category),
        engine_frequency(payload.frequency),
        payload.day_of_month,
    );
    cmd.payment = parse_payment(payload.payment.as_deref())?;

    let id = state.engine.new_rule(cmd).await?;
    Ok((StatusCode::CREATED, Json(RuleCreated { id })))
}

pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<RuleListResponse>, ServerError> {
    let rules = state.engine.list_rules(&user.0).await?;
    Ok(Json(RuleListResponse {
        rules: rules
            .into_iter()
            .map(|rule| RuleView {
                id: rule.id,
                kind: api_kind(rule.kind),
                amount_minor: rule.amount.minor(),
                category: rule.category.label().to_string(),
                payment: rule.payment.map(PaymentMethod::as_wire),
                frequency: api_frequency(rule.frequency),
                day_of_month: rule.day_of_month,
                is_active: rule.is_active,
                last_executed_at: rule.last_executed_at.map(|at| at.fixed_offset()),
            })
            .collect(),
    }))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(rule_id): Path<Uuid>,
    Json(payload): Json<RuleUpdate>,
) -> Result<StatusCode, ServerError> {
    let mut cmd = RuleUpdateCmd::new(
        user.0,
        rule_id,
        engine_kind(payload.kind),
        Money::new(payload.amount_minor),
        Category::parse(&payload.category),
        engine_frequency(payload.frequency),
        payload.day_of_month,
        payload.is_active,
    );
    cmd.payment = parse_payment(payload.payment.as_deref())?;

    state.engine.update_rule(cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(rule_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_rule(&user.0, rule_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
