//! Headline statistics endpoint.

use api_types::stats::Statistic;
use axum::{Extension, Json, extract::State};

use crate::{
    ServerError,
    server::{CurrentUser, ServerState},
};

pub async fn get_stats(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Statistic>, ServerError> {
    let totals = state.engine.totals(&user.0).await?;
    Ok(Json(Statistic {
        income_minor: totals.income.minor(),
        expense_minor: totals.expense.minor(),
        balance_minor: totals.balance.minor(),
    }))
}
