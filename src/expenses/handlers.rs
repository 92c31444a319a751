use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::auth::jwt::AuthUser;
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::expenses::category::Category;
use crate::expenses::dto::{CreateExpenseRequest, UpdateExpenseRequest};
use crate::expenses::repo::Expense;
use crate::state::AppState;

pub fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", post(create_expense).get(list_expenses))
        .route(
            "/expenses/:id",
            get(get_expense).patch(update_expense).delete(delete_expense),
        )
}

/// The token resolved, but the account behind it must still exist. Preserved
/// source behavior: a deleted account turns every ledger call into a 401.
pub(crate) async fn ensure_caller(db: &PgPool, caller: i64) -> Result<(), ApiError> {
    User::find_by_id(db, caller)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::unauthorized("unauthorized"))
}

/// Ownership gate. A caller never sees another user's record, but existence
/// is checked first: missing ids read as 404, foreign ids as 403.
pub(crate) fn authorize_owner(expense: &Expense, caller: i64) -> Result<(), ApiError> {
    if expense.user_id != caller {
        return Err(ApiError::forbidden("unauthorized access to expense"));
    }
    Ok(())
}

async fn fetch_owned(db: &PgPool, caller: i64, id: i64) -> Result<Expense, ApiError> {
    let expense = Expense::find_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("expense not found"))?;
    authorize_owner(&expense, caller)?;
    Ok(expense)
}

/// Merge a partial-update payload into a stored record. Absent fields, empty
/// strings and a zero amount are skipped, not rejected; a supplied category
/// must still belong to the closed set.
pub(crate) fn apply_updates(
    expense: &mut Expense,
    patch: UpdateExpenseRequest,
) -> Result<(), ApiError> {
    if let Some(title) = patch.title.filter(|v| !v.is_empty()) {
        expense.title = title;
    }
    if let Some(description) = patch.description.filter(|v| !v.is_empty()) {
        expense.description = description;
    }
    if let Some(date) = patch.date.filter(|v| !v.is_empty()) {
        expense.date = date;
    }
    if let Some(category) = patch.category.filter(|v| !v.is_empty()) {
        category
            .parse::<Category>()
            .map_err(|_| ApiError::validation("invalid category provided"))?;
        expense.category = category;
    }
    if let Some(amount) = patch.amount.filter(|a| *a != 0.0) {
        expense.amount = amount;
    }
    Ok(())
}

#[instrument(skip(state, claims, payload))]
pub async fn create_expense(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    ensure_caller(&state.db, claims.sub).await?;

    if payload.title.is_empty()
        || payload.description.is_empty()
        || payload.date.is_empty()
        || payload.amount <= 0.0
    {
        return Err(ApiError::validation("all fields are required"));
    }
    let category = payload
        .category
        .parse::<Category>()
        .map_err(|_| ApiError::validation("invalid category provided"))?;

    // The owner is the caller, full stop.
    let expense = Expense::insert(
        &state.db,
        claims.sub,
        &payload.title,
        &payload.description,
        payload.amount,
        &payload.date,
        category.as_str(),
    )
    .await?;

    info!(expense_id = expense.meta.id, user_id = claims.sub, "expense created");
    Ok((StatusCode::CREATED, Json(expense)))
}

#[instrument(skip(state, claims))]
pub async fn list_expenses(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<Expense>>, ApiError> {
    ensure_caller(&state.db, claims.sub).await?;

    let expenses = Expense::list_by_user(&state.db, claims.sub).await?;
    if expenses.is_empty() {
        // Empty-as-error, preserved source convention.
        return Err(ApiError::not_found("no expenses found"));
    }
    Ok(Json(expenses))
}

#[instrument(skip(state, claims))]
pub async fn get_expense(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Expense>, ApiError> {
    ensure_caller(&state.db, claims.sub).await?;
    let expense = fetch_owned(&state.db, claims.sub, id).await?;
    Ok(Json(expense))
}

#[instrument(skip(state, claims, payload))]
pub async fn update_expense(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> Result<Json<Expense>, ApiError> {
    ensure_caller(&state.db, claims.sub).await?;

    let mut expense = fetch_owned(&state.db, claims.sub, id).await?;
    apply_updates(&mut expense, payload)?;
    let saved = expense.save(&state.db).await?;

    info!(expense_id = id, user_id = claims.sub, "expense updated");
    Ok(Json(saved))
}

#[instrument(skip(state, claims))]
pub async fn delete_expense(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    ensure_caller(&state.db, claims.sub).await?;

    fetch_owned(&state.db, claims.sub, id).await?;
    let deleted = Expense::delete(&state.db, id).await?;
    if deleted == 0 {
        return Err(ApiError::internal("failed to delete expense"));
    }

    info!(expense_id = id, user_id = claims.sub, "expense deleted");
    Ok(StatusCode::NO_CONTENT)
}
