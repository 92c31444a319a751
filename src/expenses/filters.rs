use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use time::{
    format_description::BorrowedFormatItem, macros::format_description, Date, Duration,
    OffsetDateTime,
};
use tracing::{instrument, warn};

use crate::auth::jwt::AuthUser;
use crate::error::ApiError;
use crate::expenses::category::Category;
use crate::expenses::dto::{CategoryQuery, DateRangeQuery};
use crate::expenses::handlers::ensure_caller;
use crate::expenses::repo::Expense;
use crate::state::AppState;

/// Fixed external date format for expense dates and filter bounds. Day first,
/// not ISO-8601 — a compatibility quirk the whole system shares.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day]/[month]/[year]");

pub fn filter_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses/week", get(by_week))
        .route("/expenses/month", get(by_month))
        .route("/expenses/quarter", get(by_quarter))
        .route("/expenses/dates", get(by_custom_range))
        .route("/expenses/category", get(by_category))
}

/// Parse a stored date, skipping (with a diagnostic) rows that do not match
/// the external format. A bad date never fails the whole query.
fn expense_date(expense: &Expense) -> Option<Date> {
    match Date::parse(&expense.date, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(err) => {
            warn!(
                expense_id = expense.meta.id,
                date = %expense.date,
                error = %err,
                "skipping expense with unparseable date"
            );
            None
        }
    }
}

/// Keep rows dated strictly after `today - days` and no later than `today`.
pub fn within_past_days(expenses: Vec<Expense>, today: Date, days: i64) -> Vec<Expense> {
    let cutoff = today - Duration::days(days);
    expenses
        .into_iter()
        .filter(|e| matches!(expense_date(e), Some(d) if d > cutoff && d <= today))
        .collect()
}

/// Inclusive on both ends: keep iff the date is neither before `start` nor
/// after `end`.
pub fn within_range(expenses: Vec<Expense>, start: Date, end: Date) -> Vec<Expense> {
    expenses
        .into_iter()
        .filter(|e| matches!(expense_date(e), Some(d) if !(d < start) && !(d > end)))
        .collect()
}

/// Exact category match.
pub fn with_category(expenses: Vec<Expense>, category: Category) -> Vec<Expense> {
    expenses
        .into_iter()
        .filter(|e| e.category == category.as_str())
        .collect()
}

async fn past_days(
    state: &AppState,
    caller: i64,
    days: i64,
    label: &str,
) -> Result<Json<Vec<Expense>>, ApiError> {
    ensure_caller(&state.db, caller).await?;

    let owned = Expense::list_by_user(&state.db, caller).await?;
    let today = OffsetDateTime::now_utc().date();
    let filtered = within_past_days(owned, today, days);
    if filtered.is_empty() {
        return Err(ApiError::not_found(format!(
            "no expenses found for the past {label}"
        )));
    }
    Ok(Json(filtered))
}

#[instrument(skip(state, claims))]
pub async fn by_week(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<Expense>>, ApiError> {
    past_days(&state, claims.sub, 7, "week").await
}

#[instrument(skip(state, claims))]
pub async fn by_month(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<Expense>>, ApiError> {
    past_days(&state, claims.sub, 30, "month").await
}

#[instrument(skip(state, claims))]
pub async fn by_quarter(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<Expense>>, ApiError> {
    past_days(&state, claims.sub, 90, "quarter").await
}

#[instrument(skip(state, claims))]
pub async fn by_custom_range(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    ensure_caller(&state.db, claims.sub).await?;

    let (start_raw, end_raw) = match (query.start_date, query.end_date) {
        (Some(s), Some(e)) => (s, e),
        _ => {
            return Err(ApiError::validation(
                "both start_date and end_date query parameters are required",
            ))
        }
    };
    let start = Date::parse(&start_raw, DATE_FORMAT)
        .map_err(|_| ApiError::validation("invalid start_date format, expected DD/MM/YYYY"))?;
    let end = Date::parse(&end_raw, DATE_FORMAT)
        .map_err(|_| ApiError::validation("invalid end_date format, expected DD/MM/YYYY"))?;

    let owned = Expense::list_by_user(&state.db, claims.sub).await?;
    let filtered = within_range(owned, start, end);
    if filtered.is_empty() {
        return Err(ApiError::not_found(
            "no expenses found for the specified date range",
        ));
    }
    Ok(Json(filtered))
}

#[instrument(skip(state, claims))]
pub async fn by_category(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    ensure_caller(&state.db, claims.sub).await?;

    let category = query
        .category
        .ok_or_else(|| ApiError::validation("category query parameter is required"))?
        .parse::<Category>()
        .map_err(|_| ApiError::validation("invalid category provided"))?;

    let owned = Expense::list_by_user(&state.db, claims.sub).await?;
    let filtered = with_category(owned, category);
    if filtered.is_empty() {
        return Err(ApiError::not_found("no expenses found for this category"));
    }
    Ok(Json(filtered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn ids(expenses: &[Expense]) -> Vec<i64> {
        expenses.iter().map(|e| e.meta.id).collect()
    }

    #[test]
    fn week_window_is_half_open() {
        let today = date!(2024 - 06 - 15);
        let expenses = vec![
            Expense::test_stub(1, 10, "08/06/2024", "Groceries"), // exactly 7 days ago: out
            Expense::test_stub(2, 10, "09/06/2024", "Groceries"), // just inside
            Expense::test_stub(3, 10, "15/06/2024", "Groceries"), // today: in
            Expense::test_stub(4, 10, "16/06/2024", "Groceries"), // future: out
        ];
        assert_eq!(ids(&within_past_days(expenses, today, 7)), vec![2, 3]);
    }

    #[test]
    fn month_and_quarter_use_day_counts() {
        let today = date!(2024 - 06 - 15);
        let expenses = vec![
            Expense::test_stub(1, 10, "17/05/2024", "Health"), // 29 days back: inside month
            Expense::test_stub(2, 10, "16/05/2024", "Health"), // exactly 30 days ago: out
            Expense::test_stub(3, 10, "18/03/2024", "Health"), // 89 days back: inside quarter
            Expense::test_stub(4, 10, "17/03/2024", "Health"), // exactly 90 days ago: out
        ];
        assert_eq!(ids(&within_past_days(expenses.clone(), today, 30)), vec![1]);
        assert_eq!(ids(&within_past_days(expenses, today, 90)), vec![1, 2, 3]);
    }

    #[test]
    fn unparseable_dates_are_skipped_not_fatal() {
        let today = date!(2024 - 06 - 15);
        let expenses = vec![
            Expense::test_stub(1, 10, "2024-06-14", "Others"), // ISO, wrong format
            Expense::test_stub(2, 10, "not a date", "Others"),
            Expense::test_stub(3, 10, "14/06/2024", "Others"),
        ];
        assert_eq!(ids(&within_past_days(expenses, today, 7)), vec![3]);
    }

    #[test]
    fn custom_range_is_inclusive_on_both_ends() {
        let start = date!(2024 - 01 - 01);
        let end = date!(2024 - 01 - 31);
        let expenses = vec![
            Expense::test_stub(1, 10, "31/12/2023", "Leisure"), // before start: out
            Expense::test_stub(2, 10, "01/01/2024", "Leisure"), // start: in
            Expense::test_stub(3, 10, "15/01/2024", "Leisure"),
            Expense::test_stub(4, 10, "31/01/2024", "Leisure"), // end: in
            Expense::test_stub(5, 10, "01/02/2024", "Leisure"), // after end: out
        ];
        assert_eq!(ids(&within_range(expenses, start, end)), vec![2, 3, 4]);
    }

    #[test]
    fn category_filter_matches_exactly() {
        let expenses = vec![
            Expense::test_stub(1, 10, "01/01/2024", "Groceries"),
            Expense::test_stub(2, 10, "01/01/2024", "Health"),
            Expense::test_stub(3, 10, "01/01/2024", "Groceries"),
        ];
        assert_eq!(
            ids(&with_category(expenses, Category::Groceries)),
            vec![1, 3]
        );
    }

    #[test]
    fn date_format_round_trips() {
        let parsed = Date::parse("29/02/2024", DATE_FORMAT).unwrap();
        assert_eq!(parsed, date!(2024 - 02 - 29));
        assert!(Date::parse("31/02/2024", DATE_FORMAT).is_err());
        assert!(Date::parse("2024/02/29", DATE_FORMAT).is_err());
    }
}
