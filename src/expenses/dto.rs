use serde::Deserialize;

/// Request body for creating an expense. The owner is always the caller; a
/// caller-supplied owner id is never accepted.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: String,
}

/// Partial-update body. Absent fields, empty strings and a zero amount are
/// all treated as "not supplied" and leave the stored value alone.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateExpenseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<String>,
    pub category: Option<String>,
}

/// Query parameters for the custom date-range filter. Both bounds required.
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Query parameter for the category filter.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}
