use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::model::RecordMeta;

/// Expense record as stored. `date` keeps the external `DD/MM/YYYY` textual
/// form; `user_id` is set once at creation and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Expense {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    pub description: String,
    pub amount: f64,
    pub date: String,
    pub category: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

impl Expense {
    pub async fn insert(
        db: &PgPool,
        user_id: i64,
        title: &str,
        description: &str,
        amount: f64,
        date: &str,
        category: &str,
    ) -> Result<Expense, sqlx::Error> {
        sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (title, description, amount, date, category, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, created_at, updated_at, title, description, amount, date, category, user_id
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(amount)
        .bind(date)
        .bind(category)
        .bind(user_id)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> Result<Option<Expense>, sqlx::Error> {
        sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, created_at, updated_at, title, description, amount, date, category, user_id
            FROM expenses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Every expense owned by the user, in store order. The filter engine and
    /// the list endpoint both read through here.
    pub async fn list_by_user(db: &PgPool, user_id: i64) -> Result<Vec<Expense>, sqlx::Error> {
        sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, created_at, updated_at, title, description, amount, date, category, user_id
            FROM expenses
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// Persist the mutable fields of an already-merged record. The store
    /// refreshes `updated_at`; `user_id` is deliberately not part of the SET.
    pub async fn save(&self, db: &PgPool) -> Result<Expense, sqlx::Error> {
        sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses
            SET title = $2, description = $3, amount = $4, date = $5, category = $6,
                updated_at = now()
            WHERE id = $1
            RETURNING id, created_at, updated_at, title, description, amount, date, category, user_id
            "#,
        )
        .bind(self.meta.id)
        .bind(&self.title)
        .bind(&self.description)
        .bind(self.amount)
        .bind(&self.date)
        .bind(&self.category)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
impl Expense {
    /// Row stand-in for pure-logic tests.
    pub fn test_stub(id: i64, user_id: i64, date: &str, category: &str) -> Self {
        Self {
            meta: RecordMeta::test_stub(id),
            title: format!("expense {id}"),
            description: "test".into(),
            amount: 10.0,
            date: date.into(),
            category: category.into(),
            user_id,
        }
    }
}
