use axum::Router;

use crate::state::AppState;

pub mod category;
mod dto;
pub mod filters;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::ledger_routes())
        .merge(filters::filter_routes())
}
