use axum::{Router, routing::get};
use storage::Database;

use super::handlers::{recent_scores, submit_score};

pub fn routes() -> Router<Database> {
    Router::new().route("/", get(recent_scores).post(submit_score))
}
