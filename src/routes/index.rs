// src/routes/index.rs
//! Root endpoint of the heating status API.
//!
//! `GET /` answers with a short liveness message so a browser hitting the
//! bare host sees that the API is up. Exported to the gateway (`mod.rs`) as
//! a state-agnostic subrouter, like `health`.

use axum::{routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct IndexResponse {
    message: &'static str,
}

async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "API running",
    })
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(index))
}
