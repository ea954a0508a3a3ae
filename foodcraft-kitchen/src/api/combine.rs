//! Stateless combination endpoint
//!
//! The browser client sends the two ingredient names (plus optional lineage)
//! and keeps its own inventory; nothing here touches a game save.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::services::{Resolution, ResolveRequest};
use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombineRequest {
    pub ingredient1: String,
    pub ingredient2: String,
    #[serde(default)]
    pub lineage1: Option<Vec<String>>,
    #[serde(default)]
    pub lineage2: Option<Vec<String>>,
}

/// POST /api/combine
pub async fn combine(
    State(state): State<AppState>,
    Json(body): Json<CombineRequest>,
) -> ApiResult<Json<Resolution>> {
    let request = ResolveRequest::new(body.ingredient1, body.ingredient2)
        .with_lineage(body.lineage1, body.lineage2);

    let resolution = state.resolver.resolve(&request).await?;
    Ok(Json(resolution))
}

pub fn combine_routes() -> Router<AppState> {
    Router::new().route("/api/combine", post(combine))
}
