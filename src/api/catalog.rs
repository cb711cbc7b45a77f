//! Catalog home endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, models::catalog::CatalogSummary};

/// Record counts for the catalog home page
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog counts", body = CatalogSummary)
    )
)]
pub async fn get_summary(State(state): State<crate::AppState>) -> AppResult<Json<CatalogSummary>> {
    let summary = state.services.catalog.summary().await?;
    Ok(Json(summary))
}
