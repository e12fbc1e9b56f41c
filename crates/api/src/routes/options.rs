//! Product option endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use catalog_store::{CatalogStore, OptionDetails, OptionId, ProductId, ProductOption};
use domain::CreateOption;
use serde::{Deserialize, Serialize};

use super::products::ProductResponse;
use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateOptionRequest {
    pub name: String,
    pub quantity: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionResponse {
    pub id: OptionId,
    pub name: String,
    pub quantity: u32,
    pub product_id: ProductId,
}

impl From<ProductOption> for OptionResponse {
    fn from(option: ProductOption) -> Self {
        Self {
            id: option.id,
            name: option.name,
            quantity: option.quantity,
            product_id: option.product_id,
        }
    }
}

#[derive(Serialize)]
pub struct OptionDetailsResponse {
    #[serde(flatten)]
    pub option: OptionResponse,
    pub product: ProductResponse,
}

impl From<OptionDetails> for OptionDetailsResponse {
    fn from(details: OptionDetails) -> Self {
        Self {
            option: details.option.into(),
            product: details.product.into(),
        }
    }
}

/// POST /api/products/:id/options: add a stocked option to a product.
#[tracing::instrument(skip(state, body))]
pub async fn create<S: CatalogStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    product_id: Result<Path<ProductId>, PathRejection>,
    body: Result<Json<CreateOptionRequest>, JsonRejection>,
) -> Result<Json<OptionResponse>, ApiError> {
    let Path(product_id) = product_id?;
    let Json(req) = body?;
    let option = state
        .catalog
        .create_option(CreateOption {
            product_id,
            name: req.name,
            quantity: req.quantity,
        })
        .await?;
    Ok(Json(option.into()))
}

/// GET /api/products/:id/options: list a product's options.
#[tracing::instrument(skip(state))]
pub async fn list<S: CatalogStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    product_id: Result<Path<ProductId>, PathRejection>,
) -> Result<Json<Vec<OptionResponse>>, ApiError> {
    let Path(product_id) = product_id?;
    let options = state.catalog.list_options(product_id).await?;
    Ok(Json(options.into_iter().map(Into::into).collect()))
}

/// GET /api/options/:id: load an option with its product and current stock.
#[tracing::instrument(skip(state))]
pub async fn get<S: CatalogStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    option_id: Result<Path<OptionId>, PathRejection>,
) -> Result<Json<OptionDetailsResponse>, ApiError> {
    let Path(option_id) = option_id?;
    let details = state.catalog.get_option(option_id).await?;
    Ok(Json(details.into()))
}
