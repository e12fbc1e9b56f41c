//! Gift endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use catalog_store::{CatalogStore, MemberId, OptionId};
use chrono::{DateTime, Utc};
use gift::{GiftReceipt, SendGift};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

/// Header carrying the id of the member sending the gift.
pub const MEMBER_ID_HEADER: &str = "Member-Id";

/// Sender identity taken from the `Member-Id` header.
///
/// The header is trusted as-is; there is no authentication behind it.
#[derive(Debug, Clone, Copy)]
pub struct SenderId(pub MemberId);

impl<S: Send + Sync> FromRequestParts<S> for SenderId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(MEMBER_ID_HEADER)
            .ok_or_else(|| ApiError::BadRequest(format!("missing {MEMBER_ID_HEADER} header")))?;

        value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(|id| SenderId(MemberId::new(id)))
            .ok_or_else(|| {
                ApiError::BadRequest(format!("{MEMBER_ID_HEADER} header must be an integer"))
            })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendGiftRequest {
    pub option_id: OptionId,
    pub quantity: i64,
    pub receiver_id: MemberId,
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftReceiptResponse {
    pub gift_id: Uuid,
    pub sender_id: MemberId,
    pub receiver_id: MemberId,
    pub option_id: OptionId,
    pub quantity: u32,
    pub remaining_stock: u32,
    pub sent_at: DateTime<Utc>,
}

impl From<GiftReceipt> for GiftReceiptResponse {
    fn from(receipt: GiftReceipt) -> Self {
        Self {
            gift_id: receipt.gift_id,
            sender_id: receipt.sender_id,
            receiver_id: receipt.receiver_id,
            option_id: receipt.option_id,
            quantity: receipt.quantity,
            remaining_stock: receipt.remaining_stock,
            sent_at: receipt.sent_at,
        }
    }
}

/// POST /api/gifts: send units of an option from the header's member to a receiver.
#[tracing::instrument(skip(state, body), fields(sender_id = %sender.0))]
pub async fn send<S: CatalogStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    sender: SenderId,
    body: Result<Json<SendGiftRequest>, JsonRejection>,
) -> Result<Json<GiftReceiptResponse>, ApiError> {
    let Json(req) = body?;
    let receipt = state
        .gifts
        .send_gift(SendGift {
            sender_id: sender.0,
            option_id: req.option_id,
            receiver_id: req.receiver_id,
            quantity: req.quantity,
            message: req.message,
        })
        .await?;
    Ok(Json(receipt.into()))
}
