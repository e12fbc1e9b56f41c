//! Member endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use catalog_store::{CatalogStore, Member, MemberId};
use domain::RegisterMember;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct RegisterMemberRequest {
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct MemberResponse {
    pub id: MemberId,
    pub name: String,
    pub email: String,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            name: member.name,
            email: member.email,
        }
    }
}

/// POST /api/members: register a member.
#[tracing::instrument(skip(state, body))]
pub async fn register<S: CatalogStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<RegisterMemberRequest>, JsonRejection>,
) -> Result<Json<MemberResponse>, ApiError> {
    let Json(req) = body?;
    let member = state
        .catalog
        .register_member(RegisterMember::new(req.name, req.email))
        .await?;
    Ok(Json(member.into()))
}

/// GET /api/members/:id: load a member.
#[tracing::instrument(skip(state))]
pub async fn get<S: CatalogStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    member_id: Result<Path<MemberId>, PathRejection>,
) -> Result<Json<MemberResponse>, ApiError> {
    let Path(member_id) = member_id?;
    let member = state.catalog.get_member(member_id).await?;
    Ok(Json(member.into()))
}
