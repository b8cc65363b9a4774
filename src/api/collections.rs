use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::AppState;
use crate::api::error::ApiError;
use crate::domain::{Collection, CreateCollectionInput, QuoteRef};
use crate::services::Sourced;

#[derive(Serialize, ToSchema)]
pub struct QuoteRefDto {
    pub id: String,
    pub text: String,
    pub author: String,
    pub added_at: String,
}

impl From<QuoteRef> for QuoteRefDto {
    fn from(quote: QuoteRef) -> Self {
        Self {
            id: quote.id,
            text: quote.text,
            author: quote.author,
            added_at: quote.added_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CollectionDto {
    pub id: String,
    pub name: String,
    pub owner_id: Option<String>,
    pub is_public: bool,
    pub quotes: Vec<QuoteRefDto>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Collection> for CollectionDto {
    fn from(collection: Collection) -> Self {
        Self {
            id: collection.id,
            name: collection.name,
            owner_id: collection.owner_id,
            is_public: collection.is_public,
            quotes: collection.quotes.into_iter().map(QuoteRefDto::from).collect(),
            created_at: collection.created_at,
            updated_at: collection.updated_at,
        }
    }
}

/// Which backend served the request; `"durable"` or `"memory"` on every
/// success response.
#[derive(Serialize, ToSchema)]
pub struct CollectionResponse {
    pub source: &'static str,
    #[serde(flatten)]
    pub collection: CollectionDto,
}

impl From<Sourced<Collection>> for CollectionResponse {
    fn from(result: Sourced<Collection>) -> Self {
        Self {
            source: result.source.as_str(),
            collection: result.record.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CollectionListResponse {
    pub source: &'static str,
    pub collections: Vec<CollectionDto>,
}

#[derive(Serialize, ToSchema)]
pub struct QuoteResponse {
    pub source: &'static str,
    #[serde(flatten)]
    pub quote: QuoteRefDto,
}

impl From<Sourced<QuoteRef>> for QuoteResponse {
    fn from(result: Sourced<QuoteRef>) -> Self {
        Self {
            source: result.source.as_str(),
            quote: result.record.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct DeletionResponse {
    pub source: &'static str,
    pub deleted: bool,
    pub name: String,
}

#[derive(Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

fn require_name(query: NameQuery) -> Result<String, ApiError> {
    query
        .name
        .ok_or_else(|| ApiError::validation("query parameter \"name\" is required"))
}

#[derive(Deserialize, ToSchema)]
pub struct CreateCollectionRequest {
    pub name: String,
    pub owner_id: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct RenameCollectionRequest {
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct QuoteRequest {
    pub text: String,
    pub author: String,
}

#[utoipa::path(
    get,
    path = "/collections",
    params(("name" = Option<String>, Query, description = "Collection name; omit to list all")),
    responses(
        (status = 200, description = "The named collection, or all collections"),
        (status = 404, description = "No collection with that name")
    )
)]
pub async fn get_collections(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<Response, ApiError> {
    match query.name {
        Some(name) => {
            let found = state.store.get_collection(&name).await?;
            Ok((StatusCode::OK, Json(CollectionResponse::from(found))).into_response())
        }
        None => {
            let listed = state.store.list_collections().await?;
            let body = CollectionListResponse {
                source: listed.source.as_str(),
                collections: listed.record.into_iter().map(CollectionDto::from).collect(),
            };
            Ok((StatusCode::OK, Json(body)).into_response())
        }
    }
}

#[utoipa::path(
    post,
    path = "/collections",
    request_body = CreateCollectionRequest,
    responses(
        (status = 201, description = "Collection created", body = CollectionResponse),
        (status = 400, description = "Invalid name"),
        (status = 409, description = "Name already taken in the owner scope")
    )
)]
pub async fn create_collection(
    State(state): State<AppState>,
    Json(payload): Json<CreateCollectionRequest>,
) -> Result<Response, ApiError> {
    let created = state
        .store
        .create_collection(CreateCollectionInput {
            name: payload.name,
            owner_id: payload.owner_id,
            is_public: payload.is_public,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(CollectionResponse::from(created))).into_response())
}

#[utoipa::path(
    put,
    path = "/collections",
    params(("name" = String, Query, description = "Current collection name")),
    request_body = RenameCollectionRequest,
    responses(
        (status = 200, description = "Collection renamed in place", body = CollectionResponse),
        (status = 404, description = "No collection with that name"),
        (status = 409, description = "New name already taken")
    )
)]
pub async fn rename_collection(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
    Json(payload): Json<RenameCollectionRequest>,
) -> Result<Response, ApiError> {
    let name = require_name(query)?;
    let renamed = state.store.rename_collection(&name, &payload.name).await?;
    Ok((StatusCode::OK, Json(CollectionResponse::from(renamed))).into_response())
}

#[utoipa::path(
    delete,
    path = "/collections",
    params(("name" = String, Query, description = "Collection name")),
    responses(
        (status = 200, description = "Collection and its quotes deleted", body = DeletionResponse),
        (status = 404, description = "No collection with that name")
    )
)]
pub async fn delete_collection(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<Response, ApiError> {
    let name = require_name(query)?;
    let deleted = state.store.delete_collection(&name).await?;
    let body = DeletionResponse {
        source: deleted.source.as_str(),
        deleted: true,
        name,
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

#[utoipa::path(
    post,
    path = "/collections/quotes",
    params(("name" = String, Query, description = "Collection name")),
    request_body = QuoteRequest,
    responses(
        (status = 201, description = "Quote appended", body = QuoteResponse),
        (status = 404, description = "No collection with that name"),
        (status = 409, description = "Equivalent quote already in the collection")
    )
)]
pub async fn add_quote(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Response, ApiError> {
    let name = require_name(query)?;
    let added = state
        .store
        .add_quote(&name, &payload.text, &payload.author)
        .await?;
    Ok((StatusCode::CREATED, Json(QuoteResponse::from(added))).into_response())
}

#[utoipa::path(
    delete,
    path = "/collections/quotes",
    params(("name" = String, Query, description = "Collection name")),
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Quote removed", body = QuoteResponse),
        (status = 404, description = "Collection or quote-in-collection missing")
    )
)]
pub async fn remove_quote(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Response, ApiError> {
    let name = require_name(query)?;
    let removed = state
        .store
        .remove_quote(&name, &payload.text, &payload.author)
        .await?;
    Ok((StatusCode::OK, Json(QuoteResponse::from(removed))).into_response())
}
