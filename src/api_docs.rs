use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quotarium Collection API",
        description = "Named, user-curated quote collections with durable/memory dual-backend storage"
    ),
    paths(
        api::health::health_check,
        api::collections::get_collections,
        api::collections::create_collection,
        api::collections::rename_collection,
        api::collections::delete_collection,
        api::collections::add_quote,
        api::collections::remove_quote,
    ),
    components(schemas(
        api::collections::CollectionDto,
        api::collections::QuoteRefDto,
        api::collections::CollectionResponse,
        api::collections::CollectionListResponse,
        api::collections::QuoteResponse,
        api::collections::DeletionResponse,
        api::collections::CreateCollectionRequest,
        api::collections::RenameCollectionRequest,
        api::collections::QuoteRequest,
    ))
)]
pub struct ApiDoc;
