//! Resource API router configuration.
//!
//! Every entity kind is served by the same generic handlers: the collection
//! path segment selects the kind, and the catalog supplies searches and
//! projections.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use roster_model::{EntityKind, Record, RelationDescriptor};
use roster_storage::{RelationChange, Repository};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::body;
use crate::error::{ApiError, ApiResult};
use crate::links::{href, templated};
use crate::params::{self, ListParams};
use crate::render::collection_document;
use crate::state::ApiState;

type QueryPairs = Query<Vec<(String, String)>>;

// ============================================================================
// Resolution helpers
// ============================================================================

fn kind_of(segment: &str) -> ApiResult<EntityKind> {
    EntityKind::from_collection(segment).ok_or_else(|| ApiError::unknown_collection(segment))
}

// A malformed identity cannot address an existing entity.
fn parse_id(kind: EntityKind, raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::entity_not_found(kind, raw))
}

fn relation_of(kind: EntityKind, name: &str) -> ApiResult<&'static RelationDescriptor> {
    kind.descriptor()
        .relation(name)
        .ok_or_else(|| ApiError::NotFound(format!("{kind} has no relation '{name}'")))
}

async fn load<S: Repository>(state: &ApiState<S>, kind: EntityKind, id: Uuid) -> ApiResult<Record> {
    state
        .repository
        .find_by_id(kind, id)
        .await?
        .ok_or_else(|| ApiError::entity_not_found(kind, id))
}

// Fails before any write so an unknown projection never leaves a half-applied
// mutation behind.
fn check_projection<S: Repository>(
    state: &ApiState<S>,
    kind: EntityKind,
    projection: Option<&str>,
) -> ApiResult<()> {
    if let Some(name) = projection {
        state.renderer().resolve(kind, name)?;
    }
    Ok(())
}

// ============================================================================
// Root
// ============================================================================

/// GET / - Entry point listing the collections
async fn root<S: Repository + 'static>(State(state): State<ApiState<S>>) -> Json<Value> {
    let mut links = Map::new();
    links.insert("self".into(), href(state.links.root()));
    for kind in EntityKind::ALL {
        links.insert(kind.collection().into(), href(state.links.collection(kind)));
    }
    Json(json!({ "_links": links }))
}

// ============================================================================
// Collection Handlers
// ============================================================================

/// GET /{collection} - List entities
async fn list_collection<S: Repository + 'static>(
    State(state): State<ApiState<S>>,
    Path(collection): Path<String>,
    Query(query): QueryPairs,
) -> ApiResult<Json<Value>> {
    let kind = kind_of(&collection)?;
    let params = ListParams::parse(kind, &query, state.paging)?;

    let page = state.repository.find_page(kind, &params.page).await?;
    let page = state
        .renderer()
        .render_page(kind, page, params.projection.as_deref())
        .await?;

    Ok(Json(collection_document(
        kind.collection(),
        page,
        &state.links.collection(kind),
        &params,
        vec![("search", href(state.links.search_index(kind)))],
    )))
}

/// POST /{collection} - Create an entity
async fn create_entity<S: Repository + 'static>(
    State(state): State<ApiState<S>>,
    Path(collection): Path<String>,
    Query(query): QueryPairs,
    bytes: Bytes,
) -> ApiResult<impl IntoResponse> {
    let kind = kind_of(&collection)?;
    let projection = params::projection(&query);
    check_projection(&state, kind, projection.as_deref())?;

    let record = body::for_create(kind, &body::parse_object(&bytes)?)?;
    state.repository.create(&record).await?;
    tracing::info!(kind = %kind, id = %record.id(), "entity created");

    let doc = state.renderer().render(&record, projection.as_deref()).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, state.links.item(kind, record.id()))],
        Json(doc),
    ))
}

// ============================================================================
// Item Handlers
// ============================================================================

/// GET /{collection}/{id} - Get an entity
async fn get_entity<S: Repository + 'static>(
    State(state): State<ApiState<S>>,
    Path((collection, id)): Path<(String, String)>,
    Query(query): QueryPairs,
) -> ApiResult<Json<Value>> {
    let kind = kind_of(&collection)?;
    let id = parse_id(kind, &id)?;
    let record = load(&state, kind, id).await?;

    let projection = params::projection(&query);
    let doc = state.renderer().render(&record, projection.as_deref()).await?;
    Ok(Json(doc))
}

/// PUT /{collection}/{id} - Replace an entity
async fn replace_entity<S: Repository + 'static>(
    State(state): State<ApiState<S>>,
    Path((collection, id)): Path<(String, String)>,
    Query(query): QueryPairs,
    bytes: Bytes,
) -> ApiResult<Json<Value>> {
    let kind = kind_of(&collection)?;
    let id = parse_id(kind, &id)?;
    let projection = params::projection(&query);
    check_projection(&state, kind, projection.as_deref())?;

    let record = body::for_replace(kind, id, &body::parse_object(&bytes)?)?;
    state.repository.update(&record).await?;
    tracing::info!(kind = %kind, id = %id, "entity replaced");

    let doc = state.renderer().render(&record, projection.as_deref()).await?;
    Ok(Json(doc))
}

/// PATCH /{collection}/{id} - Merge fields into an entity
async fn patch_entity<S: Repository + 'static>(
    State(state): State<ApiState<S>>,
    Path((collection, id)): Path<(String, String)>,
    Query(query): QueryPairs,
    bytes: Bytes,
) -> ApiResult<Json<Value>> {
    let kind = kind_of(&collection)?;
    let id = parse_id(kind, &id)?;
    let projection = params::projection(&query);
    check_projection(&state, kind, projection.as_deref())?;

    let patch = body::parse_object(&bytes)?;
    let existing = load(&state, kind, id).await?;
    let record = body::for_merge(&existing, &patch)?;
    state.repository.update(&record).await?;
    tracing::info!(kind = %kind, id = %id, "entity patched");

    let doc = state.renderer().render(&record, projection.as_deref()).await?;
    Ok(Json(doc))
}

/// DELETE /{collection}/{id} - Delete an entity and its relation edges
async fn delete_entity<S: Repository + 'static>(
    State(state): State<ApiState<S>>,
    Path((collection, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let kind = kind_of(&collection)?;
    let id = parse_id(kind, &id)?;

    state.repository.delete_by_id(kind, id).await?;
    tracing::info!(kind = %kind, id = %id, "entity deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Relation Handlers
// ============================================================================

/// GET /{collection}/{id}/{relation} - List related entities
async fn list_related<S: Repository + 'static>(
    State(state): State<ApiState<S>>,
    Path((collection, id, relation)): Path<(String, String, String)>,
    Query(query): QueryPairs,
) -> ApiResult<Json<Value>> {
    let kind = kind_of(&collection)?;
    let id = parse_id(kind, &id)?;
    let relation = relation_of(kind, &relation)?;
    let target = relation.target;
    let params = ListParams::parse(target, &query, state.paging)?;

    let page = state
        .repository
        .list_related(kind, id, relation.name, &params.page)
        .await?;
    let page = state
        .renderer()
        .render_page(target, page, params.projection.as_deref())
        .await?;

    Ok(Json(collection_document(
        target.collection(),
        page,
        &state.links.relation(kind, id, relation.name),
        &params,
        Vec::new(),
    )))
}

/// POST /{collection}/{id}/{relation} - Attach an entity
async fn attach<S: Repository + 'static>(
    State(state): State<ApiState<S>>,
    Path((collection, id, relation)): Path<(String, String, String)>,
    bytes: Bytes,
) -> ApiResult<StatusCode> {
    let kind = kind_of(&collection)?;
    let id = parse_id(kind, &id)?;
    let relation = relation_of(kind, &relation)?;
    let related_id = body::attach_target(&state.links, relation, &bytes)?;

    let change = state
        .repository
        .add_relation(kind, id, relation.name, related_id)
        .await?;
    if change == RelationChange::Added {
        tracing::info!(kind = %kind, id = %id, relation = relation.name, related = %related_id, "relation added");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /{collection}/{id}/{relation}/{related_id} - Get a related entity
async fn get_related<S: Repository + 'static>(
    State(state): State<ApiState<S>>,
    Path((collection, id, relation, related_id)): Path<(String, String, String, String)>,
    Query(query): QueryPairs,
) -> ApiResult<Json<Value>> {
    let kind = kind_of(&collection)?;
    let id = parse_id(kind, &id)?;
    let relation = relation_of(kind, &relation)?;
    let related_id = parse_id(relation.target, &related_id)?;

    load(&state, kind, id).await?;
    if !state
        .repository
        .is_related(kind, id, relation.name, related_id)
        .await?
    {
        return Err(ApiError::NotFound(format!(
            "{} {related_id} is not in {kind} {id} {}",
            relation.target, relation.name
        )));
    }
    let related = load(&state, relation.target, related_id).await?;

    let projection = params::projection(&query);
    let doc = state.renderer().render(&related, projection.as_deref()).await?;
    Ok(Json(doc))
}

/// DELETE /{collection}/{id}/{relation}/{related_id} - Detach an entity
async fn detach<S: Repository + 'static>(
    State(state): State<ApiState<S>>,
    Path((collection, id, relation, related_id)): Path<(String, String, String, String)>,
) -> ApiResult<StatusCode> {
    let kind = kind_of(&collection)?;
    let id = parse_id(kind, &id)?;
    let relation = relation_of(kind, &relation)?;
    let related_id = parse_id(relation.target, &related_id)?;

    let change = state
        .repository
        .remove_relation(kind, id, relation.name, related_id)
        .await?;
    if change == RelationChange::Removed {
        tracing::info!(kind = %kind, id = %id, relation = relation.name, related = %related_id, "relation removed");
    }
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Search Handlers
// ============================================================================

/// GET /{collection}/search - List the registered searches
async fn search_index<S: Repository + 'static>(
    State(state): State<ApiState<S>>,
    Path(collection): Path<String>,
) -> ApiResult<Json<Value>> {
    let kind = kind_of(&collection)?;

    let mut links = Map::new();
    links.insert("self".into(), href(state.links.search_index(kind)));
    for search in state.catalog.searches(kind) {
        let names: Vec<&str> = search.params.iter().map(|p| p.name.as_str()).collect();
        links.insert(
            search.name.clone(),
            templated(format!(
                "{}{{?{}}}",
                state.links.search(kind, &search.name),
                names.join(",")
            )),
        );
    }
    Ok(Json(json!({ "_links": links })))
}

/// GET /{collection}/search/{name} - Run a search
async fn run_search<S: Repository + 'static>(
    State(state): State<ApiState<S>>,
    Path((collection, name)): Path<(String, String)>,
    Query(query): QueryPairs,
) -> ApiResult<Json<Value>> {
    let kind = kind_of(&collection)?;
    let search = state
        .catalog
        .search(kind, &name)
        .ok_or_else(|| ApiError::NotFound(format!("{kind} has no search '{name}'")))?;
    let params = ListParams::parse(kind, &query, state.paging)?;
    let criteria = search.bind(&params.search_values())?;

    let page = state.repository.search(kind, &criteria, &params.page).await?;
    let page = state
        .renderer()
        .render_page(kind, page, params.projection.as_deref())
        .await?;

    Ok(Json(collection_document(
        kind.collection(),
        page,
        &state.links.search(kind, &name),
        &params,
        Vec::new(),
    )))
}

// ============================================================================
// Router
// ============================================================================

/// Creates the resource router for every entity kind.
///
/// # Example
///
/// ```ignore
/// let state = ApiState::new(repository, catalog, links, paging);
/// let app = resource_router().with_state(state);
/// ```
pub fn resource_router<S>() -> Router<ApiState<S>>
where
    S: Repository + 'static,
{
    Router::new()
        .route("/", get(root::<S>))
        .route(
            "/{collection}",
            get(list_collection::<S>).post(create_entity::<S>),
        )
        .route("/{collection}/search", get(search_index::<S>))
        .route("/{collection}/search/{name}", get(run_search::<S>))
        .route(
            "/{collection}/{id}",
            get(get_entity::<S>)
                .put(replace_entity::<S>)
                .patch(patch_entity::<S>)
                .delete(delete_entity::<S>),
        )
        .route(
            "/{collection}/{id}/{relation}",
            get(list_related::<S>).post(attach::<S>),
        )
        .route(
            "/{collection}/{id}/{relation}/{related_id}",
            get(get_related::<S>).delete(detach::<S>),
        )
}
