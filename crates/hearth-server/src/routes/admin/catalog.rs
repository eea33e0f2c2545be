use super::deleted;
use crate::error::{created, ok, ApiResult};
use crate::extract::AdminAuth;
use crate::state::AppState;
use actix_web::web;
use hearth_commerce::catalog::{CategoryInput, ProductInput, SubCategoryInput};
use hearth_commerce::search::ProductQuery;
use hearth_commerce::{CategoryId, ProductId, SubCategoryId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SubCategoryListQuery {
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

/// Same filters and paging as the storefront listing.
pub async fn list_products(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    query: web::Query<ProductQuery>,
) -> ApiResult {
    let search = query.into_inner().into_search(state.pricing.currency)?;
    Ok(ok(state.store.search_products(&search).await?))
}

pub async fn product(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult {
    let id = ProductId::new(id.into_inner());
    Ok(ok(state.store.get_product(&id).await?))
}

pub async fn create_product(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    body: web::Json<ProductInput>,
) -> ApiResult {
    Ok(created(state.store.create_product(body.into_inner()).await?))
}

pub async fn update_product(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<ProductInput>,
) -> ApiResult {
    let id = ProductId::new(id.into_inner());
    Ok(ok(state.store.update_product(&id, body.into_inner()).await?))
}

pub async fn delete_product(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult {
    let id = ProductId::new(id.into_inner());
    state.store.delete_product(&id).await?;
    Ok(ok(deleted(id.as_str())))
}

pub async fn list_categories(_admin: AdminAuth, state: web::Data<AppState>) -> ApiResult {
    Ok(ok(state.store.list_categories().await?))
}

pub async fn create_category(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    body: web::Json<CategoryInput>,
) -> ApiResult {
    Ok(created(state.store.create_category(body.into_inner()).await?))
}

pub async fn update_category(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<CategoryInput>,
) -> ApiResult {
    let id = CategoryId::new(id.into_inner());
    Ok(ok(state.store.update_category(&id, body.into_inner()).await?))
}

/// Refused with 409 while products still reference the category.
pub async fn delete_category(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult {
    let id = CategoryId::new(id.into_inner());
    state.store.delete_category(&id).await?;
    Ok(ok(deleted(id.as_str())))
}

pub async fn list_subcategories(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    query: web::Query<SubCategoryListQuery>,
) -> ApiResult {
    Ok(ok(state
        .store
        .list_subcategories(query.category_id.as_ref())
        .await?))
}

pub async fn create_subcategory(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    body: web::Json<SubCategoryInput>,
) -> ApiResult {
    Ok(created(
        state.store.create_subcategory(body.into_inner()).await?,
    ))
}

pub async fn update_subcategory(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<SubCategoryInput>,
) -> ApiResult {
    let id = SubCategoryId::new(id.into_inner());
    Ok(ok(state
        .store
        .update_subcategory(&id, body.into_inner())
        .await?))
}

pub async fn delete_subcategory(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult {
    let id = SubCategoryId::new(id.into_inner());
    state.store.delete_subcategory(&id).await?;
    Ok(ok(deleted(id.as_str())))
}
