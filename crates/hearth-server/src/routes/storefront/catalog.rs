use crate::error::{ok, ApiResult};
use crate::state::AppState;
use actix_web::web;
use hearth_commerce::catalog::CategoryTree;
use hearth_commerce::search::ProductQuery;

pub async fn list_products(
    state: web::Data<AppState>,
    query: web::Query<ProductQuery>,
) -> ApiResult {
    let search = query.into_inner().into_search(state.pricing.currency)?;
    let results = state.store.search_products(&search).await?;
    Ok(ok(results))
}

pub async fn product(state: web::Data<AppState>, slug: web::Path<String>) -> ApiResult {
    Ok(ok(state.store.product_by_slug(&slug).await?))
}

pub async fn categories(state: web::Data<AppState>) -> ApiResult {
    Ok(ok(state.store.category_tree().await?))
}

/// One category with its subcategories, by slug or id.
pub async fn category(state: web::Data<AppState>, key: web::Path<String>) -> ApiResult {
    let category = state.store.find_category(&key).await?;
    let subcategories = state.store.list_subcategories(Some(&category.id)).await?;
    Ok(ok(CategoryTree {
        category,
        subcategories,
    }))
}
