use crate::error::{ok, ApiResult};
use crate::state::AppState;
use actix_web::web;

pub async fn blogs(state: web::Data<AppState>) -> ApiResult {
    Ok(ok(state.store.list_blog_posts(true).await?))
}

pub async fn blog(state: web::Data<AppState>, slug: web::Path<String>) -> ApiResult {
    Ok(ok(state.store.published_blog_post(&slug).await?))
}

pub async fn recipes(state: web::Data<AppState>) -> ApiResult {
    Ok(ok(state.store.list_recipes(true).await?))
}

pub async fn recipe(state: web::Data<AppState>, slug: web::Path<String>) -> ApiResult {
    Ok(ok(state.store.published_recipe(&slug).await?))
}

/// Active home screen offers, by position.
pub async fn banners(state: web::Data<AppState>) -> ApiResult {
    Ok(ok(state.store.list_offers(true).await?))
}

pub async fn topbar(state: web::Data<AppState>) -> ApiResult {
    Ok(ok(state.store.list_topbar(true).await?))
}

pub async fn reviews(state: web::Data<AppState>) -> ApiResult {
    Ok(ok(state.store.list_reviews(true).await?))
}
