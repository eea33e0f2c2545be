//! Blog posts, recipes and home page rows.

use super::deleted;
use crate::error::{created, ok, ApiResult};
use crate::extract::AdminAuth;
use crate::state::AppState;
use actix_web::web;
use hearth_commerce::content::{
    BlogPostInput, FeaturedReviewInput, HomeScreenOfferInput, RecipeInput, TopbarInput,
};
use hearth_commerce::{BlogPostId, OfferId, RecipeId, ReviewId, TopbarId};

/// Drafts included.
pub async fn list_blogs(_admin: AdminAuth, state: web::Data<AppState>) -> ApiResult {
    Ok(ok(state.store.list_blog_posts(false).await?))
}

pub async fn blog(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult {
    let id = BlogPostId::new(id.into_inner());
    Ok(ok(state.store.get_blog_post(&id).await?))
}

pub async fn create_blog(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    body: web::Json<BlogPostInput>,
) -> ApiResult {
    Ok(created(state.store.create_blog_post(body.into_inner()).await?))
}

pub async fn update_blog(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<BlogPostInput>,
) -> ApiResult {
    let id = BlogPostId::new(id.into_inner());
    Ok(ok(state.store.update_blog_post(&id, body.into_inner()).await?))
}

pub async fn delete_blog(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult {
    let id = BlogPostId::new(id.into_inner());
    state.store.delete_blog_post(&id).await?;
    Ok(ok(deleted(id.as_str())))
}

pub async fn list_recipes(_admin: AdminAuth, state: web::Data<AppState>) -> ApiResult {
    Ok(ok(state.store.list_recipes(false).await?))
}

pub async fn recipe(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult {
    let id = RecipeId::new(id.into_inner());
    Ok(ok(state.store.get_recipe(&id).await?))
}

pub async fn create_recipe(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    body: web::Json<RecipeInput>,
) -> ApiResult {
    Ok(created(state.store.create_recipe(body.into_inner()).await?))
}

pub async fn update_recipe(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<RecipeInput>,
) -> ApiResult {
    let id = RecipeId::new(id.into_inner());
    Ok(ok(state.store.update_recipe(&id, body.into_inner()).await?))
}

pub async fn delete_recipe(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult {
    let id = RecipeId::new(id.into_inner());
    state.store.delete_recipe(&id).await?;
    Ok(ok(deleted(id.as_str())))
}

pub async fn list_topbar(_admin: AdminAuth, state: web::Data<AppState>) -> ApiResult {
    Ok(ok(state.store.list_topbar(false).await?))
}

pub async fn create_topbar(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    body: web::Json<TopbarInput>,
) -> ApiResult {
    Ok(created(state.store.create_topbar(body.into_inner()).await?))
}

pub async fn update_topbar(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<TopbarInput>,
) -> ApiResult {
    let id = TopbarId::new(id.into_inner());
    Ok(ok(state.store.update_topbar(&id, body.into_inner()).await?))
}

pub async fn delete_topbar(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult {
    let id = TopbarId::new(id.into_inner());
    state.store.delete_topbar(&id).await?;
    Ok(ok(deleted(id.as_str())))
}

pub async fn list_reviews(_admin: AdminAuth, state: web::Data<AppState>) -> ApiResult {
    Ok(ok(state.store.list_reviews(false).await?))
}

pub async fn create_review(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    body: web::Json<FeaturedReviewInput>,
) -> ApiResult {
    Ok(created(state.store.create_review(body.into_inner()).await?))
}

pub async fn update_review(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<FeaturedReviewInput>,
) -> ApiResult {
    let id = ReviewId::new(id.into_inner());
    Ok(ok(state.store.update_review(&id, body.into_inner()).await?))
}

pub async fn delete_review(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult {
    let id = ReviewId::new(id.into_inner());
    state.store.delete_review(&id).await?;
    Ok(ok(deleted(id.as_str())))
}

/// Inactive offers included, by position.
pub async fn list_offers(_admin: AdminAuth, state: web::Data<AppState>) -> ApiResult {
    Ok(ok(state.store.list_offers(false).await?))
}

pub async fn create_offer(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    body: web::Json<HomeScreenOfferInput>,
) -> ApiResult {
    Ok(created(state.store.create_offer(body.into_inner()).await?))
}

pub async fn update_offer(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<HomeScreenOfferInput>,
) -> ApiResult {
    let id = OfferId::new(id.into_inner());
    Ok(ok(state.store.update_offer(&id, body.into_inner()).await?))
}

pub async fn delete_offer(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult {
    let id = OfferId::new(id.into_inner());
    state.store.delete_offer(&id).await?;
    Ok(ok(deleted(id.as_str())))
}
