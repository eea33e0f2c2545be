//! Admin panel routes.

mod catalog;
mod content;
mod coupons;
mod orders;
mod session;
mod upload;

use actix_web::web;
use serde_json::json;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(session::login))
        .route("/logout", web::post().to(session::logout))
        .route("/session", web::get().to(session::status))
        .service(
            web::resource("/products")
                .route(web::get().to(catalog::list_products))
                .route(web::post().to(catalog::create_product)),
        )
        .service(
            web::resource("/products/{id}")
                .route(web::get().to(catalog::product))
                .route(web::put().to(catalog::update_product))
                .route(web::delete().to(catalog::delete_product)),
        )
        .service(
            web::resource("/categories")
                .route(web::get().to(catalog::list_categories))
                .route(web::post().to(catalog::create_category)),
        )
        .service(
            web::resource("/categories/{id}")
                .route(web::put().to(catalog::update_category))
                .route(web::delete().to(catalog::delete_category)),
        )
        .service(
            web::resource("/subcategories")
                .route(web::get().to(catalog::list_subcategories))
                .route(web::post().to(catalog::create_subcategory)),
        )
        .service(
            web::resource("/subcategories/{id}")
                .route(web::put().to(catalog::update_subcategory))
                .route(web::delete().to(catalog::delete_subcategory)),
        )
        .service(
            web::resource("/coupons")
                .route(web::get().to(coupons::list))
                .route(web::post().to(coupons::create)),
        )
        .service(
            web::resource("/coupons/{id}")
                .route(web::put().to(coupons::update))
                .route(web::delete().to(coupons::delete)),
        )
        .service(
            web::resource("/blogs")
                .route(web::get().to(content::list_blogs))
                .route(web::post().to(content::create_blog)),
        )
        .service(
            web::resource("/blogs/{id}")
                .route(web::get().to(content::blog))
                .route(web::put().to(content::update_blog))
                .route(web::delete().to(content::delete_blog)),
        )
        .service(
            web::resource("/recipes")
                .route(web::get().to(content::list_recipes))
                .route(web::post().to(content::create_recipe)),
        )
        .service(
            web::resource("/recipes/{id}")
                .route(web::get().to(content::recipe))
                .route(web::put().to(content::update_recipe))
                .route(web::delete().to(content::delete_recipe)),
        )
        .service(
            web::resource("/topbar")
                .route(web::get().to(content::list_topbar))
                .route(web::post().to(content::create_topbar)),
        )
        .service(
            web::resource("/topbar/{id}")
                .route(web::put().to(content::update_topbar))
                .route(web::delete().to(content::delete_topbar)),
        )
        .service(
            web::resource("/reviews")
                .route(web::get().to(content::list_reviews))
                .route(web::post().to(content::create_review)),
        )
        .service(
            web::resource("/reviews/{id}")
                .route(web::put().to(content::update_review))
                .route(web::delete().to(content::delete_review)),
        )
        .service(
            web::resource("/offers")
                .route(web::get().to(content::list_offers))
                .route(web::post().to(content::create_offer)),
        )
        .service(
            web::resource("/offers/{id}")
                .route(web::put().to(content::update_offer))
                .route(web::delete().to(content::delete_offer)),
        )
        .route("/orders", web::get().to(orders::list))
        .route("/orders/{id}", web::get().to(orders::get))
        .route("/orders/{id}/status", web::patch().to(orders::update_status))
        .route("/upload", web::post().to(upload::upload))
        .route("/upload/{public_id:.*}", web::delete().to(upload::destroy));
}

/// Body returned by every admin delete.
fn deleted(id: &str) -> serde_json::Value {
    json!({ "deleted": id })
}
