//! Public storefront routes.

mod account;
mod catalog;
mod checkout;
mod content;
mod payment;

use actix_web::web;

pub use payment::WEBHOOK_SIGNATURE_HEADER;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/products", web::get().to(catalog::list_products))
        .route("/products/{slug}", web::get().to(catalog::product))
        .route("/categories", web::get().to(catalog::categories))
        .route("/categories/{slug}", web::get().to(catalog::category))
        .route("/blogs", web::get().to(content::blogs))
        .route("/blogs/{slug}", web::get().to(content::blog))
        .route("/recipes", web::get().to(content::recipes))
        .route("/recipes/{slug}", web::get().to(content::recipe))
        .route("/banners", web::get().to(content::banners))
        .route("/topbar", web::get().to(content::topbar))
        .route("/reviews", web::get().to(content::reviews))
        .route("/coupons/validate", web::post().to(checkout::validate_coupon))
        .route("/checkout/quote", web::post().to(checkout::quote))
        .route("/payment/create-order", web::post().to(payment::create_order))
        .route("/payment/verify", web::post().to(payment::verify))
        .route("/payment/webhook", web::post().to(payment::webhook))
        .route("/auth/register", web::post().to(account::register))
        .route("/auth/login", web::post().to(account::login))
        .route("/auth/logout", web::post().to(account::logout))
        .route("/auth/me", web::get().to(account::me))
        .route("/orders", web::get().to(account::orders))
        .route("/orders/{id}", web::get().to(account::order));
}
