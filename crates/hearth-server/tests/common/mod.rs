//! Shared fixtures: fake gateway and image host, seeded catalog, app setup.
#![allow(dead_code, unused_macros)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use hearth_auth::{AdminGate, PasswordHasher};
use hearth_cache::Cache;
use hearth_commerce::catalog::{Category, CategoryInput, Product, ProductInput, SizeTier};
use hearth_commerce::coupon::{Coupon, CouponInput};
use hearth_commerce::pricing::PricingConfig;
use hearth_commerce::store::Store;
use hearth_commerce::{Currency, Money};
use hearth_gateway::signature::hmac_sha256_hex;
use hearth_gateway::{
    CreateGatewayOrder, GatewayError, GatewayOrder, ImageHost, PaymentGateway, UploadFile,
    UploadedImage,
};
use hearth_server::cookies::CookieSettings;
use hearth_server::state::{customer_sessions, AppState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ADMIN_PASSWORD: &str = "letmein-123";
pub const KEY_ID: &str = "rzp_test_key";
pub const KEY_SECRET: &str = "rzp_test_secret";
pub const WEBHOOK_SECRET: &str = "whsec_test";

/// Payment gateway double that signs like the real one.
#[derive(Default)]
pub struct FakeGateway {
    pub fail: bool,
    pub created: Mutex<Vec<CreateGatewayOrder>>,
    counter: AtomicUsize,
}

impl FakeGateway {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    fn key_id(&self) -> &str {
        KEY_ID
    }

    async fn create_order(&self, order: CreateGatewayOrder) -> Result<GatewayOrder, GatewayError> {
        if self.fail {
            return Err(GatewayError::Upstream {
                service: "Payment gateway",
                status: 500,
                message: "gateway down".into(),
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let created = GatewayOrder {
            id: format!("order_test_{n}"),
            amount: order.amount.amount_minor,
            currency: order.amount.currency.code().to_string(),
            receipt: Some(order.receipt.clone()),
            status: Some("created".into()),
        };
        self.created.lock().unwrap().push(order);
        Ok(created)
    }

    fn verify_payment_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        hearth_gateway::signature::verify_hmac_sha256_hex(
            KEY_SECRET.as_bytes(),
            format!("{order_id}|{payment_id}").as_bytes(),
            signature,
        )
    }

    fn verify_webhook(&self, body: &[u8], signature: &str) -> bool {
        hearth_gateway::signature::verify_hmac_sha256_hex(WEBHOOK_SECRET.as_bytes(), body, signature)
    }
}

/// Image host double. `missing` is the one public id it does not know.
#[derive(Default)]
pub struct FakeImageHost;

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload(&self, file: UploadFile) -> Result<UploadedImage, GatewayError> {
        Ok(UploadedImage {
            url: format!("https://images.test/hearth/{}", file.filename),
            public_id: format!("hearth/{}", file.filename),
            width: Some(800),
            height: Some(600),
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), GatewayError> {
        if public_id == "missing" {
            return Err(GatewayError::NotFound(public_id.to_string()));
        }
        Ok(())
    }
}

pub async fn state() -> AppState {
    state_with(FakeGateway::default()).await
}

pub async fn state_with(gateway: FakeGateway) -> AppState {
    let cache = Cache::new();
    AppState {
        store: Store::in_memory().await.unwrap(),
        pricing: PricingConfig::default(),
        admin: AdminGate::new(ADMIN_PASSWORD, cache.clone()).unwrap(),
        customers: customer_sessions(cache.clone()),
        passwords: PasswordHasher::new(),
        payments: Arc::new(gateway),
        images: Arc::new(FakeImageHost),
        cookies: CookieSettings::default(),
        cache,
    }
}

pub fn inr(major: i64) -> Money {
    Money::new(major * 100, Currency::INR)
}

pub fn product_input(title: &str, category: &Category, tiers: &[(&str, i64)]) -> ProductInput {
    ProductInput {
        title: title.to_string(),
        slug: None,
        description: format!("{title} from the farm"),
        images: vec![],
        sizes: tiers
            .iter()
            .map(|(size, price)| SizeTier {
                size: size.to_string(),
                price: inr(*price),
            })
            .collect(),
        category_id: category.id.clone(),
        subcategory_id: None,
        discount: 0,
        is_featured: false,
        is_best_seller: false,
        in_stock: true,
    }
}

pub async fn category(store: &Store, name: &str) -> Category {
    store
        .create_category(CategoryInput {
            name: name.to_string(),
            slug: None,
            description: None,
            image_url: None,
        })
        .await
        .unwrap()
}

/// Two categories and four products:
/// ghee (500ml 400, 1l 750), tallow (1kg 300), turmeric (100g 120, featured),
/// chilli (100g 90, 90% off list price 900).
pub async fn seed_catalog(store: &Store) -> Vec<Product> {
    let dairy = category(store, "Dairy").await;
    let spices = category(store, "Spices").await;

    let ghee = product_input("Ghee", &dairy, &[("500ml", 400), ("1l", 750)]);
    let tallow = product_input("Tallow", &dairy, &[("1kg", 300)]);
    let mut turmeric = product_input("Turmeric", &spices, &[("100g", 120)]);
    turmeric.is_featured = true;
    let mut chilli = product_input("Chilli", &spices, &[("100g", 900)]);
    chilli.discount = 90;

    let mut products = Vec::new();
    for input in [ghee, tallow, turmeric, chilli] {
        products.push(store.create_product(input).await.unwrap());
    }
    products
}

pub fn coupon_input(code: &str, percent: i64) -> CouponInput {
    CouponInput {
        code: code.to_string(),
        discount_percent: percent,
        min_order_value_minor: 0,
        start_date: Utc::now() - ChronoDuration::days(1),
        end_date: Utc::now() + ChronoDuration::days(30),
        max_user_count: None,
        one_time_per_user: false,
        is_active: true,
    }
}

pub async fn coupon(store: &Store, input: CouponInput) -> Coupon {
    store.create_coupon(input, Currency::INR).await.unwrap()
}

pub fn payment_signature(gateway_order_id: &str, payment_id: &str) -> String {
    hmac_sha256_hex(KEY_SECRET.as_bytes(), format!("{gateway_order_id}|{payment_id}").as_bytes()).unwrap()
}

pub fn webhook_signature(body: &str) -> String {
    hmac_sha256_hex(WEBHOOK_SECRET.as_bytes(), body.as_bytes()).unwrap()
}

pub fn address() -> serde_json::Value {
    serde_json::json!({
        "full_name": "Asha Rao",
        "phone": "+91 98765 43210",
        "line1": "12 Temple Street",
        "city": "Mysuru",
        "state": "Karnataka",
        "postal_code": "570001"
    })
}

/// Start the full route table over `state`.
macro_rules! app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .configure(hearth_server::routes::configure),
        )
        .await
    };
}

/// Cookie named `$name` set by a response.
macro_rules! response_cookie {
    ($resp:expr, $name:expr) => {
        $resp
            .response()
            .cookies()
            .find(|c| c.name() == $name)
            .map(|c| c.into_owned())
    };
}

/// Log in to the admin panel and return the session cookie.
macro_rules! admin_cookie {
    ($app:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/api/admin/login")
            .set_json(serde_json::json!({ "password": common::ADMIN_PASSWORD }))
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
        response_cookie!(resp, hearth_server::cookies::ADMIN_SESSION_COOKIE).unwrap()
    }};
}
