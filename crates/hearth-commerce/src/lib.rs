//! E-commerce domain types and logic for Hearth.
//!
//! This crate holds everything the storefront and admin apps agree on:
//!
//! - **Catalog**: products with size tiers, categories, subcategories
//! - **Checkout**: server-side cart pricing, shipping addresses, orders
//! - **Coupons**: validation rules and rejection reasons
//! - **Search**: listing filters, sorting and pagination
//! - **Content**: blog posts, recipes and home page rows
//!
//! With the `storage` feature, [`store::Store`] persists all of it through
//! `hearth-db`.
//!
//! # Example
//!
//! ```rust
//! use hearth_commerce::prelude::*;
//!
//! let totals = OrderTotals::compute(
//!     Money::new(100_000, Currency::INR),
//!     10,
//!     &PricingConfig::default(),
//! )
//! .unwrap();
//! assert!(totals.is_consistent());
//! println!("Total: {}", totals.grand_total.display());
//! ```

pub mod error;
pub mod ids;
pub mod money;
pub mod slug;

pub mod catalog;
pub mod checkout;
pub mod content;
pub mod coupon;
pub mod customer;
pub mod pricing;
pub mod search;

#[cfg(feature = "storage")]
pub mod store;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::slug::slugify;

    // Catalog
    pub use crate::catalog::{
        Category, CategoryInput, CategoryTree, Product, ProductInput, SizeTier, SubCategory,
        SubCategoryInput,
    };

    // Checkout
    pub use crate::checkout::{
        CartItem, Order, OrderItem, OrderStatus, PaymentDetails, Quote, ShippingAddress,
    };
    pub use crate::pricing::{OrderTotals, PricingConfig};

    // Coupons
    pub use crate::coupon::{Coupon, CouponCheck, CouponInput, CouponRejection};

    // Content
    pub use crate::content::{
        BlogPost, BlogPostInput, FeaturedReview, FeaturedReviewInput, HomeScreenOffer,
        HomeScreenOfferInput, Recipe, RecipeInput, Topbar, TopbarInput,
    };
    pub use crate::customer::CustomerAccount;

    // Search
    pub use crate::search::{Pagination, ProductQuery, ProductSearch, SearchResults, SortOption};

    #[cfg(feature = "storage")]
    pub use crate::store::Store;
}
