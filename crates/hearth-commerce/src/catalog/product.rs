//! Product and size-tier types.

use crate::ids::{CategoryId, ProductId, SubCategoryId};
use crate::money::{Currency, Money};
use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// One purchasable size of a product with its list price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SizeTier {
    /// Size label shown to customers (e.g. "250g").
    pub size: String,
    /// Price before the product discount.
    pub price: Money,
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// URL-friendly slug (unique).
    pub slug: String,
    /// Full description.
    pub description: String,
    /// Image URLs, first one is the cover.
    pub images: Vec<String>,
    /// Available sizes. Never empty.
    pub sizes: Vec<SizeTier>,
    /// Parent category.
    pub category_id: CategoryId,
    /// Optional subcategory within the category.
    pub subcategory_id: Option<SubCategoryId>,
    /// Discount percent applied to every tier (0-100).
    pub discount: u8,
    /// Shown in the featured strip.
    pub is_featured: bool,
    /// Shown in the best-seller strip.
    pub is_best_seller: bool,
    /// Whether the product can be ordered.
    pub in_stock: bool,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Product {
    /// Build a product from validated input.
    pub fn from_input(input: ProductInput, slug: String) -> Result<Self, CommerceError> {
        input.validate()?;
        let now = current_timestamp();
        Ok(Self {
            id: ProductId::generate(),
            title: input.title.trim().to_string(),
            slug,
            description: input.description,
            images: input.images,
            sizes: input.sizes,
            category_id: input.category_id,
            subcategory_id: input.subcategory_id,
            discount: input.discount as u8,
            is_featured: input.is_featured,
            is_best_seller: input.is_best_seller,
            in_stock: input.in_stock,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrite every editable field from validated input. The id and
    /// creation time are kept.
    pub fn apply(&mut self, input: ProductInput, slug: String) -> Result<(), CommerceError> {
        input.validate()?;
        self.title = input.title.trim().to_string();
        self.slug = slug;
        self.description = input.description;
        self.images = input.images;
        self.sizes = input.sizes;
        self.category_id = input.category_id;
        self.subcategory_id = input.subcategory_id;
        self.discount = input.discount as u8;
        self.is_featured = input.is_featured;
        self.is_best_seller = input.is_best_seller;
        self.in_stock = input.in_stock;
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// The currency the product is priced in.
    pub fn currency(&self) -> Currency {
        self.sizes
            .first()
            .map(|t| t.price.currency)
            .unwrap_or_default()
    }

    /// Price of a tier after the product discount.
    pub fn effective_price(&self, tier: &SizeTier) -> Money {
        let off = tier.price.percentage(self.discount as f64);
        Money::new(tier.price.amount_minor - off.amount_minor, tier.price.currency)
    }

    /// Lowest post-discount price across all tiers.
    pub fn lowest_effective_price(&self) -> Option<Money> {
        self.sizes
            .iter()
            .map(|t| self.effective_price(t))
            .min_by_key(|m| m.amount_minor)
    }

    /// Find a tier by label, ignoring case.
    pub fn tier(&self, size: &str) -> Option<&SizeTier> {
        let size = size.trim();
        self.sizes.iter().find(|t| t.size.eq_ignore_ascii_case(size))
    }

    /// Whether the product is offered in the given size.
    pub fn has_size(&self, size: &str) -> bool {
        self.tier(size).is_some()
    }

    /// Whether any tier's effective price falls inside the inclusive bounds.
    pub fn any_tier_priced_within(&self, min: Option<Money>, max: Option<Money>) -> bool {
        self.sizes.iter().any(|tier| {
            let price = self.effective_price(tier).amount_minor;
            min.map_or(true, |m| price >= m.amount_minor)
                && max.map_or(true, |m| price <= m.amount_minor)
        })
    }

    /// Cover image, if any.
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Create/update payload for a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInput {
    pub title: String,
    /// Explicit slug. Derived from the title when absent.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub sizes: Vec<SizeTier>,
    pub category_id: CategoryId,
    #[serde(default)]
    pub subcategory_id: Option<SubCategoryId>,
    #[serde(default)]
    pub discount: i64,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_best_seller: bool,
    #[serde(default = "default_true")]
    pub in_stock: bool,
}

impl ProductInput {
    /// Check the product invariants.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.title.trim().is_empty() {
            return Err(CommerceError::validation("Product title cannot be empty"));
        }
        if !(0..=100).contains(&self.discount) {
            return Err(CommerceError::validation("Discount must be between 0 and 100"));
        }
        if self.sizes.is_empty() {
            return Err(CommerceError::validation(
                "Product must have at least one size",
            ));
        }

        let currency = self.sizes[0].price.currency;
        for (i, tier) in self.sizes.iter().enumerate() {
            if tier.size.trim().is_empty() {
                return Err(CommerceError::validation("Size label cannot be empty"));
            }
            if !tier.price.is_positive() {
                return Err(CommerceError::validation(format!(
                    "Price for size {} must be greater than 0",
                    tier.size
                )));
            }
            if tier.price.currency != currency {
                return Err(CommerceError::validation(
                    "All sizes must be priced in the same currency",
                ));
            }
            if self.sizes[..i]
                .iter()
                .any(|t| t.size.trim().eq_ignore_ascii_case(tier.size.trim()))
            {
                return Err(CommerceError::validation(format!(
                    "Duplicate size {}",
                    tier.size
                )));
            }
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
