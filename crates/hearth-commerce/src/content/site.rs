//! Site content rows: topbar messages, featured reviews and home offers.

use crate::ids::{OfferId, ProductId, ReviewId, TopbarId};
use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// A message in the announcement bar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Topbar {
    pub id: TopbarId,
    pub text: String,
    pub link: Option<String>,
    pub is_active: bool,
    /// Ascending display order.
    pub position: i64,
    pub created_at: i64,
}

impl Topbar {
    pub fn from_input(input: TopbarInput) -> Result<Self, CommerceError> {
        input.validate()?;
        Ok(Self {
            id: TopbarId::generate(),
            text: input.text.trim().to_string(),
            link: input.link,
            is_active: input.is_active,
            position: input.position,
            created_at: current_timestamp(),
        })
    }

    pub fn apply(&mut self, input: TopbarInput) -> Result<(), CommerceError> {
        input.validate()?;
        self.text = input.text.trim().to_string();
        self.link = input.link;
        self.is_active = input.is_active;
        self.position = input.position;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopbarInput {
    pub text: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub position: i64,
}

impl TopbarInput {
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.text.trim().is_empty() {
            return Err(CommerceError::validation("Topbar text cannot be empty"));
        }
        Ok(())
    }
}

/// A customer review shown on the home page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeaturedReview {
    pub id: ReviewId,
    pub customer_name: String,
    /// Star rating, 1 to 5.
    pub rating: u8,
    pub content: String,
    pub image: Option<String>,
    pub product_id: Option<ProductId>,
    pub is_active: bool,
    pub created_at: i64,
}

impl FeaturedReview {
    pub fn from_input(input: FeaturedReviewInput) -> Result<Self, CommerceError> {
        input.validate()?;
        Ok(Self {
            id: ReviewId::generate(),
            customer_name: input.customer_name.trim().to_string(),
            rating: input.rating as u8,
            content: input.content,
            image: input.image,
            product_id: input.product_id,
            is_active: input.is_active,
            created_at: current_timestamp(),
        })
    }

    pub fn apply(&mut self, input: FeaturedReviewInput) -> Result<(), CommerceError> {
        input.validate()?;
        self.customer_name = input.customer_name.trim().to_string();
        self.rating = input.rating as u8;
        self.content = input.content;
        self.image = input.image;
        self.product_id = input.product_id;
        self.is_active = input.is_active;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturedReviewInput {
    pub customer_name: String,
    pub rating: i64,
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl FeaturedReviewInput {
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.customer_name.trim().is_empty() {
            return Err(CommerceError::validation("Customer name cannot be empty"));
        }
        if !(1..=5).contains(&self.rating) {
            return Err(CommerceError::validation("Rating must be between 1 and 5"));
        }
        if self.content.trim().is_empty() {
            return Err(CommerceError::validation("Review content cannot be empty"));
        }
        Ok(())
    }
}

/// A banner on the home screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HomeScreenOffer {
    pub id: OfferId,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub link: Option<String>,
    pub is_active: bool,
    /// Ascending display order.
    pub position: i64,
    pub created_at: i64,
}

impl HomeScreenOffer {
    pub fn from_input(input: HomeScreenOfferInput) -> Result<Self, CommerceError> {
        input.validate()?;
        Ok(Self {
            id: OfferId::generate(),
            title: input.title.trim().to_string(),
            subtitle: input.subtitle,
            image_url: input.image_url,
            link: input.link,
            is_active: input.is_active,
            position: input.position,
            created_at: current_timestamp(),
        })
    }

    pub fn apply(&mut self, input: HomeScreenOfferInput) -> Result<(), CommerceError> {
        input.validate()?;
        self.title = input.title.trim().to_string();
        self.subtitle = input.subtitle;
        self.image_url = input.image_url;
        self.link = input.link;
        self.is_active = input.is_active;
        self.position = input.position;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeScreenOfferInput {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub position: i64,
}

impl HomeScreenOfferInput {
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.title.trim().is_empty() {
            return Err(CommerceError::validation("Offer title cannot be empty"));
        }
        if self.image_url.trim().is_empty() {
            return Err(CommerceError::validation("Offer image is required"));
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
