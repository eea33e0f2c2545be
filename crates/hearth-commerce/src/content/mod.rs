//! Editorial content: blog posts, recipes and home page rows.

mod blog;
mod recipe;
mod site;

pub use blog::{BlogPost, BlogPostInput};
pub use recipe::{Recipe, RecipeInput};
pub use site::{
    FeaturedReview, FeaturedReviewInput, HomeScreenOffer, HomeScreenOfferInput, Topbar,
    TopbarInput,
};
