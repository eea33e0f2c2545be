//! Product catalog module.
//!
//! Contains types for products, size tiers, categories, and subcategories.

mod category;
mod product;

pub use category::{Category, CategoryInput, CategoryTree, SubCategory, SubCategoryInput};
pub use product::{Product, ProductInput, SizeTier};

#[cfg(test)]
pub(crate) use product::tests as fixtures;
