//! Category types for product organization.
//!
//! The catalog is two levels deep: categories, each with an optional set
//! of subcategories whose slugs are unique within their parent.

use crate::ids::{CategoryId, SubCategoryId};
use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// A top-level product category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Category name.
    pub name: String,
    /// URL-friendly slug, unique across categories.
    pub slug: String,
    /// Category description.
    pub description: Option<String>,
    /// Category image URL.
    pub image_url: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Category {
    /// Build a category from validated input.
    pub fn from_input(input: CategoryInput, slug: String) -> Result<Self, CommerceError> {
        input.validate()?;
        let now = current_timestamp();
        Ok(Self {
            id: CategoryId::generate(),
            name: input.name.trim().to_string(),
            slug,
            description: input.description,
            image_url: input.image_url,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrite editable fields.
    pub fn apply(&mut self, input: CategoryInput, slug: String) -> Result<(), CommerceError> {
        input.validate()?;
        self.name = input.name.trim().to_string();
        self.slug = slug;
        self.description = input.description;
        self.image_url = input.image_url;
        self.updated_at = current_timestamp();
        Ok(())
    }
}

/// Create/update payload for a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CategoryInput {
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.name.trim().is_empty() {
            return Err(CommerceError::validation("Category name cannot be empty"));
        }
        Ok(())
    }
}

/// A subcategory nested under one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubCategory {
    /// Unique subcategory identifier.
    pub id: SubCategoryId,
    /// Owning category.
    pub category_id: CategoryId,
    /// Subcategory name.
    pub name: String,
    /// Slug, unique within the owning category.
    pub slug: String,
    /// Image URL.
    pub image_url: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl SubCategory {
    /// Build a subcategory from validated input.
    pub fn from_input(input: SubCategoryInput, slug: String) -> Result<Self, CommerceError> {
        input.validate()?;
        let now = current_timestamp();
        Ok(Self {
            id: SubCategoryId::generate(),
            category_id: input.category_id,
            name: input.name.trim().to_string(),
            slug,
            image_url: input.image_url,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrite editable fields, possibly moving it to another category.
    pub fn apply(&mut self, input: SubCategoryInput, slug: String) -> Result<(), CommerceError> {
        input.validate()?;
        self.category_id = input.category_id;
        self.name = input.name.trim().to_string();
        self.slug = slug;
        self.image_url = input.image_url;
        self.updated_at = current_timestamp();
        Ok(())
    }
}

/// Create/update payload for a subcategory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCategoryInput {
    pub category_id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl SubCategoryInput {
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.name.trim().is_empty() {
            return Err(CommerceError::validation("Subcategory name cannot be empty"));
        }
        if self.category_id.as_str().trim().is_empty() {
            return Err(CommerceError::validation("Subcategory needs a category"));
        }
        Ok(())
    }
}

/// A category together with its subcategories, as listed on the storefront.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryTree {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<SubCategory>,
}

impl CategoryTree {
    /// Group subcategories under their categories. Orphans are dropped.
    pub fn build(categories: Vec<Category>, subcategories: Vec<SubCategory>) -> Vec<Self> {
        let mut trees: Vec<Self> = categories
            .into_iter()
            .map(|category| Self {
                category,
                subcategories: Vec::new(),
            })
            .collect();

        for sub in subcategories {
            if let Some(tree) = trees.iter_mut().find(|t| t.category.id == sub.category_id) {
                tree.subcategories.push(sub);
            }
        }
        trees
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str) -> Category {
        Category::from_input(
            CategoryInput {
                name: name.to_string(),
                slug: None,
                description: None,
                image_url: None,
            },
            crate::slug::slugify(name),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_name_rejected() {
        let input = CategoryInput {
            name: "  ".into(),
            slug: None,
            description: None,
            image_url: None,
        };
        assert!(Category::from_input(input, "x".into()).is_err());
    }

    #[test]
    fn test_tree_groups_subcategories() {
        let pickles = category("Pickles");
        let oils = category("Oils");
        let sub = SubCategory::from_input(
            SubCategoryInput {
                category_id: pickles.id.clone(),
                name: "Mango".into(),
                slug: None,
                image_url: None,
            },
            "mango".into(),
        )
        .unwrap();
        let orphan = SubCategory::from_input(
            SubCategoryInput {
                category_id: CategoryId::new("gone"),
                name: "Lost".into(),
                slug: None,
                image_url: None,
            },
            "lost".into(),
        )
        .unwrap();

        let trees = CategoryTree::build(vec![pickles, oils], vec![sub, orphan]);
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].subcategories.len(), 1);
        assert_eq!(trees[0].subcategories[0].slug, "mango");
        assert!(trees[1].subcategories.is_empty());
    }

    #[test]
    fn test_tree_serializes_flat() {
        let tree = CategoryTree {
            category: category("Spices"),
            subcategories: vec![],
        };
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["slug"], "spices");
        assert!(json["subcategories"].is_array());
    }
}
