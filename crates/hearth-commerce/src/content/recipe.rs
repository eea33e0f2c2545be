//! Recipes that feature catalog products.

use crate::ids::{ProductId, RecipeId};
use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// A storefront recipe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub prep_minutes: Option<i64>,
    pub cook_minutes: Option<i64>,
    pub servings: Option<i64>,
    /// Products used in the recipe.
    pub product_ids: Vec<ProductId>,
    pub is_published: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Recipe {
    /// Build a recipe from validated input.
    pub fn from_input(input: RecipeInput, slug: String) -> Result<Self, CommerceError> {
        input.validate()?;
        let now = current_timestamp();
        Ok(Self {
            id: RecipeId::generate(),
            title: input.title.trim().to_string(),
            slug,
            description: input.description,
            image: input.image,
            ingredients: input.ingredients,
            steps: input.steps,
            prep_minutes: input.prep_minutes,
            cook_minutes: input.cook_minutes,
            servings: input.servings,
            product_ids: input.product_ids,
            is_published: input.is_published,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrite editable fields.
    pub fn apply(&mut self, input: RecipeInput, slug: String) -> Result<(), CommerceError> {
        input.validate()?;
        self.title = input.title.trim().to_string();
        self.slug = slug;
        self.description = input.description;
        self.image = input.image;
        self.ingredients = input.ingredients;
        self.steps = input.steps;
        self.prep_minutes = input.prep_minutes;
        self.cook_minutes = input.cook_minutes;
        self.servings = input.servings;
        self.product_ids = input.product_ids;
        self.is_published = input.is_published;
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Prep plus cook time, when either is known.
    pub fn total_minutes(&self) -> Option<i64> {
        match (self.prep_minutes, self.cook_minutes) {
            (None, None) => None,
            (prep, cook) => Some(prep.unwrap_or(0) + cook.unwrap_or(0)),
        }
    }
}

/// Create/update payload for a recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeInput {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub prep_minutes: Option<i64>,
    #[serde(default)]
    pub cook_minutes: Option<i64>,
    #[serde(default)]
    pub servings: Option<i64>,
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
    #[serde(default)]
    pub is_published: bool,
}

impl RecipeInput {
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.title.trim().is_empty() {
            return Err(CommerceError::validation("Recipe title cannot be empty"));
        }
        for (label, minutes) in [("prep", self.prep_minutes), ("cook", self.cook_minutes)] {
            if matches!(minutes, Some(m) if m < 0) {
                return Err(CommerceError::validation(format!(
                    "Recipe {} time cannot be negative",
                    label
                )));
            }
        }
        if matches!(self.servings, Some(s) if s < 1) {
            return Err(CommerceError::validation("Servings must be at least 1"));
        }
        Ok(())
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> RecipeInput {
        RecipeInput {
            title: "Ghee Rice".into(),
            slug: None,
            description: None,
            image: None,
            ingredients: vec!["Rice".into(), "Ghee".into()],
            steps: vec!["Cook".into()],
            prep_minutes: Some(10),
            cook_minutes: None,
            servings: Some(2),
            product_ids: vec![ProductId::new("prod_ghee")],
            is_published: true,
        }
    }

    #[test]
    fn test_total_minutes() {
        let recipe = Recipe::from_input(input(), "ghee-rice".into()).unwrap();
        assert_eq!(recipe.total_minutes(), Some(10));
    }

    #[test]
    fn test_validation() {
        let mut bad = input();
        bad.cook_minutes = Some(-5);
        assert!(bad.validate().is_err());

        let mut bad = input();
        bad.servings = Some(0);
        assert!(bad.validate().is_err());
    }
}
