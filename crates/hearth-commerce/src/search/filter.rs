//! Product listing filters.
//!
//! Scalar filters compile to a SQL `WHERE` fragment. Sizes and prices are
//! array-valued, so they are checked in memory on the fetched rows.

use crate::catalog::Product;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Filters for a product listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductFilter {
    /// Category id or slug.
    pub category: Option<String>,
    /// Subcategory id or slug.
    pub subcategory: Option<String>,
    /// Size label, matched ignoring case.
    pub size: Option<String>,
    /// Inclusive lower bound on any tier's effective price.
    pub min_price: Option<Money>,
    /// Inclusive upper bound on any tier's effective price.
    pub max_price: Option<Money>,
    /// Featured flag.
    pub featured: Option<bool>,
    /// Best-seller flag.
    pub best_seller: Option<bool>,
    /// Case-insensitive text over title and description.
    pub text: Option<String>,
}

impl ProductFilter {
    /// Build the SQL WHERE clause for the scalar filters.
    ///
    /// Column names refer to the `products` table. Returns `1=1` when no
    /// scalar filter is set.
    pub fn to_sql(&self) -> (String, Vec<String>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        if let Some(category) = non_empty(&self.category) {
            clauses.push(
                "category_id IN (SELECT id FROM categories WHERE id = ? OR slug = ?)".to_string(),
            );
            values.push(category.to_string());
            values.push(category.to_lowercase());
        }
        if let Some(subcategory) = non_empty(&self.subcategory) {
            values.push(subcategory.to_string());
            values.push(subcategory.to_lowercase());
            // Subcategory slugs are unique only within their category.
            match non_empty(&self.category) {
                Some(category) => {
                    clauses.push(
                        "subcategory_id IN (SELECT id FROM subcategories WHERE (id = ? OR slug = ?) \
                         AND category_id IN (SELECT id FROM categories WHERE id = ? OR slug = ?))"
                            .to_string(),
                    );
                    values.push(category.to_string());
                    values.push(category.to_lowercase());
                }
                None => clauses.push(
                    "subcategory_id IN (SELECT id FROM subcategories WHERE id = ? OR slug = ?)"
                        .to_string(),
                ),
            }
        }
        if let Some(featured) = self.featured {
            clauses.push(format!("is_featured = {}", featured as i32));
        }
        if let Some(best_seller) = self.best_seller {
            clauses.push(format!("is_best_seller = {}", best_seller as i32));
        }
        if let Some(text) = non_empty(&self.text) {
            let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
            clauses.push(
                "(LOWER(title) LIKE ? ESCAPE '\\' OR LOWER(description) LIKE ? ESCAPE '\\')"
                    .to_string(),
            );
            values.push(pattern.clone());
            values.push(pattern);
        }

        if clauses.is_empty() {
            return ("1=1".to_string(), values);
        }
        (clauses.join(" AND "), values)
    }

    /// Filters that run after the SQL query.
    pub fn matches_in_memory(&self, product: &Product) -> bool {
        if let Some(size) = non_empty(&self.size) {
            if !product.has_size(size) {
                return false;
            }
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            return product.any_tier_priced_within(self.min_price, self.max_price);
        }
        true
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_empty_filter_sql() {
        let (sql, values) = ProductFilter::default().to_sql();
        assert_eq!(sql, "1=1");
        assert!(values.is_empty());
    }

    #[test]
    fn test_scalar_filters_compile_to_sql() {
        let filter = ProductFilter {
            category: Some("Pickles".into()),
            featured: Some(true),
            text: Some("Mango".into()),
            // In-memory only.
            size: Some("250g".into()),
            min_price: Some(Money::new(100, Currency::INR)),
            ..Default::default()
        };
        let (sql, values) = filter.to_sql();
        assert!(sql.contains("category_id IN"));
        assert!(sql.contains("is_featured = 1"));
        assert!(sql.contains("LIKE"));
        assert!(!sql.contains("price"));
        assert_eq!(values, vec!["Pickles", "pickles", "%mango%", "%mango%"]);
    }

    #[test]
    fn test_subcategory_is_scoped_by_category() {
        let filter = ProductFilter {
            category: Some("veg".into()),
            subcategory: Some("Pickles".into()),
            ..Default::default()
        };
        let (sql, values) = filter.to_sql();
        assert_eq!(sql.matches("FROM categories").count(), 2);
        assert_eq!(
            values,
            vec!["veg", "veg", "Pickles", "pickles", "veg", "veg"]
        );
    }

    #[test]
    fn test_like_wildcards_are_escaped() {
        let filter = ProductFilter {
            text: Some("100%_".into()),
            ..Default::default()
        };
        let (_, values) = filter.to_sql();
        assert_eq!(values[0], "%100\\%\\_%");
    }
}
