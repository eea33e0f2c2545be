//! Listing query parameters and sorting.

use crate::catalog::Product;
use crate::money::{Currency, Money};
use crate::search::{ProductFilter, SearchResults, DEFAULT_PER_PAGE, MAX_PER_PAGE};
use crate::CommerceError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Sort options for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    /// Sort by newest first.
    #[default]
    Newest,
    /// Sort by oldest first.
    Oldest,
    /// Sort by lowest effective price, low to high.
    PriceAsc,
    /// Sort by lowest effective price, high to low.
    PriceDesc,
    /// Sort by title A-Z.
    TitleAsc,
    /// Sort by title Z-A.
    TitleDesc,
}

impl SortOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Newest => "newest",
            SortOption::Oldest => "oldest",
            SortOption::PriceAsc => "price_asc",
            SortOption::PriceDesc => "price_desc",
            SortOption::TitleAsc => "title_asc",
            SortOption::TitleDesc => "title_desc",
        }
    }

    /// SQL ORDER BY clause. Price sorts fall back to newest here and are
    /// reordered in memory.
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOption::Oldest => "created_at ASC, id ASC",
            SortOption::TitleAsc => "LOWER(title) ASC, id ASC",
            SortOption::TitleDesc => "LOWER(title) DESC, id DESC",
            SortOption::Newest | SortOption::PriceAsc | SortOption::PriceDesc => {
                "created_at DESC, id DESC"
            }
        }
    }

    /// Whether the order can only be produced in memory.
    pub fn is_in_memory(&self) -> bool {
        matches!(self, SortOption::PriceAsc | SortOption::PriceDesc)
    }

    /// Sort products in place. The sort is stable.
    pub fn sort(&self, products: &mut [Product]) {
        products.sort_by(|a, b| self.compare(a, b));
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let price = |p: &Product| p.lowest_effective_price().map_or(i64::MAX, |m| m.amount_minor);
        match self {
            SortOption::Newest => b.created_at.cmp(&a.created_at),
            SortOption::Oldest => a.created_at.cmp(&b.created_at),
            SortOption::PriceAsc => price(a).cmp(&price(b)),
            SortOption::PriceDesc => price(b).cmp(&price(a)),
            SortOption::TitleAsc => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortOption::TitleDesc => b.title.to_lowercase().cmp(&a.title.to_lowercase()),
        }
    }
}

impl FromStr for SortOption {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "newest" => Ok(SortOption::Newest),
            "oldest" => Ok(SortOption::Oldest),
            "price_asc" => Ok(SortOption::PriceAsc),
            "price_desc" => Ok(SortOption::PriceDesc),
            "title_asc" => Ok(SortOption::TitleAsc),
            "title_desc" => Ok(SortOption::TitleDesc),
            other => Err(CommerceError::validation(format!(
                "Unknown sort option: {}",
                other
            ))),
        }
    }
}

/// Raw listing parameters as they arrive in a query string.
///
/// Prices are in major units.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub size: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub featured: Option<bool>,
    pub best_seller: Option<bool>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ProductQuery {
    /// Validate and convert into a search in the given currency.
    pub fn into_search(self, currency: Currency) -> Result<ProductSearch, CommerceError> {
        let price = |value: Option<f64>, label: &str| -> Result<Option<Money>, CommerceError> {
            match value {
                Some(v) if !v.is_finite() || v < 0.0 => Err(CommerceError::validation(format!(
                    "{} must be a non-negative number",
                    label
                ))),
                Some(v) => Ok(Some(Money::from_major(v, currency))),
                None => Ok(None),
            }
        };
        let min_price = price(self.min_price, "min_price")?;
        let max_price = price(self.max_price, "max_price")?;
        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min.amount_minor > max.amount_minor {
                return Err(CommerceError::validation(
                    "min_price cannot be greater than max_price",
                ));
            }
        }

        let sort = match self.sort.as_deref() {
            Some(s) => s.parse()?,
            None => SortOption::default(),
        };

        Ok(ProductSearch {
            filter: ProductFilter {
                category: self.category,
                subcategory: self.subcategory,
                size: self.size,
                min_price,
                max_price,
                featured: self.featured,
                best_seller: self.best_seller,
                text: self.q,
            },
            sort,
            page: self.page.unwrap_or(1).max(1),
            per_page: self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        })
    }
}

/// A validated product search.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSearch {
    pub filter: ProductFilter,
    pub sort: SortOption,
    pub page: i64,
    pub per_page: i64,
}

impl Default for ProductSearch {
    fn default() -> Self {
        Self {
            filter: ProductFilter::default(),
            sort: SortOption::default(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ProductSearch {
    /// Finish a search over rows already narrowed by [`ProductFilter::to_sql`].
    pub fn finish(&self, fetched: Vec<Product>) -> SearchResults<Product> {
        let mut matched: Vec<Product> = fetched
            .into_iter()
            .filter(|p| self.filter.matches_in_memory(p))
            .collect();
        if self.sort.is_in_memory() {
            self.sort.sort(&mut matched);
        }
        SearchResults::paginate(matched, self.page, self.per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{input, tier};
    use crate::ids::{CategoryId, SubCategoryId};

    fn fixtures() -> Vec<Product> {
        let mut ghee = input("Ghee", vec![tier("500ml", 400), tier("1l", 750)]);
        ghee.category_id = CategoryId::new("cat_dairy");
        ghee.discount = 10;
        ghee.is_best_seller = true;

        let mut paneer = input("Paneer", vec![tier("200g", 90)]);
        paneer.category_id = CategoryId::new("cat_dairy");
        paneer.subcategory_id = Some(SubCategoryId::new("sub_fresh"));
        paneer.description = "Soft fresh cottage cheese".into();

        let mut pickle = input("Mango Pickle", vec![tier("250g", 150), tier("500G", 280)]);
        pickle.category_id = CategoryId::new("cat_pickles");
        pickle.is_featured = true;

        [ghee, paneer, pickle]
            .into_iter()
            .enumerate()
            .map(|(i, inp)| {
                let slug = crate::slug::slugify(&inp.title);
                let mut p = Product::from_input(inp, slug).unwrap();
                p.created_at = 1_000 + i as i64;
                p
            })
            .collect()
    }

    fn titles(results: &SearchResults<Product>) -> Vec<&str> {
        results.items.iter().map(|p| p.title.as_str()).collect()
    }

    // The fixtures stand in for rows the SQL query already filtered and ordered.
    fn search(query: ProductQuery) -> SearchResults<Product> {
        query.into_search(Currency::INR).unwrap().finish(fixtures())
    }

    #[test]
    fn test_sql_sorts_keep_fetched_order() {
        let results = search(ProductQuery {
            sort: Some("title_desc".into()),
            ..Default::default()
        });
        assert_eq!(titles(&results), vec!["Ghee", "Paneer", "Mango Pickle"]);
    }

    #[test]
    fn test_price_range_selects_expected_subset() {
        // Ghee tiers cost 360 and 675 after discount.
        let results = search(ProductQuery {
            min_price: Some(300.0),
            max_price: Some(400.0),
            ..Default::default()
        });
        assert_eq!(titles(&results), vec!["Ghee"]);

        let results = search(ProductQuery {
            max_price: Some(150.0),
            sort: Some("price_asc".into()),
            ..Default::default()
        });
        assert_eq!(titles(&results), vec!["Paneer", "Mango Pickle"]);
    }

    #[test]
    fn test_size_filter_ignores_case() {
        let results = search(ProductQuery {
            size: Some("500g".into()),
            ..Default::default()
        });
        assert_eq!(titles(&results), vec!["Mango Pickle"]);

        let results = search(ProductQuery {
            size: Some("2kg".into()),
            ..Default::default()
        });
        assert!(results.items.is_empty());
    }

    #[test]
    fn test_price_sort_uses_lowest_effective_tier() {
        let results = search(ProductQuery {
            sort: Some("price_desc".into()),
            ..Default::default()
        });
        assert_eq!(titles(&results), vec!["Ghee", "Mango Pickle", "Paneer"]);
    }

    #[test]
    fn test_pagination_after_filtering() {
        let results = search(ProductQuery {
            sort: Some("price_asc".into()),
            page: Some(2),
            per_page: Some(2),
            ..Default::default()
        });
        assert_eq!(titles(&results), vec!["Ghee"]);
        assert_eq!(results.pagination.total, 3);
        assert!(!results.pagination.has_next);
    }

    #[test]
    fn test_query_validation() {
        let bad_sort = ProductQuery {
            sort: Some("random".into()),
            ..Default::default()
        };
        assert!(bad_sort.into_search(Currency::INR).is_err());

        let inverted = ProductQuery {
            min_price: Some(10.0),
            max_price: Some(5.0),
            ..Default::default()
        };
        assert!(inverted.into_search(Currency::INR).is_err());

        let negative = ProductQuery {
            min_price: Some(-1.0),
            ..Default::default()
        };
        assert!(negative.into_search(Currency::INR).is_err());

        let clamped = ProductQuery {
            per_page: Some(500),
            page: Some(0),
            ..Default::default()
        }
        .into_search(Currency::INR)
        .unwrap();
        assert_eq!(clamped.per_page, MAX_PER_PAGE);
        assert_eq!(clamped.page, 1);
    }
}
