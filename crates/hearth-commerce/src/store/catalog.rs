//! Categories, subcategories and products.

use super::Store;
use crate::catalog::{
    Category, CategoryInput, CategoryTree, Product, ProductInput, SubCategory, SubCategoryInput,
};
use crate::ids::{CategoryId, ProductId, SubCategoryId};
use crate::search::{ProductSearch, SearchResults};
use crate::CommerceError;
use hearth_db::{params, Row, Value};

const PRODUCT_COLUMNS: &str = "id, title, slug, description, images, sizes, category_id, \
     subcategory_id, discount, is_featured, is_best_seller, in_stock, created_at, updated_at";

impl Store {
    // ---- categories ----

    pub async fn list_categories(&self) -> Result<Vec<Category>, CommerceError> {
        let result = self
            .db
            .query("SELECT * FROM categories ORDER BY name COLLATE NOCASE", params![])
            .await?;
        result.iter().map(category_from_row).collect()
    }

    /// Categories with their subcategories nested.
    pub async fn category_tree(&self) -> Result<Vec<CategoryTree>, CommerceError> {
        let categories = self.list_categories().await?;
        let subcategories = self.list_subcategories(None).await?;
        Ok(CategoryTree::build(categories, subcategories))
    }

    /// Look up a category by id or slug.
    pub async fn find_category(&self, key: &str) -> Result<Category, CommerceError> {
        let row = self
            .db
            .query_row(
                "SELECT * FROM categories WHERE id = ? OR slug = ? LIMIT 1",
                params![key, key.to_lowercase()],
            )
            .await?
            .ok_or_else(|| CommerceError::not_found("Category", key))?;
        category_from_row(&row)
    }

    pub async fn create_category(&self, input: CategoryInput) -> Result<Category, CommerceError> {
        input.validate()?;
        let slug = self
            .allocate_slug("categories", None, input.slug.as_deref(), &input.name, None)
            .await?;
        let category = Category::from_input(input, slug)?;
        self.db
            .execute(
                "INSERT INTO categories (id, name, slug, description, image_url, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    category.id.as_str(),
                    &category.name,
                    &category.slug,
                    category.description.clone(),
                    category.image_url.clone(),
                    category.created_at,
                    category.updated_at
                ],
            )
            .await?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: &CategoryId,
        input: CategoryInput,
    ) -> Result<Category, CommerceError> {
        input.validate()?;
        let mut category = self.find_category(id.as_str()).await?;
        let slug = self
            .allocate_slug(
                "categories",
                None,
                input.slug.as_deref(),
                &input.name,
                Some(category.id.as_str()),
            )
            .await?;
        category.apply(input, slug)?;
        self.db
            .execute(
                "UPDATE categories SET name = ?, slug = ?, description = ?, image_url = ?, updated_at = ? \
                 WHERE id = ?",
                params![
                    &category.name,
                    &category.slug,
                    category.description.clone(),
                    category.image_url.clone(),
                    category.updated_at,
                    category.id.as_str()
                ],
            )
            .await?;
        Ok(category)
    }

    /// Delete a category and its subcategories.
    ///
    /// Refused with a conflict while any product still references it.
    pub async fn delete_category(&self, id: &CategoryId) -> Result<(), CommerceError> {
        let in_use = self
            .count("SELECT COUNT(*) AS n FROM products WHERE category_id = ?", id.as_str())
            .await?;
        if in_use > 0 {
            return Err(CommerceError::Conflict(format!(
                "Category still has {} product(s)",
                in_use
            )));
        }
        let deleted = self
            .db
            .execute("DELETE FROM categories WHERE id = ?", params![id.as_str()])
            .await?;
        if deleted == 0 {
            return Err(CommerceError::not_found("Category", id.as_str()));
        }
        tracing::info!(category_id = %id, "category deleted");
        Ok(())
    }

    // ---- subcategories ----

    pub async fn list_subcategories(
        &self,
        category: Option<&CategoryId>,
    ) -> Result<Vec<SubCategory>, CommerceError> {
        let result = match category {
            Some(id) => {
                self.db
                    .query(
                        "SELECT * FROM subcategories WHERE category_id = ? ORDER BY name COLLATE NOCASE",
                        params![id.as_str()],
                    )
                    .await?
            }
            None => {
                self.db
                    .query("SELECT * FROM subcategories ORDER BY name COLLATE NOCASE", params![])
                    .await?
            }
        };
        result.iter().map(subcategory_from_row).collect()
    }

    pub async fn get_subcategory(&self, id: &SubCategoryId) -> Result<SubCategory, CommerceError> {
        let row = self
            .db
            .query_row("SELECT * FROM subcategories WHERE id = ?", params![id.as_str()])
            .await?
            .ok_or_else(|| CommerceError::not_found("Subcategory", id.as_str()))?;
        subcategory_from_row(&row)
    }

    pub async fn create_subcategory(
        &self,
        input: SubCategoryInput,
    ) -> Result<SubCategory, CommerceError> {
        input.validate()?;
        let parent = self.find_category(input.category_id.as_str()).await?;
        let slug = self
            .allocate_slug(
                "subcategories",
                Some(("category_id", parent.id.as_str())),
                input.slug.as_deref(),
                &input.name,
                None,
            )
            .await?;
        let mut input = input;
        input.category_id = parent.id;
        let sub = SubCategory::from_input(input, slug)?;
        self.db
            .execute(
                "INSERT INTO subcategories (id, category_id, name, slug, image_url, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    sub.id.as_str(),
                    sub.category_id.as_str(),
                    &sub.name,
                    &sub.slug,
                    sub.image_url.clone(),
                    sub.created_at,
                    sub.updated_at
                ],
            )
            .await?;
        tracing::info!(subcategory_id = %sub.id, category_id = %sub.category_id, "subcategory created");
        Ok(sub)
    }

    pub async fn update_subcategory(
        &self,
        id: &SubCategoryId,
        input: SubCategoryInput,
    ) -> Result<SubCategory, CommerceError> {
        input.validate()?;
        let mut sub = self.get_subcategory(id).await?;
        let parent = self.find_category(input.category_id.as_str()).await?;
        let slug = self
            .allocate_slug(
                "subcategories",
                Some(("category_id", parent.id.as_str())),
                input.slug.as_deref(),
                &input.name,
                Some(sub.id.as_str()),
            )
            .await?;
        let mut input = input;
        input.category_id = parent.id;
        sub.apply(input, slug)?;
        self.db
            .execute(
                "UPDATE subcategories SET category_id = ?, name = ?, slug = ?, image_url = ?, updated_at = ? \
                 WHERE id = ?",
                params![
                    sub.category_id.as_str(),
                    &sub.name,
                    &sub.slug,
                    sub.image_url.clone(),
                    sub.updated_at,
                    sub.id.as_str()
                ],
            )
            .await?;
        Ok(sub)
    }

    /// Delete a subcategory. Products that used it keep their category.
    pub async fn delete_subcategory(&self, id: &SubCategoryId) -> Result<(), CommerceError> {
        let deleted = self
            .db
            .execute("DELETE FROM subcategories WHERE id = ?", params![id.as_str()])
            .await?;
        if deleted == 0 {
            return Err(CommerceError::not_found("Subcategory", id.as_str()));
        }
        Ok(())
    }

    // ---- products ----

    pub async fn create_product(&self, input: ProductInput) -> Result<Product, CommerceError> {
        input.validate()?;
        let input = self.resolve_product_refs(input).await?;
        let slug = self
            .allocate_slug("products", None, input.slug.as_deref(), &input.title, None)
            .await?;
        let product = Product::from_input(input, slug)?;
        self.db
            .execute(
                &format!(
                    "INSERT INTO products ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    PRODUCT_COLUMNS
                ),
                &product_params(&product)?,
            )
            .await?;
        tracing::info!(product_id = %product.id, slug = %product.slug, "product created");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: &ProductId,
        input: ProductInput,
    ) -> Result<Product, CommerceError> {
        input.validate()?;
        let mut product = self.get_product(id).await?;
        let input = self.resolve_product_refs(input).await?;
        let slug = self
            .allocate_slug(
                "products",
                None,
                input.slug.as_deref(),
                &input.title,
                Some(product.id.as_str()),
            )
            .await?;
        product.apply(input, slug)?;
        self.db
            .execute(
                "UPDATE products SET title = ?, slug = ?, description = ?, images = ?, sizes = ?, \
                 category_id = ?, subcategory_id = ?, discount = ?, is_featured = ?, \
                 is_best_seller = ?, in_stock = ?, updated_at = ? WHERE id = ?",
                params![
                    &product.title,
                    &product.slug,
                    &product.description,
                    Value::json(&product.images)?,
                    Value::json(&product.sizes)?,
                    product.category_id.as_str(),
                    product.subcategory_id.as_ref().map(|s| s.as_str().to_string()),
                    product.discount as i64,
                    product.is_featured,
                    product.is_best_seller,
                    product.in_stock,
                    product.updated_at,
                    product.id.as_str()
                ],
            )
            .await?;
        Ok(product)
    }

    pub async fn delete_product(&self, id: &ProductId) -> Result<(), CommerceError> {
        let deleted = self
            .db
            .execute("DELETE FROM products WHERE id = ?", params![id.as_str()])
            .await?;
        if deleted == 0 {
            return Err(CommerceError::not_found("Product", id.as_str()));
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    pub async fn get_product(&self, id: &ProductId) -> Result<Product, CommerceError> {
        let row = self
            .db
            .query_row(
                &format!("SELECT {} FROM products WHERE id = ?", PRODUCT_COLUMNS),
                params![id.as_str()],
            )
            .await?
            .ok_or_else(|| CommerceError::not_found("Product", id.as_str()))?;
        product_from_row(&row)
    }

    pub async fn product_by_slug(&self, slug: &str) -> Result<Product, CommerceError> {
        let row = self
            .db
            .query_row(
                &format!("SELECT {} FROM products WHERE slug = ?", PRODUCT_COLUMNS),
                params![slug.to_lowercase()],
            )
            .await?
            .ok_or_else(|| CommerceError::not_found("Product", slug))?;
        product_from_row(&row)
    }

    /// Load the given products. Unknown ids are skipped.
    pub async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, CommerceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let params: Vec<Value> = ids.iter().map(|id| Value::from(id.as_str())).collect();
        let result = self
            .db
            .query(
                &format!(
                    "SELECT {} FROM products WHERE id IN ({})",
                    PRODUCT_COLUMNS, placeholders
                ),
                &params,
            )
            .await?;
        result.iter().map(product_from_row).collect()
    }

    /// Filter, sort and paginate products.
    ///
    /// Scalar filters run in SQL; sizes, prices and price sorts run over the
    /// fetched rows before the page is cut.
    pub async fn search_products(
        &self,
        search: &ProductSearch,
    ) -> Result<SearchResults<Product>, CommerceError> {
        let (where_clause, values) = search.filter.to_sql();
        let sql = format!(
            "SELECT {} FROM products WHERE {} ORDER BY {}",
            PRODUCT_COLUMNS,
            where_clause,
            search.sort.to_sql()
        );
        let params: Vec<Value> = values.into_iter().map(Value::from).collect();
        let fetched = self
            .db
            .query(&sql, &params)
            .await?
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(fetched = fetched.len(), sort = search.sort.as_str(), "product search");
        Ok(search.finish(fetched))
    }

    /// Replace category and subcategory keys with ids, checking they exist
    /// and belong together.
    async fn resolve_product_refs(&self, mut input: ProductInput) -> Result<ProductInput, CommerceError> {
        let category = self.find_category(input.category_id.as_str()).await?;
        if let Some(sub_id) = input.subcategory_id.take() {
            let sub = self.get_subcategory(&sub_id).await?;
            if sub.category_id != category.id {
                return Err(CommerceError::validation(
                    "Subcategory does not belong to the product's category",
                ));
            }
            input.subcategory_id = Some(sub.id);
        }
        input.category_id = category.id;
        Ok(input)
    }

    pub(crate) async fn count(&self, sql: &str, key: &str) -> Result<i64, CommerceError> {
        let row = self.db.query_row(sql, params![key]).await?;
        Ok(match row {
            Some(row) => row.integer("n")?,
            None => 0,
        })
    }
}

fn product_params(product: &Product) -> Result<Vec<Value>, CommerceError> {
    Ok(vec![
        Value::from(product.id.as_str()),
        Value::from(&product.title),
        Value::from(&product.slug),
        Value::from(&product.description),
        Value::json(&product.images)?,
        Value::json(&product.sizes)?,
        Value::from(product.category_id.as_str()),
        Value::from(product.subcategory_id.as_ref().map(|s| s.as_str().to_string())),
        Value::from(product.discount as i64),
        Value::from(product.is_featured),
        Value::from(product.is_best_seller),
        Value::from(product.in_stock),
        Value::from(product.created_at),
        Value::from(product.updated_at),
    ])
}

fn category_from_row(row: &Row) -> Result<Category, CommerceError> {
    Ok(Category {
        id: CategoryId::new(row.text("id")?),
        name: row.text("name")?,
        slug: row.text("slug")?,
        description: row.opt_text("description")?,
        image_url: row.opt_text("image_url")?,
        created_at: row.integer("created_at")?,
        updated_at: row.integer("updated_at")?,
    })
}

fn subcategory_from_row(row: &Row) -> Result<SubCategory, CommerceError> {
    Ok(SubCategory {
        id: SubCategoryId::new(row.text("id")?),
        category_id: CategoryId::new(row.text("category_id")?),
        name: row.text("name")?,
        slug: row.text("slug")?,
        image_url: row.opt_text("image_url")?,
        created_at: row.integer("created_at")?,
        updated_at: row.integer("updated_at")?,
    })
}

fn product_from_row(row: &Row) -> Result<Product, CommerceError> {
    Ok(Product {
        id: ProductId::new(row.text("id")?),
        title: row.text("title")?,
        slug: row.text("slug")?,
        description: row.text("description")?,
        images: row.json("images")?,
        sizes: row.json("sizes")?,
        category_id: CategoryId::new(row.text("category_id")?),
        subcategory_id: row.opt_text("subcategory_id")?.map(SubCategoryId::new),
        discount: row.integer("discount")?.clamp(0, 100) as u8,
        is_featured: row.boolean("is_featured")?,
        is_best_seller: row.boolean("is_best_seller")?,
        in_stock: row.boolean("in_stock")?,
        created_at: row.integer("created_at")?,
        updated_at: row.integer("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{input, tier};
    use crate::search::ProductQuery;
    use crate::Currency;

    async fn store() -> Store {
        Store::in_memory().await.unwrap()
    }

    fn category_input(name: &str) -> CategoryInput {
        CategoryInput {
            name: name.into(),
            slug: None,
            description: None,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_slugs_get_suffixes_on_collision() {
        let store = store().await;
        let a = store.create_category(category_input("Pickles")).await.unwrap();
        let b = store.create_category(category_input("Pickles!")).await.unwrap();
        let c = store.create_category(category_input("pickles")).await.unwrap();
        assert_eq!(a.slug, "pickles");
        assert_eq!(b.slug, "pickles-2");
        assert_eq!(c.slug, "pickles-3");

        let mut explicit = category_input("Other");
        explicit.slug = Some("pickles".into());
        assert!(matches!(
            store.create_category(explicit).await,
            Err(CommerceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_own_slug() {
        let store = store().await;
        let cat = store.create_category(category_input("Oils")).await.unwrap();
        let updated = store
            .update_category(&cat.id, category_input("Oils"))
            .await
            .unwrap();
        assert_eq!(updated.slug, "oils");
    }

    #[tokio::test]
    async fn test_subcategory_slug_is_scoped_to_parent() {
        let store = store().await;
        let veg = store.create_category(category_input("Veg")).await.unwrap();
        let nonveg = store.create_category(category_input("Non Veg")).await.unwrap();
        let sub = |category_id: CategoryId| SubCategoryInput {
            category_id,
            name: "Pickles".into(),
            slug: None,
            image_url: None,
        };
        let a = store.create_subcategory(sub(veg.id.clone())).await.unwrap();
        let b = store.create_subcategory(sub(nonveg.id.clone())).await.unwrap();
        let c = store.create_subcategory(sub(veg.id.clone())).await.unwrap();
        assert_eq!(a.slug, "pickles");
        assert_eq!(b.slug, "pickles");
        assert_eq!(c.slug, "pickles-2");

        let tree = store.category_tree().await.unwrap();
        let veg_tree = tree.iter().find(|t| t.category.id == veg.id).unwrap();
        assert_eq!(veg_tree.subcategories.len(), 2);
    }

    #[tokio::test]
    async fn test_category_delete_refused_while_products_exist() {
        let store = store().await;
        let cat = store.create_category(category_input("Dairy")).await.unwrap();
        let mut ghee = input("Ghee", vec![tier("500ml", 400)]);
        ghee.category_id = cat.id.clone();
        let product = store.create_product(ghee).await.unwrap();

        assert!(matches!(
            store.delete_category(&cat.id).await,
            Err(CommerceError::Conflict(_))
        ));

        store.delete_product(&product.id).await.unwrap();
        store.delete_category(&cat.id).await.unwrap();
        assert!(matches!(
            store.find_category(cat.id.as_str()).await,
            Err(CommerceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_product_round_trip_and_refs() {
        let store = store().await;
        let cat = store.create_category(category_input("Dairy")).await.unwrap();
        let other = store.create_category(category_input("Spices")).await.unwrap();
        let foreign_sub = store
            .create_subcategory(SubCategoryInput {
                category_id: other.id.clone(),
                name: "Whole".into(),
                slug: None,
                image_url: None,
            })
            .await
            .unwrap();

        // Category may be given by slug.
        let mut ghee = input("Ghee", vec![tier("500ml", 400), tier("1l", 750)]);
        ghee.category_id = CategoryId::new("dairy");
        ghee.discount = 10;
        let created = store.create_product(ghee.clone()).await.unwrap();
        assert_eq!(created.category_id, cat.id);

        let loaded = store.product_by_slug("ghee").await.unwrap();
        assert_eq!(loaded, created);

        ghee.subcategory_id = Some(foreign_sub.id);
        assert!(matches!(
            store.update_product(&created.id, ghee).await,
            Err(CommerceError::ValidationError(_))
        ));

        let mut missing = input("Tea", vec![tier("250g", 120)]);
        missing.category_id = CategoryId::new("cat_missing");
        assert!(matches!(
            store.create_product(missing).await,
            Err(CommerceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_search_combines_sql_and_memory_filters() {
        let store = store().await;
        let dairy = store.create_category(category_input("Dairy")).await.unwrap();
        let pickles = store.create_category(category_input("Pickles")).await.unwrap();

        let mut ghee = input("Ghee", vec![tier("500ml", 400), tier("1l", 750)]);
        ghee.category_id = dairy.id.clone();
        let mut paneer = input("Paneer", vec![tier("200g", 90)]);
        paneer.category_id = dairy.id.clone();
        let mut mango = input("Mango Pickle", vec![tier("250g", 150)]);
        mango.category_id = pickles.id.clone();
        mango.is_featured = true;
        for p in [ghee, paneer, mango] {
            store.create_product(p).await.unwrap();
        }

        let run = |query: ProductQuery| {
            let store = store.clone();
            async move {
                let search = query.into_search(Currency::INR).unwrap();
                store
                    .search_products(&search)
                    .await
                    .unwrap()
                    .items
                    .into_iter()
                    .map(|p| p.title)
                    .collect::<Vec<_>>()
            }
        };

        let dairy_by_price = run(ProductQuery {
            category: Some("dairy".into()),
            sort: Some("price_asc".into()),
            ..Default::default()
        })
        .await;
        assert_eq!(dairy_by_price, vec!["Paneer", "Ghee"]);

        let mid_range = run(ProductQuery {
            min_price: Some(100.0),
            max_price: Some(500.0),
            sort: Some("title_asc".into()),
            ..Default::default()
        })
        .await;
        assert_eq!(mid_range, vec!["Ghee", "Mango Pickle"]);

        let featured = run(ProductQuery {
            featured: Some(true),
            ..Default::default()
        })
        .await;
        assert_eq!(featured, vec!["Mango Pickle"]);

        let text = run(ProductQuery {
            q: Some("pan".into()),
            ..Default::default()
        })
        .await;
        assert_eq!(text, vec!["Paneer"]);
    }

    #[tokio::test]
    async fn test_search_scopes_subcategory_to_category() {
        let store = store().await;
        let veg = store.create_category(category_input("Veg")).await.unwrap();
        let nonveg = store.create_category(category_input("Non Veg")).await.unwrap();
        let mut refs = Vec::new();
        for category in [&veg, &nonveg] {
            let sub = store
                .create_subcategory(SubCategoryInput {
                    category_id: category.id.clone(),
                    name: "Pickles".into(),
                    slug: None,
                    image_url: None,
                })
                .await
                .unwrap();
            refs.push((category.id.clone(), sub.id));
        }

        let mut lime = input("Lime Pickle", vec![tier("250g", 150)]);
        lime.category_id = refs[0].0.clone();
        lime.subcategory_id = Some(refs[0].1.clone());
        lime.is_best_seller = true;
        let mut prawn = input("Prawn Pickle", vec![tier("250g", 450)]);
        prawn.category_id = refs[1].0.clone();
        prawn.subcategory_id = Some(refs[1].1.clone());
        store.create_product(lime).await.unwrap();
        store.create_product(prawn).await.unwrap();

        let titles = |query: ProductQuery| {
            let store = store.clone();
            async move {
                let search = query.into_search(Currency::INR).unwrap();
                let results = store.search_products(&search).await.unwrap();
                results.items.into_iter().map(|p| p.title).collect::<Vec<_>>()
            }
        };

        let scoped = titles(ProductQuery {
            category: Some("veg".into()),
            subcategory: Some("pickles".into()),
            ..Default::default()
        })
        .await;
        assert_eq!(scoped, vec!["Lime Pickle"]);

        let by_slug_only = titles(ProductQuery {
            subcategory: Some("pickles".into()),
            sort: Some("title_asc".into()),
            ..Default::default()
        })
        .await;
        assert_eq!(by_slug_only, vec!["Lime Pickle", "Prawn Pickle"]);

        let not_best = titles(ProductQuery {
            best_seller: Some(false),
            ..Default::default()
        })
        .await;
        assert_eq!(not_best, vec!["Prawn Pickle"]);
    }
}
