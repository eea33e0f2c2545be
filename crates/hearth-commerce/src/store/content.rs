//! Blog posts, recipes and home page rows.

use super::Store;
use crate::content::{
    BlogPost, BlogPostInput, FeaturedReview, FeaturedReviewInput, HomeScreenOffer,
    HomeScreenOfferInput, Recipe, RecipeInput, Topbar, TopbarInput,
};
use crate::ids::{BlogPostId, OfferId, ProductId, RecipeId, ReviewId, TopbarId};
use crate::CommerceError;
use hearth_db::{params, Row, Value};

impl Store {
    // ---- blog ----

    /// Newest first. `published_only` hides drafts.
    pub async fn list_blog_posts(&self, published_only: bool) -> Result<Vec<BlogPost>, CommerceError> {
        let sql = if published_only {
            "SELECT * FROM blog_posts WHERE is_published = 1 ORDER BY published_at DESC, created_at DESC"
        } else {
            "SELECT * FROM blog_posts ORDER BY created_at DESC"
        };
        let result = self.db.query(sql, params![]).await?;
        result.iter().map(blog_from_row).collect()
    }

    pub async fn get_blog_post(&self, id: &BlogPostId) -> Result<BlogPost, CommerceError> {
        let row = self
            .db
            .query_row("SELECT * FROM blog_posts WHERE id = ?", params![id.as_str()])
            .await?
            .ok_or_else(|| CommerceError::not_found("Blog post", id.as_str()))?;
        blog_from_row(&row)
    }

    /// A published post by slug.
    pub async fn published_blog_post(&self, slug: &str) -> Result<BlogPost, CommerceError> {
        let row = self
            .db
            .query_row(
                "SELECT * FROM blog_posts WHERE slug = ? AND is_published = 1",
                params![slug.to_lowercase()],
            )
            .await?
            .ok_or_else(|| CommerceError::not_found("Blog post", slug))?;
        blog_from_row(&row)
    }

    pub async fn create_blog_post(&self, input: BlogPostInput) -> Result<BlogPost, CommerceError> {
        input.validate()?;
        let slug = self
            .allocate_slug("blog_posts", None, input.slug.as_deref(), &input.title, None)
            .await?;
        let post = BlogPost::from_input(input, slug)?;
        self.db
            .execute(
                "INSERT INTO blog_posts (id, title, slug, excerpt, content, cover_image, author, tags, \
                 is_published, published_at, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    post.id.as_str(),
                    &post.title,
                    &post.slug,
                    post.excerpt.clone(),
                    &post.content,
                    post.cover_image.clone(),
                    post.author.clone(),
                    Value::json(&post.tags)?,
                    post.is_published,
                    post.published_at,
                    post.created_at,
                    post.updated_at
                ],
            )
            .await?;
        tracing::info!(blog_id = %post.id, slug = %post.slug, "blog post created");
        Ok(post)
    }

    pub async fn update_blog_post(
        &self,
        id: &BlogPostId,
        input: BlogPostInput,
    ) -> Result<BlogPost, CommerceError> {
        input.validate()?;
        let mut post = self.get_blog_post(id).await?;
        let slug = self
            .allocate_slug(
                "blog_posts",
                None,
                input.slug.as_deref(),
                &input.title,
                Some(post.id.as_str()),
            )
            .await?;
        post.apply(input, slug)?;
        self.db
            .execute(
                "UPDATE blog_posts SET title = ?, slug = ?, excerpt = ?, content = ?, cover_image = ?, \
                 author = ?, tags = ?, is_published = ?, published_at = ?, updated_at = ? WHERE id = ?",
                params![
                    &post.title,
                    &post.slug,
                    post.excerpt.clone(),
                    &post.content,
                    post.cover_image.clone(),
                    post.author.clone(),
                    Value::json(&post.tags)?,
                    post.is_published,
                    post.published_at,
                    post.updated_at,
                    post.id.as_str()
                ],
            )
            .await?;
        Ok(post)
    }

    pub async fn delete_blog_post(&self, id: &BlogPostId) -> Result<(), CommerceError> {
        self.delete_by_id("blog_posts", "Blog post", id.as_str()).await
    }

    // ---- recipes ----

    pub async fn list_recipes(&self, published_only: bool) -> Result<Vec<Recipe>, CommerceError> {
        let sql = if published_only {
            "SELECT * FROM recipes WHERE is_published = 1 ORDER BY created_at DESC"
        } else {
            "SELECT * FROM recipes ORDER BY created_at DESC"
        };
        let result = self.db.query(sql, params![]).await?;
        result.iter().map(recipe_from_row).collect()
    }

    pub async fn get_recipe(&self, id: &RecipeId) -> Result<Recipe, CommerceError> {
        let row = self
            .db
            .query_row("SELECT * FROM recipes WHERE id = ?", params![id.as_str()])
            .await?
            .ok_or_else(|| CommerceError::not_found("Recipe", id.as_str()))?;
        recipe_from_row(&row)
    }

    /// A published recipe by slug.
    pub async fn published_recipe(&self, slug: &str) -> Result<Recipe, CommerceError> {
        let row = self
            .db
            .query_row(
                "SELECT * FROM recipes WHERE slug = ? AND is_published = 1",
                params![slug.to_lowercase()],
            )
            .await?
            .ok_or_else(|| CommerceError::not_found("Recipe", slug))?;
        recipe_from_row(&row)
    }

    pub async fn create_recipe(&self, input: RecipeInput) -> Result<Recipe, CommerceError> {
        input.validate()?;
        let slug = self
            .allocate_slug("recipes", None, input.slug.as_deref(), &input.title, None)
            .await?;
        let recipe = Recipe::from_input(input, slug)?;
        self.db
            .execute(
                "INSERT INTO recipes (id, title, slug, description, image, ingredients, steps, prep_minutes, \
                 cook_minutes, servings, product_ids, is_published, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    recipe.id.as_str(),
                    &recipe.title,
                    &recipe.slug,
                    recipe.description.clone(),
                    recipe.image.clone(),
                    Value::json(&recipe.ingredients)?,
                    Value::json(&recipe.steps)?,
                    recipe.prep_minutes,
                    recipe.cook_minutes,
                    recipe.servings,
                    Value::json(&recipe.product_ids)?,
                    recipe.is_published,
                    recipe.created_at,
                    recipe.updated_at
                ],
            )
            .await?;
        tracing::info!(recipe_id = %recipe.id, slug = %recipe.slug, "recipe created");
        Ok(recipe)
    }

    pub async fn update_recipe(
        &self,
        id: &RecipeId,
        input: RecipeInput,
    ) -> Result<Recipe, CommerceError> {
        input.validate()?;
        let mut recipe = self.get_recipe(id).await?;
        let slug = self
            .allocate_slug(
                "recipes",
                None,
                input.slug.as_deref(),
                &input.title,
                Some(recipe.id.as_str()),
            )
            .await?;
        recipe.apply(input, slug)?;
        self.db
            .execute(
                "UPDATE recipes SET title = ?, slug = ?, description = ?, image = ?, ingredients = ?, \
                 steps = ?, prep_minutes = ?, cook_minutes = ?, servings = ?, product_ids = ?, \
                 is_published = ?, updated_at = ? WHERE id = ?",
                params![
                    &recipe.title,
                    &recipe.slug,
                    recipe.description.clone(),
                    recipe.image.clone(),
                    Value::json(&recipe.ingredients)?,
                    Value::json(&recipe.steps)?,
                    recipe.prep_minutes,
                    recipe.cook_minutes,
                    recipe.servings,
                    Value::json(&recipe.product_ids)?,
                    recipe.is_published,
                    recipe.updated_at,
                    recipe.id.as_str()
                ],
            )
            .await?;
        Ok(recipe)
    }

    pub async fn delete_recipe(&self, id: &RecipeId) -> Result<(), CommerceError> {
        self.delete_by_id("recipes", "Recipe", id.as_str()).await
    }

    // ---- topbar ----

    /// Ordered by position. `active_only` hides switched-off rows.
    pub async fn list_topbar(&self, active_only: bool) -> Result<Vec<Topbar>, CommerceError> {
        let result = self
            .db
            .query(&ordered_rows("topbar", active_only), params![])
            .await?;
        result.iter().map(topbar_from_row).collect()
    }

    pub async fn create_topbar(&self, input: TopbarInput) -> Result<Topbar, CommerceError> {
        let row = Topbar::from_input(input)?;
        self.db
            .execute(
                "INSERT INTO topbar (id, text, link, is_active, position, created_at) VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    row.id.as_str(),
                    &row.text,
                    row.link.clone(),
                    row.is_active,
                    row.position,
                    row.created_at
                ],
            )
            .await?;
        Ok(row)
    }

    pub async fn update_topbar(&self, id: &TopbarId, input: TopbarInput) -> Result<Topbar, CommerceError> {
        let found = self
            .db
            .query_row("SELECT * FROM topbar WHERE id = ?", params![id.as_str()])
            .await?
            .ok_or_else(|| CommerceError::not_found("Topbar", id.as_str()))?;
        let mut row = topbar_from_row(&found)?;
        row.apply(input)?;
        self.db
            .execute(
                "UPDATE topbar SET text = ?, link = ?, is_active = ?, position = ? WHERE id = ?",
                params![&row.text, row.link.clone(), row.is_active, row.position, row.id.as_str()],
            )
            .await?;
        Ok(row)
    }

    pub async fn delete_topbar(&self, id: &TopbarId) -> Result<(), CommerceError> {
        self.delete_by_id("topbar", "Topbar", id.as_str()).await
    }

    // ---- featured reviews ----

    /// Newest first. `active_only` hides switched-off rows.
    pub async fn list_reviews(&self, active_only: bool) -> Result<Vec<FeaturedReview>, CommerceError> {
        let sql = if active_only {
            "SELECT * FROM featured_reviews WHERE is_active = 1 ORDER BY created_at DESC"
        } else {
            "SELECT * FROM featured_reviews ORDER BY created_at DESC"
        };
        let result = self.db.query(sql, params![]).await?;
        result.iter().map(review_from_row).collect()
    }

    pub async fn create_review(&self, input: FeaturedReviewInput) -> Result<FeaturedReview, CommerceError> {
        let review = FeaturedReview::from_input(input)?;
        self.db
            .execute(
                "INSERT INTO featured_reviews (id, customer_name, rating, content, image, product_id, \
                 is_active, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    review.id.as_str(),
                    &review.customer_name,
                    review.rating as i64,
                    &review.content,
                    review.image.clone(),
                    review.product_id.as_ref().map(|p| p.as_str().to_string()),
                    review.is_active,
                    review.created_at
                ],
            )
            .await?;
        Ok(review)
    }

    pub async fn update_review(
        &self,
        id: &ReviewId,
        input: FeaturedReviewInput,
    ) -> Result<FeaturedReview, CommerceError> {
        let found = self
            .db
            .query_row("SELECT * FROM featured_reviews WHERE id = ?", params![id.as_str()])
            .await?
            .ok_or_else(|| CommerceError::not_found("Review", id.as_str()))?;
        let mut review = review_from_row(&found)?;
        review.apply(input)?;
        self.db
            .execute(
                "UPDATE featured_reviews SET customer_name = ?, rating = ?, content = ?, image = ?, \
                 product_id = ?, is_active = ? WHERE id = ?",
                params![
                    &review.customer_name,
                    review.rating as i64,
                    &review.content,
                    review.image.clone(),
                    review.product_id.as_ref().map(|p| p.as_str().to_string()),
                    review.is_active,
                    review.id.as_str()
                ],
            )
            .await?;
        Ok(review)
    }

    pub async fn delete_review(&self, id: &ReviewId) -> Result<(), CommerceError> {
        self.delete_by_id("featured_reviews", "Review", id.as_str()).await
    }

    // ---- home screen offers ----

    /// Ordered by position. `active_only` hides switched-off rows.
    pub async fn list_offers(&self, active_only: bool) -> Result<Vec<HomeScreenOffer>, CommerceError> {
        let result = self
            .db
            .query(&ordered_rows("home_offers", active_only), params![])
            .await?;
        result.iter().map(offer_from_row).collect()
    }

    pub async fn create_offer(&self, input: HomeScreenOfferInput) -> Result<HomeScreenOffer, CommerceError> {
        let offer = HomeScreenOffer::from_input(input)?;
        self.db
            .execute(
                "INSERT INTO home_offers (id, title, subtitle, image_url, link, is_active, position, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    offer.id.as_str(),
                    &offer.title,
                    offer.subtitle.clone(),
                    &offer.image_url,
                    offer.link.clone(),
                    offer.is_active,
                    offer.position,
                    offer.created_at
                ],
            )
            .await?;
        Ok(offer)
    }

    pub async fn update_offer(
        &self,
        id: &OfferId,
        input: HomeScreenOfferInput,
    ) -> Result<HomeScreenOffer, CommerceError> {
        let found = self
            .db
            .query_row("SELECT * FROM home_offers WHERE id = ?", params![id.as_str()])
            .await?
            .ok_or_else(|| CommerceError::not_found("Offer", id.as_str()))?;
        let mut offer = offer_from_row(&found)?;
        offer.apply(input)?;
        self.db
            .execute(
                "UPDATE home_offers SET title = ?, subtitle = ?, image_url = ?, link = ?, is_active = ?, \
                 position = ? WHERE id = ?",
                params![
                    &offer.title,
                    offer.subtitle.clone(),
                    &offer.image_url,
                    offer.link.clone(),
                    offer.is_active,
                    offer.position,
                    offer.id.as_str()
                ],
            )
            .await?;
        Ok(offer)
    }

    pub async fn delete_offer(&self, id: &OfferId) -> Result<(), CommerceError> {
        self.delete_by_id("home_offers", "Offer", id.as_str()).await
    }

    async fn delete_by_id(
        &self,
        table: &'static str,
        entity: &'static str,
        id: &str,
    ) -> Result<(), CommerceError> {
        let deleted = self
            .db
            .execute(&format!("DELETE FROM {} WHERE id = ?", table), params![id])
            .await?;
        if deleted == 0 {
            return Err(CommerceError::not_found(entity, id));
        }
        Ok(())
    }
}

fn ordered_rows(table: &'static str, active_only: bool) -> String {
    let filter = if active_only { " WHERE is_active = 1" } else { "" };
    format!(
        "SELECT * FROM {}{} ORDER BY position ASC, created_at ASC",
        table, filter
    )
}

fn blog_from_row(row: &Row) -> Result<BlogPost, CommerceError> {
    Ok(BlogPost {
        id: BlogPostId::new(row.text("id")?),
        title: row.text("title")?,
        slug: row.text("slug")?,
        excerpt: row.opt_text("excerpt")?,
        content: row.text("content")?,
        cover_image: row.opt_text("cover_image")?,
        author: row.opt_text("author")?,
        tags: row.json("tags")?,
        is_published: row.boolean("is_published")?,
        published_at: row.opt_integer("published_at")?,
        created_at: row.integer("created_at")?,
        updated_at: row.integer("updated_at")?,
    })
}

fn recipe_from_row(row: &Row) -> Result<Recipe, CommerceError> {
    Ok(Recipe {
        id: RecipeId::new(row.text("id")?),
        title: row.text("title")?,
        slug: row.text("slug")?,
        description: row.opt_text("description")?,
        image: row.opt_text("image")?,
        ingredients: row.json("ingredients")?,
        steps: row.json("steps")?,
        prep_minutes: row.opt_integer("prep_minutes")?,
        cook_minutes: row.opt_integer("cook_minutes")?,
        servings: row.opt_integer("servings")?,
        product_ids: row.json::<Vec<ProductId>>("product_ids")?,
        is_published: row.boolean("is_published")?,
        created_at: row.integer("created_at")?,
        updated_at: row.integer("updated_at")?,
    })
}

fn topbar_from_row(row: &Row) -> Result<Topbar, CommerceError> {
    Ok(Topbar {
        id: TopbarId::new(row.text("id")?),
        text: row.text("text")?,
        link: row.opt_text("link")?,
        is_active: row.boolean("is_active")?,
        position: row.integer("position")?,
        created_at: row.integer("created_at")?,
    })
}

fn review_from_row(row: &Row) -> Result<FeaturedReview, CommerceError> {
    Ok(FeaturedReview {
        id: ReviewId::new(row.text("id")?),
        customer_name: row.text("customer_name")?,
        rating: row.integer("rating")?.clamp(1, 5) as u8,
        content: row.text("content")?,
        image: row.opt_text("image")?,
        product_id: row.opt_text("product_id")?.map(ProductId::new),
        is_active: row.boolean("is_active")?,
        created_at: row.integer("created_at")?,
    })
}

fn offer_from_row(row: &Row) -> Result<HomeScreenOffer, CommerceError> {
    Ok(HomeScreenOffer {
        id: OfferId::new(row.text("id")?),
        title: row.text("title")?,
        subtitle: row.opt_text("subtitle")?,
        image_url: row.text("image_url")?,
        link: row.opt_text("link")?,
        is_active: row.boolean("is_active")?,
        position: row.integer("position")?,
        created_at: row.integer("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str, published: bool) -> BlogPostInput {
        BlogPostInput {
            title: title.into(),
            slug: None,
            excerpt: None,
            content: "Body".into(),
            cover_image: None,
            author: None,
            tags: vec!["ghee".into()],
            is_published: published,
        }
    }

    #[tokio::test]
    async fn test_drafts_hidden_from_storefront() {
        let store = Store::in_memory().await.unwrap();
        let live = store.create_blog_post(post("Live Post", true)).await.unwrap();
        let draft = store.create_blog_post(post("Draft Post", false)).await.unwrap();

        let public = store.list_blog_posts(true).await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, live.id);
        assert_eq!(store.list_blog_posts(false).await.unwrap().len(), 2);

        assert!(store.published_blog_post("live-post").await.is_ok());
        assert!(matches!(
            store.published_blog_post(&draft.slug).await,
            Err(CommerceError::NotFound { .. })
        ));

        let published = store
            .update_blog_post(&draft.id, post("Draft Post", true))
            .await
            .unwrap();
        assert!(published.published_at.is_some());
        assert_eq!(published.slug, "draft-post");
    }

    #[tokio::test]
    async fn test_recipe_round_trip() {
        let store = Store::in_memory().await.unwrap();
        let recipe = store
            .create_recipe(RecipeInput {
                title: "Ghee Rice".into(),
                slug: None,
                description: None,
                image: None,
                ingredients: vec!["Rice".into()],
                steps: vec!["Cook".into()],
                prep_minutes: Some(5),
                cook_minutes: Some(20),
                servings: Some(2),
                product_ids: vec![ProductId::new("prod_ghee")],
                is_published: true,
            })
            .await
            .unwrap();
        assert_eq!(store.published_recipe("ghee-rice").await.unwrap(), recipe);

        store.delete_recipe(&recipe.id).await.unwrap();
        assert!(matches!(
            store.delete_recipe(&recipe.id).await,
            Err(CommerceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_site_rows_order_and_visibility() {
        let store = Store::in_memory().await.unwrap();
        let offer = |title: &str, position: i64, is_active: bool| HomeScreenOfferInput {
            title: title.into(),
            subtitle: None,
            image_url: "https://img/banner.jpg".into(),
            link: None,
            is_active,
            position,
        };
        store.create_offer(offer("Second", 2, true)).await.unwrap();
        store.create_offer(offer("First", 1, true)).await.unwrap();
        let hidden = store.create_offer(offer("Hidden", 0, false)).await.unwrap();

        let titles: Vec<_> = store
            .list_offers(true)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.title)
            .collect();
        assert_eq!(titles, vec!["First", "Second"]);

        store
            .update_offer(&hidden.id, offer("Hidden", 0, true))
            .await
            .unwrap();
        assert_eq!(store.list_offers(true).await.unwrap()[0].title, "Hidden");

        let review = store
            .create_review(FeaturedReviewInput {
                customer_name: "Meera".into(),
                rating: 5,
                content: "Lovely".into(),
                image: None,
                product_id: None,
                is_active: true,
            })
            .await
            .unwrap();
        assert_eq!(store.list_reviews(true).await.unwrap(), vec![review]);

        let topbar = store
            .create_topbar(TopbarInput {
                text: "Free shipping".into(),
                link: None,
                is_active: false,
                position: 0,
            })
            .await
            .unwrap();
        assert!(store.list_topbar(true).await.unwrap().is_empty());
        assert_eq!(store.list_topbar(false).await.unwrap(), vec![topbar]);
    }
}
