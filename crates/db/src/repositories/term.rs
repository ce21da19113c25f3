//! Term repository.
//!
//! Terms and everything hanging off them: synonyms, images, links and videos.

use std::sync::Arc;

use crate::contains_pattern;
use crate::entities::{
    Term, TermImage, TermLink, TermSynonym, TermVideo, term, term_image, term_link, term_synonym,
    term_video,
};
use crate::filters::TermFilter;
use aerodict_common::{AppError, AppResult};
use sea_orm::sea_query::{Expr, Func, IntoColumnRef, Query, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};

/// Criteria for term listings.
#[derive(Debug, Clone, Default)]
pub struct TermSearch {
    /// Case-insensitive substring over title, decodings and synonym names.
    pub query: Option<String>,
    pub filters: Vec<TermFilter>,
}

impl TermSearch {
    /// Search by free text only.
    #[must_use]
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            filters: Vec::new(),
        }
    }

    fn select(&self) -> Select<Term> {
        let mut select = Term::find();
        if let Some(q) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            select = select.filter(text_match(q));
        }
        for filter in &self.filters {
            select = filter.apply(select);
        }
        select
            .order_by_asc(term::Column::Title)
            .order_by_asc(term::Column::Id)
    }
}

/// One page of a term listing. `page` is 1-based and already clamped.
#[derive(Debug, Clone)]
pub struct TermPage {
    pub items: Vec<term::Model>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

fn lower_like(col: impl IntoColumnRef, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(pattern)
}

/// Title, either decoding, or any synonym contains `q` (case-insensitive).
fn text_match(q: &str) -> Condition {
    let pattern = contains_pattern(&q.to_lowercase());
    let synonym_hits = Query::select()
        .column(term_synonym::Column::TermId)
        .from(TermSynonym)
        .and_where(lower_like((TermSynonym, term_synonym::Column::Name), &pattern))
        .to_owned();

    Condition::any()
        .add(lower_like((Term, term::Column::Title), &pattern))
        .add(lower_like((Term, term::Column::DecodEn), &pattern))
        .add(lower_like((Term, term::Column::DecodPt), &pattern))
        .add(term::Column::Id.in_subquery(synonym_hits))
}

/// Term repository for database operations.
#[derive(Clone)]
pub struct TermRepository {
    db: Arc<DatabaseConnection>,
}

impl TermRepository {
    /// Create a new term repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a term by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<term::Model>> {
        Term::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a term by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<term::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::TermNotFound(id.to_string()))
    }

    /// Find a term by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<term::Model>> {
        Term::find()
            .filter(term::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a term by slug, returning an error if not found.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<term::Model> {
        self.find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::TermNotFound(slug.to_string()))
    }

    /// Create a new term.
    pub async fn create(&self, model: term::ActiveModel) -> AppResult<term::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a term.
    pub async fn update(&self, model: term::ActiveModel) -> AppResult<term::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a term and, through cascades, its synonyms, media and history.
    pub async fn delete(&self, term: term::Model) -> AppResult<()> {
        term.delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Paginated listing in title order. Out-of-range pages clamp to the last page.
    pub async fn search(
        &self,
        search: &TermSearch,
        page: u64,
        page_size: u64,
    ) -> AppResult<TermPage> {
        let paginator = search.select().paginate(self.db.as_ref(), page_size.max(1));
        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let pages = counts.number_of_pages.max(1);
        let page = page.clamp(1, pages);
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(TermPage {
            items,
            total: counts.number_of_items,
            page,
            pages,
        })
    }

    /// First `limit` matches in title order, unpaginated.
    pub async fn find_matching(&self, search: &TermSearch, limit: u64) -> AppResult<Vec<term::Model>> {
        search
            .select()
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All terms in title order.
    pub async fn find_all(&self) -> AppResult<Vec<term::Model>> {
        Term::find()
            .order_by_asc(term::Column::Title)
            .order_by_asc(term::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all terms.
    pub async fn count(&self) -> AppResult<u64> {
        Term::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // Synonyms

    /// Synonyms of one term, by name.
    pub async fn find_synonyms(&self, term_id: &str) -> AppResult<Vec<term_synonym::Model>> {
        TermSynonym::find()
            .filter(term_synonym::Column::TermId.eq(term_id))
            .order_by_asc(term_synonym::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Synonyms of several terms at once.
    pub async fn find_synonyms_for(
        &self,
        term_ids: &[String],
    ) -> AppResult<Vec<term_synonym::Model>> {
        if term_ids.is_empty() {
            return Ok(vec![]);
        }

        TermSynonym::find()
            .filter(term_synonym::Column::TermId.is_in(term_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a synonym of a term by exact name.
    pub async fn find_synonym(
        &self,
        term_id: &str,
        name: &str,
    ) -> AppResult<Option<term_synonym::Model>> {
        TermSynonym::find()
            .filter(term_synonym::Column::TermId.eq(term_id))
            .filter(term_synonym::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Add a synonym.
    pub async fn create_synonym(
        &self,
        model: term_synonym::ActiveModel,
    ) -> AppResult<term_synonym::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a synonym of a term. Returns whether a row was deleted.
    pub async fn delete_synonym(&self, term_id: &str, synonym_id: &str) -> AppResult<bool> {
        let result = TermSynonym::delete_many()
            .filter(term_synonym::Column::Id.eq(synonym_id))
            .filter(term_synonym::Column::TermId.eq(term_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    // Images

    /// Images of a term in display order.
    pub async fn find_images(&self, term_id: &str) -> AppResult<Vec<term_image::Model>> {
        TermImage::find()
            .filter(term_image::Column::TermId.eq(term_id))
            .order_by_asc(term_image::Column::DisplayOrder)
            .order_by_asc(term_image::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Add an image record.
    pub async fn create_image(&self, model: term_image::ActiveModel) -> AppResult<term_image::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an image of a term.
    pub async fn find_image(
        &self,
        term_id: &str,
        image_id: &str,
    ) -> AppResult<Option<term_image::Model>> {
        TermImage::find_by_id(image_id)
            .filter(term_image::Column::TermId.eq(term_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an image record.
    pub async fn delete_image(&self, image: term_image::Model) -> AppResult<()> {
        image
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // Links

    /// Links of a term.
    pub async fn find_links(&self, term_id: &str) -> AppResult<Vec<term_link::Model>> {
        TermLink::find()
            .filter(term_link::Column::TermId.eq(term_id))
            .order_by_asc(term_link::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Add a link.
    pub async fn create_link(&self, model: term_link::ActiveModel) -> AppResult<term_link::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a link of a term. Returns whether a row was deleted.
    pub async fn delete_link(&self, term_id: &str, link_id: &str) -> AppResult<bool> {
        let result = TermLink::delete_many()
            .filter(term_link::Column::Id.eq(link_id))
            .filter(term_link::Column::TermId.eq(term_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    // Videos

    /// Videos of a term.
    pub async fn find_videos(&self, term_id: &str) -> AppResult<Vec<term_video::Model>> {
        TermVideo::find()
            .filter(term_video::Column::TermId.eq(term_id))
            .order_by_asc(term_video::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Add a video.
    pub async fn create_video(
        &self,
        model: term_video::ActiveModel,
    ) -> AppResult<term_video::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a video of a term. Returns whether a row was deleted.
    pub async fn delete_video(&self, term_id: &str, video_id: &str) -> AppResult<bool> {
        let result = TermVideo::delete_many()
            .filter(term_video::Column::Id.eq(video_id))
            .filter(term_video::Column::TermId.eq(term_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }
}
