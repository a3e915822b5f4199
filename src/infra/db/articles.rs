use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder};
use time::OffsetDateTime;

use crate::application::pagination::PageRequest;
use crate::application::repos::{
    ArticleFilter, ArticlesRepo, ArticlesWriteRepo, CreateArticleParams, RepoError,
    UpdateArticleParams,
};
use crate::domain::entities::ArticleRecord;

use super::{PostgresRepositories, map_sqlx_error};

const ARTICLE_RETURNING: &str = "id, author, title, body, created_at, updated_at";

#[derive(FromRow)]
struct ArticleRow {
    id: i64,
    author: String,
    title: String,
    body: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ArticleRow> for ArticleRecord {
    fn from(row: ArticleRow) -> Self {
        Self {
            id: row.id,
            author: row.author,
            title: row.title,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ArticlesRepo for PostgresRepositories {
    async fn find_by_id(&self, id: i64) -> Result<Option<ArticleRecord>, RepoError> {
        let row = sqlx::query_as::<_, ArticleRow>(
            "SELECT a.id, a.author, a.title, a.body, a.created_at, a.updated_at \
             FROM articles a \
             WHERE a.id = $1 AND a.deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ArticleRecord::from))
    }

    async fn list_ids(
        &self,
        filter: &ArticleFilter,
        page: PageRequest,
    ) -> Result<(Vec<i64>, u64), RepoError> {
        // Every search word fell under the significance threshold; the
        // engine cannot match anything, so skip the round-trips.
        if matches!(filter.search_terms(), Some(terms) if terms.is_empty()) {
            return Ok((Vec::new(), 0));
        }

        let mut count_qb =
            QueryBuilder::new("SELECT COUNT(*) FROM articles a WHERE a.deleted_at IS NULL ");
        Self::apply_article_filter(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        let total_items = Self::convert_count(total)?;

        if total_items == 0 {
            return Ok((Vec::new(), 0));
        }

        let mut qb = QueryBuilder::new("SELECT a.id FROM articles a WHERE a.deleted_at IS NULL ");
        Self::apply_article_filter(&mut qb, filter);
        qb.push(" ORDER BY a.created_at DESC, a.id DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let ids: Vec<i64> = qb
            .build_query_scalar()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok((ids, total_items))
    }

    async fn list_by_ids(&self, ids: &[i64]) -> Result<Vec<ArticleRecord>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ArticleRow>(
            "SELECT a.id, a.author, a.title, a.body, a.created_at, a.updated_at \
             FROM articles a \
             WHERE a.deleted_at IS NULL AND a.id = ANY($1)",
        )
        .bind(ids.to_vec())
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ArticleRecord::from).collect())
    }
}

#[async_trait]
impl ArticlesWriteRepo for PostgresRepositories {
    async fn create_article(
        &self,
        params: CreateArticleParams,
    ) -> Result<ArticleRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, ArticleRow>(
            "INSERT INTO articles (author, title, body, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) \
             RETURNING id, author, title, body, created_at, updated_at",
        )
        .bind(params.author)
        .bind(params.title)
        .bind(params.body)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_article(
        &self,
        old: &ArticleRecord,
        params: UpdateArticleParams,
    ) -> Result<ArticleRecord, RepoError> {
        let mut qb = QueryBuilder::new("UPDATE articles SET updated_at = ");
        qb.push_bind(OffsetDateTime::now_utc());
        if params.author != old.author {
            qb.push(", author = ");
            qb.push_bind(params.author);
        }
        if params.title != old.title {
            qb.push(", title = ");
            qb.push_bind(params.title);
        }
        if params.body != old.body {
            qb.push(", body = ");
            qb.push_bind(params.body);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(old.id);
        qb.push(" AND deleted_at IS NULL RETURNING ");
        qb.push(ARTICLE_RETURNING);

        let row = qb
            .build_query_as::<ArticleRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(ArticleRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_article(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE articles \
             SET deleted_at = now(), updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
