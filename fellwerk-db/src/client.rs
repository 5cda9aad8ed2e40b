use crate::query;
use crate::record::{IdentityRecord, NoticeRecord};
use fellwerk_common::model::filter::NoticeFilter;
use fellwerk_common::model::notice::{CreateNotice, Notice, NoticeMarker, Sex};
use fellwerk_common::model::user::{FavoriteSet, Identity, UserMarker};
use fellwerk_common::model::{Id, ModelValidationError};
use fellwerk_common::page::PageRequest;
use sqlx::PgPool;
use thiserror::Error;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("Running migrations failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Clone, Debug)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        sqlx::migrate!("../migrations").run(&pool).await?;

        Ok(Self::new(pool))
    }

    pub async fn fetch_notices(
        &self,
        filter: &NoticeFilter,
        page: PageRequest,
    ) -> Result<Vec<Notice>> {
        let records = query::select_notices(filter, page)
            .build_query_as::<NoticeRecord>()
            .fetch_all(&self.pool)
            .await?;

        collect_notices(records)
    }

    pub async fn count_notices(&self, filter: &NoticeFilter) -> Result<u64> {
        let count: i64 = query::count_notices(filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok(count.cast_unsigned())
    }

    pub async fn fetch_notice(&self, notice_id: Id<NoticeMarker>) -> Result<Option<Notice>> {
        let record = query::select_notice_by_id(notice_id.get().cast_signed())
            .build_query_as::<NoticeRecord>()
            .fetch_optional(&self.pool)
            .await?;

        let notice = record.map(Notice::try_from).transpose()?;
        Ok(notice)
    }

    pub async fn create_notice(&self, notice: &CreateNotice) -> Result<Id<NoticeMarker>> {
        let notice_id: i64 = sqlx::query_scalar(
            "
            INSERT INTO notices (category, title, comments, sex, birthdate, image_url, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING notice_id
            ",
        )
        .bind(notice.category.as_str())
        .bind(notice.title.get())
        .bind(&notice.comments)
        .bind(notice.sex.map(Sex::as_str))
        .bind(notice.birthdate)
        .bind(&notice.image_url)
        .bind(notice.owner.get().cast_signed())
        .fetch_one(&self.pool)
        .await?;

        Ok(notice_id.cast_unsigned().into())
    }

    /// Deletes the notice only when `owner` owns it. Returns whether a row
    /// was removed.
    pub async fn delete_notice(
        &self,
        notice_id: Id<NoticeMarker>,
        owner: Id<UserMarker>,
    ) -> Result<bool> {
        let deleted: Option<i64> = sqlx::query_scalar(
            "DELETE FROM notices WHERE notice_id = $1 AND owner_id = $2 RETURNING notice_id",
        )
        .bind(notice_id.get().cast_signed())
        .bind(owner.get().cast_signed())
        .fetch_optional(&self.pool)
        .await?;

        Ok(deleted.is_some())
    }

    pub async fn fetch_identity_by_token(&self, token: &str) -> Result<Option<Identity>> {
        let record = sqlx::query_as::<_, IdentityRecord>(
            "SELECT user_id, favorite FROM users WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Identity::from))
    }

    /// Appends the notice to the user's favorite set only when it is not
    /// already a member. The membership guard runs inside the statement,
    /// so two concurrent adds cannot both apply. `None` means the guard
    /// (or the user lookup) did not match.
    pub async fn add_favorite(
        &self,
        user_id: Id<UserMarker>,
        notice_id: Id<NoticeMarker>,
    ) -> Result<Option<FavoriteSet>> {
        let favorite: Option<Vec<i64>> = sqlx::query_scalar(
            "
            UPDATE users SET favorite = array_append(favorite, $2)
            WHERE user_id = $1 AND NOT ($2 = ANY(favorite))
            RETURNING favorite
            ",
        )
        .bind(user_id.get().cast_signed())
        .bind(notice_id.get().cast_signed())
        .fetch_optional(&self.pool)
        .await?;

        Ok(favorite.map(into_favorite_set))
    }

    /// Counterpart of [`DbClient::add_favorite`]: removes only when the
    /// notice is currently a member.
    pub async fn remove_favorite(
        &self,
        user_id: Id<UserMarker>,
        notice_id: Id<NoticeMarker>,
    ) -> Result<Option<FavoriteSet>> {
        let favorite: Option<Vec<i64>> = sqlx::query_scalar(
            "
            UPDATE users SET favorite = array_remove(favorite, $2)
            WHERE user_id = $1 AND $2 = ANY(favorite)
            RETURNING favorite
            ",
        )
        .bind(user_id.get().cast_signed())
        .bind(notice_id.get().cast_signed())
        .fetch_optional(&self.pool)
        .await?;

        Ok(favorite.map(into_favorite_set))
    }

    /// Resolves a favorite set into full notices. Stale ids resolve to
    /// nothing and are dropped.
    pub async fn fetch_favorite_notices(
        &self,
        favorite: &FavoriteSet,
        page: PageRequest,
    ) -> Result<Vec<Notice>> {
        let ids = favorite_ids(favorite);
        let records = query::select_notices_by_ids(&ids, page)
            .build_query_as::<NoticeRecord>()
            .fetch_all(&self.pool)
            .await?;

        collect_notices(records)
    }

    pub async fn count_favorite_notices(&self, favorite: &FavoriteSet) -> Result<u64> {
        let ids = favorite_ids(favorite);
        let count: i64 = query::count_notices_by_ids(&ids)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok(count.cast_unsigned())
    }
}

fn collect_notices(records: Vec<NoticeRecord>) -> Result<Vec<Notice>> {
    let notices = records
        .into_iter()
        .map(Notice::try_from)
        .collect::<Result<_, _>>()?;

    Ok(notices)
}

fn favorite_ids(favorite: &FavoriteSet) -> Vec<i64> {
    favorite.ids().iter().map(|id| id.get().cast_signed()).collect()
}

fn into_favorite_set(ids: Vec<i64>) -> FavoriteSet {
    ids.into_iter().map(|id| id.cast_unsigned().into()).collect()
}
