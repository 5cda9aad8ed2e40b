use crate::server::{
    Result, ServerError, ServerRouter, auth::AuthenticatedUser, json::Json, query::Query,
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use fellwerk_common::{
    model::{
        Id,
        filter::{BirthdateWindow, NoticeFilter},
        notice::{CreateNotice, Notice, NoticeCategory, NoticeMarker, NoticeTitle, Sex},
        user::FavoriteSet,
    },
    page::{Page, PageRequest},
};
use fellwerk_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{Date, OffsetDateTime};

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_notices)
        .typed_post(create_notice)
        .typed_get(search_notices)
        .typed_get(get_notices_by_category)
        .typed_get(get_own_notices)
        .typed_get(list_favorites)
        .typed_post(add_favorite)
        .typed_delete(remove_favorite)
        .typed_get(get_notice)
        .typed_delete(delete_notice)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/notices", rejection(ServerError))]
struct NoticesPath;

#[derive(Clone, Copy, Debug, Default, Deserialize)]
struct ListParams {
    page: Option<i64>,
    limit: Option<i64>,
}

async fn list_notices(
    _: NoticesPath,
    Query(params): Query<ListParams>,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<Page<Notice>>> {
    let page = PageRequest::new(params.page, params.limit);
    let filter = NoticeFilter::default();

    let total = db.count_notices(&filter).await?;
    let notices = db.fetch_notices(&filter, page).await?;

    Ok(Json(Page::new(notices, page, total)))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/notices/search", rejection(ServerError))]
struct SearchNoticesPath;

#[derive(Clone, Debug, Default, Deserialize)]
struct SearchParams {
    query: Option<String>,
    category: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

async fn search_notices(
    _: SearchNoticesPath,
    Query(params): Query<SearchParams>,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<Page<Notice>>> {
    let term = params
        .query
        .filter(|query| !query.trim().is_empty())
        .ok_or(ServerError::MissingSearchParams)?;
    let category: NoticeCategory = params
        .category
        .filter(|category| !category.trim().is_empty())
        .ok_or(ServerError::MissingSearchParams)?
        .parse()?;

    let page = PageRequest::new(params.page, params.limit);
    let filter = NoticeFilter::default()
        .with_category(category)
        .with_text(term);

    fetch_page(&db, &filter, page).await
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/notices/category/{category}", rejection(ServerError))]
struct NoticesByCategoryPath {
    category: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryParams {
    sex: Option<String>,
    min_age: Option<u8>,
    max_age: Option<u8>,
    page: Option<i64>,
    limit: Option<i64>,
}

async fn get_notices_by_category(
    NoticesByCategoryPath { category }: NoticesByCategoryPath,
    Query(params): Query<CategoryParams>,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<Page<Notice>>> {
    let category: NoticeCategory = category.parse()?;
    let page = PageRequest::new(params.page, params.limit);

    let today = OffsetDateTime::now_utc().date();
    let window = BirthdateWindow::from_age_range(today, params.min_age, params.max_age);

    let mut filter = NoticeFilter::default()
        .with_category(category)
        .with_birthdate(window);
    if let Some(sex) = params.sex.as_deref() {
        filter = filter.with_sex(sex.parse::<Sex>()?);
    }

    fetch_page(&db, &filter, page).await
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/notices/own", rejection(ServerError))]
struct OwnNoticesPath;

#[derive(Clone, Debug, Default, Deserialize)]
struct OwnParams {
    query: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

async fn get_own_notices(
    _: OwnNoticesPath,
    Query(params): Query<OwnParams>,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
) -> Result<Json<Page<Notice>>> {
    let page = PageRequest::new(params.page, params.limit);

    let mut filter = NoticeFilter::default().with_owner(user.user_id());
    if let Some(term) = params.query.filter(|query| !query.trim().is_empty()) {
        filter = filter.with_text(term);
    }

    fetch_page(&db, &filter, page).await
}

/// Shared tail of every filtered list operation: count, bail out on zero
/// matches, fetch the requested page.
async fn fetch_page(
    db: &DbClient,
    filter: &NoticeFilter,
    page: PageRequest,
) -> Result<Json<Page<Notice>>> {
    let total = db.count_notices(filter).await?;
    if total == 0 {
        return Err(ServerError::NoMatchingNotices);
    }

    let notices = db.fetch_notices(filter, page).await?;
    Ok(Json(Page::new(notices, page, total)))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/notices/{id}", rejection(ServerError))]
struct NoticePath {
    id: Id<NoticeMarker>,
}

async fn get_notice(
    NoticePath { id }: NoticePath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<Notice>> {
    let notice = db
        .fetch_notice(id)
        .await?
        .ok_or(ServerError::NoticeByIdNotFound(id))?;

    Ok(Json(notice))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/notices", rejection(ServerError))]
struct CreateNoticePath;

/// Request body for a new notice. The image URL is attached by the upload
/// collaborator before this handler runs; everything else comes from the
/// client.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewNotice {
    category: NoticeCategory,
    title: NoticeTitle,
    comments: String,
    sex: Option<Sex>,
    birthdate: Option<Date>,
    image_url: Option<String>,
}

async fn create_notice(
    _: CreateNoticePath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
    Json(body): Json<NewNotice>,
) -> Result<(StatusCode, Json<Notice>)> {
    let image_url = body
        .image_url
        .filter(|url| !url.trim().is_empty())
        .ok_or(ServerError::ImageNotFound)?;

    let create = CreateNotice {
        owner: user.user_id(),
        category: body.category,
        title: body.title,
        comments: body.comments,
        sex: body.sex,
        birthdate: body.birthdate,
        image_url,
    };

    let id = db.create_notice(&create).await?;
    let notice = db
        .fetch_notice(id)
        .await?
        .ok_or(ServerError::NoticeByIdNotFound(id))?;

    Ok((StatusCode::CREATED, Json(notice)))
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct DeletedNotice {
    message: String,
}

async fn delete_notice(
    NoticePath { id }: NoticePath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
) -> Result<Json<DeletedNotice>> {
    if db.delete_notice(id, user.user_id()).await? {
        return Ok(Json(DeletedNotice {
            message: format!("Notice with id {id} deleted"),
        }));
    }

    // Nothing deleted: either the notice is gone or it belongs to someone
    // else.
    match db.fetch_notice(id).await? {
        Some(_) => Err(ServerError::NotNoticeOwner(id)),
        None => Err(ServerError::NoticeByIdNotFound(id)),
    }
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/notices/favorites", rejection(ServerError))]
struct FavoritesPath;

async fn list_favorites(
    _: FavoritesPath,
    Query(params): Query<ListParams>,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
) -> Result<Json<Page<Notice>>> {
    if user.favorite().is_empty() {
        return Err(ServerError::NoFavorites);
    }

    let page = PageRequest::new(params.page, params.limit);

    // Stale ids resolve to nothing; a set that resolves to nothing at all
    // is reported the same as an empty one.
    let total = db.count_favorite_notices(user.favorite()).await?;
    if total == 0 {
        return Err(ServerError::NoFavorites);
    }

    let notices = db.fetch_favorite_notices(user.favorite(), page).await?;
    Ok(Json(Page::new(notices, page, total)))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/notices/favorites/{id}", rejection(ServerError))]
struct FavoritePath {
    id: Id<NoticeMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
struct FavoriteUpdate {
    favorite: FavoriteSet,
}

async fn add_favorite(
    FavoritePath { id }: FavoritePath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
) -> Result<Json<FavoriteUpdate>> {
    if user.favorite().contains(id) {
        return Err(ServerError::AlreadyFavorite(id));
    }

    // The store re-checks membership inside the update, so a concurrent
    // add that won the race surfaces here as well.
    let favorite = db
        .add_favorite(user.user_id(), id)
        .await?
        .ok_or(ServerError::AlreadyFavorite(id))?;

    Ok(Json(FavoriteUpdate { favorite }))
}

async fn remove_favorite(
    FavoritePath { id }: FavoritePath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
) -> Result<Json<FavoriteUpdate>> {
    if !user.favorite().contains(id) {
        return Err(ServerError::NotFavorite(id));
    }

    let favorite = db
        .remove_favorite(user.user_id(), id)
        .await?
        .ok_or(ServerError::NotFavorite(id))?;

    Ok(Json(FavoriteUpdate { favorite }))
}
