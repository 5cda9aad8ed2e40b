//! Criteria-to-SQL assembly for notice lookups.
//!
//! Every lookup selects through the owner join so responses can embed the
//! owner summary without a second round trip.

use fellwerk_common::{model::filter::NoticeFilter, page::PageRequest};
use sqlx::{Postgres, QueryBuilder};

const SEARCH_VECTOR: &str = "to_tsvector('english', notices.title || ' ' || notices.comments)";

fn notice_select<'a>() -> QueryBuilder<'a, Postgres> {
    QueryBuilder::new(
        "SELECT \
            notices.notice_id, notices.category, notices.title, notices.comments, \
            notices.sex, notices.birthdate, notices.image_url, \
            users.user_id AS owner_id, users.name AS owner_name, \
            users.email AS owner_email, users.phone AS owner_phone \
        FROM notices JOIN users ON notices.owner_id = users.user_id",
    )
}

pub(crate) fn select_notices<'args>(
    filter: &'args NoticeFilter,
    page: PageRequest,
) -> QueryBuilder<'args, Postgres> {
    let mut query = notice_select();
    push_criteria(&mut query, filter);

    if let Some(text) = &filter.text {
        query.push(format!(" ORDER BY ts_rank({SEARCH_VECTOR}, plainto_tsquery('english', "));
        query.push_bind(text.as_str());
        query.push(")) DESC");
    } else {
        query.push(" ORDER BY notices.notice_id DESC");
    }

    push_page(&mut query, page);
    query
}

pub(crate) fn count_notices(filter: &NoticeFilter) -> QueryBuilder<'_, Postgres> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM notices");
    push_criteria(&mut query, filter);
    query
}

pub(crate) fn select_notice_by_id(notice_id: i64) -> QueryBuilder<'static, Postgres> {
    let mut query = notice_select();
    query.push(" WHERE notices.notice_id = ");
    query.push_bind(notice_id);
    query
}

/// Ids that no longer resolve to a notice simply join to nothing and are
/// dropped from the result.
pub(crate) fn select_notices_by_ids<'args>(
    notice_ids: &'args [i64],
    page: PageRequest,
) -> QueryBuilder<'args, Postgres> {
    let mut query = notice_select();
    query.push(" WHERE notices.notice_id = ANY(");
    query.push_bind(notice_ids);
    query.push(") ORDER BY notices.notice_id DESC");
    push_page(&mut query, page);
    query
}

pub(crate) fn count_notices_by_ids(notice_ids: &[i64]) -> QueryBuilder<'_, Postgres> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM notices WHERE notices.notice_id = ANY(");
    query.push_bind(notice_ids);
    query.push(")");
    query
}

fn push_criteria<'args>(query: &mut QueryBuilder<'args, Postgres>, filter: &'args NoticeFilter) {
    let mut first = true;
    let mut connective = move || if std::mem::take(&mut first) { " WHERE " } else { " AND " };

    if let Some(category) = filter.category {
        query.push(connective());
        query.push("notices.category = ");
        query.push_bind(category.as_str());
    }

    if let Some(sex) = filter.sex {
        query.push(connective());
        query.push("notices.sex = ");
        query.push_bind(sex.as_str());
    }

    if let Some(earliest) = filter.birthdate.earliest {
        query.push(connective());
        query.push("notices.birthdate >= ");
        query.push_bind(earliest);
    }

    if let Some(latest) = filter.birthdate.latest {
        query.push(connective());
        query.push("notices.birthdate <= ");
        query.push_bind(latest);
    }

    if let Some(text) = &filter.text {
        query.push(connective());
        query.push(format!("{SEARCH_VECTOR} @@ plainto_tsquery('english', "));
        query.push_bind(text.as_str());
        query.push(")");
    }

    if let Some(owner) = filter.owner {
        query.push(connective());
        query.push("notices.owner_id = ");
        query.push_bind(owner.get().cast_signed());
    }
}

fn push_page(query: &mut QueryBuilder<'_, Postgres>, page: PageRequest) {
    query.push(" LIMIT ");
    query.push_bind(i64::from(page.limit()));
    query.push(" OFFSET ");
    query.push_bind(page.offset().cast_signed());
}

#[cfg(test)]
mod tests {
    use crate::query::{count_notices, select_notices, select_notices_by_ids};
    use fellwerk_common::{
        model::{
            filter::{BirthdateWindow, NoticeFilter},
            notice::{NoticeCategory, Sex},
        },
        page::PageRequest,
    };
    use time::macros::date;

    #[test]
    fn empty_filter_selects_everything_newest_first() {
        let filter = NoticeFilter::default();
        let query = select_notices(&filter, PageRequest::default());
        let sql = query.sql();

        assert!(!sql.contains("WHERE"));
        assert!(sql.contains("ORDER BY notices.notice_id DESC"));
        assert!(sql.ends_with("LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn criteria_are_conjunctive() {
        let filter = NoticeFilter::default()
            .with_category(NoticeCategory::Sell)
            .with_sex(Sex::Female)
            .with_birthdate(BirthdateWindow {
                earliest: Some(date!(2018 - 08 - 07)),
                latest: Some(date!(2024 - 08 - 07)),
            });
        let query = select_notices(&filter, PageRequest::default());
        let sql = query.sql();

        assert!(sql.contains("WHERE notices.category = $1"));
        assert!(sql.contains("AND notices.sex = $2"));
        assert!(sql.contains("AND notices.birthdate >= $3"));
        assert!(sql.contains("AND notices.birthdate <= $4"));
    }

    #[test]
    fn text_criteria_rank_by_relevance() {
        let filter = NoticeFilter::default()
            .with_category(NoticeCategory::GoodHands)
            .with_text("tabby".to_owned());
        let query = select_notices(&filter, PageRequest::default());
        let sql = query.sql();

        assert!(sql.contains("@@ plainto_tsquery('english', $2)"));
        assert!(sql.contains("ORDER BY ts_rank"));
        assert!(!sql.contains("ORDER BY notices.notice_id"));
    }

    #[test]
    fn count_reuses_the_same_criteria_without_paging() {
        let filter = NoticeFilter::default().with_category(NoticeCategory::LostFound);
        let query = count_notices(&filter);
        let sql = query.sql();

        assert!(sql.starts_with("SELECT COUNT(*)"));
        assert!(sql.contains("WHERE notices.category = $1"));
        assert!(!sql.contains("LIMIT"));
    }

    #[test]
    fn favorite_resolution_matches_by_id_list() {
        let ids = [4_i64, 9];
        let query = select_notices_by_ids(&ids, PageRequest::default());
        let sql = query.sql();

        assert!(sql.contains("WHERE notices.notice_id = ANY($1)"));
        assert!(sql.ends_with("LIMIT $2 OFFSET $3"));
    }
}
