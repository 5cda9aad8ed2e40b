use fellwerk_common::model::{
    ModelValidationError,
    notice::{Notice, NoticeTitle},
    user::{Identity, OwnerSummary},
};
use time::Date;

#[derive(Clone, Eq, PartialEq, Debug, sqlx::FromRow)]
pub(crate) struct NoticeRecord {
    pub notice_id: i64,
    pub category: String,
    pub title: String,
    pub comments: String,
    pub sex: Option<String>,
    pub birthdate: Option<Date>,
    pub image_url: String,
    pub owner_id: i64,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, sqlx::FromRow)]
pub(crate) struct IdentityRecord {
    pub user_id: i64,
    pub favorite: Vec<i64>,
}

impl TryFrom<NoticeRecord> for Notice {
    type Error = ModelValidationError;

    fn try_from(value: NoticeRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.notice_id.cast_unsigned().into(),
            category: value.category.parse()?,
            title: NoticeTitle::new(value.title)?,
            comments: value.comments,
            sex: value.sex.as_deref().map(str::parse).transpose()?,
            birthdate: value.birthdate,
            image_url: value.image_url,
            owner: OwnerSummary {
                id: value.owner_id.cast_unsigned().into(),
                name: value.owner_name,
                email: value.owner_email,
                phone: value.owner_phone,
            },
        })
    }
}

impl From<IdentityRecord> for Identity {
    fn from(value: IdentityRecord) -> Self {
        Self {
            id: value.user_id.cast_unsigned().into(),
            favorite: value
                .favorite
                .into_iter()
                .map(|id| id.cast_unsigned().into())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::record::{IdentityRecord, NoticeRecord};
    use fellwerk_common::model::{
        notice::{Notice, NoticeCategory, Sex},
        user::Identity,
    };

    fn record() -> NoticeRecord {
        NoticeRecord {
            notice_id: 12,
            category: "sell".to_owned(),
            title: "Friendly husky puppy".to_owned(),
            comments: "Vaccinated, loves snow".to_owned(),
            sex: Some("male".to_owned()),
            birthdate: None,
            image_url: "https://img.example/husky.jpg".to_owned(),
            owner_id: 7,
            owner_name: "Ira".to_owned(),
            owner_email: "ira@example.com".to_owned(),
            owner_phone: None,
        }
    }

    #[test]
    fn record_maps_into_notice_with_owner_summary() {
        let notice = Notice::try_from(record()).unwrap();

        assert_eq!(notice.id, 12.into());
        assert_eq!(notice.category, NoticeCategory::Sell);
        assert_eq!(notice.sex, Some(Sex::Male));
        assert_eq!(notice.owner.id, 7.into());
        assert_eq!(notice.owner.email, "ira@example.com");
    }

    #[test]
    fn unknown_stored_tags_are_rejected() {
        let mut bad_category = record();
        bad_category.category = "auction".to_owned();
        assert!(Notice::try_from(bad_category).is_err());

        let mut bad_sex = record();
        bad_sex.sex = Some("other".to_owned());
        assert!(Notice::try_from(bad_sex).is_err());
    }

    #[test]
    fn identity_record_keeps_favorite_order() {
        let identity = Identity::from(IdentityRecord {
            user_id: 3,
            favorite: vec![9, 4],
        });

        assert_eq!(identity.id, 3.into());
        assert_eq!(identity.favorite.ids(), [9.into(), 4.into()]);
    }
}
