use crate::model::{
    Id,
    user::{OwnerSummary, UserMarker},
};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;
use time::Date;

pub const NOTICE_TITLE_MAX_LEN: usize = 100;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct NoticeMarker;

/// A classified listing with its owner summary attached.
///
/// Creation and update timestamps exist in the store but are never part of
/// a response, so they do not appear here.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: Id<NoticeMarker>,
    pub category: NoticeCategory,
    pub title: NoticeTitle,
    pub comments: String,
    pub sex: Option<Sex>,
    pub birthdate: Option<Date>,
    pub image_url: String,
    pub owner: OwnerSummary,
}

/// Everything needed to persist a new notice. The owner comes from the
/// authenticated identity and the image URL from the upload collaborator,
/// not from the request body.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CreateNotice {
    pub owner: Id<UserMarker>,
    pub category: NoticeCategory,
    pub title: NoticeTitle,
    pub comments: String,
    pub sex: Option<Sex>,
    pub birthdate: Option<Date>,
    pub image_url: String,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoticeCategory {
    Sell,
    LostFound,
    GoodHands,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("Unknown notice category: {0}")]
pub struct InvalidNoticeCategoryError(String);

impl NoticeCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeCategory::Sell => "sell",
            NoticeCategory::LostFound => "lost-found",
            NoticeCategory::GoodHands => "good-hands",
        }
    }
}

impl Display for NoticeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoticeCategory {
    type Err = InvalidNoticeCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sell" => Ok(NoticeCategory::Sell),
            "lost-found" => Ok(NoticeCategory::LostFound),
            "good-hands" => Ok(NoticeCategory::GoodHands),
            other => Err(InvalidNoticeCategoryError(other.to_owned())),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("Unknown sex: {0}")]
pub struct InvalidSexError(String);

impl Sex {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = InvalidSexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            other => Err(InvalidSexError(other.to_owned())),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct NoticeTitle(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The notice title is invalid: {0:?}")]
pub struct InvalidNoticeTitleError(String);

impl NoticeTitle {
    pub fn new(title: String) -> Result<Self, InvalidNoticeTitleError> {
        let len = title.chars().count();
        if (1..=NOTICE_TITLE_MAX_LEN).contains(&len) {
            Ok(NoticeTitle(title))
        } else {
            Err(InvalidNoticeTitleError(title))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for NoticeTitle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        NoticeTitle::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"NoticeTitle"))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::notice::{NOTICE_TITLE_MAX_LEN, NoticeCategory, NoticeTitle, Sex};

    #[test]
    fn title_length_is_enforced() {
        assert!(NoticeTitle::new(String::new()).is_err());
        assert!(NoticeTitle::new("a".repeat(NOTICE_TITLE_MAX_LEN + 1)).is_err());

        let title = NoticeTitle::new("Grey tabby looking for a home".to_owned());
        assert_eq!(
            title.map(NoticeTitle::into_inner).as_deref(),
            Ok("Grey tabby looking for a home")
        );
    }

    #[test]
    fn category_tags_round_trip() {
        for category in [
            NoticeCategory::Sell,
            NoticeCategory::LostFound,
            NoticeCategory::GoodHands,
        ] {
            assert_eq!(category.as_str().parse(), Ok(category));
        }

        assert!("adoption".parse::<NoticeCategory>().is_err());
        assert!("male".parse::<Sex>().is_ok());
        assert!("unknown".parse::<Sex>().is_err());
    }
}
