pub mod filter;
pub mod notice;
pub mod user;

use crate::model::notice::{InvalidNoticeCategoryError, InvalidNoticeTitleError, InvalidSexError};
use derive_where::derive_where;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, marker::PhantomData};
use thiserror::Error;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum ModelValidationError {
    #[error(transparent)]
    NoticeTitle(#[from] InvalidNoticeTitleError),
    #[error(transparent)]
    NoticeCategory(#[from] InvalidNoticeCategoryError),
    #[error(transparent)]
    Sex(#[from] InvalidSexError),
}

/// Store-assigned id, tagged with the entity it refers to.
#[derive_where(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<Marker>(u64, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id, PhantomData)
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> From<u64> for Id<Marker> {
    fn from(value: u64) -> Self {
        Id::new(value)
    }
}

impl<Marker> From<Id<Marker>> for u64 {
    fn from(value: Id<Marker>) -> Self {
        value.get()
    }
}
