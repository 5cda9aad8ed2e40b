use crate::model::{Id, notice::NoticeMarker};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

/// The subset of a user's fields safe to embed in a notice response.
/// Credentials, tokens, verification state and the favorite set stay in
/// the store.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct OwnerSummary {
    pub id: Id<UserMarker>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Resolved authenticated identity attached to a request: the caller's id
/// plus a snapshot of their favorite set.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct Identity {
    pub id: Id<UserMarker>,
    pub favorite: FavoriteSet,
}

/// A user's favorite notices, duplicates forbidden.
///
/// `insert` and `remove` are the only transitions: absent→present and
/// present→absent respectively, each failing when the notice is already
/// on the requested side.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct FavoriteSet(Vec<Id<NoticeMarker>>);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum FavoriteError {
    #[error("Notice with id {0} is already a favorite")]
    AlreadyPresent(Id<NoticeMarker>),
    #[error("Notice with id {0} is not a favorite")]
    NotPresent(Id<NoticeMarker>),
}

impl FavoriteSet {
    #[must_use]
    pub fn new(ids: Vec<Id<NoticeMarker>>) -> Self {
        Self(ids)
    }

    #[must_use]
    pub fn contains(&self, id: Id<NoticeMarker>) -> bool {
        self.0.contains(&id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn ids(&self) -> &[Id<NoticeMarker>] {
        &self.0
    }

    pub fn insert(&mut self, id: Id<NoticeMarker>) -> Result<(), FavoriteError> {
        if self.contains(id) {
            return Err(FavoriteError::AlreadyPresent(id));
        }

        self.0.push(id);
        Ok(())
    }

    pub fn remove(&mut self, id: Id<NoticeMarker>) -> Result<(), FavoriteError> {
        let position = self
            .0
            .iter()
            .position(|member| *member == id)
            .ok_or(FavoriteError::NotPresent(id))?;

        self.0.remove(position);
        Ok(())
    }
}

impl FromIterator<Id<NoticeMarker>> for FavoriteSet {
    fn from_iter<T: IntoIterator<Item = Id<NoticeMarker>>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::model::user::{FavoriteError, FavoriteSet};

    #[test]
    fn insert_is_guarded_against_duplicates() {
        let mut favorites = FavoriteSet::default();

        assert_eq!(favorites.insert(3.into()), Ok(()));
        assert_eq!(
            favorites.insert(3.into()),
            Err(FavoriteError::AlreadyPresent(3.into()))
        );
        assert_eq!(favorites.len(), 1);
    }

    #[test]
    fn remove_requires_membership() {
        let mut favorites = FavoriteSet::new(vec![1.into(), 2.into()]);

        assert_eq!(favorites.remove(2.into()), Ok(()));
        assert_eq!(
            favorites.remove(2.into()),
            Err(FavoriteError::NotPresent(2.into()))
        );
    }

    #[test]
    fn insert_then_remove_restores_the_set() {
        let original = FavoriteSet::new(vec![5.into(), 7.into()]);

        let mut favorites = original.clone();
        favorites.insert(9.into()).unwrap();
        favorites.remove(9.into()).unwrap();

        assert_eq!(favorites, original);
    }
}
