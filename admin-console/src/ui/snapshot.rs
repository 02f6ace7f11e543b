//! Per-session copies of a screen's collection.
//!
//! A screen fetches its records when it is opened and keeps them here while
//! the user sorts, filters and pages. Successful mutations patch the copy in
//! place instead of refetching.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tower_sessions::{session, Session};

use crate::models::forms::UserUpdate;
use crate::models::{Permission, Role, User};

pub const USERS: Snapshot<User> = Snapshot::new("snapshot.users");
/// Role list backing the role filter and role selects on the users screen.
pub const USER_ROLES: Snapshot<Role> = Snapshot::new("snapshot.users.roles");
pub const ROLES: Snapshot<Role> = Snapshot::new("snapshot.roles");
pub const PERMISSIONS: Snapshot<Permission> = Snapshot::new("snapshot.permissions");

pub struct Snapshot<T> {
    key: &'static str,
    _records: PhantomData<fn() -> T>,
}

impl<T> Snapshot<T> {
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            _records: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> Snapshot<T> {
    pub async fn load(&self, session: &Session) -> Result<Option<Vec<T>>, session::Error> {
        session.get(self.key).await
    }

    pub async fn store(&self, session: &Session, records: &[T]) -> Result<(), session::Error> {
        session.insert(self.key, records).await
    }

    /// Apply `change` to the stored copy. Returns false when there is no copy.
    pub async fn patch<F>(&self, session: &Session, change: F) -> Result<bool, session::Error>
    where
        F: FnOnce(&mut Vec<T>),
    {
        let Some(mut records) = self.load(session).await? else {
            return Ok(false);
        };
        change(&mut records);
        self.store(session, &records).await?;
        Ok(true)
    }
}

/// Records addressed by id.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for User {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Role {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Permission {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Flip `isActive` on one user and touch nothing else.
pub fn toggle_status(users: &mut [User], id: &str) -> bool {
    match users.iter_mut().find(|u| u.id == id) {
        Some(user) => {
            user.is_active = !user.is_active;
            true
        }
        None => false,
    }
}

pub fn remove<T: Keyed>(records: &mut Vec<T>, id: &str) -> bool {
    let before = records.len();
    records.retain(|r| r.key() != id);
    records.len() != before
}

pub fn replace<T: Keyed>(records: &mut [T], fresh: T) -> bool {
    match records.iter_mut().find(|r| r.key() == fresh.key()) {
        Some(slot) => {
            *slot = fresh;
            true
        }
        None => false,
    }
}

/// Copy submitted fields onto a user when the refetch after an update failed.
/// Roles stay as they were.
pub fn merge_update(users: &mut [User], id: &str, update: &UserUpdate) -> bool {
    match users.iter_mut().find(|u| u.id == id) {
        Some(user) => {
            user.username = update.username.clone();
            user.email = update.email.clone();
            user.first_name = Some(update.first_name.clone());
            user.last_name = Some(update.last_name.clone());
            true
        }
        None => false,
    }
}
