//! In-memory user collection.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use super::model::{NewUser, User, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,
    #[error("email already exists")]
    DuplicateEmail,
}

/// The user collection, behind one lock.
///
/// Every operation, including id allocation, runs inside a single critical
/// section, so concurrent creates cannot hand out the same id or email.
/// Clones share the same collection.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Arc<Mutex<Vec<User>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All users in creation order.
    pub fn list(&self) -> Vec<User> {
        self.lock().clone()
    }

    pub fn get(&self, id: UserId) -> Result<User, StoreError> {
        self.lock().iter().find(|u| u.id == id).cloned().ok_or(StoreError::NotFound)
    }

    /// Exact, case-sensitive match.
    pub fn email_exists(&self, email: &str) -> bool {
        self.lock().iter().any(|u| u.email == email)
    }

    /// Stores a new user under `max(id) + 1`, or `1` when empty.
    pub fn create(&self, input: NewUser) -> Result<User, StoreError> {
        let mut users = self.lock();
        if users.iter().any(|u| u.email == input.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let id = users.iter().map(|u| u.id).max().map_or(1, |max| max + 1);
        let user = User {
            id,
            name: input.name,
            email: input.email,
            phone: input.phone,
            created_at: Utc::now(),
            updated_at: None,
        };
        users.push(user.clone());
        debug!(id, "user created");
        Ok(user)
    }

    /// Overwrites name, email and phone, and stamps `updated_at`.
    ///
    /// Keeping one's own email is fine; taking another user's is not.
    pub fn update(&self, id: UserId, input: NewUser) -> Result<User, StoreError> {
        let mut users = self.lock();
        if !users.iter().any(|u| u.id == id) {
            return Err(StoreError::NotFound);
        }
        if users.iter().any(|u| u.id != id && u.email == input.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let user = users.iter_mut().find(|u| u.id == id).ok_or(StoreError::NotFound)?;
        user.name = input.name;
        user.email = input.email;
        user.phone = input.phone;
        user.updated_at = Some(Utc::now());
        debug!(id, "user updated");
        Ok(user.clone())
    }

    pub fn delete(&self, id: UserId) -> Result<(), StoreError> {
        let mut users = self.lock();
        let pos = users.iter().position(|u| u.id == id).ok_or(StoreError::NotFound)?;
        users.remove(pos);
        debug!(id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser { name: name.to_owned(), email: email.to_owned(), phone: Some("5551234".to_owned()) }
    }

    #[test]
    fn ids_increase_and_skip_deleted_lower_ids() {
        let store = UserStore::new();
        let a = store.create(new_user("A", "a@x.io")).unwrap();
        let b = store.create(new_user("B", "b@x.io")).unwrap();
        let c = store.create(new_user("C", "c@x.io")).unwrap();
        assert_eq!((a.id, b.id, c.id), (1, 2, 3));

        store.delete(b.id).unwrap();
        let d = store.create(new_user("D", "d@x.io")).unwrap();
        assert_eq!(d.id, 4);
        assert_eq!(store.list().iter().map(|u| u.id).collect::<Vec<_>>(), [1, 3, 4]);
    }

    #[test]
    fn deleting_the_highest_id_lets_it_be_issued_again() {
        let store = UserStore::new();
        store.create(new_user("A", "a@x.io")).unwrap();
        let b = store.create(new_user("B", "b@x.io")).unwrap();
        store.delete(b.id).unwrap();
        assert_eq!(store.create(new_user("C", "c@x.io")).unwrap().id, 2);
    }

    #[test]
    fn duplicate_email_is_case_sensitive() {
        let store = UserStore::new();
        store.create(new_user("A", "a@x.io")).unwrap();
        assert_eq!(store.create(new_user("Other", "a@x.io")), Err(StoreError::DuplicateEmail));
        assert!(store.create(new_user("Other", "A@x.io")).is_ok());
    }

    #[test]
    fn update_keeps_own_email_but_not_anothers() {
        let store = UserStore::new();
        let a = store.create(new_user("A", "a@x.io")).unwrap();
        store.create(new_user("B", "b@x.io")).unwrap();

        let same = store.update(a.id, new_user("A2", "a@x.io")).unwrap();
        assert_eq!(same.name, "A2");
        assert_eq!(same.created_at, a.created_at);
        assert!(same.updated_at.is_some());

        assert_eq!(store.update(a.id, new_user("A3", "b@x.io")), Err(StoreError::DuplicateEmail));
        assert_eq!(store.get(a.id).unwrap().name, "A2");
    }

    #[test]
    fn missing_ids_are_not_found() {
        let store = UserStore::new();
        assert_eq!(store.get(9), Err(StoreError::NotFound));
        assert_eq!(store.update(9, new_user("A", "a@x.io")), Err(StoreError::NotFound));
        assert_eq!(store.delete(9), Err(StoreError::NotFound));
    }

    #[test]
    fn concurrent_creates_get_distinct_ids() {
        let store = UserStore::new();
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        store.create(new_user("U", &format!("u{t}-{i}@x.io"))).unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let mut ids: Vec<_> = store.list().into_iter().map(|u| u.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=400).collect::<Vec<_>>());
    }
}
