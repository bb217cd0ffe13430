use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::UserStore;
use super::repo_types::{NewUser, User, UserChanges};
use crate::error::{AppError, AppResult};

/// Test double for `PgUserStore`. Email uniqueness and the atomic
/// `create_admin` check both happen under the write lock.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_admin(&self, id: Uuid, admin: bool) {
        if let Some(user) = self.users.write().await.iter_mut().find(|u| u.id == id) {
            user.admin = admin;
        }
    }

    pub async fn admin_count(&self) -> usize {
        self.users.read().await.iter().filter(|u| u.admin).count()
    }
}

fn insert(users: &mut Vec<User>, new: NewUser, admin: bool) -> AppResult<User> {
    if users.iter().any(|u| u.email == new.email) {
        return Err(AppError::DuplicateEmail);
    }
    let user = User {
        id: Uuid::new_v4(),
        firstname: new.firstname,
        lastname: new.lastname,
        email: new.email,
        password_hash: new.password_hash,
        address: new.address,
        zipcode: new.zipcode,
        city: new.city,
        phone: new.phone,
        admin,
        token_version: 0,
        created_at: OffsetDateTime::now_utc(),
    };
    users.push(user.clone());
    Ok(user)
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn admin_exists(&self) -> AppResult<bool> {
        let exists = self.users.read().await.iter().any(|u| u.admin);
        // widen the check-then-create window the way a network round trip would
        tokio::task::yield_now().await;
        Ok(exists)
    }

    async fn create(&self, new: NewUser) -> AppResult<User> {
        insert(&mut *self.users.write().await, new, false)
    }

    async fn create_admin(&self, new: NewUser) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.admin) {
            return Err(AppError::AdminAlreadyExists);
        }
        insert(&mut users, new, true)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<Option<User>> {
        let mut users = self.users.write().await;
        if let Some(email) = &changes.email {
            if users.iter().any(|u| &u.email == email && u.id != id) {
                return Err(AppError::DuplicateEmail);
            }
        }
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(v) = changes.firstname {
            user.firstname = v;
        }
        if let Some(v) = changes.lastname {
            user.lastname = v;
        }
        if let Some(v) = changes.email {
            user.email = v;
        }
        if let Some(v) = changes.password_hash {
            user.password_hash = v;
            user.token_version += 1;
        }
        if changes.address.is_some() {
            user.address = changes.address;
        }
        if changes.zipcode.is_some() {
            user.zipcode = changes.zipcode;
        }
        if changes.city.is_some() {
            user.city = changes.city;
        }
        if changes.phone.is_some() {
            user.phone = changes.phone;
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }

    async fn bump_token_version(&self, id: Uuid) -> AppResult<Option<i32>> {
        let mut users = self.users.write().await;
        Ok(users.iter_mut().find(|u| u.id == id).map(|u| {
            u.token_version += 1;
            u.token_version
        }))
    }
}
