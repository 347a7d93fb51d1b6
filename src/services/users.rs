//! User profile service

use validator::Validate;

use crate::{
    error::AppResult,
    models::user::{UpdateProfile, UserClaims, UserProfile},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    default_max_borrow_limit: i32,
}

impl UsersService {
    pub fn new(repository: Repository, default_max_borrow_limit: i32) -> Self {
        Self {
            repository,
            default_max_borrow_limit,
        }
    }

    /// Profile of the signed-in identity, created on first use
    pub async fn ensure_profile(&self, identity: &UserClaims) -> AppResult<UserProfile> {
        if let Some(profile) = self.repository.users.find(identity.sub).await? {
            return Ok(profile);
        }

        let profile = UserProfile::default_for(identity, self.default_max_borrow_limit);
        let profile = self.repository.users.insert(&profile).await?;
        tracing::info!("Created profile for user {}", profile.id);
        Ok(profile)
    }

    /// Profile with admin role, or an authorization error
    pub async fn require_admin(&self, identity: &UserClaims) -> AppResult<UserProfile> {
        let profile = self.ensure_profile(identity).await?;
        profile.require_admin()?;
        Ok(profile)
    }

    /// Update the editable fields of the caller's own profile
    pub async fn update_profile(
        &self,
        identity: &UserClaims,
        update: UpdateProfile,
    ) -> AppResult<UserProfile> {
        let update = update.normalized();
        update.validate()?;

        // The row may not exist yet on a first visit
        self.ensure_profile(identity).await?;
        let profile = self.repository.users.update_profile(identity.sub, &update).await?;
        tracing::info!("Updated profile for user {}", profile.id);
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use uuid::Uuid;

    use crate::{
        error::AppError,
        models::user::UserRole,
        repository::{MockBooksStore, MockBorrowingsStore, MockFavoritesStore, MockUsersStore},
    };

    fn service(users: MockUsersStore) -> UsersService {
        let repository = Repository {
            books: Arc::new(MockBooksStore::new()),
            borrowings: Arc::new(MockBorrowingsStore::new()),
            favorites: Arc::new(MockFavoritesStore::new()),
            users: Arc::new(users),
        };
        UsersService::new(repository, 5)
    }

    fn identity() -> UserClaims {
        UserClaims {
            sub: Uuid::new_v4(),
            email: Some("grace@example.org".to_string()),
            name: Some("Grace".to_string()),
            exp: (Utc::now() + chrono::Duration::hours(1)).timestamp(),
            iat: None,
        }
    }

    #[tokio::test]
    async fn test_ensure_profile_creates_default() {
        let mut users = MockUsersStore::new();
        users.expect_find().returning(|_| Ok(None));
        users
            .expect_insert()
            .withf(|p| p.full_name == "Grace" && p.role == UserRole::User && p.max_borrow_limit == 5)
            .times(1)
            .returning(|p| Ok(p.clone()));

        let identity = identity();
        let profile = service(users).ensure_profile(&identity).await.unwrap();
        assert_eq!(profile.id, identity.sub);
        assert_eq!(profile.email, "grace@example.org");
    }

    #[tokio::test]
    async fn test_ensure_profile_keeps_existing() {
        let identity = identity();
        let mut existing = UserProfile::default_for(&identity, 8);
        existing.role = UserRole::Admin;

        let mut users = MockUsersStore::new();
        users
            .expect_find()
            .returning(move |_| Ok(Some(existing.clone())));
        users.expect_insert().never();

        let users = service(users);
        let profile = users.require_admin(&identity).await.unwrap();
        assert_eq!(profile.max_borrow_limit, 8);
    }

    #[tokio::test]
    async fn test_require_admin_rejects_member() {
        let identity = identity();
        let member = UserProfile::default_for(&identity, 5);
        let mut users = MockUsersStore::new();
        users.expect_find().returning(move |_| Ok(Some(member.clone())));

        let result = service(users).require_admin(&identity).await;
        assert!(matches!(result, Err(AppError::Authorization(_))));
    }

    #[tokio::test]
    async fn test_update_profile_rejects_blank_name() {
        let mut users = MockUsersStore::new();
        users.expect_update_profile().never();

        let result = service(users)
            .update_profile(
                &identity(),
                UpdateProfile {
                    full_name: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
