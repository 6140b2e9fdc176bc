//! The signed-in user.
//!
//! Holds at most one [`User`] and publishes every change through a
//! `tokio::sync::watch` channel so dependants such as the favourites
//! synchronizer can re-key themselves. Nothing is persisted.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::domain::ports::MarketplaceApi;
use crate::domain::{DomainResult, Error, ProfileUpdate, User, UserName, UserRole};

/// Session holder backed by a watch channel.
pub struct SessionState<A> {
    api: Arc<A>,
    current: watch::Sender<Option<User>>,
}

impl<A> SessionState<A> {
    /// Start signed out.
    pub fn new(api: Arc<A>) -> Self {
        let (current, _) = watch::channel(None);
        Self { api, current }
    }

    /// Snapshot of the signed-in user.
    pub fn current(&self) -> Option<User> {
        self.current.borrow().clone()
    }

    /// Receiver observing every session change.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.current.subscribe()
    }

    /// Replace the signed-in user wholesale.
    pub fn update_user(&self, user: User) {
        self.current.send_replace(Some(user));
    }

    /// Clear the session.
    pub fn logout(&self) {
        if let Some(user) = self.current.send_replace(None) {
            info!(user_id = %user.id(), "signed out");
        }
    }
}

impl<A: MarketplaceApi> SessionState<A> {
    /// Resolve `name` and `role` through the marketplace and sign in.
    ///
    /// # Errors
    ///
    /// Returns the mapped marketplace error when the lookup fails; the
    /// session is left untouched in that case.
    pub async fn login(&self, name: &UserName, role: UserRole) -> DomainResult<User> {
        let user = self.api.login(name, role).await?;
        info!(user_id = %user.id(), ?role, "signed in");
        self.update_user(user.clone());
        Ok(user)
    }

    /// Apply a profile edit to the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::forbidden`] when nobody is signed in, or the mapped
    /// marketplace error when the update is rejected.
    pub async fn edit_profile(&self, update: ProfileUpdate) -> DomainResult<User> {
        let Some(current) = self.current() else {
            return Err(Error::forbidden("sign in to edit a profile"));
        };
        let user = self.api.update_user(current.id(), update).await?;
        self.update_user(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    //! Session transitions and their notifications.
    use super::*;
    use crate::domain::ports::{MarketplaceApiError, MockMarketplaceApi};
    use crate::domain::{ErrorCode, Profile, UserId};
    use rstest::{fixture, rstest};

    #[fixture]
    fn samuel() -> User {
        User::new(
            UserId::new("user-3").expect("valid id"),
            UserName::new("Samuel").expect("valid name"),
            Profile::Customer,
        )
    }

    #[rstest]
    #[tokio::test]
    async fn login_installs_user_and_notifies(samuel: User) {
        let mut api = MockMarketplaceApi::new();
        let returned = samuel.clone();
        api.expect_login()
            .withf(|name, role| name.to_string() == "Samuel" && *role == UserRole::Customer)
            .times(1)
            .return_once(move |_, _| Ok(returned));
        let session = SessionState::new(Arc::new(api));
        let mut changes = session.subscribe();

        let name = UserName::new("Samuel").expect("valid name");
        let user = session
            .login(&name, UserRole::Customer)
            .await
            .expect("login succeeds");

        assert_eq!(user, samuel);
        assert!(changes.has_changed().expect("sender alive"));
        assert_eq!(changes.borrow_and_update().as_ref(), Some(&samuel));
        assert_eq!(session.current(), Some(samuel));
    }

    #[rstest]
    #[tokio::test]
    async fn failed_login_keeps_session_empty() {
        let mut api = MockMarketplaceApi::new();
        api.expect_login()
            .return_once(|_, _| Err(MarketplaceApiError::unavailable("offline")));
        let session = SessionState::new(Arc::new(api));

        let name = UserName::new("Samuel").expect("valid name");
        let error = session
            .login(&name, UserRole::Customer)
            .await
            .expect_err("login fails");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
        assert!(session.current().is_none());
    }

    #[rstest]
    fn logout_clears_and_notifies(samuel: User) {
        let session = SessionState::new(Arc::new(MockMarketplaceApi::new()));
        session.update_user(samuel);
        let mut changes = session.subscribe();

        session.logout();

        assert!(changes.has_changed().expect("sender alive"));
        assert!(changes.borrow_and_update().is_none());
        assert!(session.current().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn edit_profile_requires_a_session() {
        let session = SessionState::new(Arc::new(MockMarketplaceApi::new()));
        let error = session
            .edit_profile(ProfileUpdate::default())
            .await
            .expect_err("no session");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn edit_profile_replaces_the_session_user(samuel: User) {
        let renamed = User::new(
            samuel.id().clone(),
            UserName::new("Sam").expect("valid name"),
            Profile::Customer,
        );
        let mut api = MockMarketplaceApi::new();
        let returned = renamed.clone();
        api.expect_update_user()
            .withf(|user_id, update| {
                user_id.as_str() == "user-3"
                    && update.name.as_ref().map(ToString::to_string).as_deref() == Some("Sam")
            })
            .times(1)
            .return_once(move |_, _| Ok(returned));
        let session = SessionState::new(Arc::new(api));
        session.update_user(samuel);

        let update = ProfileUpdate {
            name: Some(UserName::new("Sam").expect("valid name")),
            ..ProfileUpdate::default()
        };
        session.edit_profile(update).await.expect("edit succeeds");

        assert_eq!(session.current(), Some(renamed));
    }
}
