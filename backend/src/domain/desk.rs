//! The desk: the owned application state for one process.
//!
//! A [`Desk`] owns the theme, account and complaint managers. It is created
//! once at start-up by [`Desk::open`], which hydrates every manager from the
//! store, and lives until shutdown. Adapters share it behind a mutex so every
//! operation sees a consistent state.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::accounts::AccountManager;
use super::complaints::ComplaintManager;
use super::persisted::HydrationReport;
use super::ports::{KeyValueStore, PasswordHasher};
use super::theme::ThemeManager;
use super::{Error, User};

/// Outbound ports the desk depends on.
#[derive(Clone)]
pub struct DeskPorts {
    /// Key-value store backing every manager.
    pub store: Arc<dyn KeyValueStore>,
    /// Password hasher for registration and login.
    pub hasher: Arc<dyn PasswordHasher>,
    /// Clock for timestamps and generated ids.
    pub clock: Arc<dyn Clock>,
}

/// Owned application state: accounts with the session, complaints, theme.
pub struct Desk {
    accounts: AccountManager,
    complaints: ComplaintManager,
    theme: ThemeManager,
}

impl Desk {
    /// Hydrate theme, accounts and complaints, in that order.
    ///
    /// Unreadable documents never fail the open; they are listed in the
    /// returned [`HydrationReport`]. Only an unusable password hasher does.
    pub async fn open(ports: DeskPorts) -> Result<(Self, HydrationReport), Error> {
        let DeskPorts {
            store,
            hasher,
            clock,
        } = ports;
        let mut report = HydrationReport::default();
        let theme = ThemeManager::hydrate(store.clone(), &mut report).await;
        let accounts =
            AccountManager::hydrate(store.clone(), hasher, clock.clone(), &mut report).await?;
        let complaints = ComplaintManager::hydrate(store, clock, &mut report).await;
        info!(
            accounts = accounts.account_count(),
            complaints = complaints.len(),
            authenticated = accounts.is_authenticated(),
            clean = report.is_clean(),
            "desk hydrated"
        );
        Ok((
            Self {
                accounts,
                complaints,
                theme,
            },
            report,
        ))
    }

    /// Accounts and the session.
    pub fn accounts(&self) -> &AccountManager {
        &self.accounts
    }

    /// Mutable access to accounts and the session.
    pub fn accounts_mut(&mut self) -> &mut AccountManager {
        &mut self.accounts
    }

    /// The complaint collection.
    pub fn complaints(&self) -> &ComplaintManager {
        &self.complaints
    }

    /// Mutable access to the complaint collection.
    pub fn complaints_mut(&mut self) -> &mut ComplaintManager {
        &mut self.complaints
    }

    /// The theme preference.
    pub fn theme(&self) -> &ThemeManager {
        &self.theme
    }

    /// Mutable access to the theme preference.
    pub fn theme_mut(&mut self) -> &mut ThemeManager {
        &mut self.theme
    }

    /// The session user, or `Unauthorized("login required")`.
    pub fn require_user(&self) -> Result<User, Error> {
        self.accounts
            .current_user()
            .cloned()
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// The session user if it is an administrator.
    ///
    /// Anonymous callers get `Unauthorized`; signed-in non-administrators get
    /// `Forbidden("administrator role required")`.
    pub fn require_admin(&self) -> Result<User, Error> {
        let user = self.require_user()?;
        if user.is_admin() {
            Ok(user)
        } else {
            Err(Error::forbidden("administrator role required"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::StoreKey;
    use crate::domain::{ErrorCode, LoginCredentials, Role};
    use crate::test_support::FixturePorts;
    use rstest::rstest;
    use serde_json::json;

    #[tokio::test]
    async fn fresh_desk_seeds_every_key_but_session_and_theme() {
        let ports = FixturePorts::new();
        let (desk, report) = ports.open().await;
        assert!(report.is_clean());
        assert!(!desk.accounts().is_authenticated());
        assert!(ports.store.snapshot(StoreKey::Users).is_some());
        assert!(ports.store.snapshot(StoreKey::Complaints).is_some());
        assert!(ports.store.snapshot(StoreKey::CurrentUser).is_none());
        assert!(ports.store.snapshot(StoreKey::Theme).is_none());
    }

    #[tokio::test]
    async fn report_collects_issues_from_every_manager() {
        let store = crate::domain::ports::MemoryKeyValueStore::with_entry(
            StoreKey::Theme,
            json!("not an envelope"),
        );
        let ports = FixturePorts::with_store(store);
        let (_, report) = ports.open().await;
        assert_eq!(report.issues().len(), 1);
        assert_eq!(report.issues()[0].key, StoreKey::Theme);
    }

    #[rstest]
    #[case(None, ErrorCode::Unauthorized)]
    #[case(Some(("manish@example.com", "password123", Role::User)), ErrorCode::Forbidden)]
    #[tokio::test]
    async fn guards_reject_missing_or_insufficient_sessions(
        #[case] login: Option<(&str, &str, Role)>,
        #[case] admin_error: ErrorCode,
    ) {
        let ports = FixturePorts::new();
        let (mut desk, _) = ports.open().await;
        if let Some((email, password, role)) = login {
            let creds = LoginCredentials::try_from_parts(email, password, Some(role)).expect("shape");
            desk.accounts_mut().login(&creds).await.expect("login");
            assert!(desk.require_user().is_ok());
        } else {
            assert_eq!(
                desk.require_user().expect_err("anonymous").code(),
                ErrorCode::Unauthorized
            );
        }
        assert_eq!(desk.require_admin().expect_err("not admin").code(), admin_error);
    }

    #[tokio::test]
    async fn admin_guard_admits_administrators() {
        let ports = FixturePorts::new();
        let (mut desk, _) = ports.open().await;
        let creds = LoginCredentials::try_from_parts("admin@example.com", "admin123", Some(Role::Admin))
            .expect("shape");
        desk.accounts_mut().login(&creds).await.expect("login");
        assert!(desk.require_admin().expect("admin").is_admin());
    }
}
