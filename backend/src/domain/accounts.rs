//! Registered accounts and the desk's single session.
//!
//! [`AccountManager`] owns the account list (with password hashes) and the
//! session user. It exists only once hydrated from the store, so nothing can
//! overwrite persisted data with in-memory defaults before the stored state
//! has been read.
//!
//! Writes are persist-then-commit: the store is updated first and the
//! in-memory state only changes once the write succeeded.
//!
//! ```text
//! anonymous --login / register--> authenticated --logout--> anonymous
//! ```

use std::sync::Arc;

use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::defaults::default_accounts;
use super::persisted::{HydrationIssueKind, HydrationReport, Hydrated, forget, hydrate_key, persist};
use super::ports::{HashingError, KeyValueStore, PasswordHasher, StoreKey};
use super::{
    DisplayName, Email, Error, LoginCredentials, PasswordHash, Registration, Role, User,
    UserId, UserUpdate,
};

/// A registered account: the public [`User`] plus its password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    id: UserId,
    name: DisplayName,
    email: Email,
    role: Role,
    password_hash: PasswordHash,
}

impl Account {
    /// Pair a user with its credential.
    pub fn new(user: User, password_hash: PasswordHash) -> Self {
        Self {
            id: user.id().clone(),
            name: user.name().clone(),
            email: user.email().clone(),
            role: user.role(),
            password_hash,
        }
    }

    /// Account identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Account role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Stored credential hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// The credential-free view of this account.
    pub fn user(&self) -> User {
        User::new(
            self.id.clone(),
            self.name.clone(),
            self.email.clone(),
            self.role,
        )
    }
}

fn map_hashing_error(error: HashingError) -> Error {
    Error::internal(format!("password hashing failed: {error}"))
}

/// Account list plus session, mirrored to the `users` and `currentUser`
/// keys.
pub struct AccountManager {
    store: Arc<dyn KeyValueStore>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    accounts: Vec<Account>,
    session: Option<User>,
}

impl AccountManager {
    /// Load accounts and the session from the store.
    ///
    /// An absent `users` key is seeded with the default accounts and written
    /// back. A corrupt `users` or `currentUser` document falls back to the
    /// defaults (respectively no session) and is recorded in `report`.
    pub async fn hydrate(
        store: Arc<dyn KeyValueStore>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
        report: &mut HydrationReport,
    ) -> Result<Self, Error> {
        let accounts = match hydrate_key::<Vec<Account>>(store.as_ref(), StoreKey::Users, report).await
        {
            Hydrated::Loaded(accounts) => accounts,
            Hydrated::Recovered => default_accounts(hasher.as_ref()).map_err(map_hashing_error)?,
            Hydrated::Absent => {
                let seeded = default_accounts(hasher.as_ref()).map_err(map_hashing_error)?;
                if let Err(err) = persist(store.as_ref(), StoreKey::Users, &seeded).await {
                    report.record(
                        StoreKey::Users,
                        HydrationIssueKind::SeedNotPersisted {
                            message: err.message().to_owned(),
                        },
                    );
                }
                seeded
            }
        };

        let session =
            match hydrate_key::<User>(store.as_ref(), StoreKey::CurrentUser, report).await {
                Hydrated::Loaded(user) if accounts.iter().any(|a| a.id() == user.id()) => Some(user),
                Hydrated::Loaded(user) => {
                    report.record(
                        StoreKey::CurrentUser,
                        HydrationIssueKind::Corrupt {
                            message: format!("session user {} has no account", user.id()),
                        },
                    );
                    None
                }
                Hydrated::Absent | Hydrated::Recovered => None,
            };

        Ok(Self {
            store,
            hasher,
            clock,
            accounts,
            session,
        })
    }

    /// Whether a session is active.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// The session user, if any.
    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref()
    }

    /// Every registered user, without credentials.
    pub fn users(&self) -> Vec<User> {
        self.accounts.iter().map(Account::user).collect()
    }

    /// Number of registered accounts.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Start a session for the first account matching email, password and
    /// role.
    ///
    /// Any mismatch yields `Unauthorized("invalid credentials")` and leaves the
    /// session untouched.
    pub async fn login(&mut self, credentials: &LoginCredentials) -> Result<User, Error> {
        let user = self
            .find_matching(credentials)
            .ok_or_else(|| {
                info!(role = %credentials.role(), "login rejected");
                Error::unauthorized("invalid credentials")
            })?;
        self.start_session(user).await
    }

    fn find_matching(&self, credentials: &LoginCredentials) -> Option<User> {
        self.accounts
            .iter()
            .filter(|account| {
                account.email() == credentials.email() && account.role() == credentials.role()
            })
            .find(|account| {
                self.hasher
                    .verify(credentials.password(), account.password_hash())
                    .unwrap_or_else(|err| {
                        warn!(user_id = %account.id(), error = %err, "stored password hash unusable");
                        false
                    })
            })
            .map(Account::user)
    }

    async fn start_session(&mut self, user: User) -> Result<User, Error> {
        persist(self.store.as_ref(), StoreKey::CurrentUser, &user).await?;
        info!(user_id = %user.id(), role = %user.role(), "session started");
        self.session = Some(user.clone());
        Ok(user)
    }

    /// Register a new account and sign it in.
    ///
    /// A duplicate email yields `Conflict("email already exists")` and leaves
    /// the account list unchanged. If the account is stored but the session
    /// cannot be, the account is kept and the error is returned.
    pub async fn register(&mut self, registration: &Registration) -> Result<User, Error> {
        if self.email_taken(registration.email(), None) {
            return Err(Error::conflict("email already exists"));
        }
        let user = User::new(
            self.allocate_id()?,
            registration.name().clone(),
            registration.email().clone(),
            registration.role(),
        );
        let hash = self
            .hasher
            .hash(registration.password())
            .map_err(map_hashing_error)?;

        let mut accounts = self.accounts.clone();
        accounts.push(Account::new(user.clone(), hash));
        persist(self.store.as_ref(), StoreKey::Users, &accounts).await?;
        self.accounts = accounts;
        info!(user_id = %user.id(), role = %user.role(), "account registered");

        self.start_session(user).await
    }

    fn email_taken(&self, email: &Email, except: Option<&UserId>) -> bool {
        self.accounts
            .iter()
            .any(|account| account.email() == email && Some(account.id()) != except)
    }

    fn allocate_id(&self) -> Result<UserId, Error> {
        let base = format!("user-{}", self.clock.utc().timestamp_millis());
        let taken = |candidate: &str| {
            self.accounts
                .iter()
                .any(|account| account.id().as_ref() == candidate)
        };
        let candidate = (1..)
            .map(|n: u32| if n == 1 { base.clone() } else { format!("{base}-{n}") })
            .find(|candidate| !taken(candidate))
            .unwrap_or(base);
        UserId::new(&candidate)
            .map_err(|err| Error::internal(format!("allocated invalid user id {candidate}: {err}")))
    }

    /// End the session.
    ///
    /// The in-memory session is always cleared; an error means the stored
    /// session key could not be removed.
    pub async fn logout(&mut self) -> Result<(), Error> {
        if let Some(user) = self.session.take() {
            info!(user_id = %user.id(), "session ended");
        }
        forget(self.store.as_ref(), StoreKey::CurrentUser).await
    }

    /// Apply a profile update to the session user and its account.
    pub async fn update_user(&mut self, update: &UserUpdate) -> Result<User, Error> {
        let current = self
            .session
            .as_ref()
            .ok_or_else(|| Error::unauthorized("login required"))?;
        if update
            .email()
            .is_some_and(|email| self.email_taken(email, Some(current.id())))
        {
            return Err(Error::conflict("email already exists"));
        }

        let mut user = current.clone();
        if let Some(name) = update.name() {
            user.set_name(name.clone());
        }
        if let Some(email) = update.email() {
            user.set_email(email.clone());
        }

        let mut accounts = self.accounts.clone();
        let account = accounts
            .iter_mut()
            .find(|account| account.id() == user.id())
            .ok_or_else(|| Error::not_found(format!("account {} not found", user.id())))?;
        let password_hash = match update.password() {
            Some(password) => self.hasher.hash(password).map_err(map_hashing_error)?,
            None => account.password_hash().clone(),
        };
        *account = Account::new(user.clone(), password_hash);

        persist(self.store.as_ref(), StoreKey::Users, &accounts).await?;
        self.accounts = accounts;
        persist(self.store.as_ref(), StoreKey::CurrentUser, &user).await?;
        self.session = Some(user.clone());
        info!(user_id = %user.id(), "profile updated");
        Ok(user)
    }
}
