//! Theme preference, persisted under the `theme` key.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::Error;
use super::persisted::{HydrationReport, Hydrated, hydrate_key, persist};
use super::ports::{KeyValueStore, StoreKey};

/// Stored preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    /// Always light.
    Light,
    /// Always dark.
    Dark,
    /// Follow the client's system setting.
    #[default]
    System,
}

impl ThemePreference {
    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// Concrete theme given the client's system setting.
    pub fn resolve(self, system_prefers_dark: bool) -> ResolvedTheme {
        match self {
            Self::Light => ResolvedTheme::Light,
            Self::Dark => ResolvedTheme::Dark,
            Self::System if system_prefers_dark => ResolvedTheme::Dark,
            Self::System => ResolvedTheme::Light,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised theme name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTheme(pub String);

impl fmt::Display for UnknownTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "theme must be light, dark or system; got '{}'", self.0)
    }
}

impl std::error::Error for UnknownTheme {}

impl FromStr for ThemePreference {
    type Err = UnknownTheme;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(UnknownTheme(other.to_owned())),
        }
    }
}

/// Theme actually applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    /// Light palette.
    Light,
    /// Dark palette.
    Dark,
}

/// Holds the theme preference.
pub struct ThemeManager {
    store: Arc<dyn KeyValueStore>,
    preference: ThemePreference,
}

impl ThemeManager {
    /// Load the preference; absent or unreadable ⇒ [`ThemePreference::System`].
    pub async fn hydrate(store: Arc<dyn KeyValueStore>, report: &mut HydrationReport) -> Self {
        let preference = match hydrate_key(store.as_ref(), StoreKey::Theme, report).await {
            Hydrated::Loaded(preference) => preference,
            Hydrated::Absent | Hydrated::Recovered => ThemePreference::default(),
        };
        Self { store, preference }
    }

    /// Current preference.
    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    /// Persist and apply a new preference.
    pub async fn set(&mut self, preference: ThemePreference) -> Result<ThemePreference, Error> {
        persist(self.store.as_ref(), StoreKey::Theme, &preference).await?;
        self.preference = preference;
        info!(theme = %preference, "theme preference changed");
        Ok(preference)
    }

    /// Theme to apply given the client's system setting.
    pub fn resolve(&self, system_prefers_dark: bool) -> ResolvedTheme {
        self.preference.resolve(system_prefers_dark)
    }
}
