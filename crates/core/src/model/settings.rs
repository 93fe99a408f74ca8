use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Language used when the user has not picked one.
pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LicenseTypeError {
    #[error("unknown license type: {0}")]
    Unknown(String),
}

/// Kind of permit the user is studying for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseType {
    Car,
    Motorcycle,
    Cdl,
}

impl LicenseType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LicenseType::Car => "car",
            LicenseType::Motorcycle => "motorcycle",
            LicenseType::Cdl => "cdl",
        }
    }
}

impl fmt::Display for LicenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseType {
    type Err = LicenseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "car" => Ok(Self::Car),
            "motorcycle" => Ok(Self::Motorcycle),
            "cdl" => Ok(Self::Cdl),
            other => Err(LicenseTypeError::Unknown(other.to_owned())),
        }
    }
}

/// Singleton user preferences and onboarding state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub display_name: Option<String>,
    pub selected_state: Option<String>,
    pub license_type: Option<LicenseType>,
    pub language: String,
    pub dark_mode: bool,
    pub sound_effects: bool,
    pub onboarding_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSettings {
    /// Settings for a user that has never saved anything.
    #[must_use]
    pub fn defaults_at(now: DateTime<Utc>) -> Self {
        Self {
            display_name: None,
            selected_state: None,
            license_type: None,
            language: DEFAULT_LANGUAGE.to_owned(),
            dark_mode: false,
            sound_effects: true,
            onboarding_complete: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Shallow-merge `patch` onto these settings and refresh `updated_at`.
    #[must_use]
    pub fn merged(mut self, patch: UserSettingsPatch, now: DateTime<Utc>) -> Self {
        if let Some(display_name) = patch.display_name {
            self.display_name = display_name;
        }
        if let Some(selected_state) = patch.selected_state {
            self.selected_state = selected_state;
        }
        if let Some(license_type) = patch.license_type {
            self.license_type = license_type;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(dark_mode) = patch.dark_mode {
            self.dark_mode = dark_mode;
        }
        if let Some(sound_effects) = patch.sound_effects {
            self.sound_effects = sound_effects;
        }
        if let Some(onboarding_complete) = patch.onboarding_complete {
            self.onboarding_complete = onboarding_complete;
        }
        self.updated_at = now;
        self
    }
}

/// Persisted settings as found on disk.
///
/// Every field is optional so older or partially written blobs still load;
/// missing fields fall back to the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredUserSettings {
    pub display_name: Option<String>,
    pub selected_state: Option<String>,
    pub license_type: Option<LicenseType>,
    pub language: Option<String>,
    pub dark_mode: Option<bool>,
    pub sound_effects: Option<bool>,
    pub onboarding_complete: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredUserSettings {
    /// Fill the gaps of a stored blob with defaults stamped at `now`.
    #[must_use]
    pub fn into_settings(self, now: DateTime<Utc>) -> UserSettings {
        let defaults = UserSettings::defaults_at(now);
        UserSettings {
            display_name: self.display_name,
            selected_state: self.selected_state,
            license_type: self.license_type,
            language: self.language.unwrap_or(defaults.language),
            dark_mode: self.dark_mode.unwrap_or(defaults.dark_mode),
            sound_effects: self.sound_effects.unwrap_or(defaults.sound_effects),
            onboarding_complete: self
                .onboarding_complete
                .unwrap_or(defaults.onboarding_complete),
            created_at: self.created_at.unwrap_or(defaults.created_at),
            updated_at: self.updated_at.unwrap_or(defaults.updated_at),
        }
    }
}

impl From<UserSettings> for StoredUserSettings {
    fn from(settings: UserSettings) -> Self {
        Self {
            display_name: settings.display_name,
            selected_state: settings.selected_state,
            license_type: settings.license_type,
            language: Some(settings.language),
            dark_mode: Some(settings.dark_mode),
            sound_effects: Some(settings.sound_effects),
            onboarding_complete: Some(settings.onboarding_complete),
            created_at: Some(settings.created_at),
            updated_at: Some(settings.updated_at),
        }
    }
}

/// Partial update for `UserSettings`.
///
/// `None` leaves a field untouched. Nullable fields use `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSettingsPatch {
    pub display_name: Option<Option<String>>,
    pub selected_state: Option<Option<String>>,
    pub license_type: Option<Option<LicenseType>>,
    pub language: Option<String>,
    pub dark_mode: Option<bool>,
    pub sound_effects: Option<bool>,
    pub onboarding_complete: Option<bool>,
}

impl UserSettingsPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn display_name(mut self, name: Option<String>) -> Self {
        self.display_name = Some(name);
        self
    }

    #[must_use]
    pub fn selected_state(mut self, code: Option<String>) -> Self {
        self.selected_state = Some(code);
        self
    }

    #[must_use]
    pub fn license_type(mut self, license: Option<LicenseType>) -> Self {
        self.license_type = Some(license);
        self
    }

    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub fn dark_mode(mut self, enabled: bool) -> Self {
        self.dark_mode = Some(enabled);
        self
    }

    #[must_use]
    pub fn sound_effects(mut self, enabled: bool) -> Self {
        self.sound_effects = Some(enabled);
        self
    }

    #[must_use]
    pub fn onboarding_complete(mut self, complete: bool) -> Self {
        self.onboarding_complete = Some(complete);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn merge_only_touches_given_fields() {
        let created = fixed_now();
        let later = created + Duration::minutes(5);
        let settings = UserSettings::defaults_at(created).merged(
            UserSettingsPatch::new()
                .display_name(Some("Sam".into()))
                .license_type(Some(LicenseType::Motorcycle)),
            later,
        );

        assert_eq!(settings.display_name.as_deref(), Some("Sam"));
        assert_eq!(settings.license_type, Some(LicenseType::Motorcycle));
        assert_eq!(settings.language, DEFAULT_LANGUAGE);
        assert!(settings.sound_effects);
        assert_eq!(settings.created_at, created);
        assert_eq!(settings.updated_at, later);
    }

    #[test]
    fn patch_can_clear_nullable_fields() {
        let now = fixed_now();
        let settings = UserSettings::defaults_at(now)
            .merged(UserSettingsPatch::new().selected_state(Some("CA".into())), now)
            .merged(UserSettingsPatch::new().selected_state(None), now);
        assert_eq!(settings.selected_state, None);
    }

    #[test]
    fn stored_blob_missing_fields_uses_defaults() {
        let stored: StoredUserSettings =
            serde_json::from_str(r#"{"displayName":"Ana","darkMode":true}"#).unwrap();
        let settings = stored.into_settings(fixed_now());
        assert_eq!(settings.display_name.as_deref(), Some("Ana"));
        assert!(settings.dark_mode);
        assert!(settings.sound_effects);
        assert!(!settings.onboarding_complete);
        assert_eq!(settings.created_at, fixed_now());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(UserSettings::defaults_at(fixed_now())).unwrap();
        assert_eq!(json["soundEffects"], serde_json::Value::Bool(true));
        assert!(json["licenseType"].is_null());
        assert!(json.get("onboardingComplete").is_some());
    }

    #[test]
    fn license_type_parses_lowercase_only() {
        assert_eq!("cdl".parse::<LicenseType>().unwrap(), LicenseType::Cdl);
        assert!("Car".parse::<LicenseType>().is_err());
    }
}
