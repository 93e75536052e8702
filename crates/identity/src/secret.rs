//! Management API secret key.

/// Prefix of secret keys issued for development instances.
pub const DEVELOPMENT_KEY_PREFIX: &str = "sk_test_";

/// Prefix of secret keys issued for production instances.
pub const PRODUCTION_KEY_PREFIX: &str = "sk_live_";

/// Which kind of instance a secret key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEnvironment {
    Development,
    Production,
    Unknown,
}

/// Secret key for the identity platform's management API.
///
/// The `Debug` impl never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn environment(&self) -> KeyEnvironment {
        if self.0.starts_with(DEVELOPMENT_KEY_PREFIX) {
            KeyEnvironment::Development
        } else if self.0.starts_with(PRODUCTION_KEY_PREFIX) {
            KeyEnvironment::Production
        } else {
            KeyEnvironment::Unknown
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment() == KeyEnvironment::Development
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecretKey").field(&"<redacted>").finish()
    }
}
