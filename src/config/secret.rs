//! Secure credential handling using the secrecy crate
//!
//! Connection URIs and passwords are wrapped in [`SecretString`] as soon as they
//! are parsed. The value is zeroed on drop, redacted in `Debug` output, and only
//! reachable through `expose_secret()`.
//!
//! # Example
//!
//! ```rust
//! use sluice::config::{secret_string, SecretString};
//! use secrecy::ExposeSecret;
//!
//! let uri: SecretString = secret_string("mongodb://user:pw@localhost:27017".to_string());
//! assert_eq!(uri.expose_secret().as_ref(), "mongodb://user:pw@localhost:27017");
//! assert!(!format!("{uri:?}").contains("pw"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Debug, Default, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Secret string: zeroed on drop, redacted in `Debug`
pub type SecretString = Secret<SecretValue>;

#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Strip credentials from a connection URI so it can be logged
///
/// Falls back to keeping only the part after the last `@` when the URI is not
/// parseable (MongoDB seed lists with several hosts, for instance).
///
/// # Example
///
/// ```rust
/// use sluice::config::redact_uri;
///
/// assert_eq!(
///     redact_uri("postgresql://etl:hunter2@db:5432/odds"),
///     "postgresql://***@db:5432/odds"
/// );
/// ```
pub fn redact_uri(uri: &str) -> String {
    if let Ok(mut url) = Url::parse(uri) {
        if url.has_host() {
            let had_credentials = !url.username().is_empty() || url.password().is_some();
            if url.set_password(None).is_ok() && url.set_username("").is_ok() {
                let rendered = url.to_string();
                if !had_credentials {
                    return rendered;
                }
                let prefix = format!("{}://", url.scheme());
                if let Some(rest) = rendered.strip_prefix(&prefix) {
                    return format!("{prefix}***@{rest}");
                }
                return rendered;
            }
        }
    }

    let scheme = uri.split("://").next().unwrap_or("uri");
    match uri.rsplit_once('@') {
        Some((_, hosts)) => format!("{scheme}://***@{hosts}"),
        None => uri.to_string(),
    }
}
