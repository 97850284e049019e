//! Sensitive data marker for automatic redaction
//!
//! The `Sensitive<T>` wrapper keeps secrets such as the chat channel token
//! out of logs, debug output and serialized configuration dumps.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const REDACTED: &str = "***REDACTED***";

/// Wrapper for sensitive data that redacts itself in Debug, Display and
/// serialization
///
/// Deserialization is transparent so that secrets can be read from
/// configuration files.
///
/// # Example
///
/// ```
/// use calltrail_core_types::Sensitive;
///
/// let token = Sensitive::new("secret123");
/// assert_eq!(format!("{:?}", token), "***REDACTED***");
/// assert_eq!(format!("{}", token), "***REDACTED***");
///
/// // Access the actual value when needed
/// assert_eq!(token.expose(), &"secret123");
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying sensitive value
    ///
    /// Use this only where the secret must actually be handed to a transport.
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> Serialize for Sensitive<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Sensitive<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Sensitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_debug_redaction() {
        let secret = Sensitive::new("chat-token-123");
        let debug_str = format!("{:?}", secret);
        assert_eq!(debug_str, REDACTED);
        assert!(!debug_str.contains("chat-token"));
    }

    #[test]
    fn test_sensitive_display_redaction() {
        let secret = Sensitive::new("api-key-12345");
        assert_eq!(format!("{}", secret), REDACTED);
    }

    #[test]
    fn test_sensitive_expose_and_into_inner() {
        let secret = Sensitive::new(String::from("test"));
        assert_eq!(secret.expose(), "test");
        assert_eq!(secret.into_inner(), "test");
    }

    #[test]
    fn test_sensitive_serializes_redacted() {
        let secret = Sensitive::new(String::from("hunter2"));
        let json = serde_json::to_string(&secret).unwrap();
        assert_eq!(json, "\"***REDACTED***\"");
    }

    #[test]
    fn test_sensitive_deserializes_transparently() {
        #[derive(Deserialize)]
        struct Chat {
            token: Sensitive<String>,
        }

        let chat: Chat = toml::from_str("token = \"abc\"").unwrap();
        assert_eq!(chat.token.expose(), "abc");
    }

    #[test]
    fn test_sensitive_inside_struct_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct ChatSettings {
            room: String,
            token: Sensitive<String>,
        }

        let settings = ChatSettings {
            room: "ops".to_string(),
            token: Sensitive::new("secret123".to_string()),
        };

        let debug_str = format!("{:?}", settings);
        assert!(debug_str.contains("ops"));
        assert!(debug_str.contains(REDACTED));
        assert!(!debug_str.contains("secret123"));
    }
}
