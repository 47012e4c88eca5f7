use std::fmt;

/// Bearer credential for the admin endpoints.
///
/// Obtaining and refreshing the token happens elsewhere; clients only carry
/// the value they were constructed with.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// `None` for a blank token.
    pub fn from_token(token: Option<String>) -> Option<Self> {
        token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .map(Self::bearer)
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}
