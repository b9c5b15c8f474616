use chrono::{Local, NaiveDateTime};

/// Layout of a session token: year through microsecond, fixed width, so
/// tokens sort in the order their sessions started.
pub const SESSION_TOKEN_FORMAT: &str = "%Y%m%d%H%M%S%6f";

/// Per-visitor session state.
///
/// The host creates one of these when a browsing session starts and hands it
/// to every `record_visit` call for that session. The token is generated on
/// first use and never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    token: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes a session whose token was issued earlier.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn ensure_session(&mut self) -> &str {
        self.ensure_session_at(Local::now().naive_local())
    }

    pub fn ensure_session_at(&mut self, now: NaiveDateTime) -> &str {
        self.token
            .get_or_insert_with(|| now.format(SESSION_TOKEN_FORMAT).to_string())
    }
}
