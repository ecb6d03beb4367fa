//! # Session Context
//!
//! What the authentication layer knows about the current user, passed
//! explicitly into wallet resolution. No global auth singleton: whoever
//! drives the store hands it a [`Session`] value and re-resolves when it
//! changes.

use crate::config;

/// A snapshot of the authentication state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    /// The authenticated owner id, or `None` for an anonymous session.
    pub owner_id: Option<String>,

    /// `true` while the auth layer is still determining who the user is.
    /// The store holds resolution until this clears.
    pub loading: bool,
}

impl Session {
    /// Auth is still working; the store should wait.
    pub fn loading() -> Self {
        Self {
            owner_id: None,
            loading: true,
        }
    }

    /// No signed-in user. The wallet runs in local demo mode.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A signed-in user. The wallet resolves against remote storage.
    pub fn authenticated(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            loading: false,
        }
    }

    /// The owner this session's wallet is scoped to: the authenticated id,
    /// or the demo sentinel.
    pub fn owner_or_demo(&self) -> &str {
        self.owner_id.as_deref().unwrap_or(config::DEMO_OWNER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_scopes_to_demo() {
        assert_eq!(Session::anonymous().owner_or_demo(), "demo");
        assert!(!Session::anonymous().loading);
    }

    #[test]
    fn authenticated_scopes_to_owner() {
        let session = Session::authenticated("user-1");
        assert_eq!(session.owner_or_demo(), "user-1");
        assert!(!session.loading);
    }

    #[test]
    fn loading_has_no_owner() {
        let session = Session::loading();
        assert!(session.loading);
        assert_eq!(session.owner_id, None);
    }
}
