//! Identity collaborator
//!
//! The tracker never reads ambient session state. It is handed an
//! [`IdentityProvider`] and resolves the actor once per emitted entry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::audit::Actor;
use crate::config::settings::InspectorSettings;
use crate::error::FieldLogResult;

/// The signed-in user as reported by the auth provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Profile details looked up by user id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Source of the current user and their profile
///
/// Both lookups are best-effort: `Ok(None)` means "nobody", an `Err` means
/// the lookup itself failed.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> FieldLogResult<Option<SessionUser>>;

    async fn profile(&self, user_id: &str) -> FieldLogResult<Option<UserProfile>>;
}

/// Fixed identity, configured up front
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    user: Option<SessionUser>,
    profile: Option<UserProfile>,
}

impl StaticIdentity {
    /// Identity with no user; every entry gets null actor fields
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(user: SessionUser, profile: Option<UserProfile>) -> Self {
        Self {
            user: Some(user),
            profile,
        }
    }

    /// Build from the inspector block of the settings file
    ///
    /// The email stands in for the id when no id is configured.
    pub fn from_settings(inspector: &InspectorSettings) -> Self {
        let id = inspector.id.clone().or_else(|| inspector.email.clone());
        let Some(id) = id else {
            return Self::anonymous();
        };

        let profile = if inspector.name.is_some() || inspector.role.is_some() {
            Some(UserProfile {
                full_name: inspector.name.clone(),
                role: inspector.role.clone(),
            })
        } else {
            None
        };

        Self::new(
            SessionUser {
                id,
                email: inspector.email.clone(),
            },
            profile,
        )
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user(&self) -> FieldLogResult<Option<SessionUser>> {
        Ok(self.user.clone())
    }

    async fn profile(&self, user_id: &str) -> FieldLogResult<Option<UserProfile>> {
        match &self.user {
            Some(user) if user.id == user_id => Ok(self.profile.clone()),
            _ => Ok(None),
        }
    }
}

/// Resolve the actor for an audit entry
///
/// Never fails. Lookup errors are logged and leave the affected fields null.
/// The display name falls back to the email when the profile has no name.
pub async fn resolve_actor(identity: &dyn IdentityProvider) -> Actor {
    let user = match identity.current_user().await {
        Ok(Some(user)) => user,
        Ok(None) => return Actor::default(),
        Err(e) => {
            warn!(error = %e, "could not resolve current user for audit entry");
            return Actor::default();
        }
    };

    let profile = match identity.profile(&user.id).await {
        Ok(profile) => profile.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, user_id = %user.id, "could not load user profile for audit entry");
            UserProfile::default()
        }
    };

    Actor {
        user_name: profile.full_name.or_else(|| user.email.clone()),
        user_role: profile.role,
        user_email: user.email,
        user_id: Some(user.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldLogError;

    struct BrokenProfiles;

    #[async_trait]
    impl IdentityProvider for BrokenProfiles {
        async fn current_user(&self) -> FieldLogResult<Option<SessionUser>> {
            Ok(Some(SessionUser {
                id: "u-9".into(),
                email: Some("lee@example.com".into()),
            }))
        }

        async fn profile(&self, _user_id: &str) -> FieldLogResult<Option<UserProfile>> {
            Err(FieldLogError::Backend("profiles unavailable".into()))
        }
    }

    struct NoSession;

    #[async_trait]
    impl IdentityProvider for NoSession {
        async fn current_user(&self) -> FieldLogResult<Option<SessionUser>> {
            Err(FieldLogError::Backend("auth unavailable".into()))
        }

        async fn profile(&self, _user_id: &str) -> FieldLogResult<Option<UserProfile>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_anonymous_resolves_to_null_actor() {
        let actor = resolve_actor(&StaticIdentity::anonymous()).await;
        assert_eq!(actor, Actor::default());
    }

    #[tokio::test]
    async fn test_full_identity() {
        let identity = StaticIdentity::new(
            SessionUser {
                id: "u-1".into(),
                email: Some("dana@example.com".into()),
            },
            Some(UserProfile {
                full_name: Some("Dana Reyes".into()),
                role: Some("inspector".into()),
            }),
        );

        let actor = resolve_actor(&identity).await;
        assert_eq!(actor.user_id.as_deref(), Some("u-1"));
        assert_eq!(actor.user_email.as_deref(), Some("dana@example.com"));
        assert_eq!(actor.user_name.as_deref(), Some("Dana Reyes"));
        assert_eq!(actor.user_role.as_deref(), Some("inspector"));
    }

    #[tokio::test]
    async fn test_profile_failure_keeps_user() {
        let actor = resolve_actor(&BrokenProfiles).await;
        assert_eq!(actor.user_id.as_deref(), Some("u-9"));
        assert_eq!(actor.user_name.as_deref(), Some("lee@example.com"));
        assert!(actor.user_role.is_none());
    }

    #[tokio::test]
    async fn test_user_failure_yields_null_actor() {
        let actor = resolve_actor(&NoSession).await;
        assert!(actor.is_anonymous());
    }

    #[test]
    fn test_from_settings() {
        let inspector = InspectorSettings {
            id: None,
            email: Some("dana@example.com".into()),
            name: Some("Dana Reyes".into()),
            role: None,
        };
        let identity = StaticIdentity::from_settings(&inspector);
        let user = identity.user.clone().unwrap();
        assert_eq!(user.id, "dana@example.com");
        assert_eq!(
            identity.profile.unwrap().full_name.as_deref(),
            Some("Dana Reyes")
        );

        let empty = StaticIdentity::from_settings(&InspectorSettings::default());
        assert!(empty.user.is_none());
    }
}
