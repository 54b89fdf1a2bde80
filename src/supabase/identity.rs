//! Session identity from Supabase auth

use std::sync::Arc;

use async_trait::async_trait;

use super::client::SupabaseClient;
use crate::error::FieldLogResult;
use crate::identity::{IdentityProvider, SessionUser, UserProfile};

#[derive(Debug, Clone)]
pub struct SupabaseIdentity {
    client: Arc<SupabaseClient>,
    profiles_table: String,
}

impl SupabaseIdentity {
    pub fn new(client: Arc<SupabaseClient>, profiles_table: impl Into<String>) -> Self {
        Self {
            client,
            profiles_table: profiles_table.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentity {
    async fn current_user(&self) -> FieldLogResult<Option<SessionUser>> {
        self.client.current_user().await
    }

    async fn profile(&self, user_id: &str) -> FieldLogResult<Option<UserProfile>> {
        self.client.fetch_profile(&self.profiles_table, user_id).await
    }
}
