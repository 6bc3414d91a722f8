use anyhow::bail;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tycoon_api::AuthoritativeService;
use tycoon_core::{ExternalIdentity, PlayerProfile};

use crate::session::GameSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// A provider session as delivered with sign-in notifications.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub user: ExternalIdentity,
}

/// Raw `{event, session}` notification from the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthNotification {
    pub event: AuthEventKind,
    #[serde(default)]
    pub session: Option<IdentitySession>,
}

impl AuthNotification {
    pub fn into_event(self) -> anyhow::Result<AuthEvent> {
        match (self.event, self.session) {
            (AuthEventKind::SignedIn, Some(session)) => Ok(AuthEvent::SignedIn(session)),
            (AuthEventKind::SignedIn, None) => bail!("sign-in notification carried no session"),
            (AuthEventKind::SignedOut, _) => Ok(AuthEvent::SignedOut),
            (AuthEventKind::TokenRefreshed, _) => Ok(AuthEvent::TokenRefreshed),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(IdentitySession),
    SignedOut,
    TokenRefreshed,
}

impl<S> GameSession<S>
where
    S: AuthoritativeService,
{
    /// React to a provider notification; returns the profile on sign-in.
    pub async fn handle_auth_event(
        &mut self,
        event: AuthEvent,
    ) -> anyhow::Result<Option<PlayerProfile>> {
        match event {
            AuthEvent::SignedIn(session) => {
                info!(user_id = %session.user.id, provider = ?session.user.provider, "identity signed in");
                self.sign_in(&session.user).await.map(Some)
            }
            AuthEvent::SignedOut => {
                self.sign_out().await?;
                Ok(None)
            }
            AuthEvent::TokenRefreshed => {
                debug!("identity token refreshed");
                Ok(None)
            }
        }
    }
}
