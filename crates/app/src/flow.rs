use implicit_grant_spotify::auth;
use implicit_grant_spotify::{ApiError, SpotifyApi, TokenSlot};
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Drives one implicit-grant run: wait for a callback URL carrying a token,
/// store it, fetch the user profile once.
pub struct AuthFlow {
    api: SpotifyApi,
    token: TokenSlot,
}

impl AuthFlow {
    pub fn new(api: SpotifyApi) -> Self {
        Self {
            api,
            token: TokenSlot::new(),
        }
    }

    /// Handles one callback URL. URLs without a usable token are ignored.
    /// Returns true once a token has been stored and the profile fetch ran.
    pub async fn handle_callback<F>(&mut self, callback_url: &str, handler: F) -> bool
    where
        F: FnOnce(Map<String, Value>),
    {
        let Some(token) = auth::access_token_from_callback(callback_url) else {
            debug!("Callback without access token, ignoring");
            return false;
        };

        info!("Access token received from callback");
        self.token.store(token);
        self.fetch_user_details(handler).await;
        true
    }

    /// No-op without a stored token. On success the handler runs exactly
    /// once with the profile object; transport errors are logged and a body
    /// that is not a JSON object is dropped without noise.
    pub async fn fetch_user_details<F>(&self, handler: F)
    where
        F: FnOnce(Map<String, Value>),
    {
        let Some(token) = self.token.get() else {
            return;
        };

        match self.api.get_current_user(token).await {
            Ok(profile) => handler(profile),
            Err(ApiError::Network(e)) => error!("Profile request failed: {}", e),
            Err(ApiError::UnexpectedBody(reason)) => {
                debug!("Skipping profile response: {}", reason);
            }
        }
    }

    /// Consumes callback URLs from the relay channel until one of them
    /// completes the flow.
    pub async fn run<F>(mut self, mut urls: mpsc::UnboundedReceiver<String>, handler: F)
    where
        F: FnOnce(Map<String, Value>) + Clone,
    {
        while let Some(url) = urls.recv().await {
            if self.handle_callback(&url, handler.clone()).await {
                return;
            }
        }
    }
}
