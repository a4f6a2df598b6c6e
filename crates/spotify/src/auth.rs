use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::form_urlencoded;
use url::Url;

pub const SPOTIFY_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// Everything outside alphanumerics and `-_.!~*'()` gets percent-encoded,
/// matching what the authorization endpoint expects for the redirect URI.
const REDIRECT_URI_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_redirect_uri(redirect_uri: &str) -> String {
    utf8_percent_encode(redirect_uri, REDIRECT_URI_SET).to_string()
}

pub fn authorize_url(client_id: &str, redirect_uri: &str) -> String {
    format!(
        "{}/authorize?response_type=token&client_id={}&redirect_uri={}",
        SPOTIFY_ACCOUNTS_BASE,
        client_id,
        encode_redirect_uri(redirect_uri)
    )
}

/// Pulls the access token out of an implicit-grant callback URL. The token
/// rides in the fragment, which itself is formatted as a query string
/// (`scheme://host#access_token=...&token_type=Bearer&expires_in=3600`).
/// Anything malformed or token-less yields `None`.
pub fn access_token_from_callback(callback_url: &str) -> Option<String> {
    let url = Url::parse(callback_url).ok()?;
    let fragment = url.fragment()?;
    form_urlencoded::parse(fragment.as_bytes())
        .find(|(key, _)| key == "access_token")
        .map(|(_, value)| value.into_owned())
}

/// Single-field holder for the access token: written once when the callback
/// arrives, read once for the profile request.
#[derive(Debug, Default)]
pub struct TokenSlot {
    token: Option<String>,
}

impl TokenSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn get(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
