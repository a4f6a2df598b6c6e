mod flow;
mod relay;
mod register;

use anyhow::Result;
use flow::AuthFlow;
use implicit_grant_spotify::{auth, SpotifyApi};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CLIENT_ID: &str = "[YOUR-CLIENT-ID]";
const URI_SCHEME: &str = "my-awesome-app";
const REDIRECT_URI: &str = "my-awesome-app://spotifyOauthCallback";
const RELAY_PORT: u16 = 49817;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // The OS invokes the registered handler with the callback URL as an
    // argument; that invocation only relays the URL to the waiting instance.
    if let Some(callback_url) = std::env::args().nth(1) {
        if callback_url.starts_with(&format!("{}://", URI_SCHEME)) {
            return relay::forward_callback(RELAY_PORT, &callback_url).await;
        }
        warn!("Ignoring unexpected argument: {}", callback_url);
    }

    register::register_scheme_handler(URI_SCHEME);

    let (tx, rx) = mpsc::unbounded_channel();
    let callback_relay = relay::CallbackRelay::bind(RELAY_PORT).await?;
    tokio::spawn(callback_relay.run(tx));

    let authorization_url = auth::authorize_url(CLIENT_ID, REDIRECT_URI);
    info!("Opening authorization page in the default browser");
    if let Err(e) = open::that(&authorization_url) {
        warn!("Failed to open browser: {}", e);
        println!("Open this URL in your browser to authenticate:\n{authorization_url}");
    }

    AuthFlow::new(SpotifyApi::new())
        .run(rx, |profile| {
            if let Some(name) = profile.get("display_name").and_then(|v| v.as_str()) {
                println!(
                    "Congrats on implementing the Spotify Implicit Grant flow in your application, {}!",
                    name
                );
            }
        })
        .await;

    Ok(())
}
