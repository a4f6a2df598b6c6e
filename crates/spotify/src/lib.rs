pub mod api;
pub mod auth;
pub mod error;

pub use api::SpotifyApi;
pub use auth::TokenSlot;
pub use error::{ApiError, ApiResult};
