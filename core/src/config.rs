//! Endpoint and identity constants consumed by the client.

/// Production catalog endpoint.
pub const PETS_URL: &str = "https://eulerity-hackathon.appspot.com/pets";

/// Production upload-target endpoint.
pub const UPLOAD_TARGET_URL: &str = "https://eulerity-hackathon.appspot.com/upload";

/// Identifier sent as the `appid` form field on every upload.
pub const APP_ID: &str = "pets-mobile-client";

/// Fixed configuration for one client instance.
///
/// The app identifier always comes from [`APP_ID`]; only the endpoints can
/// be pointed elsewhere, for tests and local development.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub pets_url: String,
    pub upload_target_url: String,
    app_id: String,
}

impl ClientConfig {
    /// Derive both endpoints from a single base URL (`{base}/pets`,
    /// `{base}/upload`).
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            pets_url: format!("{base}/pets"),
            upload_target_url: format!("{base}/upload"),
            app_id: APP_ID.to_string(),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            pets_url: PETS_URL.to_string(),
            upload_target_url: UPLOAD_TARGET_URL.to_string(),
            app_id: APP_ID.to_string(),
        }
    }
}
