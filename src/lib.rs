pub mod imaging;
pub mod server;
pub mod settings;
pub mod vision;

/// Service tunables -- can eventually be folded into the settings file
pub mod config {
    /// Largest edge an uploaded image keeps before being sent upstream.
    /// A smaller image is fewer tokens paid upstream and faster processing.
    pub const MAX_DIMENSION: u32 = 1024;

    /// JPEG quality used when re-encoding for transport
    pub const JPEG_QUALITY: u8 = 85;

    /// Largest JSON upload body accepted by the front end
    pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

    /// Default base URL of the OpenAI-compatible completion API
    pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

    /// Default vision-capable chat model
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini-2024-07-18";
}
