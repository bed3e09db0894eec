use serde::Deserialize;

/// An uploaded photo as posted by the page: a single data-URL field
#[derive(Deserialize)]
pub struct UploadRequest {
    pub image: String,
}

impl std::fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "UploadRequest {{ image: <{} byte data URL> }}",
            self.image.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_elides_payload() {
        let req = UploadRequest {
            image: "data:image/png;base64,AAAA".to_string(),
        };
        let debug = format!("{req:?}");
        assert!(!debug.contains("AAAA"));
        assert!(debug.contains("26 byte"));
    }
}
