use anyhow::Context;
use bytes::Bytes;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub const MAX_IMAGE_BYTES: usize = 15 * 1024 * 1024;

/// An image pulled out of a multipart field.
pub struct ImageUpload {
    pub bytes: Bytes,
    pub content_type: String,
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Guard applied before any upload reaches the object store.
pub fn validate_image(upload: &ImageUpload) -> Result<(), ApiError> {
    if ext_from_mime(&upload.content_type).is_none() {
        return Err(ApiError::BadRequest(
            "Only JPG, PNG and WEBP images are allowed".into(),
        ));
    }
    if upload.bytes.len() > MAX_IMAGE_BYTES {
        return Err(ApiError::BadRequest(
            "Image exceeds the 15 MB size limit".into(),
        ));
    }
    Ok(())
}

/// Uploads under `{folder}/{uuid}.{ext}` and returns the stored public URL.
pub async fn store_image(
    state: &AppState,
    folder: &str,
    upload: ImageUpload,
) -> anyhow::Result<String> {
    let ext = ext_from_mime(&upload.content_type).unwrap_or("bin");
    let key = format!("{}/{}.{}", folder, Uuid::new_v4(), ext);
    let url = state
        .storage
        .upload(&key, upload.bytes, &upload.content_type)
        .await
        .with_context(|| format!("upload {}", key))?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(len: usize) -> ImageUpload {
        ImageUpload {
            bytes: Bytes::from(vec![0u8; len]),
            content_type: "image/jpeg".into(),
        }
    }

    #[test]
    fn ext_mapping() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("image/gif"), None);
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn validate_rejects_unsupported_type() {
        let upload = ImageUpload {
            bytes: Bytes::from_static(b"GIF89a"),
            content_type: "image/gif".into(),
        };
        assert!(validate_image(&upload).is_err());
    }

    #[test]
    fn validate_rejects_oversized_body() {
        assert!(validate_image(&jpeg(MAX_IMAGE_BYTES + 1)).is_err());
        assert!(validate_image(&jpeg(1024)).is_ok());
    }

    #[tokio::test]
    async fn store_builds_foldered_key() {
        let state = crate::state::AppState::fake();
        let url = store_image(&state, "profile", jpeg(16)).await.unwrap();
        assert!(url.starts_with("https://fake.local/profile/"));
        assert!(url.ends_with(".jpg"));
    }
}
