//! Image upload: validate every file, then store them all.

use anyhow::Context;
use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use super::dto::StoredFile;
use crate::{
    auth::AuthUser,
    error::{AppError, ErrorDetail},
    state::AppState,
};

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const UNSUPPORTED_FORMAT: &str =
    "uploaded file format is not supported, please use png or jpeg format only";

/// One file pulled out of the multipart body.
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub file_name: String,
    pub body: Bytes,
}

/// Content type judged from the leading bytes, ignoring what the client claims.
pub fn sniff_image(body: &[u8]) -> Option<&'static str> {
    if body.starts_with(JPEG_MAGIC) {
        Some("image/jpeg")
    } else if body.starts_with(PNG_MAGIC) {
        Some("image/png")
    } else {
        None
    }
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        _ => None,
    }
}

pub fn sanitize_file_name(name: &str, content_type: &str) -> String {
    lazy_static! {
        static ref UNSAFE_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
    }
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned = UNSAFE_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        format!("upload.{}", ext_from_mime(content_type).unwrap_or("bin"))
    } else {
        cleaned.to_string()
    }
}

fn too_big_message(max: usize) -> String {
    if max % (1024 * 1024) == 0 {
        format!("uploaded file size is too big, {}MB is max", max / (1024 * 1024))
    } else {
        format!("uploaded file size is too big, {max} bytes is max")
    }
}

/// Checks size and format of every item. Returns the sniffed content types in
/// order, or every problem found.
fn validate(items: &[UploadItem], max_bytes: usize) -> Result<Vec<&'static str>, AppError> {
    if items.is_empty() {
        return Err(AppError::validation(
            "validation error",
            vec![ErrorDetail::required("files")],
        ));
    }

    let mut details = Vec::new();
    let mut types = Vec::with_capacity(items.len());
    for item in items {
        if item.body.len() > max_bytes {
            details.push(ErrorDetail::new("files", &item.file_name, too_big_message(max_bytes)));
            continue;
        }
        match sniff_image(&item.body) {
            Some(ct) => types.push(ct),
            None => details.push(ErrorDetail::new("files", &item.file_name, UNSUPPORTED_FORMAT)),
        }
    }

    if !details.is_empty() {
        warn!(?details, "upload rejected");
        return Err(AppError::validation("cannot upload files", details));
    }
    Ok(types)
}

#[instrument(skip(st, items), fields(user_id = user.id, count = items.len()))]
pub async fn store_files(
    st: &AppState,
    user: &AuthUser,
    items: Vec<UploadItem>,
) -> Result<Vec<StoredFile>, AppError> {
    let types = validate(&items, st.config.upload_max_bytes)?;

    let base = OffsetDateTime::now_utc().unix_timestamp_nanos();
    let mut stored: Vec<StoredFile> = Vec::with_capacity(items.len());
    for (i, (item, ct)) in items.into_iter().zip(types).enumerate() {
        let key = format!(
            "{}-{}",
            base + i as i128,
            sanitize_file_name(&item.file_name, ct)
        );
        let put = st
            .storage
            .put_object(&key, item.body, ct)
            .await
            .with_context(|| format!("put_object {key}"));
        if let Err(e) = put {
            error!(error = %e, "storing upload failed, removing files stored so far");
            for done in &stored {
                if let Err(e) = st.storage.delete_object(&done.file_name).await {
                    warn!(error = %e, key = %done.file_name, "cleanup of partial upload failed");
                }
            }
            return Err(AppError::Internal(e));
        }
        stored.push(StoredFile { file_name: key });
    }

    info!(files = stored.len(), "files uploaded");
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::{LocalStorage, StorageClient};

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 16];

    fn item(name: &str, body: &[u8]) -> UploadItem {
        UploadItem {
            file_name: name.into(),
            body: Bytes::copy_from_slice(body),
        }
    }

    fn uploader() -> AuthUser {
        AuthUser {
            id: 1,
            username: "up".into(),
        }
    }

    async fn state_on_disk(dir: &std::path::Path) -> AppState {
        let storage = LocalStorage::new(dir).await.unwrap();
        AppState {
            storage: Arc::new(storage) as Arc<dyn StorageClient>,
            ..AppState::fake()
        }
    }

    fn stored_names(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn sniffs_only_jpeg_and_png() {
        assert_eq!(sniff_image(PNG), Some("image/png"));
        assert_eq!(sniff_image(JPEG), Some("image/jpeg"));
        assert_eq!(sniff_image(b"GIF89a"), None);
        assert_eq!(sniff_image(b""), None);
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("my photo (1).png", "image/png"), "my_photo__1_.png");
        assert_eq!(sanitize_file_name("../../etc/passwd", "image/png"), "passwd");
        assert_eq!(sanitize_file_name("C:\\pics\\cat.jpg", "image/jpeg"), "cat.jpg");
        assert_eq!(sanitize_file_name("", "image/jpeg"), "upload.jpg");
        assert_eq!(sanitize_file_name("...", "image/png"), "upload.png");
    }

    #[tokio::test]
    async fn stores_valid_images_with_timestamp_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let st = state_on_disk(dir.path()).await;

        let stored = store_files(&st, &uploader(), vec![item("a.png", PNG), item("b.jpg", JPEG)])
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
        for (file, suffix) in stored.iter().zip(["-a.png", "-b.jpg"]) {
            assert!(file.file_name.ends_with(suffix), "{}", file.file_name);
            let prefix = file.file_name.trim_end_matches(suffix);
            assert!(prefix.parse::<i128>().is_ok(), "{prefix}");
        }
        assert_eq!(stored_names(dir.path()).len(), 2);
    }

    #[tokio::test]
    async fn one_bad_file_rejects_the_whole_upload() {
        let dir = tempfile::tempdir().unwrap();
        let st = state_on_disk(dir.path()).await;

        let err = store_files(&st, &uploader(), vec![item("ok.png", PNG), item("x.gif", b"GIF89a")])
            .await
            .unwrap_err();
        let AppError::Validation { details, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].value, "x.gif");
        assert!(stored_names(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let st = state_on_disk(dir.path()).await;
        let mut big = PNG.to_vec();
        big.resize(st.config.upload_max_bytes + 1, 0);

        let err = store_files(&st, &uploader(), vec![item("big.png", &big)])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cannot upload"));
        let AppError::Validation { details, .. } = err else {
            panic!("expected validation error");
        };
        assert!(details[0].message.contains("1MB is max"));
    }

    #[tokio::test]
    async fn empty_upload_is_a_validation_error() {
        let st = AppState::fake();
        let err = store_files(&st, &uploader(), Vec::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}
