//! # 레시피 이미지 I/O 서비스
//!
//! 클라이언트는 이미지를 `data:image/png;base64,iVBORw0...` 형식의
//! 문자열로 보냅니다. 이 모듈은 그 문자열을 디코딩하여 `MEDIA_PATH` 아래에
//! 저장하고, 저장된 상대 경로로부터 공개 URL을 만듭니다.
//!
//! 이 모듈의 항목들:
//! - `decode_data_url()`: data URL → 확장자 + 바이트
//! - `MediaStore::store()`: 디스크에 저장하고 상대 경로 반환
//! - `MediaStore::remove()`: 더 이상 참조되지 않는 이미지 삭제
//! - `MediaStore::url_for()`: 상대 경로 → URL

use crate::error::AppError;
use base64::{engine::general_purpose, Engine as _};
use std::path::PathBuf;
use tokio::fs;

/// 이미지가 저장되는 하위 디렉토리
const IMAGE_DIR: &str = "recipes/images";

/// 허용하는 이미지 형식과 저장 시 확장자
const ALLOWED_FORMATS: &[(&str, &str)] = &[
    ("png", "png"),
    ("jpeg", "jpg"),
    ("jpg", "jpg"),
    ("gif", "gif"),
    ("webp", "webp"),
];

/// 디코딩된 이미지
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

/// `data:image/<format>;base64,<payload>` 문자열을 디코딩합니다.
///
/// # 에러
/// 형식이 맞지 않거나, 지원하지 않는 이미지 형식이거나,
/// base64 디코딩에 실패하면 `BadRequest`를 반환합니다.
pub fn decode_data_url(data: &str) -> Result<DecodedImage, AppError> {
    let invalid = || AppError::BadRequest("Image must be a base64 data URL".to_string());

    let rest = data.trim().strip_prefix("data:image/").ok_or_else(invalid)?;
    let (format, payload) = rest.split_once(";base64,").ok_or_else(invalid)?;

    let format = format.to_ascii_lowercase();
    let extension = ALLOWED_FORMATS
        .iter()
        .find(|(name, _)| *name == format)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| AppError::BadRequest(format!("Unsupported image format: {}", format)))?;

    let bytes = general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|_| invalid())?;
    if bytes.is_empty() {
        return Err(invalid());
    }

    Ok(DecodedImage { extension, bytes })
}

/// 업로드된 미디어 파일 저장소
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    base_url: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    /// 이미지를 저장하고 `root` 기준 상대 경로를 반환합니다.
    ///
    /// 파일 이름은 UUIDv7이라 같은 이름의 업로드가 서로 덮어쓰지 않습니다.
    pub async fn store(&self, image: &DecodedImage) -> Result<String, AppError> {
        let relative = format!(
            "{}/{}.{}",
            IMAGE_DIR,
            uuid::Uuid::now_v7(),
            image.extension
        );
        let full_path = self.root.join(&relative);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&full_path, &image.bytes).await?;

        tracing::debug!("Stored recipe image: {}", relative);
        Ok(relative)
    }

    /// 저장된 이미지를 삭제합니다. 실패해도 요청은 계속 진행되고 경고만 남깁니다.
    pub async fn remove(&self, relative: &str) {
        let full_path = self.root.join(relative);
        if let Err(e) = fs::remove_file(&full_path).await {
            tracing::warn!("Failed to remove image {}: {}", full_path.display(), e);
        }
    }

    /// 상대 경로로부터 공개 URL을 만듭니다. 예: "/media/recipes/images/x.png"
    pub fn url_for(&self, relative: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), relative)
    }
}
