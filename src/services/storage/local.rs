//! 로컬 디렉터리 자산 저장소

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use uuid::Uuid;

use super::{AssetStorage, UploadFile};
use crate::config::StorageConfig;
use crate::errors::{AppError, AppResult};

/// 루트 디렉터리 아래에 키 경로 그대로 파일을 쓰는 저장소
#[derive(Debug, Clone)]
pub struct LocalAssetStorage {
    root: PathBuf,
}

impl LocalAssetStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `ASSET_ROOT` 설정을 사용합니다.
    pub fn from_config() -> Self {
        Self::new(StorageConfig::root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 키를 루트 아래의 실제 경로로 바꿉니다. 루트 밖을 가리키는 키는 거부합니다.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)));

        if key.is_empty() || escapes {
            return Err(AppError::StorageError(format!("잘못된 저장 키: {}", key)));
        }
        Ok(self.root.join(relative))
    }
}

/// 경로 구분자를 없앤 파일 이름
fn file_name(original_name: &str) -> String {
    let name: String = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control())
        .collect();

    if name.is_empty() || name == "." || name == ".." {
        "file".to_string()
    } else {
        name
    }
}

#[async_trait]
impl AssetStorage for LocalAssetStorage {
    async fn upload(&self, file: &UploadFile, path: &str) -> AppResult<String> {
        let key = format!(
            "{}/{}_{}",
            path.trim_matches('/'),
            Uuid::new_v4(),
            file_name(&file.original_name)
        );
        let target = self.resolve(&key)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::StorageError(format!("디렉터리 생성 실패 {}: {}", parent.display(), e))
            })?;
        }

        tokio::fs::write(&target, &file.bytes).await.map_err(|e| {
            AppError::StorageError(format!("파일 쓰기 실패 {}: {}", target.display(), e))
        })?;

        debug!("자산 업로드: {} ({} bytes)", key, file.bytes.len());
        Ok(key)
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let target = self.resolve(key)?;

        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                debug!("자산 삭제: {}", key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::StorageError(format!(
                "파일 삭제 실패 {}: {}",
                target.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_writes_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalAssetStorage::new(dir.path());

        let key = storage
            .upload(&UploadFile::new("logo.png", b"png-bytes".to_vec()), "brand")
            .await
            .unwrap();

        assert!(key.starts_with("brand/"));
        assert!(key.ends_with("_logo.png"));
        let contents = tokio::fs::read(dir.path().join(&key)).await.unwrap();
        assert_eq!(contents, b"png-bytes");
    }

    #[tokio::test]
    async fn test_nested_path_and_unsafe_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalAssetStorage::new(dir.path());

        let key = storage
            .upload(&UploadFile::new("../../etc/passwd", b"x".to_vec()), "/category/abc/")
            .await
            .unwrap();

        assert!(key.starts_with("category/abc/"));
        assert!(key.ends_with("_passwd"));
        assert!(dir.path().join(&key).exists());
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_ignores_missing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalAssetStorage::new(dir.path());
        let key = storage
            .upload(&UploadFile::new("a.png", b"a".to_vec()), "brand")
            .await
            .unwrap();

        storage.delete(&key).await.unwrap();
        assert!(!dir.path().join(&key).exists());

        storage.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_keys_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalAssetStorage::new(dir.path());

        let result = storage.delete("../outside.png").await;

        assert!(matches!(result, Err(AppError::StorageError(_))));
    }
}
