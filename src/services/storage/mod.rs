//! # 자산(이미지) 저장소
//!
//! 카탈로그 서비스가 이미지 파일을 올리고 지울 때 사용하는 외부 협력자 계약입니다.
//! 저장소는 업로드한 파일의 키를 돌려주며, 엔티티에는 이 키만 기록됩니다.
//!
//! ```text
//! {folder}/{...하위 경로}/{uuid}_{원본 파일명}
//! ```
//!
//! 여러 파일 업로드는 [`upload_many`]로 동시 업로드 수를 제한하며,
//! 하나라도 실패하면 이미 올라간 파일을 지운 뒤 에러를 돌려줍니다.

pub mod local;

pub use local::LocalAssetStorage;

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use log::warn;

use crate::errors::AppResult;

/// 자산 폴더
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFolder {
    Brand,
    Category,
    Product,
}

impl AssetFolder {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetFolder::Brand => "brand",
            AssetFolder::Category => "category",
            AssetFolder::Product => "product",
        }
    }
}

/// 업로드할 파일
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub original_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(original_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            original_name: original_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// 자산 저장소 계약
#[async_trait]
pub trait AssetStorage: Send + Sync {
    /// 파일을 `path` 아래에 올리고 저장 키를 돌려줍니다.
    async fn upload(&self, file: &UploadFile, path: &str) -> AppResult<String>;

    /// 저장 키에 해당하는 파일을 지웁니다. 이미 없는 파일은 성공으로 취급합니다.
    async fn delete(&self, key: &str) -> AppResult<()>;
}

/// 여러 파일을 최대 `concurrency`개씩 동시에 올립니다.
///
/// 돌려주는 키의 순서는 입력 파일 순서와 같습니다.
/// 하나라도 실패하면 성공한 업로드를 모두 지우고 첫 번째 에러를 돌려줍니다.
pub async fn upload_many(
    storage: &dyn AssetStorage,
    files: &[UploadFile],
    path: &str,
    concurrency: usize,
) -> AppResult<Vec<String>> {
    let results: Vec<AppResult<String>> = stream::iter(files)
        .map(|file| storage.upload(file, path))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut keys = Vec::with_capacity(results.len());
    let mut first_error = None;
    for result in results {
        match result {
            Ok(key) => keys.push(key),
            Err(e) if first_error.is_none() => first_error = Some(e),
            Err(e) => warn!("추가 업로드 실패: {}", e),
        }
    }

    match first_error {
        None => Ok(keys),
        Some(error) => {
            warn!("업로드 실패로 {}개 파일을 정리합니다: {}", keys.len(), error);
            delete_many(storage, &keys).await?;
            Err(error)
        }
    }
}

/// 여러 키를 지웁니다. 모든 키에 삭제를 시도한 뒤 첫 번째 에러를 돌려줍니다.
pub async fn delete_many(storage: &dyn AssetStorage, keys: &[String]) -> AppResult<()> {
    let mut first_error = None;
    for key in keys {
        if let Err(e) = storage.delete(key).await {
            warn!("자산 삭제 실패 ({}): {}", key, e);
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        None => Ok(()),
        Some(error) => Err(error),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingStorage;
    use super::*;
    use crate::errors::AppError;

    fn files(names: &[&str]) -> Vec<UploadFile> {
        names.iter().map(|name| UploadFile::new(*name, b"img".to_vec())).collect()
    }

    #[tokio::test]
    async fn test_upload_many_keeps_input_order() {
        let storage = RecordingStorage::default();

        let keys = upload_many(&storage, &files(&["a.png", "b.png", "c.png"]), "product/x", 2)
            .await
            .unwrap();

        assert_eq!(keys, vec!["product/x/a.png", "product/x/b.png", "product/x/c.png"]);
    }

    #[tokio::test]
    async fn test_upload_many_cleans_up_on_failure() {
        let storage = RecordingStorage::failing_on("b.png");

        let result = upload_many(&storage, &files(&["a.png", "b.png", "c.png"]), "product/x", 2).await;

        assert!(matches!(result, Err(AppError::StorageError(_))));
        assert!(storage.stored().is_empty());
        assert_eq!(storage.deleted().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_uploads() {
        let storage = RecordingStorage::default();

        let keys = upload_many(&storage, &files(&["a.png"]), "brand", 0).await.unwrap();

        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn test_folder_names() {
        assert_eq!(AssetFolder::Brand.as_str(), "brand");
        assert_eq!(AssetFolder::Category.as_str(), "category");
        assert_eq!(AssetFolder::Product.as_str(), "product");
    }
}
