use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::AppError;

/// 扫描文件夹，返回所有待处理的 PDF 文件（按文件名排序）
pub async fn discover_documents(folder_path: &Path) -> Result<Vec<PathBuf>> {
    if !folder_path.exists() {
        return Err(AppError::directory_not_found(folder_path.display().to_string()).into());
    }

    let mut documents = Vec::new();
    let mut entries = fs::read_dir(folder_path)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_pdf = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            tracing::info!(
                "发现文档: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );
            documents.push(path);
        }
    }

    documents.sort();
    Ok(documents)
}
