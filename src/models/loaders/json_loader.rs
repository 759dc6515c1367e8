//! 容器库的 JSON 读写

use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};

use crate::models::library::ContainerLibrary;

/// 加载容器库
///
/// 文件不存在时返回内置默认配置；解析失败视为错误（说明文件被破坏，
/// 静默回退默认值会掩盖选择器配置的丢失）
pub async fn load_container_library(path: &str) -> Result<ContainerLibrary> {
    if !Path::new(path).exists() {
        warn!("容器库文件不存在，使用内置微博默认配置: {}", path);
        return Ok(ContainerLibrary::default());
    }

    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取容器库: {}", path))?;

    let library: ContainerLibrary = serde_json::from_str(&content)
        .with_context(|| format!("无法解析容器库: {}", path))?;

    info!("✓ 已加载容器库: {} ({} 个容器)", path, library.containers.len());
    Ok(library)
}

/// 保存容器库
pub async fn save_container_library(path: &str, library: &ContainerLibrary) -> Result<()> {
    let content = serde_json::to_string_pretty(library)?;
    fs::write(path, content)
        .await
        .with_context(|| format!("无法写入容器库: {}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_returns_defaults() {
        let library = load_container_library("不存在的库文件.json").await.unwrap();
        assert!(library.containers.contains_key("comments"));
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("container-library.json");
        let path_str = path.to_str().unwrap();

        let mut library = ContainerLibrary::default();
        library
            .containers
            .get_mut("pagination")
            .unwrap()
            .selectors
            .insert("next".to_string(), ".自定义下一页".to_string());

        save_container_library(path_str, &library).await.unwrap();
        let loaded = load_container_library(path_str).await.unwrap();
        assert_eq!(loaded.entry("pagination").selector("next"), ".自定义下一页");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("container-library.json");
        std::fs::write(&path, "{ 坏掉的 json").unwrap();

        let result = load_container_library(path.to_str().unwrap()).await;
        assert!(result.is_err());
    }
}
