//! 输出文件写入
//! 每个文件整体替换（先写临时文件再 rename），单个文件失败不影响其它文件

use std::path::{Path, PathBuf};

use crate::error::RmResult;

/// 单个输出文件的写入失败记录
#[derive(Debug, Clone)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub error: String,
}

/// 待写入的输出文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub file_name: String,
    pub content: String,
}

impl OutputFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// 输出写入器
#[derive(Debug, Clone)]
pub struct RuleWriter {
    output_dir: PathBuf,
}

impl RuleWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 确保输出目录存在
    pub async fn prepare(&self) -> RmResult<()> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        Ok(())
    }

    /// 写入单个文件，返回最终路径
    pub async fn write(&self, file: &OutputFile) -> RmResult<PathBuf> {
        let path = self.output_dir.join(&file.file_name);
        let tmp_path = self.output_dir.join(format!(".{}.tmp", file.file_name));

        tokio::fs::write(&tmp_path, file.content.as_bytes()).await?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        log::debug!("Wrote {} ({} bytes)", path.display(), file.content.len());
        Ok(path)
    }

    /// 依次写入全部文件，失败的文件单独记录
    pub async fn write_all(&self, files: &[OutputFile]) -> (Vec<PathBuf>, Vec<WriteFailure>) {
        let mut written = Vec::with_capacity(files.len());
        let mut failures = Vec::new();

        for file in files {
            match self.write(file).await {
                Ok(path) => written.push(path),
                Err(e) => {
                    let path = self.output_dir.join(&file.file_name);
                    log::error!("Failed to write {}: {}", path.display(), e);
                    failures.push(WriteFailure {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        (written, failures)
    }
}
