//! PDF 文本提取服务 - 业务能力层
//!
//! 只负责"二进制 → 纯文本"能力，不关心上传协议和流程

use lopdf::Document;
use tracing::debug;

use crate::error::{AppError, AppResult, PdfError};

/// PDF 文本提取服务
pub struct PdfService;

impl PdfService {
    pub fn new() -> Self {
        Self
    }

    /// 从 PDF 字节中提取全部页面的纯文本
    ///
    /// # 参数
    /// - `bytes`: PDF 文件内容
    ///
    /// # 返回
    /// 返回按页序拼接的文本；任何解析异常都直接失败，不做部分恢复
    pub fn extract_text(&self, bytes: &[u8]) -> AppResult<String> {
        let document = Document::load_mem(bytes)?;

        let pages: Vec<u32> = document.get_pages().keys().copied().collect();
        debug!("PDF 加载成功，共 {} 页", pages.len());

        let text = document.extract_text(&pages).map_err(|e| {
            AppError::Pdf(PdfError::ExtractFailed {
                source: Box::new(e),
            })
        })?;

        Ok(text)
    }
}

impl Default for PdfService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_fail_with_pdf_error() {
        let service = PdfService::new();
        let err = service.extract_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, AppError::Pdf(_)));
    }
}
