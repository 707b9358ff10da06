//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 导出处理器在响应宿主回调时可能遇到的错误都收敛到 `ExportError`。
//! 其中 `UnknownTarget` / `Released` / `NotClaimed` 属于调用方违反协议，
//! 只用于诊断，不做恢复。

use super::xmp::XmpError;

/// 导出处理器统一错误类型。
///
/// 在宿主层会被上转为 `ClipboardError`。
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("未知的剪贴板目标：info={0}")]
    UnknownTarget(u32),

    #[error("请求的数据不存在：{0}")]
    MissingPayload(&'static str),

    #[error("处理器已释放剪贴板所有权")]
    Released,

    #[error("处理器尚未成为剪贴板所有者")]
    NotClaimed,

    #[error("处理器已经是剪贴板所有者")]
    AlreadyClaimed,

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("元数据错误：{0}")]
    Metadata(#[from] XmpError),
}
