//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 剪贴板宿主层面的错误统一为 `ClipboardError`，
//! 导出处理器内部的错误（`ExportError`）通过 `From` 自动上转，无需手动 map。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - “没有可提供的格式”单独成为一个分支，调用方可据此判断“什么都没复制”。

use crate::image_handler::ExportError;

/// 剪贴板层统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    /// 图片既没有像素、也没有位置与元数据，无法声明所有权
    #[error("没有可提供的剪贴板格式")]
    NothingToOffer,

    /// 宿主拒绝了所有权注册
    #[error("注册剪贴板所有者失败: {0}")]
    Registration(String),

    /// 系统剪贴板不可用
    #[error("剪贴板不可用: {0}")]
    Unavailable(String),

    /// 配置不合法
    #[error("配置错误: {0}")]
    Config(String),

    /// 导出处理器错误
    #[error("{0}")]
    Export(#[from] ExportError),
}
