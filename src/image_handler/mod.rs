//! # 图片导出模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块把“图片快照 → 目标列表 → 声明所有权 → 按需提供数据 → 释放”
//! 按职责拆分为多个子模块：
//!
//! - `source`：图片来源约定（外部协作者）与最小实现
//! - `config/error`：导出配置与错误
//! - `pipeline`：像素按请求的 MIME 类型编码
//! - `xmp`：可选的元数据导出能力
//! - `handler`：剪贴板所有者本身
//!
//! ## 新同事快速上手
//!
//! ```text
//! 查看器“复制”动作
//!    ↓
//! handler.rs（快照 + 声明所有权）
//!    ├─ source.rs（读取像素 / URI / 元数据副本）
//!    └─ clipboard::ClipboardHost（宿主注册）
//!    ↓
//! 宿主回调 on_request
//!    ├─ pipeline.rs（图片目标编码）
//!    └─ xmp.rs（元数据序列化）
//! ```

mod config;
mod error;
mod handler;
pub(crate) mod pipeline;
mod source;
pub mod xmp;

pub use config::ExportConfig;
pub use error::ExportError;
pub use handler::{ClipboardHandler, HandlerState};
pub use pipeline::encode_pixbuf;
pub use source::{ImageSource, Pixbuf, StaticImage};
pub use xmp::{XmpDocument, XmpError, XmpPacket};
