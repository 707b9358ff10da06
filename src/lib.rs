//! # 图片查看器剪贴板导出 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                图片查看器（外部协作者）                   │
//! │   当前图片：pixbuf / uri / xmp  ──  “复制”菜单动作        │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ ImageSource
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↓                                                  │
//! │  ┌─ image_handler ── ClipboardHandler（剪贴板所有者）     │
//! │  │   ├─ source      图片来源约定                          │
//! │  │   ├─ config      导出配置                              │
//! │  │   ├─ pipeline    像素编码                              │
//! │  │   └─ xmp         元数据序列化（可选特性）              │
//! │  │                                                       │
//! │  ├─ clipboard ──── 宿主抽象：所有权 + 延迟取数            │
//! │  │   ├─ targets     目标表                                │
//! │  │   ├─ selection   单次请求的数据载体                    │
//! │  │   ├─ memory      进程内宿主                            │
//! │  │   └─ desktop     系统剪贴板宿主（arboard）             │
//! │  │                                                       │
//! │  └─ error ──────── ClipboardError（统一错误类型）         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `ClipboardError` |
//! | [`clipboard`] | 剪贴板宿主与所有者协议、目标表、数据载体 |
//! | [`image_handler`] | 图片快照、声明所有权、按目标提供数据 |

pub mod clipboard;
pub mod error;
pub mod image_handler;

pub use error::ClipboardError;
