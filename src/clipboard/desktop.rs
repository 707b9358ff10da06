//! 系统剪贴板宿主（基于 arboard）
//!
//! # 设计思路
//!
//! `arboard` 不支持延迟取数，也不能同时写入多种任意格式。
//! 因此注册时立即向所有者索取“最有价值”的一份数据写入系统剪贴板：
//! 有图片目标时写入位图，否则写入文本。其余目标只记录日志。
//!
//! # 实现思路
//!
//! - `arboard::Clipboard` 在所有权期间一直持有：Linux 上进程需要保持该实例
//!   才能继续向其他程序提供剪贴板内容。
//! - 数据写入后系统剪贴板不会再回调，宿主不保留所有者：写入成功即通知
//!   `on_ownership_lost` 并释放引用。其他程序随后接管剪贴板也不会泄漏快照。

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::targets::{is_image_target, is_text_target};
use super::{ClipboardHost, ClipboardOwner, SelectionData, TargetEntry};
use crate::error::ClipboardError;
use crate::image_handler::{ExportConfig, pipeline};

/// 系统剪贴板。
pub struct DesktopClipboard {
    config: ExportConfig,
    clipboard: RefCell<Option<arboard::Clipboard>>,
}

impl fmt::Debug for DesktopClipboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesktopClipboard")
            .field("config", &self.config)
            .field("opened", &self.clipboard.borrow().is_some())
            .finish()
    }
}

/// 本次注册要写入系统剪贴板的内容。
enum Materialized {
    Image {
        width: usize,
        height: usize,
        bytes: Vec<u8>,
    },
    Text(String),
}

impl DesktopClipboard {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            clipboard: RefCell::new(None),
        }
    }

    /// 向所有者索取第一个可写入的目标数据。
    fn materialize(
        &self,
        targets: &[TargetEntry],
        owner: &dyn ClipboardOwner,
    ) -> Result<Materialized, ClipboardError> {
        let preferred = targets
            .iter()
            .find(|e| is_image_target(&e.target))
            .or_else(|| targets.iter().find(|e| is_text_target(&e.target)))
            .ok_or_else(|| {
                ClipboardError::Registration("没有系统剪贴板支持的目标".to_string())
            })?;

        for skipped in targets.iter().filter(|e| e.target != preferred.target) {
            log::debug!("⏭️ 系统剪贴板不支持延迟提供，跳过目标 {}", skipped.target);
        }

        let mut selection = SelectionData::new(preferred.target.as_str());
        owner.on_request(&mut selection, preferred.info)?;

        if let Some(pixbuf) = selection.pixbuf() {
            let (width, height, bytes) = pipeline::to_rgba_bytes(pixbuf, &self.config)?;
            return Ok(Materialized::Image {
                width,
                height,
                bytes,
            });
        }
        if let Some(text) = selection.text() {
            return Ok(Materialized::Text(text.to_string()));
        }

        Err(ClipboardError::Registration(format!(
            "所有者未提供 {} 的数据",
            preferred.target
        )))
    }

    fn write(&self, content: Materialized) -> Result<(), ClipboardError> {
        let mut slot = self.clipboard.borrow_mut();
        if slot.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Unavailable(format!("无法访问剪贴板：{}", e)))?;
            *slot = Some(clipboard);
        }
        let Some(clipboard) = slot.as_mut() else {
            return Err(ClipboardError::Unavailable("剪贴板实例缺失".to_string()));
        };

        match content {
            Materialized::Image {
                width,
                height,
                bytes,
            } => {
                log::debug!("📋 写入系统剪贴板 - 图片 {}x{}", width, height);
                clipboard
                    .set_image(arboard::ImageData {
                        width,
                        height,
                        bytes: Cow::Owned(bytes),
                    })
                    .map_err(|e| ClipboardError::Registration(format!("写入图片失败：{}", e)))
            }
            Materialized::Text(text) => {
                log::debug!("📋 写入系统剪贴板 - 文本 {} 字符", text.chars().count());
                clipboard
                    .set_text(text)
                    .map_err(|e| ClipboardError::Registration(format!("写入文本失败：{}", e)))
            }
        }
    }
}

impl ClipboardHost for DesktopClipboard {
    fn set_with_owner(
        &self,
        targets: &[TargetEntry],
        owner: Rc<dyn ClipboardOwner>,
    ) -> Result<(), ClipboardError> {
        if targets.is_empty() {
            return Err(ClipboardError::Registration("目标列表为空".to_string()));
        }

        let content = self.materialize(targets, owner.as_ref())?;
        self.write(content)?;

        log::info!("✅ 已写入系统剪贴板 - {} 个目标", targets.len());

        // 不会再有延迟请求，立即交还所有权
        owner.on_ownership_lost();
        Ok(())
    }

    fn clear(&self) {
        if let Some(clipboard) = self.clipboard.borrow_mut().as_mut() {
            if let Err(err) = clipboard.clear() {
                log::warn!("⚠️ 清空系统剪贴板失败：{}", err);
            }
        }
    }
}
