//! 进程内剪贴板宿主
//!
//! # 设计思路
//!
//! 完整实现“所有权 + 延迟取数”协议，但不与操作系统交互。
//! 用于应用内复制粘贴，以及在无图形环境下验证所有者的行为。
//!
//! # 实现思路
//!
//! - 当前注册（目标列表 + 所有者）保存在 `RefCell` 中。
//! - 回调所有者之前先把注册取出或克隆出来，避免回调中重入时重复借用。

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use bytes::Bytes;

use super::{ClipboardHost, ClipboardOwner, SelectionData, TargetEntry};
use crate::error::ClipboardError;
use crate::image_handler::{ExportConfig, ExportError};

struct Registration {
    targets: Vec<TargetEntry>,
    owner: Rc<dyn ClipboardOwner>,
}

/// 进程内剪贴板。
#[derive(Default)]
pub struct MemoryClipboard {
    current: RefCell<Option<Registration>>,
    reject_registrations: Cell<bool>,
}

impl fmt::Debug for MemoryClipboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryClipboard")
            .field("targets", &self.targets())
            .field("reject_registrations", &self.reject_registrations.get())
            .finish()
    }
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 拒绝所有注册的剪贴板，模拟宿主注册失败。
    pub fn rejecting() -> Self {
        let clipboard = Self::default();
        clipboard.reject_registrations.set(true);
        clipboard
    }

    pub fn set_rejecting(&self, reject: bool) {
        self.reject_registrations.set(reject);
    }

    /// 当前声明的目标。
    pub fn targets(&self) -> Vec<TargetEntry> {
        self.current
            .borrow()
            .as_ref()
            .map(|r| r.targets.clone())
            .unwrap_or_default()
    }

    pub fn has_owner(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// 向当前所有者请求某个目标的数据。
    ///
    /// 目标未声明、所有者报错或所有者未提供数据时返回 `None`。
    pub fn request(&self, target: &str) -> Option<SelectionData> {
        let (owner, info) = {
            let current = self.current.borrow();
            let registration = current.as_ref()?;
            let entry = registration
                .targets
                .iter()
                .find(|e| e.target.eq_ignore_ascii_case(target))?;
            (Rc::clone(&registration.owner), entry.info)
        };

        let mut selection = SelectionData::new(target);
        if let Err(err) = owner.on_request(&mut selection, info) {
            log::error!("❌ 剪贴板所有者未能提供 {}：{}", target, err);
            return None;
        }
        selection.is_set().then_some(selection)
    }

    /// 请求某个目标并转换为线上字节。
    pub fn request_bytes(
        &self,
        target: &str,
        config: &ExportConfig,
    ) -> Result<Option<Bytes>, ExportError> {
        match self.request(target) {
            Some(selection) => selection.to_bytes(config),
            None => Ok(None),
        }
    }

    /// 请求文本：依次尝试已声明的文本目标。
    pub fn request_text(&self) -> Option<String> {
        super::targets::text_targets()
            .iter()
            .filter_map(|target| self.request(target))
            .find_map(|selection| selection.text().map(str::to_string))
    }

    /// 请求 URI 列表。
    pub fn request_uris(&self) -> Option<Vec<String>> {
        self.request(super::targets::MIME_URI_LIST)
            .and_then(|selection| selection.uris().map(<[String]>::to_vec))
    }
}

impl ClipboardHost for MemoryClipboard {
    fn set_with_owner(
        &self,
        targets: &[TargetEntry],
        owner: Rc<dyn ClipboardOwner>,
    ) -> Result<(), ClipboardError> {
        if targets.is_empty() {
            return Err(ClipboardError::Registration("目标列表为空".to_string()));
        }
        if self.reject_registrations.get() {
            return Err(ClipboardError::Registration(
                "剪贴板拒绝了所有者注册".to_string(),
            ));
        }

        let previous = self.current.replace(Some(Registration {
            targets: targets.to_vec(),
            owner,
        }));
        log::debug!("📋 剪贴板所有者已更新 - {} 个目标", targets.len());

        if let Some(previous) = previous {
            previous.owner.on_ownership_lost();
        }
        Ok(())
    }

    fn clear(&self) {
        let previous = self.current.take();
        if let Some(previous) = previous {
            log::debug!("🧹 清空剪贴板，通知原所有者");
            previous.owner.on_ownership_lost();
        }
    }
}
