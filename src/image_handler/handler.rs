//! # 剪贴板导出处理器
//!
//! ## 设计思路
//!
//! `ClipboardHandler` 在用户点击“复制”时由当前图片构造一次，
//! 构造时对图片做快照（像素、来源 URI、元数据副本），之后字段只读。
//! 它把自己注册为剪贴板所有者，在被取代之前按需响应各种目标的请求。
//!
//! ## 实现思路
//!
//! - 处理器以 `Rc<ClipboardHandler>` 形式存在，宿主持有的强引用决定其生命周期；
//!   最后一个引用释放时 `Drop` 释放像素、URI 与元数据，各自恰好一次。
//! - 状态机：`Unclaimed → Claimed → Released`，注册失败或无可提供格式时
//!   直接 `Unclaimed → Released`。`Released` 为终态。
//! - 元数据能力由 `xmp` 特性控制，关闭时快照中始终没有元数据。
//!
//! ```text
//! 用户复制
//!    ↓
//! ClipboardHandler::new(&image)      快照字段
//!    ↓
//! copy_to_clipboard(&clipboard)      计算目标 → set_with_owner
//!    ↓
//! on_request(selection, info)        宿主按需取数（可多次）
//!    ↓
//! on_ownership_lost()                被取代 → 宿主释放引用 → Drop
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use super::source::{ImageSource, Pixbuf};
use super::xmp::{self, MIME_TYPE_XMP, XmpDocument};
use super::{ExportConfig, ExportError};
use crate::clipboard::targets::is_image_target;
use crate::clipboard::{ClipboardHost, ClipboardOwner, SelectionData, TargetKind, TargetList};
use crate::error::ClipboardError;

/// 处理器所处的所有权阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    /// 已构造，尚未注册。
    Unclaimed,
    /// 当前剪贴板所有者。
    Claimed,
    /// 已失去所有权（终态）。
    Released,
}

/// 剪贴板导出处理器。
pub struct ClipboardHandler {
    pixbuf: Option<Pixbuf>,
    uri: Option<String>,
    xmp: Option<Box<dyn XmpDocument>>,
    config: ExportConfig,
    state: Cell<HandlerState>,
}

impl fmt::Debug for ClipboardHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipboardHandler")
            .field("has_pixbuf", &self.pixbuf.is_some())
            .field("uri", &self.uri)
            .field("has_xmp", &self.xmp.is_some())
            .field("state", &self.state.get())
            .finish()
    }
}

impl ClipboardHandler {
    /// 使用默认配置对图片做快照。
    ///
    /// # 示例
    /// ```rust
    /// use image_clipboard_handler::clipboard::MemoryClipboard;
    /// use image_clipboard_handler::image_handler::{ClipboardHandler, StaticImage};
    ///
    /// let image = StaticImage::new().with_uri("file:///tmp/a.png");
    /// let clipboard = MemoryClipboard::new();
    /// ClipboardHandler::new(&image).copy_to_clipboard(&clipboard)?;
    /// assert_eq!(clipboard.request_text().as_deref(), Some("file:///tmp/a.png"));
    /// # Ok::<(), image_clipboard_handler::ClipboardError>(())
    /// ```
    pub fn new(source: &dyn ImageSource) -> Rc<Self> {
        Self::with_config(source, ExportConfig::default())
    }

    /// 使用指定配置对图片做快照。
    pub fn with_config(source: &dyn ImageSource, config: ExportConfig) -> Rc<Self> {
        let pixbuf = source.pixbuf();
        let uri = source.uri();
        // 来源交出的是私有副本，此后由处理器独占
        let xmp = if xmp::ENABLED { source.xmp_info() } else { None };

        log::debug!(
            "📸 图片快照 - pixbuf={} uri={:?} xmp={}",
            pixbuf.is_some(),
            uri,
            xmp.is_some()
        );

        Rc::new(Self {
            pixbuf,
            uri,
            xmp,
            config,
            state: Cell::new(HandlerState::Unclaimed),
        })
    }

    pub fn state(&self) -> HandlerState {
        self.state.get()
    }

    pub fn pixbuf(&self) -> Option<&Pixbuf> {
        self.pixbuf.as_ref()
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn has_xmp(&self) -> bool {
        self.xmp.is_some()
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// 根据已有字段生成可提供的目标列表。
    pub fn target_list(&self) -> TargetList {
        let mut list = TargetList::new();

        if self.pixbuf.is_some() {
            let (image_types, ignored): (Vec<&str>, Vec<&str>) = self
                .config
                .image_mime_types
                .iter()
                .map(String::as_str)
                .partition(|mime| is_image_target(mime));
            for mime in ignored {
                log::warn!("⚠️ 配置中的 {} 不是图片类型，不注册为位图目标", mime);
            }
            list.add_image_targets(image_types.as_slice(), TargetKind::Pixbuf.info());
        }
        if self.uri.is_some() {
            list.add_text_targets(TargetKind::Text.info());
            list.add_uri_targets(TargetKind::Uri.info());
        }
        if self.xmp.is_some() {
            list.add(MIME_TYPE_XMP, TargetKind::Xmp.info());
        }

        list
    }

    /// 声明剪贴板所有权。
    ///
    /// 成功后宿主持有处理器的一个强引用，调用方可以放心丢弃自己的引用。
    /// 没有任何可提供格式或注册失败时会清空剪贴板并进入 `Released`。
    pub fn copy_to_clipboard(
        self: &Rc<Self>,
        clipboard: &dyn ClipboardHost,
    ) -> Result<(), ClipboardError> {
        match self.state.get() {
            HandlerState::Unclaimed => {}
            HandlerState::Claimed => return Err(ExportError::AlreadyClaimed.into()),
            HandlerState::Released => return Err(ExportError::Released.into()),
        }

        let targets = self.target_list().into_entries();
        if targets.is_empty() {
            log::info!("⏭️ 图片没有可复制的数据，清空剪贴板");
            self.state.set(HandlerState::Released);
            clipboard.clear();
            return Err(ClipboardError::NothingToOffer);
        }

        // 宿主可能在注册过程中就来取数，先进入 Claimed
        self.state.set(HandlerState::Claimed);
        let owner: Rc<dyn ClipboardOwner> = Rc::clone(self) as Rc<dyn ClipboardOwner>;

        match clipboard.set_with_owner(&targets, owner) {
            Ok(()) => {
                log::info!("📋 已声明剪贴板所有权 - {} 个目标", targets.len());
                Ok(())
            }
            Err(err) => {
                log::warn!("❌ 声明剪贴板所有权失败：{}", err);
                self.state.set(HandlerState::Released);
                clipboard.clear();
                Err(err)
            }
        }
    }

    fn serve_xmp(&self, selection: &mut SelectionData) -> Result<(), ExportError> {
        let doc = self.xmp.as_deref().ok_or(ExportError::MissingPayload("xmp"))?;
        match xmp::clipboard_document(doc) {
            Ok(bytes) => {
                selection.set(MIME_TYPE_XMP, bytes);
            }
            Err(err) => {
                // 序列化失败时不提供数据，不视为错误
                log::warn!("⚠️ XMP 序列化失败，本次不提供元数据：{}", err);
            }
        }
        Ok(())
    }
}

impl ClipboardOwner for ClipboardHandler {
    fn on_request(&self, selection: &mut SelectionData, info: u32) -> Result<(), ExportError> {
        match self.state.get() {
            HandlerState::Claimed => {}
            HandlerState::Unclaimed => {
                log::error!("❌ 尚未声明所有权时收到剪贴板请求：{}", selection.target());
                return Err(ExportError::NotClaimed);
            }
            HandlerState::Released => {
                log::error!("❌ 已释放所有权后收到剪贴板请求：{}", selection.target());
                return Err(ExportError::Released);
            }
        }

        let Some(kind) = TargetKind::from_info(info) else {
            log::error!("❌ 未注册的目标编号：{}（{}）", info, selection.target());
            return Err(ExportError::UnknownTarget(info));
        };

        log::debug!("📤 提供剪贴板数据 - {} ({:?})", selection.target(), kind);

        let accepted = match kind {
            TargetKind::Pixbuf => {
                let pixbuf = self.pixbuf.as_ref().ok_or(ExportError::MissingPayload("pixbuf"))?;
                selection.set_pixbuf(Rc::clone(pixbuf))
            }
            TargetKind::Text => {
                let uri = self.uri.as_deref().ok_or(ExportError::MissingPayload("uri"))?;
                selection.set_text(uri)
            }
            TargetKind::Uri => {
                let uri = self.uri.as_ref().ok_or(ExportError::MissingPayload("uri"))?;
                selection.set_uris(vec![uri.clone()])
            }
            TargetKind::Xmp => return self.serve_xmp(selection),
        };

        if !accepted {
            log::warn!("⚠️ 目标 {} 拒绝了 {:?} 数据", selection.target(), kind);
        }
        Ok(())
    }

    fn on_ownership_lost(&self) {
        match self.state.get() {
            HandlerState::Claimed => {
                log::info!("🔚 剪贴板所有权已被取代");
                self.state.set(HandlerState::Released);
            }
            state => {
                log::warn!("⚠️ 重复的所有权丢失通知（当前状态 {:?}），忽略", state);
            }
        }
    }
}

impl Drop for ClipboardHandler {
    fn drop(&mut self) {
        log::debug!(
            "🧹 释放剪贴板处理器 - pixbuf={} uri={} xmp={}",
            self.pixbuf.is_some(),
            self.uri.is_some(),
            self.xmp.is_some()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::image_handler::StaticImage;
    use image::{DynamicImage, RgbaImage};

    fn pixbuf() -> Pixbuf {
        Rc::new(DynamicImage::ImageRgba8(RgbaImage::new(4, 4)))
    }

    #[test]
    fn empty_source_offers_nothing() {
        let handler = ClipboardHandler::new(&StaticImage::new());
        assert!(handler.target_list().is_empty());

        let clipboard = MemoryClipboard::new();
        let result = handler.copy_to_clipboard(&clipboard);

        assert!(matches!(result, Err(ClipboardError::NothingToOffer)));
        assert_eq!(handler.state(), HandlerState::Released);
        assert!(!clipboard.has_owner());
        assert_eq!(Rc::strong_count(&handler), 1);
    }

    #[test]
    fn pixbuf_targets_follow_config_order() {
        let config = ExportConfig {
            image_mime_types: vec!["image/bmp".to_string(), "image/png".to_string()],
            ..ExportConfig::default()
        };
        let image = StaticImage::new().with_pixbuf(pixbuf());
        let handler = ClipboardHandler::with_config(&image, config);
        let list = handler.target_list();

        let names: Vec<&str> = list.entries().iter().map(|e| e.target.as_str()).collect();
        assert_eq!(names, ["image/bmp", "image/png"]);
        assert!(list.entries().iter().all(|e| e.info == TargetKind::Pixbuf.info()));
    }

    #[test]
    fn non_image_mime_in_config_keeps_text_targets() {
        let config = ExportConfig {
            image_mime_types: vec!["text/plain".to_string(), "image/png".to_string()],
            ..ExportConfig::default()
        };
        let image = StaticImage::new()
            .with_pixbuf(pixbuf())
            .with_uri("file:///tmp/a.png");
        let handler = ClipboardHandler::with_config(&image, config);
        assert_eq!(handler.config().image_mime_types[0], "text/plain");

        let list = handler.target_list();
        assert_eq!(list.find("text/plain").map(|e| e.info), Some(TargetKind::Text.info()));
        assert_eq!(list.find("image/png").map(|e| e.info), Some(TargetKind::Pixbuf.info()));

        let clipboard = MemoryClipboard::new();
        handler.copy_to_clipboard(&clipboard).unwrap();
        let selection = clipboard.request("text/plain").expect("text served");
        assert_eq!(selection.text(), Some("file:///tmp/a.png"));
    }

    #[test]
    fn snapshot_ignores_later_source_changes() {
        let mut image = StaticImage::new()
            .with_pixbuf(pixbuf())
            .with_uri("file:///tmp/a.png");
        let handler = ClipboardHandler::new(&image);

        image.set_uri(Some("file:///tmp/b.png".to_string()));
        image.set_pixbuf(None);

        assert_eq!(handler.uri(), Some("file:///tmp/a.png"));
        assert!(handler.pixbuf().is_some());
    }

    #[test]
    fn request_before_claim_is_rejected() {
        let handler = ClipboardHandler::new(&StaticImage::new().with_uri("file:///x"));
        let mut selection = SelectionData::new("text/plain");
        let err = handler
            .on_request(&mut selection, TargetKind::Text.info())
            .unwrap_err();
        assert!(matches!(err, ExportError::NotClaimed));
    }

    #[test]
    fn unknown_info_is_a_contract_violation() {
        let handler = ClipboardHandler::new(&StaticImage::new().with_uri("file:///x"));
        let clipboard = MemoryClipboard::new();
        handler.copy_to_clipboard(&clipboard).unwrap();

        let mut selection = SelectionData::new("text/plain");
        let err = handler.on_request(&mut selection, 99).unwrap_err();
        assert!(matches!(err, ExportError::UnknownTarget(99)));
        assert!(!selection.is_set());
    }

    #[test]
    fn missing_field_is_reported() {
        let handler = ClipboardHandler::new(&StaticImage::new().with_uri("file:///x"));
        let clipboard = MemoryClipboard::new();
        handler.copy_to_clipboard(&clipboard).unwrap();

        let mut selection = SelectionData::new("image/png");
        let err = handler
            .on_request(&mut selection, TargetKind::Pixbuf.info())
            .unwrap_err();
        assert!(matches!(err, ExportError::MissingPayload("pixbuf")));
    }

    #[test]
    fn second_claim_is_rejected() {
        let handler = ClipboardHandler::new(&StaticImage::new().with_uri("file:///x"));
        let clipboard = MemoryClipboard::new();
        handler.copy_to_clipboard(&clipboard).unwrap();

        let err = handler.copy_to_clipboard(&clipboard).unwrap_err();
        assert!(matches!(err, ClipboardError::Export(ExportError::AlreadyClaimed)));
        assert_eq!(handler.state(), HandlerState::Claimed);
    }
}
