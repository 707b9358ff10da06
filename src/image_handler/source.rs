//! # 数据源模块
//!
//! ## 设计思路
//!
//! 图片查看器中的“当前图片”是外部协作者，这里只约定三个只读访问器：
//! - `pixbuf`：当前像素数据（共享引用）
//! - `uri`：图片来源位置
//! - `xmp_info`：元数据的私有副本（所有权交给调用方）
//!
//! `StaticImage` 是该约定的最小实现，供宿主应用直接包装已解码的图片，
//! 也方便测试构造各种字段组合。

use std::rc::Rc;

use image::DynamicImage;

use super::xmp::{XmpDocument, XmpPacket};

/// 共享的像素数据句柄。
///
/// 克隆只增加引用计数，不复制像素。
pub type Pixbuf = Rc<DynamicImage>;

/// 可被复制到剪贴板的图片来源。
pub trait ImageSource {
    /// 当前像素数据；尚未加载时为 `None`。
    fn pixbuf(&self) -> Option<Pixbuf>;

    /// 图片来源位置（通常是 `file://` URI）。
    fn uri(&self) -> Option<String>;

    /// 元数据的私有副本，调用方获得其独占所有权。
    fn xmp_info(&self) -> Option<Box<dyn XmpDocument>> {
        None
    }
}

/// 字段固定的图片来源。
#[derive(Debug, Clone, Default)]
pub struct StaticImage {
    pixbuf: Option<Pixbuf>,
    uri: Option<String>,
    xmp: Option<XmpPacket>,
}

impl StaticImage {
    /// 创建一个空来源（不提供任何数据）。
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pixbuf(mut self, pixbuf: Pixbuf) -> Self {
        self.pixbuf = Some(pixbuf);
        self
    }

    pub fn with_image(self, image: DynamicImage) -> Self {
        self.with_pixbuf(Rc::new(image))
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_xmp(mut self, xmp: XmpPacket) -> Self {
        self.xmp = Some(xmp);
        self
    }

    /// 替换像素数据，模拟查看器在复制之后重新加载了图片。
    pub fn set_pixbuf(&mut self, pixbuf: Option<Pixbuf>) {
        self.pixbuf = pixbuf;
    }

    pub fn set_uri(&mut self, uri: Option<String>) {
        self.uri = uri;
    }
}

impl ImageSource for StaticImage {
    fn pixbuf(&self) -> Option<Pixbuf> {
        self.pixbuf.clone()
    }

    fn uri(&self) -> Option<String> {
        self.uri.clone()
    }

    fn xmp_info(&self) -> Option<Box<dyn XmpDocument>> {
        self.xmp
            .as_ref()
            .map(|packet| Box::new(packet.clone()) as Box<dyn XmpDocument>)
    }
}
