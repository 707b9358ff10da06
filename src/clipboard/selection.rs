//! 选区数据：一次“按目标取数据”请求的载体
//!
//! # 设计思路
//!
//! 宿主为每次请求创建一个 `SelectionData`，所有者往里放入至多一份数据。
//! 各 setter 与目标类型匹配时才接受数据（文本只放进文本目标，URI 列表只放进
//! `text/uri-list`，像素只放进图片目标），原始字节则不做限制。
//!
//! # 实现思路
//!
//! 数据以语义形式保存（文本、URI 列表、共享像素），
//! 由宿主在真正需要字节时调用 `to_bytes` 转换为线上格式。

use bytes::Bytes;

use super::targets::{MIME_URI_LIST, is_image_target, is_text_target};
use crate::image_handler::{ExportConfig, ExportError, Pixbuf, pipeline};

/// 所有者提供的数据。
#[derive(Debug, Clone)]
pub enum Payload {
    /// 指定 MIME 类型的原始字节。
    Bytes { mime: String, data: Bytes },
    /// 共享像素数据，按请求目标编码。
    Image(Pixbuf),
    Text(String),
    Uris(Vec<String>),
}

/// 单次请求的选区数据。
#[derive(Debug, Clone)]
pub struct SelectionData {
    target: String,
    payload: Option<Payload>,
}

impl SelectionData {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            payload: None,
        }
    }

    /// 被请求的目标名。
    pub fn target(&self) -> &str {
        &self.target
    }

    /// 放入原始字节。
    pub fn set(&mut self, mime: &str, data: impl Into<Bytes>) {
        self.payload = Some(Payload::Bytes {
            mime: mime.to_string(),
            data: data.into(),
        });
    }

    /// 放入像素数据；仅图片目标接受。
    pub fn set_pixbuf(&mut self, pixbuf: Pixbuf) -> bool {
        if !is_image_target(&self.target) {
            log::debug!("⏭️ 目标 {} 不接受图片数据", self.target);
            return false;
        }
        self.payload = Some(Payload::Image(pixbuf));
        true
    }

    /// 放入文本；仅文本目标接受。
    pub fn set_text(&mut self, text: &str) -> bool {
        if !is_text_target(&self.target) {
            log::debug!("⏭️ 目标 {} 不接受文本数据", self.target);
            return false;
        }
        self.payload = Some(Payload::Text(text.to_string()));
        true
    }

    /// 放入 URI 列表；仅 `text/uri-list` 接受。
    pub fn set_uris(&mut self, uris: Vec<String>) -> bool {
        if !self.target.eq_ignore_ascii_case(MIME_URI_LIST) {
            log::debug!("⏭️ 目标 {} 不接受 URI 列表", self.target);
            return false;
        }
        self.payload = Some(Payload::Uris(uris));
        true
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.payload.is_some()
    }

    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Some(Payload::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn uris(&self) -> Option<&[String]> {
        match &self.payload {
            Some(Payload::Uris(uris)) => Some(uris.as_slice()),
            _ => None,
        }
    }

    pub fn pixbuf(&self) -> Option<&Pixbuf> {
        match &self.payload {
            Some(Payload::Image(pixbuf)) => Some(pixbuf),
            _ => None,
        }
    }

    /// 原始字节数据及其 MIME 类型。
    pub fn data(&self) -> Option<(&str, &Bytes)> {
        match &self.payload {
            Some(Payload::Bytes { mime, data }) => Some((mime.as_str(), data)),
            _ => None,
        }
    }

    /// 转换为线上字节；未放入数据时返回 `None`。
    ///
    /// URI 列表按 RFC 2483 以 CRLF 结尾每一行。
    pub fn to_bytes(&self, config: &ExportConfig) -> Result<Option<Bytes>, ExportError> {
        let Some(payload) = &self.payload else {
            return Ok(None);
        };

        let bytes = match payload {
            Payload::Bytes { data, .. } => data.clone(),
            Payload::Text(text) => Bytes::from(text.clone().into_bytes()),
            Payload::Uris(uris) => {
                let mut list = String::new();
                for uri in uris {
                    list.push_str(uri);
                    list.push_str("\r\n");
                }
                Bytes::from(list.into_bytes())
            }
            Payload::Image(pixbuf) => {
                Bytes::from(pipeline::encode_pixbuf(pixbuf, &self.target, config)?)
            }
        };

        Ok(Some(bytes))
    }
}
