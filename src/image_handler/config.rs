//! # 配置模块
//!
//! ## 设计思路
//!
//! 将导出时的可调参数集中到 `ExportConfig`：
//! 提供哪些图片 MIME 类型、JPEG 编码质量、编码像素上限。
//! 每个处理器在构造时持有一份配置快照，处理中途不会漂移。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的配置。
//! - 支持从 JSON 读取（缺省字段回落到默认值），读取后统一 `validate`。

use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::error::ClipboardError;

/// 剪贴板导出配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// 对外提供的图片 MIME 类型，顺序即优先级。
    pub image_mime_types: Vec<String>,
    /// JPEG 编码质量（1~100）。
    pub jpeg_quality: u8,
    /// 单次编码允许的最大像素数（`width * height`）。
    pub max_encode_pixels: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            image_mime_types: vec![
                "image/png".to_string(),
                "image/bmp".to_string(),
                "image/tiff".to_string(),
                "image/jpeg".to_string(),
            ],
            jpeg_quality: 90,
            max_encode_pixels: 40_000_000,
        }
    }
}

impl ExportConfig {
    /// 从 JSON 文本读取配置并校验。
    ///
    /// # 示例
    /// ```rust
    /// use image_clipboard_handler::image_handler::ExportConfig;
    ///
    /// let config = ExportConfig::from_json(r#"{ "jpeg_quality": 75 }"#)?;
    /// assert_eq!(config.jpeg_quality, 75);
    /// assert_eq!(config.image_mime_types[0], "image/png");
    /// # Ok::<(), image_clipboard_handler::ClipboardError>(())
    /// ```
    pub fn from_json(text: &str) -> Result<Self, ClipboardError> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| ClipboardError::Config(format!("解析配置失败: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置取值范围。
    pub fn validate(&self) -> Result<(), ClipboardError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ClipboardError::Config(
                "jpeg_quality 必须在 1~100 之间".to_string(),
            ));
        }
        if self.max_encode_pixels == 0 {
            return Err(ClipboardError::Config(
                "max_encode_pixels 不能为 0".to_string(),
            ));
        }
        for mime in &self.image_mime_types {
            let supported = ImageFormat::from_mime_type(mime)
                .map(|format| format.writing_enabled())
                .unwrap_or(false);
            if !supported {
                return Err(ClipboardError::Config(format!(
                    "不支持写出的图片类型：{}",
                    mime
                )));
            }
        }
        Ok(())
    }

    /// 判断某个 MIME 类型是否在导出列表中。
    pub(crate) fn offers_image_mime(&self, mime: &str) -> bool {
        self.image_mime_types.iter().any(|m| m.eq_ignore_ascii_case(mime))
    }
}
