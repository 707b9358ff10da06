//! # 像素编码流水线模块
//!
//! ## 设计思路
//!
//! 宿主请求图片目标时，请求的是某个具体 MIME 类型（如 `image/png`）。
//! 该模块负责把共享的像素数据编码成对应格式的字节，并在编码前做像素上限检查。
//!
//! ## 实现思路
//!
//! 1. MIME → `ImageFormat`，并确认在配置的导出列表内
//! 2. 按像素上限快速拒绝
//! 3. JPEG 不支持透明通道，先转换为 RGB8
//! 4. 使用 `image` 的编码器写出

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

use super::{ExportConfig, ExportError};

/// 将像素数据编码为指定 MIME 类型的字节。
pub fn encode_pixbuf(
    image: &DynamicImage,
    mime: &str,
    config: &ExportConfig,
) -> Result<Vec<u8>, ExportError> {
    if !config.offers_image_mime(mime) {
        return Err(ExportError::Encode(format!("未导出的图片类型：{}", mime)));
    }
    let format = ImageFormat::from_mime_type(mime)
        .ok_or_else(|| ExportError::Encode(format!("无法识别的图片类型：{}", mime)))?;

    let (width, height) = image.dimensions();
    validate_pixel_limits(config, width, height)?;

    let mut cursor = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => {
            let rgb = image.to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut cursor, config.jpeg_quality);
            rgb.write_with_encoder(encoder)
                .map_err(|e| ExportError::Encode(format!("JPEG 编码失败：{}", e)))?;
        }
        other => {
            image
                .write_to(&mut cursor, other)
                .map_err(|e| ExportError::Encode(format!("{:?} 编码失败：{}", other, e)))?;
        }
    }

    let bytes = cursor.into_inner();
    log::debug!(
        "🖼️ 图片编码完成 - {} {}x{} -> {} 字节",
        mime,
        width,
        height,
        bytes.len()
    );
    Ok(bytes)
}

/// 转换为 RGBA 原始像素，供只接受位图的剪贴板后端使用。
pub(crate) fn to_rgba_bytes(
    image: &DynamicImage,
    config: &ExportConfig,
) -> Result<(usize, usize, Vec<u8>), ExportError> {
    let (width, height) = image.dimensions();
    validate_pixel_limits(config, width, height)?;

    let bytes = image.to_rgba8().into_raw();
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| ExportError::ResourceLimit("图片尺寸导致内存溢出风险".to_string()))?;
    if bytes.len() != expected_len {
        return Err(ExportError::Encode("RGBA 像素数据长度异常".to_string()));
    }

    Ok((width as usize, height as usize, bytes))
}

fn validate_pixel_limits(config: &ExportConfig, width: u32, height: u32) -> Result<(), ExportError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| ExportError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > config.max_encode_pixels {
        return Err(ExportError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_encode_pixels
        )));
    }

    Ok(())
}
