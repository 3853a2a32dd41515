use std::io::Cursor;
use std::marker::{Send, Sync};
use std::path::PathBuf;
use std::result::Result;

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::config::AppReceiptCfg;
use crate::error::{AppError, AppErrorCode};
use crate::model::ReceiptImage;

#[async_trait]
pub trait AbstractImagePicker: Send + Sync {
    // `None` means staff dismissed the picker without choosing anything
    async fn pick(&self) -> Result<Option<ReceiptImage>, AppError>;
}

#[async_trait]
pub trait AbstractImageCompressor: Send + Sync {
    async fn compress(&self, original: &ReceiptImage) -> Result<ReceiptImage, AppError>;
}

/// Picks a receipt already saved in local file system
pub struct LocalFsImagePicker {
    path: Option<PathBuf>,
}

/// Bounded-width lossy re-encode, output is always JPEG
pub struct JpegReceiptCompressor {
    max_width: u32,
    quality: u8,
}

impl LocalFsImagePicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl AbstractImagePicker for LocalFsImagePicker {
    async fn pick(&self) -> Result<Option<ReceiptImage>, AppError> {
        let path = if let Some(p) = self.path.as_ref() {
            p
        } else {
            return Ok(None);
        };
        let payload = tokio::fs::read(path).await?;
        let fname = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        Ok(Some(ReceiptImage::from_source(payload, fname)))
    }
}

impl From<&AppReceiptCfg> for JpegReceiptCompressor {
    fn from(value: &AppReceiptCfg) -> Self {
        Self {
            max_width: value.max_width,
            quality: value.jpeg_quality,
        }
    }
}

impl JpegReceiptCompressor {
    pub fn new(max_width: u32, quality: u8) -> Self {
        Self { max_width, quality }
    }

    fn _encode(payload: &[u8], max_width: u32, quality: u8) -> Result<Vec<u8>, AppError> {
        let decode_err = |e: image::ImageError| AppError {
            code: AppErrorCode::DataCorruption,
            detail: Some(e.to_string()),
        };
        let mut img = image::load_from_memory(payload).map_err(decode_err)?;
        let (width, height) = (img.width(), img.height());
        if width > max_width {
            let new_height = ((height as u64 * max_width as u64) / width as u64).max(1) as u32;
            img = img.resize_exact(max_width, new_height, FilterType::Triangle);
        }
        let rgb = img.to_rgb8();
        let mut out = Cursor::new(Vec::new());
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
            encoder.encode_image(&rgb).map_err(|e| AppError {
                code: AppErrorCode::DeviceFailure,
                detail: Some(e.to_string()),
            })?;
        }
        Ok(out.into_inner())
    }
} // end of impl JpegReceiptCompressor

#[async_trait]
impl AbstractImageCompressor for JpegReceiptCompressor {
    async fn compress(&self, original: &ReceiptImage) -> Result<ReceiptImage, AppError> {
        let (max_width, quality) = (self.max_width, self.quality);
        let payload = original.payload.clone();
        // decoding and re-encoding are CPU-bound
        let encoded =
            tokio::task::spawn_blocking(move || Self::_encode(&payload, max_width, quality))
                .await
                .map_err(|e| AppError {
                    code: AppErrorCode::DeviceFailure,
                    detail: Some(e.to_string()),
                })??;
        Ok(ReceiptImage::jpeg(encoded))
    }
}
