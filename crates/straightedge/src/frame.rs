use image::{DynamicImage, RgbaImage};

use crate::error::{Result, StraightedgeError};

/// Bytes per pixel of every frame the pipeline accepts
pub const CHANNELS: usize = 4;

/// Pixel storage handed to [`Frame::from_buffer`].
///
/// The variant decides ownership: `Owned` is moved into the frame, `Borrowed`
/// is deep-copied so the caller keeps its memory.
#[derive(Debug)]
pub enum FrameBuffer<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a [u8]),
}

impl FrameBuffer<'_> {
    fn len(&self) -> usize {
        match self {
            Self::Owned(data) => data.len(),
            Self::Borrowed(data) => data.len(),
        }
    }
}

/// A single 4-channel (RGBA or BGRA), row-major camera frame without row padding.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pixels: RgbaImage,
}

impl Frame {
    /// Build a frame, rejecting empty dimensions and mismatched buffer sizes
    pub fn from_buffer(width: u32, height: u32, buffer: FrameBuffer<'_>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(StraightedgeError::InvalidInput(format!(
                "frame dimensions must be non-zero, got {width}x{height}"
            )));
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or_else(|| {
                StraightedgeError::InvalidInput(format!("frame {width}x{height} is too large"))
            })?;

        if buffer.len() != expected {
            return Err(StraightedgeError::InvalidInput(format!(
                "expected {expected} bytes for a {width}x{height} frame, got {}",
                buffer.len()
            )));
        }

        let data = match buffer {
            FrameBuffer::Owned(data) => data,
            FrameBuffer::Borrowed(data) => data.to_vec(),
        };

        let pixels = RgbaImage::from_raw(width, height, data).ok_or_else(|| {
            StraightedgeError::InvalidInput("buffer does not fit frame dimensions".to_string())
        })?;

        Ok(Self { pixels })
    }

    /// Take ownership of `data`
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        Self::from_buffer(width, height, FrameBuffer::Owned(data))
    }

    /// Deep-copy `data`
    pub fn copy_from(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        Self::from_buffer(width, height, FrameBuffer::Borrowed(data))
    }

    /// Wrap a decoded image, converting it to 4 channels
    pub fn from_image(image: DynamicImage) -> Result<Self> {
        let rgba = image.into_rgba8();
        Self::from_rgba(rgba)
    }

    pub fn from_rgba(pixels: RgbaImage) -> Result<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(StraightedgeError::InvalidInput("image is empty".to_string()));
        }
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn data(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.pixels.into_raw()
    }
}
