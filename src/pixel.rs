//! # 像素编解码模块
//!
//! 负责在 PNG 字节流与扁平的通道样本序列 ([`PixelBuffer`]) 之间转换。
//! 只接受 PNG：有损格式在重新编码时无法保证最低有效位保持不变，
//! 因此在读取任何像素之前就会被拒绝。

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};
use log::debug;

use crate::error::{Result, StegoError};

/// 每个像素的通道排列方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// R, G, B
    Rgb,
    /// R, G, B, A
    Rgba,
}

impl ChannelLayout {
    /// 每个像素的通道数。
    pub fn channels(self) -> usize {
        match self {
            ChannelLayout::Rgb => 3,
            ChannelLayout::Rgba => 4,
        }
    }

    fn color_type(self) -> ExtendedColorType {
        match self {
            ChannelLayout::Rgb => ExtendedColorType::Rgb8,
            ChannelLayout::Rgba => ExtendedColorType::Rgba8,
        }
    }
}

/// 解码后的图像：按行优先排列、通道交错的 8 bit 样本序列。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    samples: Vec<u8>,
}

impl PixelBuffer {
    /// 由原始样本构造像素缓冲区。
    ///
    /// 当 `samples` 的长度与 `width * height * channels` 不一致时返回 `None`。
    pub fn from_raw(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        samples: Vec<u8>,
    ) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(layout.channels())?;
        (samples.len() == expected).then_some(Self {
            width,
            height,
            layout,
            samples,
        })
    }

    /// 将 PNG 字节流解码为像素缓冲区。
    ///
    /// # Errors
    ///
    /// * [`StegoError::UnsupportedFormat`] - 输入无法识别、不是 PNG，或采样深度不是 8 bit。
    /// * [`StegoError::CorruptImage`] - 识别为 PNG，但像素数据无法解码。
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let format = image::guess_format(bytes).map_err(|_| {
            debug!("rejecting input of {} bytes: format not recognised", bytes.len());
            StegoError::unsupported("input is not a recognised image")
        })?;

        if format != ImageFormat::Png {
            debug!("rejecting {format:?} input before pixel access");
            return Err(StegoError::unsupported(format!(
                "{format:?} is not accepted, only lossless PNG is"
            )));
        }

        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(StegoError::CorruptImage)?;
        let (width, height) = (image.width(), image.height());

        let (layout, samples) = match image {
            DynamicImage::ImageRgb8(buffer) => (ChannelLayout::Rgb, buffer.into_raw()),
            DynamicImage::ImageRgba8(buffer) => (ChannelLayout::Rgba, buffer.into_raw()),
            // 灰度图没有独立的 R, G, B 通道，扩展后输出将不再是灰度图
            gray @ (DynamicImage::ImageLuma8(_) | DynamicImage::ImageLumaA8(_)) => {
                debug!("rejecting {:?} PNG: no separate R, G, B channels", gray.color());
                return Err(StegoError::unsupported(format!(
                    "{:?} grayscale images have no separate R, G, B channels",
                    gray.color()
                )));
            }
            other => {
                return Err(StegoError::unsupported(format!(
                    "{:?} samples cannot be narrowed to 8 bits without loss",
                    other.color()
                )));
            }
        };

        debug!(
            "decoded {width}x{height} PNG with {} channels per pixel",
            layout.channels()
        );

        Self::from_raw(width, height, layout, samples).ok_or_else(|| {
            StegoError::unsupported("decoded sample count does not match image geometry")
        })
    }

    /// 将像素缓冲区重新编码为 PNG，宽高与通道排列保持不变。
    ///
    /// # Errors
    ///
    /// 如果 PNG 编码器拒绝这些样本，返回 [`StegoError::CorruptImage`]。
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        PngEncoder::new(Cursor::new(&mut bytes))
            .write_image(
                &self.samples,
                self.width,
                self.height,
                self.layout.color_type(),
            )
            .map_err(StegoError::CorruptImage)?;
        Ok(bytes)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// 每个像素的通道数 (3 或 4)。
    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    pub fn pixel_count(&self) -> usize {
        self.samples.len() / self.channels()
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, GrayImage, ImageBuffer, Luma, LumaA, Rgb, RgbImage, Rgba, RgbaImage};

    fn to_png(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_rgb_png_in_row_major_order() {
        let image = RgbImage::from_fn(2, 2, |x, y| Rgb([x as u8, y as u8, 10 * (x + y) as u8]));
        let pixels = PixelBuffer::decode(&to_png(DynamicImage::ImageRgb8(image))).unwrap();

        assert_eq!(pixels.dimensions(), (2, 2));
        assert_eq!(pixels.layout(), ChannelLayout::Rgb);
        assert_eq!(
            pixels.samples(),
            &[0, 0, 0, 1, 0, 10, 0, 1, 10, 1, 1, 20]
        );
    }

    #[test]
    fn keeps_alpha_channel_layout() {
        let image = RgbaImage::from_pixel(3, 1, Rgba([9, 8, 7, 128]));
        let pixels = PixelBuffer::decode(&to_png(DynamicImage::ImageRgba8(image))).unwrap();

        assert_eq!(pixels.layout(), ChannelLayout::Rgba);
        assert_eq!(pixels.channels(), 4);
        assert_eq!(pixels.pixel_count(), 3);
        assert_eq!(&pixels.samples()[..4], &[9, 8, 7, 128]);
    }

    #[test]
    fn rejects_grayscale_instead_of_widening() {
        let gray = GrayImage::from_pixel(10, 10, Luma([77]));
        let gray_alpha = GrayAlphaImage::from_pixel(10, 10, LumaA([77, 200]));

        for image in [
            DynamicImage::ImageLuma8(gray),
            DynamicImage::ImageLumaA8(gray_alpha),
        ] {
            assert!(matches!(
                PixelBuffer::decode(&to_png(image)),
                Err(StegoError::UnsupportedFormat { .. })
            ));
        }
    }

    #[test]
    fn rejects_sixteen_bit_samples() {
        let image: ImageBuffer<Rgb<u16>, Vec<u16>> = ImageBuffer::from_pixel(2, 2, Rgb([1000, 2, 3]));
        let result = PixelBuffer::decode(&to_png(DynamicImage::ImageRgb16(image)));

        assert!(matches!(result, Err(StegoError::UnsupportedFormat { .. })));
    }

    #[test]
    fn rejects_lossy_and_unknown_formats_before_decoding() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
        let gif = b"GIF89a\x01\x00\x01\x00";
        let inputs: [&[u8]; 4] = [&jpeg, gif, b"plain text, not an image", &[]];

        for input in inputs {
            assert!(matches!(
                PixelBuffer::decode(input),
                Err(StegoError::UnsupportedFormat { .. })
            ));
        }
    }

    #[test]
    fn reports_corrupt_png_body() {
        let mut bytes = to_png(DynamicImage::ImageRgb8(RgbImage::new(8, 8)));
        bytes.truncate(bytes.len() / 2);

        assert!(matches!(
            PixelBuffer::decode(&bytes),
            Err(StegoError::CorruptImage(_))
        ));
    }

    #[test]
    fn encode_reproduces_every_sample() {
        let samples: Vec<u8> = (0..=255).cycle().take(5 * 4 * 4).collect();
        let pixels = PixelBuffer::from_raw(5, 4, ChannelLayout::Rgba, samples).unwrap();

        let reloaded = PixelBuffer::decode(&pixels.encode().unwrap()).unwrap();
        assert_eq!(reloaded, pixels);
    }

    #[test]
    fn from_raw_checks_sample_count() {
        assert!(PixelBuffer::from_raw(2, 2, ChannelLayout::Rgb, vec![0; 12]).is_some());
        assert!(PixelBuffer::from_raw(2, 2, ChannelLayout::Rgb, vec![0; 11]).is_none());
        assert!(PixelBuffer::from_raw(2, 2, ChannelLayout::Rgba, vec![0; 12]).is_none());
    }
}
