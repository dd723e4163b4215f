//! # 隐写核心模块
//!
//! 组合像素编解码、容量计算与消息帧，对外提供三个同步、无状态的操作：
//! [`get_capacity`]、[`encode_message`] 与 [`decode_message`]。
//! 所有操作都只在内存中处理传入的字节，不做任何 I/O。

use log::debug;

use crate::bits::BitStream;
use crate::capacity::capacity;
use crate::error::{Result, StegoError};
use crate::frame::{read_frame, write_frame};
use crate::pixel::PixelBuffer;

/// 已解码的载体图像，适合解码一次后多次查询容量或隐藏/提取消息。
#[derive(Debug, Clone)]
pub struct Stego {
    pixels: PixelBuffer,
}

impl Stego {
    /// 解码 PNG 字节流。
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        PixelBuffer::decode(bytes).map(Self::from)
    }

    pub fn capacity(&self) -> usize {
        capacity(&self.pixels)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// 在载体的副本中隐藏 `payload`，返回新的 PNG 字节流；载体本身不变。
    ///
    /// # Errors
    ///
    /// * [`StegoError::EmptyMessage`] - 载荷为空。
    /// * [`StegoError::CapacityExceeded`] - 载荷超出容量，此时不会产生任何输出。
    /// * [`StegoError::CorruptImage`] - 重新编码失败。
    pub fn hide(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.is_empty() {
            return Err(StegoError::EmptyMessage);
        }

        let available = self.capacity();
        if payload.len() > available {
            debug!(
                "refusing to embed {} bytes into capacity of {available}",
                payload.len()
            );
            return Err(StegoError::CapacityExceeded {
                required: payload.len(),
                available,
            });
        }

        let mut stream = BitStream::new(self.pixels.clone());
        write_frame(&mut stream, payload)?;
        stream.into_inner().encode()
    }

    /// 提取隐藏的消息并校验为 UTF-8 文本。
    ///
    /// # Errors
    ///
    /// * [`StegoError::TruncatedStream`] / [`StegoError::InvalidLength`] - 头部与图像尺寸不符。
    /// * [`StegoError::InvalidEncoding`] - 恢复的字节不是 UTF-8，通常意味着图像中没有隐藏消息。
    pub fn reveal(&self) -> Result<String> {
        let payload = self.reveal_bytes()?;
        Ok(String::from_utf8(payload)?)
    }

    /// 提取隐藏的原始字节，不做文本校验。
    pub fn reveal_bytes(&self) -> Result<Vec<u8>> {
        read_frame(&BitStream::new(&self.pixels))
    }
}

impl From<PixelBuffer> for Stego {
    fn from(pixels: PixelBuffer) -> Self {
        Self { pixels }
    }
}

/// 按字节隐藏任意载荷，返回新的 PNG 字节流。
pub fn encode(image: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    Stego::from_bytes(image)?.hide(message)
}

/// 提取隐藏的消息文本。
pub fn decode(image: &[u8]) -> Result<String> {
    Stego::from_bytes(image)?.reveal()
}

/// 图像能隐藏的最大字节数。输入不是可接受的 PNG 时返回 0。
pub fn get_capacity(image: &[u8]) -> usize {
    try_get_capacity(image).unwrap_or_else(|err| {
        debug!("capacity query failed: {err}");
        0
    })
}

/// 与 [`get_capacity`] 相同，但保留格式错误，便于区分"容量为 0"与"不是 PNG"。
pub fn try_get_capacity(image: &[u8]) -> Result<usize> {
    Stego::from_bytes(image).map(|stego| stego.capacity())
}

/// 将文本消息隐藏到 PNG 图像中，返回新的 PNG 字节流。
///
/// 空消息会被拒绝：往返保证只覆盖长度在 `1..=capacity` 之间的消息，
/// 这样解码时长度为 0 的头部才能被确定地识别为"没有消息"。
///
/// # Errors
///
/// 返回 [`StegoError::UnsupportedFormat`]、[`StegoError::CorruptImage`]、
/// [`StegoError::EmptyMessage`] 或 [`StegoError::CapacityExceeded`]。
pub fn encode_message(image: &[u8], message: &str) -> Result<Vec<u8>> {
    encode(image, message.as_bytes())
}

/// 从经过隐写的 PNG 图像中恢复文本消息。
///
/// 对从未隐写过的图像，结果确定地为 [`StegoError::TruncatedStream`]、
/// [`StegoError::InvalidLength`] 或 [`StegoError::InvalidEncoding`] 之一。
pub fn decode_message(image: &[u8]) -> Result<String> {
    decode(image)
}
