//! # 容量计算模块
//!
//! 容量只由图像几何决定：`floor((可用位数 - 头部位数) / 8)`，
//! 连头部都放不下的图像容量为 0，且不会超过长度头部能表示的最大值。

use log::debug;

use crate::constants::{BITS_PER_BYTE, ELIGIBLE_CHANNELS, HEADER_BITS, MAX_PAYLOAD_LEN};
use crate::pixel::PixelBuffer;

/// 给定宽高的图像最多能隐藏的载荷字节数。
pub fn capacity_for(width: u32, height: u32) -> usize {
    let eligible_bits = (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(ELIGIBLE_CHANNELS);
    from_eligible_bits(eligible_bits)
}

/// 已解码图像最多能隐藏的载荷字节数。
pub fn capacity(pixels: &PixelBuffer) -> usize {
    let bytes = from_eligible_bits(pixels.pixel_count().saturating_mul(ELIGIBLE_CHANNELS));
    debug!(
        "capacity of {}x{} image: {bytes} bytes",
        pixels.width(),
        pixels.height()
    );
    bytes
}

pub(crate) fn from_eligible_bits(eligible_bits: usize) -> usize {
    (eligible_bits.saturating_sub(HEADER_BITS) / BITS_PER_BYTE).min(MAX_PAYLOAD_LEN)
}
