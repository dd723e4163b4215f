//! # 位通道流模块
//!
//! 将 [`PixelBuffer`] 视为一条有序的位流：每个可用通道样本的最低有效位对应一个 bit。
//! 遍历顺序固定为像素按行优先，像素内按 R, G, B，跳过 Alpha。

use std::borrow::{Borrow, BorrowMut};

use crate::constants::ELIGIBLE_CHANNELS;
use crate::pixel::PixelBuffer;

/// 指向可用通道序列中某一位的位置 (像素序号, 通道序号)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitPosition {
    pub pixel: usize,
    pub channel: usize,
}

impl BitPosition {
    pub const START: Self = Self {
        pixel: 0,
        channel: 0,
    };

    pub fn from_index(index: usize) -> Self {
        Self {
            pixel: index / ELIGIBLE_CHANNELS,
            channel: index % ELIGIBLE_CHANNELS,
        }
    }

    /// 该位置在可用通道序列中的线性序号。
    pub fn index(self) -> usize {
        self.pixel * ELIGIBLE_CHANNELS + self.channel
    }
}

/// 按固定顺序产生 [`BitPosition`] 的游标，只前进、不回绕。
#[derive(Debug, Clone)]
pub struct Positions {
    next: usize,
    end: usize,
}

impl Iterator for Positions {
    type Item = BitPosition;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let position = BitPosition::from_index(self.next);
        self.next += 1;
        Some(position)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Positions {}

/// 像素缓冲区之上的位流视图。
///
/// 读取只需要 `P: Borrow<PixelBuffer>`，写入需要 `P: BorrowMut<PixelBuffer>`，
/// 因此既可以借用缓冲区，也可以拥有它并在写完后通过 [`BitStream::into_inner`] 取回。
#[derive(Debug, Clone)]
pub struct BitStream<P> {
    pixels: P,
}

impl<P: Borrow<PixelBuffer>> BitStream<P> {
    pub fn new(pixels: P) -> Self {
        Self { pixels }
    }

    pub fn pixels(&self) -> &PixelBuffer {
        self.pixels.borrow()
    }

    pub fn into_inner(self) -> P {
        self.pixels
    }

    /// 可用通道样本的总数，即位流能承载的总位数。
    pub fn total_bits(&self) -> usize {
        self.pixels().pixel_count() * ELIGIBLE_CHANNELS
    }

    /// 从流起点开始的全部位置。
    pub fn positions(&self) -> Positions {
        Positions {
            next: 0,
            end: self.total_bits(),
        }
    }

    /// 读取指定位置样本的最低有效位，位置越界时返回 `None`。
    pub fn read_bit(&self, position: BitPosition) -> Option<u8> {
        let offset = self.sample_offset(position)?;
        self.pixels().samples().get(offset).map(|sample| sample & 1)
    }

    fn sample_offset(&self, position: BitPosition) -> Option<usize> {
        let pixels = self.pixels();
        if position.channel >= ELIGIBLE_CHANNELS || position.pixel >= pixels.pixel_count() {
            return None;
        }
        Some(position.pixel * pixels.channels() + position.channel)
    }
}

impl<P: BorrowMut<PixelBuffer>> BitStream<P> {
    /// 将指定位置样本的最低有效位设为 `bit` 的最低位，其余 7 位保持不变。
    ///
    /// 位置越界时返回 `None` 且不修改任何样本。
    pub fn write_bit(&mut self, position: BitPosition, bit: u8) -> Option<()> {
        let offset = self.sample_offset(position)?;
        let sample = self.pixels.borrow_mut().samples_mut().get_mut(offset)?;
        *sample = (*sample & 0xFE) | (bit & 1);
        Some(())
    }
}
