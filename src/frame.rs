//! # 消息帧模块
//!
//! 帧格式：32 位大端长度头部 (单位为字节)，紧跟 `length` 个载荷字节。
//! 头部与载荷的每个字节都按最高位优先写入位流。

use std::borrow::{Borrow, BorrowMut};

use log::debug;

use crate::bits::BitStream;
use crate::capacity;
use crate::constants::{BITS_PER_BYTE, HEADER_BITS};
use crate::error::{Result, StegoError};
use crate::pixel::PixelBuffer;

/// 将载荷按帧格式写入位流。
///
/// # Errors
///
/// 载荷超出容量时返回 [`StegoError::CapacityExceeded`]，此时不会写入任何一位。
pub fn write_frame<P: BorrowMut<PixelBuffer>>(
    stream: &mut BitStream<P>,
    payload: &[u8],
) -> Result<()> {
    let available = capacity::from_eligible_bits(stream.total_bits());
    let exceeded = || StegoError::CapacityExceeded {
        required: payload.len(),
        available,
    };
    if payload.len() > available {
        return Err(exceeded());
    }
    let length = u32::try_from(payload.len()).map_err(|_| exceeded())?;

    let bits = length
        .to_be_bytes()
        .into_iter()
        .chain(payload.iter().copied())
        .flat_map(|byte| (0..BITS_PER_BYTE).rev().map(move |shift| (byte >> shift) & 1));

    let mut positions = stream.positions();
    for bit in bits {
        let position = positions.next().ok_or_else(exceeded)?;
        stream.write_bit(position, bit).ok_or_else(exceeded)?;
    }

    debug!("wrote frame with {length} payload bytes");
    Ok(())
}

/// 从位流中读取一帧并返回载荷原始字节，不做任何文本校验。
///
/// # Errors
///
/// * [`StegoError::TruncatedStream`] - 图像放不下头部，或头部声明的长度超出图像剩余位数。
/// * [`StegoError::InvalidLength`] - 头部声明的长度为 0，编码器不会产生这样的帧。
pub fn read_frame<P: Borrow<PixelBuffer>>(stream: &BitStream<P>) -> Result<Vec<u8>> {
    let available_bits = stream.total_bits();
    let truncated = |required_bits| StegoError::TruncatedStream {
        required_bits,
        available_bits,
    };

    let mut bits = stream
        .positions()
        .map_while(|position| stream.read_bit(position));

    let declared = take_bits(&mut bits, HEADER_BITS).ok_or_else(|| truncated(HEADER_BITS))?;
    let declared = u32::try_from(declared).map_err(|_| truncated(HEADER_BITS))?;
    debug!("frame header declares {declared} payload bytes");

    if declared == 0 {
        return Err(StegoError::InvalidLength { declared });
    }

    let required_bits = (declared as usize)
        .saturating_mul(BITS_PER_BYTE)
        .saturating_add(HEADER_BITS);
    if required_bits > available_bits {
        return Err(truncated(required_bits));
    }

    (0..declared)
        .map(|_| {
            take_bits(&mut bits, BITS_PER_BYTE)
                .map(|byte| byte as u8)
                .ok_or_else(|| truncated(required_bits))
        })
        .collect()
}

/// 按最高位优先取出 `count` 位拼成整数，位流提前耗尽时返回 `None`。
fn take_bits(bits: &mut impl Iterator<Item = u8>, count: usize) -> Option<u64> {
    (0..count).try_fold(0u64, |value, _| {
        bits.next().map(|bit| (value << 1) | u64::from(bit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::ChannelLayout;

    fn blank(width: u32, height: u32) -> BitStream<PixelBuffer> {
        let samples = vec![0x80; (width * height * 3) as usize];
        BitStream::new(PixelBuffer::from_raw(width, height, ChannelLayout::Rgb, samples).unwrap())
    }

    fn lsbs(stream: &BitStream<PixelBuffer>) -> Vec<u8> {
        stream
            .positions()
            .map(|position| stream.read_bit(position).unwrap())
            .collect()
    }

    #[test]
    fn header_and_body_are_written_msb_first() {
        let mut stream = blank(20, 1);
        write_frame(&mut stream, b"A").unwrap();

        let bits = lsbs(&stream);
        let mut expected = vec![0; 31];
        expected.push(1);
        // 'A' = 0x41 = 0b0100_0001
        expected.extend([0, 1, 0, 0, 0, 0, 0, 1]);

        assert_eq!(&bits[..40], expected.as_slice());
        assert!(bits[40..].iter().all(|&bit| bit == 0));
    }

    #[test]
    fn untouched_high_bits_survive_writing() {
        let mut stream = blank(20, 1);
        write_frame(&mut stream, b"hi").unwrap();

        assert!(stream
            .pixels()
            .samples()
            .iter()
            .all(|&sample| sample & 0xFE == 0x80));
    }

    #[test]
    fn frame_round_trips_arbitrary_bytes() {
        let payload = [0x00, 0xFF, 0x7F, 0x80, 0xC3, 0x28];
        let mut stream = blank(10, 10);
        write_frame(&mut stream, &payload).unwrap();

        assert_eq!(read_frame(&stream).unwrap(), payload);
    }

    #[test]
    fn oversized_payload_writes_nothing() {
        let mut stream = blank(10, 10);
        let before = stream.pixels().clone();

        let result = write_frame(&mut stream, &[b'x'; 34]);

        assert!(matches!(
            result,
            Err(StegoError::CapacityExceeded {
                required: 34,
                available: 33
            })
        ));
        assert_eq!(stream.pixels(), &before);
    }

    #[test]
    fn payload_filling_capacity_exactly_fits() {
        let mut stream = blank(10, 10);
        let payload = [b'z'; 33];
        write_frame(&mut stream, &payload).unwrap();

        assert_eq!(read_frame(&stream).unwrap(), payload);
    }

    #[test]
    fn image_smaller_than_header_is_truncated() {
        let stream = blank(10, 1);

        assert!(matches!(
            read_frame(&stream),
            Err(StegoError::TruncatedStream {
                required_bits: 32,
                available_bits: 30
            })
        ));
    }

    #[test]
    fn declared_length_beyond_image_is_truncated() {
        let mut stream = blank(10, 10);
        // 头部全部置 1，声明 u32::MAX 字节
        for position in stream.positions().take(HEADER_BITS) {
            stream.write_bit(position, 1).unwrap();
        }

        assert!(matches!(
            read_frame(&stream),
            Err(StegoError::TruncatedStream {
                available_bits: 300,
                ..
            })
        ));
    }

    #[test]
    fn zero_length_header_is_invalid() {
        let stream = blank(10, 10);

        assert!(matches!(
            read_frame(&stream),
            Err(StegoError::InvalidLength { declared: 0 })
        ));
    }

    #[test]
    fn reading_borrows_without_mutation() {
        let mut stream = blank(10, 10);
        write_frame(&mut stream, b"borrowed").unwrap();
        let pixels = stream.into_inner();

        let first = read_frame(&BitStream::new(&pixels)).unwrap();
        let second = read_frame(&BitStream::new(&pixels)).unwrap();
        assert_eq!(first, b"borrowed");
        assert_eq!(first, second);
    }
}
