//! # lsb_stego 库
//!
//! 本库包含 LSB 隐写引擎及其命令行前端。
//! 引擎只接受无损 PNG，将消息以 32 位长度头部加载荷的形式，
//! 按最高位优先写入每个像素 R、G、B 通道的最低有效位。

// 声明库包含的所有模块。

pub mod bits;
pub mod capacity;
pub mod cli;
pub mod constants;
pub mod error;
pub mod frame;
pub mod handler;
pub mod pixel;
pub mod steganography;

pub use error::{Result, StegoError};
pub use pixel::{ChannelLayout, PixelBuffer};
pub use steganography::{
    Stego, decode, decode_message, encode, encode_message, get_capacity, try_get_capacity,
};
