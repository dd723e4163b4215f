//! # 错误类型模块
//!
//! 隐写引擎的所有失败都以 [`StegoError`] 的形式返回给调用方，引擎内部不做任何重试或恢复。

use std::string::FromUtf8Error;

use thiserror::Error;

/// 隐写引擎返回的结果类型。
pub type Result<T, E = StegoError> = std::result::Result<T, E>;

/// 编码、解码以及容量查询过程中可能出现的错误。
#[derive(Debug, Error)]
pub enum StegoError {
    /// 输入不是 PNG，无法识别格式，或采样深度不是 8 bit。
    #[error("unsupported image format: {detail}")]
    UnsupportedFormat { detail: String },

    /// 格式识别成功，但像素数据无法解码或重新编码。
    #[error("corrupt image data")]
    CorruptImage(#[source] image::ImageError),

    /// 待隐藏的消息为空。
    #[error("message is empty, nothing to hide")]
    EmptyMessage,

    /// 消息长度超出图像容量。
    #[error("message of {required} bytes exceeds image capacity of {available} bytes")]
    CapacityExceeded { required: usize, available: usize },

    /// 图像中的可用位数不足以容纳头部或头部声明的载荷。
    #[error(
        "frame requires {required_bits} bits but the image only carries {available_bits}"
    )]
    TruncatedStream {
        required_bits: usize,
        available_bits: usize,
    },

    /// 头部声明的长度不可能由编码器产生。
    #[error("declared payload length {declared} is not a valid frame length")]
    InvalidLength { declared: u32 },

    /// 恢复出的字节不是合法的 UTF-8 文本。
    #[error("recovered payload is not valid UTF-8 text")]
    InvalidEncoding(#[from] FromUtf8Error),
}

impl StegoError {
    pub(crate) fn unsupported(detail: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            detail: detail.into(),
        }
    }
}
