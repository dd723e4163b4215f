/// 长度头部所占的位数。
/// 载荷长度以大端 `u32` 写入，每个可用通道样本承载 1 bit，
/// 因此头部固定占用 32 个通道样本。
pub const HEADER_BITS: usize = u32::BITS as usize;

/// 每个像素中可用于隐写的通道数 (R, G, B)。Alpha 通道永远不参与隐写。
pub const ELIGIBLE_CHANNELS: usize = 3;

/// 单个字节的位数，载荷按最高位优先逐位写入。
pub const BITS_PER_BYTE: usize = 8;

/// 长度头部能够表示的最大载荷字节数。
pub const MAX_PAYLOAD_LEN: usize = u32::MAX as usize;

/// 未指定输出路径时，隐写结果图像文件名的前缀。
pub const HIDDEN_IMAGE_PREFIX: &str = "doctored_";

/// 未指定输出路径时，恢复文本文件名的前缀。
pub const RECOVERED_TEXT_PREFIX: &str = "recovered_";

/// 隐写结果始终以 PNG 格式输出。
pub const OUTPUT_IMAGE_EXTENSION: &str = "png";

/// 恢复文本的默认扩展名。
pub const RECOVERED_TEXT_EXTENSION: &str = "txt";
