//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用隐写引擎以及向用户报告结果；引擎本身不接触文件系统。

use crate::cli::{CapacityArgs, HideArgs, RecoverArgs};
use crate::constants::{
    HIDDEN_IMAGE_PREFIX, OUTPUT_IMAGE_EXTENSION, RECOVERED_TEXT_EXTENSION,
    RECOVERED_TEXT_PREFIX,
};
use crate::steganography::{Stego, decode_message, encode_message, try_get_capacity};
use anyhow::{Context, Result};
use colored::Colorize;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和文本、检查隐写空间是否足够、调用隐写引擎嵌入消息，
/// 最后将结果写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像或文本文件，或文本不是 UTF-8。
/// * 目标文件已存在且未指定 `--force`。
/// * 输入图像不是可接受的 PNG，或没有足够的空间来隐藏文本。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let picture = fs::read(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let text = match (&args.text, args.message) {
        (Some(path), _) => fs::read_to_string(path).with_context(|| {
            format!(
                "Unable to read text file as UTF-8: {}",
                path.to_string_lossy().red().bold()
            )
        })?,
        (None, Some(message)) => message,
        (None, None) => anyhow::bail!("Either a text file or a message must be provided."),
    };

    anyhow::ensure!(!text.is_empty(), "Nothing to hide: the text is empty.");

    let dest = args.dest.unwrap_or_else(|| {
        default_output(&args.image, HIDDEN_IMAGE_PREFIX, OUTPUT_IMAGE_EXTENSION)
    });
    ensure_writable(&dest, args.force)?;

    let available_space = try_get_capacity(&picture).with_context(|| {
        format!(
            "Unable to use '{}' as a carrier. \nOnly lossless PNG images are supported.",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    let required_space = text.len();

    anyhow::ensure!(
        available_space >= required_space,
        "Not enough space in the image to hide the text. \nRequired: {}, Available: {}",
        required_space.to_string().red().bold(),
        available_space.to_string().green().bold()
    );

    let hidden = encode_message(&picture, &text)
        .with_context(|| "Failed to hide the text in the image.")?;
    info!(
        "embedded {required_space} of {available_space} available bytes into {}",
        dest.display()
    );

    fs::write(&dest, hidden).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、调用隐写引擎恢复文本，
/// 最后将恢复的文本内容写入目标文本文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件。
/// * 目标文件已存在且未指定 `--force`。
/// * 图像中没有可恢复的消息，或图像在隐写后被修改过。
/// * 无法写入到目标文本文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let picture = fs::read(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let dest = args.text.unwrap_or_else(|| {
        default_output(&args.image, RECOVERED_TEXT_PREFIX, RECOVERED_TEXT_EXTENSION)
    });
    ensure_writable(&dest, args.force)?;

    let text = decode_message(&picture).with_context(|| {
        format!(
            "Failed to recover text from '{}'. \nThe image may not contain a hidden message or is corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    info!("recovered {} bytes from {}", text.len(), args.image.display());

    fs::write(&dest, text).with_context(|| {
        format!(
            "Unable to write to target text file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully recovered and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Capacity' 命令的执行逻辑，打印图像尺寸以及最多能隐藏的字节数。
///
/// # Errors
///
/// 图像无法读取，或不是可接受的 PNG 时返回错误。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let picture = fs::read(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let carrier = Stego::from_bytes(&picture).with_context(|| {
        format!(
            "Unable to compute capacity of '{}'. \nOnly lossless PNG images are supported.",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    let (width, height) = carrier.dimensions();

    println!(
        "Image capacity: {} bytes ({}x{} pixels)",
        carrier.capacity().to_string().green().bold(),
        width,
        height
    );
    Ok(())
}

/// 在输入文件旁生成默认输出路径：`<prefix><stem>.<extension>`。
fn default_output(input: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    input.with_file_name(format!("{prefix}{stem}.{extension}"))
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}
