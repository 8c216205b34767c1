//! ngs-probe - ATRAC9 配置字探测工具
//!
//! 解析 32 位 ATRAC9 配置字的各个字段, 并计算指定采样区间需要读取的压缩字节跨度.

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use serde::Serialize;

use ngs::logging::{self, LoggingConfig};
use ngs_codec::parsers::atrac9::{Atrac9Config, SkipBufferInfo};

/// ATRAC9 配置字探测工具
#[derive(Parser, Debug)]
#[command(name = "ngs-probe", version, about = "ATRAC9 配置字与缓冲区跨度探测工具")]
struct Cli {
    /// 配置字 (十进制或 0x 前缀十六进制)
    #[arg(value_parser = parse_word)]
    config_word: u32,

    /// 区间起始采样
    #[arg(long, default_value_t = 0)]
    start: u32,

    /// 区间采样数 (默认一个超帧)
    #[arg(long)]
    count: Option<u32>,

    /// 输出 JSON 格式
    #[arg(long)]
    json: bool,

    /// 日志详细程度 (-v/-vv/-vvv)
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ============================================================
// JSON 输出结构体
// ============================================================

/// 完整探测结果
#[derive(Serialize, Debug)]
struct ProbeOutput {
    config: ConfigInfo,
    span: SpanInfo,
}

/// 配置字字段
#[derive(Serialize, Debug)]
struct ConfigInfo {
    word: String,
    sample_rate_index: u8,
    sample_rate: u32,
    channel_config_index: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel_layout: Option<String>,
    frame_bytes: u32,
    samples_per_frame: u32,
    frames_per_superframe: u32,
    bytes_per_superframe: u32,
    samples_per_superframe: u32,
}

/// 采样区间对应的缓冲区跨度
#[derive(Serialize, Debug)]
struct SpanInfo {
    start_sample: u32,
    num_samples: u32,
    num_bytes: u32,
    is_super_packet: bool,
    start_byte_offset: u32,
    start_skip: u32,
    end_skip: u32,
}

fn parse_word(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("无效配置字 '{s}': {e}"))
}

fn build_output(word: u32, start: u32, count: Option<u32>) -> ProbeOutput {
    let config = Atrac9Config::from_word(word);
    let num_samples = count.unwrap_or_else(|| config.samples_per_superframe());
    let span: SkipBufferInfo = config.skip_buffer_info(start, num_samples);
    let layout = config.channel_layout().ok();

    ProbeOutput {
        config: ConfigInfo {
            word: format!("{word:#010x}"),
            sample_rate_index: config.sample_rate_index(),
            sample_rate: config.sample_rate(),
            channel_config_index: config.channel_config_index(),
            channels: config.channel_count(),
            channel_layout: layout.map(|l| l.to_string()),
            frame_bytes: config.frame_bytes(),
            samples_per_frame: config.samples_per_frame(),
            frames_per_superframe: config.frames_per_superframe(),
            bytes_per_superframe: config.bytes_per_superframe(),
            samples_per_superframe: config.samples_per_superframe(),
        },
        span: SpanInfo {
            start_sample: start,
            num_samples,
            num_bytes: span.num_bytes,
            is_super_packet: span.is_super_packet,
            start_byte_offset: span.start_byte_offset,
            start_skip: span.start_skip,
            end_skip: span.end_skip,
        },
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    logging::init(LoggingConfig {
        level: level.to_string(),
        file_prefix: "ngs-probe".to_string(),
        ..Default::default()
    })?;
    debug!("ngs-probe {} 参数: {cli:?}", ngs::version());

    let output = build_output(cli.config_word, cli.start, cli.count);
    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("序列化探测结果失败")?;
        println!("{json}");
    } else {
        print_config_text(&output.config);
        print_span_text(&output.span);
    }
    Ok(())
}

/// 文本输出: 配置字字段
fn print_config_text(info: &ConfigInfo) {
    println!("[CONFIG]");
    println!("  配置字       : {}", info.word);
    println!(
        "  采样率       : {} Hz (索引 {})",
        info.sample_rate, info.sample_rate_index
    );
    match (info.channels, &info.channel_layout) {
        (Some(ch), Some(layout)) => println!(
            "  声道         : {ch} ({layout}, 索引 {})",
            info.channel_config_index
        ),
        _ => println!("  声道         : 保留索引 {}", info.channel_config_index),
    }
    println!("  帧字节数     : {}", info.frame_bytes);
    println!("  每帧采样数   : {}", info.samples_per_frame);
    println!(
        "  超帧         : {} 帧, {} 字节, {} 采样",
        info.frames_per_superframe, info.bytes_per_superframe, info.samples_per_superframe
    );
    println!("[/CONFIG]");
    println!();
}

/// 文本输出: 缓冲区跨度
fn print_span_text(span: &SpanInfo) {
    println!("[SPAN]");
    println!(
        "  采样区间     : [{}, +{})",
        span.start_sample, span.num_samples
    );
    println!("  起始字节偏移 : {}", span.start_byte_offset);
    println!("  字节数       : {}", span.num_bytes);
    println!("  超帧格式     : {}", span.is_super_packet);
    println!("  前导丢弃     : {}", span.start_skip);
    println!("  尾部丢弃     : {}", span.end_skip);
    println!("[/SPAN]");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_解析十进制与十六进制配置字() {
        assert_eq!(parse_word("0x001F_74FE"), Ok(0x001F_74FE));
        assert_eq!(parse_word("0XFF"), Ok(255));
        assert_eq!(parse_word("2062590"), Ok(2_062_590));
        assert!(parse_word("0xZZ").is_err());
        assert!(parse_word("").is_err());
    }

    #[test]
    fn test_默认区间为一个超帧() {
        let word = 0x001F_74FE | (7 << 29) | (2 << 27);
        let output = build_output(word, 0, None);
        assert_eq!(output.config.bytes_per_superframe, 1024);
        assert_eq!(output.span.num_samples, 1024);
        assert_eq!(output.span.num_bytes, 1024);
        assert_eq!(output.span.end_skip, 0);
        assert_eq!(output.config.channel_layout.as_deref(), Some("stereo"));
    }

    #[test]
    fn test_命令行参数() {
        let cli = Cli::try_parse_from(["ngs-probe", "0x1000", "--start", "10", "--json", "-vv"])
            .unwrap();
        assert_eq!(cli.config_word, 0x1000);
        assert_eq!(cli.start, 10);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.count, None);
    }
}
