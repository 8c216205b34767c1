//! # NGS
//!
//! 纯 Rust 实现的 NGS 音频图 ATRAC9 语音引擎.
//!
//! - **缓冲区几何**: 按采样区间计算 ATRAC9 压缩数据的字节跨度
//! - **语音播放**: 至多 4 个缓冲区组成的循环/切换链, 增量解码为立体声 F32
//! - **回调通知**: 缓冲区切换、循环、解码失败、数据耗尽
//!
//! 码流解码后端由宿主通过 [`codec::CodecRegistry`] 注册, 本 crate 不内置.
//!
//! # 快速开始
//!
//! ```rust
//! use ngs::codec::parsers::atrac9::Atrac9Config;
//!
//! // 48 kHz 立体声, 256 字节帧, 每超帧 4 帧
//! let config = Atrac9Config::from_word(0x001F_74FE | (7 << 29) | (2 << 27));
//! assert_eq!(config.bytes_per_superframe(), 1024);
//! assert_eq!(config.samples_per_superframe(), 1024);
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `ngs-core` | 错误类型、采样格式、客户机内存、两级锁交接 |
//! | `ngs-codec` | 解码后端抽象、注册表、ATRAC9 配置字解析 |
//! | `ngs-resample` | 采样格式与声道转换 |
//! | `ngs-atrac9` | ATRAC9 播放模块 |

/// 核心类型与工具
pub use ngs_core as core;

/// 解码后端抽象与 ATRAC9 几何计算
pub use ngs_codec as codec;

/// 采样格式与声道转换
pub use ngs_resample as resample;

/// ATRAC9 播放模块
pub use ngs_atrac9 as atrac9;

pub mod logging;

/// 获取版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
