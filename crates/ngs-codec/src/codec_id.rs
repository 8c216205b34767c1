//! 编解码器标识符.
//!
//! 为音频图可挂接的每种码流解码后端分配唯一标识.

use std::fmt;

/// 编解码器标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    /// 未知编解码器
    None,
    /// ATRAC9 (PS Vita / PS4 原生音频编码)
    Atrac9,
    /// PCM 有符号 16 位小端
    PcmS16le,
}

impl CodecId {
    /// 获取编解码器的人类可读名称
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Atrac9 => "atrac9",
            Self::PcmS16le => "pcm_s16le",
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
