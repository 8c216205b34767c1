//! 音频采样格式定义.
//!
//! NGS 音频图内部只流通交错格式: 解码器输出 S16, 图中各模块之间传递 F32.

use std::fmt;

/// 音频采样格式 (交错排列, LRLRLR...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SampleFormat {
    /// 未指定
    None,
    /// 有符号 16 位整数
    S16,
    /// 有符号 32 位整数
    S32,
    /// 32 位浮点
    F32,
}

impl SampleFormat {
    /// 每个采样点占用的字节数
    pub const fn bytes_per_sample(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::S16 => 2,
            Self::S32 | Self::F32 => 4,
        }
    }

    /// 一个采样帧 (所有声道各一个采样点) 的字节数
    pub const fn frame_stride(&self, channels: u32) -> usize {
        self.bytes_per_sample() as usize * channels as usize
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::S16 => "s16",
            Self::S32 => "s32",
            Self::F32 => "flt",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_立体声浮点帧步长() {
        assert_eq!(SampleFormat::F32.frame_stride(2), 8);
        assert_eq!(SampleFormat::S16.frame_stride(1), 2);
        assert_eq!(SampleFormat::None.frame_stride(2), 0);
    }
}
