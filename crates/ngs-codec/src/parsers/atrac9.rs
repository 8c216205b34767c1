//! ATRAC9 配置字解析与缓冲区几何计算.
//!
//! 32 位配置字 (小端) 的位布局:
//!
//! | 位 | 含义 |
//! |----|------|
//! | [0:7] | 同步字节 (0xFE), 不校验 |
//! | [9:11] | 声道配置索引 (几何计算不使用) |
//! | [12:15] | 采样率索引 |
//! | [16:23] | 帧字节数 - 1 的高 8 位 |
//! | [27:28] | 超帧索引, 每超帧 `1 << idx` 帧 |
//! | [29:31] | 帧字节数 - 1 的低 3 位 |
//!
//! 按采样区间寻址缓冲区的调用方依赖这里逐位一致的结果.

use ngs_core::{ChannelLayout, NgsError, NgsResult};

/// 采样率索引 -> 每帧采样数的 2 的幂次
pub const FRAME_SAMPLE_POWER: [u8; 16] = [6, 6, 7, 7, 7, 8, 8, 8, 6, 6, 7, 7, 7, 8, 8, 8];

/// 采样率索引 -> 采样率 (Hz)
pub const SAMPLE_RATES: [u32; 16] = [
    11025, 12000, 16000, 22050, 24000, 32000, 44100, 48000, 44100, 48000, 64000, 88200, 96000,
    128000, 176400, 192000,
];

/// 声道配置索引 -> 声道数
const CHANNEL_COUNTS: [u32; 6] = [1, 2, 2, 6, 8, 4];

/// 按采样区间计算出的缓冲区跨度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SkipBufferInfo {
    /// 覆盖区间所需的压缩字节数
    pub num_bytes: u32,
    /// 是否为真正的超帧格式 (每超帧多于 1 帧)
    pub is_super_packet: bool,
    /// 跨度起始字节偏移
    pub start_byte_offset: u32,
    /// 首个超帧内需要丢弃的前导采样数
    pub start_skip: u32,
    /// 末个超帧内需要丢弃的尾部采样数
    pub end_skip: u32,
}

/// 解析后的 ATRAC9 配置字
///
/// 只做位提取, 不做合法性校验; 声道数等需要查表的字段通过方法按需给出.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atrac9Config {
    raw: u32,
    sample_rate_index: u8,
    channel_config_index: u8,
    frame_bytes: u16,
    superframe_index: u8,
}

impl Atrac9Config {
    /// 从 32 位配置字提取各字段
    pub const fn from_word(word: u32) -> Self {
        let sample_rate_index = ((word >> 12) & 0b1111) as u8;
        let channel_config_index = ((word >> 9) & 0b111) as u8;
        let frame_bytes = ((((word >> 16) & 0xFF) << 3) | ((word >> 29) & 0b111)) as u16 + 1;
        let superframe_index = ((word >> 27) & 0b11) as u8;
        Self {
            raw: word,
            sample_rate_index,
            channel_config_index,
            frame_bytes,
            superframe_index,
        }
    }

    /// 原始配置字
    pub const fn raw(&self) -> u32 {
        self.raw
    }

    /// 采样率索引
    pub const fn sample_rate_index(&self) -> u8 {
        self.sample_rate_index
    }

    /// 声道配置索引
    pub const fn channel_config_index(&self) -> u8 {
        self.channel_config_index
    }

    /// 超帧索引
    pub const fn superframe_index(&self) -> u8 {
        self.superframe_index
    }

    /// 单帧压缩字节数
    pub const fn frame_bytes(&self) -> u32 {
        self.frame_bytes as u32
    }

    /// 每帧采样数
    pub const fn samples_per_frame(&self) -> u32 {
        1 << FRAME_SAMPLE_POWER[self.sample_rate_index as usize]
    }

    /// 每超帧帧数
    pub const fn frames_per_superframe(&self) -> u32 {
        1 << self.superframe_index
    }

    /// 每超帧压缩字节数
    pub const fn bytes_per_superframe(&self) -> u32 {
        self.frame_bytes() * self.frames_per_superframe()
    }

    /// 每超帧采样数
    pub const fn samples_per_superframe(&self) -> u32 {
        self.samples_per_frame() * self.frames_per_superframe()
    }

    /// 采样率 (Hz)
    pub const fn sample_rate(&self) -> u32 {
        SAMPLE_RATES[self.sample_rate_index as usize]
    }

    /// 声道数, 保留索引返回 None
    pub fn channel_count(&self) -> Option<u32> {
        CHANNEL_COUNTS
            .get(self.channel_config_index as usize)
            .copied()
    }

    /// 声道布局
    pub fn channel_layout(&self) -> NgsResult<ChannelLayout> {
        self.channel_count()
            .map(ChannelLayout::from_channels)
            .ok_or_else(|| {
                NgsError::InvalidData(format!(
                    "ATRAC9 配置字 {:#010x} 的声道配置索引 {} 无效",
                    self.raw, self.channel_config_index
                ))
            })
    }

    /// 计算覆盖采样区间 `[start_sample, start_sample + num_samples)` 的缓冲区跨度
    ///
    /// 算术按 32 位回绕, 与客户机侧的计算保持一致.
    pub const fn skip_buffer_info(&self, start_sample: u32, num_samples: u32) -> SkipBufferInfo {
        let samples_per_superframe = self.samples_per_superframe();
        let bytes_per_superframe = self.bytes_per_superframe();

        let end_sample = start_sample.wrapping_add(num_samples);
        let start_superframe = start_sample / samples_per_superframe;
        let num_superframes = (end_sample.wrapping_add(samples_per_superframe - 1)
            / samples_per_superframe)
            .wrapping_sub(start_superframe);

        SkipBufferInfo {
            num_bytes: num_superframes.wrapping_mul(bytes_per_superframe),
            is_super_packet: self.frames_per_superframe() != 1,
            start_byte_offset: start_superframe.wrapping_mul(bytes_per_superframe),
            start_skip: start_sample - start_superframe * samples_per_superframe,
            end_skip: (start_superframe.wrapping_add(num_superframes))
                .wrapping_mul(samples_per_superframe)
                .wrapping_sub(end_sample),
        }
    }
}

/// 计算覆盖采样区间所需的缓冲区跨度
///
/// 纯函数, 结果只取决于 `(start_sample, num_samples, info)`.
pub fn get_buffer_parameter(start_sample: u32, num_samples: u32, info: u32) -> SkipBufferInfo {
    Atrac9Config::from_word(info).skip_buffer_info(start_sample, num_samples)
}
