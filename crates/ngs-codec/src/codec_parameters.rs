//! 编解码器参数.
//!
//! 打开解码后端时传入的配置. ATRAC9 的 32 位配置字以小端字节序放在 `extra_data` 中.

use ngs_core::{ChannelLayout, SampleFormat};

use crate::codec_id::CodecId;

/// 编解码器参数
#[derive(Debug, Clone)]
pub struct CodecParameters {
    /// 编解码器标识
    pub codec_id: CodecId,
    /// 额外数据 (ATRAC9: 4 字节配置字)
    pub extra_data: Vec<u8>,
    /// 音频参数
    pub audio: AudioCodecParams,
}

/// 音频编解码器参数
#[derive(Debug, Clone)]
pub struct AudioCodecParams {
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 声道布局
    pub channel_layout: ChannelLayout,
    /// 输出采样格式
    pub sample_format: SampleFormat,
    /// 每帧采样数 (0 表示可变)
    pub frame_size: u32,
}

impl CodecParameters {
    /// 从 `extra_data` 读取 32 位小端配置字
    pub fn config_word(&self) -> Option<u32> {
        let bytes: [u8; 4] = self.extra_data.get(..4)?.try_into().ok()?;
        Some(u32::from_le_bytes(bytes))
    }
}
