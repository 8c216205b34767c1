//! 语音参数块.
//!
//! 客户机通过固定 96 字节的参数块配置 ATRAC9 语音 (全部小端):
//!
//! | 偏移 | 字段 |
//! |------|------|
//! | 0 | 描述符 id (u32), 块大小 (u32) |
//! | 8 | 4 个缓冲区描述符, 每个 16 字节 |
//! | 72 | 播放频率 (f32), 播放倍率 (f32) |
//! | 80 | 前导采样数 (i32), 播放采样上限 (i32) |
//! | 88 | 声道数 (i8), 声道映射 (2 x i8), 保留 (i8) |
//! | 92 | ATRAC9 配置字 (u32) |
//!
//! 缓冲区描述符:
//!
//! | 偏移 | 字段 |
//! |------|------|
//! | 0 | 客户机地址 (u32) |
//! | 4 | 字节数 (i32) |
//! | 8 | 循环次数 (i16), -1 表示无限循环 |
//! | 10 | 下一缓冲区索引 (i16), -1 表示链尾 |
//! | 12 | 起始丢弃采样数 (i16) |
//! | 14 | 结束丢弃采样数 (i16) |

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use ngs_core::{NgsError, NgsResult};

/// 每个语音的缓冲区描述符数量
pub const MAX_BUFFER_PARAMS: usize = 4;

/// 参数块大小 (字节)
pub const PARAMETER_BLOCK_SIZE: usize = 96;

/// 链尾 / 播放结束标记
pub const NO_BUFFER: i32 = -1;

/// 无限循环标记
pub const LOOP_FOREVER: i16 = -1;

/// 缓冲区描述符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferParameters {
    /// 压缩数据的客户机地址, 0 表示未设置
    pub address: u32,
    /// 压缩数据字节数
    pub bytes_count: i32,
    /// 循环次数, [`LOOP_FOREVER`] 表示无限循环
    pub loop_count: i16,
    /// 播放完毕后切换到的描述符索引, [`NO_BUFFER`] 表示链尾
    pub next_buffer_index: i16,
    /// 缓冲区开头需要丢弃的采样数
    pub samples_discard_start_off: i16,
    /// 缓冲区结尾需要丢弃的采样数
    pub samples_discard_end_off: i16,
}

impl BufferParameters {
    /// 字节数, 负值视为 0
    pub fn byte_len(&self) -> u32 {
        self.bytes_count.max(0) as u32
    }

    /// 起始丢弃采样数, 负值视为 0
    pub fn discard_start(&self) -> u32 {
        self.samples_discard_start_off.max(0) as u32
    }

    /// 结束丢弃采样数, 负值视为 0
    pub fn discard_end(&self) -> u32 {
        self.samples_discard_end_off.max(0) as u32
    }

    fn read_from(rd: &mut impl Read) -> std::io::Result<Self> {
        Ok(Self {
            address: rd.read_u32::<LittleEndian>()?,
            bytes_count: rd.read_i32::<LittleEndian>()?,
            loop_count: rd.read_i16::<LittleEndian>()?,
            next_buffer_index: rd.read_i16::<LittleEndian>()?,
            samples_discard_start_off: rd.read_i16::<LittleEndian>()?,
            samples_discard_end_off: rd.read_i16::<LittleEndian>()?,
        })
    }

    fn write_to(&self, wr: &mut impl Write) -> std::io::Result<()> {
        wr.write_u32::<LittleEndian>(self.address)?;
        wr.write_i32::<LittleEndian>(self.bytes_count)?;
        wr.write_i16::<LittleEndian>(self.loop_count)?;
        wr.write_i16::<LittleEndian>(self.next_buffer_index)?;
        wr.write_i16::<LittleEndian>(self.samples_discard_start_off)?;
        wr.write_i16::<LittleEndian>(self.samples_discard_end_off)
    }
}

/// ATRAC9 语音参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    /// 参数块描述符 id
    pub descriptor_id: u32,
    /// 参数块大小
    pub descriptor_size: u32,
    /// 缓冲区描述符
    pub buffer_params: [BufferParameters; MAX_BUFFER_PARAMS],
    /// 播放频率 (Hz), 只支持 48000
    pub playback_frequency: f32,
    /// 播放倍率, 只支持 1.0
    pub playback_scalar: f32,
    /// 前导采样数
    pub lead_in_samples: i32,
    /// 播放采样上限
    pub limit_number_of_samples_played: i32,
    /// 声道数
    pub channels: i8,
    /// 声道映射
    pub channel_map: [i8; 2],
    /// ATRAC9 配置字
    pub config_data: u32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            descriptor_id: 0,
            descriptor_size: PARAMETER_BLOCK_SIZE as u32,
            buffer_params: [BufferParameters::default(); MAX_BUFFER_PARAMS],
            playback_frequency: 48000.0,
            playback_scalar: 1.0,
            lead_in_samples: 0,
            limit_number_of_samples_played: 0,
            channels: 2,
            channel_map: [0, 1],
            config_data: 0,
        }
    }
}

impl Parameters {
    /// 按索引取缓冲区描述符, 负数或越界返回 None
    pub fn buffer(&self, index: i32) -> Option<&BufferParameters> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.buffer_params.get(i))
    }

    /// 播放频率与倍率是否为受支持的原速 48 kHz
    pub fn is_native_rate(&self) -> bool {
        self.playback_frequency == 48000.0 && self.playback_scalar == 1.0
    }

    /// 从客户机参数块解析
    pub fn from_bytes(bytes: &[u8]) -> NgsResult<Self> {
        if bytes.len() < PARAMETER_BLOCK_SIZE {
            return Err(NgsError::InvalidData(format!(
                "参数块过短: 需要 {PARAMETER_BLOCK_SIZE} 字节, 实际 {} 字节",
                bytes.len()
            )));
        }
        Self::read_from(&mut &bytes[..PARAMETER_BLOCK_SIZE])
            .map_err(|e| NgsError::InvalidData(format!("参数块解析失败: {e}")))
    }

    /// 序列化为客户机参数块
    pub fn to_bytes(&self) -> [u8; PARAMETER_BLOCK_SIZE] {
        let mut out = [0u8; PARAMETER_BLOCK_SIZE];
        // 定长缓冲区恰好容纳全部字段, 写入不会失败
        let _ = self.write_to(&mut &mut out[..]);
        out
    }

    fn read_from(rd: &mut impl Read) -> std::io::Result<Self> {
        let descriptor_id = rd.read_u32::<LittleEndian>()?;
        let descriptor_size = rd.read_u32::<LittleEndian>()?;
        let mut buffer_params = [BufferParameters::default(); MAX_BUFFER_PARAMS];
        for slot in &mut buffer_params {
            *slot = BufferParameters::read_from(rd)?;
        }
        let playback_frequency = rd.read_f32::<LittleEndian>()?;
        let playback_scalar = rd.read_f32::<LittleEndian>()?;
        let lead_in_samples = rd.read_i32::<LittleEndian>()?;
        let limit_number_of_samples_played = rd.read_i32::<LittleEndian>()?;
        let channels = rd.read_i8()?;
        let channel_map = [rd.read_i8()?, rd.read_i8()?];
        let _reserved = rd.read_i8()?;
        let config_data = rd.read_u32::<LittleEndian>()?;
        Ok(Self {
            descriptor_id,
            descriptor_size,
            buffer_params,
            playback_frequency,
            playback_scalar,
            lead_in_samples,
            limit_number_of_samples_played,
            channels,
            channel_map,
            config_data,
        })
    }

    fn write_to(&self, wr: &mut impl Write) -> std::io::Result<()> {
        wr.write_u32::<LittleEndian>(self.descriptor_id)?;
        wr.write_u32::<LittleEndian>(self.descriptor_size)?;
        for buffer in &self.buffer_params {
            buffer.write_to(wr)?;
        }
        wr.write_f32::<LittleEndian>(self.playback_frequency)?;
        wr.write_f32::<LittleEndian>(self.playback_scalar)?;
        wr.write_i32::<LittleEndian>(self.lead_in_samples)?;
        wr.write_i32::<LittleEndian>(self.limit_number_of_samples_played)?;
        wr.write_i8(self.channels)?;
        wr.write_i8(self.channel_map[0])?;
        wr.write_i8(self.channel_map[1])?;
        wr.write_i8(0)?;
        wr.write_u32::<LittleEndian>(self.config_data)
    }
}
