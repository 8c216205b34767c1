//! 解码器 trait 定义.
//!
//! 码流解码后端 (如 ATRAC9) 对音频图而言是黑盒, 只通过 `Decoder` trait 交互.

use ngs_core::NgsResult;

use crate::codec_id::CodecId;
use crate::codec_parameters::CodecParameters;
use crate::frame::AudioFrame;
use crate::packet::Packet;

/// 解码器 trait
///
/// 解码流程:
/// 1. 调用 `open()` 提供配置 (ATRAC9 配置字在 `extra_data` 中)
/// 2. 调用 `send_packet()` 送入一帧压缩数据
/// 3. 调用 `receive_frame()` 取出解码后的 S16 交错 PCM
/// 4. 码流出错后调用 `flush()` 清空内部上下文
pub trait Decoder: Send {
    /// 获取解码器标识
    fn codec_id(&self) -> CodecId;

    /// 获取解码器名称
    fn name(&self) -> &str;

    /// 使用参数配置解码器
    fn open(&mut self, _params: &CodecParameters) -> NgsResult<()> {
        Ok(())
    }

    /// 送入一个压缩数据包进行解码
    ///
    /// # 返回
    /// - `Ok(())`: 数据包已接受
    /// - `Err(NgsError::InvalidData)`: 码流损坏, 解码器拒绝该帧
    fn send_packet(&mut self, packet: &Packet) -> NgsResult<()>;

    /// 从解码器取出一帧解码数据
    ///
    /// # 返回
    /// - `Ok(frame)`: 成功取出一帧
    /// - `Err(NgsError::NeedMoreData)`: 需要送入更多数据包
    fn receive_frame(&mut self) -> NgsResult<AudioFrame>;

    /// 刷新解码器, 清空内部状态
    fn flush(&mut self);
}
