//! 语音播放状态.

use crate::params::NO_BUFFER;

/// 父语音的生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceState {
    /// 空闲, 可被分配
    #[default]
    Available,
    /// 正在播放
    Active,
    /// 收尾中 (已 key off, 等待输出排空)
    Finalizing,
    /// 卸载中
    Unloading,
}

/// 父语音信息, 由调度器维护, 模块只读
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoiceStatus {
    /// 当前状态
    pub state: VoiceState,
    /// 是否已 key off
    pub is_keyed_off: bool,
}

/// 每个语音的播放状态
///
/// 字段布局与客户机可见的状态块一致, 因此缓冲区索引仍用 `i32` 加 -1 标记.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackState {
    /// 当前缓冲区描述符索引, [`NO_BUFFER`] 表示播放结束
    pub current_buffer: i32,
    /// 当前缓冲区内的解码字节游标
    pub current_byte_position_in_buffer: u32,
    /// 当前缓冲区已完成的循环次数
    pub current_loop_count: i32,
    /// 累计生成采样数
    pub samples_generated_total: u32,
    /// key on 以来生成的采样数
    pub samples_generated_since_key_on: u32,
    /// key on 以来消耗的压缩字节数
    pub bytes_consumed_since_key_on: u32,
    /// 累计消耗的压缩字节数
    pub total_bytes_consumed: u32,
    /// 暂存区中尚未交付的采样数
    pub decoded_samples_pending: u32,
    /// 暂存区开头已交付, 等待压缩的采样数
    pub decoded_passed: u32,
}

impl PlaybackState {
    /// 是否已播放到链尾
    pub fn is_done(&self) -> bool {
        self.current_buffer == NO_BUFFER
    }

    /// 回到缓冲区 0 的开头
    pub fn rewind(&mut self) {
        self.current_buffer = 0;
        self.current_byte_position_in_buffer = 0;
        self.current_loop_count = 0;
    }

    /// 清零 key on 以来的统计
    pub fn reset_since_key_on(&mut self) {
        self.samples_generated_since_key_on = 0;
        self.bytes_consumed_since_key_on = 0;
    }

    /// 记录一个超帧的产出
    pub(crate) fn account_superframe(&mut self, samples: u32, bytes: u32) {
        self.samples_generated_total = self.samples_generated_total.wrapping_add(samples);
        self.samples_generated_since_key_on =
            self.samples_generated_since_key_on.wrapping_add(samples);
        self.bytes_consumed_since_key_on = self.bytes_consumed_since_key_on.wrapping_add(bytes);
        self.total_bytes_consumed = self.total_bytes_consumed.wrapping_add(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_计数器按32位回绕() {
        let mut state = PlaybackState {
            samples_generated_total: u32::MAX - 10,
            ..Default::default()
        };
        state.account_superframe(1024, 256);
        assert_eq!(state.samples_generated_total, 1013);
        assert_eq!(state.samples_generated_since_key_on, 1024);
        assert_eq!(state.bytes_consumed_since_key_on, 256);
        assert_eq!(state.total_bytes_consumed, 256);

        state.reset_since_key_on();
        assert_eq!(state.samples_generated_since_key_on, 0);
        assert_eq!(state.samples_generated_total, 1013);
    }

    #[test]
    fn test_回到起点() {
        let mut state = PlaybackState {
            current_buffer: NO_BUFFER,
            current_byte_position_in_buffer: 300,
            current_loop_count: 2,
            ..Default::default()
        };
        assert!(state.is_done());
        state.rewind();
        assert_eq!(state, PlaybackState::default());
    }
}
