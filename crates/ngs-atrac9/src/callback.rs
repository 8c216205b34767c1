//! 语音回调通知.
//!
//! 回调在两把锁都已释放的窗口内同步投递, 回调实现可以重入调度器 (例如排入新缓冲区).

use std::fmt;

/// 回调事件类型, 数值与客户机侧常量一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CallbackEvent {
    /// 缓冲区链播放完毕
    EndOfData = 0,
    /// 切换到下一个缓冲区 (同一缓冲区循环时也会触发)
    SwappedBuffer = 1,
    /// 码流头错误 (保留, 当前不会触发)
    HeaderError = 2,
    /// 解码失败
    DecodeError = 3,
    /// 当前缓冲区完成一次循环
    LoopedBuffer = 4,
}

impl CallbackEvent {
    /// 客户机侧的事件码
    pub const fn code(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for CallbackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EndOfData => "end_of_data",
            Self::SwappedBuffer => "swapped_buffer",
            Self::HeaderError => "header_error",
            Self::DecodeError => "decode_error",
            Self::LoopedBuffer => "looped_buffer",
        };
        write!(f, "{name}")
    }
}

/// 一次待投递的通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    /// 事件类型
    pub event: CallbackEvent,
    /// 事件参数 (循环次数或字节游标)
    pub param: u32,
    /// 相关缓冲区的客户机地址, 无则为 0
    pub address: u32,
}

/// 语音回调投递接口
pub trait VoiceCallback {
    /// 同步投递一次通知
    fn invoke(&self, event: CallbackEvent, param: u32, address: u32);
}

impl<F> VoiceCallback for F
where
    F: Fn(CallbackEvent, u32, u32),
{
    fn invoke(&self, event: CallbackEvent, param: u32, address: u32) {
        self(event, param, address)
    }
}
