//! 语音锁保护的模块私有数据.

use std::ops::Range;

use crate::params::Parameters;
use crate::state::{PlaybackState, VoiceStatus};
use crate::storage::StagingBuffer;

/// 单个语音上 ATRAC9 模块的数据
///
/// 整体放在语音锁之内; 参数块由客户机在回调窗口中改写, 每次重新获取锁后都要重新读取.
#[derive(Debug, Clone, Default)]
pub struct ModuleData {
    /// 客户机参数
    pub parameters: Parameters,
    /// 播放状态
    pub state: PlaybackState,
    /// PCM 暂存区
    pub extra_storage: StagingBuffer,
    /// 父语音信息
    pub voice: VoiceStatus,
    /// 本 tick 交付给下游的暂存区字节区间
    product: Option<Range<usize>>,
}

impl ModuleData {
    /// 以给定参数创建
    pub fn new(parameters: Parameters) -> Self {
        Self {
            parameters,
            ..Default::default()
        }
    }

    /// 本 tick 的输出 (立体声 F32 交错), 未产出时为 None
    pub fn product(&self) -> Option<&[u8]> {
        self.product
            .clone()
            .and_then(|range| self.extra_storage.as_bytes().get(range))
    }

    pub(crate) fn set_product(&mut self, start_sample: u32, samples: u32) {
        self.product = Some(StagingBuffer::sample_range(start_sample, samples));
    }

    pub(crate) fn clear_product(&mut self) {
        self.product = None;
    }

    /// 暂存区不足一个 tick 时以静音补齐
    pub fn fill_to_fit_granularity(&mut self, granularity: u32) {
        self.extra_storage.pad_to(granularity);
    }
}
