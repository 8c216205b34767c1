//! ATRAC9 播放模块: 缓冲区链排序与增量解码.
//!
//! 每个 tick 调度器持有 调度锁 -> 语音锁 调用 [`Atrac9Module::process`],
//! 模块反复调用解码泵直到暂存区攒够一个粒度的采样, 或者数据耗尽.
//!
//! 回调一律在两把锁都释放的窗口中投递: 先在锁内算好状态转移和要发出的通知,
//! 解锁后只做投递, 重新上锁后再读取参数 (客户机可能在回调中改写了描述符).

use log::{debug, error, warn};
use ngs_codec::{CodecId, CodecRegistry, DecoderFactory};
use ngs_core::{GuestMemory, NgsError, NgsResult, VoiceLocks};

use crate::binding::{Atrac9DecoderState, DecoderQuery};
use crate::callback::{CallbackEvent, Notification, VoiceCallback};
use crate::data::ModuleData;
use crate::params::{LOOP_FOREVER, MAX_BUFFER_PARAMS, NO_BUFFER, PARAMETER_BLOCK_SIZE};
use crate::state::VoiceState;
use crate::storage::{FRAME_STRIDE, StagingBuffer};

/// 一次 tick 处理所需的宿主环境
pub struct ProcessContext<'a> {
    /// 客户机内存
    pub memory: &'a dyn GuestMemory,
    /// 回调投递
    pub callback: &'a dyn VoiceCallback,
    /// 每个 tick 交付的采样数
    pub granularity: u32,
}

/// 解码泵单次调用的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpOutcome {
    /// 解码了一个超帧
    Progress,
    /// 处理了缓冲区边界, 需要再调用一次
    Retry,
    /// 没有更多可解码的数据
    Finished,
}

/// 一次 tick 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// 没有可播放的缓冲区, 未产出
    Idle,
    /// 交付了一个粒度的采样, 语音继续播放
    Continue,
    /// 数据耗尽, 交付了剩余采样 (不足部分补静音)
    Finished,
}

impl TickOutcome {
    /// 语音是否应停止调度
    pub fn is_finished(self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// ATRAC9 播放模块
///
/// 每个语音一个实例. 解码绑定懒创建, 配置字变化时重建.
pub struct Atrac9Module {
    factory: DecoderFactory,
    decoder: Option<Atrac9DecoderState>,
    last_config: u32,
    rate_warned: bool,
    misalignment_reported: bool,
}

impl Atrac9Module {
    /// 从注册表查找 ATRAC9 解码后端并创建模块
    pub fn new(registry: &CodecRegistry) -> NgsResult<Self> {
        Ok(Self::with_factory(registry.decoder_factory(CodecId::Atrac9)?))
    }

    /// 使用指定的解码后端工厂创建模块
    pub fn with_factory(factory: DecoderFactory) -> Self {
        Self {
            factory,
            decoder: None,
            last_config: 0,
            rate_warned: false,
            misalignment_reported: false,
        }
    }

    /// 客户机参数块大小
    pub fn buffer_parameter_size(&self) -> usize {
        PARAMETER_BLOCK_SIZE
    }

    /// 当前解码绑定
    pub fn decoder(&self) -> Option<&Atrac9DecoderState> {
        self.decoder.as_ref()
    }

    /// 父语音状态变化时调用 (调用方已持有语音锁)
    pub fn on_state_change(&mut self, data: &mut ModuleData, previous: VoiceState) {
        debug!("ATRAC9 语音状态变化: {previous:?} -> {:?}", data.voice.state);
        if data.voice.state == VoiceState::Available {
            data.state.rewind();
            data.state.decoded_samples_pending = 0;
            data.state.decoded_passed = 0;
            data.extra_storage.clear();
            data.clear_product();
        } else if data.voice.is_keyed_off {
            data.state.reset_since_key_on();
        }
    }

    /// 处理一个 tick
    ///
    /// 调用方持有两把锁; 回调投递期间锁会被临时释放并重新获取.
    pub fn process(
        &mut self,
        ctx: &ProcessContext<'_>,
        locks: &mut VoiceLocks<'_, ModuleData>,
    ) -> NgsResult<TickOutcome> {
        let params = locks.parameters;
        let playable = params
            .buffer(locks.state.current_buffer)
            .is_some_and(|buffer| buffer.address != 0);
        if !playable {
            locks.clear_product();
            return Ok(TickOutcome::Idle);
        }

        self.ensure_decoder(params.config_data)?;

        while locks.state.decoded_samples_pending < ctx.granularity {
            if self.decode_more_data(ctx, locks)? == PumpOutcome::Finished {
                // 剩余采样连同静音一次交付
                locks.fill_to_fit_granularity(ctx.granularity);
                locks.set_product(0, ctx.granularity);
                let staged = locks.extra_storage.samples();
                let state = &mut locks.state;
                state.decoded_passed = staged;
                state.decoded_samples_pending = 0;
                state.reset_since_key_on();
                return Ok(TickOutcome::Finished);
            }
        }

        let passed = locks.state.decoded_passed;
        locks.set_product(passed, ctx.granularity);
        let state = &mut locks.state;
        state.decoded_samples_pending -= ctx.granularity;
        state.decoded_passed = passed + ctx.granularity;
        Ok(TickOutcome::Continue)
    }

    fn ensure_decoder(&mut self, config_word: u32) -> NgsResult<()> {
        if self.decoder.is_none() || config_word != self.last_config {
            self.decoder = Some(Atrac9DecoderState::new(config_word, self.factory)?);
            self.last_config = config_word;
        }
        Ok(())
    }

    /// 解码泵: 处理一次缓冲区边界, 或解码一个超帧追加到暂存区
    pub fn decode_more_data(
        &mut self,
        ctx: &ProcessContext<'_>,
        locks: &mut VoiceLocks<'_, ModuleData>,
    ) -> NgsResult<PumpOutcome> {
        let params = locks.parameters;
        if !params.is_native_rate() && !self.rate_warned {
            warn!(
                "ATRAC9 语音暂不支持变速播放: 频率 {} Hz, 倍率 {}",
                params.playback_frequency, params.playback_scalar
            );
            self.rate_warned = true;
        }

        let passed = locks.state.decoded_passed;
        locks.extra_storage.compact(passed);
        locks.state.decoded_passed = 0;

        let current = locks.state.current_buffer;
        let Some(&buffer) = params.buffer(current) else {
            return Ok(PumpOutcome::Finished);
        };

        if locks.state.current_byte_position_in_buffer >= buffer.byte_len() {
            return Ok(self.advance_buffer(ctx, locks, current));
        }

        let decoder = self
            .decoder
            .as_mut()
            .ok_or_else(|| NgsError::Internal("ATRAC9 解码绑定未初始化".into()))?;

        let superframe_size = decoder.get(DecoderQuery::SuperframeSize);
        let position = locks.state.current_byte_position_in_buffer;
        let remaining = buffer.byte_len() - position;
        if remaining < superframe_size {
            if !self.misalignment_reported {
                error!(
                    "ATRAC9 缓冲区 {current} 剩余 {remaining} 字节, 不足一个超帧 ({superframe_size} 字节) 或未对齐"
                );
                self.misalignment_reported = true;
            }
            return Ok(PumpOutcome::Finished);
        }

        let samples_per_frame = decoder.get(DecoderQuery::SamplesPerFrame);
        let samples_per_superframe = decoder.get(DecoderQuery::SamplesPerSuperframe);
        let frames = decoder.get(DecoderQuery::FramesInSuperframe);

        // 缓冲区首尾需要丢弃的采样. 超长缓冲区的采样下标饱和到 u32::MAX
        let sample_index = (position / superframe_size).saturating_mul(samples_per_superframe);
        let mut start_offset = 0;
        let mut decoded_size = samples_per_superframe;
        let discard_start = buffer.discard_start();
        if discard_start > sample_index {
            let skipped = samples_per_superframe.min(discard_start - sample_index);
            start_offset += skipped;
            decoded_size -= skipped;
        }
        let samples_left_after =
            (remaining / superframe_size - 1).saturating_mul(samples_per_superframe);
        let discard_end = buffer.discard_end();
        if discard_end > samples_left_after {
            let skipped = samples_per_superframe.min(discard_end - samples_left_after);
            decoded_size = decoded_size.saturating_sub(skipped);
        }

        let input = ctx
            .memory
            .slice(buffer.address, position, superframe_size as usize)?;

        // 解码失败的帧及其后的帧保持静音
        let mut superframe = vec![0u8; samples_per_superframe as usize * FRAME_STRIDE];
        let mut pcm = vec![0u8; decoder.pcm_frame_bytes()];
        let es_size = decoder.get_es_size() as usize;
        let mut written = 0usize;
        let mut decode_failed = false;
        for frame in input.chunks_exact(es_size).take(frames as usize) {
            if !decoder.send(frame) {
                decode_failed = true;
                break;
            }
            let got = decoder.receive(&mut pcm).samples.min(samples_per_frame);
            let out_len = got as usize * FRAME_STRIDE;
            let out = superframe
                .get_mut(written..written + out_len)
                .ok_or_else(|| NgsError::Internal("超帧暂存越界".into()))?;
            decoder.converter().convert_into(&pcm, got, out)?;
            written += out_len;
        }

        let keep = StagingBuffer::sample_range(start_offset, decoded_size);
        let data = &mut **locks;
        data.extra_storage.append(&superframe[keep]);
        data.state.current_byte_position_in_buffer = position + superframe_size;
        data.state.account_superframe(decoded_size, superframe_size);
        data.state.decoded_samples_pending += decoded_size;

        if decode_failed {
            warn!(
                "ATRAC9 缓冲区 {current} 偏移 {position} 处超帧解码失败, 以静音代替"
            );
            let notification = Notification {
                event: CallbackEvent::DecodeError,
                param: position,
                address: buffer.address,
            };
            locks.unlocked(|| Self::deliver(ctx, &[notification]));
            if let Some(decoder) = self.decoder.as_mut() {
                decoder.clear_context();
            }
        }

        Ok(PumpOutcome::Progress)
    }

    /// 当前缓冲区读完: 计算循环或切换, 投递通知, 并跳过空缓冲区
    fn advance_buffer(
        &mut self,
        ctx: &ProcessContext<'_>,
        locks: &mut VoiceLocks<'_, ModuleData>,
        current: i32,
    ) -> PumpOutcome {
        let params = locks.parameters;
        let Some(&buffer) = params.buffer(current) else {
            return PumpOutcome::Finished;
        };

        let state = &mut locks.state;
        state.current_loop_count += 1;
        let mut notifications = Vec::with_capacity(2);
        if buffer.loop_count != LOOP_FOREVER && state.current_loop_count > i32::from(buffer.loop_count) {
            state.current_loop_count = 0;
            match params.buffer(i32::from(buffer.next_buffer_index)) {
                Some(next) => {
                    state.current_buffer = i32::from(buffer.next_buffer_index);
                    notifications.push(Notification {
                        event: CallbackEvent::SwappedBuffer,
                        param: 0,
                        address: next.address,
                    });
                }
                None => {
                    state.current_buffer = NO_BUFFER;
                    notifications.push(Notification {
                        event: CallbackEvent::EndOfData,
                        param: 0,
                        address: 0,
                    });
                }
            }
        } else {
            let loops = state.current_loop_count as u32;
            for event in [CallbackEvent::SwappedBuffer, CallbackEvent::LoopedBuffer] {
                notifications.push(Notification {
                    event,
                    param: loops,
                    address: buffer.address,
                });
            }
        }
        state.current_byte_position_in_buffer = 0;
        debug!(
            "ATRAC9 缓冲区 {current} 读完: 下一个 {}, 循环 {}",
            state.current_buffer, state.current_loop_count
        );

        locks.unlocked(|| Self::deliver(ctx, &notifications));

        // 回调期间客户机可能改写了参数和状态
        let params = locks.parameters;
        if locks.state.is_done() {
            return PumpOutcome::Finished;
        }
        let mut index = locks.state.current_buffer;
        for _ in 0..MAX_BUFFER_PARAMS {
            match params.buffer(index) {
                Some(candidate) if candidate.byte_len() == 0 => {
                    index = i32::from(candidate.next_buffer_index);
                }
                _ => break,
            }
        }
        match params.buffer(index) {
            Some(candidate) if candidate.byte_len() > 0 => {
                if index != locks.state.current_buffer {
                    debug!("ATRAC9 跳过空缓冲区, 从缓冲区 {index} 继续");
                    locks.state.current_buffer = index;
                    locks.state.current_loop_count = 0;
                }
                PumpOutcome::Retry
            }
            _ => {
                // 链上只剩空缓冲区, 按数据结束处理
                debug!("ATRAC9 缓冲区链从 {} 起没有可播放数据", locks.state.current_buffer);
                let state = &mut locks.state;
                state.current_buffer = NO_BUFFER;
                state.current_byte_position_in_buffer = 0;
                state.current_loop_count = 0;
                let end = Notification {
                    event: CallbackEvent::EndOfData,
                    param: 0,
                    address: 0,
                };
                locks.unlocked(|| Self::deliver(ctx, &[end]));
                PumpOutcome::Finished
            }
        }
    }

    fn deliver(ctx: &ProcessContext<'_>, notifications: &[Notification]) {
        for n in notifications {
            debug!("ATRAC9 回调: {} ({}, {:#010x})", n.event, n.param, n.address);
            ctx.callback.invoke(n.event, n.param, n.address);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::tests::{config_word, create_fake};
    use crate::params::{BufferParameters, Parameters};
    use ngs_core::{SchedulerLock, SparseMemory};
    use parking_lot::Mutex;
    use std::cell::RefCell;

    const BASE: u32 = 0x8100_0000;

    /// 单声道, 64 字节帧, 每超帧 2 帧 (128 字节 / 512 采样)
    fn mono_word() -> u32 {
        config_word(0, 64, 1)
    }

    fn params_with(buffers: &[BufferParameters]) -> Parameters {
        let mut params = Parameters {
            config_data: mono_word(),
            ..Default::default()
        };
        params.buffer_params[..buffers.len()].copy_from_slice(buffers);
        params
    }

    fn buffer(address: u32, bytes: i32, loops: i16, next: i16) -> BufferParameters {
        BufferParameters {
            address,
            bytes_count: bytes,
            loop_count: loops,
            next_buffer_index: next,
            ..Default::default()
        }
    }

    fn memory_with(superframes: usize, fill: u8) -> SparseMemory {
        let mut mem = SparseMemory::new();
        mem.map(BASE, vec![fill; superframes * 128]).unwrap();
        mem
    }

    struct Harness {
        scheduler: SchedulerLock,
        voice: Mutex<ModuleData>,
        module: Atrac9Module,
        events: RefCell<Vec<(CallbackEvent, u32, u32)>>,
    }

    impl Harness {
        fn new(params: Parameters) -> Self {
            let _ = env_logger::builder().is_test(true).try_init();
            Self {
                scheduler: SchedulerLock::new(()),
                voice: Mutex::new(ModuleData::new(params)),
                module: Atrac9Module::with_factory(create_fake),
                events: RefCell::new(Vec::new()),
            }
        }

        fn tick(&mut self, mem: &SparseMemory, granularity: u32) -> TickOutcome {
            let events = &self.events;
            let record = |event, param, address| events.borrow_mut().push((event, param, address));
            let ctx = ProcessContext {
                memory: mem,
                callback: &record,
                granularity,
            };
            let mut locks = VoiceLocks::acquire(&self.scheduler, &self.voice);
            self.module.process(&ctx, &mut locks).unwrap()
        }

        fn data(&self) -> ModuleData {
            self.voice.lock().clone()
        }

        fn events(&self) -> Vec<CallbackEvent> {
            self.events.borrow().iter().map(|e| e.0).collect()
        }
    }

    #[test]
    fn test_单缓冲区播放到结束() {
        let mem = memory_with(1, 1);
        let mut h = Harness::new(params_with(&[buffer(BASE, 128, 0, -1)]));

        assert_eq!(h.tick(&mem, 512), TickOutcome::Continue);
        let data = h.data();
        assert_eq!(data.state.samples_generated_total, 512);
        assert_eq!(data.product().unwrap().len(), 512 * FRAME_STRIDE);

        assert_eq!(h.tick(&mem, 512), TickOutcome::Finished);
        assert_eq!(h.events(), vec![CallbackEvent::EndOfData]);
        let data = h.data();
        assert_eq!(data.state.current_buffer, NO_BUFFER);
        assert_eq!(data.state.samples_generated_total, 512);
        // 数据耗尽时仍输出完整粒度的静音
        assert!(data.product().unwrap().iter().all(|&b| b == 0));

        assert_eq!(h.tick(&mem, 512), TickOutcome::Idle);
        assert_eq!(h.events().len(), 1);
    }

    #[test]
    fn test_有限循环() {
        let mem = memory_with(1, 1);
        let mut h = Harness::new(params_with(&[buffer(BASE, 128, 2, -1)]));

        let mut ticks = 0;
        while h.tick(&mem, 512) == TickOutcome::Continue {
            ticks += 1;
        }
        // 原始一次加循环两次
        assert_eq!(ticks, 3);
        assert_eq!(
            h.events(),
            vec![
                CallbackEvent::SwappedBuffer,
                CallbackEvent::LoopedBuffer,
                CallbackEvent::SwappedBuffer,
                CallbackEvent::LoopedBuffer,
                CallbackEvent::EndOfData,
            ]
        );
        let recorded = h.events.borrow().clone();
        assert_eq!(recorded[0], (CallbackEvent::SwappedBuffer, 1, BASE));
        assert_eq!(recorded[3], (CallbackEvent::LoopedBuffer, 2, BASE));
    }

    #[test]
    fn test_链式切换() {
        let mut mem = SparseMemory::new();
        mem.map(BASE, vec![1u8; 128]).unwrap();
        mem.map(BASE + 0x1000, vec![2u8; 256]).unwrap();
        let mut h = Harness::new(params_with(&[
            buffer(BASE, 128, 0, 1),
            buffer(BASE + 0x1000, 256, 0, -1),
        ]));

        let mut ticks = 0;
        while h.tick(&mem, 512) == TickOutcome::Continue {
            ticks += 1;
        }
        assert_eq!(ticks, 3);
        let recorded = h.events.borrow().clone();
        assert_eq!(
            recorded,
            vec![
                (CallbackEvent::SwappedBuffer, 0, BASE + 0x1000),
                (CallbackEvent::EndOfData, 0, 0),
            ]
        );
        assert_eq!(h.data().state.samples_generated_total, 3 * 512);
    }

    #[test]
    fn test_跳过空缓冲区() {
        let mut mem = SparseMemory::new();
        mem.map(BASE, vec![1u8; 128]).unwrap();
        mem.map(BASE + 0x2000, vec![3u8; 128]).unwrap();
        let mut h = Harness::new(params_with(&[
            buffer(BASE, 128, 0, 1),
            buffer(BASE + 0x1000, 0, 0, 2),
            buffer(BASE + 0x2000, 128, 0, -1),
        ]));

        assert_eq!(h.tick(&mem, 512), TickOutcome::Continue);
        assert_eq!(h.tick(&mem, 512), TickOutcome::Continue);
        let data = h.data();
        assert_eq!(data.state.current_buffer, 2);
        assert_eq!(data.state.samples_generated_total, 1024);
        // 第二个 tick 输出的是缓冲区 2 的内容 (3 * 256 / 32768)
        let out = data.product().unwrap();
        let first = f32::from_le_bytes(out[..4].try_into().unwrap());
        assert_eq!(first, 768.0 / 32768.0);
    }

    #[test]
    fn test_缓冲区链只剩空缓冲区时结束() {
        let mem = memory_with(1, 1);
        let mut h = Harness::new(params_with(&[
            buffer(BASE, 128, 0, 1),
            buffer(BASE + 0x1000, 0, 0, 1),
        ]));

        assert_eq!(h.tick(&mem, 512), TickOutcome::Continue);
        assert_eq!(h.tick(&mem, 512), TickOutcome::Finished);
        assert_eq!(h.data().state.current_buffer, NO_BUFFER);

        // 结束后不再有任何通知
        assert_eq!(h.tick(&mem, 512), TickOutcome::Idle);
        assert_eq!(h.tick(&mem, 512), TickOutcome::Idle);
        let recorded = h.events.borrow().clone();
        assert_eq!(
            recorded,
            vec![
                (CallbackEvent::SwappedBuffer, 0, BASE + 0x1000),
                (CallbackEvent::EndOfData, 0, 0),
            ]
        );
    }

    #[test]
    fn test_空缓冲区指向链尾时结束() {
        let mem = memory_with(1, 1);
        let mut h = Harness::new(params_with(&[
            buffer(BASE, 128, 0, 1),
            buffer(BASE + 0x1000, 0, 0, -1),
        ]));

        assert_eq!(h.tick(&mem, 512), TickOutcome::Continue);
        assert_eq!(h.tick(&mem, 512), TickOutcome::Finished);
        assert_eq!(
            h.events(),
            vec![CallbackEvent::SwappedBuffer, CallbackEvent::EndOfData]
        );
        assert_eq!(h.tick(&mem, 512), TickOutcome::Idle);
    }

    #[test]
    fn test_超长缓冲区采样下标不溢出() {
        // 1 字节帧, 每超帧 1 帧 256 采样
        let mut mem = SparseMemory::new();
        mem.map(BASE, vec![1u8; 4096]).unwrap();
        mem.map(BASE + (1 << 25), vec![2u8; 16]).unwrap();
        let mut params = params_with(&[buffer(BASE, i32::MAX, 0, -1)]);
        params.config_data = config_word(0, 1, 0);
        params.buffer_params[0].samples_discard_start_off = 100;
        params.buffer_params[0].samples_discard_end_off = 100;
        let mut h = Harness::new(params);

        // 首个超帧只丢弃开头
        assert_eq!(h.tick(&mem, 156), TickOutcome::Continue);
        let data = h.data();
        assert_eq!(data.state.current_byte_position_in_buffer, 1);
        assert_eq!(data.state.samples_generated_total, 156);

        // 下标超出 u32 范围的位置照常解码, 不触发任何丢弃
        h.voice.lock().state.current_byte_position_in_buffer = 1 << 25;
        assert_eq!(h.tick(&mem, 256), TickOutcome::Continue);
        let data = h.data();
        assert_eq!(data.state.current_byte_position_in_buffer, (1 << 25) + 1);
        assert_eq!(data.state.samples_generated_total, 156 + 256);
        assert!(h.events().is_empty());
    }

    #[test]
    fn test_非标准速率照常解码并每实例告警一次() {
        let mem = memory_with(2, 1);
        let mut params = params_with(&[buffer(BASE, 256, 0, -1)]);
        params.playback_frequency = 44100.0;
        let mut h = Harness::new(params);

        assert!(!h.module.rate_warned);
        assert_eq!(h.tick(&mem, 512), TickOutcome::Continue);
        assert!(h.module.rate_warned);
        let data = h.data();
        assert_eq!(data.state.samples_generated_total, 512);
        assert!(data.product().unwrap().iter().any(|&b| b != 0));

        assert_eq!(h.tick(&mem, 512), TickOutcome::Continue);
        assert!(h.module.rate_warned);

        // 新实例各自告警
        let mut other = Harness::new(params);
        assert!(!other.module.rate_warned);
        assert_eq!(other.tick(&mem, 512), TickOutcome::Continue);
        assert!(other.module.rate_warned);
    }

    #[test]
    fn test_首尾丢弃() {
        let mem = memory_with(2, 1);
        let mut params = params_with(&[buffer(BASE, 256, 0, -1)]);
        params.buffer_params[0].samples_discard_start_off = 100;
        params.buffer_params[0].samples_discard_end_off = 50;
        let mut h = Harness::new(params);

        // 粒度大于总采样数, 一次解码整个缓冲区后结束
        assert_eq!(h.tick(&mem, 2048), TickOutcome::Finished);
        let data = h.data();
        assert_eq!(data.state.samples_generated_total, 1024 - 150);
        assert_eq!(data.product().unwrap().len(), 2048 * FRAME_STRIDE);
    }

    #[test]
    fn test_解码失败以静音代替() {
        let mut mem = SparseMemory::new();
        let mut raw = vec![1u8; 256];
        raw[64] = 0xFF;
        mem.map(BASE, raw).unwrap();
        let mut h = Harness::new(params_with(&[buffer(BASE, 256, 0, -1)]));

        assert_eq!(h.tick(&mem, 512), TickOutcome::Continue);
        let recorded = h.events.borrow().clone();
        assert_eq!(recorded, vec![(CallbackEvent::DecodeError, 0, BASE)]);
        let data = h.data();
        assert_eq!(data.state.current_byte_position_in_buffer, 128);
        let out = data.product().unwrap();
        // 第一帧正常, 第二帧静音
        assert!(out[..FRAME_STRIDE].iter().any(|&b| b != 0));
        assert!(out[256 * FRAME_STRIDE..].iter().all(|&b| b == 0));

        // 下一个超帧继续正常解码
        assert_eq!(h.tick(&mem, 512), TickOutcome::Continue);
        assert_eq!(h.events.borrow().len(), 1);
    }

    #[test]
    fn test_未对齐缓冲区只报告一次() {
        let mem = memory_with(1, 1);
        let mut h = Harness::new(params_with(&[buffer(BASE, 100, 0, -1)]));

        assert_eq!(h.tick(&mem, 512), TickOutcome::Finished);
        assert_eq!(h.tick(&mem, 512), TickOutcome::Finished);
        assert!(h.events().is_empty());
        assert!(h.module.misalignment_reported);
        assert_eq!(h.data().state.current_buffer, 0);
    }

    #[test]
    fn test_无地址时空闲() {
        let mem = SparseMemory::new();
        let mut h = Harness::new(params_with(&[buffer(0, 128, 0, -1)]));
        assert_eq!(h.tick(&mem, 512), TickOutcome::Idle);
        assert!(h.module.decoder().is_none());
        assert!(h.data().product().is_none());
    }

    #[test]
    fn test_配置字变化时重建解码绑定() {
        let mem = memory_with(4, 1);
        let mut h = Harness::new(params_with(&[buffer(BASE, 512, 0, -1)]));
        h.tick(&mem, 256);
        assert_eq!(h.module.decoder().unwrap().config_word(), mono_word());

        let stereo = config_word(1, 64, 1);
        h.voice.lock().parameters.config_data = stereo;
        h.tick(&mem, 256);
        assert_eq!(h.module.decoder().unwrap().config_word(), stereo);
    }

    #[test]
    fn test_暂存区长度不变式() {
        let mem = memory_with(4, 1);
        let mut h = Harness::new(params_with(&[buffer(BASE, 512, 0, -1)]));
        for _ in 0..5 {
            h.tick(&mem, 200);
            let data = h.data();
            let expected = (data.state.decoded_passed + data.state.decoded_samples_pending) as usize;
            assert_eq!(data.extra_storage.len(), expected * FRAME_STRIDE);
        }
    }

    #[test]
    fn test_变为空闲时复位() {
        let mem = memory_with(2, 1);
        let mut h = Harness::new(params_with(&[buffer(BASE, 256, 0, -1)]));
        h.tick(&mem, 256);

        let mut data = h.voice.lock();
        data.voice.is_keyed_off = true;
        data.voice.state = VoiceState::Finalizing;
        h.module.on_state_change(&mut data, VoiceState::Active);
        assert_eq!(data.state.samples_generated_since_key_on, 0);
        assert_eq!(data.state.samples_generated_total, 512);
        assert_eq!(data.state.current_byte_position_in_buffer, 128);

        data.voice.state = VoiceState::Available;
        h.module.on_state_change(&mut data, VoiceState::Finalizing);
        assert_eq!(data.state.current_buffer, 0);
        assert_eq!(data.state.current_byte_position_in_buffer, 0);
        assert!(data.extra_storage.is_empty());
    }

    #[test]
    fn test_参数块大小() {
        let module = Atrac9Module::with_factory(create_fake);
        assert_eq!(module.buffer_parameter_size(), 96);
    }
}
