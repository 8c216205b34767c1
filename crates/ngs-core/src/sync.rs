//! 两级锁的作用域交接.
//!
//! NGS 音频图使用两把锁: 外层可重入的调度锁保护整个语音调度图,
//! 内层语音锁保护单个语音的私有状态. 获取顺序固定为先外后内, 释放顺序相反.
//!
//! 向外部代码投递回调前必须临时释放两把锁 (回调可能重入调度器排入新缓冲区),
//! 回调结束后再按原顺序重新获取. [`VoiceLocks::unlocked`] 把这一整套
//! 释放 -> 回调 -> 重新获取 表达为一个操作, 调用点不再需要手工配对.

use std::ops::{Deref, DerefMut};

use parking_lot::{Mutex, MutexGuard, ReentrantMutex, ReentrantMutexGuard};

/// 调度锁: 只作为锁使用, 不携带数据
pub type SchedulerLock = ReentrantMutex<()>;

/// 同时持有的调度锁与语音锁
///
/// 字段声明顺序即析构顺序: 先释放内层语音锁, 再释放外层调度锁.
pub struct VoiceLocks<'a, T> {
    voice: MutexGuard<'a, T>,
    scheduler: ReentrantMutexGuard<'a, ()>,
}

impl<'a, T> VoiceLocks<'a, T> {
    /// 按 调度锁 -> 语音锁 的顺序获取两把锁
    pub fn acquire(scheduler: &'a SchedulerLock, voice: &'a Mutex<T>) -> Self {
        let scheduler = scheduler.lock();
        let voice = voice.lock();
        Self { voice, scheduler }
    }

    /// 临时释放两把锁并执行 `f`
    ///
    /// 释放顺序: 语音锁, 调度锁. 重新获取顺序: 调度锁, 语音锁.
    /// `f` 执行期间无法访问受保护的数据.
    pub fn unlocked<R>(&mut self, f: impl FnOnce() -> R) -> R {
        let scheduler = &mut self.scheduler;
        MutexGuard::unlocked(&mut self.voice, || {
            ReentrantMutexGuard::unlocked(scheduler, f)
        })
    }
}

impl<T> Deref for VoiceLocks<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.voice
    }
}

impl<T> DerefMut for VoiceLocks<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.voice
    }
}
