// 缓存清理模块 - 定期移除过期的缓存条目

use super::cache::AnalysisCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// 缓存清理器
pub struct CacheSweeper {
    cache: Arc<AnalysisCache>,
    interval: Duration,
    /// 正在运行的清理任务
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CacheSweeper {
    pub fn new(cache: Arc<AnalysisCache>, interval: Duration) -> Self {
        Self {
            cache,
            interval,
            task: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 启动自动清理任务，已在运行时不重复启动
    pub async fn start(&self) {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("缓存清理任务已在运行");
            return;
        }

        let cache = self.cache.clone();
        let period = self.interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // 第一次 tick 立即完成，跳过
            ticker.tick().await;
            info!("缓存清理任务已启动，每 {:?} 检查一次", period);

            loop {
                ticker.tick().await;
                let removed = cache.evict_expired();
                info!("定期缓存清理完成，移除 {} 条过期记录", removed);
            }
        }));
    }

    /// 停止自动清理任务
    pub async fn stop(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
            info!("缓存清理任务已停止");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// 立即执行一次清理
    pub fn trigger_sweep(&self) -> usize {
        let removed = self.cache.evict_expired();
        info!("手动缓存清理完成，移除 {} 条过期记录", removed);
        removed
    }
}
