use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::client::LaunchApiClient;
use super::error::FetchError;
use super::select::select_station;
use super::types::{CacheEntry, LaunchRecord};

/// 默认刷新间隔（5 分钟）
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// 数据源抽象（生产环境是 HTTP 客户端，测试用桩实现）
#[async_trait::async_trait]
pub trait LaunchSource: Send + Sync + 'static {
    async fn fetch(&self) -> Result<Vec<LaunchRecord>, FetchError>;
}

#[async_trait::async_trait]
impl LaunchSource for LaunchApiClient {
    async fn fetch(&self) -> Result<Vec<LaunchRecord>, FetchError> {
        self.fetch_launches().await
    }
}

/// 单站点更新协调器
///
/// 持有该站点的缓存快照，负责定时刷新和并发去重。
/// 同一实例上并发调用 [`refresh_now`](Self::refresh_now) 时最多发起一次抓取，
/// 其余调用等该次抓取落盘后直接返回。抓取失败只记入 `last_error`，
/// 之前的数据保持不动。
pub struct LaunchCoordinator {
    /// 监控的站点短名
    station: String,

    /// 数据源
    source: Arc<dyn LaunchSource>,

    /// 缓存条目（只在一次刷新结束时整体替换）
    cache: RwLock<CacheEntry>,

    /// 刷新临界区，保证任意时刻至多一次抓取在途
    refresh_gate: Mutex<()>,

    /// 已完成的刷新次数（并发调用靠它识别"等锁期间别人已刷完"）
    attempts: AtomicU64,

    /// 每次刷新结束（无论成败）通知订阅者
    updates: watch::Sender<u64>,

    /// 停止信号，true 之后不再调度新的刷新
    stop_tx: watch::Sender<bool>,

    /// 定时任务句柄
    ticker: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl LaunchCoordinator {
    pub fn new(station: impl Into<String>, source: Arc<dyn LaunchSource>) -> Arc<Self> {
        let (updates, _) = watch::channel(0);
        let (stop_tx, _) = watch::channel(false);

        Arc::new(Self {
            station: station.into(),
            source,
            cache: RwLock::new(CacheEntry::default()),
            refresh_gate: Mutex::new(()),
            attempts: AtomicU64::new(0),
            updates,
            stop_tx,
            ticker: std::sync::Mutex::new(None),
        })
    }

    /// 监控的站点短名
    pub fn station(&self) -> &str {
        &self.station
    }

    /// 当前缓存快照
    ///
    /// 随时可调用；刷新进行中读到的是上一份完整快照，不会出现半新半旧。
    pub async fn get_cached(&self) -> CacheEntry {
        self.cache.read().await.clone()
    }

    /// 订阅刷新通知（值是已完成的刷新次数，成功失败都会递增）
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.updates.subscribe()
    }

    /// 立即刷新一次
    ///
    /// 已有刷新在途时等它完成后直接返回，不发起第二次抓取。
    /// 任何抓取错误都被吸收进 `last_error`，不向调用者传播。
    pub async fn refresh_now(&self) {
        let seen = self.attempts.load(Ordering::Acquire);
        let _gate = self.refresh_gate.lock().await;
        if self.attempts.load(Ordering::Acquire) != seen {
            // 等锁期间别的调用已经刷完，本次直接复用其结果
            debug!("Joined in-flight refresh for {}", self.station);
            return;
        }

        match self.source.fetch().await {
            Ok(records) => {
                let launches = select_station(records, &self.station);
                info!("Refreshed {}: {} launches", self.station, launches.len());

                let mut cache = self.cache.write().await;
                cache.launches = launches;
                cache.last_success = Some(Utc::now());
                cache.last_error = None;
            }
            Err(err) => {
                warn!(
                    "Refresh failed for {}: {} (keeping previous data)",
                    self.station, err
                );

                let mut cache = self.cache.write().await;
                cache.last_error = Some(err);
            }
        }

        let attempt = self.attempts.fetch_add(1, Ordering::Release) + 1;
        self.updates.send_replace(attempt);
    }

    /// 启动定时刷新
    ///
    /// 返回前先同步完成第一次刷新，保证首个读取方不会拿到空缓存
    /// （除非第一次抓取本身失败，此时缓存为空且带 `last_error`）。
    /// 之后按固定间隔在后台刷新，失败不退避，直到 [`stop`](Self::stop)。
    pub async fn start_periodic(self: &Arc<Self>, interval: Duration) {
        self.stop_tx.send_replace(false);
        self.refresh_now().await;

        info!(
            "Starting periodic refresh for {} (interval: {:?})",
            self.station, interval
        );

        let coordinator = Arc::clone(self);
        let mut stop_rx = self.stop_tx.subscribe();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // interval 的第一个 tick 立即到期，对应刚做完的首次刷新
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = stop_rx.changed() => {}
                }
                if *stop_rx.borrow_and_update() {
                    break;
                }
                coordinator.refresh_now().await;
            }
            debug!("Periodic refresh stopped for {}", coordinator.station);
        });

        if let Some(previous) = self.ticker.lock().unwrap().replace(handle) {
            previous.abort();
        }
    }

    /// 停止定时刷新
    ///
    /// 只取消后续调度；在途的刷新会继续跑完并照常更新缓存。幂等。
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }
}
