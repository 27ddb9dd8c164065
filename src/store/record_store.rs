//! 记录存储 - 基础设施层
//!
//! 内存版的托管数据层适配器。语义只有三个：
//! create / update(部分字段合并) / subscribe(推送全量快照)。
//!
//! 订阅在每次变更后收到**完整的当前结果集**，消费者整表替换本地
//! 状态，不下发增量，也不做冲突消解（最后写入者胜出）。

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// 可存储记录：有稳定的字符串 id
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
}

/// 通用内存记录存储
///
/// 新记录插入到集合**头部**；更新原地合并后整表广播。
pub struct RecordStore<T: Record> {
    records: Arc<RwLock<Vec<T>>>,
    notifier: broadcast::Sender<Vec<T>>,
}

impl<T: Record> Clone for RecordStore<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            notifier: self.notifier.clone(),
        }
    }
}

impl<T: Record> Default for RecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> RecordStore<T> {
    pub fn new() -> Self {
        let (notifier, _) = broadcast::channel(32);
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            notifier,
        }
    }

    /// 插入新记录（头部）
    pub async fn insert(&self, record: T) -> T {
        let mut records = self.records.write().await;
        records.insert(0, record.clone());
        debug!("记录已插入: {} (共 {} 条)", record.id(), records.len());
        self.publish(&records);
        record
    }

    /// 按 id 合并更新
    ///
    /// # 返回
    /// 返回合并后的完整记录；id 不存在时报错
    pub async fn update<F>(&self, id: &str, apply: F) -> AppResult<T>
    where
        F: FnOnce(&mut T),
    {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| AppError::record_not_found(id))?;

        apply(record);
        let updated = record.clone();
        debug!("记录已更新: {}", id);

        self.publish(&records);
        Ok(updated)
    }

    /// 按 id 取单条记录
    pub async fn get(&self, id: &str) -> AppResult<T> {
        let records = self.records.read().await;
        records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| AppError::record_not_found(id))
    }

    /// 当前全量列表
    pub async fn list(&self) -> Vec<T> {
        self.records.read().await.clone()
    }

    /// 按谓词过滤的当前列表
    pub async fn list_where(&self, filter: impl Fn(&T) -> bool) -> Vec<T> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| filter(r))
            .cloned()
            .collect()
    }

    /// 订阅匹配过滤器的记录集合
    ///
    /// 返回的订阅自带初始快照；此后每次变更推送一次过滤后的全量
    /// 结果集。
    pub async fn subscribe(
        &self,
        filter: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Subscription<T> {
        let receiver = self.notifier.subscribe();
        let latest = self.list_where(&filter).await;
        Subscription {
            receiver,
            filter: Arc::new(filter),
            latest,
        }
    }

    fn publish(&self, records: &[T]) {
        // 没有订阅者时 send 会失败，这不是错误
        let _ = self.notifier.send(records.to_vec());
    }
}

/// 记录订阅
///
/// 消费者用每次到达的快照整表替换本地状态
pub struct Subscription<T: Record> {
    receiver: broadcast::Receiver<Vec<T>>,
    filter: Arc<dyn Fn(&T) -> bool + Send + Sync>,
    latest: Vec<T>,
}

impl<T: Record> Subscription<T> {
    /// 最近一次快照
    pub fn snapshot(&self) -> &[T] {
        &self.latest
    }

    /// 等待下一次全量快照
    ///
    /// 消费落后时直接跳到能拿到的最新状态（中间快照对整表替换的
    /// 消费者没有意义）。存储关闭后返回 None。
    pub async fn next_snapshot(&mut self) -> Option<&[T]> {
        loop {
            match self.receiver.recv().await {
                Ok(all) => {
                    let filter = Arc::clone(&self.filter);
                    self.latest = all.into_iter().filter(|r| (*filter)(r)).collect();
                    return Some(&self.latest);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("订阅落后，跳过 {} 次快照", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
