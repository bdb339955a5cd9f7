use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

const PRUNE_THRESHOLD: usize = 1024;

/// 按 id 加锁的进程内互斥表
/// 同一 id 的临界区串行执行，不同 id 互不阻塞
#[derive(Clone, Default)]
pub struct KeyedLocks {
    inner: Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

/// 持有期间独占对应 id，drop 时释放
pub struct KeyedGuard {
    _guard: OwnedMutexGuard<()>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: Uuid) -> KeyedGuard {
        let entry = {
            let mut map = self
                .inner
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if map.len() >= PRUNE_THRESHOLD {
                // 只剩表自身引用的条目当前无人持有或等待
                map.retain(|_, m| Arc::strong_count(m) > 1);
            }
            map.entry(key)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        KeyedGuard {
            _guard: entry.lock_owned().await,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

/// 库存相关的锁
/// - programs: 活动编辑（票种同步、删除）
/// - pass_types: 购票
/// - passes: 核验与取消
///
/// 需要多把锁时按 programs -> pass_types -> passes 的顺序获取
#[derive(Clone, Default)]
pub struct InventoryLocks {
    pub programs: KeyedLocks,
    pub pass_types: KeyedLocks,
    pub passes: KeyedLocks,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_key_is_serialised() {
        let locks = KeyedLocks::new();
        let key = Uuid::new_v4();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let locks = locks.clone();
            let inside = inside.clone();
            let max_inside = max_inside.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.lock(key).await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _a = locks.lock(Uuid::new_v4()).await;

        let b = tokio::time::timeout(Duration::from_millis(200), locks.lock(Uuid::new_v4())).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_released_on_drop() {
        let locks = KeyedLocks::new();
        let key = Uuid::new_v4();
        {
            let _guard = locks.lock(key).await;
        }
        let again = tokio::time::timeout(Duration::from_millis(200), locks.lock(key)).await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn test_idle_entries_are_pruned() {
        let locks = KeyedLocks::new();
        for _ in 0..PRUNE_THRESHOLD {
            let _guard = locks.lock(Uuid::new_v4()).await;
        }
        assert_eq!(locks.len(), PRUNE_THRESHOLD);

        let _guard = locks.lock(Uuid::new_v4()).await;
        assert_eq!(locks.len(), 1);
    }
}
