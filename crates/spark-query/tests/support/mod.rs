//! 集成测试共享的探针数据源。

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures_util::stream;
use parking_lot::Mutex;
use spark_query::{BoxStream, Cancellation, QueryError, QuerySource, QueryValue, Result};

/// 记录扫描次数与被拉取元素的数据源，用于断言“失败前未触达提供者”。
#[derive(Clone)]
pub struct ProbeSource<T> {
    items: Arc<Vec<T>>,
    scans: Arc<AtomicUsize>,
    pulled: Arc<Mutex<Vec<usize>>>,
    native: Arc<AtomicUsize>,
}

impl<T: QueryValue> ProbeSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(items),
            scans: Arc::new(AtomicUsize::new(0)),
            pulled: Arc::new(Mutex::new(Vec::new())),
            native: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    pub fn pulled(&self) -> usize {
        self.pulled.lock().len()
    }

    pub fn native_calls(&self) -> usize {
        self.native.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: QueryValue> QuerySource<T> for ProbeSource<T> {
    fn name(&self) -> &str {
        "probe"
    }

    fn scan<'a>(&'a self, _cancellation: &'a Cancellation) -> BoxStream<'a, Result<T>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        let pulled = Arc::clone(&self.pulled);
        Box::pin(stream::iter(self.items.iter().cloned().enumerate().map(
            move |(index, item)| {
                pulled.lock().push(index);
                Ok(item)
            },
        )))
    }

    async fn contains_native(
        &self,
        value: &T,
        _cancellation: &Cancellation,
    ) -> Option<Result<bool>> {
        self.native.fetch_add(1, Ordering::SeqCst);
        Some(Ok(self.items.iter().any(|item| item.value_eq(value))))
    }
}

/// 预热必然失败的数据源。
pub struct BrokenSource;

#[async_trait]
impl QuerySource<i64> for BrokenSource {
    fn name(&self) -> &str {
        "broken"
    }

    async fn prepare(&self) -> Result<()> {
        Err(QueryError::provider("broken", "connection refused").transient())
    }

    fn scan<'a>(&'a self, _cancellation: &'a Cancellation) -> BoxStream<'a, Result<i64>> {
        Box::pin(stream::empty())
    }
}
