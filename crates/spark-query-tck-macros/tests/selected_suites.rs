//! `#[query_tck]` 的展开行为：按需选择套件、保留模块原有条目、接受自定义工厂路径。

use spark_query::{AdapterOptions, QueryAdapter, Result};
use spark_query_tck::fixtures::register_baselines;
use spark_query_tck::query_tck;

mod factories {
    use super::*;

    /// 每扫描一个元素检查一次取消的适配器，用于覆盖最密集的检查路径。
    pub async fn eager_cancellation_adapter() -> Result<QueryAdapter> {
        let options = AdapterOptions::from_toml_str("cancellation_check_interval = 1")?;
        register_baselines(QueryAdapter::builder().options(options))
            .build()
            .await
    }
}

#[query_tck(factory = crate::factories::eager_cancellation_adapter, suites(order_by, then_by))]
mod selected {
    pub const MARKER: &str = "kept";
}

#[query_tck(factory = spark_query_tck::memory_adapter, suites())]
pub(crate) mod defaulted {}

#[test]
fn existing_items_survive_expansion() {
    assert_eq!(selected::MARKER, "kept");
}
