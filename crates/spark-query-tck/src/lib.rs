//! spark-query 契约测试套件（TCK）入口。
//!
//! # 教案式综述（Why / How / What）
//! - **为什么存在**：任何查询提供者接入适配层后，都必须保证 `Contains`、`OrderBy`、`OrderByDescending`、
//!   `ThenBy` 的结果与同步参考实现逐元素一致。手写这些断言会得到成千上万个几乎相同的测试方法，
//!   因此本 crate 以“用例模板 × 类型矩阵”的方式在编译期展开全部组合；
//! - **如何集成**：在提供者仓库的 `tests` 目录下使用 `#[query_tck(factory = ...)]` 宏（或直接调用 `run_*`
//!   入口函数），宏会为选中的套件生成标准 `#[test]` 函数；
//! - **测试对象**：每个用例先通过 [`AdapterFactory`] 获取全新的适配器，再以 [`fixtures::MatrixElement::baseline`]
//!   为基线数据、以 [`reference`] 模块为同步准绳，比对异步算子的结果。
//!
//! # 契约说明（What）
//! - **输入要求**：被测适配器必须为类型矩阵中的十种元素类型都登记数据源，且数据与基线逐元素一致；
//!   使用 [`fixtures::visit_baselines`] 可以把基线数据加载进任意提供者；
//! - **输出保证**：全部套件通过即表示：等价性、稳定排序、空参数拒绝、预先取消四类契约均满足；
//! - **失败信息**：用例失败时 panic 信息带有 `[spark-query-tck::<套件>::<用例>]` 前缀，用例名形如
//!   `sync_selector::<Option<i32>>`，可直接定位到元素类型与重载形态。
//!
//! # 模块结构
//! - `case`：用例与套件的元信息结构体，以及统一的执行辅助函数；
//! - `contains`、`order_by`、`order_by_descending`、`then_by`：四个套件的断言逻辑；
//! - `fixtures` / `reference` / `harness`：基线数据、同步准绳与断言工具，均对外公开以便提供者编写补充用例。

mod contains;
pub mod fixtures;
pub mod harness;
mod matrix;
mod order_by;
mod order_by_descending;
pub mod reference;
mod support;
mod then_by;

use case::{TckSuite, run_suite};
pub use harness::AdapterFactory;
pub use spark_query_tck_macros::query_tck;

use spark_query::{QueryAdapter, Result};

const ALL_SUITES: [&TckSuite; 4] = [
    contains::suite(),
    order_by::suite(),
    order_by_descending::suite(),
    then_by::suite(),
];

mod case {
    use super::support;
    use crate::harness::AdapterFactory;
    use std::panic;

    /// 表示单个 TCK 用例的元信息。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：以结构体封装测试函数与名称，使矩阵宏可以在 `const` 上下文中生成整张用例表；
    /// - **逻辑 (How)**：`test` 接收适配器工厂，内部自行驱动异步执行；
    /// - **契约 (What)**：`test` 必须在失败时 `panic`；名称会出现在失败信息中。
    #[derive(Clone, Copy)]
    pub struct TckCase {
        /// 用例名称，形如 `probe_present::<i32>`。
        pub name: &'static str,
        /// 实际执行的断言逻辑。
        pub test: fn(&dyn AdapterFactory),
    }

    /// 同一算子的一组用例。
    #[derive(Clone, Copy)]
    pub struct TckSuite {
        /// 套件名称，与 `run_<name>_suite` 一一对应。
        pub name: &'static str,
        /// 归属该套件的用例集合。
        pub cases: &'static [TckCase],
    }

    /// 在捕获 panic 的前提下执行整个套件。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：为入口函数与宏提供统一执行路径，失败时附加“套件/用例”上下文后重新 panic；
    /// - **逻辑 (How)**：遍历 `cases`，借助 [`panic::catch_unwind`] 捕获 panic，交给 `support::panic_with_context`；
    /// - **契约 (What)**：`suite.cases` 不得为空；遇到第一个失败用例即停止。
    pub fn run_suite(suite: &TckSuite, factory: &dyn AdapterFactory) {
        assert!(!suite.cases.is_empty(), "TCK 套件不应为空");
        for case in suite.cases {
            let outcome = panic::catch_unwind(panic::AssertUnwindSafe(|| (case.test)(factory)));
            if let Err(payload) = outcome {
                support::panic_with_context(suite.name, case.name, payload);
            }
        }
    }
}

/// 返回所有已注册的 TCK 套件，顺序与宏的默认展开顺序一致。
pub fn all_suites() -> &'static [&'static TckSuite] {
    &ALL_SUITES
}

/// 运行 `Contains` 套件：命中、未命中、显式比较器、空来源与预先取消。
pub fn run_contains_suite(factory: &dyn AdapterFactory) {
    run_suite(contains::suite(), factory);
}

/// 运行 `OrderBy` 套件：三种选择器形态 × 是否携带比较器，以及空参数与预先取消。
pub fn run_order_by_suite(factory: &dyn AdapterFactory) {
    run_suite(order_by::suite(), factory);
}

/// 运行 `OrderByDescending` 套件。
pub fn run_order_by_descending_suite(factory: &dyn AdapterFactory) {
    run_suite(order_by_descending::suite(), factory);
}

/// 运行 `ThenBy` / `ThenByDescending` 套件，验证次级键只在主键相等时生效。
pub fn run_then_by_suite(factory: &dyn AdapterFactory) {
    run_suite(then_by::suite(), factory);
}

/// 依次运行全部套件。
pub fn run_all_suites(factory: &dyn AdapterFactory) {
    for suite in all_suites() {
        run_suite(suite, factory);
    }
}

/// 参考适配器工厂：以内存数据源装载全部基线数据。
///
/// # 教案式说明
/// - **意图 (Why)**：既是 TCK 自测的被测对象，也是第三方提供者对照排查时的“已知良好”实现；
/// - **契约 (What)**：每次调用都构造全新的适配器，互不共享状态。
pub async fn memory_adapter() -> Result<QueryAdapter> {
    fixtures::register_baselines(QueryAdapter::builder())
        .build()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use spark_query::QueryValue;

    fn matrix_type_names() -> [&'static str; 10] {
        [
            <i32 as QueryValue>::TYPE_NAME,
            <Option<i32> as QueryValue>::TYPE_NAME,
            <i64 as QueryValue>::TYPE_NAME,
            <Option<i64> as QueryValue>::TYPE_NAME,
            <f32 as QueryValue>::TYPE_NAME,
            <Option<f32> as QueryValue>::TYPE_NAME,
            <f64 as QueryValue>::TYPE_NAME,
            <Option<f64> as QueryValue>::TYPE_NAME,
            <Decimal as QueryValue>::TYPE_NAME,
            <Option<Decimal> as QueryValue>::TYPE_NAME,
        ]
    }

    #[test]
    fn cases_cover_full_matrix() {
        for suite in all_suites() {
            assert_eq!(suite.cases.len() % 10, 0, "套件 {} 的用例数应为 10 的倍数", suite.name);
            let mut stems: Vec<&str> = suite
                .cases
                .iter()
                .filter_map(|case| case.name.split("::<").next())
                .collect();
            stems.dedup();
            for stem in stems {
                for type_name in matrix_type_names() {
                    let expected = format!("{stem}::<{type_name}>");
                    assert!(
                        suite.cases.iter().any(|case| case.name == expected),
                        "套件 {} 缺少用例 {expected}",
                        suite.name
                    );
                }
            }
        }
    }

    #[test]
    fn case_names_are_unique_within_a_suite() {
        for suite in all_suites() {
            let mut names: Vec<&str> = suite.cases.iter().map(|case| case.name).collect();
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), total, "套件 {} 存在重名用例", suite.name);
        }
    }

    #[test]
    fn memory_adapter_passes_every_suite() {
        run_all_suites(&memory_adapter);
    }
}
