//! 类型矩阵的基线数据。
//!
//! # 教案式说明
//! - **意图 (Why)**：等价性断言只有在数据足够“刁钻”时才有意义：基线必须包含重复键、正负对称值
//!   （为绝对值比较器制造等键）、可空类型的 `None`、浮点的 `NaN` 与 `-0.0`、十进制中数值相等但标度不同的值；
//! - **逻辑 (How)**：整数序列作为骨架，各类型经 `Numeric::lift` 转换后再拼接类型特有的边界值；
//!   可空类型在骨架上插入若干 `None`；
//! - **契约 (What)**：同一类型多次调用 [`MatrixElement::baseline`] 得到完全相同的序列；
//!   基线总是包含 [`MatrixElement::probe`]（数值 5），从不包含 [`MatrixElement::absent`]（数值 42）。

use rust_decimal::Decimal;
use spark_query::{AdapterBuilder, MemorySource, QueryValue};

const SKELETON: [i32; 10] = [5, -3, 1, 3, -7, 5, 0, 2, -1, 8];

/// 类型矩阵中的元素类型。
pub trait MatrixElement: QueryValue {
    /// 基线数据。
    fn baseline() -> Vec<Self>;

    /// 把小整数提升为本类型的值；可空类型返回 `Some`。
    fn sample(value: i32) -> Self;

    /// 基线中一定存在的探针值（5）。
    fn probe() -> Self {
        Self::sample(5)
    }

    /// 基线中一定不存在的值（42）。
    fn absent() -> Self {
        Self::sample(42)
    }

    /// `+3` 投影；`None` 与 `NaN` 保持不变。
    fn shifted(&self) -> Self;

    /// 绝对值投影，用于构造“显式比较器”用例。
    fn magnitude(&self) -> Self;
}

/// 标量数值类型的最小运算集合。
trait Numeric: QueryValue + Copy {
    fn lift(value: i32) -> Self;

    fn plus_three(self) -> Self;

    fn abs(self) -> Self;

    /// 类型特有的边界值，追加在骨架之后。
    fn edges() -> Vec<Self> {
        Vec::new()
    }
}

impl Numeric for i32 {
    fn lift(value: i32) -> Self {
        value
    }

    fn plus_three(self) -> Self {
        self + 3
    }

    fn abs(self) -> Self {
        i32::abs(self)
    }
}

impl Numeric for i64 {
    fn lift(value: i32) -> Self {
        i64::from(value)
    }

    fn plus_three(self) -> Self {
        self + 3
    }

    fn abs(self) -> Self {
        i64::abs(self)
    }

    fn edges() -> Vec<Self> {
        vec![i64::from(i32::MAX) + 1, -(i64::from(i32::MAX) + 1)]
    }
}

impl Numeric for f32 {
    fn lift(value: i32) -> Self {
        value as f32
    }

    fn plus_three(self) -> Self {
        self + 3.0
    }

    fn abs(self) -> Self {
        f32::abs(self)
    }

    fn edges() -> Vec<Self> {
        vec![f32::NAN, -0.0, 1.5, f32::NAN, -1.5, 0.0]
    }
}

impl Numeric for f64 {
    fn lift(value: i32) -> Self {
        f64::from(value)
    }

    fn plus_three(self) -> Self {
        self + 3.0
    }

    fn abs(self) -> Self {
        f64::abs(self)
    }

    fn edges() -> Vec<Self> {
        vec![f64::NAN, -0.0, 2.25, f64::NAN, -2.25, 0.0]
    }
}

impl Numeric for Decimal {
    fn lift(value: i32) -> Self {
        Decimal::from(value)
    }

    fn plus_three(self) -> Self {
        self + Decimal::from(3)
    }

    fn abs(self) -> Self {
        Decimal::abs(&self)
    }

    fn edges() -> Vec<Self> {
        vec![Decimal::new(15, 1), Decimal::new(-25, 1), Decimal::new(150, 2)]
    }
}

fn scalar_baseline<N: Numeric>() -> Vec<N> {
    SKELETON
        .iter()
        .map(|value| N::lift(*value))
        .chain(N::edges())
        .collect()
}

fn nullable_baseline<N: Numeric>() -> Vec<Option<N>> {
    let mut items: Vec<Option<N>> = scalar_baseline::<N>().into_iter().map(Some).collect();
    items.insert(1, None);
    items.insert(6, None);
    items.push(None);
    items
}

macro_rules! matrix_element {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl MatrixElement for $ty {
                fn baseline() -> Vec<Self> {
                    scalar_baseline::<$ty>()
                }

                fn sample(value: i32) -> Self {
                    <$ty as Numeric>::lift(value)
                }

                fn shifted(&self) -> Self {
                    Numeric::plus_three(*self)
                }

                fn magnitude(&self) -> Self {
                    Numeric::abs(*self)
                }
            }

            impl MatrixElement for Option<$ty> {
                fn baseline() -> Vec<Self> {
                    nullable_baseline::<$ty>()
                }

                fn sample(value: i32) -> Self {
                    Some(<$ty as Numeric>::lift(value))
                }

                fn shifted(&self) -> Self {
                    self.map(Numeric::plus_three)
                }

                fn magnitude(&self) -> Self {
                    self.map(Numeric::abs)
                }
            }
        )+
    };
}

matrix_element!(i32, i64, f32, f64, Decimal);

/// 基线访问者：提供者借此把同一份基线数据装载进自己的后端。
pub trait BaselineVisitor {
    fn visit<T: MatrixElement>(&mut self, baseline: Vec<T>);
}

/// 以矩阵顺序遍历十种元素类型的基线。
pub fn visit_baselines<V: BaselineVisitor>(visitor: &mut V) {
    visitor.visit(<i32 as MatrixElement>::baseline());
    visitor.visit(<Option<i32> as MatrixElement>::baseline());
    visitor.visit(<i64 as MatrixElement>::baseline());
    visitor.visit(<Option<i64> as MatrixElement>::baseline());
    visitor.visit(<f32 as MatrixElement>::baseline());
    visitor.visit(<Option<f32> as MatrixElement>::baseline());
    visitor.visit(<f64 as MatrixElement>::baseline());
    visitor.visit(<Option<f64> as MatrixElement>::baseline());
    visitor.visit(<Decimal as MatrixElement>::baseline());
    visitor.visit(<Option<Decimal> as MatrixElement>::baseline());
}

struct MemoryRegistrar {
    builder: AdapterBuilder,
}

impl BaselineVisitor for MemoryRegistrar {
    fn visit<T: MatrixElement>(&mut self, baseline: Vec<T>) {
        let builder = std::mem::take(&mut self.builder);
        self.builder = builder.source(MemorySource::new(baseline));
    }
}

/// 为构建器登记全部基线的内存数据源。
pub fn register_baselines(builder: AdapterBuilder) -> AdapterBuilder {
    let mut registrar = MemoryRegistrar { builder };
    visit_baselines(&mut registrar);
    registrar.builder
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_contract<T: MatrixElement>() {
        let baseline = T::baseline();
        assert_eq!(baseline.len(), T::baseline().len(), "基线必须可重复");
        assert!(baseline.iter().any(|item| item.value_eq(&T::probe())));
        assert!(!baseline.iter().any(|item| item.value_eq(&T::absent())));
        assert!(
            baseline.iter().enumerate().any(|(i, a)| {
                baseline[i + 1..].iter().any(|b| a.value_eq(b))
            }),
            "{} 基线应包含重复键",
            T::TYPE_NAME
        );
    }

    #[test]
    fn every_matrix_type_honours_the_baseline_contract() {
        check_contract::<i32>();
        check_contract::<Option<i32>>();
        check_contract::<i64>();
        check_contract::<Option<i64>>();
        check_contract::<f32>();
        check_contract::<Option<f32>>();
        check_contract::<f64>();
        check_contract::<Option<f64>>();
        check_contract::<Decimal>();
        check_contract::<Option<Decimal>>();
    }

    #[test]
    fn nullable_baselines_contain_none_and_floats_contain_nan() {
        assert!(<Option<i64> as MatrixElement>::baseline().contains(&None));
        assert!(<f64 as MatrixElement>::baseline().iter().any(|v| v.is_nan()));
        assert_eq!(<Option<f32> as MatrixElement>::shifted(&None), None);
        assert_eq!(<i32 as MatrixElement>::sample(-4).magnitude(), 4);
    }

    #[test]
    fn decimal_baseline_has_equal_values_with_different_scales() {
        let baseline = <Decimal as MatrixElement>::baseline();
        let scales: Vec<u32> = baseline
            .iter()
            .filter(|value| **value == Decimal::new(15, 1))
            .map(Decimal::scale)
            .collect();
        assert_eq!(scales, vec![1, 2]);
    }
}
