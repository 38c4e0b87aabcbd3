//! 元素语义：为类型矩阵中的每种数值类型给出与同步参考实现一致的默认相等与排序规则。
//!
//! # 教案式说明
//! - **意图 (Why)**：`Contains` 与 `OrderBy` 的默认比较器必须在异步路径与同步参考路径上完全一致，
//!   否则等价性断言会在浮点 `NaN`、可空值等边界上出现假阳性；
//! - **逻辑 (How)**：整数与十进制沿用自然序；浮点数令 `NaN` 与自身相等并排在所有值之前，`-0.0 == 0.0`；
//!   `Option<T>` 令 `None` 与自身相等并排在所有 `Some` 之前（升序时空值优先）；
//! - **契约 (What)**：`value_eq` 与 `value_cmp` 必须相容，即 `value_cmp == Equal` 当且仅当 `value_eq`。

use std::cmp::Ordering;
use std::fmt::Debug;

use rust_decimal::Decimal;

/// 可参与异步查询的元素类型。
///
/// # 契约说明（What）
/// - `TYPE_NAME` 为稳定的人类可读类型名，用于日志字段与用例命名；
/// - `value_eq` 为默认相等比较器；`value_cmp` 为默认排序比较器，二者必须相容且 `value_cmp` 为全序。
pub trait QueryValue: Clone + Debug + Send + Sync + 'static {
    /// 稳定类型名。
    const TYPE_NAME: &'static str;

    /// 默认相等语义。
    fn value_eq(&self, other: &Self) -> bool;

    /// 默认排序语义。
    fn value_cmp(&self, other: &Self) -> Ordering;
}

macro_rules! ordinal_value {
    ($($ty:ty => $name:literal),+ $(,)?) => {
        $(
            impl QueryValue for $ty {
                const TYPE_NAME: &'static str = $name;

                fn value_eq(&self, other: &Self) -> bool {
                    self == other
                }

                fn value_cmp(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }
            }
        )+
    };
}

ordinal_value!(i32 => "i32", i64 => "i64", Decimal => "Decimal");

macro_rules! float_value {
    ($($ty:ty => $name:literal),+ $(,)?) => {
        $(
            impl QueryValue for $ty {
                const TYPE_NAME: &'static str = $name;

                fn value_eq(&self, other: &Self) -> bool {
                    (self.is_nan() && other.is_nan()) || self == other
                }

                fn value_cmp(&self, other: &Self) -> Ordering {
                    match (self.is_nan(), other.is_nan()) {
                        (true, true) => Ordering::Equal,
                        (true, false) => Ordering::Less,
                        (false, true) => Ordering::Greater,
                        (false, false) => self.partial_cmp(other).unwrap_or(Ordering::Equal),
                    }
                }
            }
        )+
    };
}

float_value!(f32 => "f32", f64 => "f64");

macro_rules! nullable_value {
    ($($ty:ty => $name:literal),+ $(,)?) => {
        $(
            impl QueryValue for Option<$ty> {
                const TYPE_NAME: &'static str = $name;

                fn value_eq(&self, other: &Self) -> bool {
                    match (self, other) {
                        (None, None) => true,
                        (Some(left), Some(right)) => left.value_eq(right),
                        _ => false,
                    }
                }

                fn value_cmp(&self, other: &Self) -> Ordering {
                    match (self, other) {
                        (None, None) => Ordering::Equal,
                        (None, Some(_)) => Ordering::Less,
                        (Some(_), None) => Ordering::Greater,
                        (Some(left), Some(right)) => left.value_cmp(right),
                    }
                }
            }
        )+
    };
}

nullable_value!(
    i32 => "Option<i32>",
    i64 => "Option<i64>",
    f32 => "Option<f32>",
    f64 => "Option<f64>",
    Decimal => "Option<Decimal>",
);

/// 按默认语义比较两个序列是否逐元素相等（顺序敏感）。
pub fn sequence_eq<T: QueryValue>(left: &[T], right: &[T]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(lhs, rhs)| lhs.value_eq(rhs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_equals_itself_and_sorts_first() {
        assert!(f64::NAN.value_eq(&f64::NAN));
        assert_eq!(f64::NAN.value_cmp(&f64::NEG_INFINITY), Ordering::Less);
        assert_eq!(1.5f32.value_cmp(&f32::NAN), Ordering::Greater);
        assert!((-0.0f64).value_eq(&0.0));
        assert_eq!((-0.0f32).value_cmp(&0.0), Ordering::Equal);
    }

    #[test]
    fn none_sorts_before_some_and_equals_none() {
        assert!(None::<i32>.value_eq(&None));
        assert!(!None::<i32>.value_eq(&Some(0)));
        assert_eq!(None::<i64>.value_cmp(&Some(i64::MIN)), Ordering::Less);
        assert_eq!(Some(f64::NAN).value_cmp(&None), Ordering::Greater);
        assert!(Some(f32::NAN).value_eq(&Some(f32::NAN)));
    }

    #[test]
    fn decimal_uses_numeric_equality() {
        let scaled = Decimal::new(500, 2);
        let plain = Decimal::new(5, 0);
        assert!(scaled.value_eq(&plain), "5.00 与 5 数值相等");
        assert_eq!(Decimal::new(-1, 1).value_cmp(&plain), Ordering::Less);
    }

    #[test]
    fn sequence_eq_is_order_sensitive() {
        assert!(sequence_eq(&[Some(1), None], &[Some(1), None]));
        assert!(!sequence_eq(&[None, Some(1)], &[Some(1), None]));
        assert!(!sequence_eq(&[1, 2], &[1]));
        assert!(sequence_eq(&[f64::NAN], &[f64::NAN]));
    }

    #[test]
    fn type_names_are_stable() {
        assert_eq!(<Option<Decimal> as QueryValue>::TYPE_NAME, "Option<Decimal>");
        assert_eq!(<f32 as QueryValue>::TYPE_NAME, "f32");
    }
}
