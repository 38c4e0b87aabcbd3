//! 把泛型用例展开到十种元素类型。
//!
//! `matrix_cases![a, b]` 生成 `&[TckCase]`：先 `a` 的十个实例，再 `b` 的十个实例，
//! 用例名形如 `a::<Option<f64>>`。

macro_rules! matrix_cases {
    ($($case:ident),+ $(,)?) => {
        &[$(
            $crate::matrix::matrix_cases!(@row $case, i32, "i32"),
            $crate::matrix::matrix_cases!(@row $case, Option<i32>, "Option<i32>"),
            $crate::matrix::matrix_cases!(@row $case, i64, "i64"),
            $crate::matrix::matrix_cases!(@row $case, Option<i64>, "Option<i64>"),
            $crate::matrix::matrix_cases!(@row $case, f32, "f32"),
            $crate::matrix::matrix_cases!(@row $case, Option<f32>, "Option<f32>"),
            $crate::matrix::matrix_cases!(@row $case, f64, "f64"),
            $crate::matrix::matrix_cases!(@row $case, Option<f64>, "Option<f64>"),
            $crate::matrix::matrix_cases!(@row $case, ::rust_decimal::Decimal, "Decimal"),
            $crate::matrix::matrix_cases!(@row $case, Option<::rust_decimal::Decimal>, "Option<Decimal>"),
        )+]
    };
    (@row $case:ident, $ty:ty, $name:literal) => {
        $crate::case::TckCase {
            name: concat!(stringify!($case), "::<", $name, ">"),
            test: $case::<$ty>,
        }
    };
}

pub(crate) use matrix_cases;
