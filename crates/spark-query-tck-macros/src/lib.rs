//! # spark-query-tck-macros
//!
//! 提供 `query_tck` 属性宏：为标注的模块注入 `spark-query-tck` 套件的 `#[test]` 入口。
//! 提供者仓库只需声明适配器工厂与目标套件，即可获得整张“算子 × 元素类型 × 重载形态”矩阵的回归测试。
//! 宏的实现分为三个阶段：解析 `factory = ...` 与 `suites(...)` 参数、确定套件列表、把测试函数植入模块。

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Expr, Ident, ItemMod, Meta, Path, Result as SynResult, Token, parse_macro_input};

/// 已知套件，顺序即默认展开顺序。
const KNOWN_SUITES: [&str; 4] = ["contains", "order_by", "order_by_descending", "then_by"];

/// 解析后的宏参数。
struct TckArgs {
    factory: Path,
    suites: Vec<Ident>,
}

#[proc_macro_attribute]
/// 教案级说明：
/// - **意图（Why）**：契约测试的入口函数需要一个适配器工厂，手写 `#[test]` 样板容易遗漏套件或传错工厂；
/// - **逻辑（How）**：先解析属性参数（见 `parse_args`），再调用 `inject_tests` 把测试函数追加到模块；
///   解析失败时生成指向出错位置的编译期诊断；
/// - **契约（What）**：
///   - `factory = <路径>` 必填，路径需指向实现 `AdapterFactory` 的值（通常是 `async fn`）；
///   - `suites(...)` 可选，缺省时展开全部套件；未知套件名在编译期报错；
///   - 每个套件生成一个名为 `<套件>_suite` 的测试函数。
pub fn query_tck(attr: TokenStream, item: TokenStream) -> TokenStream {
    let module = parse_macro_input!(item as ItemMod);

    match parse_args(attr).and_then(|args| inject_tests(args, module)) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// 教案级说明：
/// - **意图**：从 `factory = path, suites(a, b)` 中取出工厂路径与套件列表；
/// - **逻辑**：以逗号分隔解析为 `Meta` 序列，`NameValue` 对应工厂，`List` 对应套件；
/// - **契约**：缺少 `factory` 或出现未知键时返回 `syn::Error`。
fn parse_args(attr: TokenStream) -> SynResult<TckArgs> {
    let metas = syn::parse::Parser::parse(Punctuated::<Meta, Token![,]>::parse_terminated, attr)?;

    let mut factory = None;
    let mut suites = Vec::new();
    for meta in metas {
        match meta {
            Meta::NameValue(pair) if pair.path.is_ident("factory") => match pair.value {
                Expr::Path(expr) => factory = Some(expr.path),
                other => {
                    return Err(syn::Error::new(other.span(), "factory 需为函数或常量路径"));
                }
            },
            Meta::List(list) if list.path.is_ident("suites") => {
                let nested: Punctuated<Meta, Token![,]> =
                    list.parse_args_with(Punctuated::parse_terminated)?;
                for meta in nested {
                    suites.push(suite_ident(meta)?);
                }
            }
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "query_tck 属性仅支持 factory = ... 与 suites(...)",
                ));
            }
        }
    }

    let factory = factory.ok_or_else(|| {
        syn::Error::new(Span::call_site(), "query_tck 需要 factory = <适配器工厂路径>")
    })?;
    if suites.is_empty() {
        suites = default_suite_idents();
    }
    Ok(TckArgs { factory, suites })
}

fn suite_ident(meta: Meta) -> SynResult<Ident> {
    match meta {
        Meta::Path(path) => match path.get_ident() {
            Some(ident) if KNOWN_SUITES.contains(&ident.to_string().as_str()) => Ok(ident.clone()),
            Some(ident) => Err(syn::Error::new(
                ident.span(),
                format!("未知套件 `{ident}`，可选：{}", KNOWN_SUITES.join(", ")),
            )),
            None => Err(syn::Error::new(path.span(), "suite 需为标识符")),
        },
        other => Err(syn::Error::new(other.span(), "suites(...) 仅接受标识符")),
    }
}

fn default_suite_idents() -> Vec<Ident> {
    KNOWN_SUITES
        .iter()
        .map(|name| Ident::new(name, Span::call_site()))
        .collect()
}

/// 教案级说明：
/// - **意图**：为每个套件生成 `#[test] fn <套件>_suite()`，调用 `spark_query_tck::run_<套件>_suite(&factory)`；
/// - **逻辑**：内联模块直接追加条目；`mod foo;` 形式的文件模块无法追加，改为重新拼装内联模块；
/// - **契约**：保留模块原有的属性、可见性与条目。
fn inject_tests(args: TckArgs, mut module: ItemMod) -> SynResult<proc_macro2::TokenStream> {
    let factory = &args.factory;
    let mut generated = Vec::new();
    for suite in &args.suites {
        let test_ident = format_ident!("{}_suite", suite);
        let run_fn = format_ident!("run_{}_suite", suite);
        let item: syn::Item = syn::parse_quote! {
            #[test]
            fn #test_ident() {
                ::spark_query_tck::#run_fn(&#factory);
            }
        };
        generated.push(item);
    }

    if let Some((_, ref mut items)) = module.content {
        items.extend(generated);
        Ok(quote! { #module })
    } else {
        let ident = &module.ident;
        let vis = &module.vis;
        let attrs = &module.attrs;
        Ok(quote! {
            #(#attrs)*
            #vis mod #ident {
                #(#generated)*
            }
        })
    }
}
