//! 内置提供者实现。
//!
//! 目前仅包含 [`memory::MemorySource`]：既是内存集合场景的生产实现，也是契约测试套件的参考提供者。

pub mod memory;
