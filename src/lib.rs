//! synckit - 客户端同步与缓存层
//!
//! 模块结构：
//! - models: 纯数据结构（ScopedCache, ContentLru, FileTree, PaneTree）
//! - kernel: 状态、Action/Effect、reducer 与 Store
//! - kernel::services: 端口与适配器（持久化、运行时、事件流、文件监听）
//! - logging: tracing 初始化

pub mod kernel;
pub mod logging;
pub mod models;
