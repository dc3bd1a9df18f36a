//! 协调器作业参数校验与动作查询
//!
//! 命令行入口见 `main.rs`，这里只暴露各命令的实现以便测试。

pub mod app;
