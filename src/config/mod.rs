// ==========================================
// 学术期刊审稿流程系统 - 配置层
// ==========================================
// 职责: 系统配置的读取与覆写
// 存储: config_kv 表(global scope)
// ==========================================

pub mod config_manager;

pub use config_manager::{default_db_path, ConfigManager};
