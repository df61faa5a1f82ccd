// ==========================================
// 目录系统 - 配置层
// ==========================================
// 职责: 导入参数读取（支持按部署覆写）+ 自定义格式模板存储
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod import_config_trait;
pub mod import_settings;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::{ConfigResult, ImportConfigReader};
pub use import_settings::{DepartmentKeywords, ImportSettings};
