// ==========================================
// 目录系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 五金/建材商品目录，按品牌导入供应商价目表（Excel/CSV）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 导入参数与自定义格式
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    ExcelFormatTemplate, FormatKind, ImportResult, Marca, NewMarca, PaginatedPiezas,
    PersistSummary, Pieza, PiezaDraft, ProductFilters,
};

// 导入器
pub use importer::{CatalogImporter, CatalogImporterImpl, ImportError};

// 仓储
pub use repository::{MarcaRepository, PiezaRepository, RepositoryError};

// 配置
pub use config::{ConfigManager, ImportSettings};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Catálogo de Piezas";
