// ==========================================
// 目录系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含导入逻辑
// ==========================================

pub mod departamento;
pub mod format;
pub mod marca;
pub mod pieza;

// 重导出核心类型
pub use departamento::{find_departamento, sale_unit_for, Departamento, DEPARTAMENTOS};
pub use format::{
    default_formats, is_custom_format, suggest_format_id, ExcelFormatTemplate, FieldType,
    FormatField, FormatKind,
};
pub use marca::{Marca, NewMarca};
pub use pieza::{
    ImportResult, PaginatedPiezas, PersistSummary, Pieza, PiezaDraft, ProductFilters,
};
