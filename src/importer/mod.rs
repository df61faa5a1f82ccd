// ==========================================
// 目录系统 - 导入层
// ==========================================
// 职责: 供应商价目表（Excel/CSV）→ 商品草稿
// 支持: .xlsx / .xls / .csv
// ==========================================

// 模块声明
pub mod catalog_importer;
pub mod catalog_importer_trait;
pub mod column_validator;
pub mod data_cleaner;
pub mod derivation;
pub mod error;
pub mod file_parser;
pub mod format_detector;
pub mod header;
pub mod row_processor;
pub mod synthesizer;

// 重导出核心类型
pub use catalog_importer::CatalogImporterImpl;
pub use data_cleaner::{DataCleaner as DataCleanerImpl, FieldPolicy, NA_SENTINEL};
pub use error::{ImportError, ImporterResult};
pub use file_parser::{CsvParser, ExcelParser, ParsedSheet, RawRow, UniversalFileParser};
pub use format_detector::{detect, Detection, DetectionRule};
pub use header::{normalize_header, CanonicalField, HeaderMap};
pub use row_processor::{process_rows, RowProcessorInput};

// 重导出 Trait 接口
pub use catalog_importer_trait::{CatalogImporter, DataCleaner, FileParser};
