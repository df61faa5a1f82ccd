// ==========================================
// 目录系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 错误文本面向最终用户（西班牙语）
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("Archivo no encontrado: {0}")]
    FileNotFound(String),

    #[error("Formato de archivo no soportado: {0} (solo .xlsx/.xls/.csv)")]
    UnsupportedFormat(String),

    #[error("Error al leer el archivo: {0}")]
    FileReadError(String),

    #[error("Error al leer el Excel: {0}")]
    ExcelParseError(String),

    #[error("Error al leer el CSV: {0}")]
    CsvParseError(String),

    // ===== 行级错误 =====
    #[error("{field} vacío o inválido (política estricta)")]
    StrictFieldViolation { row: usize, field: String },

    // ===== 落库错误 =====
    #[error("Error al guardar: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("Tiempo de espera agotado al guardar ({0} ms)")]
    PersistTimeout(u64),

    // ===== 通用错误 =====
    #[error("Error interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ImportError::FileNotFound(err.to_string()),
            _ => ImportError::FileReadError(err.to_string()),
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImporterResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_maps_to_file_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "sin archivo");
        assert!(matches!(ImportError::from(io), ImportError::FileNotFound(_)));
    }

    #[test]
    fn test_strict_violation_message_names_field() {
        let err = ImportError::StrictFieldViolation {
            row: 4,
            field: "PRECIO".to_string(),
        };
        assert_eq!(err.to_string(), "PRECIO vacío o inválido (política estricta)");
    }
}
