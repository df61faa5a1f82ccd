// ==========================================
// 目录系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("Registro no encontrado: {entity} con id={id}")]
    NotFound { entity: String, id: String },

    #[error("No se pudo abrir la base de datos: {0}")]
    DatabaseConnectionError(String),

    #[error("No se pudo obtener el candado de la base de datos: {0}")]
    LockError(String),

    #[error("Error en la consulta: {0}")]
    DatabaseQueryError(String),

    #[error("Registro duplicado: {0}")]
    UniqueConstraintViolation(String),

    #[error("Referencia inválida: {0}")]
    ForeignKeyViolation(String),

    // ===== 数据质量错误 =====
    #[error("Datos inválidos: {0}")]
    ValidationError(String),

    #[error("Valor inválido en {field}: {message}")]
    FieldValueError { field: String, message: String },

    // ===== 通用错误 =====
    #[error("Error interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "desconocido".to_string(),
                id: "desconocido".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

// JSON 列（marcas.departamentos）
impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::FieldValueError {
            field: "json".to_string(),
            message: err.to_string(),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
