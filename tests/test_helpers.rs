// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库 / 临时 CSV 文件 / 共享连接
// ==========================================

#![allow(dead_code)]

use catalogo_piezas::db::{init_schema, open_sqlite_connection};
use rusqlite::Connection;
use std::error::Error;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("ruta temporal no UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试库并包装为共享连接
pub fn shared_connection(db_path: &str) -> Arc<Mutex<Connection>> {
    let conn = open_sqlite_connection(db_path).expect("abrir base de datos de prueba");
    Arc::new(Mutex::new(conn))
}

/// 写入临时 CSV 文件（保留 .csv 后缀）
pub fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".csv").expect("crear CSV temporal");
    file.write_all(content.as_bytes()).expect("escribir CSV");
    file.flush().expect("flush CSV");
    file
}
