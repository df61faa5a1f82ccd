// ==========================================
// 目录系统 - SQLite 连接与建表
// ==========================================
// 目标:
// - 所有连接统一 PRAGMA（外键 + busy_timeout）
// - 建表幂等（CREATE TABLE IF NOT EXISTS），启动时执行
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL DEFAULT 'global',
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS marcas (
    id TEXT PRIMARY KEY,
    nombre TEXT NOT NULL UNIQUE,
    departamentos TEXT NOT NULL DEFAULT '[]',
    imagen TEXT,
    fecha_creacion TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS piezas (
    id TEXT PRIMARY KEY,
    nombre TEXT NOT NULL,
    descripcion TEXT,
    imagen TEXT NOT NULL,
    precio REAL NOT NULL DEFAULT 0,
    marca TEXT NOT NULL,
    codigo_barras TEXT,
    clave TEXT,
    departamento TEXT NOT NULL,
    unidad_venta TEXT NOT NULL,
    medida TEXT,
    precio_metro REAL,
    metros_por_caja REAL,
    fecha_creacion TEXT NOT NULL,
    fecha_actualizacion TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_piezas_marca ON piezas(marca);
CREATE INDEX IF NOT EXISTS idx_piezas_departamento ON piezas(departamento);
CREATE INDEX IF NOT EXISTS idx_piezas_codigo_barras ON piezas(codigo_barras);
CREATE INDEX IF NOT EXISTS idx_piezas_clave ON piezas(clave);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：foreign_keys 与 busy_timeout 都需要"每个连接"单独设置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（可重复执行）并登记 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![CURRENT_SCHEMA_VERSION, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 默认数据库路径: {data_dir}/catalogo-piezas/catalogo.db
pub fn default_db_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("catalogo-piezas").join("catalogo.db"))
}
