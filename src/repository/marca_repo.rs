// ==========================================
// 目录系统 - 品牌仓储
// ==========================================
// 职责: marcas 表 CRUD
// 红线: 不含业务逻辑，只负责数据访问
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::marca::{Marca, NewMarca};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const MARCA_COLUMNS: &str = "id, nombre, departamentos, imagen, fecha_creacion";

pub struct MarcaRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MarcaRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn validate(input: &NewMarca) -> RepositoryResult<()> {
        if input.nombre.trim().is_empty() {
            return Err(RepositoryError::ValidationError(
                "el nombre de la marca es obligatorio".to_string(),
            ));
        }
        Ok(())
    }

    /// 新建品牌（nombre 唯一）
    pub fn create(&self, input: &NewMarca) -> RepositoryResult<Marca> {
        Self::validate(input)?;

        let marca = Marca {
            id: Uuid::new_v4().to_string(),
            nombre: input.nombre.trim().to_string(),
            departamentos: input.departamentos.clone(),
            imagen: input.imagen.clone(),
            fecha_creacion: Utc::now(),
        };

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO marcas (id, nombre, departamentos, imagen, fecha_creacion)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                marca.id,
                marca.nombre,
                serde_json::to_string(&marca.departamentos)?,
                marca.imagen,
                marca.fecha_creacion.to_rfc3339(),
            ],
        )?;

        tracing::debug!(marca_id = %marca.id, nombre = %marca.nombre, "marca creada");
        Ok(marca)
    }

    /// 全部品牌（按名称排序）
    pub fn list(&self) -> RepositoryResult<Vec<Marca>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM marcas ORDER BY nombre COLLATE NOCASE",
            MARCA_COLUMNS
        ))?;

        let rows = stmt.query_map([], read_marca_row)?;
        let mut marcas = Vec::new();
        for row in rows {
            marcas.push(row?.into_marca()?);
        }
        Ok(marcas)
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Marca>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM marcas WHERE id = ?1", MARCA_COLUMNS),
                params![id],
                read_marca_row,
            )
            .optional()?;
        row.map(MarcaRow::into_marca).transpose()
    }

    pub fn update(&self, id: &str, input: &NewMarca) -> RepositoryResult<Marca> {
        Self::validate(input)?;

        {
            let conn = self.get_conn()?;
            let affected = conn.execute(
                "UPDATE marcas SET nombre = ?2, departamentos = ?3, imagen = ?4 WHERE id = ?1",
                params![
                    id,
                    input.nombre.trim(),
                    serde_json::to_string(&input.departamentos)?,
                    input.imagen,
                ],
            )?;
            if affected == 0 {
                return Err(not_found(id));
            }
        }

        self.find_by_id(id)?.ok_or_else(|| not_found(id))
    }

    pub fn delete(&self, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM marcas WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn not_found(id: &str) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "Marca".to_string(),
        id: id.to_string(),
    }
}

// departamentos 以 JSON 文本存储，行映射后再解析
struct MarcaRow {
    id: String,
    nombre: String,
    departamentos: String,
    imagen: Option<String>,
    fecha_creacion: DateTime<Utc>,
}

impl MarcaRow {
    fn into_marca(self) -> RepositoryResult<Marca> {
        Ok(Marca {
            id: self.id,
            nombre: self.nombre,
            departamentos: serde_json::from_str(&self.departamentos)?,
            imagen: self.imagen,
            fecha_creacion: self.fecha_creacion,
        })
    }
}

fn read_marca_row(row: &Row<'_>) -> rusqlite::Result<MarcaRow> {
    Ok(MarcaRow {
        id: row.get(0)?,
        nombre: row.get(1)?,
        departamentos: row.get(2)?,
        imagen: row.get(3)?,
        fecha_creacion: row.get(4)?,
    })
}
