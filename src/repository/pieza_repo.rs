// ==========================================
// 目录系统 - 商品仓储
// ==========================================
// 职责: piezas 表 CRUD + 按编码查找 + 条件分页查询
// 红线: 不含业务逻辑，只负责数据访问
// 约束: 所有查询参数化
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::pieza::{PaginatedPiezas, Pieza, PiezaDraft, ProductFilters};
use crate::repository::catalog_import_repo::CatalogImportRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const PIEZA_COLUMNS: &str = "id, nombre, descripcion, imagen, precio, marca, codigo_barras, clave, \
     departamento, unidad_venta, medida, precio_metro, metros_por_caja, \
     fecha_creacion, fecha_actualizacion";

pub struct PiezaRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PiezaRepository {
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

    /// 由草稿新建商品（分配 uuid 与时间戳，草稿 id 丢弃）
    pub fn create(&self, draft: &PiezaDraft) -> RepositoryResult<Pieza> {
        validate_draft(draft)?;

        let now = Utc::now();
        let pieza = Pieza {
            id: Uuid::new_v4().to_string(),
            nombre: draft.nombre.clone(),
            descripcion: draft.descripcion.clone(),
            imagen: draft.imagen.clone(),
            precio: draft.precio,
            marca: draft.marca.clone(),
            codigo_barras: draft.codigo_barras.clone(),
            clave: draft.clave.clone(),
            departamento: draft.departamento.clone(),
            unidad_venta: draft.unidad_venta.clone(),
            medida: draft.medida.clone(),
            precio_metro: draft.precio_metro,
            metros_por_caja: draft.metros_por_caja,
            fecha_creacion: now,
            fecha_actualizacion: now,
        };

        let conn = self.get_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO piezas ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                PIEZA_COLUMNS
            ),
            params![
                pieza.id,
                pieza.nombre,
                pieza.descripcion,
                pieza.imagen,
                pieza.precio,
                pieza.marca,
                pieza.codigo_barras,
                pieza.clave,
                pieza.departamento,
                pieza.unidad_venta,
                pieza.medida,
                pieza.precio_metro,
                pieza.metros_por_caja,
                pieza.fecha_creacion.to_rfc3339(),
                pieza.fecha_actualizacion.to_rfc3339(),
            ],
        )?;

        Ok(pieza)
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Pieza>> {
        let conn = self.get_conn()?;
        let pieza = conn
            .query_row(
                &format!("SELECT {} FROM piezas WHERE id = ?1", PIEZA_COLUMNS),
                params![id],
                read_pieza_row,
            )
            .optional()?;
        Ok(pieza)
    }

    /// 按条码或 clave 精确查找（扫码枪场景）
    pub fn search_by_code(&self, code: &str) -> RepositoryResult<Option<Pieza>> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }

        let conn = self.get_conn()?;
        let pieza = conn
            .query_row(
                &format!(
                    "SELECT {} FROM piezas WHERE codigo_barras = ?1 OR clave = ?1
                     ORDER BY CASE WHEN codigo_barras = ?1 THEN 0 ELSE 1 END, fecha_creacion
                     LIMIT 1",
                    PIEZA_COLUMNS
                ),
                params![code],
                read_pieza_row,
            )
            .optional()?;
        Ok(pieza)
    }

    /// 条件分页查询
    ///
    /// # 参数
    /// - page: 页码（从 1 开始，小于 1 按 1 处理）
    /// - limit: 每页条数（必须大于 0）
    pub fn list_paginated(
        &self,
        page: usize,
        limit: usize,
        filters: &ProductFilters,
    ) -> RepositoryResult<PaginatedPiezas> {
        if limit == 0 {
            return Err(RepositoryError::ValidationError(
                "el tamaño de página debe ser mayor que 0".to_string(),
            ));
        }
        let offset = (page.max(1) - 1) * limit;

        let (where_sql, mut values) = build_filter_clause(filters);
        let conn = self.get_conn()?;

        let total_count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM piezas{}", where_sql),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;

        values.push(Value::Integer(limit as i64));
        values.push(Value::Integer(offset as i64));
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM piezas{} ORDER BY nombre COLLATE NOCASE, id LIMIT ? OFFSET ?",
            PIEZA_COLUMNS, where_sql
        ))?;
        let data = stmt
            .query_map(params_from_iter(values.iter()), read_pieza_row)?
            .collect::<rusqlite::Result<Vec<Pieza>>>()?;

        let total_count = total_count.max(0) as usize;
        tracing::debug!(page, limit, returned = data.len(), total_count, "consulta paginada");

        Ok(PaginatedPiezas {
            has_more: offset + data.len() < total_count,
            data,
            total_count,
        })
    }

    /// 用草稿内容覆盖已有商品（id 与创建时间不变）
    pub fn update(&self, id: &str, draft: &PiezaDraft) -> RepositoryResult<Pieza> {
        validate_draft(draft)?;

        {
            let conn = self.get_conn()?;
            let affected = conn.execute(
                "UPDATE piezas SET
                    nombre = ?2, descripcion = ?3, imagen = ?4, precio = ?5, marca = ?6,
                    codigo_barras = ?7, clave = ?8, departamento = ?9, unidad_venta = ?10,
                    medida = ?11, precio_metro = ?12, metros_por_caja = ?13,
                    fecha_actualizacion = ?14
                 WHERE id = ?1",
                params![
                    id,
                    draft.nombre,
                    draft.descripcion,
                    draft.imagen,
                    draft.precio,
                    draft.marca,
                    draft.codigo_barras,
                    draft.clave,
                    draft.departamento,
                    draft.unidad_venta,
                    draft.medida,
                    draft.precio_metro,
                    draft.metros_por_caja,
                    Utc::now().to_rfc3339(),
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
        let affected = conn.execute("DELETE FROM piezas WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

impl CatalogImportRepository for PiezaRepository {
    fn insert_draft(&self, draft: &PiezaDraft) -> RepositoryResult<Pieza> {
        self.create(draft)
    }
}

fn validate_draft(draft: &PiezaDraft) -> RepositoryResult<()> {
    if draft.nombre.trim().is_empty() {
        return Err(RepositoryError::ValidationError(
            "el nombre de la pieza es obligatorio".to_string(),
        ));
    }
    if !draft.precio.is_finite() || draft.precio < 0.0 {
        return Err(RepositoryError::FieldValueError {
            field: "precio".to_string(),
            message: format!("{} no es un precio válido", draft.precio),
        });
    }
    Ok(())
}

fn not_found(id: &str) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "Pieza".to_string(),
        id: id.to_string(),
    }
}

/// 由过滤条件生成 WHERE 子句（位置参数）
fn build_filter_clause(filters: &ProductFilters) -> (String, Vec<Value>) {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    let non_blank = |s: &Option<String>| {
        s.as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    if let Some(marca) = non_blank(&filters.marca) {
        clauses.push("marca = ?");
        values.push(Value::Text(marca));
    }
    if let Some(departamento) = non_blank(&filters.departamento) {
        clauses.push("departamento = ?");
        values.push(Value::Text(departamento));
    }
    if let Some(search) = non_blank(&filters.search) {
        clauses.push(
            "(nombre LIKE ? OR descripcion LIKE ? OR clave LIKE ? OR codigo_barras LIKE ?)",
        );
        let pattern = format!("%{}%", search);
        for _ in 0..4 {
            values.push(Value::Text(pattern.clone()));
        }
    }
    if let Some(min) = filters.precio_min {
        clauses.push("precio >= ?");
        values.push(Value::Real(min));
    }
    if let Some(max) = filters.precio_max {
        clauses.push("precio <= ?");
        values.push(Value::Real(max));
    }

    if clauses.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), values)
    }
}

fn read_pieza_row(row: &Row<'_>) -> rusqlite::Result<Pieza> {
    Ok(Pieza {
        id: row.get(0)?,
        nombre: row.get(1)?,
        descripcion: row.get(2)?,
        imagen: row.get(3)?,
        precio: row.get(4)?,
        marca: row.get(5)?,
        codigo_barras: row.get(6)?,
        clave: row.get(7)?,
        departamento: row.get(8)?,
        unidad_venta: row.get(9)?,
        medida: row.get(10)?,
        precio_metro: row.get(11)?,
        metros_por_caja: row.get(12)?,
        fecha_creacion: row.get(13)?,
        fecha_actualizacion: row.get(14)?,
    })
}
