// ==========================================
// 目录系统 - 商品（pieza）领域模型
// ==========================================
// 职责: 商品实体、导入草稿、导入结果、查询过滤条件
// 用途: 导入层生成 PiezaDraft，仓储层落库为 Pieza
// ==========================================

use crate::domain::format::FormatKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Pieza - 已落库商品
// ==========================================
// 对齐: piezas 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pieza {
    pub id: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub imagen: String,
    pub precio: f64, // 墨西哥比索
    pub marca: String,
    pub codigo_barras: Option<String>,
    pub clave: Option<String>,
    pub departamento: String,
    pub unidad_venta: String,

    // ===== 瓷砖专用字段 =====
    pub medida: Option<String>,          // 规格（如 "30x30"）
    pub precio_metro: Option<f64>,       // 每平方米价格
    pub metros_por_caja: Option<f64>,    // 每箱平方米数

    // ===== 审计字段 =====
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
}

// ==========================================
// PiezaDraft - 导入草稿
// ==========================================
// 生命周期: 由合成器创建后不再修改，由调用方逐条落库
// id 仅在本次导入内唯一，落库时由仓储分配正式主键
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PiezaDraft {
    pub id: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub imagen: String,
    pub precio: f64,
    pub marca: String,
    pub codigo_barras: Option<String>,
    pub clave: Option<String>,
    pub departamento: String,
    pub unidad_venta: String,
    pub medida: Option<String>,
    pub precio_metro: Option<f64>,
    pub metros_por_caja: Option<f64>,
}

// ==========================================
// ImportResult - 导入结果
// ==========================================
// success = false 仅在文件不可读/为空或必填列缺失时出现；
// 行级问题降级为 warnings（默认值替换）或 errors（该行跳过）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<PiezaDraft>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ImportResult {
    /// 文件级失败（不返回任何草稿）
    pub fn failure(errors: Vec<String>) -> Self {
        Self {
            success: false,
            errors,
            ..Default::default()
        }
    }

    pub fn imported_count(&self) -> usize {
        self.data.len()
    }
}

// ==========================================
// PersistSummary - 草稿落库汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistSummary {
    pub inserted: Vec<Pieza>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl PersistSummary {
    pub fn inserted_count(&self) -> usize {
        self.inserted.len()
    }
}

// ==========================================
// ProductFilters - 商品分页查询条件
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilters {
    pub marca: Option<String>,
    pub departamento: Option<String>,
    pub search: Option<String>, // 模糊匹配 nombre / descripcion / clave / codigo_barras
    pub precio_min: Option<f64>,
    pub precio_max: Option<f64>,
}

/// 分页查询结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedPiezas {
    pub data: Vec<Pieza>,
    pub total_count: usize,
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_result_omits_empty_arrays() {
        let result = ImportResult::failure(vec!["archivo vacío".to_string()]);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
        assert!(json.get("warnings").is_none());
        assert_eq!(json["errors"][0], "archivo vacío");
    }

    #[test]
    fn test_draft_serializes_camel_case() {
        let draft = PiezaDraft {
            id: "import_1_0".to_string(),
            nombre: "Martillo".to_string(),
            descripcion: None,
            imagen: "img".to_string(),
            precio: 150.0,
            marca: "URREA".to_string(),
            codigo_barras: Some("7501234567890".to_string()),
            clave: Some("MART-01".to_string()),
            departamento: "ferreteria".to_string(),
            unidad_venta: "Pieza".to_string(),
            medida: None,
            precio_metro: None,
            metros_por_caja: None,
        };
        let json = serde_json::to_value(&draft).unwrap();

        assert_eq!(json["codigoBarras"], "7501234567890");
        assert_eq!(json["unidadVenta"], "Pieza");
    }
}
