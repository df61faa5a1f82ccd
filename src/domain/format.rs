// ==========================================
// 目录系统 - 导入格式（模板）领域模型
// ==========================================
// 职责: 内置格式种类、字段映射模板（按品牌持久化的 JSON 结构）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// FormatKind - 导入格式种类
// ==========================================
// 每次导入只检测一次，整批行共用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormatKind {
    Generic, // 五金通用（ferretería）
    Mesh,    // 建筑网材（mallas）
    BrandA,  // URREA 6 列格式
    BrandB,  // TRUPER 3 列格式
}

impl FormatKind {
    /// 面向用户的格式名
    pub fn label(&self) -> &'static str {
        match self {
            FormatKind::Generic => "Ferretería",
            FormatKind::Mesh => "MALLAS",
            FormatKind::BrandA => "URREA",
            FormatKind::BrandB => "TRUPER",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 字段映射模板
// ==========================================
// 持久化格式: [{id, name, description, color, fields:[...], marcaId, isCustom}]

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Select,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>, // 仅 select 类型
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcelFormatTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub fields: Vec<FormatField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marca_id: Option<String>,
    #[serde(default)]
    pub is_custom: bool,
}

/// 内置模板 id
pub const BUILTIN_FORMAT_IDS: &[&str] = &["urrea", "truper", "mallas"];

fn field(name: &str, label: &str, field_type: FieldType) -> FormatField {
    FormatField {
        name: name.to_string(),
        label: label.to_string(),
        field_type,
        required: true,
        options: None,
    }
}

/// 内置的品牌格式模板（URREA / TRUPER / MALLAS）
pub fn default_formats() -> Vec<ExcelFormatTemplate> {
    vec![
        ExcelFormatTemplate {
            id: "urrea".to_string(),
            name: "URREA".to_string(),
            description: "Formato específico para productos URREA con 6 columnas".to_string(),
            color: "orange".to_string(),
            fields: vec![
                field("codigoBarras", "CÓDIGO DE BARRAS", FieldType::Number),
                field("clave", "CLAVE", FieldType::Text),
                field("descripcion", "DESCRIPCIÓN", FieldType::Text),
                field("marca", "MARCA", FieldType::Text),
                field("acabadoColor", "ACABADO/COLOR", FieldType::Text),
                field("precio", "PRECIO", FieldType::Number),
            ],
            marca_id: None,
            is_custom: false,
        },
        ExcelFormatTemplate {
            id: "truper".to_string(),
            name: "TRUPER".to_string(),
            description: "Formato específico para productos TRUPER con 3 columnas".to_string(),
            color: "blue".to_string(),
            fields: vec![
                field("codigo", "CÓDIGO", FieldType::Text),
                field("nombre", "NOMBRE", FieldType::Text),
                field("precioPublico", "PRECIO PÚBLICO", FieldType::Number),
            ],
            marca_id: None,
            is_custom: false,
        },
        ExcelFormatTemplate {
            id: "mallas".to_string(),
            name: "MALLAS".to_string(),
            description: "Formato para productos de mallas y construcción con 3 columnas"
                .to_string(),
            color: "green".to_string(),
            fields: vec![
                field("producto", "PRODUCTO", FieldType::Text),
                field("medida", "MEDIDA", FieldType::Text),
                field("precio", "PRECIO", FieldType::Number),
            ],
            marca_id: None,
            is_custom: false,
        },
    ]
}

/// 根据品牌名预选内置模板
pub fn suggest_format_id(marca_nombre: &str) -> Option<&'static str> {
    let lower = marca_nombre.to_lowercase();
    if lower.contains("truper") {
        Some("truper")
    } else if lower.contains("urrea") {
        Some("urrea")
    } else if ["malla", "construccion", "material"]
        .iter()
        .any(|k| lower.contains(k))
    {
        Some("mallas")
    } else {
        None
    }
}

/// 非内置模板即视为自定义（可编辑/删除）
pub fn is_custom_format(format_id: &str) -> bool {
    !BUILTIN_FORMAT_IDS.contains(&format_id)
}
