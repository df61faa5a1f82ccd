// ==========================================
// 目录系统 - 表头标准化与同义列识别
// ==========================================
// 职责: 表头规范化（小写/去空白/去重音）+ 源列 → 标准字段
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 表头规范化：小写、去首尾及内部空白、折叠西语重音
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

// ==========================================
// CanonicalField - 标准字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    Clave,
    CodigoBarras,
    Codigo,
    Descripcion,
    Precio,
    PrecioPublico,
    Producto,
    Medida,
    Marca,
    AcabadoColor,
    Nombre,
}

impl CanonicalField {
    /// 规范化后的列名（用于错误提示）
    pub fn column_name(&self) -> &'static str {
        match self {
            CanonicalField::Clave => "clave",
            CanonicalField::CodigoBarras => "codigobarras",
            CanonicalField::Codigo => "codigo",
            CanonicalField::Descripcion => "descripcion",
            CanonicalField::Precio => "precio",
            CanonicalField::PrecioPublico => "preciopublico",
            CanonicalField::Producto => "producto",
            CanonicalField::Medida => "medida",
            CanonicalField::Marca => "marca",
            CanonicalField::AcabadoColor => "acabadocolor",
            CanonicalField::Nombre => "nombre",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

/// 规范化表头 → 标准字段（按顺序匹配，先匹配者胜）
///
/// 同义列: codigobarras / codigodebarras / codigo_barras 均归为 CodigoBarras，
/// preciopublico / precio_publico 归为 PrecioPublico
pub fn classify_header(normalized: &str) -> Option<CanonicalField> {
    let has = |needle: &str| normalized.contains(needle);

    if has("clave") {
        Some(CanonicalField::Clave)
    } else if has("codigo") && (has("barra") || has("bar")) {
        Some(CanonicalField::CodigoBarras)
    } else if has("codigo") {
        Some(CanonicalField::Codigo)
    } else if has("descripcion") {
        Some(CanonicalField::Descripcion)
    } else if has("precio") && !has("publico") {
        Some(CanonicalField::Precio)
    } else if has("precio") {
        Some(CanonicalField::PrecioPublico)
    } else if has("producto") {
        Some(CanonicalField::Producto)
    } else if has("medida") {
        Some(CanonicalField::Medida)
    } else if has("marca") {
        Some(CanonicalField::Marca)
    } else if has("acabado") || has("color") {
        Some(CanonicalField::AcabadoColor)
    } else if has("nombre") {
        Some(CanonicalField::Nombre)
    } else {
        None
    }
}

// ==========================================
// HeaderMap - 标准字段 → 源列
// ==========================================
// 每次导入由表头行构建一次
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    columns: HashMap<CanonicalField, String>,
}

impl HeaderMap {
    /// 由（已规范化的）表头构建；同一字段对应多列时取第一列
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut columns = HashMap::new();
        for header in headers {
            let normalized = normalize_header(header.as_ref());
            if let Some(field) = classify_header(&normalized) {
                columns.entry(field).or_insert(normalized);
            }
        }
        Self { columns }
    }

    pub fn column_for(&self, field: CanonicalField) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: CanonicalField) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn contains_all(&self, fields: &[CanonicalField]) -> bool {
        fields.iter().all(|f| self.contains(*f))
    }
}
