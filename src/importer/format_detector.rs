// ==========================================
// 目录系统 - 格式识别
// ==========================================
// 职责: 由表头 + 首个数据行 + 目标品牌判定模板类型
// 规则: 有序规则表，先匹配者胜；全部未命中回退 Generic
// 说明: 纯函数，不失败，每次导入仅在首行上执行一次
// ==========================================

use crate::domain::format::FormatKind;
use crate::importer::file_parser::RawRow;
use crate::importer::header::{CanonicalField, HeaderMap};

/// 首行文本中出现即判定为网类商品的关键字
pub const MESH_KEYWORDS: &[&str] = &["malla", "ciclón", "ciclon", "gallinero", "alambre", "cerca"];

/// 识别依据（规则表条目）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionRule {
    BrandBColumns,
    BrandAColumns,
    MeshColumns,
    GenericColumns,
    MeshKeywords,
}

/// 识别结果；matched_rule = None 表示无任何依据的回退
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub kind: FormatKind,
    pub matched_rule: Option<DetectionRule>,
}

impl Detection {
    pub fn is_fallback(&self) -> bool {
        self.matched_rule.is_none()
    }
}

struct DetectionInput<'a> {
    headers: &'a HeaderMap,
    first_row: Option<&'a RawRow>,
    brand: String,
}

type Predicate = fn(&DetectionInput<'_>) -> bool;

// 规则表（顺序即优先级）
const DETECTION_RULES: &[(DetectionRule, Predicate, FormatKind)] = &[
    (DetectionRule::BrandBColumns, is_brand_b, FormatKind::BrandB),
    (DetectionRule::BrandAColumns, is_brand_a, FormatKind::BrandA),
    (DetectionRule::MeshColumns, has_mesh_columns, FormatKind::Mesh),
    (DetectionRule::GenericColumns, has_generic_columns, FormatKind::Generic),
    (DetectionRule::MeshKeywords, mentions_mesh, FormatKind::Mesh),
];

fn is_brand_b(input: &DetectionInput<'_>) -> bool {
    input.brand.contains("truper")
        && input.headers.contains_all(&[
            CanonicalField::Codigo,
            CanonicalField::Nombre,
            CanonicalField::PrecioPublico,
        ])
}

fn is_brand_a(input: &DetectionInput<'_>) -> bool {
    input.brand.contains("urrea")
        && input.headers.contains_all(&[
            CanonicalField::CodigoBarras,
            CanonicalField::Marca,
            CanonicalField::AcabadoColor,
        ])
}

fn has_mesh_columns(input: &DetectionInput<'_>) -> bool {
    input
        .headers
        .contains_all(&[CanonicalField::Producto, CanonicalField::Medida])
}

fn has_generic_columns(input: &DetectionInput<'_>) -> bool {
    input
        .headers
        .contains_all(&[CanonicalField::Clave, CanonicalField::CodigoBarras])
}

fn mentions_mesh(input: &DetectionInput<'_>) -> bool {
    let row = match input.first_row {
        Some(row) => row,
        None => return false,
    };

    let text = [
        CanonicalField::Producto,
        CanonicalField::Descripcion,
        CanonicalField::Nombre,
    ]
    .iter()
    .filter_map(|field| input.headers.column_for(*field))
    .filter_map(|column| row.get(column))
    .collect::<Vec<&str>>()
    .join(" ")
    .to_lowercase();

    MESH_KEYWORDS.iter().any(|k| text.contains(k))
}

/// 判定模板类型
pub fn detect(headers: &HeaderMap, first_row: Option<&RawRow>, target_brand: &str) -> Detection {
    let input = DetectionInput {
        headers,
        first_row,
        brand: target_brand.to_lowercase(),
    };

    DETECTION_RULES
        .iter()
        .find(|(_, predicate, _)| predicate(&input))
        .map(|(rule, _, kind)| Detection {
            kind: *kind,
            matched_rule: Some(*rule),
        })
        .unwrap_or(Detection {
            kind: FormatKind::Generic,
            matched_rule: None,
        })
}
