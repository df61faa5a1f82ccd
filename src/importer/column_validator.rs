// ==========================================
// 目录系统 - 必填列校验
// ==========================================
// 职责: 按模板类型检查表头是否包含全部必填字段
// 说明: 同义列已在表头分类阶段归并；这是管道中唯一的快速失败点
// ==========================================

use crate::domain::format::FormatKind;
use crate::importer::header::{CanonicalField, HeaderMap};

/// 模板类型的必填字段
pub fn required_fields(kind: FormatKind) -> &'static [CanonicalField] {
    use CanonicalField::*;

    match kind {
        FormatKind::Generic => &[Clave, CodigoBarras, Descripcion, Precio],
        FormatKind::Mesh => &[Producto, Medida, Precio],
        FormatKind::BrandA => &[CodigoBarras, Clave, Descripcion, Marca, AcabadoColor, Precio],
        FormatKind::BrandB => &[Codigo, Nombre, PrecioPublico],
    }
}

/// 返回缺失的必填字段（空表示校验通过）
pub fn validate(kind: FormatKind, headers: &HeaderMap) -> Vec<CanonicalField> {
    required_fields(kind)
        .iter()
        .copied()
        .filter(|field| !headers.contains(*field))
        .collect()
}
