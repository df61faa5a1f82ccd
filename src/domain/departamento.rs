// ==========================================
// 目录系统 - 部门目录
// ==========================================
// 职责: 固定的部门列表及其销售单位
// 用途: 导入时推断销售单位（取部门第一个单位）
// ==========================================

use serde::Serialize;

/// 未匹配部门时的销售单位
pub const DEFAULT_SALE_UNIT: &str = "Pieza";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Departamento {
    pub id: &'static str,
    pub nombre: &'static str,
    pub descripcion: &'static str,
    pub icono: &'static str,
    pub unidades_venta: &'static [&'static str],
    pub requiere_clave: bool,
    pub requiere_medida: bool,
}

pub const DEPARTAMENTOS: &[Departamento] = &[
    Departamento {
        id: "ferreteria",
        nombre: "Ferretería",
        descripcion: "Herramientas y accesorios para trabajo manual",
        icono: "Wrench",
        unidades_venta: &["Pieza", "Caja", "Bolsa", "Kilogramo"],
        requiere_clave: true,
        requiere_medida: false,
    },
    Departamento {
        id: "electrico",
        nombre: "Eléctrico",
        descripcion: "Componentes y accesorios eléctricos",
        icono: "Zap",
        unidades_venta: &["Pieza", "Metro", "Rollo", "Caja"],
        requiere_clave: true,
        requiere_medida: false,
    },
    Departamento {
        id: "plomeria",
        nombre: "Plomería",
        descripcion: "Tuberías, conexiones y accesorios hidráulicos",
        icono: "Droplets",
        unidades_venta: &["Pieza", "Metro", "Tramo"],
        requiere_clave: true,
        requiere_medida: false,
    },
    Departamento {
        id: "construccion",
        nombre: "Materiales para Construcción",
        descripcion: "Cemento, arena, grava, materiales básicos y mallas",
        icono: "Building",
        unidades_venta: &["Saco", "Metro Cúbico", "Tonelada", "Pieza", "Rollo", "Metro"],
        requiere_clave: true,
        requiere_medida: false,
    },
    Departamento {
        id: "pinturas",
        nombre: "Pinturas",
        descripcion: "Pinturas, barnices y productos de acabado",
        icono: "Palette",
        unidades_venta: &["Litro", "Galón", "Cubeta", "Bote"],
        requiere_clave: true,
        requiere_medida: false,
    },
    Departamento {
        id: "limpieza",
        nombre: "Limpieza y Mantenimiento",
        descripcion: "Productos de limpieza y mantenimiento",
        icono: "Sparkles",
        unidades_venta: &["Pieza", "Litro", "Kilogramo", "Paquete"],
        requiere_clave: false,
        requiere_medida: false,
    },
    Departamento {
        id: "azulejos",
        nombre: "Azulejos",
        descripcion: "Azulejos, pisos y recubrimientos cerámicos",
        icono: "Grid3x3",
        unidades_venta: &["Pieza", "Caja"],
        requiere_clave: true,
        requiere_medida: true,
    },
    Departamento {
        id: "sanitarios",
        nombre: "Muebles para Baño",
        descripcion: "Sanitarios, lavabos, llaves y regaderas",
        icono: "Bath",
        unidades_venta: &["Pieza", "Juego"],
        requiere_clave: false,
        requiere_medida: false,
    },
];

pub fn find_departamento(id: &str) -> Option<&'static Departamento> {
    DEPARTAMENTOS.iter().find(|d| d.id == id)
}

/// 部门的默认销售单位（第一个配置单位），未知部门返回 "Pieza"
pub fn sale_unit_for(departamento_id: &str) -> &'static str {
    find_departamento(departamento_id)
        .and_then(|d| d.unidades_venta.first().copied())
        .unwrap_or(DEFAULT_SALE_UNIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_unit_for_known_department() {
        assert_eq!(sale_unit_for("construccion"), "Saco");
        assert_eq!(sale_unit_for("pinturas"), "Litro");
    }

    #[test]
    fn test_sale_unit_for_unknown_department() {
        assert_eq!(sale_unit_for("jardineria"), "Pieza");
    }
}
