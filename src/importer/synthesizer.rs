// ==========================================
// 目录系统 - 商品草稿合成
// ==========================================
// 职责: 单行清洗 + 按模板描述符合成 PiezaDraft
// 结构: 每种模板一个 FormatDescriptor（字段清单 + 各派生规则），合成逻辑只有一份
// ==========================================

use crate::config::import_settings::ImportSettings;
use crate::domain::format::{FieldType, FormatKind};
use crate::domain::pieza::PiezaDraft;
use crate::importer::catalog_importer_trait::DataCleaner;
use crate::importer::data_cleaner::{Cleaned, FieldPolicy, LabelGender, NA_SENTINEL};
use crate::importer::derivation::{
    generate_barcode, generate_clave, infer_department, name_from_description, sale_unit,
    title_case,
};
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::file_parser::RawRow;
use crate::importer::header::{CanonicalField, HeaderMap};
use std::collections::HashMap;

pub const TOOLS_IMAGE_URL: &str = "https://images.pexels.com/photos/162553/keys-workshop-mechanic-tools-162553.jpeg?auto=compress&cs=tinysrgb&w=400";
pub const MESH_IMAGE_URL: &str =
    "https://images.pexels.com/photos/1005644/pexels-photo-1005644.jpeg?auto=compress&cs=tinysrgb&w=400";

const MESH_DEPARTMENT: &str = "construccion";
const MESH_SALE_UNIT: &str = "Rollo";

// ==========================================
// 描述符
// ==========================================

/// 单个待清洗字段
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: CanonicalField,
    pub label: &'static str,
    pub gender: LabelGender,
    pub field_type: FieldType,
    pub warn_on_default: bool,
    /// 替换标准警告的文本（"{row}" 为行号占位）
    pub custom_warning: Option<&'static str>,
    /// FailOnMissing 策略下是否整行报错
    pub strict: bool,
}

impl FieldSpec {
    const fn text(field: CanonicalField, label: &'static str) -> Self {
        Self {
            field,
            label,
            gender: LabelGender::Masculine,
            field_type: FieldType::Text,
            warn_on_default: true,
            custom_warning: None,
            strict: true,
        }
    }

    const fn number(field: CanonicalField, label: &'static str) -> Self {
        Self {
            field_type: FieldType::Number,
            ..Self::text(field, label)
        }
    }

    const fn feminine(self) -> Self {
        Self {
            gender: LabelGender::Feminine,
            ..self
        }
    }

    const fn silent(self) -> Self {
        Self {
            warn_on_default: false,
            ..self
        }
    }

    const fn lenient(self) -> Self {
        Self {
            strict: false,
            ..self
        }
    }

    const fn with_warning(self, message: &'static str) -> Self {
        Self {
            custom_warning: Some(message),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    FromDescription,
    TitleCase(CanonicalField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionRule {
    Field(CanonicalField),
    Joined(CanonicalField, CanonicalField), // "a - b"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRule {
    Field(CanonicalField),
    InitialsOf(CanonicalField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarcodeRule {
    Field(CanonicalField),
    FieldOrGenerated(CanonicalField),
    Generated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrandSource {
    Target,
    Column(CanonicalField),
}

/// 部门覆写始终优先；以下规则仅在无覆写时生效
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartmentRule {
    Inferred,
    InferredFromName,
    Fixed(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleUnitRule {
    Department,
    Fixed(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct FormatDescriptor {
    pub kind: FormatKind,
    pub fields: &'static [FieldSpec],
    pub image: &'static str,
    pub name: NameRule,
    pub description: DescriptionRule,
    pub key: KeyRule,
    pub barcode: BarcodeRule,
    pub brand: BrandSource,
    pub department: DepartmentRule,
    pub sale_unit: SaleUnitRule,
    pub keeps_measure: bool,
}

const GENERIC_FIELDS: &[FieldSpec] = &[
    FieldSpec::text(CanonicalField::Clave, "CLAVE").feminine(),
    FieldSpec::text(CanonicalField::CodigoBarras, "CODIGO DE BARRAS")
        .lenient()
        .with_warning("Fila {row}: CODIGO DE BARRAS vacío, se generará automáticamente"),
    FieldSpec::text(CanonicalField::Descripcion, "DESCRIPCION").feminine(),
    FieldSpec::number(CanonicalField::Precio, "PRECIO"),
];

const MESH_FIELDS: &[FieldSpec] = &[
    FieldSpec::text(CanonicalField::Producto, "PRODUCTO"),
    FieldSpec::text(CanonicalField::Medida, "MEDIDA").feminine(),
    FieldSpec::number(CanonicalField::Precio, "PRECIO"),
];

const BRAND_A_FIELDS: &[FieldSpec] = &[
    FieldSpec::text(CanonicalField::CodigoBarras, "CODIGO DE BARRAS").lenient(),
    FieldSpec::text(CanonicalField::Clave, "CLAVE").feminine().silent(),
    FieldSpec::text(CanonicalField::Descripcion, "DESCRIPCION").feminine().silent(),
    FieldSpec::text(CanonicalField::Marca, "MARCA").silent().lenient(),
    FieldSpec::text(CanonicalField::AcabadoColor, "ACABADO/COLOR").silent().lenient(),
    FieldSpec::number(CanonicalField::Precio, "PRECIO"),
];

const BRAND_B_FIELDS: &[FieldSpec] = &[
    FieldSpec::text(CanonicalField::Codigo, "CODIGO"),
    FieldSpec::text(CanonicalField::Nombre, "NOMBRE"),
    FieldSpec::number(CanonicalField::PrecioPublico, "PRECIO PUBLICO"),
];

pub const GENERIC: FormatDescriptor = FormatDescriptor {
    kind: FormatKind::Generic,
    fields: GENERIC_FIELDS,
    image: TOOLS_IMAGE_URL,
    name: NameRule::FromDescription,
    description: DescriptionRule::Field(CanonicalField::Descripcion),
    key: KeyRule::Field(CanonicalField::Clave),
    barcode: BarcodeRule::FieldOrGenerated(CanonicalField::CodigoBarras),
    brand: BrandSource::Target,
    department: DepartmentRule::Inferred,
    sale_unit: SaleUnitRule::Department,
    keeps_measure: false,
};

pub const MESH: FormatDescriptor = FormatDescriptor {
    kind: FormatKind::Mesh,
    fields: MESH_FIELDS,
    image: MESH_IMAGE_URL,
    name: NameRule::TitleCase(CanonicalField::Producto),
    description: DescriptionRule::Joined(CanonicalField::Producto, CanonicalField::Medida),
    key: KeyRule::InitialsOf(CanonicalField::Producto),
    barcode: BarcodeRule::Generated,
    brand: BrandSource::Target,
    department: DepartmentRule::Fixed(MESH_DEPARTMENT),
    sale_unit: SaleUnitRule::Fixed(MESH_SALE_UNIT),
    keeps_measure: true,
};

pub const BRAND_A: FormatDescriptor = FormatDescriptor {
    kind: FormatKind::BrandA,
    fields: BRAND_A_FIELDS,
    image: TOOLS_IMAGE_URL,
    name: NameRule::FromDescription,
    description: DescriptionRule::Joined(CanonicalField::Descripcion, CanonicalField::AcabadoColor),
    key: KeyRule::Field(CanonicalField::Clave),
    barcode: BarcodeRule::Field(CanonicalField::CodigoBarras),
    brand: BrandSource::Column(CanonicalField::Marca),
    department: DepartmentRule::Inferred,
    sale_unit: SaleUnitRule::Department,
    keeps_measure: false,
};

pub const BRAND_B: FormatDescriptor = FormatDescriptor {
    kind: FormatKind::BrandB,
    fields: BRAND_B_FIELDS,
    image: TOOLS_IMAGE_URL,
    name: NameRule::TitleCase(CanonicalField::Nombre),
    description: DescriptionRule::Field(CanonicalField::Nombre),
    key: KeyRule::Field(CanonicalField::Codigo),
    barcode: BarcodeRule::Field(CanonicalField::Codigo),
    brand: BrandSource::Target,
    department: DepartmentRule::InferredFromName,
    sale_unit: SaleUnitRule::Department,
    keeps_measure: false,
};

pub fn descriptor_for(kind: FormatKind) -> &'static FormatDescriptor {
    match kind {
        FormatKind::Generic => &GENERIC,
        FormatKind::Mesh => &MESH,
        FormatKind::BrandA => &BRAND_A,
        FormatKind::BrandB => &BRAND_B,
    }
}

// ==========================================
// 合成
// ==========================================

/// 一次导入内所有行共享的上下文
pub struct SynthesisContext<'a> {
    pub target_marca: &'a str,
    pub target_departamento: Option<&'a str>,
    pub settings: &'a ImportSettings,
    pub cleaner: &'a dyn DataCleaner,
    pub run_millis: i64,
}

impl SynthesisContext<'_> {
    fn department_override(&self) -> Option<&str> {
        self.target_departamento
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedRow {
    pub draft: PiezaDraft,
    pub warnings: Vec<String>,
}

struct CleanedRow {
    values: HashMap<CanonicalField, Cleaned>,
}

impl CleanedRow {
    fn text(&self, field: CanonicalField) -> String {
        self.values
            .get(&field)
            .map(|c| c.value.as_text())
            .unwrap_or_else(|| NA_SENTINEL.to_string())
    }

    fn number(&self, field: CanonicalField) -> f64 {
        self.values
            .get(&field)
            .map(|c| c.value.as_number())
            .unwrap_or(0.0)
    }

    fn is_defaulted(&self, field: CanonicalField) -> bool {
        self.values.get(&field).map_or(true, Cleaned::is_defaulted)
    }
}

fn clean_row(
    descriptor: &FormatDescriptor,
    row: &RawRow,
    headers: &HeaderMap,
    ctx: &SynthesisContext<'_>,
    warnings: &mut Vec<String>,
) -> ImporterResult<CleanedRow> {
    let mut values = HashMap::new();

    for spec in descriptor.fields {
        // 短行缺少的尾部单元格按空值处理
        let raw = headers
            .column_for(spec.field)
            .and_then(|column| row.get(column))
            .unwrap_or("");

        let cleaned = ctx.cleaner.clean(raw, spec.field_type);
        if cleaned.is_defaulted() {
            if spec.strict && ctx.settings.field_policy == FieldPolicy::FailOnMissing {
                return Err(ImportError::StrictFieldViolation {
                    row: row.row_number,
                    field: spec.label.to_string(),
                });
            }
            if spec.warn_on_default {
                let warning = match spec.custom_warning {
                    Some(template) => Some(template.replace("{row}", &row.row_number.to_string())),
                    None => cleaned.warning(row.row_number, spec.label, spec.gender),
                };
                warnings.extend(warning);
            }
        }
        values.insert(spec.field, cleaned);
    }

    Ok(CleanedRow { values })
}

/// 清洗并合成单行；Err 由调用方转换为行级错误
pub fn synthesize(
    descriptor: &FormatDescriptor,
    row: &RawRow,
    headers: &HeaderMap,
    index: usize,
    ctx: &SynthesisContext<'_>,
) -> ImporterResult<SynthesizedRow> {
    let mut warnings = Vec::new();
    let cleaned = clean_row(descriptor, row, headers, ctx, &mut warnings)?;

    let clave = match descriptor.key {
        KeyRule::Field(field) => cleaned.text(field),
        KeyRule::InitialsOf(field) => generate_clave(&cleaned.text(field)),
    };

    let nombre = match descriptor.name {
        NameRule::FromDescription => name_from_description(
            &cleaned.text(CanonicalField::Descripcion),
            &clave,
            &ctx.settings.stopwords,
        ),
        NameRule::TitleCase(field) => title_case(&cleaned.text(field)),
    };

    let descripcion = match descriptor.description {
        DescriptionRule::Field(field) => cleaned.text(field),
        DescriptionRule::Joined(a, b) => format!("{} - {}", cleaned.text(a), cleaned.text(b)),
    };

    let codigo_barras = match descriptor.barcode {
        BarcodeRule::Field(field) => cleaned.text(field),
        BarcodeRule::FieldOrGenerated(field) => {
            // 空值与字面 "NA" 都视为缺失条码
            if cleaned.is_defaulted(field) || cleaned.text(field) == NA_SENTINEL {
                generate_barcode()
            } else {
                cleaned.text(field)
            }
        }
        BarcodeRule::Generated => generate_barcode(),
    };

    let marca = match descriptor.brand {
        BrandSource::Target => ctx.target_marca.to_string(),
        BrandSource::Column(field) => cleaned.text(field),
    };

    let departamento = match (ctx.department_override(), descriptor.department) {
        (Some(dept), _) => dept.to_string(),
        (None, DepartmentRule::Fixed(dept)) => dept.to_string(),
        (None, DepartmentRule::Inferred) => infer_department(
            &nombre,
            &descripcion,
            &ctx.settings.department_keywords,
            &ctx.settings.default_department,
        ),
        (None, DepartmentRule::InferredFromName) => infer_department(
            &nombre,
            "",
            &ctx.settings.department_keywords,
            &ctx.settings.default_department,
        ),
    };

    let unidad_venta = match descriptor.sale_unit {
        SaleUnitRule::Department => sale_unit(&departamento),
        SaleUnitRule::Fixed(unit) => unit.to_string(),
    };

    let precio = descriptor
        .fields
        .iter()
        .find(|spec| spec.field_type == FieldType::Number)
        .map(|spec| cleaned.number(spec.field))
        .unwrap_or(0.0);

    let medida = descriptor
        .keeps_measure
        .then(|| cleaned.text(CanonicalField::Medida));

    let draft = PiezaDraft {
        id: format!("import_{}_{}", ctx.run_millis, index),
        nombre,
        descripcion: Some(descripcion),
        imagen: descriptor.image.to_string(),
        precio,
        marca,
        codigo_barras: Some(codigo_barras),
        clave: Some(clave),
        departamento,
        unidad_venta,
        medida,
        precio_metro: None,
        metros_por_caja: None,
    };

    Ok(SynthesizedRow { draft, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::data_cleaner::DataCleaner as Cleaner;

    fn row(row_number: usize, cells: &[(&str, &str)]) -> RawRow {
        RawRow {
            row_number,
            cells: cells
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn ctx<'a>(settings: &'a ImportSettings, dept: Option<&'a str>) -> SynthesisContext<'a> {
        SynthesisContext {
            target_marca: "Ferremax",
            target_departamento: dept,
            settings,
            cleaner: &Cleaner,
            run_millis: 1700000000000,
        }
    }

    #[test]
    fn test_generic_generates_barcode_with_single_warning() {
        let settings = ImportSettings::default();
        let headers = HeaderMap::from_headers(&["clave", "codigodebarras", "descripcion", "precio"]);
        let r = row(
            2,
            &[
                ("clave", "MART-01"),
                ("codigodebarras", ""),
                ("descripcion", "Martillo de acero"),
                ("precio", "150"),
            ],
        );

        let out = synthesize(&GENERIC, &r, &headers, 0, &ctx(&settings, None)).unwrap();
        assert_eq!(out.draft.id, "import_1700000000000_0");
        assert_eq!(out.draft.clave.as_deref(), Some("MART-01"));
        assert_eq!(out.draft.nombre, "Martillo De Acero");
        assert_eq!(out.draft.precio, 150.0);
        assert_eq!(out.draft.marca, "Ferremax");
        assert_eq!(out.draft.departamento, "ferreteria");
        assert_eq!(out.draft.unidad_venta, "Pieza");
        let barcode = out.draft.codigo_barras.unwrap();
        assert_eq!(barcode.len(), 13);
        assert_eq!(
            out.warnings,
            vec!["Fila 2: CODIGO DE BARRAS vacío, se generará automáticamente".to_string()]
        );
    }

    #[test]
    fn test_mesh_draft_shape() {
        let settings = ImportSettings::default();
        let headers = HeaderMap::from_headers(&["producto", "medida", "precio"]);
        let r = row(
            3,
            &[("producto", "malla ciclon"), ("medida", "1.5x20"), ("precio", "$1,250")],
        );

        let out = synthesize(&MESH, &r, &headers, 1, &ctx(&settings, None)).unwrap();
        assert_eq!(out.draft.nombre, "Malla Ciclon");
        assert_eq!(out.draft.descripcion.as_deref(), Some("malla ciclon - 1.5x20"));
        assert_eq!(out.draft.departamento, "construccion");
        assert_eq!(out.draft.unidad_venta, "Rollo");
        assert_eq!(out.draft.imagen, MESH_IMAGE_URL);
        assert_eq!(out.draft.medida.as_deref(), Some("1.5x20"));
        assert_eq!(out.draft.precio, 1250.0);
        assert!(out.draft.clave.unwrap().starts_with("MC-"));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_brand_a_uses_row_brand_and_finish() {
        let settings = ImportSettings::default();
        let headers = HeaderMap::from_headers(&[
            "codigodebarras",
            "clave",
            "descripcion",
            "marca",
            "acabado/color",
            "precio",
        ]);
        let r = row(
            2,
            &[
                ("codigodebarras", ""),
                ("clave", "U-100"),
                ("descripcion", "Pinzas de corte"),
                ("marca", "Surtek"),
                ("acabado/color", "Cromado"),
                ("precio", "210.5"),
            ],
        );

        let out = synthesize(&BRAND_A, &r, &headers, 0, &ctx(&settings, None)).unwrap();
        assert_eq!(out.draft.marca, "Surtek");
        assert_eq!(out.draft.descripcion.as_deref(), Some("Pinzas de corte - Cromado"));
        assert_eq!(out.draft.codigo_barras.as_deref(), Some("NA"));
        assert_eq!(out.warnings, vec!["Fila 2: CODIGO DE BARRAS vacío, se asignó 'NA'".to_string()]);
    }

    #[test]
    fn test_brand_b_code_is_key_and_barcode() {
        let settings = ImportSettings::default();
        let headers = HeaderMap::from_headers(&["codigo", "nombre", "precio publico"]);
        let r = row(
            2,
            &[("codigo", "T100"), ("nombre", "PINZAS DE CORTE"), ("preciopublico", "89.50")],
        );

        let out = synthesize(&BRAND_B, &r, &headers, 0, &ctx(&settings, None)).unwrap();
        assert_eq!(out.draft.nombre, "Pinzas De Corte");
        assert_eq!(out.draft.clave.as_deref(), Some("T100"));
        assert_eq!(out.draft.codigo_barras.as_deref(), Some("T100"));
        assert_eq!(out.draft.precio, 89.5);
    }

    #[test]
    fn test_department_override_wins() {
        let settings = ImportSettings::default();
        let headers = HeaderMap::from_headers(&["producto", "medida", "precio"]);
        let r = row(2, &[("producto", "malla"), ("medida", "1x10"), ("precio", "10")]);

        let out = synthesize(&MESH, &r, &headers, 0, &ctx(&settings, Some("pinturas"))).unwrap();
        assert_eq!(out.draft.departamento, "pinturas");
        assert_eq!(out.draft.unidad_venta, "Rollo");
    }

    #[test]
    fn test_truncated_row_defaults_trailing_cell() {
        let settings = ImportSettings::default();
        let headers = HeaderMap::from_headers(&["producto", "medida", "precio"]);
        let r = row(5, &[("producto", "malla"), ("medida", "1x10")]);

        let out = synthesize(&MESH, &r, &headers, 0, &ctx(&settings, None)).unwrap();
        assert_eq!(out.draft.precio, 0.0);
        assert_eq!(out.draft.medida.as_deref(), Some("1x10"));
        assert_eq!(
            out.warnings,
            vec!["Fila 5: PRECIO vacío o inválido, se asignó 0".to_string()]
        );
    }

    #[test]
    fn test_truncated_row_under_strict_policy_is_violation() {
        let settings = ImportSettings::default().with_field_policy(FieldPolicy::FailOnMissing);
        let headers = HeaderMap::from_headers(&["producto", "medida", "precio"]);
        let r = row(5, &[("producto", "malla"), ("medida", "1x10")]);

        let err = synthesize(&MESH, &r, &headers, 0, &ctx(&settings, None)).unwrap_err();
        assert!(matches!(
            err,
            ImportError::StrictFieldViolation { row: 5, ref field } if field == "PRECIO"
        ));
    }

    #[test]
    fn test_generic_literal_na_barcode_is_regenerated() {
        let settings = ImportSettings::default();
        let headers = HeaderMap::from_headers(&["clave", "codigodebarras", "descripcion", "precio"]);
        let r = row(
            2,
            &[
                ("clave", "MART-01"),
                ("codigodebarras", "NA"),
                ("descripcion", "Martillo de acero"),
                ("precio", "150"),
            ],
        );

        let out = synthesize(&GENERIC, &r, &headers, 0, &ctx(&settings, None)).unwrap();
        let barcode = out.draft.codigo_barras.unwrap();
        assert_eq!(barcode.len(), 13);
        assert!(barcode.chars().all(|c| c.is_ascii_digit()));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_generic_feminine_labels_in_warnings() {
        let settings = ImportSettings::default();
        let headers = HeaderMap::from_headers(&["clave", "codigodebarras", "descripcion", "precio"]);
        let r = row(
            6,
            &[
                ("clave", ""),
                ("codigodebarras", "7501000000001"),
                ("descripcion", ""),
                ("precio", "10"),
            ],
        );

        let out = synthesize(&GENERIC, &r, &headers, 0, &ctx(&settings, None)).unwrap();
        assert_eq!(
            out.warnings,
            vec![
                "Fila 6: CLAVE vacía, se asignó 'NA'".to_string(),
                "Fila 6: DESCRIPCION vacía, se asignó 'NA'".to_string(),
            ]
        );
    }

    #[test]
    fn test_brand_a_empty_brand_cell_stays_na() {
        let settings = ImportSettings::default();
        let headers = HeaderMap::from_headers(&[
            "codigodebarras",
            "clave",
            "descripcion",
            "marca",
            "acabado/color",
            "precio",
        ]);
        let r = row(
            2,
            &[
                ("codigodebarras", "7501000000002"),
                ("clave", "U-101"),
                ("descripcion", "Desarmador plano"),
                ("marca", ""),
                ("acabado/color", "Negro"),
                ("precio", "45"),
            ],
        );

        let out = synthesize(&BRAND_A, &r, &headers, 0, &ctx(&settings, None)).unwrap();
        assert_eq!(out.draft.marca, "NA");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_fail_on_missing_policy() {
        let settings = ImportSettings::default().with_field_policy(FieldPolicy::FailOnMissing);
        let headers = HeaderMap::from_headers(&["clave", "codigodebarras", "descripcion", "precio"]);
        let r = row(
            4,
            &[
                ("clave", "A-1"),
                ("codigodebarras", ""),
                ("descripcion", "Taladro"),
                ("precio", ""),
            ],
        );

        // 条码可生成不受严格策略约束；价格为空整行失败
        let err = synthesize(&GENERIC, &r, &headers, 0, &ctx(&settings, None)).unwrap_err();
        assert!(matches!(
            err,
            ImportError::StrictFieldViolation { row: 4, ref field } if field == "PRECIO"
        ));
    }
}
