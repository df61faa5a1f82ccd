// ==========================================
// 目录系统 - 行处理器
// ==========================================
// 状态机: RowParse → FormatDetect → ColumnValidate →[通过] RowLoop → Done
// 容错: 单行失败记为 "Fila {n}: Error - {msg}"，继续下一行
// ==========================================

use crate::config::import_settings::ImportSettings;
use crate::domain::pieza::ImportResult;
use crate::importer::catalog_importer_trait::DataCleaner;
use crate::importer::column_validator;
use crate::importer::file_parser::ParsedSheet;
use crate::importer::format_detector::detect;
use crate::importer::header::{CanonicalField, HeaderMap};
use crate::importer::synthesizer::{descriptor_for, synthesize, SynthesisContext};
use chrono::Utc;
use tracing::{debug, info, warn};

pub const EMPTY_FILE_MESSAGE: &str = "El archivo está vacío o no se pudo leer correctamente";
pub const UNRECOGNIZED_FORMAT_WARNING: &str = "formato no reconocido, se asumió Ferretería";

/// 一次导入的输入参数
pub struct RowProcessorInput<'a> {
    pub target_marca: &'a str,
    pub target_departamento: Option<&'a str>,
    pub settings: &'a ImportSettings,
    pub cleaner: &'a dyn DataCleaner,
}

fn missing_columns_message(label: &str, missing: &[CanonicalField]) -> String {
    let names: Vec<&str> = missing.iter().map(|f| f.column_name()).collect();
    format!(
        "Faltan columnas obligatorias para {}: {}",
        label,
        names.join(", ")
    )
}

fn found_columns_message(headers: &[String]) -> String {
    format!("Columnas encontradas: {}", headers.join(", "))
}

fn row_error_message(row_number: usize, err: impl std::fmt::Display) -> String {
    format!("Fila {}: Error - {}", row_number, err)
}

/// 处理已解析的表格，返回导入结果（不落库）
pub fn process_rows(sheet: &ParsedSheet, input: &RowProcessorInput<'_>) -> ImportResult {
    // === RowParse ===
    if sheet.is_empty() {
        warn!("archivo sin filas de datos");
        return ImportResult::failure(vec![EMPTY_FILE_MESSAGE.to_string()]);
    }

    let headers = HeaderMap::from_headers(&sheet.headers);

    // === FormatDetect（仅首行）===
    let detection = detect(&headers, sheet.rows.first(), input.target_marca);
    let kind = detection.kind;
    info!(format = %kind, rule = ?detection.matched_rule, "formato detectado");

    let mut warnings = Vec::new();
    if detection.is_fallback() {
        warn!(marca = %input.target_marca, headers = ?sheet.headers, "formato no reconocido");
        warnings.push(UNRECOGNIZED_FORMAT_WARNING.to_string());
    }

    // === ColumnValidate ===
    let missing = column_validator::validate(kind, &headers);
    if !missing.is_empty() {
        warn!(format = %kind, missing = ?missing, "faltan columnas obligatorias");
        return ImportResult {
            success: false,
            format: Some(kind),
            data: Vec::new(),
            warnings,
            errors: vec![
                missing_columns_message(kind.label(), &missing),
                found_columns_message(&sheet.headers),
            ],
        };
    }

    // === RowLoop ===
    let descriptor = descriptor_for(kind);
    let ctx = SynthesisContext {
        target_marca: input.target_marca,
        target_departamento: input.target_departamento,
        settings: input.settings,
        cleaner: input.cleaner,
        run_millis: Utc::now().timestamp_millis(),
    };

    let mut data = Vec::with_capacity(sheet.rows.len());
    let mut errors = Vec::new();
    for (index, row) in sheet.rows.iter().enumerate() {
        match synthesize(descriptor, row, &headers, index, &ctx) {
            Ok(out) => {
                warnings.extend(out.warnings);
                data.push(out.draft);
            }
            Err(e) => {
                debug!(row_number = row.row_number, error = %e, "fila descartada");
                errors.push(row_error_message(row.row_number, e));
            }
        }
    }

    info!(
        format = %kind,
        drafts = data.len(),
        warnings = warnings.len(),
        errors = errors.len(),
        "procesamiento de filas completado"
    );

    ImportResult {
        success: true,
        format: Some(kind),
        data,
        warnings,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::format::FormatKind;
    use crate::importer::catalog_importer_trait::FileParser;
    use crate::importer::data_cleaner::{DataCleaner as Cleaner, FieldPolicy};
    use crate::importer::file_parser::CsvParser;

    fn run(csv: &str, marca: &str, dept: Option<&str>) -> ImportResult {
        run_with(csv, marca, dept, &ImportSettings::default())
    }

    fn run_with(
        csv: &str,
        marca: &str,
        dept: Option<&str>,
        settings: &ImportSettings,
    ) -> ImportResult {
        let sheet = CsvParser.parse_bytes(csv.as_bytes()).unwrap();
        let input = RowProcessorInput {
            target_marca: marca,
            target_departamento: dept,
            settings,
            cleaner: &Cleaner,
        };
        process_rows(&sheet, &input)
    }

    #[test]
    fn test_empty_sheet_fails() {
        let result = run("clave,precio\n", "Ferremax", None);
        assert!(!result.success);
        assert_eq!(result.errors, vec![EMPTY_FILE_MESSAGE.to_string()]);
        assert!(result.data.is_empty());
    }

    #[test]
    fn test_missing_columns_aborts_before_rows() {
        let result = run("producto,medida\nmalla,1x10\n", "Deacero", None);
        assert!(!result.success);
        assert_eq!(result.format, Some(FormatKind::Mesh));
        assert!(result.data.is_empty());
        assert_eq!(
            result.errors,
            vec![
                "Faltan columnas obligatorias para MALLAS: precio".to_string(),
                "Columnas encontradas: producto, medida".to_string(),
            ]
        );
    }

    #[test]
    fn test_unrecognized_format_warns_and_fails_validation() {
        let result = run("articulo,costo\nTaladro,100\n", "Ferremax", None);
        assert!(!result.success);
        assert_eq!(result.format, Some(FormatKind::Generic));
        assert_eq!(result.warnings, vec![UNRECOGNIZED_FORMAT_WARNING.to_string()]);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_truncated_row_is_defaulted() {
        let csv = "producto,medida,precio\nmalla ciclon,1.5x20,900\nmalla gallinero,1x25\nalambre,cal 12,300\n";
        let result = run(csv, "Deacero", None);

        assert!(result.success);
        assert_eq!(result.data.len(), 3);
        assert!(result.errors.is_empty());
        assert_eq!(result.data[1].precio, 0.0);
        assert_eq!(
            result.warnings,
            vec!["Fila 3: PRECIO vacío o inválido, se asignó 0".to_string()]
        );
    }

    #[test]
    fn test_strict_row_failure_is_isolated() {
        let csv = "producto,medida,precio\nmalla ciclon,1.5x20,900\nmalla gallinero,1x25,\nalambre,cal 12,300\n";
        let settings = ImportSettings::default().with_field_policy(FieldPolicy::FailOnMissing);
        let result = run_with(csv, "Deacero", None, &settings);

        assert!(result.success);
        assert_eq!(result.data.len(), 2);
        assert_eq!(
            result.errors,
            vec!["Fila 3: Error - PRECIO vacío o inválido (política estricta)".to_string()]
        );
        assert_eq!(result.data[1].id.rsplit('_').next(), Some("2"));
    }

    #[test]
    fn test_all_rows_defaulted_still_success() {
        let csv = "clave,codigo de barras,descripcion,precio\n,,,\nX-1,,,abc\n";
        let result = run(csv, "Ferremax", None);

        assert!(result.success);
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].precio, 0.0);
        // 空白行被解析器跳过；第二行: 条码 + 描述 + 价格
        assert_eq!(result.warnings.len(), 3);
    }
}
