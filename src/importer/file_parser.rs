// ==========================================
// 目录系统 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: 规范化表头 + 行记录（规范化列名 → 原始单元格文本）
// ==========================================

use crate::importer::catalog_importer_trait::FileParser;
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::header::normalize_header;
use calamine::{open_workbook_auto_from_rs, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

// ==========================================
// RawRow / ParsedSheet
// ==========================================

/// 单行原始数据；行号为表格中的 1 基行号（首个数据行 = 2）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub row_number: usize,
    pub cells: HashMap<String, String>,
}

impl RawRow {
    /// 读取单元格；None 表示该行没有这一列（短行）
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSheet {
    pub headers: Vec<String>, // 已规范化
    pub rows: Vec<RawRow>,
}

impl ParsedSheet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn build_row<I>(headers: &[String], row_number: usize, values: I) -> Option<RawRow>
where
    I: IntoIterator<Item = String>,
{
    let mut cells = HashMap::new();
    for (col_idx, value) in values.into_iter().enumerate() {
        // 同名列保留第一列，与 HeaderMap 一致
        if let Some(header) = headers.get(col_idx) {
            cells
                .entry(header.clone())
                .or_insert_with(|| value.trim().to_string());
        }
    }

    // 跳过完全空白的行
    if cells.values().all(|v| v.is_empty()) {
        return None;
    }

    Some(RawRow { row_number, cells })
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImporterResult<ParsedSheet> {
        // 按 UTF-8 读取（非法字节替换），去掉 BOM
        let text = String::from_utf8_lossy(bytes);
        let text = text.trim_start_matches('\u{feff}');

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let row_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);
            let values = record.iter().map(str::to_string);
            if let Some(row) = build_row(&headers, row_number, values) {
                rows.push(row);
            }
        }

        Ok(ParsedSheet { headers, rows })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
// 读取第一个工作表，第一行为表头
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImporterResult<ParsedSheet> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("el libro no tiene hojas".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;
        let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

        let mut grid = range.rows();
        let headers: Vec<String> = match grid.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| normalize_header(&cell.to_string()))
                .collect(),
            // 少于两行视为空表
            None => return Ok(ParsedSheet::default()),
        };

        let mut rows = Vec::new();
        for (offset, data_row) in grid.enumerate() {
            // 表头占据 first_row，数据从其下一行开始（1 基）
            let row_number = first_row + offset + 2;
            let values = data_row.iter().map(|cell| cell.to_string());
            if let Some(row) = build_row(&headers, row_number, values) {
                rows.push(row);
            }
        }

        Ok(ParsedSheet { headers, rows })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    /// 按扩展名选择解析器（不区分大小写）
    pub fn parser_for(extension: &str) -> ImporterResult<Box<dyn FileParser>> {
        match extension.to_lowercase().as_str() {
            "csv" => Ok(Box::new(CsvParser)),
            "xlsx" | "xls" => Ok(Box::new(ExcelParser)),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImporterResult<ParsedSheet> {
        let path = file_path.as_ref();
        Self::parser_for(&extension_of(path))?.parse_to_raw_records(path)
    }
}

/// 文件扩展名（小写，无扩展名时为空串）
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_csv_parser_normalizes_headers() {
        let sheet = CsvParser
            .parse_bytes("CLAVE,CÓDIGO DE BARRAS,Descripción,Precio\nMART-01,,Martillo,150\n".as_bytes())
            .unwrap();

        assert_eq!(
            sheet.headers,
            vec!["clave", "codigodebarras", "descripcion", "precio"]
        );
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].row_number, 2);
        assert_eq!(sheet.rows[0].get("clave"), Some("MART-01"));
        assert_eq!(sheet.rows[0].get("codigodebarras"), Some(""));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let sheet = CsvParser
            .parse_bytes(b"clave,precio\nA-1,10\n,\nA-2,20\n")
            .unwrap();

        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1].get("clave"), Some("A-2"));
        assert_eq!(sheet.rows[1].row_number, 4);
    }

    #[test]
    fn test_csv_parser_strips_bom_and_keeps_short_rows() {
        let mut bytes = "\u{feff}producto,medida,precio\n".as_bytes().to_vec();
        bytes.extend_from_slice(b"Malla ciclon,1.5x20\n");
        let sheet = CsvParser.parse_bytes(&bytes).unwrap();

        assert_eq!(sheet.headers[0], "producto");
        assert_eq!(sheet.rows[0].get("medida"), Some("1.5x20"));
        assert_eq!(sheet.rows[0].get("precio"), None);
    }

    #[test]
    fn test_csv_parser_duplicate_header_keeps_first_column() {
        let sheet = CsvParser
            .parse_bytes(b"producto,precio,medida,PRECIO\nMalla,900,1x20,1200\n")
            .unwrap();

        assert_eq!(sheet.headers, vec!["producto", "precio", "medida", "precio"]);
        assert_eq!(sheet.rows[0].get("precio"), Some("900"));
    }

    #[test]
    fn test_universal_parser_file_not_found() {
        let result = UniversalFileParser.parse("no_existe.csv");
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_unsupported_extension() {
        let result = UniversalFileParser::parser_for("pdf");
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "pdf"));
    }

    #[test]
    fn test_universal_parser_reads_csv_file() {
        let mut temp_file = NamedTempFile::with_suffix(".CSV").unwrap();
        writeln!(temp_file, "codigo,nombre,precio publico").unwrap();
        writeln!(temp_file, "T100,Pinzas,89.50").unwrap();

        let sheet = UniversalFileParser.parse(temp_file.path()).unwrap();
        assert_eq!(sheet.headers, vec!["codigo", "nombre", "preciopublico"]);
        assert_eq!(sheet.rows[0].get("preciopublico"), Some("89.50"));
    }

    #[test]
    fn test_excel_parser_rejects_garbage() {
        assert!(ExcelParser.parse_bytes(b"not a workbook").is_err());
    }
}
