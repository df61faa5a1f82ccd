// ==========================================
// 目录系统 - 商品导入 Trait
// ==========================================
// 职责: 定义导入接口（不包含实现）
// 管道: 读取 → 解析 → 格式识别 → 必填列校验 → 逐行清洗/合成
// ==========================================

use crate::domain::format::FieldType;
use crate::domain::pieza::{ImportResult, PersistSummary, PiezaDraft};
use crate::importer::data_cleaner::Cleaned;
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::file_parser::ParsedSheet;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// CatalogImporter Trait
// ==========================================
// 用途: 商品导入主接口
// 实现者: CatalogImporterImpl
// 约定: 管道边界不返回 Err，所有失败都体现在 ImportResult 中
#[async_trait]
pub trait CatalogImporter: Send + Sync {
    /// 从 Excel/CSV 文件导入商品草稿
    ///
    /// # 参数
    /// - file_path: 文件路径（.xlsx / .xls / .csv）
    /// - target_marca: 目标品牌名称
    /// - target_departamento: 部门覆写（None 时按关键字推断）
    ///
    /// # 返回
    /// - ImportResult: success=false 表示文件级失败（不可读/为空/缺少必填列）
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        target_marca: &str,
        target_departamento: Option<&str>,
    ) -> ImportResult;

    /// 从内存字节导入（extension 决定解析器）
    async fn import_bytes(
        &self,
        bytes: &[u8],
        extension: &str,
        target_marca: &str,
        target_departamento: Option<&str>,
    ) -> ImportResult;

    /// 逐条落库草稿
    ///
    /// # 说明
    /// - 顺序执行，每条等待完成后再发下一条
    /// - 每条受 import.persist_timeout_ms 限制
    /// - 单条失败/超时记为 "Pieza {id}: ..." 并继续
    async fn persist_drafts(&self, drafts: &[PiezaDraft]) -> PersistSummary;

    /// 导入并落库；导入失败时不落库
    async fn import_and_persist<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        target_marca: &str,
        target_departamento: Option<&str>,
    ) -> (ImportResult, Option<PersistSummary>);
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件内容为规范化表头 + 行记录
    fn parse_bytes(&self, bytes: &[u8]) -> ImporterResult<ParsedSheet>;

    /// 从磁盘读取并解析
    ///
    /// # 返回
    /// - Err(FileNotFound): 文件不存在
    fn parse_to_raw_records(&self, file_path: &Path) -> ImporterResult<ParsedSheet> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }
        let bytes = std::fs::read(file_path)?;
        self.parse_bytes(&bytes)
    }
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 单元格清洗接口（阶段 2）
// 实现者: importer::data_cleaner::DataCleaner
pub trait DataCleaner: Send + Sync {
    /// 清洗单元格
    ///
    /// # 规则
    /// - 文本: 空 → "NA"，否则去首尾空白
    /// - 数值: 空/不可解析 → 0
    fn clean(&self, raw: &str, field_type: FieldType) -> Cleaned;

    /// 解析价格文本（"$1,250.50" → 1250.5）；无数字时返回 None
    fn parse_number(&self, value: &str) -> Option<f64>;
}
