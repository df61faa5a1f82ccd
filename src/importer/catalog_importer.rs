// ==========================================
// 目录系统 - 商品导入器实现
// ==========================================
// 流程: 读取文件（tokio，唯一的异步边界）→ 解析 → 行处理 → [可选] 逐条落库
// 约定: 管道边界不返回 Err；错误文本写入 ImportResult / PersistSummary
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::config::import_settings::ImportSettings;
use crate::domain::pieza::{ImportResult, PersistSummary, PiezaDraft};
use crate::importer::catalog_importer_trait::{CatalogImporter, DataCleaner};
use crate::importer::data_cleaner::DataCleaner as DefaultDataCleaner;
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::file_parser::{extension_of, ParsedSheet, UniversalFileParser};
use crate::importer::row_processor::{process_rows, RowProcessorInput};
use crate::repository::catalog_import_repo::CatalogImportRepository;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// CatalogImporterImpl - 商品导入器
// ==========================================
pub struct CatalogImporterImpl<R, C>
where
    R: CatalogImportRepository,
    C: ImportConfigReader,
{
    // 数据访问层（spawn_blocking 中共享）
    import_repo: Arc<R>,

    // 配置读取器
    config: C,

    // 导入组件
    data_cleaner: Box<dyn DataCleaner>,
}

impl<R, C> CatalogImporterImpl<R, C>
where
    R: CatalogImportRepository,
    C: ImportConfigReader,
{
    /// 使用默认清洗器创建导入器
    pub fn new(import_repo: R, config: C) -> Self {
        Self::with_cleaner(import_repo, config, Box::new(DefaultDataCleaner))
    }

    pub fn with_cleaner(import_repo: R, config: C, data_cleaner: Box<dyn DataCleaner>) -> Self {
        Self {
            import_repo: Arc::new(import_repo),
            config,
            data_cleaner,
        }
    }

    /// 每次导入开始时读取一次配置；读取失败回退内置默认值
    async fn load_settings(&self) -> ImportSettings {
        match ImportSettings::load(&self.config).await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "no se pudo leer la configuración, se usan valores por defecto");
                ImportSettings::default()
            }
        }
    }

    fn parse(bytes: &[u8], extension: &str) -> ImporterResult<ParsedSheet> {
        UniversalFileParser::parser_for(extension)?.parse_bytes(bytes)
    }

    async fn run_pipeline(
        &self,
        bytes: &[u8],
        extension: &str,
        target_marca: &str,
        target_departamento: Option<&str>,
    ) -> ImportResult {
        debug!("paso 1: análisis del archivo");
        let sheet = match Self::parse(bytes, extension) {
            Ok(sheet) => sheet,
            Err(e) => {
                warn!(extension = %extension, error = %e, "no se pudo analizar el archivo");
                return ImportResult::failure(vec![e.to_string()]);
            }
        };
        info!(rows = sheet.rows.len(), columns = sheet.headers.len(), "archivo analizado");

        debug!("paso 2: procesamiento de filas");
        let settings = self.load_settings().await;
        let input = RowProcessorInput {
            target_marca,
            target_departamento,
            settings: &settings,
            cleaner: self.data_cleaner.as_ref(),
        };
        process_rows(&sheet, &input)
    }
}

#[async_trait]
impl<R, C> CatalogImporter for CatalogImporterImpl<R, C>
where
    R: CatalogImportRepository,
    C: ImportConfigReader,
{
    #[instrument(skip(self, file_path), fields(file))]
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        target_marca: &str,
        target_departamento: Option<&str>,
    ) -> ImportResult {
        let path = file_path.as_ref();
        let file = path.display().to_string();
        tracing::Span::current().record("file", file.as_str());
        info!(marca = %target_marca, "iniciando importación");

        let extension = extension_of(path);
        if let Err(e) = UniversalFileParser::parser_for(&extension) {
            return ImportResult::failure(vec![e.to_string()]);
        }

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = match e.kind() {
                    std::io::ErrorKind::NotFound => ImportError::FileNotFound(file),
                    _ => ImportError::from(e),
                };
                warn!(error = %err, "no se pudo leer el archivo");
                return ImportResult::failure(vec![err.to_string()]);
            }
        };

        self.run_pipeline(&bytes, &extension, target_marca, target_departamento)
            .await
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn import_bytes(
        &self,
        bytes: &[u8],
        extension: &str,
        target_marca: &str,
        target_departamento: Option<&str>,
    ) -> ImportResult {
        let extension = extension.trim_start_matches('.').to_lowercase();
        self.run_pipeline(bytes, &extension, target_marca, target_departamento)
            .await
    }

    #[instrument(skip(self, drafts), fields(count = drafts.len()))]
    async fn persist_drafts(&self, drafts: &[PiezaDraft]) -> PersistSummary {
        let timeout_ms = self.load_settings().await.persist_timeout_ms;
        let mut summary = PersistSummary::default();

        // 顺序落库：等待上一条完成后再发下一条
        for draft in drafts {
            let repo = Arc::clone(&self.import_repo);
            let owned = draft.clone();
            let task = tokio::task::spawn_blocking(move || repo.insert_draft(&owned));

            let outcome = match tokio::time::timeout(Duration::from_millis(timeout_ms), task).await {
                Ok(Ok(Ok(pieza))) => Ok(pieza),
                Ok(Ok(Err(e))) => Err(ImportError::from(e)),
                Ok(Err(join_err)) => Err(ImportError::InternalError(join_err.to_string())),
                Err(_) => Err(ImportError::PersistTimeout(timeout_ms)),
            };

            match outcome {
                Ok(pieza) => {
                    debug!(draft_id = %draft.id, pieza_id = %pieza.id, "pieza guardada");
                    summary.inserted.push(pieza);
                }
                Err(e) => {
                    error!(draft_id = %draft.id, error = %e, "no se pudo guardar la pieza");
                    summary.errors.push(format!("Pieza {}: {}", draft.id, e));
                }
            }
        }

        info!(
            inserted = summary.inserted.len(),
            failed = summary.errors.len(),
            "guardado de piezas completado"
        );
        summary
    }

    async fn import_and_persist<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        target_marca: &str,
        target_departamento: Option<&str>,
    ) -> (ImportResult, Option<PersistSummary>) {
        let result = self
            .import_file(file_path, target_marca, target_departamento)
            .await;

        if !result.success || result.data.is_empty() {
            return (result, None);
        }

        let summary = self.persist_drafts(&result.data).await;
        (result, Some(summary))
    }
}
