// ==========================================
// 目录系统 - 配置管理器
// ==========================================
// 职责: 导入参数读取/覆写 + 按品牌保存的自定义格式模板
// 存储: config_kv 表 (scope_id='global', key-value)
// ==========================================

use crate::config::import_config_trait::{ConfigResult, ImportConfigReader};
use crate::config::import_settings::{
    default_department_keywords, default_stopwords, DepartmentKeywords, DEFAULT_DEPARTMENT,
    DEFAULT_PERSIST_TIMEOUT_MS,
};
use crate::db::open_sqlite_connection;
use crate::domain::format::{default_formats, ExcelFormatTemplate};
use crate::importer::data_cleaner::FieldPolicy;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| format!("Error al obtener el candado: {}", e).into())
    }

    /// 读取 global scope 的配置值
    pub fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn delete_config_value(&self, key: &str) -> ConfigResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
        )?;
        Ok(affected > 0)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 读取 JSON 配置；缺失或格式错误时回退默认值
    fn get_json_or<T, F>(&self, key: &str, default: F) -> ConfigResult<T>
    where
        T: serde::de::DeserializeOwned,
        F: FnOnce() -> T,
    {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default()),
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(config_key = key, raw_value = %raw, error = %e, "配置格式错误，使用默认值");
                Ok(default())
            }
        }
    }

    // ===== 自定义格式模板 =====
    // key: custom_formats/{marca_id}，value: 模板 JSON 数组

    /// 查询品牌的自定义模板
    pub fn list_custom_formats(&self, marca_id: &str) -> ConfigResult<Vec<ExcelFormatTemplate>> {
        let key = custom_formats_key(marca_id);
        let raw = match self.get_config_value(&key)? {
            Some(v) => v,
            None => return Ok(Vec::new()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    /// 内置模板 + 品牌自定义模板
    pub fn list_formats_for_marca(&self, marca_id: &str) -> ConfigResult<Vec<ExcelFormatTemplate>> {
        let mut formats = default_formats();
        formats.extend(self.list_custom_formats(marca_id)?);
        Ok(formats)
    }

    /// 保存自定义模板（同 id 覆盖，否则追加）
    pub fn save_custom_format(
        &self,
        marca_id: &str,
        format: ExcelFormatTemplate,
    ) -> ConfigResult<Vec<ExcelFormatTemplate>> {
        let mut formats = self.list_custom_formats(marca_id)?;
        match formats.iter_mut().find(|f| f.id == format.id) {
            Some(existing) => *existing = format,
            None => formats.push(format),
        }
        self.write_custom_formats(marca_id, &formats)?;
        Ok(formats)
    }

    /// 删除自定义模板，返回是否删除了记录
    pub fn delete_custom_format(&self, marca_id: &str, format_id: &str) -> ConfigResult<bool> {
        let mut formats = self.list_custom_formats(marca_id)?;
        let before = formats.len();
        formats.retain(|f| f.id != format_id);
        if formats.len() == before {
            return Ok(false);
        }
        self.write_custom_formats(marca_id, &formats)?;
        Ok(true)
    }

    /// 以已有模板为底复制一个可编辑的自定义模板（不落库）
    pub fn customize_format(
        &self,
        marca_id: &str,
        base_format_id: &str,
    ) -> ConfigResult<Option<ExcelFormatTemplate>> {
        let base = self
            .list_formats_for_marca(marca_id)?
            .into_iter()
            .find(|f| f.id == base_format_id);

        Ok(base.map(|f| ExcelFormatTemplate {
            id: format!("custom_{}_{}", marca_id, Utc::now().timestamp_millis()),
            name: format!("{} Personalizado", f.name),
            is_custom: true,
            marca_id: Some(marca_id.to_string()),
            ..f
        }))
    }

    fn write_custom_formats(
        &self,
        marca_id: &str,
        formats: &[ExcelFormatTemplate],
    ) -> ConfigResult<()> {
        let json = serde_json::to_string(formats)?;
        self.set_config_value(&custom_formats_key(marca_id), &json)
    }
}

fn custom_formats_key(marca_id: &str) -> String {
    format!("custom_formats/{}", marca_id)
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_department_keywords(&self) -> ConfigResult<Vec<DepartmentKeywords>> {
        self.get_json_or(config_keys::DEPARTMENT_KEYWORDS, default_department_keywords)
    }

    async fn get_stopwords(&self) -> ConfigResult<Vec<String>> {
        let words: Vec<String> = self.get_json_or(config_keys::STOPWORDS, default_stopwords)?;
        Ok(words.into_iter().map(|w| w.trim().to_lowercase()).collect())
    }

    async fn get_default_department(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::DEFAULT_DEPARTMENT, DEFAULT_DEPARTMENT)?;
        let value = value.trim();
        if value.is_empty() {
            Ok(DEFAULT_DEPARTMENT.to_string())
        } else {
            Ok(value.to_string())
        }
    }

    async fn get_field_policy(&self) -> ConfigResult<FieldPolicy> {
        let value = self.get_config_or_default(config_keys::FIELD_POLICY, "default_on_missing")?;
        Ok(value.parse::<FieldPolicy>().unwrap_or_else(|e| {
            tracing::warn!(config_key = config_keys::FIELD_POLICY, error = %e, "使用默认缺失值策略");
            FieldPolicy::DefaultOnMissing
        }))
    }

    async fn get_persist_timeout_ms(&self) -> ConfigResult<u64> {
        let value = self.get_config_or_default(
            config_keys::PERSIST_TIMEOUT_MS,
            &DEFAULT_PERSIST_TIMEOUT_MS.to_string(),
        )?;
        Ok(value
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_PERSIST_TIMEOUT_MS))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const DEPARTMENT_KEYWORDS: &str = "import.department_keywords"; // JSON 数组
    pub const STOPWORDS: &str = "import.stopwords"; // JSON 数组
    pub const DEFAULT_DEPARTMENT: &str = "import.default_department";
    pub const FIELD_POLICY: &str = "import.field_policy";
    pub const PERSIST_TIMEOUT_MS: &str = "import.persist_timeout_ms";
}
