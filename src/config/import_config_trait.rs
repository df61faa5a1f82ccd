// ==========================================
// 目录系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::import_settings::DepartmentKeywords;
use crate::importer::data_cleaner::FieldPolicy;
use async_trait::async_trait;
use std::error::Error;

pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（config_kv 表）、ImportSettings（内存）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 部门关键字表（有序，先匹配者胜）
    ///
    /// # 默认值
    /// - 内置 8 个部门的西语关键字
    async fn get_department_keywords(&self) -> ConfigResult<Vec<DepartmentKeywords>>;

    /// 名称生成时忽略的停用词
    ///
    /// # 默认值
    /// - de, del, la, el, con, para, por, en, y, o, tipo, color
    async fn get_stopwords(&self) -> ConfigResult<Vec<String>>;

    /// 关键字未命中时的部门
    ///
    /// # 默认值
    /// - ferreteria
    async fn get_default_department(&self) -> ConfigResult<String>;

    /// 缺失值策略
    ///
    /// # 默认值
    /// - DefaultOnMissing
    async fn get_field_policy(&self) -> ConfigResult<FieldPolicy>;

    /// 单条草稿落库超时（毫秒）
    ///
    /// # 默认值
    /// - 10000
    async fn get_persist_timeout_ms(&self) -> ConfigResult<u64>;
}
