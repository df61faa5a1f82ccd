// ==========================================
// 目录系统 - 导入参数快照
// ==========================================
// 职责: 一次导入所需的全部可配置参数（每次导入开始时读取一次）
// 默认值: 内置的西语关键字表 / 停用词表
// ==========================================

use crate::config::import_config_trait::{ConfigResult, ImportConfigReader};
use crate::importer::data_cleaner::FieldPolicy;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 默认部门（关键字表未命中时）
pub const DEFAULT_DEPARTMENT: &str = "ferreteria";

/// 默认落库超时（毫秒）
pub const DEFAULT_PERSIST_TIMEOUT_MS: u64 = 10_000;

/// 部门 → 关键字（表顺序即匹配优先级）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentKeywords {
    pub departamento: String,
    pub keywords: Vec<String>,
}

impl DepartmentKeywords {
    fn new(departamento: &str, keywords: &[&str]) -> Self {
        Self {
            departamento: departamento.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSettings {
    pub department_keywords: Vec<DepartmentKeywords>,
    pub stopwords: Vec<String>,
    pub default_department: String,
    pub field_policy: FieldPolicy,
    pub persist_timeout_ms: u64,
}

pub fn default_department_keywords() -> Vec<DepartmentKeywords> {
    vec![
        DepartmentKeywords::new(
            "construccion",
            &[
                "placa", "módulo", "modulo", "abs", "oslo", "blanco", "construcción",
                "construccion", "material", "malla", "ciclón", "ciclon",
            ],
        ),
        DepartmentKeywords::new(
            "ferreteria",
            &[
                "martillo", "destornillador", "llave", "tornillo", "clavo", "herramienta",
                "taladro", "sierra", "multicontacto",
            ],
        ),
        DepartmentKeywords::new(
            "electrico",
            &[
                "cable", "interruptor", "contacto", "foco", "lámpara", "lampara", "eléctrico",
                "electrico", "voltaje", "corriente",
            ],
        ),
        DepartmentKeywords::new(
            "plomeria",
            &[
                "tubería", "tuberia", "llave", "regadera", "codo", "tee", "válvula", "valvula",
                "agua", "hidráulico", "hidraulico", "pvc",
            ],
        ),
        DepartmentKeywords::new(
            "pinturas",
            &[
                "pintura", "barniz", "esmalte", "primer", "brocha", "rodillo", "color",
                "acabado", "aerosol",
            ],
        ),
        DepartmentKeywords::new(
            "limpieza",
            &[
                "detergente", "jabón", "jabon", "limpiador", "desinfectante", "cloro",
                "limpieza",
            ],
        ),
        DepartmentKeywords::new(
            "azulejos",
            &[
                "azulejo", "piso", "cerámica", "ceramica", "porcelanato", "mosaico", "baldosa",
            ],
        ),
        DepartmentKeywords::new(
            "sanitarios",
            &["inodoro", "lavabo", "regadera", "tina", "sanitario", "wc"],
        ),
    ]
}

pub fn default_stopwords() -> Vec<String> {
    [
        "de", "del", "la", "el", "con", "para", "por", "en", "y", "o", "tipo", "color",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            department_keywords: default_department_keywords(),
            stopwords: default_stopwords(),
            default_department: DEFAULT_DEPARTMENT.to_string(),
            field_policy: FieldPolicy::DefaultOnMissing,
            persist_timeout_ms: DEFAULT_PERSIST_TIMEOUT_MS,
        }
    }
}

impl ImportSettings {
    /// 从配置读取器加载完整快照
    pub async fn load<C: ImportConfigReader + ?Sized>(reader: &C) -> ConfigResult<Self> {
        Ok(Self {
            department_keywords: reader.get_department_keywords().await?,
            stopwords: reader.get_stopwords().await?,
            default_department: reader.get_default_department().await?,
            field_policy: reader.get_field_policy().await?,
            persist_timeout_ms: reader.get_persist_timeout_ms().await?,
        })
    }

    pub fn with_field_policy(mut self, policy: FieldPolicy) -> Self {
        self.field_policy = policy;
        self
    }

    pub fn with_persist_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.persist_timeout_ms = timeout_ms;
        self
    }
}

// 内存配置：测试与无数据库场景直接使用
#[async_trait]
impl ImportConfigReader for ImportSettings {
    async fn get_department_keywords(&self) -> ConfigResult<Vec<DepartmentKeywords>> {
        Ok(self.department_keywords.clone())
    }

    async fn get_stopwords(&self) -> ConfigResult<Vec<String>> {
        Ok(self.stopwords.clone())
    }

    async fn get_default_department(&self) -> ConfigResult<String> {
        Ok(self.default_department.clone())
    }

    async fn get_field_policy(&self) -> ConfigResult<FieldPolicy> {
        Ok(self.field_policy)
    }

    async fn get_persist_timeout_ms(&self) -> ConfigResult<u64> {
        Ok(self.persist_timeout_ms)
    }
}
