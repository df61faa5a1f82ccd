// ==========================================
// 目录系统 - 品牌（marca）领域模型
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 品牌：商品线分组，每次导入只面向一个品牌
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marca {
    pub id: String,
    pub nombre: String,
    pub departamentos: Vec<String>, // 品牌可用的部门 id
    pub imagen: Option<String>,
    pub fecha_creacion: DateTime<Utc>,
}

/// 新建/更新品牌的输入（id 与创建时间由仓储生成）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMarca {
    pub nombre: String,
    pub departamentos: Vec<String>,
    pub imagen: Option<String>,
}
