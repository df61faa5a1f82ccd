// ==========================================
// 目录系统 - 导入落库 Repository Trait
// ==========================================
// 职责: 导入器与存储之间的接缝（不包含业务逻辑）
// 说明: 同步接口，由导入器在 spawn_blocking 中调用并加超时
// ==========================================

use crate::domain::pieza::{Pieza, PiezaDraft};
use crate::repository::error::RepositoryResult;

// ==========================================
// CatalogImportRepository Trait
// ==========================================
// 实现者: PiezaRepository（rusqlite）
pub trait CatalogImportRepository: Send + Sync + 'static {
    /// 落库单条草稿
    ///
    /// # 返回
    /// - Ok(Pieza): 分配正式 id 与时间戳后的记录
    /// - Err: 数据库错误
    fn insert_draft(&self, draft: &PiezaDraft) -> RepositoryResult<Pieza>;
}
