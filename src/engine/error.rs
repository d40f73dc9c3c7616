// ==========================================
// 零件制造报价系统 - 引擎层错误类型
// ==========================================
// 依据: Quoting_Master_Spec.md - PART F 错误分级
// 红线: 校验错误立即上抛,永不内部重试;
//       可行性/兜底类问题随结果返回,永不抛出
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 校验错误 (缺失必要基准数据,致命) =====
    #[error("数据校验失败: {0}")]
    Validation(String),

    // ===== 协作方错误 =====
    #[error("目录读取失败: {0}")]
    Catalog(String),

    #[error("产能存储访问失败: {0}")]
    Capacity(String),

    // ===== 通用错误 =====
    #[error("引擎内部错误: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    /// 是否为校验错误 (调用方据此决定是否直接向用户暴露)
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
