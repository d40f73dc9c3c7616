// ==========================================
// 零件制造报价系统 - DFM 规则引擎
// ==========================================
// 依据: Quote_Engine_Specs_v1.0.md - 6. DFM Rule Engine
// 红线: 声明式开放规则表,新增检查只追加规则,不改既有逻辑;
//       规则独立无状态,单次分析平铺迭代一次
// ==========================================
// 职责: 几何/工艺/材料/公差/认证的可制造性分析
// 输入: RuleContext
// 输出: DfmReport (建议 + 覆盖层)
// ==========================================

use crate::domain::dfm::{DfmReport, Overlay, RuleContext, Suggestion};
use crate::domain::types::Severity;
use crate::engine::dfm_rules;
use tracing::{debug, instrument};

// ==========================================
// RuleHit - 单条规则命中结果
// ==========================================
pub struct RuleHit {
    pub suggestion: Suggestion,
    pub overlay: Option<Overlay>,
}

// ==========================================
// Trait: DfmRule
// ==========================================
// 每条规则 = (applies 谓词, evaluate 评估器) 对,纯函数
pub trait DfmRule: Send + Sync {
    /// 规则标识 (建议的 rule_id 来源)
    fn rule_id(&self) -> &'static str;

    /// 该规则是否适用于当前上下文 (通常是工艺判定)
    fn applies(&self, ctx: &RuleContext<'_>) -> bool;

    /// 评估规则
    ///
    /// # 返回
    /// - Some(RuleHit): 命中,产出建议 (可附覆盖层)
    /// - None: 未命中或所需指标缺失
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<RuleHit>;
}

// ==========================================
// DfmEngine - DFM 规则引擎
// ==========================================
pub struct DfmEngine {
    rules: Vec<Box<dyn DfmRule>>,
}

impl Default for DfmEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DfmEngine {
    /// 创建带内置规则表的引擎实例
    pub fn new() -> Self {
        Self {
            rules: dfm_rules::default_rules(),
        }
    }

    /// 使用自定义规则表创建 (测试/扩展用)
    pub fn with_rules(rules: Vec<Box<dyn DfmRule>>) -> Self {
        Self { rules }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 执行可制造性分析
    ///
    /// 对每条 applies 的规则执行 evaluate,收集非空结果。
    /// ok = 无 ERROR 级建议。
    #[instrument(skip(self, ctx), fields(process_kind = %ctx.process_kind))]
    pub fn analyze(&self, ctx: &RuleContext<'_>) -> DfmReport {
        let mut suggestions = Vec::new();
        let mut overlays = Vec::new();

        for rule in &self.rules {
            if !rule.applies(ctx) {
                continue;
            }
            if let Some(hit) = rule.evaluate(ctx) {
                debug!(rule_id = rule.rule_id(), severity = %hit.suggestion.severity, "规则命中");
                if let Some(overlay) = hit.overlay {
                    overlays.push(overlay);
                }
                suggestions.push(hit.suggestion);
            }
        }

        let ok = !suggestions.iter().any(|s| s.severity == Severity::Error);
        DfmReport {
            ok,
            suggestions,
            overlays,
        }
    }
}
