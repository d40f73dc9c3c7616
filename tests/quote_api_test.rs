// ==========================================
// QuoteApi 业务接口 E2E 测试
// ==========================================
// 测试目标: 报价 → 选机 → 产能预占的完整链路
// 覆盖范围: price_and_reserve、DFM 分析、入参校验
// ==========================================


use mfg_quoting::api::{ApiError, QuoteApi};
use mfg_quoting::config::ConfigManager;
use mfg_quoting::domain::material::Tolerance;
use mfg_quoting::domain::types::{LeadTimeClass, ProcessKind, Severity, SuggestionCategory};
use mfg_quoting::repository::{
    CapacityDayRepository, MachineRepository, RateCardRepository, SqliteCatalog,
};
use std::sync::Arc;

use test_helpers::{
    create_test_db, make_cnc_machine, reference_quote_item, seed_machines, seed_rate_card,
};

type TestApi = QuoteApi<SqliteCatalog, CapacityDayRepository, ConfigManager>;

/// 创建测试环境
fn setup_api(db_path: &str) -> (TestApi, Arc<CapacityDayRepository>) {
    let catalog = Arc::new(SqliteCatalog::new(
        Arc::new(MachineRepository::new(db_path).unwrap()),
        Arc::new(RateCardRepository::new(db_path).unwrap()),
    ));
    let capacity = Arc::new(CapacityDayRepository::new(db_path).unwrap());
    let config = Arc::new(ConfigManager::new(db_path).unwrap());
    (
        QuoteApi::new(catalog, capacity.clone(), config),
        capacity,
    )
}

// ==========================================
// 测试用例 1: 报价 + 预占链路
// ==========================================

#[tokio::test]
async fn test_price_and_reserve_commits_capacity() {
    let (_temp, db_path) = create_test_db().unwrap();
    seed_rate_card(&db_path).unwrap();
    seed_machines(&db_path, &[make_cnc_machine("CNC-A", 2.0)]).unwrap();
    let (api, capacity) = setup_api(&db_path);

    let mut item = reference_quote_item();
    item.quantity = 100;

    let result = api.price_and_reserve(&item).await.unwrap();
    assert_eq!(result.machine_id, "CNC-A");
    assert!(result.machine_minutes > 0.0);
    // 标准交期窗口从 +3 天开始,承诺交期不早于窗口起点
    assert!(result.promised_lead_days >= 3);

    // 预占已落到产能日历
    let reserved_day = chrono::Utc::now().date_naive()
        + chrono::Duration::days(result.promised_lead_days);
    let record = capacity
        .find_by_machine_and_day("CNC-A", reserved_day)
        .unwrap()
        .expect("预占日记录应存在");
    assert!((record.minutes_reserved - result.machine_minutes).abs() < 1e-9);
}

// ==========================================
// 测试用例 2: 兜底报价不做预占
// ==========================================

#[tokio::test]
async fn test_fallback_quote_skips_reservation() {
    let (_temp, db_path) = create_test_db().unwrap();
    seed_rate_card(&db_path).unwrap();
    // 目录无机台
    let (api, capacity) = setup_api(&db_path);

    let result = api.price_and_reserve(&reference_quote_item()).await.unwrap();
    assert!(result.used_rate_card_fallback);

    // 伪机台没有产能日历
    let records = capacity
        .find_by_date_range(
            "RATE_CARD",
            chrono::Utc::now().date_naive(),
            chrono::Utc::now().date_naive() + chrono::Duration::days(40),
        )
        .unwrap();
    assert!(records.is_empty());
}

// ==========================================
// 测试用例 3: DFM 分析 (多规则组合)
// ==========================================

#[tokio::test]
async fn test_analyze_combines_rules() {
    let (_temp, db_path) = create_test_db().unwrap();
    let (api, _) = setup_api(&db_path);

    let mut item = reference_quote_item();
    item.process_kind = ProcessKind::SandCasting;
    item.purpose = Some("machining".to_string());
    item.certifications = vec!["AS9100".to_string()];
    item.tolerance = Some(Tolerance {
        tolerance_id: "T-FINE".to_string(),
        name: "精密".to_string(),
        value_mm: 0.1, // 细于铸造能力 0.5
        cost_multiplier: 1.4,
    });
    item.geometry.draft_angle_deg = Some(0.5); // ERROR
    item.geometry.machining_allowance_mm = Some(1.0); // 成本警告

    let report = api.analyze(&item).unwrap();
    assert!(!report.ok, "拔模角 ERROR 应使 ok=false");

    let ids: Vec<&str> = report
        .suggestions
        .iter()
        .map(|s| s.rule_id.as_str())
        .collect();
    assert!(ids.contains(&"draft_angle"));
    assert!(ids.contains(&"machining_allowance"));
    assert!(ids.contains(&"tolerance_capability"));
    assert!(ids.contains(&"certifications"));

    // 认证提示为 INFO/成本类
    let cert = report
        .suggestions
        .iter()
        .find(|s| s.rule_id == "certifications")
        .unwrap();
    assert_eq!(cert.severity, Severity::Info);
    assert_eq!(cert.category, SuggestionCategory::Cost);
}

// ==========================================
// 测试用例 4: 入参校验
// ==========================================

#[tokio::test]
async fn test_invalid_inputs_rejected() {
    let (_temp, db_path) = create_test_db().unwrap();
    seed_rate_card(&db_path).unwrap();
    let (api, _) = setup_api(&db_path);

    // 空阶梯列表
    let err = api
        .price_tiers(&reference_quote_item(), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    // 非法几何
    let mut bad_geom = reference_quote_item();
    bad_geom.geometry.volume_mm3 = -1.0;
    assert!(matches!(
        api.analyze(&bad_geom).unwrap_err(),
        ApiError::ValidationError(_)
    ));
    assert!(matches!(
        api.price(&bad_geom).await.unwrap_err(),
        ApiError::ValidationError(_)
    ));

    // 非法预占分钟数
    let err = api
        .reserve("CNC-A", 0.0, LeadTimeClass::Standard)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

// ==========================================
// 测试用例 5: 空区域回填默认区域
// ==========================================

#[tokio::test]
async fn test_empty_region_uses_configured_default() {
    let (_temp, db_path) = create_test_db().unwrap();
    seed_rate_card(&db_path).unwrap(); // 默认区域 CN-EAST 的费率卡
    let (api, _) = setup_api(&db_path);

    let mut item = reference_quote_item();
    item.region = String::new();

    // 回填 CN-EAST 后可正常兜底报价
    let result = api.price(&item).await.unwrap();
    assert!(result.used_rate_card_fallback);
}

// ==========================================
// 测试用例 6: 可行性接口直通
// ==========================================

#[tokio::test]
async fn test_check_feasibility_passthrough() {
    let (_temp, db_path) = create_test_db().unwrap();
    let (api, _) = setup_api(&db_path);

    let mut machine = make_cnc_machine("CNC-A", 2.0);
    machine.envelope = Some(mfg_quoting::domain::geometry::BoundingBox::new(
        50.0, 50.0, 50.0,
    ));

    let result = api.check_feasibility(&reference_quote_item(), &machine);
    assert!(!result.ok);
    assert_eq!(result.warnings[0].severity, Severity::Error);
}
