use prior_auth_portal::models::{CodeSuggestion, DocumentFields, NewOrder, OrderStatus};
use prior_auth_portal::services::json_extract::parse_json_object;
use prior_auth_portal::store::{AuthStore, OrderStore};
use prior_auth_portal::ui::{ListView, StatusFilter};
use prior_auth_portal::{Config, IntakeFlow, PriorAuthorization, ReviewFlow, ReviewInput};

/// 就诊单样例文本
const SAMPLE_VISIT_NOTE: &str = "Patient: John Cena\nDOB: 04/28/1997\n\
Assessment: Osteoarthritis of right knee (M17.11).\n\
Plan: Order MRI of the Right Knee Without Contrast.";

/// 录入管线的离线联调：各阶段用固定的模型输出走同一条解析路径，
/// 最终落库的记录必须满足编码序列化契约
#[tokio::test]
async fn test_intake_seams_with_canned_model_output() {
    // 阶段 1: 字段抽取（模型把 JSON 包在客套话里）
    let extraction_content = r#"Here is what I extracted:
{"patient_name":"John Cena","patient_dob":"04/28/1997","medical_plan":"Order MRI of the Right Knee Without Contrast","diagnostic_impressions":"Osteoarthritis of right knee (M17.11)","icd_codes":["M17.11"]}"#;
    let fields: DocumentFields = parse_json_object(extraction_content).unwrap();
    assert_eq!(fields.patient_name, "John Cena");
    assert_eq!(fields.icd_codes, vec!["M17.11"]);

    // 阶段 2: 编码建议
    let suggestion_content = r#"{"cptCode":["99213"],"description":"Office visit","cptCodesExplanation":"99213 covers the requested evaluation."}"#;
    let suggestion: CodeSuggestion = parse_json_object(suggestion_content).unwrap();
    assert_eq!(suggestion.cpt_codes, vec!["99213"]);

    // 阶段 3: 落库
    let store = AuthStore::new();
    let auth = store
        .create_from_intake(&fields, &suggestion, Some("EMP-1".to_string()))
        .await;

    assert_eq!(auth.icd_codes, vec!["M17.11"]);
    assert_eq!(auth.cpt_codes, vec!["99213"]);

    // 线上形式: 编码是 JSON 文本字符串，往返后恢复数组
    let wire = serde_json::to_value(&auth).unwrap();
    assert_eq!(wire["icdCodes"], serde_json::json!("[\"M17.11\"]"));
    assert_eq!(wire["cptCodes"], serde_json::json!("[\"99213\"]"));
    let back: PriorAuthorization = serde_json::from_value(wire).unwrap();
    assert_eq!(back.icd_codes, vec!["M17.11"]);
    assert_eq!(back.cpt_codes, vec!["99213"]);
}

/// 订阅推送全量快照，消费端整表替换后新记录在头部
#[tokio::test]
async fn test_order_subscription_replaces_list_wholesale() {
    let store = OrderStore::new();
    let mut sub = store.observe_all().await;
    let mut view: ListView<prior_auth_portal::Order> = ListView::new();
    view.replace(sub.snapshot().to_vec());
    assert!(view.is_empty());

    store
        .create(NewOrder {
            customer_name: "Alice".to_string(),
            customer_email: "alice@example.com".to_string(),
            customer_id: "CUST-1".to_string(),
            total_amount: None,
            sku: "SKU-1".to_string(),
            status: None,
            shipping_address: serde_json::json!({"city": "Austin"}),
            payment_details: None,
        })
        .await;
    store
        .create(NewOrder {
            customer_name: "Bob".to_string(),
            customer_email: "bob@example.com".to_string(),
            customer_id: "CUST-2".to_string(),
            total_amount: Some(42.5),
            sku: "SKU-2".to_string(),
            status: Some(OrderStatus::Processing),
            shipping_address: serde_json::json!({"city": "Dallas"}),
            payment_details: None,
        })
        .await;

    // 消费两次推送，拿到最终快照
    sub.next_snapshot().await.unwrap();
    let snapshot = sub.next_snapshot().await.unwrap().to_vec();
    view.replace(snapshot);

    assert_eq!(view.len(), 2);
    let visible = view.visible();
    assert_eq!(visible[0].customer_name, "Bob"); // 新记录在头部
    assert_eq!(visible[1].status, OrderStatus::Pending); // 表单路径默认 PENDING

    // 状态过滤大小写不敏感
    view.set_filter(StatusFilter::parse("processing"));
    assert_eq!(view.visible().len(), 1);
    view.set_filter(StatusFilter::parse("ALL"));
    assert_eq!(view.visible().len(), 2);
}

// ========== 以下为实时 API 测试，需要真实密钥 ==========
// 运行方式：cargo test -- --ignored

/// 测试完整录入管线（字段抽取 → 指南检索 → CPT 建议）
#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_full_intake_pipeline_live() {
    let _ = tracing_subscriber::fmt::try_init();

    // 加载配置
    let config = Config::from_env().expect("需要 OPENAI_API_KEY 与 RAGIE_AI_API_KEY");

    let flow = IntakeFlow::new(&config);
    let outcome = flow.run(SAMPLE_VISIT_NOTE).await.expect("录入管线失败");

    println!("抽取字段: {:?}", outcome.fields);
    println!("指南片段: {} 条", outcome.guideline_texts.len());
    println!("CPT 建议: {:?}", outcome.suggestion.cpt_codes);

    assert_eq!(outcome.fields.patient_name, "John Cena");
    assert!(!outcome.suggestion.cpt_codes.is_empty());

    // 落库后编码往返一致
    let store = AuthStore::new();
    let auth = store
        .create_from_intake(&outcome.fields, &outcome.suggestion, None)
        .await;
    assert_eq!(auth.icd_codes, outcome.fields.icd_codes);
}

/// 测试指南检索连通性
#[tokio::test]
#[ignore]
async fn test_guideline_retrieval_live() {
    let _ = tracing_subscriber::fmt::try_init();

    let config = Config::from_env().expect("需要 RAGIE_AI_API_KEY");
    let service = prior_auth_portal::services::GuidelineService::new(&config);

    let chunks = service.for_icd_codes(&["M17.11".to_string()]).await.expect("检索失败");
    println!("检索到 {} 条片段", chunks.len());
    for (i, chunk) in chunks.iter().take(3).enumerate() {
        println!(
            "  {}. score={:?} {}",
            i + 1,
            chunk.score,
            prior_auth_portal::utils::logging::truncate_text(&chunk.text, 80)
        );
    }
}

/// 测试编码复核流程（检索 + 校验）
#[tokio::test]
#[ignore]
async fn test_review_flow_live() {
    let _ = tracing_subscriber::fmt::try_init();

    let config = Config::from_env().expect("需要真实密钥");
    let flow = ReviewFlow::new(&config);

    let verdict = flow
        .validate(&ReviewInput {
            icd_codes: vec!["M17.11".to_string()],
            cpt_codes: vec!["73721".to_string()],
            cpt_codes_explanation: "MRI of lower extremity joint without contrast".to_string(),
        })
        .await
        .expect("复核失败");

    println!("isValid={} confidence={:?}", verdict.is_valid, verdict.confidence);
    assert!(!verdict.explanation.is_empty());
}
