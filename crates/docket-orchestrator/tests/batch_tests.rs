//! Integration tests for docket-orchestrator
//!
//! Whole batches against the scripted adapter and the in-memory store.

use docket_domain::{
    AdapterError, DocType, DocTypeRegistry, Document, DocumentEntity, FileStatus,
};
use docket_extractor::PromptLibrary;
use docket_llm::{MockAdapter, MockOperation};
use docket_orchestrator::{cancel_pair, BatchOrchestrator, OrchestratorConfig, OrchestratorError};
use docket_store::MemoryStore;
use std::io::{Cursor, Write};
use std::sync::Arc;
use std::time::Duration;

const BATCH: &str = "batch";

fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig {
        retry_backoff_ms: 1,
        call_timeout_secs: 30,
        ..OrchestratorConfig::default()
    }
}

fn orchestrator(
    adapter: &MockAdapter,
    store: &MemoryStore,
    config: OrchestratorConfig,
) -> BatchOrchestrator<MockAdapter, MemoryStore> {
    let registry = Arc::new(DocTypeRegistry::builtin());
    let prompts = PromptLibrary::defaults(&registry);
    BatchOrchestrator::new(
        Arc::new(adapter.clone()),
        Arc::new(store.clone()),
        registry,
        prompts,
        config,
    )
}

fn zip_bundle(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

const INVOICE: &str = "```json\n{\"nit\": \"900123\", \"supplierName\": \"Acme Ltda\", \
                       \"billExpeditionDate\": \"2024-03-01\", \"totalAmount\": \"1190.00\", \
                       \"products\": [{\"description\": \"Paper\", \"quantity\": 2}]}\n```";

const INVOICE_AUDIT: &str = "```json\n{\"scores\": {\"nit\": 1, \"supplierName\": 0.5, \
                             \"billExpeditionDate\": 1}, \
                             \"explanation\": \"supplierName is partly illegible.\"}\n```";

const TRUNCATED_STATEMENT: &str = "```json\n{\n  \"bankName\": \"Banco Uno\",\n  \
     \"movements\": [\n    \
     {\"date\": \"2024-01-02\", \"value\": 150.5, \"subsequentBalance\": 1150.5},\n    \
     {\"date\": \"2024-01-03\", \"value\": -50, \"subsequentBalance\": 1100.5},\n    \
     {\"date\": \"2024-01-04\", \"val";

const STATEMENT_CONTINUATION: &str =
    "```json\n[{\"date\": \"2024-01-04\", \"value\": 20, \"subsequentBalance\": 1120.5}\n]\n}\n```";

#[tokio::test]
async fn test_three_file_batch() {
    let store = MemoryStore::new();
    store.insert(BATCH, "a.pdf", b"%PDF-a".to_vec());
    store.insert(BATCH, "b.pdf", b"%PDF-b".to_vec());
    store.insert(BATCH, "c.pdf", b"%PDF-c".to_vec());

    let adapter = MockAdapter::new();
    adapter.set_classification("b.pdf", "Invoice");
    adapter.set_classification("c.pdf", "BankStatement");
    adapter.push_extraction("b.pdf", INVOICE);
    adapter.push_extraction("c.pdf", TRUNCATED_STATEMENT);
    adapter.push_extraction("c.pdf", STATEMENT_CONTINUATION);
    adapter.add_prompt_response("Acme Ltda", INVOICE_AUDIT);

    let report = orchestrator(&adapter, &store, fast_config())
        .run_batch(BATCH, "any")
        .await
        .unwrap();
    assert_eq!(report.results.len(), 3);

    let a = &report.results[0];
    assert_eq!(a.file_name, "a.pdf");
    assert_eq!(a.status, FileStatus::Error);
    assert!(a.invalid_format);
    assert!(a.error_reason.as_deref().unwrap().contains("uncategorized"));
    assert!(adapter.calls_for(MockOperation::Extract, "a.pdf").is_empty());

    let b = &report.results[1];
    assert_eq!(b.status, FileStatus::Processed);
    assert_eq!(b.classified_as, Some(DocType::Invoice));
    let score = b.score.unwrap();
    assert!((0.0..=1.0).contains(&score));
    let explanation = b.score_explanation.as_deref().unwrap();
    assert!(explanation.starts_with("supplierName is partly illegible."));
    assert_eq!(
        b.field_issues.get("supplierName"),
        Some(&Some("supplierName is partly illegible".to_string()))
    );
    assert_eq!(b.repair_attempts, 0);

    let c = &report.results[2];
    assert_eq!(c.status, FileStatus::Processed);
    assert_eq!(c.repair_attempts, 1);
    assert_eq!(adapter.calls_for(MockOperation::Extract, "c.pdf").len(), 2);
    match c.entity.as_ref().unwrap() {
        DocumentEntity::BankStatement(statement) => {
            assert_eq!(statement.bank_name.as_deref(), Some("Banco Uno"));
            assert_eq!(statement.movements.len(), 3);
            assert!(statement.trusts.is_empty());
        }
        other => panic!("unexpected entity {:?}", other),
    }

    assert_eq!(report.summary.processed, 2);
    assert_eq!(report.summary.errored, 1);
    assert_eq!(report.summary.invalid_format, 1);
    assert_eq!(report.summary.repaired, 1);
    assert_eq!(report.summary.repair_attempts, 1);
}

#[tokio::test]
async fn test_download_gate_caps_concurrency() {
    let store = MemoryStore::new().with_download_latency(Duration::from_millis(20));
    for i in 0..120 {
        store.insert(BATCH, &format!("scan-{:03}.pdf", i), vec![0u8; 8]);
    }
    let adapter = MockAdapter::new();
    let config = OrchestratorConfig {
        download_concurrency: 50,
        ..fast_config()
    };

    let report = orchestrator(&adapter, &store, config)
        .run_batch(BATCH, "any")
        .await
        .unwrap();

    assert_eq!(report.results.len(), 120);
    assert_eq!(store.download_count(), 120);
    assert!(store.max_concurrent_downloads() <= 50);
    assert!(store.max_concurrent_downloads() > 1);
}

#[tokio::test]
async fn test_processing_gate_caps_model_calls() {
    let store = MemoryStore::new();
    for i in 0..10 {
        store.insert(BATCH, &format!("{}.png", i), vec![1]);
    }
    let adapter = MockAdapter::new().with_latency(Duration::from_millis(10));
    let config = OrchestratorConfig {
        processing_concurrency: 3,
        ..fast_config()
    };

    let report = orchestrator(&adapter, &store, config)
        .run_batch(BATCH, "any")
        .await
        .unwrap();

    assert_eq!(report.results.len(), 10);
    assert!(adapter.max_in_flight() <= 3);
}

#[tokio::test]
async fn test_cancellation_ends_tasks_in_error() {
    let store = MemoryStore::new();
    for i in 0..5 {
        store.insert(BATCH, &format!("{}.pdf", i), vec![1]);
    }
    let adapter = MockAdapter::new().with_latency(Duration::from_secs(10));
    let orchestrator = orchestrator(&adapter, &store, fast_config());

    let (handle, signal) = cancel_pair();
    let run = orchestrator.run_batch_with_cancel(BATCH, "any", signal);
    let cancel = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    };
    let (report, ()) = tokio::join!(run, cancel);
    let report = report.unwrap();

    assert_eq!(report.results.len(), 5);
    assert_eq!(report.summary.cancelled, 5);
    assert!(report
        .results
        .iter()
        .all(|r| r.error_reason.as_deref() == Some("Cancelled")));
}

#[tokio::test]
async fn test_missing_template_fails_before_listing() {
    let store = MemoryStore::new();
    store.insert(BATCH, "a.pdf", vec![1]);
    let registry = Arc::new(DocTypeRegistry::builtin());
    let orchestrator = BatchOrchestrator::new(
        Arc::new(MockAdapter::new()),
        Arc::new(store.clone()),
        registry,
        PromptLibrary::new("Pick one of {categories}"),
        fast_config(),
    );

    let err = orchestrator.run_batch(BATCH, "any").await.unwrap_err();
    assert!(matches!(err, OrchestratorError::Configuration(_)));
    assert_eq!(store.download_count(), 0);
}

#[tokio::test]
async fn test_unlistable_container() {
    let store = MemoryStore::new();
    let err = orchestrator(&MockAdapter::new(), &store, fast_config())
        .run_batch("missing", "any")
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::Listing(_)));
}

#[tokio::test]
async fn test_archive_entries_become_tasks() {
    let store = MemoryStore::new();
    store.insert(
        BATCH,
        "bundle.zip",
        zip_bundle(&[("mail.pdf", b"%PDF"), ("notes.txt", b"ignored")]),
    );
    let adapter = MockAdapter::new();
    adapter.set_classification("mail.pdf", "Email");
    adapter.push_extraction(
        "mail.pdf",
        r#"{"email": "ana@example.com", "subject": "Invoice", "body": "See attached", "date": "2024-05-02", "attachmentCount": 1}"#,
    );
    adapter.add_prompt_response(
        "ana@example.com",
        r#"{"scores": {"email": "ana@example.com", "subject": "Invoice", "body": "See attached", "date": "2024-05-02", "attachment_count": 1}, "explanation": ""}"#,
    );

    let report = orchestrator(&adapter, &store, fast_config())
        .run_batch(BATCH, "Email")
        .await
        .unwrap();

    assert_eq!(report.summary.archives_flattened, 1);
    assert_eq!(report.results.len(), 1);
    let mail = &report.results[0];
    assert_eq!(mail.file_name, "mail.pdf");
    assert_eq!(mail.parent_archive.as_deref(), Some("bundle.zip"));
    assert_eq!(mail.status, FileStatus::Processed);
    assert_eq!(mail.score, Some(100.0));
    assert!(report.warnings.iter().any(|w| w.contains("notes.txt")));
    assert_eq!(store.paths(BATCH), vec!["bundle/mail.pdf"]);
}

#[tokio::test]
async fn test_listing_skips_and_oversized_files() {
    let store = MemoryStore::new();
    store.insert(BATCH, "big.pdf", vec![0u8; 64]);
    store.insert(BATCH, "readme.txt", vec![1]);
    store.insert(BATCH, "a/b/deep.pdf", vec![1]);
    let config = OrchestratorConfig {
        max_file_size_bytes: 16,
        ..fast_config()
    };

    let report = orchestrator(&MockAdapter::new(), &store, config)
        .run_batch(BATCH, "any")
        .await
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert!(report.results[0]
        .error_reason
        .as_deref()
        .unwrap()
        .starts_with("File too large"));
    assert_eq!(report.summary.skipped, 2);
    assert_eq!(store.download_count(), 0);
}

#[tokio::test]
async fn test_transient_failures_are_retried_then_fail_the_file() {
    let store = MemoryStore::new();
    store.insert(BATCH, "a.pdf", vec![1]);
    store.insert(BATCH, "b.pdf", vec![1]);
    let adapter = MockAdapter::new();
    adapter.set_classification_error("a.pdf", AdapterError::Transient("429".into()));
    adapter.set_classification("b.pdf", "Email");

    let report = orchestrator(&adapter, &store, fast_config())
        .run_batch(BATCH, "any")
        .await
        .unwrap();

    // 1 attempt + 3 retries
    assert_eq!(adapter.calls_for(MockOperation::Classify, "a.pdf").len(), 4);
    assert!(report.results[0]
        .error_reason
        .as_deref()
        .unwrap()
        .starts_with("Transient service error"));
    assert!(!report.results[0].invalid_format);
    assert_eq!(report.results[1].status, FileStatus::Processed);
}

#[tokio::test]
async fn test_truncated_type_without_repair_profile() {
    let store = MemoryStore::new();
    store.insert(BATCH, "inv.pdf", vec![1]);
    let adapter = MockAdapter::new();
    adapter.set_classification("inv.pdf", "Invoice");
    adapter.push_extraction("inv.pdf", "```json\n{\"nit\": \"900\", \"products\": [{\"desc");

    let report = orchestrator(&adapter, &store, fast_config())
        .run_batch(BATCH, "Invoice")
        .await
        .unwrap();

    let result = &report.results[0];
    assert_eq!(result.status, FileStatus::Error);
    assert_eq!(result.classified_as, Some(DocType::Invoice));
    assert!(result.error_reason.as_deref().unwrap().contains("does not support reprocessing"));
    assert_eq!(adapter.calls_for(MockOperation::Extract, "inv.pdf").len(), 1);
}

#[tokio::test]
async fn test_failed_audit_uses_fallback_score() {
    let store = MemoryStore::new();
    store.insert(BATCH, "mail.pdf", vec![1]);
    let adapter = MockAdapter::new();
    adapter.set_classification("mail.pdf", "Email");
    adapter.push_extraction("mail.pdf", r#"{"email": "ana@example.com"}"#);
    adapter.add_prompt_error("ana@example.com", AdapterError::Permanent("400".into()));

    let report = orchestrator(&adapter, &store, fast_config())
        .run_batch(BATCH, "Invoice")
        .await
        .unwrap();

    let result = &report.results[0];
    assert_eq!(result.status, FileStatus::Processed);
    assert!((result.score.unwrap() - 70.0).abs() < 1e-9);
    assert!(result
        .score_explanation
        .as_deref()
        .unwrap()
        .contains("could not be audited"));
}

#[tokio::test]
async fn test_failed_recovery_keeps_continuation_count() {
    let store = MemoryStore::new();
    store.insert(BATCH, "c.pdf", vec![1]);
    let adapter = MockAdapter::new();
    adapter.set_classification("c.pdf", "BankStatement");
    adapter.push_extraction("c.pdf", TRUNCATED_STATEMENT);
    adapter.push_extraction(
        "c.pdf",
        "[{\"value\": 20, \"subsequentBalance\": 1120.5}, {\"va",
    );
    adapter.push_extraction_error("c.pdf", AdapterError::Permanent("400".into()));

    let report = orchestrator(&adapter, &store, fast_config())
        .run_batch(BATCH, "any")
        .await
        .unwrap();

    let result = &report.results[0];
    assert_eq!(result.status, FileStatus::Error);
    assert_eq!(result.repair_attempts, 2);
    assert_eq!(adapter.calls_for(MockOperation::Extract, "c.pdf").len(), 3);
    assert_eq!(report.summary.repair_attempts, 2);
}

#[tokio::test]
async fn test_statement_cut_outside_lists_is_not_accepted() {
    let store = MemoryStore::new();
    store.insert(BATCH, "c.pdf", vec![1]);
    let adapter = MockAdapter::new();
    adapter.set_classification("c.pdf", "BankStatement");
    adapter.push_extraction(
        "c.pdf",
        "```json\n{\"bankName\": \"Banco Uno\", \"finalBalance\": 12",
    );

    let report = orchestrator(&adapter, &store, fast_config())
        .run_batch(BATCH, "any")
        .await
        .unwrap();

    let result = &report.results[0];
    assert_eq!(result.status, FileStatus::Error);
    assert!(result.entity.is_none());
    assert!(result
        .error_reason
        .as_deref()
        .unwrap()
        .starts_with("Reprocessing aborted"));
    assert_eq!(result.repair_attempts, 0);
    assert_eq!(adapter.calls_for(MockOperation::Extract, "c.pdf").len(), 1);
}

#[tokio::test]
async fn test_single_document_matching_type() {
    let store = MemoryStore::new();
    let adapter = MockAdapter::new();
    adapter.set_classification("invoice.pdf", "invoice");
    adapter.push_extraction("invoice.pdf", INVOICE);
    adapter.add_prompt_response("Acme Ltda", INVOICE_AUDIT);

    let result = orchestrator(&adapter, &store, fast_config())
        .process_one(Document::new("invoice.pdf", b"%PDF".to_vec()), DocType::Invoice)
        .await
        .unwrap();

    assert_eq!(result.status, FileStatus::Processed);
    assert_eq!(result.file_name, "invoice.pdf");
    assert!(matches!(result.entity, Some(DocumentEntity::Invoice(_))));
    assert!(result.field_issues.contains_key("supplierName"));
    assert_eq!(store.download_count(), 0);
}

#[tokio::test]
async fn test_single_document_type_mismatch_is_rejected() {
    let store = MemoryStore::new();
    let adapter = MockAdapter::new();
    adapter.set_classification("cv.pdf", "CV");

    let result = orchestrator(&adapter, &store, fast_config())
        .process_one(Document::new("cv.pdf", b"%PDF".to_vec()), DocType::Invoice)
        .await
        .unwrap();

    assert_eq!(result.status, FileStatus::Error);
    assert_eq!(result.classified_as, Some(DocType::Cv));
    assert!(!result.invalid_format);
    assert_eq!(
        result.error_reason.as_deref(),
        Some("Document was classified as CV, not the requested Invoice")
    );
    assert!(adapter.calls_for(MockOperation::Extract, "cv.pdf").is_empty());
}

#[tokio::test]
async fn test_single_document_too_large() {
    let store = MemoryStore::new();
    let adapter = MockAdapter::new();
    let config = OrchestratorConfig {
        max_file_size_bytes: 4,
        ..fast_config()
    };

    let result = orchestrator(&adapter, &store, config)
        .process_one(Document::new("big.pdf", vec![0; 8]), DocType::Invoice)
        .await
        .unwrap();

    assert_eq!(result.status, FileStatus::Error);
    assert!(result.error_reason.as_deref().unwrap().starts_with("File too large"));
    assert_eq!(adapter.call_count(), 0);
}
