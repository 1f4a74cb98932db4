use std::path::Path;

use docqa::app::{Session, SessionError};
use docqa::ingest::IngestError;
use docqa::qa::QaService;
use docqa::{config, logging};
use httpmock::{Method::POST, MockServer};
use serde_json::json;
use tokio::sync::OnceCell;

static INIT: OnceCell<()> = OnceCell::const_new();

fn set_env(key: &str, value: &str) {
    // SAFETY: Tests run in a single process and establish deterministic configuration upfront.
    unsafe { std::env::set_var(key, value) }
}

async fn init_harness() {
    INIT.get_or_init(|| async {
        let mock_server = Box::leak(Box::new(MockServer::start_async().await));
        let base_url = mock_server.base_url();

        set_env("CHAT_API_URL", &base_url);
        set_env("EMBEDDING_API_URL", &base_url);
        set_env("GROQ_API_KEY", "test-chat-key");
        set_env("GOOGLE_API_KEY", "test-embed-key");

        mock_server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/embedding-001:batchEmbedContents");
                then.status(200).json_body(json!({
                    "embeddings": [
                        { "values": [0.6, 0.8] }
                    ]
                }));
            })
            .await;

        mock_server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(json!({
                    "choices": [
                        { "message": { "role": "assistant", "content": "The sky is blue." } }
                    ]
                }));
            })
            .await;

        config::init_config();
        logging::init_tracing();
    })
    .await;
}

/// Assemble a minimal one-page PDF containing `text`, with a correct xref
/// table computed from the actual byte offsets.
fn fixture_pdf(text: &str) -> Vec<u8> {
    let content = format!("BT /F1 12 Tf 72 712 Td ({text}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }
    let xref_offset = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    pdf.push_str("0000000000 65535 f \n");
    for offset in offsets {
        pdf.push_str(&format!("{offset:010} 00000 n \n"));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));
    pdf.into_bytes()
}

fn write_fixture(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, fixture_pdf(text)).expect("write fixture pdf");
    path
}

#[tokio::test]
async fn end_to_end_answers_from_a_fixture_pdf() {
    init_harness().await;

    let corpus = tempfile::tempdir().expect("tempdir");
    let pdf_path = write_fixture(corpus.path(), "sky.pdf", "The sky is blue.");

    let mut session = Session::new(QaService::new());
    let report = session
        .build_from_directory(corpus.path())
        .await
        .expect("index build");
    assert_eq!(report.files, 1);
    assert_eq!(report.pages, 1);
    assert_eq!(report.chunks, 1);

    let answer = session
        .ask("What color is the sky?")
        .await
        .expect("answer");
    assert!(
        answer.answer_text.contains("blue"),
        "unexpected answer: {}",
        answer.answer_text
    );
    assert_eq!(answer.supporting_chunks.len(), 1);

    let chunk = &answer.supporting_chunks[0];
    assert_eq!(chunk.page_number, 1);
    assert_eq!(chunk.source_path, pdf_path);
    assert!(chunk.text.contains("sky"));
}

#[tokio::test]
async fn question_before_build_is_rejected() {
    init_harness().await;

    let mut session = Session::new(QaService::new());
    let error = session.ask("What color is the sky?").await.unwrap_err();
    assert!(matches!(error, SessionError::IndexNotReady));
    // The question is still recorded, matching the original tool's behavior.
    assert_eq!(session.state().history(), ["What color is the sky?"]);
}

#[tokio::test]
async fn empty_corpus_directory_fails_the_build() {
    init_harness().await;

    let corpus = tempfile::tempdir().expect("tempdir");
    let mut session = Session::new(QaService::new());
    let error = session
        .build_from_directory(corpus.path())
        .await
        .unwrap_err();
    assert!(matches!(error, SessionError::Ingest(IngestError::NoFiles)));
    assert!(session.state().index().is_none());
}

#[tokio::test]
async fn rebuild_replaces_the_index_wholesale() {
    init_harness().await;

    let corpus = tempfile::tempdir().expect("tempdir");
    write_fixture(corpus.path(), "sky.pdf", "The sky is blue.");

    let mut session = Session::new(QaService::new());
    let first = session
        .build_from_directory(corpus.path())
        .await
        .expect("first build");
    assert!(!first.replaced_previous);

    let second = session
        .build_from_directory(corpus.path())
        .await
        .expect("second build");
    assert!(second.replaced_previous);
    assert_eq!(session.state().index().map(|index| index.len()), Some(1));
}
