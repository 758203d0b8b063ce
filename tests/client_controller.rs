mod common;

use axum::Router;
use axum::routing::post;
use common::{docx_with_body, read_rows, spawn_default_server};
use doc2sheet::client::{
    Action, ApiClient, ClientError, Controller, ControllerError, Phase, SelectedFile,
};
use doc2sheet::error::{ApiError, ErrorCode};
use doc2sheet::server::extract_text;
use reqwest::StatusCode;
use tokio::net::TcpListener;

async fn controller() -> (Controller, tempfile::TempDir) {
    let base = spawn_default_server().await;
    let downloads = tempfile::tempdir().expect("downloads dir");
    (Controller::new(ApiClient::new(base), downloads.path()), downloads)
}

#[tokio::test]
async fn extract_then_download_text_and_excel() {
    let (controller, downloads) = controller().await;
    controller
        .select_file(SelectedFile::new(
            "minutes.meeting.txt",
            b"Agenda\n\nBudget\n  \nActions".to_vec(),
        ))
        .expect("txt accepted");

    let text = controller.extract().await.expect("extract text");
    assert_eq!(text, "Agenda\n\nBudget\n  \nActions");
    assert_eq!(controller.phase(), Phase::Extracted);

    let text_path = controller.download_text().await.expect("save text");
    assert_eq!(text_path, downloads.path().join("minutes_extracted.txt"));
    assert_eq!(
        std::fs::read_to_string(&text_path).expect("read text"),
        "Agenda\n\nBudget\n  \nActions"
    );

    let excel_path = controller.download_excel().await.expect("save excel");
    assert_eq!(excel_path, downloads.path().join("minutes_extracted.xlsx"));
    let bytes = std::fs::read(&excel_path).expect("read excel");
    assert_eq!(
        read_rows(&bytes),
        vec!["Extracted Text", "Agenda", "Budget", "Actions"]
    );
    assert_eq!(controller.phase(), Phase::Extracted);
}

#[tokio::test]
async fn extracts_docx_through_server() {
    let (controller, _downloads) = controller().await;
    controller
        .select_file(SelectedFile::new(
            "letter.docx",
            docx_with_body("<w:p><w:r><w:t>Dear reader</w:t></w:r></w:p>"),
        ))
        .expect("docx accepted");

    assert_eq!(
        controller.extract().await.expect("extract docx"),
        "Dear reader\n\n"
    );
}

#[tokio::test]
async fn server_error_message_reaches_error_phase() {
    let (controller, _downloads) = controller().await;
    controller
        .select_file(SelectedFile::new("broken.docx", b"garbage".to_vec()))
        .expect("docx accepted");

    let error = controller.extract().await.expect_err("corrupt docx");

    match &error {
        ControllerError::Client(ClientError::Server { status, code, .. }) => {
            assert_eq!(*status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(*code, Some(ErrorCode::Extraction));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(controller.phase(), Phase::Error(error.to_string()));
    assert!(controller.extracted_text().is_none());
    assert!(!controller.is_busy(Action::Extract));
}

#[tokio::test]
async fn script_extraction_failure_is_reported() {
    let (controller, downloads) = controller().await;
    controller
        .select_file(SelectedFile::new("scan.pdf", b"%PDF-1.4".to_vec()))
        .expect("pdf accepted");

    let error = controller
        .python_extract()
        .await
        .expect_err("no script installed in test server");

    assert!(matches!(
        error,
        ControllerError::Client(ClientError::Server {
            code: Some(ErrorCode::ScriptNotFound),
            ..
        })
    ));
    assert!(matches!(controller.phase(), Phase::Error(_)));
    assert_eq!(std::fs::read_dir(downloads.path()).expect("list").count(), 0);
}

#[tokio::test]
async fn concurrent_actions_run_independently() {
    let (controller, _downloads) = controller().await;
    controller
        .select_file(SelectedFile::new("notes.txt", b"one\ntwo".to_vec()))
        .expect("txt accepted");
    controller.extract().await.expect("first extract");

    let (exported, extracted) = tokio::join!(controller.download_excel(), controller.extract());

    assert_eq!(extracted.expect("second extract"), "one\ntwo");
    assert!(exported.is_ok());
    assert!(!controller.is_busy(Action::Extract));
    assert!(!controller.is_busy(Action::Export));
    assert_eq!(controller.phase(), Phase::Extracted);
}

/// Server whose extraction works but whose spreadsheet export always fails.
async fn spawn_failing_export_server() -> String {
    async fn failing_export() -> ApiError {
        ApiError::new(ErrorCode::Export, "Failed to convert to Excel")
    }

    let router = Router::new()
        .route("/api/extract", post(extract_text))
        .route("/api/convert-to-excel", post(failing_export));
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move { axum::serve(listener, router).await });
    format!("http://{addr}")
}

#[tokio::test]
async fn export_failure_leaves_no_partial_download() {
    let base = spawn_failing_export_server().await;
    let downloads = tempfile::tempdir().expect("downloads dir");
    let controller = Controller::new(ApiClient::new(base), downloads.path());
    controller
        .select_file(SelectedFile::new("notes.txt", b"keep me".to_vec()))
        .expect("txt accepted");
    controller.extract().await.expect("extract text");

    let error = controller.download_excel().await.expect_err("export fails");

    match &error {
        ControllerError::Client(ClientError::Server { status, code, message }) => {
            assert_eq!(*status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(*code, Some(ErrorCode::Export));
            assert_eq!(message, "Failed to convert to Excel");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(controller.phase(), Phase::Error(error.to_string()));
    assert_eq!(controller.extracted_text().as_deref(), Some("keep me"));
    assert!(!controller.is_busy(Action::Export));
    assert_eq!(std::fs::read_dir(downloads.path()).expect("list").count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn script_extraction_saves_spreadsheet_under_stem() {
    use doc2sheet::bridge::BridgeConfig;
    use doc2sheet::server::ServerConfig;
    use std::time::Duration;

    let scripts = tempfile::tempdir().expect("scripts dir");
    let script = common::write_script(scripts.path(), "extract.sh", "cp \"$1\" \"$3\"\n");
    let base = common::spawn_server(ServerConfig {
        bridge: BridgeConfig {
            interpreter: "sh".to_owned(),
            script,
            temp_root: Some(scripts.path().to_path_buf()),
            timeout: Duration::from_secs(30),
        },
        ..ServerConfig::default()
    })
    .await;
    let downloads = tempfile::tempdir().expect("downloads dir");
    let controller = Controller::new(ApiClient::new(base), downloads.path());
    let input = b"%PDF-1.4 scanned tables".to_vec();
    controller
        .select_file(SelectedFile::new("ledger.2024.pdf", input.clone()))
        .expect("pdf accepted");

    let path = controller.python_extract().await.expect("script extraction");

    assert_eq!(path, downloads.path().join("ledger_extracted.xlsx"));
    assert_eq!(std::fs::read(&path).expect("read spreadsheet"), input);
    assert!(!controller.is_busy(Action::SubprocessExtract));
    assert_eq!(controller.phase(), Phase::FileSelected);
}

#[tokio::test]
async fn repeated_extraction_gives_identical_text() {
    let (controller, _downloads) = controller().await;
    let docx = docx_with_body(
        "<w:p><w:r><w:t>Alpha</w:t></w:r></w:p><w:p><w:r><w:t>Beta</w:t></w:r></w:p>",
    );

    for (name, bytes) in [
        ("memo.docx", docx),
        ("memo.txt", b"Alpha\n\nBeta\n".to_vec()),
    ] {
        controller
            .select_file(SelectedFile::new(name, bytes))
            .expect("file accepted");
        let first = controller.extract().await.expect("first extract");
        let second = controller.extract().await.expect("second extract");
        assert_eq!(first, second, "{name}");
    }
}
