//! Runs the renderer against stand-in converter scripts

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use formpdf_core::{DocumentOptions, PdfRenderer, RendererError};
use formpdf_pdf::CommandRenderer;
use tempfile::TempDir;

/// Write an executable script that copies its input to the last argument
fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

const WRITE_LAST: &str = r#"for arg in "$@"; do last="$arg"; done
printf '%%PDF-1.4 fake' > "$last""#;

#[test]
fn converts_through_the_command() {
    let temp = TempDir::new().unwrap();
    let tool = fake_tool(temp.path(), "fake-wkhtmltopdf", WRITE_LAST);

    let renderer = CommandRenderer::new(tool.to_string_lossy());
    let bytes = renderer
        .render("<html><body>hi</body></html>", &DocumentOptions::default())
        .unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn secured_documents_pass_through_encryption() {
    let temp = TempDir::new().unwrap();
    let tool = fake_tool(temp.path(), "fake-wkhtmltopdf", WRITE_LAST);
    let marker = temp.path().join("encrypted");
    let encrypt = fake_tool(
        temp.path(),
        "fake-qpdf",
        &format!("touch {}\n{}", marker.display(), WRITE_LAST),
    );

    let renderer = CommandRenderer::new(tool.to_string_lossy())
        .with_encrypt_command(encrypt.to_string_lossy());
    let options = DocumentOptions {
        security: true,
        password: Some("pw".to_string()),
        ..Default::default()
    };
    renderer.render("<html></html>", &options).unwrap();
    assert!(marker.exists());
}

#[test]
fn failing_converter_reports_stderr() {
    let temp = TempDir::new().unwrap();
    let tool = fake_tool(temp.path(), "broken", "echo 'bad page size' >&2\nexit 3");

    let renderer = CommandRenderer::new(tool.to_string_lossy());
    match renderer.render("<html></html>", &DocumentOptions::default()) {
        Err(RendererError::Failed(message)) => assert!(message.contains("bad page size")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn empty_output_is_an_error() {
    let temp = TempDir::new().unwrap();
    let tool = fake_tool(temp.path(), "silent", "exit 0");

    let renderer = CommandRenderer::new(tool.to_string_lossy());
    assert!(matches!(
        renderer.render("<html></html>", &DocumentOptions::default()),
        Err(RendererError::Failed(_))
    ));
}
