use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn missing_input_document_exits_1() {
    let tmp = tempfile::tempdir().unwrap();
    Command::cargo_bin("ratescan")
        .unwrap()
        .arg(tmp.path().join("does-not-exist.pdf"))
        .env("RUST_LOG", "error")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn unreadable_pdf_exits_3() {
    // The file exists but is not a PDF, so page extraction fails downstream
    // of the not-found check.
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("not-a-pdf.pdf");
    std::fs::write(&path, b"plain text, not a pdf").unwrap();
    Command::cargo_bin("ratescan")
        .unwrap()
        .arg(&path)
        .arg("--store-dir")
        .arg(tmp.path().join("store"))
        .env("RUST_LOG", "off")
        .assert()
        .failure()
        .code(3);
}

#[test]
fn help_documents_the_defaults() {
    Command::cargo_bin("ratescan")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tariff PDF"))
        .stdout(predicate::str::contains("--pad-after"));
}
