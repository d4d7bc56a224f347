use std::error::Error;
use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use encoding_rs::WINDOWS_1252;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn merge_writes_files_in_name_order_to_stdout() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let project = workspace.path().join("project");
    fs::create_dir_all(project.join("node_modules"))?;
    fs::write(project.join("b.txt"), "second")?;
    fs::write(project.join("a.txt"), "first")?;
    fs::write(project.join("node_modules/skip.js"), "skipped")?;

    let output = cli()?
        .args([
            "--workspace",
            workspace.path().to_str().unwrap(),
            "merge",
            project.to_str().unwrap(),
        ])
        .output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let first = stdout.find("first").expect("a.txt merged");
    let second = stdout.find("second").expect("b.txt merged");
    assert!(first < second);
    assert!(!stdout.contains("skipped"));
    assert!(stdout.starts_with("-------------------\n"));
    Ok(())
}

#[test]
fn merge_to_html_file_reports_tab_name() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let docs = workspace.path().join("docs");
    fs::create_dir_all(&docs)?;
    fs::write(docs.join("index.html"), "<h1>Hi</h1>")?;
    fs::write(docs.join("notes.txt"), "a < b")?;
    let target = workspace.path().join("out").join("merged.html");

    cli()?
        .args([
            "--workspace",
            workspace.path().to_str().unwrap(),
            "merge",
            "--format",
            "html",
            "--output",
            target.to_str().unwrap(),
            docs.join("index.html").to_str().unwrap(),
            docs.join("notes.txt").to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged 2 file(s) from 'docs'"));

    let html = fs::read_to_string(target)?;
    assert!(html.contains("<div id='file-0' class='file-header'"));
    assert!(html.contains("<div id='file-1' class='file-header'"));
    assert!(html.contains("&lt;h1&gt;Hi&lt;/h1&gt;"));
    assert!(html.contains("a &lt; b"));
    Ok(())
}

#[test]
fn merge_decodes_legacy_text_and_warns_about_binaries() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let legacy = workspace.path().join("legacy.txt");
    let (bytes, _, _) = WINDOWS_1252.encode("Déjà vu, café crème et crêpes à volonté");
    fs::write(&legacy, &*bytes)?;
    let blob = workspace.path().join("blob.dat");
    fs::write(&blob, [0u8, 0, 1, 2, 3])?;

    cli()?
        .args([
            "--workspace",
            workspace.path().to_str().unwrap(),
            "merge",
            legacy.to_str().unwrap(),
            blob.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Déjà vu, café crème"))
        .stderr(predicate::str::contains("binary file detected"));
    Ok(())
}

#[test]
fn merge_without_readable_files_fails() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    cli()?
        .args([
            "--workspace",
            workspace.path().to_str().unwrap(),
            "merge",
            workspace.path().join("missing.txt").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no readable files found"));
    Ok(())
}

#[test]
fn scan_json_lists_file_refs() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let src = workspace.path().join("src");
    fs::create_dir_all(&src)?;
    fs::write(src.join("main.rs"), "fn main() {}")?;
    fs::write(src.join("module.pyc"), "cached")?;

    let output = cli()?
        .args([
            "--workspace",
            workspace.path().to_str().unwrap(),
            "scan",
            "--json",
            src.to_str().unwrap(),
        ])
        .output()?;
    assert!(output.status.success());

    let files: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let files = files.as_array().expect("array");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "main.rs");
    assert_eq!(files[0]["extension"], "rs");
    assert_eq!(files[0]["char_count"], 12);
    Ok(())
}

#[test]
fn scan_summary_follows_language_setting() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let file = workspace.path().join("one.txt");
    fs::write(&file, "12345")?;

    cli()?
        .args(["--workspace", workspace.path().to_str().unwrap(), "locale", "set", "it"])
        .assert()
        .success();

    cli()?
        .args([
            "--workspace",
            workspace.path().to_str().unwrap(),
            "scan",
            file.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("one.txt\n"))
        .stdout(predicate::str::contains("File: 1 | Caratteri: 5"));
    Ok(())
}

fn cli() -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("textmerger-cli")?;
    cmd.current_dir(repo_root());
    Ok(cmd)
}

fn repo_root() -> PathBuf {
    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest
        .parent()
        .and_then(|dir| dir.parent())
        .expect("workspace root")
        .to_path_buf()
}
