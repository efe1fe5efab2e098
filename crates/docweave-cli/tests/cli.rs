use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    if let Some(path) = env::var_os("CARGO_BIN_EXE_docweave") {
        return PathBuf::from(path);
    }
    let exe = env::current_exe().expect("current exe");
    let mut debug_dir = exe.as_path();
    while let Some(parent) = debug_dir.parent() {
        if parent.file_name().and_then(|name| name.to_str()) == Some("debug") {
            let candidate = parent.join("docweave");
            if candidate.exists() {
                return candidate;
            }
        }
        debug_dir = parent;
    }
    panic!("binary path missing");
}

fn temp_file(name: &str, extension: &str, contents: &str) -> PathBuf {
    let mut path = env::temp_dir();
    let now = SystemTime::now().duration_since(UNIX_EPOCH).expect("time");
    let file_name = format!(
        "docweave_cli_{}_{}_{}.{}",
        name,
        now.as_secs(),
        now.subsec_nanos(),
        extension
    );
    path.push(file_name);
    fs::write(&path, contents).expect("write temp file");
    path
}

#[test]
fn rewrites_links_and_xrefs_from_config() {
    let input = temp_file(
        "rewrite",
        "html",
        "<p><a href=\"a.md\">A</a><script>x()</script> <xref uid=\"T\"></xref></p>",
    );
    let config = temp_file(
        "rewrite_config",
        "json",
        r#"{
  "links": { "a.md": "a.html" },
  "xrefs": [ { "uid": "T", "href": "api/t.html", "name": "Tee" } ]
}"#,
    );
    let output = Command::new(bin_path())
        .args([
            "--config",
            config.to_str().expect("path"),
            input.to_str().expect("path"),
        ])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout,
        "<p><a href=\"a.html\">A</a> <a href=\"api/t.html\">Tee</a></p>"
    );
}

#[test]
fn report_embedded_prints_pretty_warnings() {
    let input = temp_file("report", "html", "<style>p { color: red; }</style><p>x</p>");
    let output = Command::new(bin_path())
        .args([
            "--report-embedded",
            "--diagnostics",
            "pretty",
            "--file",
            "docs/a.md",
            input.to_str().expect("path"),
        ])
        .output()
        .expect("run");

    assert!(output.status.success(), "warnings must not fail the run");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "<p>x</p>");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("docs/a.md(1,1): warning html-embed: HTML contains embedded <style>."),
        "unexpected stderr: {}",
        stderr
    );
}

#[test]
fn missing_xref_is_reported_as_json() {
    let input = temp_file("missing_xref", "html", "<xref uid=\"Nope\"></xref>");
    let output = Command::new(bin_path())
        .args(["--diagnostics", "json", input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "<span class=\"xref\">Nope</span>");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("\"code\": \"xref-not-found\""),
        "expected xref-not-found in stderr: {}",
        stderr
    );
}

#[test]
fn scan_prints_page_facts() -> Result<(), Box<dyn std::error::Error>> {
    let input = temp_file(
        "scan",
        "html",
        "<h1 id=\"t\">Title</h1><p>Two words <a name=\"x\"></a></p>",
    );
    let config = temp_file(
        "scan_config",
        "json",
        r#"{ "metadata": { "ms.topic": "article", "secret": "s" }, "hiddenMetadata": ["secret"] }"#,
    );
    let output = Command::new(bin_path())
        .args([
            "--scan",
            "--config",
            config.to_str().expect("path"),
            input.to_str().expect("path"),
        ])
        .output()?;

    assert!(output.status.success(), "expected success exit code");
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["wordCount"], 3);
    assert_eq!(report["bookmarks"], serde_json::json!(["t", "x"]));
    assert_eq!(report["title"], "Title");
    assert_eq!(report["rawTitle"], "<h1 id=\"t\">Title</h1>");
    assert_eq!(
        report["metaTags"],
        "<meta name=\"ms.topic\" content=\"article\" />\n"
    );
    Ok(())
}

#[test]
fn reads_stdin_and_honors_no_sanitize() -> Result<(), Box<dyn std::error::Error>> {
    let mut child = Command::new(bin_path())
        .args(["--no-sanitize"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()?;
    child
        .stdin
        .take()
        .ok_or("stdin missing")?
        .write_all(b"<div style=\"color:red\"><script>x</script></div>")?;
    let output = child.wait_with_output()?;

    assert!(output.status.success(), "expected success exit code");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "<div style=\"color:red\"><script>x</script></div>"
    );
    Ok(())
}

#[test]
fn unreadable_config_fails() {
    let input = temp_file("bad_config", "html", "<p>x</p>");
    let output = Command::new(bin_path())
        .args([
            "--config",
            "/nonexistent/docweave.json",
            input.to_str().expect("path"),
        ])
        .output()
        .expect("run");

    assert!(!output.status.success(), "expected error exit code");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to read /nonexistent/docweave.json"),
        "unexpected stderr: {}",
        stderr
    );
}
