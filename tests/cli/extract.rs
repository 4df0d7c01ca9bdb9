use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::CliTest;

const GREETING: &str = r#"export function Greeting() {
  return <h1>___Hello___</h1>;
}
"#;

const GREETING_REWRITTEN: &str = r#"import { useTranslation } from "react-i18next";
export function Greeting() {
  const { t } = useTranslation();
  return <h1>{t("Hello")}</h1>;
}
"#;

#[test]
fn test_extract_dry_run_leaves_files_untouched() -> Result<()> {
    let test = CliTest::with_file("src/Greeting.jsx", GREETING)?;

    let output = test.extract_command().output()?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("src/Greeting.jsx:2:14"), "stdout: {}", stdout);
    assert!(stdout.contains("Would rewrite 1 marker(s) in 1 file(s)."));
    assert!(stdout.contains("--apply"));
    assert_eq!(test.read_file("src/Greeting.jsx")?, GREETING);
    assert!(!test.root().join("messages/en.json").exists());
    assert!(!test.root().join(".transmark/keys.json").exists());

    Ok(())
}

#[test]
fn test_extract_apply_writes_everything() -> Result<()> {
    let test = CliTest::with_file("src/Greeting.jsx", GREETING)?;

    let output = test.extract_command().arg("--apply").output()?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Rewrote 1 marker(s) in 1 file(s)"));
    assert_eq!(test.read_file("src/Greeting.jsx")?, GREETING_REWRITTEN);

    let messages: Value = serde_json::from_str(&test.read_file("messages/en.json")?)?;
    assert_eq!(messages, serde_json::json!({ "Hello": "Hello" }));

    let index = test.read_file(".transmark/keys.json")?;
    assert!(index.contains("___Hello___"), "index: {}", index);

    Ok(())
}

#[test]
fn test_extract_apply_twice_is_stable() -> Result<()> {
    let test = CliTest::with_file("src/Greeting.jsx", GREETING)?;

    test.extract_command().arg("--apply").output()?;
    let output = test.extract_command().arg("--apply").output()?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("nothing to extract"), "stdout: {}", stdout);
    assert_eq!(test.read_file("src/Greeting.jsx")?, GREETING_REWRITTEN);

    Ok(())
}

#[test]
fn test_extract_reuses_keys_across_runs() -> Result<()> {
    let test = CliTest::with_file("src/a.js", "save(\"___Save___\");\n")?;
    test.extract_command()
        .args(["--framework", "global", "--apply"])
        .output()?;

    test.write_file("src/b.js", "store(\"___Save___\");\n")?;
    let output = test
        .extract_command()
        .args(["--framework", "global", "--apply"])
        .output()?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("0 new key(s)"), "stdout: {}", stdout);
    assert!(stdout.contains("1 existing key(s) reused"), "stdout: {}", stdout);
    assert_eq!(test.read_file("src/b.js")?, "store(t(\"Save\"));\n");

    let messages: Value = serde_json::from_str(&test.read_file("messages/en.json")?)?;
    assert_eq!(messages, serde_json::json!({ "Save": "Save" }));

    Ok(())
}

#[test]
fn test_extract_no_markers_succeeds() -> Result<()> {
    let test = CliTest::with_file("src/app.ts", "export const title = \"Plain\";\n")?;

    let output = test.extract_command().output()?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Checked 1 source file - nothing to extract"));

    Ok(())
}

#[test]
fn test_extract_parse_error_skips_file() -> Result<()> {
    let test = CliTest::with_file("src/bad.js", "const = \"___Broken___\";\n")?;
    test.write_file("src/good.js", "notify(\"___Saved___\");\n")?;

    let output = test
        .extract_command()
        .args(["--framework", "global", "--apply", "-v"])
        .output()?;
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("src/bad.js"), "stderr: {}", stderr);
    assert_eq!(test.read_file("src/bad.js")?, "const = \"___Broken___\";\n");
    assert_eq!(test.read_file("src/good.js")?, "notify(t(\"Saved\"));\n");

    Ok(())
}

#[test]
fn test_extract_pattern_from_config() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".transmarkrc.json", r#"{ "pattern": "<<(.+?)>>", "framework": "global" }"#)?;
    test.write_file("src/a.ts", "alert(\"<<Done>>\");\n")?;

    let output = test.extract_command().arg("--apply").output()?;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(test.read_file("src/a.ts")?, "alert(t(\"Done\"));\n");

    Ok(())
}

#[test]
fn test_extract_invalid_pattern_is_error() -> Result<()> {
    let test = CliTest::with_file("src/a.ts", "alert(\"___Done___\");\n")?;

    let output = test.extract_command().args(["--pattern", "(unclosed"]).output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));

    Ok(())
}
