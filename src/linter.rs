//! Static checks for endpoint spec files.
//!
//! Each `.json` file is parsed as a spec. Syntax and structural problems are
//! errors (`E001`, `E002`). Bounds that can never match or are ignored, and
//! unknown top-level keys, are warnings (`W001`-`W003`).

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::loader::{is_leaf, load_json, parse_spec, SPEC_KEYS};

/// Severity level for diagnostics. Orders `Warning` below `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One finding in one spec file.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub file: PathBuf,
    /// Dotted location, `/` for the whole file (e.g. "body.username.firstName")
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

impl FileStatus {
    /// Status implied by the most severe diagnostic.
    fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        match diagnostics.iter().map(|d| d.severity).max() {
            Some(Severity::Error) => FileStatus::Error,
            Some(Severity::Warning) => FileStatus::Warning,
            None => FileStatus::Ok,
        }
    }

    fn fails(self, strict: bool) -> bool {
        match self {
            FileStatus::Ok => false,
            FileStatus::Warning => strict,
            FileStatus::Error => true,
        }
    }
}

/// Totals over every file checked under one path.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    fn summarize(path: &Path, results: Vec<FileResult>, strict: bool) -> Self {
        let failed = results.iter().filter(|r| r.status.fails(strict)).count();
        let (errors, warnings) = results
            .iter()
            .flat_map(|r| &r.diagnostics)
            .fold((0, 0), |(e, w), d| match d.severity {
                Severity::Error => (e + 1, w),
                Severity::Warning => (e, w + 1),
            });

        LintResult {
            path: path.to_path_buf(),
            files_checked: results.len(),
            passed: results.len() - failed,
            failed,
            errors,
            warnings,
            results,
        }
    }

    /// No file produced an error. Warnings do not count here, even in strict mode.
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

/// Lint a spec file, or every `.json` file below a directory.
///
/// With `strict`, files with only warnings count as failed.
pub fn lint(path: &Path, strict: bool) -> LintResult {
    let results = spec_files(path)
        .iter()
        .map(|file| lint_file(file, path))
        .collect();
    LintResult::summarize(path, results, strict)
}

/// Lint one spec file. `base_path` is stripped from the reported file name.
pub fn lint_file(file: &Path, base_path: &Path) -> FileResult {
    let mut sink = Sink::new(file);
    check_file(file, &mut sink);

    FileResult {
        file: file.strip_prefix(base_path).unwrap_or(file).to_path_buf(),
        status: FileStatus::from_diagnostics(&sink.diagnostics),
        diagnostics: sink.diagnostics,
    }
}

/// Diagnostics collected for one file.
struct Sink<'a> {
    file: &'a Path,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Sink<'a> {
    fn new(file: &'a Path) -> Self {
        Self {
            file,
            diagnostics: Vec::new(),
        }
    }

    fn push(&mut self, severity: Severity, code: &str, path: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            code: code.to_string(),
            file: self.file.to_path_buf(),
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn error(&mut self, code: &str, path: &str, message: impl Into<String>) {
        self.push(Severity::Error, code, path, message);
    }

    fn warn(&mut self, code: &str, path: &str, message: impl Into<String>) {
        self.push(Severity::Warning, code, path, message);
    }
}

fn check_file(file: &Path, sink: &mut Sink<'_>) {
    let value = match load_json(file) {
        Ok(value) => value,
        Err(e) => return sink.error("E001", "/", format!("syntax error: {}", e)),
    };

    // The loader stops at the first structural error, so only one is reported.
    if let Err(e) = parse_spec(&value) {
        return sink.error("E002", "/", e.to_string());
    }

    let Value::Object(spec) = &value else {
        return;
    };

    for key in spec.keys().filter(|k| !SPEC_KEYS.contains(&k.as_str())) {
        sink.warn(
            "W003",
            key,
            format!("unknown top-level key \"{}\": expected {}", key, SPEC_KEYS.join(", ")),
        );
    }

    for &key in SPEC_KEYS {
        if let Some(Value::Object(group)) = spec.get(key) {
            check_group(group, key, sink);
        }
    }
}

fn check_group(group: &Map<String, Value>, path: &str, sink: &mut Sink<'_>) {
    for (name, child) in group {
        let Value::Object(node) = child else {
            continue;
        };
        let child_path = format!("{}.{}", path, name);
        if is_leaf(node) {
            check_leaf(node, &child_path, sink);
        } else {
            check_group(node, &child_path, sink);
        }
    }
}

fn check_leaf(leaf: &Map<String, Value>, path: &str, sink: &mut Sink<'_>) {
    let bound = |key: &str| leaf.get(key).and_then(Value::as_i64);

    match (leaf.get("type").and_then(Value::as_str), bound("min"), bound("max")) {
        (Some("boolean"), None, None) => {}
        (Some("boolean"), _, _) => {
            sink.warn("W002", path, "min/max are ignored for boolean attributes");
        }
        (_, Some(min), Some(max)) if min > max => sink.warn(
            "W001",
            path,
            format!("min ({}) is greater than max ({}); no value can match", min, max),
        ),
        _ => {}
    }
}

/// `.json` files at `path`, sorted. A file path yields itself if it is JSON.
fn spec_files(path: &Path) -> Vec<PathBuf> {
    let is_json = |p: &Path| p.extension().is_some_and(|e| e == "json");

    if path.is_file() {
        return if is_json(path) { vec![path.to_path_buf()] } else { Vec::new() };
    }

    let Ok(entries) = std::fs::read_dir(path) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .flat_map(|p| match p.is_dir() {
            true => spec_files(&p),
            false if is_json(&p) => vec![p],
            false => Vec::new(),
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn lint_str(content: &str) -> FileResult {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        lint_file(file.path(), file.path().parent().unwrap())
    }

    #[test]
    fn lint_valid_spec() {
        let result = lint_str(
            r#"{
                "body": {
                    "username": {
                        "firstName": { "type": "string", "required": true, "min": 4, "max": 15 }
                    },
                    "isEmployed": { "type": "boolean", "required": true }
                },
                "query": { "page": { "type": "number", "min": 1, "max": 100 } }
            }"#,
        );
        assert_eq!(result.status, FileStatus::Ok);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn lint_invalid_json_syntax() {
        let result = lint_str("{ not valid json }");
        assert_eq!(result.status, FileStatus::Error);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, "E001");
    }

    #[test]
    fn lint_unsupported_type() {
        let result = lint_str(r#"{ "body": { "born": { "type": "date" } } }"#);
        assert_eq!(result.status, FileStatus::Error);
        assert_eq!(result.diagnostics[0].code, "E002");
        assert!(result.diagnostics[0].message.contains("body.born"));
    }

    #[test]
    fn lint_inverted_bounds() {
        let result = lint_str(r#"{ "body": { "name": { "type": "string", "min": 10, "max": 2 } } }"#);
        assert_eq!(result.status, FileStatus::Warning);
        assert_eq!(result.diagnostics[0].code, "W001");
        assert_eq!(result.diagnostics[0].path, "body.name");
    }

    #[test]
    fn lint_boolean_bounds() {
        let result = lint_str(r#"{ "query": { "all": { "type": "boolean", "max": 1 } } }"#);
        assert_eq!(result.status, FileStatus::Warning);
        assert_eq!(result.diagnostics[0].code, "W002");
    }

    #[test]
    fn lint_unknown_top_level_key() {
        let result = lint_str(r#"{ "headers": {} }"#);
        assert_eq!(result.status, FileStatus::Warning);
        assert_eq!(result.diagnostics[0].code, "W003");
    }

    #[test]
    fn lint_directory() {
        let dir = tempdir().unwrap();

        std::fs::write(
            dir.path().join("valid.json"),
            r#"{"path": {"id": {"type": "string", "required": true}}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("invalid.json"), "{ not json }").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let result = lint(dir.path(), false);
        assert_eq!(result.files_checked, 2);
        assert_eq!(result.passed, 1);
        assert_eq!(result.failed, 1);
        assert!(!result.is_ok());
    }

    #[test]
    fn lint_counts_diagnostics_across_files() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        std::fs::write(
            dir.path().join("a.json"),
            r#"{"extra": {}, "body": {"n": {"type": "number", "min": 5, "max": 1}}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("nested/b.json"), "{ broken").unwrap();

        let result = lint(dir.path(), false);
        assert_eq!(result.files_checked, 2);
        assert_eq!(result.errors, 1);
        assert_eq!(result.warnings, 2);
        assert_eq!(result.passed, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.results[1].file, PathBuf::from("nested/b.json"));
    }

    #[test]
    fn lint_non_json_file_is_skipped() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let result = lint(file.path(), true);
        assert_eq!(result.files_checked, 0);
        assert!(result.is_ok());
    }

    #[test]
    fn status_follows_most_severe_diagnostic() {
        let mut sink = Sink::new(Path::new("spec.json"));
        assert_eq!(FileStatus::from_diagnostics(&sink.diagnostics), FileStatus::Ok);
        sink.warn("W001", "body.n", "inverted");
        assert_eq!(FileStatus::from_diagnostics(&sink.diagnostics), FileStatus::Warning);
        sink.error("E002", "/", "broken");
        assert_eq!(FileStatus::from_diagnostics(&sink.diagnostics), FileStatus::Error);
    }

    #[test]
    fn lint_strict_mode() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.json");
        std::fs::write(
            &file_path,
            r#"{"body": {"n": {"type": "number", "min": 5, "max": 1}}}"#,
        )
        .unwrap();

        let result = lint(&file_path, false);
        assert_eq!(result.files_checked, 1);
        assert_eq!(result.passed, 1);
        assert_eq!(result.failed, 0);

        let result = lint(&file_path, true);
        assert_eq!(result.passed, 0);
        assert_eq!(result.failed, 1);
    }
}
