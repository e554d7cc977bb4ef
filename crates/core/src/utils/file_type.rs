use std::path::Path;

/// Rough classification of a file the runner is pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsFileKind {
    /// Matches jest's default `testMatch` globs.
    TestFile,
    /// A JavaScript/TypeScript file that jest would not pick up on its own.
    Source,
    Other,
}

const JS_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs", "mts", "cts"];

/// Detect whether a path looks like something jest will collect
pub fn detect_file_type(file_path: &Path) -> JsFileKind {
    let extension = file_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    if !JS_EXTENSIONS.contains(&extension) {
        tracing::trace!("Not a JS/TS file: {:?}", file_path);
        return JsFileKind::Other;
    }

    let in_tests_dir = file_path
        .components()
        .any(|c| c.as_os_str() == "__tests__");
    let stem = file_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    if in_tests_dir || stem.ends_with(".test") || stem.ends_with(".spec") {
        tracing::debug!("Detected test file: {:?}", file_path);
        JsFileKind::TestFile
    } else {
        JsFileKind::Source
    }
}
