use anyhow::Result;
use ignore::WalkBuilder;
use log::{debug, trace};
use std::path::{Path, PathBuf};

use crate::constants::JS_TS_EXTENSIONS;

/// Walks the project tree and returns the files worth offering as import
/// sources: JS/TS sources, minus tests, declaration files, vendored
/// node_modules, and anything matching a configured exclude fragment.
pub fn collect_candidates(root: &Path, excludes: &[String]) -> Result<Vec<PathBuf>> {
    debug!("Collecting candidate files under {}", root.display());
    let mut files: Vec<PathBuf> = Vec::new();

    let walker = WalkBuilder::new(root).hidden(false).ignore(true).git_ignore(true).build();
    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let path_str = path.to_string_lossy();
        if path_str.contains("node_modules") {
            continue;
        }
        if path_str.contains(".test.") || path_str.contains(".spec.") || path_str.contains("__tests__")
        {
            trace!("Skipping test file: {}", path_str);
            continue;
        }
        if path_str.ends_with(".d.ts") {
            continue;
        }
        if excludes.iter().any(|fragment| path_str.contains(fragment.as_str())) {
            trace!("Skipping excluded file: {}", path_str);
            continue;
        }

        if let Some(ext) = path.extension().and_then(|e| e.to_str())
            && JS_TS_EXTENSIONS.contains(&ext)
        {
            files.push(path.to_path_buf());
        }
    }

    debug!("Collected {} candidate files", files.len());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "export const x = 1;").unwrap();
    }

    #[test]
    fn test_collects_js_ts_sources() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/a.js");
        write(root, "src/b.tsx");
        write(root, "README.md");
        let files = collect_candidates(root, &[]).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_skips_tests_and_declarations() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/a.js");
        write(root, "src/a.test.js");
        write(root, "src/__tests__/b.js");
        write(root, "src/types.d.ts");
        let files = collect_candidates(root, &[]).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_skips_node_modules_and_excludes() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/a.js");
        write(root, "node_modules/pkg/index.js");
        write(root, "build/out.js");
        let files = collect_candidates(root, &["build/".to_string()]).unwrap();
        assert_eq!(files.len(), 1);
    }
}
