use anyhow::Result;
use dashmap::DashMap;
use log::{debug, trace};
use path_clean::clean;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::constants::{INDEX_FILES, RESOLVE_EXTENSIONS};

/// Maps a module specifier, relative to the file that references it, to an
/// absolute source path. Relative specifiers get extension and index
/// fallback; bare specifiers are checked against tsconfig path aliases
/// before walking up to node_modules. The result (including misses) is
/// memoized, since the same edge is hit once per importing file.
pub fn resolve(
    root: &Path,
    tsconfig_paths: &HashMap<String, Vec<String>>,
    from_file: &Path,
    request: &str,
    cache: &DashMap<(PathBuf, String), Option<PathBuf>>,
) -> Result<Option<PathBuf>> {
    let key = (from_file.to_path_buf(), request.to_string());
    if let Some(v) = cache.get(&key) {
        trace!("Cache hit for resolve: '{}' from {}", request, from_file.display());
        return Ok(v.clone());
    }

    let resolved = if request.starts_with("./") || request.starts_with("../") || request.starts_with('/') {
        trace!("Resolving '{}' as relative to {}", request, from_file.display());
        let base = from_file.parent().unwrap_or(root);
        resolve_file(Path::new(&clean(base.join(request).to_string_lossy().to_string())))
    } else {
        resolve_alias(tsconfig_paths, request)
            .or_else(|| resolve_package(root, from_file, request))
    };

    if let Some(p) = &resolved {
        debug!("Resolved '{}' from {} to {}", request, from_file.display(), p.display());
    } else {
        trace!("Could not resolve '{}' from {}", request, from_file.display());
    }
    cache.insert(key, resolved.clone());
    Ok(resolved)
}

/// Tries the path as given, then with each known extension, then as a
/// directory with an index file.
fn resolve_file(p: &Path) -> Option<PathBuf> {
    if p.is_file() {
        return Some(p.canonicalize().unwrap_or_else(|_| p.to_path_buf()));
    }

    for ext in RESOLVE_EXTENSIONS {
        let candidate = PathBuf::from(format!("{}.{}", p.display(), ext));
        if candidate.is_file() {
            return Some(candidate.canonicalize().unwrap_or(candidate));
        }
    }

    for index_file in INDEX_FILES {
        let candidate = p.join(index_file);
        if candidate.is_file() {
            return Some(candidate.canonicalize().unwrap_or(candidate));
        }
    }

    None
}

fn resolve_alias(tsconfig_paths: &HashMap<String, Vec<String>>, request: &str) -> Option<PathBuf> {
    for (alias, targets) in tsconfig_paths {
        if !request.starts_with(alias.as_str()) {
            continue;
        }
        let remainder = request.trim_start_matches(alias.as_str()).trim_start_matches('/');
        for target in targets {
            let candidate = if remainder.is_empty() {
                PathBuf::from(target)
            } else {
                PathBuf::from(target).join(remainder)
            };
            if let Some(resolved) = resolve_file(&candidate) {
                trace!("Matched tsconfig alias '{}' for '{}'", alias, request);
                return Some(resolved);
            }
        }
    }
    None
}

/// node_modules lookup, walking up from the referencing file to the project
/// root. Package entry points are taken from the manifest's `exports` (`.`
/// entry, preferring the import/require/default conditions), then `module`,
/// then `main`, falling back to an index file.
fn resolve_package(root: &Path, from_file: &Path, pkg: &str) -> Option<PathBuf> {
    let mut dir = from_file.parent().unwrap_or(root);
    loop {
        let nm = dir.join("node_modules").join(pkg);
        if nm.exists()
            && let Some(resolved) = resolve_package_dir(&nm)
        {
            return Some(resolved);
        }
        if dir == root {
            return None;
        }
        dir = dir.parent()?;
    }
}

fn resolve_package_dir(pkg_dir: &Path) -> Option<PathBuf> {
    let manifest = pkg_dir.join("package.json");
    if manifest.is_file()
        && let Ok(text) = fs::read_to_string(&manifest)
        && let Ok(json) = serde_json::from_str::<serde_json::Value>(&text)
    {
        for entry in manifest_entry_points(&json) {
            if let Some(resolved) = resolve_file(&pkg_dir.join(entry.trim_start_matches("./"))) {
                return Some(resolved);
            }
        }
    }

    for index_file in INDEX_FILES {
        let candidate = pkg_dir.join(index_file);
        if candidate.is_file() {
            return Some(candidate.canonicalize().unwrap_or(candidate));
        }
    }

    None
}

/// Candidate entry points from a package manifest, in preference order.
fn manifest_entry_points(json: &serde_json::Value) -> Vec<String> {
    let mut entries = Vec::new();

    if let Some(exports) = json.get("exports") {
        if let Some(s) = exports.as_str() {
            entries.push(s.to_string());
        }
        if let Some(dot) = exports.get(".") {
            if let Some(s) = dot.as_str() {
                entries.push(s.to_string());
            }
            // Conditional exports like { ".": { "import": "./dist/index.js" } }
            for condition in ["import", "require", "default"] {
                if let Some(s) = dot.get(condition).and_then(|v| v.as_str()) {
                    entries.push(s.to_string());
                }
            }
        }
    }

    for field in ["module", "main"] {
        if let Some(s) = json.get(field).and_then(|v| v.as_str()) {
            entries.push(s.to_string());
        }
    }

    entries
}
