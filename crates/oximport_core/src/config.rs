use anyhow::{Result, anyhow};
use ignore::WalkBuilder;
use log::{debug, trace};
use serde::Deserialize;
use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
};

/// Optional project settings, read from `oximport.json` at the project root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Runtime environments whose globals are considered always defined.
    pub environments: Vec<String>,
    /// Path fragments excluded from candidate collection.
    pub excludes: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self { environments: vec!["browser".to_string(), "node".to_string()], excludes: Vec::new() }
    }
}

/// Settings for the project at `root`, falling back to defaults when the
/// file is absent. A present-but-broken file is an error; silently ignoring
/// it would be confusing.
pub fn read_settings(root: &Path) -> Result<Settings> {
    let path = root.join("oximport.json");
    if !path.is_file() {
        trace!("No oximport.json at {}, using defaults", root.display());
        return Ok(Settings::default());
    }
    let text = fs::read_to_string(&path)?;
    let settings: Settings = serde_json::from_str(&text)
        .map_err(|e| anyhow!("Malformed {}: {}", path.display(), e))?;
    debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Walks up from the current directory to the enclosing git checkout.
pub fn find_git_root() -> Result<PathBuf> {
    let mut dir = env::current_dir()?;
    loop {
        if dir.join(".git").exists() {
            debug!("Found git root at {}", dir.display());
            return Ok(dir);
        }
        match dir.parent() {
            Some(parent) => dir = parent.to_path_buf(),
            None => return Err(anyhow!("Could not find .git directory in any parent folder")),
        }
    }
}

/// Gathers `compilerOptions.paths` aliases from every tsconfig.json under
/// `root`, resolved against each file's baseUrl. Trailing `/*` markers are
/// stripped so lookups can prefix-match.
pub fn read_tsconfig_paths(root: &Path) -> HashMap<String, Vec<String>> {
    let mut paths = HashMap::new();

    let walker = WalkBuilder::new(root).hidden(false).git_ignore(true).build();
    for entry in walker.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.file_name().and_then(|n| n.to_str()) == Some("tsconfig.json") {
            trace!("Reading tsconfig at {}", path.display());
            collect_aliases_from(path, root, &mut paths);
        }
    }

    debug!("Loaded {} tsconfig path aliases", paths.len());
    paths
}

fn collect_aliases_from(tsconfig: &Path, root: &Path, paths: &mut HashMap<String, Vec<String>>) {
    let Ok(content) = fs::read_to_string(tsconfig) else { return };
    // tsconfig files allow // comments; strip them before parsing.
    let stripped: String = content
        .lines()
        .map(|line| if let Some(idx) = line.find("//") { &line[..idx] } else { line })
        .collect::<Vec<_>>()
        .join("\n");

    let Ok(json) = serde_json::from_str::<serde_json::Value>(&stripped) else { return };
    let Some(options) = json.get("compilerOptions") else { return };
    let Some(alias_map) = options.get("paths").and_then(|p| p.as_object()) else { return };

    let base_url = options.get("baseUrl").and_then(|b| b.as_str()).unwrap_or(".");
    let base_path = tsconfig.parent().unwrap_or(root).join(base_url);

    for (alias, targets) in alias_map {
        let Some(target_list) = targets.as_array() else { continue };
        let resolved: Vec<String> = target_list
            .iter()
            .filter_map(|t| t.as_str())
            .map(|t| base_path.join(t.trim_end_matches("/*")).to_string_lossy().to_string())
            .collect();
        if !resolved.is_empty() {
            paths.insert(alias.trim_end_matches("/*").to_string(), resolved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
    }

    #[test]
    fn test_settings_default_when_absent() {
        let dir = TempDir::new().unwrap();
        let settings = read_settings(dir.path()).unwrap();
        assert_eq!(settings.environments, vec!["browser", "node"]);
        assert!(settings.excludes.is_empty());
    }

    #[test]
    fn test_settings_partial_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "oximport.json", r#"{ "environments": ["node"] }"#);
        let settings = read_settings(dir.path()).unwrap();
        assert_eq!(settings.environments, vec!["node"]);
        assert!(settings.excludes.is_empty());
    }

    #[test]
    fn test_settings_malformed_is_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "oximport.json", "{ nope");
        assert!(read_settings(dir.path()).is_err());
    }

    #[test]
    fn test_tsconfig_aliases() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "tsconfig.json",
            r#"
{
  // root config
  "compilerOptions": {
    "baseUrl": ".",
    "paths": {
      "@components/*": ["src/components/*"],
      "@utils": ["src/utils"]
    }
  }
}
"#,
        );
        let paths = read_tsconfig_paths(root);
        assert_eq!(paths.len(), 2);
        assert!(paths.contains_key("@components"));
        assert!(!paths.contains_key("@components/*"));
        assert!(paths.get("@components").unwrap()[0].contains("src/components"));
    }

    #[test]
    fn test_tsconfig_base_url() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "tsconfig.json",
            r#"{ "compilerOptions": { "baseUrl": "src", "paths": { "@app/*": ["app/*"] } } }"#,
        );
        let paths = read_tsconfig_paths(root);
        assert!(paths.get("@app").unwrap()[0].contains("src"));
    }

    #[test]
    fn test_tsconfig_missing_or_empty() {
        let dir = TempDir::new().unwrap();
        assert!(read_tsconfig_paths(dir.path()).is_empty());
        write(dir.path(), "tsconfig.json", r#"{ "compilerOptions": { "target": "ES2020" } }"#);
        assert!(read_tsconfig_paths(dir.path()).is_empty());
    }
}
