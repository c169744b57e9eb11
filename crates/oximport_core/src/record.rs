use indexmap::IndexSet;
use log::trace;
use oxc_ast::ast::Program;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::extract::extract_entries;
use crate::types::{ExportEntry, ImportEntry, NAMESPACE_IMPORT};

/// Maps a module specifier, relative to the referencing module, to its
/// resolved record. Returning `None` means the module cannot be found or
/// parsed right now; callers on the star-export path treat that as an empty
/// contribution rather than an error, since the tool runs over codebases
/// that are mid-edit.
pub type HostResolver =
    Arc<dyn Fn(&ModuleRecord, &str) -> Option<Arc<ModuleRecord>> + Send + Sync>;

/// Contract violations from the extraction stage, raised at record
/// construction and never patched over.
#[derive(Debug, Error)]
pub enum InvariantViolation {
    #[error("export entry '{export_name:?}' has no module request and no local name")]
    MissingLocalName { export_name: Option<String> },
    #[error(
        "export entry '{export_name:?}' references imported binding '{local_name}' \
         with no matching import entry"
    )]
    MissingImportEntry { export_name: Option<String>, local_name: String },
}

/// The resolved import/export interface of one source file.
///
/// Patterned after the "Source Text Module Record" of the ECMAScript
/// specification, collapsed to the single concrete shape this tool needs: the
/// raw entry tables, the three classified export partitions, and a stored
/// host resolver for walking the module graph. Records are immutable after
/// construction and are expected to be pooled by module path (see
/// `ModulePool`), which must hold absolute, symlink-free paths so the path
/// doubles as a unique key.
pub struct ModuleRecord {
    pub module_path: PathBuf,
    pub import_entries: Vec<ImportEntry>,
    pub export_entries: Vec<ExportEntry>,
    /// Exports whose value originates in this module, including re-exported
    /// namespace bindings.
    pub local_export_entries: Vec<ExportEntry>,
    /// Exports forwarded from another module, rewritten to name their true
    /// origin rather than any local alias.
    pub indirect_export_entries: Vec<ExportEntry>,
    /// `export * from "m"` entries.
    pub star_export_entries: Vec<ExportEntry>,
    /// Every non-None local name among the import entries.
    pub imported_bound_names: HashSet<String>,
    resolver: HostResolver,
}

impl ModuleRecord {
    /// Classifies the raw entry tables and builds the record. Follows step
    /// 11 of the ParseModule operation: entries without a module request are
    /// local unless they re-export a named import (indirect, rewritten to
    /// the origin); a namespace re-export stays local; sourced entries are
    /// star when nameless, indirect otherwise.
    pub fn new(
        module_path: PathBuf,
        import_entries: Vec<ImportEntry>,
        export_entries: Vec<ExportEntry>,
        resolver: HostResolver,
    ) -> Result<Self, InvariantViolation> {
        let imported_bound_names: HashSet<String> =
            import_entries.iter().filter_map(|ie| ie.local_name.clone()).collect();

        let mut local_export_entries = Vec::new();
        let mut indirect_export_entries = Vec::new();
        let mut star_export_entries = Vec::new();

        for ee in &export_entries {
            if ee.module_request.is_none() {
                let local_name = ee.local_name.as_ref().ok_or_else(|| {
                    InvariantViolation::MissingLocalName { export_name: ee.export_name.clone() }
                })?;

                if !imported_bound_names.contains(local_name) {
                    local_export_entries.push(ee.clone());
                    continue;
                }

                let ie = import_entries
                    .iter()
                    .find(|ie| ie.local_name.as_deref() == Some(local_name.as_str()))
                    .ok_or_else(|| InvariantViolation::MissingImportEntry {
                        export_name: ee.export_name.clone(),
                        local_name: local_name.clone(),
                    })?;

                if ie.import_name.as_deref() == Some(NAMESPACE_IMPORT) {
                    // Re-export of an imported module namespace object; the
                    // namespace object is produced here, so the entry is
                    // local.
                    local_export_entries.push(ee.clone());
                } else {
                    // Re-export of a single imported name: forward to the
                    // true origin instead of the local alias.
                    indirect_export_entries.push(ExportEntry {
                        export_name: ee.export_name.clone(),
                        module_request: Some(ie.module_request.clone()),
                        import_name: ie.import_name.clone(),
                        local_name: None,
                        span: ee.span,
                    });
                }
            } else if ee.export_name.is_none()
                && ee.import_name.as_deref() == Some(NAMESPACE_IMPORT)
            {
                star_export_entries.push(ee.clone());
            } else {
                indirect_export_entries.push(ee.clone());
            }
        }

        Ok(Self {
            module_path,
            import_entries,
            export_entries,
            local_export_entries,
            indirect_export_entries,
            star_export_entries,
            imported_bound_names,
            resolver,
        })
    }

    /// Extracts entries from an already-parsed program and classifies them.
    pub fn from_program(
        module_path: PathBuf,
        program: &Program,
        resolver: HostResolver,
    ) -> Result<Self, InvariantViolation> {
        let (import_entries, export_entries) = extract_entries(program);
        Self::new(module_path, import_entries, export_entries, resolver)
    }

    /// Every name this module exports, in declaration order, deduplicated by
    /// first occurrence.
    ///
    /// Patterned after the GetExportedNames concrete method. The `visited`
    /// set breaks cycles in the module graph and must be fresh per top-level
    /// query; recursion depth is bounded by it, since every recursive call
    /// inserts a new module path before descending. Star targets that fail
    /// to resolve contribute nothing, and a star export never forwards
    /// `default`.
    pub fn exported_names(&self, visited: &mut HashSet<PathBuf>) -> Vec<String> {
        if !visited.insert(self.module_path.clone()) {
            trace!("Already visited {}, breaking cycle", self.module_path.display());
            return Vec::new();
        }

        let mut names: IndexSet<String> = IndexSet::new();
        for ee in &self.local_export_entries {
            if let Some(name) = &ee.export_name {
                names.insert(name.clone());
            }
        }
        for ee in &self.indirect_export_entries {
            if let Some(name) = &ee.export_name {
                names.insert(name.clone());
            }
        }

        for ee in &self.star_export_entries {
            let Some(request) = &ee.module_request else { continue };
            let Some(target) = (self.resolver)(self, request) else {
                trace!(
                    "Star export target '{}' unresolved from {}, skipping",
                    request,
                    self.module_path.display()
                );
                continue;
            };
            for name in target.exported_names(visited) {
                if name != "default" {
                    names.insert(name);
                }
            }
        }

        names.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{source_type_for, with_program};
    use dashmap::DashMap;
    use oxc_span::Span;
    use std::path::Path;

    fn null_resolver() -> HostResolver {
        Arc::new(|_, _| None)
    }

    fn map_resolver(map: Arc<DashMap<String, Arc<ModuleRecord>>>) -> HostResolver {
        Arc::new(move |_, specifier| map.get(specifier).map(|r| r.value().clone()))
    }

    fn record_for(path: &str, source: &str, resolver: HostResolver) -> Arc<ModuleRecord> {
        let st = source_type_for(Path::new(path));
        let record = with_program(source, st, |program| {
            ModuleRecord::from_program(PathBuf::from(path), program, resolver.clone())
        })
        .unwrap()
        .unwrap();
        Arc::new(record)
    }

    #[test]
    fn test_named_reexport_is_indirect() {
        let record = record_for("a.js", "export { a, b } from 'm';", null_resolver());
        assert!(record.local_export_entries.is_empty());
        assert!(record.star_export_entries.is_empty());
        assert_eq!(record.indirect_export_entries.len(), 2);
        assert_eq!(record.indirect_export_entries[0].export_name.as_deref(), Some("a"));
        assert_eq!(record.indirect_export_entries[0].module_request.as_deref(), Some("m"));
        assert_eq!(record.indirect_export_entries[0].import_name.as_deref(), Some("a"));
        assert_eq!(record.exported_names(&mut HashSet::new()), vec!["a", "b"]);
    }

    #[test]
    fn test_reexported_namespace_binding_is_local() {
        let record =
            record_for("a.js", "import * as ns from 'm';\nexport { ns };", null_resolver());
        assert_eq!(record.local_export_entries.len(), 1);
        assert!(record.indirect_export_entries.is_empty());
        assert_eq!(record.local_export_entries[0].export_name.as_deref(), Some("ns"));
        assert_eq!(record.local_export_entries[0].local_name.as_deref(), Some("ns"));
        assert_eq!(record.exported_names(&mut HashSet::new()), vec!["ns"]);
    }

    #[test]
    fn test_reexported_named_import_forwards_to_origin() {
        let record = record_for("a.js", "import { x } from 'm';\nexport { x };", null_resolver());
        assert!(record.local_export_entries.is_empty());
        assert_eq!(record.indirect_export_entries.len(), 1);
        let ee = &record.indirect_export_entries[0];
        assert_eq!(ee.export_name.as_deref(), Some("x"));
        assert_eq!(ee.module_request.as_deref(), Some("m"));
        assert_eq!(ee.import_name.as_deref(), Some("x"));
        assert_eq!(ee.local_name, None);
        assert_eq!(record.exported_names(&mut HashSet::new()), vec!["x"]);
    }

    #[test]
    fn test_reexported_renamed_default_import() {
        let record = record_for("a.js", "import d from 'm';\nexport { d };", null_resolver());
        assert_eq!(record.indirect_export_entries.len(), 1);
        let ee = &record.indirect_export_entries[0];
        assert_eq!(ee.export_name.as_deref(), Some("d"));
        assert_eq!(ee.import_name.as_deref(), Some("default"));
    }

    #[test]
    fn test_unresolved_star_contributes_nothing() {
        let record = record_for("a.js", "export * from 'm';", null_resolver());
        assert_eq!(record.star_export_entries.len(), 1);
        assert_eq!(record.exported_names(&mut HashSet::new()), Vec::<String>::new());
    }

    #[test]
    fn test_namespace_reexport_is_indirect_not_star() {
        let record = record_for("a.js", "export * as ns from 'm';", null_resolver());
        assert!(record.star_export_entries.is_empty());
        assert_eq!(record.indirect_export_entries.len(), 1);
        assert_eq!(record.exported_names(&mut HashSet::new()), vec!["ns"]);
    }

    #[test]
    fn test_star_export_forwards_names_but_not_default() {
        let map = Arc::new(DashMap::new());
        let resolver = map_resolver(map.clone());
        let target = record_for(
            "b.js",
            "export default 42;\nexport const one = 1;\nexport const two = 2;",
            resolver.clone(),
        );
        map.insert("b".to_string(), target);
        let record = record_for("a.js", "export * from 'b';", resolver);
        assert_eq!(record.exported_names(&mut HashSet::new()), vec!["one", "two"]);
    }

    #[test]
    fn test_cyclic_star_exports_terminate_with_union() {
        let map = Arc::new(DashMap::new());
        let resolver = map_resolver(map.clone());
        let a = record_for("a.js", "export const fromA = 1;\nexport * from 'b';", resolver.clone());
        let b = record_for("b.js", "export const fromB = 2;\nexport * from 'a';", resolver.clone());
        map.insert("a".to_string(), a.clone());
        map.insert("b".to_string(), b.clone());

        assert_eq!(a.exported_names(&mut HashSet::new()), vec!["fromA", "fromB"]);
        assert_eq!(b.exported_names(&mut HashSet::new()), vec!["fromB", "fromA"]);
    }

    #[test]
    fn test_star_does_not_duplicate_local_names() {
        let map = Arc::new(DashMap::new());
        let resolver = map_resolver(map.clone());
        let b = record_for("b.js", "export const shared = 1;\nexport const extra = 2;", resolver.clone());
        map.insert("b".to_string(), b);
        let a = record_for("a.js", "export const shared = 0;\nexport * from 'b';", resolver);
        assert_eq!(a.exported_names(&mut HashSet::new()), vec!["shared", "extra"]);
    }

    #[test]
    fn test_partitions_are_exclusive_and_exhaustive() {
        let source = "import { x } from 'm';\n\
                      import * as ns from 'n';\n\
                      export { x };\n\
                      export { ns };\n\
                      export const local = 1;\n\
                      export * from 'o';\n\
                      export { y } from 'p';";
        let record = record_for("a.js", source, null_resolver());
        assert_eq!(record.export_entries.len(), 5);
        assert_eq!(
            record.local_export_entries.len()
                + record.indirect_export_entries.len()
                + record.star_export_entries.len(),
            record.export_entries.len()
        );
        assert_eq!(record.local_export_entries.len(), 2);
        assert_eq!(record.indirect_export_entries.len(), 2);
        assert_eq!(record.star_export_entries.len(), 1);
    }

    #[test]
    fn test_imported_bound_names() {
        let record = record_for(
            "a.js",
            "import def, { named } from 'm';\nimport * as ns from 'n';\nimport 'side-effect';",
            null_resolver(),
        );
        let expected: HashSet<String> =
            ["def", "named", "ns"].iter().map(|s| s.to_string()).collect();
        assert_eq!(record.imported_bound_names, expected);
    }

    #[test]
    fn test_local_entry_without_local_name_is_invariant_violation() {
        let bogus = ExportEntry {
            export_name: Some("broken".to_string()),
            module_request: None,
            import_name: None,
            local_name: None,
            span: Span::default(),
        };
        let result =
            ModuleRecord::new(PathBuf::from("a.js"), Vec::new(), vec![bogus], null_resolver());
        assert!(matches!(result, Err(InvariantViolation::MissingLocalName { .. })));
    }

    #[test]
    fn test_fresh_visited_set_per_query() {
        let record = record_for("a.js", "export const a = 1;", null_resolver());
        assert_eq!(record.exported_names(&mut HashSet::new()), vec!["a"]);
        // A second query with its own set sees the same result.
        assert_eq!(record.exported_names(&mut HashSet::new()), vec!["a"]);
        // Reusing a set that already contains this module yields nothing.
        let mut stale: HashSet<PathBuf> = HashSet::new();
        stale.insert(PathBuf::from("a.js"));
        assert_eq!(record.exported_names(&mut stale), Vec::<String>::new());
    }
}
