use anyhow::{Context, Result};
use dashmap::DashMap;
use log::{debug, trace};
use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Weak},
};

use crate::parser::{source_type_for, with_program};
use crate::record::{HostResolver, ModuleRecord};
use crate::resolver::resolve;

/// Builds and caches one `ModuleRecord` per absolute module path.
///
/// The same module is commonly reachable through many star/indirect edges
/// within one query and across queries over a long-lived process, so records
/// are memoized; re-parsing per edge would be correct but ruinous on large
/// fan-in graphs. The pool also supplies each record's host resolver, closing
/// the loop between specifier resolution and record construction. Shareable
/// across threads.
pub struct ModulePool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    root: PathBuf,
    tsconfig_paths: HashMap<String, Vec<String>>,
    records: DashMap<PathBuf, Arc<ModuleRecord>>,
    resolve_cache: DashMap<(PathBuf, String), Option<PathBuf>>,
}

impl ModulePool {
    pub fn new(root: PathBuf, tsconfig_paths: HashMap<String, Vec<String>>) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                root,
                tsconfig_paths,
                records: DashMap::new(),
                resolve_cache: DashMap::new(),
            }),
        }
    }

    /// The record for `path`, parsing and classifying it on first request.
    pub fn record_for(&self, path: &Path) -> Result<Arc<ModuleRecord>> {
        PoolInner::record_for(&self.inner, path)
    }

    /// Every name exported by the module at `path`, using a fresh visited
    /// set for this query.
    pub fn exported_names_of(&self, path: &Path) -> Result<Vec<String>> {
        let record = self.record_for(path)?;
        let mut visited = HashSet::new();
        Ok(record.exported_names(&mut visited))
    }

    /// Drops the cached record for `path`. Call when the source changes; the
    /// next request rebuilds it.
    pub fn invalidate(&self, path: &Path) {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if self.inner.records.remove(&key).is_some() {
            debug!("Invalidated record for {}", key.display());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records.is_empty()
    }
}

impl PoolInner {
    fn record_for(inner: &Arc<PoolInner>, path: &Path) -> Result<Arc<ModuleRecord>> {
        // Canonical paths keep symlinked reachings of the same file on one
        // cache entry.
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if let Some(record) = inner.records.get(&key) {
            trace!("Cache hit for record: {}", key.display());
            return Ok(record.clone());
        }

        trace!("Building record for {}", key.display());
        let source = fs::read_to_string(&key)
            .with_context(|| format!("Failed to read {}", key.display()))?;
        let resolver = Self::host_resolver(inner);
        let record = with_program(&source, source_type_for(&key), |program| {
            ModuleRecord::from_program(key.clone(), program, resolver)
        })??;

        let record = Arc::new(record);
        inner.records.insert(key, record.clone());
        Ok(record)
    }

    fn host_resolver(inner: &Arc<PoolInner>) -> HostResolver {
        // Records live inside the pool's map and hold this closure; a weak
        // link keeps that from becoming a reference cycle.
        let weak: Weak<PoolInner> = Arc::downgrade(inner);
        Arc::new(move |referencing: &ModuleRecord, specifier: &str| {
            let inner = weak.upgrade()?;
            let resolved = resolve(
                &inner.root,
                &inner.tsconfig_paths,
                &referencing.module_path,
                specifier,
                &inner.resolve_cache,
            )
            .ok()
            .flatten()?;
            // Read/parse failures absorb to None here; on the star-export
            // path an unresolved module simply contributes no names.
            PoolInner::record_for(&inner, &resolved).ok()
        })
    }
}
