//! Static analysis for automatic JavaScript/TypeScript import resolution.
//!
//! Two independent subsystems over the same oxc syntax trees:
//! - Module-interface resolution: per-file `ModuleRecord`s that reconstruct
//!   the exact set of names a module exports, including re-exports and
//!   `export *` forwarding across cyclic module graphs, patterned after the
//!   ECMAScript Abstract Module Record algorithms.
//! - Scope analysis: a hoisting-correct walk that reports, for every
//!   identifier occurrence, which names are already bound in the enclosing
//!   lexical scope.
//!
//! Around them, the collaborator layers an editor integration needs: a
//! tolerant parser wrapper, specifier-to-path resolution, a memoizing module
//! pool, candidate-file collection, and project configuration.

mod collector;
mod config;
mod constants;
mod environments;
mod extract;
mod parser;
mod pool;
mod record;
mod resolver;
mod scope;
mod types;

// Re-export public API
pub use collector::collect_candidates;
pub use config::{Settings, find_git_root, read_settings, read_tsconfig_paths};
pub use constants::{INDEX_FILES, JS_TS_EXTENSIONS, RESOLVE_EXTENSIONS};
pub use environments::globals_for;
pub use extract::extract_entries;
pub use parser::{source_type_for, with_program};
pub use pool::ModulePool;
pub use record::{HostResolver, InvariantViolation, ModuleRecord};
pub use resolver::resolve;
pub use scope::{IdentifierObservation, visit_identifiers};
pub use types::{ANONYMOUS_DEFAULT, ExportEntry, ImportEntry, NAMESPACE_IMPORT};
