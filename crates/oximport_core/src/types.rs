use oxc_span::Span;

/// Local name recorded for an anonymous `export default` (expression,
/// unnamed function, unnamed class). `*` is not a legal identifier, so the
/// sentinel can never collide with a real binding.
pub const ANONYMOUS_DEFAULT: &str = "*default*";

/// Import name marking a namespace request (`import * as ns`). Mirrors the
/// `"*"` marker used by the ECMAScript import-entry table.
pub const NAMESPACE_IMPORT: &str = "*";

/// One imported binding, patterned after the ECMAScript ImportEntry record.
///
/// A side-effect import (`import "m"`) is held as an entry with both
/// `import_name` and `local_name` set to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub module_request: String,
    /// `"*"` for a namespace import, `"default"` for a default import,
    /// the exported name for a named import, `None` for a side-effect
    /// import.
    pub import_name: Option<String>,
    /// The binding introduced into the importing module. `None` only for a
    /// side-effect import.
    pub local_name: Option<String>,
    pub span: Span,
}

/// One exported binding, patterned after the ECMAScript ExportEntry record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    /// The name this module exports the binding under. `None` only for a
    /// pure `export * from "m"`.
    pub export_name: Option<String>,
    /// Specifier of the module the binding is forwarded from. `None` when
    /// the binding originates in this module.
    pub module_request: Option<String>,
    /// Name under which the binding is exported by the requested module.
    /// `"*"` for star and namespace re-exports.
    pub import_name: Option<String>,
    /// Name of the binding within this module, when locally accessible.
    pub local_name: Option<String>,
    pub span: Span,
}

impl ExportEntry {
    /// A local entry: the exported value originates in the current module.
    pub fn local(export_name: &str, local_name: &str, span: Span) -> Self {
        Self {
            export_name: Some(export_name.to_string()),
            module_request: None,
            import_name: None,
            local_name: Some(local_name.to_string()),
            span,
        }
    }
}
