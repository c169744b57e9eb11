use log::trace;
use oxc_ast::ast::*;

use crate::types::{ANONYMOUS_DEFAULT, ExportEntry, ImportEntry, NAMESPACE_IMPORT};

/// Walks a module's top-level declarations and produces the raw import and
/// export entry tables, following the entry-construction steps of the
/// ECMAScript ParseModule operation. Classification into local / indirect /
/// star partitions happens later, in `ModuleRecord`.
pub fn extract_entries(program: &Program) -> (Vec<ImportEntry>, Vec<ExportEntry>) {
    let mut imports = Vec::new();
    let mut exports = Vec::new();

    for stmt in &program.body {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                handle_import_declaration(decl, &mut imports);
            }
            Statement::ExportAllDeclaration(decl) => {
                handle_export_all_declaration(decl, &mut exports);
            }
            Statement::ExportNamedDeclaration(decl) => {
                handle_export_named_declaration(decl, &mut exports);
            }
            Statement::ExportDefaultDeclaration(decl) => {
                handle_export_default_declaration(decl, &mut exports);
            }
            _ => {}
        }
    }

    trace!("Extracted {} import entries, {} export entries", imports.len(), exports.len());
    (imports, exports)
}

fn handle_import_declaration(decl: &ImportDeclaration, imports: &mut Vec<ImportEntry>) {
    let module_request = decl.source.value.to_string();

    let specifiers = match &decl.specifiers {
        Some(specifiers) if !specifiers.is_empty() => specifiers,
        // import "m"; binds nothing but still records the request.
        _ => {
            imports.push(ImportEntry {
                module_request,
                import_name: None,
                local_name: None,
                span: decl.span,
            });
            return;
        }
    };

    for specifier in specifiers {
        let (import_name, local_name) = match specifier {
            ImportDeclarationSpecifier::ImportSpecifier(s) => {
                (export_name_of(&s.imported), s.local.name.to_string())
            }
            ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                ("default".to_string(), s.local.name.to_string())
            }
            ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                (NAMESPACE_IMPORT.to_string(), s.local.name.to_string())
            }
        };
        imports.push(ImportEntry {
            module_request: module_request.clone(),
            import_name: Some(import_name),
            local_name: Some(local_name),
            span: decl.span,
        });
    }
}

fn handle_export_all_declaration(decl: &ExportAllDeclaration, exports: &mut Vec<ExportEntry>) {
    // `export * as ns from "m"` carries an exported name and classifies as
    // indirect; the plain `export * from "m"` form is the only entry with a
    // None export name.
    exports.push(ExportEntry {
        export_name: decl.exported.as_ref().map(export_name_of),
        module_request: Some(decl.source.value.to_string()),
        import_name: Some(NAMESPACE_IMPORT.to_string()),
        local_name: None,
        span: decl.span,
    });
}

fn handle_export_named_declaration(decl: &ExportNamedDeclaration, exports: &mut Vec<ExportEntry>) {
    if let Some(source) = &decl.source {
        // export { a as x, default as d } from "m";
        for specifier in &decl.specifiers {
            exports.push(ExportEntry {
                export_name: Some(export_name_of(&specifier.exported)),
                module_request: Some(source.value.to_string()),
                import_name: Some(export_name_of(&specifier.local)),
                local_name: None,
                span: decl.span,
            });
        }
        return;
    }

    if let Some(declaration) = &decl.declaration {
        match declaration {
            Declaration::FunctionDeclaration(f) => {
                if let Some(id) = &f.id {
                    exports.push(ExportEntry::local(&id.name, &id.name, decl.span));
                }
            }
            Declaration::ClassDeclaration(c) => {
                if let Some(id) = &c.id {
                    exports.push(ExportEntry::local(&id.name, &id.name, decl.span));
                }
            }
            Declaration::VariableDeclaration(vd) => {
                for declarator in &vd.declarations {
                    let mut names = Vec::new();
                    collect_bound_names(&declarator.id, &mut names);
                    for name in names {
                        exports.push(ExportEntry::local(&name, &name, decl.span));
                    }
                }
            }
            Declaration::TSTypeAliasDeclaration(d) => {
                exports.push(ExportEntry::local(&d.id.name, &d.id.name, decl.span));
            }
            Declaration::TSInterfaceDeclaration(d) => {
                exports.push(ExportEntry::local(&d.id.name, &d.id.name, decl.span));
            }
            Declaration::TSEnumDeclaration(d) => {
                exports.push(ExportEntry::local(&d.id.name, &d.id.name, decl.span));
            }
            _ => {}
        }
        return;
    }

    // export { a, b as c };
    for specifier in &decl.specifiers {
        exports.push(ExportEntry {
            export_name: Some(export_name_of(&specifier.exported)),
            module_request: None,
            import_name: None,
            local_name: Some(export_name_of(&specifier.local)),
            span: decl.span,
        });
    }
}

fn handle_export_default_declaration(
    decl: &ExportDefaultDeclaration,
    exports: &mut Vec<ExportEntry>,
) {
    // A named function/class expression keeps its own name as the local
    // binding; anonymous forms get the reserved sentinel.
    let local_name = match &decl.declaration {
        ExportDefaultDeclarationKind::FunctionDeclaration(f) => {
            f.id.as_ref().map(|id| id.name.to_string())
        }
        ExportDefaultDeclarationKind::ClassDeclaration(c) => {
            c.id.as_ref().map(|id| id.name.to_string())
        }
        ExportDefaultDeclarationKind::TSInterfaceDeclaration(i) => Some(i.id.name.to_string()),
        _ => None,
    };

    exports.push(ExportEntry {
        export_name: Some("default".to_string()),
        module_request: None,
        import_name: None,
        local_name: Some(local_name.unwrap_or_else(|| ANONYMOUS_DEFAULT.to_string())),
        span: decl.span,
    });
}

/// Every name bound by a declarator pattern, in source order. Handles
/// `export const { a, b: c = 1, ...rest } = obj;` and array patterns.
fn collect_bound_names(pattern: &BindingPattern, names: &mut Vec<String>) {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(id) => names.push(id.name.to_string()),
        BindingPatternKind::ObjectPattern(obj) => {
            for property in &obj.properties {
                collect_bound_names(&property.value, names);
            }
            if let Some(rest) = &obj.rest {
                collect_bound_names(&rest.argument, names);
            }
        }
        BindingPatternKind::ArrayPattern(arr) => {
            for element in arr.elements.iter().flatten() {
                collect_bound_names(element, names);
            }
            if let Some(rest) = &arr.rest {
                collect_bound_names(&rest.argument, names);
            }
        }
        BindingPatternKind::AssignmentPattern(ap) => collect_bound_names(&ap.left, names),
    }
}

fn export_name_of(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::IdentifierName(id) => id.name.to_string(),
        ModuleExportName::IdentifierReference(id) => id.name.to_string(),
        ModuleExportName::StringLiteral(s) => s.value.to_string(),
    }
}
