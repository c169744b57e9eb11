use anyhow::{Result, bail};
use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_parser::{ParseOptions, Parser as OxcParser, ParserReturn};
use oxc_span::SourceType;
use std::path::Path;

/// Picks a parse mode from the file extension: JSX for .js/.jsx/.tsx,
/// TypeScript for the .ts family, module goal for everything but the
/// explicit CommonJS extensions.
pub fn source_type_for(path: &Path) -> SourceType {
    let ext = path.extension().and_then(|e| e.to_str());

    SourceType::default()
        .with_module(!matches!(ext, Some("cjs") | Some("cts")))
        .with_jsx(matches!(ext, Some("tsx") | Some("jsx") | Some("js")))
        .with_typescript(matches!(ext, Some("ts") | Some("tsx") | Some("mts") | Some("cts")))
}

/// Parses `source` and hands the program to `f`.
///
/// The parse is tolerant: sources being edited right now are expected to
/// carry recoverable errors, and the analysis should keep working on them.
/// Only a parse that panicked (no usable program) is an error.
pub fn with_program<T>(
    source: &str,
    source_type: SourceType,
    f: impl FnOnce(&Program) -> T,
) -> Result<T> {
    let options = ParseOptions { allow_return_outside_function: true, ..ParseOptions::default() };

    let allocator = Allocator::default();
    let ParserReturn { program, errors, panicked, .. } =
        OxcParser::new(&allocator, source, source_type).with_options(options).parse();

    if panicked {
        bail!("parser could not produce a program");
    }
    if !errors.is_empty() {
        trace!("Parsed with {} recoverable errors", errors.len());
    }
    debug!("Parsed program with {} top-level statements", program.body.len());

    Ok(f(&program))
}
