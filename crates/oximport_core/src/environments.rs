//! Built-in global names per runtime environment. The undefined-identifier
//! check unions the lists for the configured environments so that `console`
//! or `process` never shows up as an import candidate.

/// Names defined by the language itself, present in every environment.
pub const CORE_GLOBALS: &[&str] = &[
    "Array",
    "ArrayBuffer",
    "BigInt",
    "Boolean",
    "DataView",
    "Date",
    "Error",
    "EvalError",
    "Float32Array",
    "Float64Array",
    "Function",
    "Infinity",
    "Int8Array",
    "Int16Array",
    "Int32Array",
    "Intl",
    "JSON",
    "Map",
    "Math",
    "NaN",
    "Number",
    "Object",
    "Promise",
    "Proxy",
    "RangeError",
    "ReferenceError",
    "Reflect",
    "RegExp",
    "Set",
    "String",
    "Symbol",
    "SyntaxError",
    "TypeError",
    "URIError",
    "Uint8Array",
    "Uint8ClampedArray",
    "Uint16Array",
    "Uint32Array",
    "WeakMap",
    "WeakSet",
    "decodeURI",
    "decodeURIComponent",
    "encodeURI",
    "encodeURIComponent",
    "eval",
    "globalThis",
    "isFinite",
    "isNaN",
    "parseFloat",
    "parseInt",
    "undefined",
];

/// Globals present in browser contexts.
pub const BROWSER_GLOBALS: &[&str] = &[
    "alert",
    "atob",
    "btoa",
    "cancelAnimationFrame",
    "clearInterval",
    "clearTimeout",
    "console",
    "document",
    "fetch",
    "history",
    "localStorage",
    "location",
    "navigator",
    "requestAnimationFrame",
    "sessionStorage",
    "setInterval",
    "setTimeout",
    "window",
];

/// Globals present in node contexts.
pub const NODE_GLOBALS: &[&str] = &[
    "Buffer",
    "__dirname",
    "__filename",
    "clearImmediate",
    "clearInterval",
    "clearTimeout",
    "console",
    "exports",
    "global",
    "module",
    "process",
    "require",
    "setImmediate",
    "setInterval",
    "setTimeout",
];

/// Union of the core globals and the lists for the named environments.
/// Unknown environment names contribute nothing.
pub fn globals_for(environments: &[String]) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = CORE_GLOBALS.to_vec();
    for env in environments {
        let list = match env.as_str() {
            "browser" => BROWSER_GLOBALS,
            "node" => NODE_GLOBALS,
            _ => continue,
        };
        for name in list {
            if !names.contains(name) {
                names.push(name);
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_globals_always_present() {
        let names = globals_for(&[]);
        assert!(names.contains(&"Promise"));
        assert!(!names.contains(&"window"));
    }

    #[test]
    fn test_environment_union_dedupes() {
        let envs = vec!["browser".to_string(), "node".to_string()];
        let names = globals_for(&envs);
        assert!(names.contains(&"window"));
        assert!(names.contains(&"process"));
        // console is in both lists but should appear once
        assert_eq!(names.iter().filter(|n| **n == "console").count(), 1);
    }

    #[test]
    fn test_unknown_environment_ignored() {
        let envs = vec!["deno".to_string()];
        assert_eq!(globals_for(&envs).len(), CORE_GLOBALS.len());
    }
}
