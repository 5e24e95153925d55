//! Per-language import resolution for cross-file context expansion.
//!
//! Produces candidate sibling file paths from a chunk's source text. The
//! candidates are guesses: callers must probe the index per path and drop
//! the ones with no chunks.

use std::sync::LazyLock;

use regex::Regex;

static PY_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:from\s+([\w.]+)\s+import|import\s+([\w.]+))").unwrap()
});

static JS_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:import\s+[^'"]*from\s+|require\s*\(\s*)['"](\.[^'"]+)['"]"#).unwrap()
});

static JS_QUERY_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?#].*$").unwrap());

static PHP_REQUIRE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:require|include)(?:_once)?\s*(\(?\s*__DIR__\s*\.\s*)?['"]([^'"]+\.php)['"]"#)
        .unwrap()
});

static PHP_USE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^use\s+([\w\\]+)(?:\s+as\s+\w+)?;").unwrap());

const JS_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx"];

/// Resolve import statements in `content` to candidate file paths, relative
/// to the directory of `file_path`.
///
/// Unsupported languages yield no candidates. Output is deduplicated by
/// exact string equality, first-seen order.
#[must_use]
pub fn resolve(content: &str, file_path: &str, language: &str) -> Vec<String> {
    let dir = parent_dir(file_path);
    let mut candidates = Vec::new();

    match language.to_lowercase().as_str() {
        "python" => resolve_python(content, dir, &mut candidates),
        "javascript" | "typescript" => resolve_js(content, dir, &mut candidates),
        "php" => resolve_php(content, dir, &mut candidates),
        _ => {}
    }

    let mut out = Vec::with_capacity(candidates.len());
    for c in candidates {
        if !out.contains(&c) {
            out.push(c);
        }
    }
    out
}

/// Only relative imports (leading dot) are resolvable against the file tree;
/// bare module names would need the interpreter's search path.
fn resolve_python(content: &str, dir: &str, out: &mut Vec<String>) {
    for caps in PY_IMPORT_RE.captures_iter(content) {
        let module = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());
        if !module.starts_with('.') {
            continue;
        }
        let rel = format!("{}.py", module.trim_start_matches('.').replace('.', "/"));
        out.push(join_relative(dir, &rel));
    }
}

fn resolve_js(content: &str, dir: &str, out: &mut Vec<String>) {
    for caps in JS_IMPORT_RE.captures_iter(content) {
        let raw = caps.get(1).map_or("", |m| m.as_str());
        let raw = JS_QUERY_SUFFIX_RE.replace(raw, "");
        let resolved = join_relative(dir, &raw);

        // Without an extension the on-disk name is unknown; emit every
        // plausible candidate and let the caller probe the index.
        let needs_extension = !basename(&resolved).contains('.');
        out.push(resolved.clone());
        if needs_extension {
            for ext in JS_EXTENSIONS {
                out.push(format!("{resolved}{ext}"));
            }
        }
    }
}

fn resolve_php(content: &str, dir: &str, out: &mut Vec<String>) {
    for caps in PHP_REQUIRE_RE.captures_iter(content) {
        let dir_prefixed = caps.get(1).is_some();
        let literal = caps.get(2).map_or("", |m| m.as_str());

        let resolved = if dir_prefixed {
            join_relative(dir, literal.trim_start_matches('/'))
        } else if literal.starts_with('/') {
            literal.to_owned()
        } else {
            join_relative(dir, literal)
        };
        out.push(resolved);
    }

    // PSR-4 guess: namespace separators become path separators. No
    // autoload map is consulted, so these are hints at best.
    for caps in PHP_USE_RE.captures_iter(content) {
        let namespace = caps.get(1).map_or("", |m| m.as_str());
        out.push(format!("{}.php", namespace.replace('\\', "/")));
    }
}

fn parent_dir(file_path: &str) -> &str {
    file_path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Lexically join `rel` onto `dir`, collapsing `.` and `..` segments.
fn join_relative(dir: &str, rel: &str) -> String {
    let mut stack: Vec<&str> = dir.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
    for segment in rel.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            s => stack.push(s),
        }
    }
    stack.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_relative_from_import() {
        let content = "from .utils import helper\nfrom ..models import User\n";
        let candidates = resolve(content, "pkg/sub/app.py", "python");
        // Leading dots are stripped, not walked: both levels resolve against
        // the chunk's own directory.
        assert_eq!(candidates, vec!["pkg/sub/utils.py", "pkg/sub/models.py"]);
    }

    #[test]
    fn python_absolute_imports_skipped() {
        let content = "import os\nfrom django.db import models\n";
        assert!(resolve(content, "app.py", "python").is_empty());
    }

    #[test]
    fn python_plain_relative_import() {
        let content = "import .sibling\n";
        let candidates = resolve(content, "src/mod.py", "python");
        assert_eq!(candidates, vec!["src/sibling.py"]);
    }

    #[test]
    fn js_import_with_extension() {
        let content = "import { x } from './helpers.js';\n";
        let candidates = resolve(content, "src/index.js", "javascript");
        assert_eq!(candidates, vec!["src/helpers.js"]);
    }

    #[test]
    fn js_extensionless_import_emits_all_candidates() {
        let content = "import thing from './lib/thing';\n";
        let candidates = resolve(content, "src/app.ts", "typescript");
        assert_eq!(
            candidates,
            vec![
                "src/lib/thing",
                "src/lib/thing.ts",
                "src/lib/thing.tsx",
                "src/lib/thing.js",
                "src/lib/thing.jsx",
            ]
        );
    }

    #[test]
    fn js_require_and_parent_traversal() {
        let content = "const util = require('../util.js');\n";
        let candidates = resolve(content, "src/deep/mod.js", "javascript");
        assert_eq!(candidates, vec!["src/util.js"]);
    }

    #[test]
    fn js_strips_query_and_fragment() {
        let content = "import style from './theme.css?inline';\n";
        let candidates = resolve(content, "src/app.ts", "typescript");
        assert_eq!(candidates, vec!["src/theme.css"]);
    }

    #[test]
    fn js_non_relative_imports_skipped() {
        let content = "import React from 'react';\nconst _ = require('lodash');\n";
        assert!(resolve(content, "src/app.js", "javascript").is_empty());
    }

    #[test]
    fn php_require_relative() {
        let content = "require_once 'helpers.php';\ninclude '../config.php';\n";
        let candidates = resolve(content, "app/Http/Kernel.php", "php");
        assert_eq!(candidates, vec!["app/Http/helpers.php", "app/config.php"]);
    }

    #[test]
    fn php_require_dir_prefixed() {
        let content = "require __DIR__ . '/bootstrap.php';\n";
        let candidates = resolve(content, "app/Console/Kernel.php", "php");
        assert_eq!(candidates, vec!["app/Console/bootstrap.php"]);
    }

    #[test]
    fn php_require_absolute_kept() {
        let content = "require '/var/www/shared/init.php';\n";
        let candidates = resolve(content, "index.php", "php");
        assert_eq!(candidates, vec!["/var/www/shared/init.php"]);
    }

    #[test]
    fn php_use_statement_psr4_guess() {
        let content = "use App\\Services\\Retriever;\nuse App\\Models\\Repo as R;\n";
        let candidates = resolve(content, "app/Http/Controllers/ChatController.php", "php");
        assert_eq!(
            candidates,
            vec!["App/Services/Retriever.php", "App/Models/Repo.php"]
        );
    }

    #[test]
    fn unknown_language_yields_nothing() {
        assert!(resolve("import x from './y';", "a.rb", "ruby").is_empty());
    }

    #[test]
    fn duplicate_candidates_collapsed() {
        let content = "import a from './x.js';\nimport b from './x.js';\n";
        let candidates = resolve(content, "src/m.js", "javascript");
        assert_eq!(candidates, vec!["src/x.js"]);
    }

    #[test]
    fn join_relative_collapses_segments() {
        assert_eq!(join_relative("a/b", "../c.py"), "a/c.py");
        assert_eq!(join_relative("a/b", "./c.py"), "a/b/c.py");
        assert_eq!(join_relative("", "c.py"), "c.py");
        assert_eq!(join_relative("a", "../../c.py"), "c.py");
    }
}
