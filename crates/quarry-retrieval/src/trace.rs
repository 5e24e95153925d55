//! Stack-trace parsing: extract file/line references from error logs.
//!
//! A single log may mix ecosystems; every pattern runs over the whole
//! input and matches accumulate in the order the patterns are applied.

use std::sync::LazyLock;

use regex::Regex;

/// A file/line pair extracted from a stack trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceReference {
    pub file: String,
    pub line: u32,
}

// Python: File "app.py", line 42, in some_function
static PYTHON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)File "([^"]+)",\s+line\s+(\d+)"#).unwrap());

// JavaScript: at functionName (path/file.js:42:15)
static JS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)at\s+(?:\S+\s+)?\(([^)]+\.(?:js|ts|jsx|tsx)):(\d+)(?::\d+)?\)").unwrap()
});

// Java: at com.example.Class.method(File.java:42)
static JAVA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)at\s+[\w.$]+\((\w+\.java):(\d+)\)").unwrap());

// PHP stack frame: #0 /path/to/file.php(42): ...
static PHP_FRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)#\d+\s+([^\s(]+\.php)\((\d+)\)").unwrap());

// PHP fatal/exception: in /path/to/file.php on line 42
static PHP_FATAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)in\s+(\S+\.php)\s+on\s+line\s+(\d+)").unwrap());

/// Extract deduplicated file/line references from an error log.
///
/// All patterns are applied independently; references keep first-seen
/// order and are unique by their `file:line` pair.
#[must_use]
pub fn parse(error_log: &str) -> Vec<TraceReference> {
    let mut refs = Vec::new();

    for re in [&PYTHON_RE, &JS_RE, &JAVA_RE, &PHP_FRAME_RE, &PHP_FATAL_RE] {
        for caps in re.captures_iter(error_log) {
            let file = caps.get(1).map_or("", |m| m.as_str());
            let Some(line) = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok()) else {
                continue;
            };
            refs.push(TraceReference {
                file: file.to_owned(),
                line,
            });
        }
    }

    let mut seen = std::collections::HashSet::new();
    refs.retain(|r| seen.insert(format!("{}:{}", r.file, r.line)));
    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(file: &str, line: u32) -> TraceReference {
        TraceReference {
            file: file.into(),
            line,
        }
    }

    #[test]
    fn python_traceback_single_reference() {
        let log = "Traceback (most recent call last):\n  File \"app.py\", line 42, in process_request\nAttributeError: 'NoneType' object has no attribute 'id'";
        assert_eq!(parse(log), vec![reference("app.py", 42)]);
    }

    #[test]
    fn javascript_frames_preserve_order() {
        let log = "TypeError: x is not a function\n    at fn (src/utils.js:15:22)\n    at main (src/index.js:8:3)";
        assert_eq!(
            parse(log),
            vec![reference("src/utils.js", 15), reference("src/index.js", 8)]
        );
    }

    #[test]
    fn javascript_column_optional() {
        let log = "at handler (lib/route.ts:99)";
        assert_eq!(parse(log), vec![reference("lib/route.ts", 99)]);
    }

    #[test]
    fn java_frame() {
        let log = "    at com.example.UserService.load(UserService.java:88)";
        assert_eq!(parse(log), vec![reference("UserService.java", 88)]);
    }

    #[test]
    fn php_stack_frame_and_fatal() {
        let log = "#0 /var/www/app/Services/Foo.php(23): Foo->bar()\nPHP Fatal error: Uncaught Error in /var/www/public/index.php on line 12";
        assert_eq!(
            parse(log),
            vec![
                reference("/var/www/app/Services/Foo.php", 23),
                reference("/var/www/public/index.php", 12),
            ]
        );
    }

    #[test]
    fn duplicate_references_collapse() {
        let log = "File \"app.py\", line 42\nFile \"app.py\", line 42\nFile \"app.py\", line 43";
        assert_eq!(
            parse(log),
            vec![reference("app.py", 42), reference("app.py", 43)]
        );
    }

    #[test]
    fn mixed_format_log_accumulates_all_patterns() {
        let log = "File \"worker.py\", line 7\n    at boot (src/main.ts:3:1)\n#1 /srv/app.php(55): run()";
        assert_eq!(
            parse(log),
            vec![
                reference("worker.py", 7),
                reference("src/main.ts", 3),
                reference("/srv/app.php", 55),
            ]
        );
    }

    #[test]
    fn unparseable_log_yields_nothing() {
        assert!(parse("segmentation fault (core dumped)").is_empty());
        assert!(parse("").is_empty());
    }
}
