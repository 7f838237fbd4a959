//! BIND-style configuration file parser
//!
//! Reads a named.conf-flavored file into a generic nested key/value tree.
//! The grammar is deliberately loose: nested `{}` blocks, one-line inline
//! blocks, `include` directives and plain key/value statements are
//! recognized, and anything else is skipped. Downstream tooling depends on
//! partial files remaining readable, so malformed lines never abort a parse;
//! only failure to open the named top-level file does.
//!
//! Known limitation: a block terminator is matched against the whole
//! physical line (`}` or `};`), so a right brace sitting alone on a line
//! inside a quoted string would end the block early.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref COMMENT_RE: Regex =
        Regex::new(r"^\s*(//.*|#.*)?$").expect("Failed to compile config comment regex");
    static ref KEY_VALUE_RE: Regex =
        Regex::new(r"^\s*(\S+)\s+(.+?)\s*(;)?$").expect("Failed to compile key-value regex");
    static ref BLOCK_START_RE: Regex =
        Regex::new(r"^\s*(\S.*?)\s*\{\s*$").expect("Failed to compile block start regex");
    static ref INLINE_BLOCK_RE: Regex =
        Regex::new(r"^\s*(\S+)\s*\{\s*(.*?)\s*\}\s*(;)?$").expect("Failed to compile inline block regex");
    static ref INCLUDE_RE: Regex =
        Regex::new(r#"^\s*include\s+["']?([^"']+)["']?\s*(;)?$"#).expect("Failed to compile include regex");
}

/// Parser errors for configuration files
#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "cannot read configuration file {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
        }
    }
}

type Result<T> = std::result::Result<T, ConfigError>;

/// A single value in the configuration tree.
///
/// Inline blocks collapse to a `Scalar` when they hold exactly one token and
/// to a `List` otherwise; consumers must be prepared for both shapes.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Scalar(String),
    List(Vec<String>),
    Block(ConfigNode),
}

impl ConfigValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            ConfigValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&ConfigNode> {
        match self {
            ConfigValue::Block(node) => Some(node),
            _ => None,
        }
    }
}

/// A mapping from statement keys to values; keys are unique within a node.
pub type ConfigNode = BTreeMap<String, ConfigValue>;

/// Stateful configuration parser.
///
/// The parser tracks every file it has entered so that `include` cycles
/// terminate: a file seen twice is treated like any other unreadable
/// include and skipped with a warning.
pub struct ConfigParser {
    visited: HashSet<PathBuf>,
}

impl ConfigParser {
    pub fn new() -> ConfigParser {
        ConfigParser {
            visited: HashSet::new(),
        }
    }

    /// Parse a configuration file, recursively resolving `include`s.
    pub fn parse_file(&mut self, path: &Path) -> Result<ConfigNode> {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !self.visited.insert(canonical) {
            log::warn!("configuration include cycle at {}, skipping", path.display());
            return Ok(ConfigNode::new());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(self.parse_str(&content, &base_dir))
    }

    /// Parse configuration text; `base_dir` anchors relative `include` paths.
    pub fn parse_str(&mut self, content: &str, base_dir: &Path) -> ConfigNode {
        let lines: Vec<&str> = content.lines().collect();
        let mut cursor = lines.iter();
        self.parse_block(&mut cursor, base_dir, false)
    }

    /// Parse statements until end of input or, when `terminated` is set, a
    /// `}` / `};` line. The cursor is shared with the caller so nested
    /// blocks advance a single scan position.
    fn parse_block<'a>(
        &mut self,
        cursor: &mut std::slice::Iter<'a, &'a str>,
        base_dir: &Path,
        terminated: bool,
    ) -> ConfigNode {
        let mut node = ConfigNode::new();

        while let Some(raw) = cursor.next() {
            let line = raw.trim();

            if COMMENT_RE.is_match(line) {
                continue;
            }
            if line == "}" || line == "};" {
                if terminated {
                    return node;
                }
                // stray terminator at top level
                continue;
            }
            if let Some(caps) = INCLUDE_RE.captures(line) {
                let mut include_path = PathBuf::from(&caps[1]);
                if !include_path.is_absolute() {
                    include_path = base_dir.join(include_path);
                }
                match self.parse_file(&include_path) {
                    Ok(included) => merge_nodes(&mut node, included),
                    Err(err) => log::warn!("skipping include: {}", err),
                }
                continue;
            }
            if let Some(caps) = BLOCK_START_RE.captures(line) {
                let inner = self.parse_block(cursor, base_dir, true);
                node.insert(caps[1].to_string(), ConfigValue::Block(inner));
                continue;
            }
            if let Some(caps) = INLINE_BLOCK_RE.captures(line) {
                let values: Vec<String> = caps[2]
                    .split(';')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(str::to_string)
                    .collect();
                let value = if values.len() == 1 {
                    ConfigValue::Scalar(values.into_iter().next().unwrap_or_default())
                } else {
                    ConfigValue::List(values)
                };
                node.insert(caps[1].to_string(), value);
                continue;
            }
            if let Some(caps) = KEY_VALUE_RE.captures(line) {
                let value = caps[2].trim_matches('"').to_string();
                node.insert(caps[1].to_string(), ConfigValue::Scalar(value));
            }
        }

        node
    }
}

impl Default for ConfigParser {
    fn default() -> Self {
        ConfigParser::new()
    }
}

/// Deep-merge `src` into `dst`: matching nested blocks merge key by key,
/// everything else is last-write-wins.
fn merge_nodes(dst: &mut ConfigNode, src: ConfigNode) {
    for (key, value) in src {
        match (dst.get_mut(&key), value) {
            (Some(ConfigValue::Block(existing)), ConfigValue::Block(incoming)) => {
                merge_nodes(existing, incoming);
            }
            (_, value) => {
                dst.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ConfigNode {
        ConfigParser::new().parse_str(content, Path::new("."))
    }

    #[test]
    fn test_key_value_quote_stripping() {
        let node = parse("directory \"/var/cache/bind\";\nversion none;\n");
        assert_eq!(
            node.get("directory"),
            Some(&ConfigValue::Scalar("/var/cache/bind".to_string()))
        );
        assert_eq!(node.get("version"), Some(&ConfigValue::Scalar("none".to_string())));
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let node = parse("// a comment\n# another\n\nkey value;\n");
        assert_eq!(node.len(), 1);
        assert_eq!(node.get("key"), Some(&ConfigValue::Scalar("value".to_string())));
    }

    #[test]
    fn test_nested_block_depth() {
        let content = "options {\n  rate-limit {\n    responses-per-second 5;\n  };\n};\n";
        let node = parse(content);
        let options = node.get("options").and_then(ConfigValue::as_block).unwrap();
        let rate_limit = options.get("rate-limit").and_then(ConfigValue::as_block).unwrap();
        assert_eq!(
            rate_limit.get("responses-per-second"),
            Some(&ConfigValue::Scalar("5".to_string()))
        );
    }

    #[test]
    fn test_inline_block_single_token_collapses_to_scalar() {
        let node = parse("listeners { a; };\n");
        assert_eq!(node.get("listeners"), Some(&ConfigValue::Scalar("a".to_string())));
    }

    #[test]
    fn test_inline_block_multiple_tokens_stay_a_list() {
        let node = parse("listeners { a; b; };\n");
        assert_eq!(
            node.get("listeners"),
            Some(&ConfigValue::List(vec!["a".to_string(), "b".to_string()]))
        );
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let node = parse("}\njustoneword\nkey value;\n");
        assert_eq!(node.len(), 1);
        assert!(node.contains_key("key"));
    }

    #[test]
    fn test_zone_block_shape() {
        let content = "zone \"a.com\" {\n  type master;\n  file \"db.a.com\";\n};\n";
        let node = parse(content);
        let zone = node.get("zone \"a.com\"").and_then(ConfigValue::as_block).unwrap();
        assert_eq!(zone.get("type"), Some(&ConfigValue::Scalar("master".to_string())));
        assert_eq!(zone.get("file"), Some(&ConfigValue::Scalar("db.a.com".to_string())));
    }

    #[test]
    fn test_merge_recurses_into_matching_blocks() {
        let mut dst = parse("options {\n  a 1;\n};\n");
        let src = parse("options {\n  b 2;\n};\n");
        merge_nodes(&mut dst, src);
        let options = dst.get("options").and_then(ConfigValue::as_block).unwrap();
        assert_eq!(options.get("a"), Some(&ConfigValue::Scalar("1".to_string())));
        assert_eq!(options.get("b"), Some(&ConfigValue::Scalar("2".to_string())));
    }

    #[test]
    fn test_merge_last_write_wins_for_scalars() {
        let mut dst = parse("ttl 30;\n");
        let src = parse("ttl 60;\n");
        merge_nodes(&mut dst, src);
        assert_eq!(dst.get("ttl"), Some(&ConfigValue::Scalar("60".to_string())));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let err = ConfigParser::new()
            .parse_file(Path::new("/nonexistent/bindctl/named.conf"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
