//! Domain to zone-file resolution
//!
//! Projects the parsed configuration tree into a flat map from domain name
//! to the absolute path of the zone file that defines it. The map is the
//! join key for every record-level operation and doubles as the existence
//! check: a zone declaration without a usable `file` entry simply does not
//! appear.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::bind::config_parser::{ConfigError, ConfigNode, ConfigParser, ConfigValue};
use crate::bind::context::BindContext;

/// Mapping from domain name to the zone file that defines it.
pub type DomainMap = BTreeMap<String, PathBuf>;

/// Parse the context's configuration file and project it into a domain
/// map. Recomputed from disk on every call; nothing is cached.
pub fn load_domains(ctx: &BindContext) -> Result<DomainMap, ConfigError> {
    let config = ConfigParser::new().parse_file(&ctx.config_file)?;
    Ok(resolve_domains(&config, &ctx.zone_dir))
}

/// Extract every `zone "<name>" { ... file "<path>"; ... }` declaration.
/// Relative `file` values are joined onto `zone_dir`.
pub fn resolve_domains(config: &ConfigNode, zone_dir: &Path) -> DomainMap {
    let mut domains = DomainMap::new();

    for (key, value) in config {
        if !key.starts_with("zone") {
            continue;
        }
        let domain = match zone_name(key) {
            Some(domain) => domain,
            None => continue,
        };
        let block = match value.as_block() {
            Some(block) => block,
            None => continue,
        };
        let file = match block.get("file").and_then(ConfigValue::as_scalar) {
            Some(file) => file,
            None => continue,
        };
        let path = if Path::new(file).is_absolute() {
            PathBuf::from(file)
        } else {
            zone_dir.join(file)
        };
        domains.insert(domain.to_string(), path);
    }

    domains
}

/// The domain named by a `zone ...` statement key, quoted or bareword.
fn zone_name(key: &str) -> Option<&str> {
    if let Some(rest) = key.strip_prefix("zone \"") {
        return rest.split('"').next().filter(|name| !name.is_empty());
    }
    key.split_whitespace().nth(1)
}
