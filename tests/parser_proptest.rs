//! Property-based tests for the configuration and zone parsers

use std::path::Path;

use proptest::prelude::*;

use bindctl::bind::config_parser::{ConfigNode, ConfigParser, ConfigValue};
use bindctl::bind::zone_parser::parse_ttl;

// Strategy for configuration statement keys
fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,11}").unwrap()
}

// Strategy for scalar values without grammar metacharacters and without
// leading/trailing whitespace
fn value_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9./-]([a-zA-Z0-9./ -]{0,16}[a-zA-Z0-9./-])?").unwrap()
}

fn parse(content: &str) -> ConfigNode {
    ConfigParser::new().parse_str(content, Path::new("."))
}

proptest! {
    #[test]
    fn test_ttl_unit_multipliers(value in 0u32..7000) {
        prop_assert_eq!(parse_ttl(&value.to_string()).unwrap(), value);
        prop_assert_eq!(parse_ttl(&format!("{}S", value)).unwrap(), value);
        prop_assert_eq!(parse_ttl(&format!("{}M", value)).unwrap(), value * 60);
        prop_assert_eq!(parse_ttl(&format!("{}H", value)).unwrap(), value * 3600);
        prop_assert_eq!(parse_ttl(&format!("{}D", value)).unwrap(), value * 86400);
        prop_assert_eq!(parse_ttl(&format!("{}W", value)).unwrap(), value * 604800);
    }

    #[test]
    fn test_ttl_rejects_unknown_units(value in 0u32..100_000, unit in "[A-Z]") {
        prop_assume!(!"SMHDW".contains(&unit));
        let input = format!("{}{}", value, unit);
        prop_assert!(parse_ttl(&input).is_err());
    }

    #[test]
    fn test_key_value_round_trip(key in key_strategy(), value in value_strategy()) {
        prop_assume!(key != "include");
        let text = format!("{} \"{}\";\n", key, value);
        let node = parse(&text);
        prop_assert_eq!(node.get(&key), Some(&ConfigValue::Scalar(value.clone())));

        // re-serialize and parse again: same scalar
        let scalar = match node.get(&key) {
            Some(ConfigValue::Scalar(s)) => s.clone(),
            other => panic!("expected scalar, got {:?}", other),
        };
        let again = parse(&format!("{} \"{}\";\n", key, scalar));
        prop_assert_eq!(again.get(&key), node.get(&key));
    }

    #[test]
    fn test_inline_block_cardinality(
        key in key_strategy(),
        tokens in prop::collection::vec("[a-z0-9.]{1,8}", 1..5)
    ) {
        prop_assume!(key != "include");
        let text = format!("{} {{ {}; }};\n", key, tokens.join("; "));
        let node = parse(&text);
        match node.get(&key) {
            Some(ConfigValue::Scalar(s)) => {
                prop_assert_eq!(tokens.len(), 1);
                prop_assert_eq!(s, &tokens[0]);
            }
            Some(ConfigValue::List(list)) => {
                prop_assert!(tokens.len() > 1);
                prop_assert_eq!(list, &tokens);
            }
            other => panic!("unexpected value: {:?}", other),
        }
    }

    #[test]
    fn test_nesting_depth_matches_block_depth(keys in prop::collection::vec(key_strategy(), 1..6)) {
        prop_assume!(keys.iter().all(|key| key != "include"));
        let mut text = String::new();
        for key in &keys {
            text.push_str(key);
            text.push_str(" {\n");
        }
        text.push_str("leaf \"value\";\n");
        for _ in &keys {
            text.push_str("};\n");
        }

        let node = parse(&text);
        let mut current = &node;
        for key in &keys {
            match current.get(key) {
                Some(ConfigValue::Block(inner)) => current = inner,
                other => panic!("expected block at {}, got {:?}", key, other),
            }
        }
        prop_assert_eq!(current.get("leaf"), Some(&ConfigValue::Scalar("value".to_string())));
    }
}
