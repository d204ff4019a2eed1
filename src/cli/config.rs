//! Replay file handling
//!
//! A replay file is a TOML script describing one vault and a sequence of
//! operations to run against it on a manual ledger clock:
//!
//! ```toml
//! [vault]
//! owners = ["0x...01", "0x...02"]
//! target = "0x...cc"
//! min_delay = "60s"
//!
//! [[steps]]
//! action = "queue"
//! label = "greet"
//! caller = "0x...01"
//! selector = "f(string)"
//! payload = "hello"
//! delay = "60s"
//! ```
//!
//! Transactions are referred to by the `label` given when they were queued.

use super::duration_parse::parse_duration_to_secs;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use timelock::vault::{Address, TimelockConfig, MIN_DELAY};

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default replay start time (ledger seconds)
const DEFAULT_START_TIME: u64 = 1_700_000_000;

/// Parsed replay file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Vault under test
    pub vault: VaultSection,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Operations, run in order
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Vault construction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultSection {
    /// Owner addresses (fixed for the whole replay)
    pub owners: Vec<Address>,

    /// Address of the recording target all calls go to
    pub target: Address,

    /// Minimum delay, as seconds or a humantime duration
    #[serde(default = "default_min_delay")]
    pub min_delay: String,

    /// Ledger time when the replay starts
    #[serde(default = "default_start_time")]
    pub start_time: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// One scripted operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Queue a call to the target, executable `delay` after the current time
    Queue {
        label: String,
        caller: Address,
        #[serde(default)]
        selector: String,
        #[serde(default)]
        payload: String,
        #[serde(default, deserialize_with = "deserialize_amount")]
        value: u128,
        delay: String,
    },
    /// Confirm a labelled transaction
    Confirm { caller: Address, tx: String },
    /// Cancel a confirmation
    Cancel { caller: Address, tx: String },
    /// Execute a labelled transaction; `value` overrides the queued value
    Execute {
        caller: Address,
        tx: String,
        #[serde(default, deserialize_with = "deserialize_optional_amount")]
        value: Option<u128>,
    },
    /// Move the ledger clock forward
    Advance { by: String },
}

impl Step {
    /// Short name used in reports
    pub fn action(&self) -> &'static str {
        match self {
            Step::Queue { .. } => "queue",
            Step::Confirm { .. } => "confirm",
            Step::Cancel { .. } => "cancel",
            Step::Execute { .. } => "execute",
            Step::Advance { .. } => "advance",
        }
    }
}

/// Attached value: a TOML integer, or a decimal string for amounts beyond
/// the TOML integer range.
fn deserialize_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
    struct AmountVisitor;

    impl Visitor<'_> for AmountVisitor {
        type Value = u128;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative integer or a decimal string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
            u128::try_from(v).map_err(|_| E::custom(format!("value must not be negative: {}", v)))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
            Ok(u128::from(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
            v.trim()
                .parse()
                .map_err(|e| E::custom(format!("invalid value '{}': {}", v, e)))
        }
    }

    deserializer.deserialize_any(AmountVisitor)
}

fn deserialize_optional_amount<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u128>, D::Error> {
    deserialize_amount(deserializer).map(Some)
}

fn default_min_delay() -> String {
    format!("{}s", MIN_DELAY)
}

fn default_start_time() -> u64 {
    DEFAULT_START_TIME
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ReplayConfig {
    /// Load a replay file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read replay file '{}': {}", path.display(), e))?;

        Self::parse(&contents)
            .map_err(|e| format!("Failed to parse replay file '{}': {}", path.display(), e).into())
    }

    /// Parse replay TOML
    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: ReplayConfig = toml::from_str(contents)?;
        // Surface bad durations before any step runs
        config.timelock_config()?;
        for step in &config.steps {
            match step {
                Step::Queue { delay, .. } => {
                    parse_duration_to_secs(delay)?;
                }
                Step::Advance { by } => {
                    parse_duration_to_secs(by)?;
                }
                _ => {}
            }
        }
        Ok(config)
    }

    /// Vault parameters
    pub fn timelock_config(&self) -> Result<TimelockConfig, String> {
        Ok(TimelockConfig {
            min_delay: parse_duration_to_secs(&self.vault.min_delay)?,
        })
    }

    /// Sample replay file: the two-owner greeting flow.
    pub fn generate_default_toml() -> String {
        let owner_a = Address::from_low_u8(0x0a);
        let owner_b = Address::from_low_u8(0x0b);
        let target = Address::from_low_u8(0xcc);

        format!(
            r#"# Timelock replay file
#
# Runs a scripted sequence of vault operations on a manual ledger clock.
# Every call goes to a recording target with one entry point, f(string),
# which stores its payload as a message. An empty selector sends a bare
# value transfer to the target's default receiver.

[vault]
owners = ["{owner_a}", "{owner_b}"]
target = "{target}"
min_delay = "60s"
start_time = {start}

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

[[steps]]
action = "queue"
label = "greet"
caller = "{owner_a}"
selector = "f(string)"
payload = "hello"
value = 100000000
delay = "60s"

[[steps]]
action = "confirm"
caller = "{owner_a}"
tx = "greet"

[[steps]]
action = "confirm"
caller = "{owner_b}"
tx = "greet"

[[steps]]
action = "advance"
by = "70s"

[[steps]]
action = "execute"
caller = "{owner_a}"
tx = "greet"
"#,
            start = DEFAULT_START_TIME,
        )
    }

    /// Write the sample replay file
    pub fn create_default(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create replay directory: {}", e))?;
        }

        fs::write(path, Self::generate_default_toml())
            .map_err(|e| format!("Failed to write replay file '{}': {}", path.display(), e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generated_toml_parses() {
        let config = ReplayConfig::parse(&ReplayConfig::generate_default_toml()).unwrap();

        assert_eq!(config.vault.owners.len(), 2);
        assert_eq!(config.vault.start_time, DEFAULT_START_TIME);
        assert_eq!(config.timelock_config().unwrap().min_delay, 60);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.steps.len(), 5);
        assert_eq!(
            config.steps.iter().map(Step::action).collect::<Vec<_>>(),
            vec!["queue", "confirm", "confirm", "advance", "execute"]
        );
    }

    #[test]
    fn test_create_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("replay.toml");

        ReplayConfig::create_default(&path).unwrap();
        assert!(path.exists());

        let config = ReplayConfig::load(&path).unwrap();
        assert_eq!(config.vault.target, Address::from_low_u8(0xcc));
    }

    #[test]
    fn test_defaults_applied() {
        let minimal = r#"
[vault]
owners = ["0x0000000000000000000000000000000000000001"]
target = "0x00000000000000000000000000000000000000cc"
"#;
        let config = ReplayConfig::parse(minimal).unwrap();

        assert_eq!(config.vault.min_delay, "60s");
        assert_eq!(config.vault.start_time, DEFAULT_START_TIME);
        assert_eq!(config.logging.level, "info");
        assert!(config.steps.is_empty());
    }

    #[test]
    fn test_step_fields() {
        let contents = r#"
[vault]
owners = ["0x0000000000000000000000000000000000000001"]
target = "0x00000000000000000000000000000000000000cc"

[[steps]]
action = "queue"
label = "pay"
caller = "0x0000000000000000000000000000000000000001"
value = 5
delay = "2m"

[[steps]]
action = "execute"
caller = "0x0000000000000000000000000000000000000001"
tx = "pay"
value = 6
"#;
        let config = ReplayConfig::parse(contents).unwrap();

        match &config.steps[0] {
            Step::Queue {
                label,
                selector,
                payload,
                value,
                delay,
                ..
            } => {
                assert_eq!(label, "pay");
                assert!(selector.is_empty());
                assert!(payload.is_empty());
                assert_eq!(*value, 5);
                assert_eq!(delay, "2m");
            }
            other => panic!("Expected Queue step, got {:?}", other),
        }
        assert!(matches!(
            &config.steps[1],
            Step::Execute { value: Some(6), .. }
        ));
    }

    #[test]
    fn test_values_beyond_toml_integers() {
        let contents = r#"
[vault]
owners = ["0x0000000000000000000000000000000000000001"]
target = "0x00000000000000000000000000000000000000cc"

[[steps]]
action = "queue"
label = "big"
caller = "0x0000000000000000000000000000000000000001"
value = "340282366920938463463374607431768211455"
delay = "60s"

[[steps]]
action = "execute"
caller = "0x0000000000000000000000000000000000000001"
tx = "big"
value = "18446744073709551616"
"#;
        let config = ReplayConfig::parse(contents).unwrap();

        assert!(matches!(
            &config.steps[0],
            Step::Queue { value, .. } if *value == u128::MAX
        ));
        assert!(matches!(
            &config.steps[1],
            Step::Execute { value: Some(v), .. } if *v == u128::from(u64::MAX) + 1
        ));
    }

    #[test]
    fn test_negative_or_malformed_value_rejected() {
        for value in ["-1", "\"12abc\""] {
            let contents = format!(
                r#"
[vault]
owners = ["0x0000000000000000000000000000000000000001"]
target = "0x00000000000000000000000000000000000000cc"

[[steps]]
action = "queue"
label = "pay"
caller = "0x0000000000000000000000000000000000000001"
value = {value}
delay = "60s"
"#
            );
            assert!(ReplayConfig::parse(&contents).is_err(), "{}", value);
        }
    }

    #[test]
    fn test_bad_duration_rejected() {
        let contents = r#"
[vault]
owners = ["0x0000000000000000000000000000000000000001"]
target = "0x00000000000000000000000000000000000000cc"

[[steps]]
action = "advance"
by = "whenever"
"#;
        assert!(ReplayConfig::parse(contents).is_err());
    }

    #[test]
    fn test_bad_address_rejected() {
        let contents = r#"
[vault]
owners = ["0x01"]
target = "0x00000000000000000000000000000000000000cc"
"#;
        assert!(ReplayConfig::parse(contents).is_err());
    }
}
