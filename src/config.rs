//! Run settings, resolved from flags, then environment, then `bf-tape.toml`,
//! then built-in defaults.
//!
//! The config file lives in the XDG config home (`~/.config/bf-tape.toml` on
//! Linux and macOS) unless a path is given explicitly:
//!
//! ```toml
//! [engine]
//! capacity = 30000
//! brackets = "naive"      # or "nested"
//! unmatched = "continue"  # or "reject"
//! max_steps = 1000000
//! timeout_ms = 2000
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cross_xdg::BaseDirs;

use crate::interpreter::{BracketMode, EngineOptions, UnmatchedPolicy};

pub const CONFIG_FILE_NAME: &str = "bf-tape.toml";
pub const DEFAULT_TIMEOUT_MS: u64 = 2_000;

pub const ENV_CAPACITY: &str = "BF_TAPE_CAPACITY";
pub const ENV_MAX_STEPS: &str = "BF_TAPE_MAX_STEPS";
pub const ENV_TIMEOUT_MS: &str = "BF_TAPE_TIMEOUT_MS";

/// Values read from the `[engine]` section. Anything absent stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub capacity: Option<usize>,
    pub brackets: Option<BracketMode>,
    pub unmatched: Option<UnmatchedPolicy>,
    pub max_steps: Option<usize>,
    pub timeout_ms: Option<u64>,
}

/// Command-line values; these win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub capacity: Option<usize>,
    pub nested: bool,
    pub strict: bool,
    pub max_steps: Option<usize>,
    pub timeout_ms: Option<u64>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub options: EngineOptions,
    pub max_steps: Option<usize>,
    pub timeout_ms: u64,
}

/// Location of the config file in the XDG config home, if it can be determined.
pub fn default_path() -> Option<PathBuf> {
    let base_dirs = BaseDirs::new().ok()?;

    let mut path = PathBuf::from(base_dirs.config_home());
    path.push(CONFIG_FILE_NAME);
    Some(path)
}

/// Load the config file at the default location. A missing file is not an error.
pub fn load_default() -> FileConfig {
    let Some(path) = default_path() else {
        return FileConfig::default();
    };
    match fs::read_to_string(&path) {
        Ok(content) => {
            log::debug!("loaded config from {}", path.display());
            parse(&content)
        }
        Err(_) => FileConfig::default(),
    }
}

/// Load an explicitly requested config file.
pub fn load_from_path(path: &Path) -> io::Result<FileConfig> {
    let content = fs::read_to_string(path)?;
    log::debug!("loaded config from {}", path.display());
    Ok(parse(&content))
}

/// Parse the `[engine]` section of a config file.
///
/// Lines are `key = value`; values may be quoted. Other sections, comments,
/// unknown keys and unparsable values are skipped.
pub fn parse(content: &str) -> FileConfig {
    let mut in_engine = false;
    let mut map: HashMap<String, String> = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        if line.starts_with('[') && line.ends_with(']') {
            in_engine = line[1..line.len() - 1].trim() == "engine";
            continue;
        }
        if !in_engine { continue; }
        if let Some((key, val_raw)) = line.split_once('=') {
            // Drop a trailing comment, then optional quotes
            let val_raw = val_raw.split(" #").next().unwrap_or_default().trim();
            let val = val_raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(val_raw);
            map.insert(key.trim().to_string(), val.to_string());
        }
    }

    let mut cfg = FileConfig::default();

    macro_rules! set {
        ($field:ident, $key:literal, $parse:expr) => {
            if let Some(raw) = map.remove($key) {
                match $parse(raw.as_str()) {
                    Some(v) => cfg.$field = Some(v),
                    None => log::warn!("ignoring config value {}={:?}", $key, raw),
                }
            }
        };
    }

    set!(capacity, "capacity", |s: &str| s.replace('_', "").parse::<usize>().ok());
    set!(brackets, "brackets", parse_bracket_mode);
    set!(unmatched, "unmatched", parse_unmatched_policy);
    set!(max_steps, "max_steps", |s: &str| s.replace('_', "").parse::<usize>().ok());
    set!(timeout_ms, "timeout_ms", |s: &str| s.replace('_', "").parse::<u64>().ok());

    for key in map.keys() {
        log::warn!("ignoring unknown config key {key:?}");
    }

    cfg
}

fn parse_bracket_mode(s: &str) -> Option<BracketMode> {
    match s.to_ascii_lowercase().as_str() {
        "naive" => Some(BracketMode::Naive),
        "nested" => Some(BracketMode::Nested),
        _ => None,
    }
}

fn parse_unmatched_policy(s: &str) -> Option<UnmatchedPolicy> {
    match s.to_ascii_lowercase().as_str() {
        "continue" => Some(UnmatchedPolicy::Continue),
        "reject" => Some(UnmatchedPolicy::Reject),
        _ => None,
    }
}

/// Resolve flags -> env -> file -> defaults. `env` looks up a variable by name.
pub fn resolve<E>(flags: &Overrides, file: &FileConfig, env: E) -> RunSettings
where
    E: Fn(&str) -> Option<String>,
{
    let env_num = |name: &str| env(name).and_then(|s| s.trim().parse::<u64>().ok());
    let defaults = EngineOptions::default();

    let capacity = flags
        .capacity
        .or_else(|| env_num(ENV_CAPACITY).map(|n| n as usize))
        .or(file.capacity)
        .unwrap_or(defaults.capacity);

    let brackets = if flags.nested {
        BracketMode::Nested
    } else {
        file.brackets.unwrap_or(defaults.brackets)
    };

    let unmatched = if flags.strict {
        UnmatchedPolicy::Reject
    } else {
        file.unmatched.unwrap_or(defaults.unmatched)
    };

    let max_steps = flags
        .max_steps
        .or_else(|| env_num(ENV_MAX_STEPS).map(|n| n as usize))
        .or(file.max_steps);

    let timeout_ms = flags
        .timeout_ms
        .or_else(|| env_num(ENV_TIMEOUT_MS))
        .or(file.timeout_ms)
        .unwrap_or(DEFAULT_TIMEOUT_MS);

    RunSettings {
        options: EngineOptions { capacity, brackets, unmatched },
        max_steps,
        timeout_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn parses_engine_section() {
        let cfg = parse(
            r#"
# engine defaults
[engine]
capacity = 64
brackets = "nested"
unmatched = reject   # inline comment
max_steps = 1_000
timeout_ms = "500"
"#,
        );
        assert_eq!(
            cfg,
            FileConfig {
                capacity: Some(64),
                brackets: Some(BracketMode::Nested),
                unmatched: Some(UnmatchedPolicy::Reject),
                max_steps: Some(1_000),
                timeout_ms: Some(500),
            }
        );
    }

    #[test]
    fn ignores_other_sections_and_bad_values() {
        let cfg = parse("[colors]\ncapacity = 9\n[engine]\nbrackets = sideways\ncolour = red\n");
        assert_eq!(cfg, FileConfig::default());
    }

    #[test]
    fn defaults_without_any_source() {
        let s = resolve(&Overrides::default(), &FileConfig::default(), no_env);
        assert_eq!(s.options, EngineOptions::default());
        assert_eq!(s.max_steps, None);
        assert_eq!(s.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn flags_beat_env_beat_file() {
        let file = FileConfig { capacity: Some(10), max_steps: Some(5), timeout_ms: Some(7), ..FileConfig::default() };
        let env = |name: &str| match name {
            ENV_CAPACITY => Some("20".to_string()),
            ENV_MAX_STEPS => Some("not a number".to_string()),
            _ => None,
        };
        let flags = Overrides { timeout_ms: Some(99), ..Overrides::default() };
        let s = resolve(&flags, &file, env);
        assert_eq!(s.options.capacity, 20);
        assert_eq!(s.max_steps, Some(5));
        assert_eq!(s.timeout_ms, 99);

        let flags = Overrides { capacity: Some(30), ..Overrides::default() };
        assert_eq!(resolve(&flags, &file, env).options.capacity, 30);
    }

    #[test]
    fn mode_flags_override_file() {
        let file = FileConfig {
            brackets: Some(BracketMode::Naive),
            unmatched: Some(UnmatchedPolicy::Continue),
            ..FileConfig::default()
        };
        let flags = Overrides { nested: true, strict: true, ..Overrides::default() };
        let s = resolve(&flags, &file, no_env);
        assert_eq!(s.options.brackets, BracketMode::Nested);
        assert_eq!(s.options.unmatched, UnmatchedPolicy::Reject);
    }

    #[test]
    fn loads_explicit_file() {
        let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
        write!(tf, "[engine]\ncapacity = 3\n").unwrap();
        let cfg = load_from_path(tf.path()).unwrap();
        assert_eq!(cfg.capacity, Some(3));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.toml")).is_err());
    }
}
