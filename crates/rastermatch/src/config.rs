//! Configuration file and override resolution.
//!
//! An optional `rastermatch.toml` supplies project defaults; CLI flags and
//! environment variables override them (CLI > env > file > built-in).
//!
//! ```toml
//! [diff]
//! threshold = 0.05
//! include_aa = false
//! aa_color = "#ffff00"
//! h_shift = 1
//! ```

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;

use crate::compare::Options;

pub const CONFIG_FILE: &str = "rastermatch.toml";

/// `[diff]` table of the config file. `None` means "use default".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiffConfig {
    pub threshold: Option<f64>,
    pub include_aa: Option<bool>,
    pub alpha: Option<f64>,
    pub aa_color: Option<String>,
    pub diff_color: Option<String>,
    pub diff_color_alt: Option<String>,
    pub diff_mask: Option<bool>,
    pub h_shift: Option<u32>,
    pub v_shift: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub diff: DiffConfig,
}

impl Config {
    /// Load the config file. An explicit path must exist; the default
    /// location is allowed to be absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p, true),
            None => (Path::new(CONFIG_FILE), false),
        };

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) if !required => return Ok(Self::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read config: {}", path.display()));
            }
        };

        toml::from_str(&text).with_context(|| format!("invalid config: {}", path.display()))
    }
}

/// Values extracted from the CLI that participate in the merge.
#[derive(Debug, Default)]
pub struct DiffOverrides {
    pub threshold: Option<f64>,
    pub include_aa: Option<bool>,
    pub alpha: Option<f64>,
    pub aa_color: Option<[u8; 3]>,
    pub diff_color: Option<[u8; 3]>,
    pub diff_color_alt: Option<[u8; 3]>,
    pub diff_mask: Option<bool>,
    pub h_shift: Option<u32>,
    pub v_shift: Option<u32>,
}

pub fn validate_threshold(v: f64) -> Result<f64, String> {
    if !(0.0..=1.0).contains(&v) {
        return Err(format!("threshold must be between 0.0 and 1.0, got {v}"));
    }
    Ok(v)
}

fn validate_alpha(v: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&v) {
        bail!("alpha must be between 0.0 and 1.0, got {v}");
    }
    Ok(v)
}

/// Parse `#rrggbb` (or `rrggbb`) into RGB channels.
pub fn parse_color(s: &str) -> Result<[u8; 3], String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected a #rrggbb color, got {s:?}"));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| format!("expected a #rrggbb color, got {s:?}"))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

fn file_color(field: &str, value: Option<&str>) -> Result<Option<[u8; 3]>> {
    value
        .map(|s| parse_color(s).map_err(|e| anyhow!("invalid {field} in config: {e}")))
        .transpose()
}

/// Resolve CLI > env > file > defaults into engine options.
pub fn resolve(cli: &DiffOverrides, file: &DiffConfig) -> Result<Options> {
    let defaults = Options::default();

    let env_threshold = std::env::var("RASTERMATCH_THRESHOLD")
        .ok()
        .map(|v| v.parse::<f64>())
        .transpose()
        .context("RASTERMATCH_THRESHOLD must be a valid float")?;

    let threshold = cli
        .threshold
        .or(env_threshold)
        .or(file.threshold)
        .unwrap_or(defaults.threshold);
    let threshold = validate_threshold(threshold).map_err(|e| anyhow!(e))?;

    let alpha = validate_alpha(cli.alpha.or(file.alpha).unwrap_or(defaults.alpha))?;

    Ok(Options {
        threshold,
        include_aa: cli
            .include_aa
            .or(file.include_aa)
            .unwrap_or(defaults.include_aa),
        alpha,
        aa_color: cli
            .aa_color
            .or(file_color("aa_color", file.aa_color.as_deref())?)
            .unwrap_or(defaults.aa_color),
        diff_color: cli
            .diff_color
            .or(file_color("diff_color", file.diff_color.as_deref())?)
            .unwrap_or(defaults.diff_color),
        diff_color_alt: cli
            .diff_color_alt
            .or(file_color("diff_color_alt", file.diff_color_alt.as_deref())?),
        diff_mask: cli.diff_mask.or(file.diff_mask).unwrap_or(defaults.diff_mask),
        h_shift: cli.h_shift.or(file.h_shift).unwrap_or(defaults.h_shift),
        v_shift: cli.v_shift.or(file.v_shift).unwrap_or(defaults.v_shift),
        ..defaults
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_with_and_without_hash() {
        assert_eq!(parse_color("#ff8000"), Ok([255, 128, 0]));
        assert_eq!(parse_color("00ff00"), Ok([0, 255, 0]));
        assert!(parse_color("#fff").is_err());
        assert!(parse_color("#gggggg").is_err());
        assert!(parse_color("").is_err());
    }

    #[test]
    fn threshold_is_range_checked() {
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(1.0).is_ok());
        assert!(validate_threshold(-0.1).is_err());
        assert!(validate_threshold(1.5).is_err());
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let options = resolve(&DiffOverrides::default(), &DiffConfig::default()).unwrap();
        assert_eq!(options, Options::default());
    }

    #[test]
    fn cli_wins_over_file() {
        let file = DiffConfig {
            threshold: Some(0.5),
            diff_color: Some("#0000ff".into()),
            h_shift: Some(4),
            ..DiffConfig::default()
        };
        let cli = DiffOverrides {
            threshold: Some(0.2),
            ..DiffOverrides::default()
        };

        let options = resolve(&cli, &file).unwrap();
        assert_eq!(options.threshold, 0.2);
        assert_eq!(options.diff_color, [0, 0, 255]);
        assert_eq!(options.h_shift, 4);
    }

    #[test]
    fn bad_file_color_is_rejected() {
        let file = DiffConfig {
            aa_color: Some("yellow".into()),
            ..DiffConfig::default()
        };
        let err = resolve(&DiffOverrides::default(), &file).unwrap_err();
        assert!(format!("{err:#}").contains("aa_color"));
    }

    #[test]
    fn config_parses_a_diff_table() {
        let config: Config = toml::from_str(
            r##"
            [diff]
            threshold = 0.05
            include_aa = true
            aa_color = "#00ffff"
            v_shift = 2
            "##,
        )
        .unwrap();
        assert_eq!(config.diff.threshold, Some(0.05));
        assert_eq!(config.diff.include_aa, Some(true));
        assert_eq!(config.diff.v_shift, Some(2));
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        assert!(toml::from_str::<Config>("[diff]\nthresold = 0.1\n").is_err());
    }
}
