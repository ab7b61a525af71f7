//! Layered settings resolution.
//!
//! Every field is resolved independently with [`resolve`]: an explicit
//! (builder) value wins over an external one, which wins over the default.
//! External values come from a properties map or a JSON settings document,
//! falling back to `RANDOMLY_*` environment variables.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::error::{require, Error, Result};
use crate::locale::Locale;

pub const PROP_SEED: &str = "randomly.seed";
pub const PROP_LOCALE: &str = "randomly.locale";
pub const PROP_MAYBE_RATE: &str = "randomly.maybeRate";
pub const PROP_RUN_START_TIME: &str = "randomly.runStartTime";

pub const ENV_SEED: &str = "RANDOMLY_SEED";
pub const ENV_LOCALE: &str = "RANDOMLY_LOCALE";
pub const ENV_MAYBE_RATE: &str = "RANDOMLY_MAYBE_RATE";
pub const ENV_RUN_START_TIME: &str = "RANDOMLY_RUN_START_TIME";

/// Probability that a [`crate::maybe::Maybe`] comes out absent by default.
pub const DEFAULT_MAYBE_RATE: f64 = 0.125;

struct Keys {
    seed: &'static str,
    locale: &'static str,
    maybe_rate: &'static str,
    run_start_time: &'static str,
}

const PROPERTY_KEYS: Keys = Keys {
    seed: PROP_SEED,
    locale: PROP_LOCALE,
    maybe_rate: PROP_MAYBE_RATE,
    run_start_time: PROP_RUN_START_TIME,
};

const ENV_KEYS: Keys = Keys {
    seed: ENV_SEED,
    locale: ENV_LOCALE,
    maybe_rate: ENV_MAYBE_RATE,
    run_start_time: ENV_RUN_START_TIME,
};

/// Partially specified settings. `None` means "not set at this layer".
///
/// As a JSON document the seed is written as a string, since JSON numbers
/// above 2^53 do not survive most parsers:
///
/// ```json
/// { "seed": "18446744073709551615", "locale": "de-DE", "maybeRate": 0.25,
///   "runStartTime": "2026-01-01T00:00:00Z" }
/// ```
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Settings {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<Locale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maybe_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_start_time: Option<DateTime<Utc>>,
}

/// Fully resolved settings for one generator instance. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedSettings {
    /// Externally or explicitly supplied root seed; `None` means the
    /// context's auto seed is in effect.
    pub root_seed: Option<u64>,
    pub locale: Locale,
    pub maybe_rate: f64,
    pub run_start_time: DateTime<Utc>,
}

/// Pick the first present value in precedence order.
pub fn resolve<T>(explicit: Option<T>, external: Option<T>, default: T) -> T {
    explicit.or(external).unwrap_or(default)
}

impl Settings {
    /// Load a JSON settings document from disk.
    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open settings file {:?}", path))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Deserialize a JSON settings document from an arbitrary reader.
    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let settings: Self = serde_json::from_reader(reader).context("invalid settings json")?;
        if let Some(rate) = settings.maybe_rate {
            check_maybe_rate(rate)?;
        }
        Ok(settings)
    }

    /// Read `randomly.*` keys from a properties map.
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self> {
        Self::from_lookup(&PROPERTY_KEYS, |key| properties.get(key).cloned())
    }

    /// Read `RANDOMLY_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read `RANDOMLY_*` variables through `lookup`, which stands in for the
    /// process environment.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Self::from_lookup(&ENV_KEYS, lookup)
    }

    fn from_lookup(keys: &Keys, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let seed = read(keys.seed)
            .map(|text| parse_seed(&text, keys.seed))
            .transpose()?;
        let locale = read(keys.locale)
            .map(|text| text.parse::<Locale>())
            .transpose()?;
        let maybe_rate = read(keys.maybe_rate)
            .map(|text| {
                text.parse::<f64>()
                    .map_err(|_| Error::invalid(format!("invalid {}: {text:?}", keys.maybe_rate)))
            })
            .transpose()?;
        if let Some(rate) = maybe_rate {
            check_maybe_rate(rate)?;
        }
        let run_start_time = read(keys.run_start_time)
            .map(|text| parse_instant(&text, keys.run_start_time))
            .transpose()?;

        Ok(Self {
            seed,
            locale,
            maybe_rate,
            run_start_time,
        })
    }

    /// Fill every unset field of `self` from `fallback`.
    pub fn or(self, fallback: Settings) -> Settings {
        Settings {
            seed: self.seed.or(fallback.seed),
            locale: self.locale.or(fallback.locale),
            maybe_rate: self.maybe_rate.or(fallback.maybe_rate),
            run_start_time: self.run_start_time.or(fallback.run_start_time),
        }
    }

    /// Resolve `self` (explicit values) over `external`, then defaults.
    pub fn resolve(
        self,
        external: &Settings,
        default_run_start: DateTime<Utc>,
    ) -> Result<ResolvedSettings> {
        let maybe_rate = resolve(self.maybe_rate, external.maybe_rate, DEFAULT_MAYBE_RATE);
        check_maybe_rate(maybe_rate)?;
        Ok(ResolvedSettings {
            root_seed: self.seed.or(external.seed),
            locale: resolve(self.locale, external.locale.clone(), Locale::default()),
            maybe_rate,
            run_start_time: resolve(
                self.run_start_time,
                external.run_start_time,
                default_run_start,
            ),
        })
    }
}

fn check_maybe_rate(rate: f64) -> Result<()> {
    require!(
        (0.0..=1.0).contains(&rate),
        "maybeRate must be in range [0.0, 1.0] but was {rate}"
    );
    Ok(())
}

/// Parse a root seed. Negative values are accepted and reinterpreted as their
/// two's-complement bits, so signed 64-bit seeds from other tools round-trip.
pub fn parse_seed(text: &str, source: &str) -> Result<u64> {
    let text = text.trim();
    text.parse::<u64>()
        .or_else(|_| text.parse::<i64>().map(|signed| signed as u64))
        .map_err(|_| Error::invalid(format!("invalid seed in {source}: {text:?}")))
}

/// Parse an RFC 3339 instant (`Z` or `+HH:MM` offset) into UTC.
pub fn parse_instant(text: &str, source: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| {
            Error::invalid(format!(
                "invalid runStartTime in {source}: expected RFC 3339 instant but was {text:?} ({err})"
            ))
        })
}
