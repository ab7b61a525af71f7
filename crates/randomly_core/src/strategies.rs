//! `proptest` strategies for the crate's value types.
//!
//! Enabled for this crate's tests and, downstream, with the
//! `proptest-support` feature.

use proptest::prelude::*;

use crate::config::Settings;
use crate::locale::Locale;

/// Locales in the accepted grammar, with and without a region.
pub fn locale() -> impl Strategy<Value = Locale> {
    ("[a-z]{2,3}", proptest::option::of("[A-Z]{2}|[0-9]{3}")).prop_map(|(language, country)| {
        Locale::new(&language, country.as_deref())
            .unwrap_or_else(|err| panic!("strategy produced invalid locale: {err}"))
    })
}

/// Non-blank scope labels, including separators and non-ASCII text.
pub fn scope() -> impl Strategy<Value = String> {
    "[A-Za-z0-9äöü#._ -]{0,24}[A-Za-z0-9äöü#]"
}

/// Partially specified settings with valid values in every present field.
pub fn settings() -> impl Strategy<Value = Settings> {
    (
        proptest::option::of(any::<u64>()),
        proptest::option::of(locale()),
        proptest::option::of(0.0f64..=1.0),
    )
        .prop_map(|(seed, locale, maybe_rate)| Settings {
            seed,
            locale,
            maybe_rate,
            run_start_time: None,
        })
}
