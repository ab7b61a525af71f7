use std::fmt;
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::error::Error;

/// Language with an optional region, e.g. `de-DE` or `en`.
///
/// Parsing accepts `-` or `_` separators and ignores a four-letter script
/// subtag (`zh-Hant-TW` becomes `zh-TW`). Rendering always uses `-`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub struct Locale {
    language: String,
    country: Option<String>,
}

impl Locale {
    pub fn new(language: &str, country: Option<&str>) -> Result<Self, Error> {
        let language = language.trim();
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::invalid(format!(
                "invalid language subtag {language:?}"
            )));
        }
        let country = match country.map(str::trim) {
            None | Some("") => None,
            Some(region) if is_region(region) => Some(region.to_ascii_uppercase()),
            Some(region) => {
                return Err(Error::invalid(format!("invalid region subtag {region:?}")))
            }
        };
        Ok(Self {
            language: language.to_ascii_lowercase(),
            country,
        })
    }

    pub fn english() -> Self {
        Self {
            language: "en".to_string(),
            country: None,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn to_language_tag(&self) -> String {
        self.to_string()
    }

    /// File-name suffixes to try, most specific first: `_de_DE`, then `_de`.
    pub fn catalog_suffixes(&self) -> Vec<String> {
        let mut suffixes = Vec::with_capacity(2);
        if let Some(country) = &self.country {
            suffixes.push(format!("_{}_{}", self.language, country));
        }
        suffixes.push(format!("_{}", self.language));
        suffixes
    }
}

fn is_region(text: &str) -> bool {
    (text.len() == 2 && text.chars().all(|c| c.is_ascii_alphabetic()))
        || (text.len() == 3 && text.chars().all(|c| c.is_ascii_digit()))
}

impl Default for Locale {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{}-{}", self.language, country),
            None => f.write_str(&self.language),
        }
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let normalized = text.trim().replace('_', "-");
        let mut parts = normalized.split('-');
        let language = parts.next().unwrap_or_default();
        let region = parts.find(|part| part.len() != 4);
        Self::new(language, region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_forms() {
        let de: Locale = "de_DE".parse().unwrap();
        assert_eq!(de.language(), "de");
        assert_eq!(de.country(), Some("DE"));
        assert_eq!(de.to_language_tag(), "de-DE");

        assert_eq!("EN".parse::<Locale>().unwrap().to_string(), "en");
        assert_eq!("it-it".parse::<Locale>().unwrap().to_string(), "it-IT");
        assert_eq!("zh-Hant-TW".parse::<Locale>().unwrap().to_string(), "zh-TW");
        assert_eq!("es-419".parse::<Locale>().unwrap().to_string(), "es-419");
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<Locale>().is_err());
        assert!("english".parse::<Locale>().is_err());
        assert!("de-Germany".parse::<Locale>().is_err());
    }

    #[test]
    fn catalog_suffixes_go_from_specific_to_general() {
        let de: Locale = "de-DE".parse().unwrap();
        assert_eq!(de.catalog_suffixes(), vec!["_de_DE", "_de"]);
        assert_eq!(Locale::english().catalog_suffixes(), vec!["_en"]);
    }

    #[test]
    fn serializes_as_tag() {
        let locale: Locale = serde_json::from_str("\"fr_CA\"").unwrap();
        assert_eq!(serde_json::to_string(&locale).unwrap(), "\"fr-CA\"");
    }
}
