//! Random strings and catalog-backed words.
//!
//! Fixed alphabets draw one [`Stream::index`](crate::rng::Stream::index) per
//! character, after at most one length draw. Word and sentence helpers pick
//! from the locale's catalog and fail with
//! [`Error::NotFound`](crate::error::Error::NotFound) when the locale has none.

use crate::error::{require, Error, Result};
use crate::locale::Locale;
use crate::randomly::Randomly;

const ALPHA_LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const ALPHA_UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALPHA: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const NUMERIC: &str = "0123456789";
const ALPHA_NUMERIC: &str =
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const HEX: &str = "0123456789abcdef";

const SENTENCES: &str = "text/udhr";
const PARAGRAPH_SENTENCES: usize = 6;

pub struct TextRandomly<'r> {
    randomly: &'r mut Randomly,
}

impl<'r> TextRandomly<'r> {
    pub fn new(randomly: &'r mut Randomly) -> Self {
        Self { randomly }
    }

    pub fn alpha(&mut self, length: usize) -> Result<String> {
        self.from_alphabet(ALPHA, length, length)
    }

    pub fn alpha_between(&mut self, min_length: usize, max_length: usize) -> Result<String> {
        self.from_alphabet(ALPHA, min_length, max_length)
    }

    pub fn alpha_lower(&mut self, length: usize) -> Result<String> {
        self.from_alphabet(ALPHA_LOWER, length, length)
    }

    pub fn alpha_lower_between(&mut self, min_length: usize, max_length: usize) -> Result<String> {
        self.from_alphabet(ALPHA_LOWER, min_length, max_length)
    }

    pub fn alpha_upper(&mut self, length: usize) -> Result<String> {
        self.from_alphabet(ALPHA_UPPER, length, length)
    }

    pub fn alpha_upper_between(&mut self, min_length: usize, max_length: usize) -> Result<String> {
        self.from_alphabet(ALPHA_UPPER, min_length, max_length)
    }

    pub fn alpha_numeric(&mut self, length: usize) -> Result<String> {
        self.from_alphabet(ALPHA_NUMERIC, length, length)
    }

    pub fn alpha_numeric_between(&mut self, min_length: usize, max_length: usize) -> Result<String> {
        self.from_alphabet(ALPHA_NUMERIC, min_length, max_length)
    }

    /// Decimal digits; leading zeros allowed.
    pub fn numeric(&mut self, length: usize) -> Result<String> {
        self.from_alphabet(NUMERIC, length, length)
    }

    pub fn numeric_between(&mut self, min_length: usize, max_length: usize) -> Result<String> {
        self.from_alphabet(NUMERIC, min_length, max_length)
    }

    /// Lower-case hex digits.
    pub fn hex(&mut self, length: usize) -> Result<String> {
        self.from_alphabet(HEX, length, length)
    }

    pub fn prefixed_alpha_numeric(&mut self, prefix: &str, length: usize) -> Result<String> {
        self.prefixed_alpha_numeric_between(prefix, length, length)
    }

    /// `prefix` followed by alphanumerics so the total length (in chars) lies
    /// in `[min_total, max_total]`.
    pub fn prefixed_alpha_numeric_between(
        &mut self,
        prefix: &str,
        min_total: usize,
        max_total: usize,
    ) -> Result<String> {
        require!(
            min_total <= max_total,
            "invalid length range [{min_total}, {max_total}]"
        );
        let prefix_len = prefix.chars().count();
        require!(
            prefix_len <= max_total,
            "prefix {prefix:?} is longer than max total length {max_total}"
        );
        let suffix = self.from_alphabet(
            ALPHA_NUMERIC,
            min_total.saturating_sub(prefix_len),
            max_total - prefix_len,
        )?;
        Ok(format!("{prefix}{suffix}"))
    }

    /// String of `min_length..=max_length` characters taken from `alphabet`.
    pub fn from_alphabet(
        &mut self,
        alphabet: &str,
        min_length: usize,
        max_length: usize,
    ) -> Result<String> {
        require!(
            min_length <= max_length,
            "invalid length range [{min_length}, {max_length}]"
        );
        let symbols: Vec<char> = alphabet.chars().collect();
        require!(!symbols.is_empty(), "alphabet must not be empty");

        let length = if min_length == max_length {
            min_length
        } else {
            let low = i32::try_from(min_length)
                .map_err(|_| Error::invalid(format!("length {min_length} is too large")))?;
            let high = i32::try_from(max_length)
                .map_err(|_| Error::invalid(format!("length {max_length} is too large")))?;
            self.randomly.int_between(low, high)? as usize
        };
        (0..length)
            .map(|_| self.randomly.element_of(&symbols).copied())
            .collect()
    }

    /// One sentence in the instance locale.
    pub fn sentence(&mut self) -> Result<String> {
        let locale = self.randomly.locale().clone();
        self.sentence_in(&locale)
    }

    pub fn sentence_in(&mut self, locale: &Locale) -> Result<String> {
        self.word(SENTENCES, locale)
    }

    /// Up to six distinct sentences joined by single spaces.
    pub fn paragraph(&mut self) -> Result<String> {
        let locale = self.randomly.locale().clone();
        self.paragraph_in(&locale)
    }

    pub fn paragraph_in(&mut self, locale: &Locale) -> Result<String> {
        let sentences = self.randomly.catalog().load(SENTENCES, locale)?;
        let count = PARAGRAPH_SENTENCES.min(sentences.len());
        let picked = self.randomly.unique_indices(count, sentences.len())?;
        Ok(picked
            .into_iter()
            .map(|idx| sentences[idx].as_str())
            .collect::<Vec<_>>()
            .join(" "))
    }

    pub fn noun(&mut self) -> Result<String> {
        let locale = self.randomly.locale().clone();
        self.noun_in(&locale)
    }

    pub fn noun_in(&mut self, locale: &Locale) -> Result<String> {
        self.word("text/nouns/nouns", locale)
    }

    pub fn verb(&mut self) -> Result<String> {
        let locale = self.randomly.locale().clone();
        self.verb_in(&locale)
    }

    pub fn verb_in(&mut self, locale: &Locale) -> Result<String> {
        self.word("text/verbs/verbs", locale)
    }

    pub fn adjective(&mut self) -> Result<String> {
        let locale = self.randomly.locale().clone();
        self.adjective_in(&locale)
    }

    pub fn adjective_in(&mut self, locale: &Locale) -> Result<String> {
        self.word("text/adjectives/adjectives", locale)
    }

    /// Capitalised adjective followed by a capitalised noun, e.g.
    /// `SilentRiver`.
    pub fn compound_name(&mut self) -> Result<String> {
        let locale = self.randomly.locale().clone();
        self.compound_name_in(&locale)
    }

    pub fn compound_name_in(&mut self, locale: &Locale) -> Result<String> {
        let adjective = self.adjective_in(locale)?;
        let noun = self.noun_in(locale)?;
        Ok(format!("{}{}", capitalize(&adjective), capitalize(&noun)))
    }

    /// Lower-case `adjective-noun`, e.g. `silent-river`.
    pub fn slug(&mut self) -> Result<String> {
        let locale = self.randomly.locale().clone();
        self.slug_in(&locale)
    }

    pub fn slug_in(&mut self, locale: &Locale) -> Result<String> {
        let adjective = self.adjective_in(locale)?;
        let noun = self.noun_in(locale)?;
        Ok(format!("{}-{}", adjective.to_lowercase(), noun.to_lowercase()))
    }

    fn word(&mut self, base: &str, locale: &Locale) -> Result<String> {
        let words = self.randomly.catalog().load(base, locale)?;
        self.randomly.element_of(&words).cloned()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
