//! Generator instances and the context they are built from.
//!
//! A [`SeedContext`] is created once by the application (or test harness)
//! and passed by reference to every construction call. It owns the only
//! shared mutable state: the lazily computed auto root seed and the counter
//! that keeps anonymous substreams apart.
//!
//! A scoped [`Randomly`] depends only on `(effective root seed, scope)`. It
//! does not matter which thread builds it, or how many other instances were
//! built before it.

use std::ops::{Deref, DerefMut};
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, FixedOffset, Offset, SecondsFormat, Utc};
use tracing::debug;

use crate::catalog::Catalog;
use crate::config::{ResolvedSettings, Settings};
use crate::datetime::DateTimeRandomly;
use crate::derive::{seed_for_scope, seed_for_substream, seed_from_entropy};
use crate::error::Result;
use crate::finance::FinanceRandomly;
use crate::id::IdRandomly;
use crate::locale::Locale;
use crate::maybe::{Maybe, MaybeContext, MaybeText};
use crate::replay::ReplayLog;
use crate::rng::Stream;
use crate::text::TextRandomly;

/// Shared construction context; see the module docs.
#[derive(Debug)]
pub struct SeedContext {
    external: Settings,
    run_anchor: DateTime<Utc>,
    auto_root_seed: OnceLock<u64>,
    substreams: AtomicU64,
    initial_caller: OnceLock<String>,
    replay: Option<ReplayLog>,
    catalog: Arc<Catalog>,
}

impl SeedContext {
    /// Context with the given external settings layer (properties over
    /// environment, already merged).
    pub fn new(external: Settings) -> Self {
        Self {
            external,
            run_anchor: Utc::now(),
            auto_root_seed: OnceLock::new(),
            substreams: AtomicU64::new(0),
            initial_caller: OnceLock::new(),
            replay: None,
            catalog: Arc::new(Catalog::bundled()),
        }
    }

    /// Context whose external layer is read from `RANDOMLY_*` variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Settings::from_env()?))
    }

    /// Record one replay line per constructed instance.
    pub fn with_replay_log(mut self, log: ReplayLog) -> Self {
        self.replay = Some(log);
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    pub fn external(&self) -> &Settings {
        &self.external
    }

    /// Default run start: the moment this context was created.
    pub fn run_anchor(&self) -> DateTime<Utc> {
        self.run_anchor
    }

    /// Root seed used when nobody supplied one. Computed from the clock on
    /// first use, then fixed for the lifetime of the context.
    pub fn auto_root_seed(&self) -> u64 {
        *self.auto_root_seed.get_or_init(|| {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_nanos() as u64)
                .unwrap_or_default();
            seed_from_entropy(nanos)
        })
    }

    /// Explicit seed, else the external seed, else the auto seed.
    pub fn effective_root_seed(&self, explicit: Option<u64>) -> u64 {
        explicit
            .or(self.external.seed)
            .unwrap_or_else(|| self.auto_root_seed())
    }

    /// Fresh unlabelled instance on its own substream.
    #[track_caller]
    pub fn randomly(&self) -> Result<Randomly> {
        self.builder().build()
    }

    /// Reproducible instance for `scope`.
    #[track_caller]
    pub fn scoped(&self, scope: &str) -> Result<Randomly> {
        self.builder().with_scope(scope).build()
    }

    #[track_caller]
    pub fn builder(&self) -> RandomlyBuilder<'_> {
        let caller = Location::caller();
        self.initial_caller.get_or_init(|| caller.to_string());
        RandomlyBuilder {
            context: self,
            scope: None,
            overrides: Settings::default(),
        }
    }

    fn next_substream(&self) -> u64 {
        self.substreams.fetch_add(1, Ordering::Relaxed)
    }

    fn initial_caller(&self) -> &str {
        self.initial_caller
            .get()
            .map(String::as_str)
            .unwrap_or("unknown")
    }
}

/// Builder for a [`Randomly`]; explicit values win over the context's
/// external settings.
#[derive(Debug)]
#[must_use]
pub struct RandomlyBuilder<'c> {
    context: &'c SeedContext,
    scope: Option<String>,
    overrides: Settings,
}

impl<'c> RandomlyBuilder<'c> {
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.overrides.seed = Some(seed);
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.overrides.locale = Some(locale);
        self
    }

    pub fn with_run_start_time(mut self, run_start_time: DateTime<Utc>) -> Self {
        self.overrides.run_start_time = Some(run_start_time);
        self
    }

    pub fn with_maybe_rate(mut self, maybe_rate: f64) -> Self {
        self.overrides.maybe_rate = Some(maybe_rate);
        self
    }

    pub fn build(self) -> Result<Randomly> {
        let context = self.context;
        let settings = self
            .overrides
            .resolve(&context.external, context.run_anchor)?;
        let root_seed = context.effective_root_seed(settings.root_seed);

        let (instance_seed, scope_label) = match &self.scope {
            Some(scope) => (
                seed_for_scope(root_seed, scope)?,
                format!("scoped(\"{scope}\")"),
            ),
            None => {
                let idx = context.next_substream();
                (
                    seed_for_substream(root_seed, &format!("randomly#{idx}"))?,
                    format!("randomly()#{idx}"),
                )
            }
        };

        let randomly = Randomly {
            stream: Stream::from_seed(instance_seed),
            settings,
            root_seed,
            scope_label,
            catalog: Arc::clone(&context.catalog),
        };

        debug!(
            scope = %randomly.scope_label,
            instance_seed,
            run_start = %randomly.settings.run_start_time,
            locale = %randomly.settings.locale,
            "created generator instance"
        );
        if let Some(log) = &context.replay {
            log.write_entry(
                &randomly.scope_label,
                &randomly.replay_info(),
                context.initial_caller(),
            );
        }
        Ok(randomly)
    }
}

/// One generator instance: resolved settings plus its own [`Stream`].
///
/// Derefs to [`Stream`], so every sampling primitive is available directly:
/// `r.int_between(0, 10)?`, `r.unique_indices(3, 10)?`, ...
#[derive(Debug)]
pub struct Randomly {
    stream: Stream,
    settings: ResolvedSettings,
    root_seed: u64,
    scope_label: String,
    catalog: Arc<Catalog>,
}

impl Randomly {
    pub fn instance_seed(&self) -> u64 {
        self.stream.seed()
    }

    /// `scoped("...")` or `randomly()#N`.
    pub fn scope_label(&self) -> &str {
        &self.scope_label
    }

    /// Root seed this instance was derived from (explicit, external or auto).
    pub fn root_seed(&self) -> u64 {
        self.root_seed
    }

    pub fn settings(&self) -> &ResolvedSettings {
        &self.settings
    }

    pub fn locale(&self) -> &Locale {
        &self.settings.locale
    }

    pub fn run_start_time(&self) -> DateTime<Utc> {
        self.settings.run_start_time
    }

    pub fn maybe_rate(&self) -> f64 {
        self.settings.maybe_rate
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Copy-paste friendly settings that reproduce this run.
    pub fn replay_info(&self) -> String {
        format!(
            "seed={} runStartTime={} locale={} maybeRate={}",
            self.root_seed,
            self.settings
                .run_start_time
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            self.settings.locale,
            self.settings.maybe_rate
        )
    }

    /// Maybe context using the configured maybe-rate.
    pub fn maybe(&mut self) -> MaybeContext<'_> {
        MaybeContext::with_checked_rate(&mut self.stream, self.settings.maybe_rate)
    }

    /// Maybe context with an explicit absent probability.
    pub fn maybe_with(&mut self, absent_probability: f64) -> Result<MaybeContext<'_>> {
        MaybeContext::new(&mut self.stream, absent_probability)
    }

    /// Shorthand for `self.maybe().of(value)`.
    pub fn maybe_of<'a, T: 'a>(&mut self, value: T) -> Maybe<'a, T> {
        self.maybe().of(value)
    }

    /// Shorthand for `self.maybe().text_of(value)`.
    pub fn maybe_text<'a>(&mut self, value: impl Into<String>) -> MaybeText<'a> {
        self.maybe().text_of(value)
    }

    /// Spend one presence draw, then run `supplier` on this instance only
    /// when present. An absent value costs exactly that draw.
    ///
    /// ```
    /// # use randomly_core::{SeedContext, Settings};
    /// let ctx = SeedContext::new(Settings { seed: Some(7), ..Settings::default() });
    /// let mut r = ctx.scoped("docs#maybe_value").unwrap();
    /// let code = r.maybe_value(|r| r.int_between(100, 999).unwrap());
    /// assert!(code.into_option().map_or(true, |c| (100..=999).contains(&c)));
    /// ```
    pub fn maybe_value<'a, T: 'a>(
        &mut self,
        supplier: impl FnOnce(&mut Self) -> T,
    ) -> Maybe<'a, T> {
        let present = self.maybe().draw_presence();
        Maybe::of_option(present.then(|| supplier(self)))
    }

    /// Like [`Randomly::maybe_value`] for fallible suppliers.
    pub fn try_maybe_value<'a, T: 'a>(
        &mut self,
        supplier: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Maybe<'a, T>> {
        let value = if self.maybe().draw_presence() {
            Some(supplier(self)?)
        } else {
            None
        };
        Ok(Maybe::of_option(value))
    }

    /// Text drawn from this instance when present, e.g.
    /// `r.try_maybe_text(|r| r.text().prefixed_alpha_numeric("REF-", 8))?.or_empty()`.
    pub fn try_maybe_text<'a>(
        &mut self,
        supplier: impl FnOnce(&mut Self) -> Result<String>,
    ) -> Result<MaybeText<'a>> {
        let value = self.try_maybe_value(supplier)?.into_option();
        Ok(MaybeText::new(value.is_some(), move || value))
    }

    pub fn text(&mut self) -> TextRandomly<'_> {
        TextRandomly::new(self)
    }

    pub fn id(&mut self) -> IdRandomly<'_> {
        IdRandomly::new(self)
    }

    /// Date-time helpers in UTC.
    pub fn date_time(&mut self) -> DateTimeRandomly<'_> {
        self.date_time_in(Utc.fix())
    }

    pub fn date_time_in(&mut self, offset: FixedOffset) -> DateTimeRandomly<'_> {
        DateTimeRandomly::new(self, offset)
    }

    pub fn finance(&mut self) -> FinanceRandomly<'_> {
        FinanceRandomly::new(self)
    }
}

impl Deref for Randomly {
    type Target = Stream;

    fn deref(&self) -> &Stream {
        &self.stream
    }
}

impl DerefMut for Randomly {
    fn deref_mut(&mut self) -> &mut Stream {
        &mut self.stream
    }
}
