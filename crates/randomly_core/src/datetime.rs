//! Date and time values anchored on the instance's run start.
//!
//! Nothing here reads the clock: "now" is always
//! [`Randomly::run_start_time`], so a replayed run sees the same dates.
//! Local values are computed in a fixed UTC offset (UTC unless chosen with
//! [`Randomly::date_time_in`]).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

use crate::error::{require, Error, Result};
use crate::randomly::Randomly;

pub struct DateTimeRandomly<'r> {
    randomly: &'r mut Randomly,
    offset: FixedOffset,
}

impl<'r> DateTimeRandomly<'r> {
    pub fn new(randomly: &'r mut Randomly, offset: FixedOffset) -> Self {
        Self { randomly, offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The run start itself.
    pub fn instant(&self) -> DateTime<Utc> {
        self.randomly.run_start_time()
    }

    /// Between 1 and `max_seconds_back` whole seconds before the run start.
    pub fn instant_before(&mut self, max_seconds_back: u32) -> Result<DateTime<Utc>> {
        require!(max_seconds_back >= 1, "max seconds back must be >= 1");
        let seconds = self.randomly.long_between(1, i64::from(max_seconds_back))?;
        shift(self.instant(), -seconds, TimeDelta::try_seconds)
    }

    /// `from` plus a whole number of seconds, never past `to`.
    pub fn instant_between(
        &mut self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        require!(from < to, "from ({from}) must be before to ({to})");
        let range = (to - from).num_seconds();
        let seconds = self.randomly.long_between(0, range)?;
        shift(from, seconds, TimeDelta::try_seconds)
    }

    /// Instant between `max_days_back` and `min_days_back` days before the
    /// run start.
    pub fn instant_in_past(
        &mut self,
        min_days_back: u32,
        max_days_back: u32,
    ) -> Result<DateTime<Utc>> {
        require!(
            min_days_back <= max_days_back,
            "max days back ({max_days_back}) must be >= min days back ({min_days_back})"
        );
        let anchor = self.instant();
        let from = shift(anchor, -i64::from(max_days_back), TimeDelta::try_days)?;
        let to = shift(anchor, -i64::from(min_days_back), TimeDelta::try_days)?;
        self.instant_between(from, to)
    }

    /// Instant between `min_days_ahead` and `max_days_ahead` days after the
    /// run start.
    pub fn instant_in_future(
        &mut self,
        min_days_ahead: u32,
        max_days_ahead: u32,
    ) -> Result<DateTime<Utc>> {
        require!(
            min_days_ahead <= max_days_ahead,
            "max days ahead ({max_days_ahead}) must be >= min days ahead ({min_days_ahead})"
        );
        let anchor = self.instant();
        let from = shift(anchor, i64::from(min_days_ahead), TimeDelta::try_days)?;
        let to = shift(anchor, i64::from(max_days_ahead), TimeDelta::try_days)?;
        self.instant_between(from, to)
    }

    pub fn local_date_time_in_past(
        &mut self,
        min_days_back: u32,
        max_days_back: u32,
    ) -> Result<NaiveDateTime> {
        let instant = self.instant_in_past(min_days_back, max_days_back)?;
        Ok(self.to_local(instant))
    }

    pub fn local_date_time_in_future(
        &mut self,
        min_days_ahead: u32,
        max_days_ahead: u32,
    ) -> Result<NaiveDateTime> {
        let instant = self.instant_in_future(min_days_ahead, max_days_ahead)?;
        Ok(self.to_local(instant))
    }

    /// Calendar date of the run start.
    pub fn local_date(&self) -> NaiveDate {
        self.anchor_local().date()
    }

    pub fn local_date_before(&mut self, max_days_back: u32) -> Result<NaiveDate> {
        require!(max_days_back >= 1, "max days back must be >= 1");
        let days = self.randomly.long_between(1, i64::from(max_days_back))?;
        shift(self.local_date(), -days, TimeDelta::try_days)
    }

    /// Date in `[from, to]`; `from` must be strictly earlier.
    pub fn local_date_between(&mut self, from: NaiveDate, to: NaiveDate) -> Result<NaiveDate> {
        require!(from < to, "from ({from}) must be before to ({to})");
        let range = (to - from).num_days();
        let days = self.randomly.long_between(0, range)?;
        shift(from, days, TimeDelta::try_days)
    }

    /// Wall-clock date-time of the run start.
    pub fn local_date_time(&self) -> NaiveDateTime {
        self.anchor_local()
    }

    /// Run start minus 1..=`max_days_back` days, 0..=23 hours and 0..=59
    /// minutes.
    pub fn local_date_time_before(&mut self, max_days_back: u32) -> Result<NaiveDateTime> {
        require!(max_days_back >= 1, "max days back must be >= 1");
        let days = self.randomly.long_between(1, i64::from(max_days_back))?;
        let hours = self.randomly.int_between(0, 23)?;
        let minutes = self.randomly.int_between(0, 59)?;
        let back = days * 24 * 60 + i64::from(hours) * 60 + i64::from(minutes);
        shift(self.anchor_local(), -back, TimeDelta::try_minutes)
    }

    /// Uniform time of day with whole seconds.
    pub fn local_time(&mut self) -> Result<NaiveTime> {
        let hour = self.randomly.int_between(0, 23)?;
        let minute = self.randomly.int_between(0, 59)?;
        let second = self.randomly.int_between(0, 59)?;
        NaiveTime::from_hms_opt(hour as u32, minute as u32, second as u32)
            .ok_or_else(|| Error::invalid(format!("invalid time {hour}:{minute}:{second}")))
    }

    fn anchor_local(&self) -> NaiveDateTime {
        self.to_local(self.instant())
    }

    fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset).naive_local()
    }
}

/// `value + unit(amount)` with overflow reported as an invalid argument.
fn shift<T>(value: T, amount: i64, unit: fn(i64) -> Option<TimeDelta>) -> Result<T>
where
    T: CheckedAdd + Copy + std::fmt::Display,
{
    unit(amount)
        .and_then(|delta| value.checked_add(delta))
        .ok_or_else(|| Error::invalid(format!("{value} shifted by {amount} is out of range")))
}

/// Overflow-checked addition shared by the chrono types used here.
trait CheckedAdd: Sized {
    fn checked_add(self, delta: TimeDelta) -> Option<Self>;
}

impl CheckedAdd for DateTime<Utc> {
    fn checked_add(self, delta: TimeDelta) -> Option<Self> {
        self.checked_add_signed(delta)
    }
}

impl CheckedAdd for NaiveDateTime {
    fn checked_add(self, delta: TimeDelta) -> Option<Self> {
        self.checked_add_signed(delta)
    }
}

impl CheckedAdd for NaiveDate {
    fn checked_add(self, delta: TimeDelta) -> Option<Self> {
        self.checked_add_signed(delta)
    }
}
