//! Period resolution and aggregate arithmetic for sales reports.
//!
//! Everything here is pure; the database only hands back raw sums and
//! counts. Days are store calendar days: a period `[inicio, fim]` covers
//! `inicio 00:00` inclusive up to `fim + 1 day 00:00` exclusive in the store
//! offset, so a sale at midnight belongs to exactly one day.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use time::{macros::format_description, Date, Duration, OffsetDateTime, Time, UtcOffset};

use super::dto::{DailyTotal, Estatisticas};
use super::repo_types::DailyRow;
use crate::error::AppError;

/// Widest window any report may cover.
pub const MAX_DAYS: i64 = 366;
pub const DEFAULT_DAYS: i64 = 30;

/// Rounds half-up to cents and always keeps two decimal places.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Inclusive range of store calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub inicio: Date,
    pub fim: Date,
}

fn parse_day(field: &str, raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::validation(format!("{field} must be a date in YYYY-MM-DD format")))
}

impl Period {
    /// Builds a period from optional query bounds. With no bounds the period
    /// is `today`; a single bound makes a one-day period.
    pub fn resolve(inicio: Option<&str>, fim: Option<&str>, today: Date) -> Result<Self, AppError> {
        let inicio = inicio.filter(|s| !s.trim().is_empty());
        let fim = fim.filter(|s| !s.trim().is_empty());
        let (inicio, fim) = match (inicio, fim) {
            (None, None) => (today, today),
            (Some(i), None) => {
                let d = parse_day("inicio", i)?;
                (d, d)
            }
            (None, Some(f)) => {
                let d = parse_day("fim", f)?;
                (d, d)
            }
            (Some(i), Some(f)) => (parse_day("inicio", i)?, parse_day("fim", f)?),
        };
        Self::new(inicio, fim)
    }

    /// The `dias` days ending today, inclusive.
    pub fn trailing(dias: i64, today: Date) -> Result<Self, AppError> {
        if !(1..=MAX_DAYS).contains(&dias) {
            return Err(AppError::validation(format!(
                "dias must be between 1 and {MAX_DAYS}"
            )));
        }
        let inicio = today
            .checked_sub(Duration::days(dias - 1))
            .ok_or_else(|| AppError::validation("window starts before the supported calendar"))?;
        Self::new(inicio, today)
    }

    pub fn new(inicio: Date, fim: Date) -> Result<Self, AppError> {
        if fim < inicio {
            return Err(AppError::validation("fim must not be before inicio"));
        }
        let period = Self { inicio, fim };
        if period.days() > MAX_DAYS {
            return Err(AppError::validation(format!(
                "period cannot exceed {MAX_DAYS} days"
            )));
        }
        Ok(period)
    }

    /// Number of calendar days covered.
    pub fn days(&self) -> i64 {
        (self.fim - self.inicio).whole_days() + 1
    }

    /// `[start, end)` instants in the store offset.
    pub fn bounds(&self, offset: UtcOffset) -> Result<(OffsetDateTime, OffsetDateTime), AppError> {
        let end_day = self
            .fim
            .next_day()
            .ok_or_else(|| AppError::validation("fim is out of range"))?;
        let start = self.inicio.with_time(Time::MIDNIGHT).assume_offset(offset);
        let end = end_day.with_time(Time::MIDNIGHT).assume_offset(offset);
        Ok((start, end))
    }

    pub fn iter_days(&self) -> impl Iterator<Item = Date> {
        let fim = self.fim;
        std::iter::successors(Some(self.inicio), move |d| {
            d.next_day().filter(|next| *next <= fim)
        })
    }
}

/// Totals for a period, with the average ticket derived from them.
pub fn summarize(period: Period, total: Decimal, count: i64) -> Estatisticas {
    let ticket_medio = if count > 0 {
        total / Decimal::from(count)
    } else {
        Decimal::ZERO
    };
    Estatisticas {
        inicio: period.inicio,
        fim: period.fim,
        total_dia: round_money(total),
        count,
        ticket_medio: round_money(ticket_medio),
    }
}

/// One entry per day of `period`, zero-filled where `rows` has no data.
pub fn fill_days(period: Period, rows: &[DailyRow]) -> Vec<DailyTotal> {
    let by_day: HashMap<Date, &DailyRow> = rows.iter().map(|r| (r.dia, r)).collect();
    period
        .iter_days()
        .map(|dia| match by_day.get(&dia) {
            Some(row) => DailyTotal {
                data: dia,
                total: round_money(row.total),
                count: row.count,
            },
            None => DailyTotal {
                data: dia,
                total: round_money(Decimal::ZERO),
                count: 0,
            },
        })
        .collect()
}
