use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CreditEngineError;
use crate::types::Years;
use crate::CreditEngineResult;

/// Day count convention for computing accrued interest and period fractions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayCountConvention {
    /// 30/360 US corporate convention
    #[default]
    Thirty360,
    /// ACT/360 money market convention
    Actual360,
    /// ACT/365 fixed
    Actual365,
    /// ACT/ACT ISDA
    ActualActual,
}

impl DayCountConvention {
    /// Nominal days per year, used for per-period accrual bases.
    pub fn basis(self) -> Decimal {
        match self {
            DayCountConvention::Thirty360 | DayCountConvention::Actual360 => dec!(360),
            DayCountConvention::Actual365 | DayCountConvention::ActualActual => dec!(365),
        }
    }
}

/// Year fraction between two dates.
///
/// Act/Act splits the span at each calendar year boundary and divides each
/// piece by that year's length (366 in leap years).
pub fn year_fraction(
    start: NaiveDate,
    end: NaiveDate,
    convention: DayCountConvention,
) -> CreditEngineResult<Years> {
    if end <= start {
        return Err(CreditEngineError::InvalidDateRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    let fraction = match convention {
        DayCountConvention::Thirty360 => Decimal::from(thirty_360_days(start, end)) / dec!(360),
        DayCountConvention::Actual360 => Decimal::from((end - start).num_days()) / dec!(360),
        DayCountConvention::Actual365 => Decimal::from((end - start).num_days()) / dec!(365),
        DayCountConvention::ActualActual => actual_actual_isda(start, end),
    };
    Ok(fraction)
}

/// Day count numerator under `convention` (may be zero or negative).
pub fn day_count(start: NaiveDate, end: NaiveDate, convention: DayCountConvention) -> i64 {
    match convention {
        DayCountConvention::Thirty360 => thirty_360_days(start, end),
        _ => (end - start).num_days(),
    }
}

/// 30/360 US day count (raw days, not fraction).
pub(crate) fn thirty_360_days(start: NaiveDate, end: NaiveDate) -> i64 {
    let mut d1 = start.day() as i64;
    let mut d2 = end.day() as i64;
    if d1 == 31 {
        d1 = 30;
    }
    if d2 == 31 && d1 >= 30 {
        d2 = 30;
    }
    let months = (end.year() - start.year()) as i64 * 12 + end.month() as i64 - start.month() as i64;
    months * 30 + (d2 - d1)
}

fn actual_actual_isda(start: NaiveDate, end: NaiveDate) -> Years {
    let mut total = Decimal::ZERO;
    let mut cursor = start;
    while cursor < end {
        let year = cursor.year();
        let next_year = NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap_or(end);
        let segment_end = next_year.min(end);
        let days_in_year = if is_leap_year(year) { dec!(366) } else { dec!(365) };
        total += Decimal::from((segment_end - cursor).num_days()) / days_in_year;
        cursor = segment_end;
    }
    total
}

pub(crate) fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
