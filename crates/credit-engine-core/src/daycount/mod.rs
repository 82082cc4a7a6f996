//! Day-count conventions, coupon schedules and accrued interest.

pub mod conventions;
pub mod schedule;

pub use conventions::{day_count, year_fraction, DayCountConvention};
pub use schedule::{
    accrual_fraction, accrued_interest, accrued_interest_with, add_months, coupon_period,
    generate_cash_flows, CashFlow, CashFlowKind, CouponBearing,
};
