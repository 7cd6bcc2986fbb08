//! Date-range handling: sub-range partitioning and month proration

mod months;
mod partition;

pub use months::{days_in_month, duration_in_months, format_fi, next_day, previous_day};
pub use partition::{merge_compatible_subsidies, partition, BenefitSubRange, ModifierPeriod};
