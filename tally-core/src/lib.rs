//! tally-core: canonical transaction model plus the pure filter, aggregation
//! and forecast engines.

pub mod aggregate;
pub mod category;
pub mod filter;
pub mod forecast;
pub mod time;
pub mod transaction;

pub use aggregate::{
    CategoryTotal, MonthlyTotal, chronological, exclude_category, newest_first, round2,
    sum_by_category, sum_by_month, sum_by_observed_category, sum_by_sub_category,
};
pub use category::{Category, CategoryAxis, DEFAULT_INCOME_LABEL, LabelPolicy, UNKNOWN_LABEL};
pub use filter::{
    Filter, PeriodAdvisory, PeriodSelection, Selector, available_months, available_years,
    current_period,
};
pub use forecast::{CategoryForecast, DEFAULT_HORIZON, Forecast, forecast, forecast_by_category};
pub use time::TimePolicy;
pub use transaction::{Transaction, TransactionPatch};
