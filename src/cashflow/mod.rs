//! Monthly cashflow for a year: aggregation, presentation, the chart and the dashboard page.

mod aggregation;
mod chart;
mod page;
mod presentation;

pub use aggregation::MONTHS;
pub use page::get_dashboard_page;
pub use presentation::month_label;
