// UI and formatting module

pub mod formatters;

// Re-export commonly used items for cleaner imports
pub use formatters::{
    format_alert, format_log, format_metric, format_summary, format_time, sparkline,
};
