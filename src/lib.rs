pub mod coerce;
pub mod columns;
pub mod display;
pub mod entry;
pub mod grid;
pub mod records;
pub mod stats;
pub mod timeline;
pub mod workbook;

pub use columns::{locate_header_row, map_header_label, FieldKey};
pub use grid::{Cell, Grid};
pub use records::{build_records, parse_grid, ImportError, SheetParse, TransactionRecord};
pub use stats::{
    calculate_statistics, group_by_period, hourly_distribution, Period, PeriodGroup,
    TransactionStatistics,
};
pub use timeline::{compose_date_time, filter_by_date_range, filter_by_date_time_range};
pub use workbook::{import_workbook, preview_workbook, read_workbook_grid, ImportOutcome};
