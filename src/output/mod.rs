// Output module
pub mod table;

pub use table::{AlertRow, OutputFormat, ServiceRow, ThresholdRow};
