pub mod cost;
pub mod record;
pub mod report;
