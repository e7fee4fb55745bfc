pub mod loan;
pub mod schedule;
pub mod summary;
