pub mod announcement;
pub mod schedule;
