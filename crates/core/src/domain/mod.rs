pub mod business;
pub mod place;
pub mod report;
pub mod week;
