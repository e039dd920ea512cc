pub mod request;
pub mod station;
pub mod statistics;
