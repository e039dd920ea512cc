pub mod aggregator;
pub mod hourly_parser;
