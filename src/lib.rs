pub mod aggregator;
pub mod api;
pub mod config;
pub mod counter;
pub mod fetcher;
pub mod humanize;
pub mod observability;
pub mod registry;
