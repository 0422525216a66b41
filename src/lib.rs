//! Briefing - daily portfolio briefing for equity mandates
//!
//! This library turns a position warehouse snapshot and a market data
//! workbook into the tables of the daily briefing: regional and sector
//! positioning, allocation against a blended benchmark, currency hedge,
//! futures drawdowns, risk screens and third-party fund overviews.

pub mod analytics;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod dispatcher;
pub mod error;
pub mod importers;
pub mod reports;
pub mod utils;
