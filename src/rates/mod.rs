//! Exchange rate source
//!
//! Fetches the latest rate listing from the remote SOAP service and extracts
//! the rate for a single currency code.

pub mod client;
pub mod parser;

pub use client::{FetchError, RateClient};
pub use parser::parse_rate;
