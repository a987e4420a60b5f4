//! Port traits at the boundaries of the domain.

pub mod chart_port;
pub mod config_port;
pub mod data_port;
pub mod store_port;
