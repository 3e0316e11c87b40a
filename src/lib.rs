// src/lib.rs — Library root for bulkops

pub mod backend;
pub mod cli;
pub mod core;
pub mod infra;
pub mod transport;
pub mod util;
