// src/core/mod.rs — Bulk-action session core

pub mod controller;
pub mod interpreter;
pub mod sink;
pub mod types;
