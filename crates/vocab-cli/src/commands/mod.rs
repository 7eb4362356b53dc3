//! Command handlers

pub mod config;
pub mod entry;
pub mod review;
pub mod status;
pub mod transfer;
