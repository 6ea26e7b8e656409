//! Route definitions

pub mod api;
