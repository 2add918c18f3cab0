// src/handlers/mod.rs

pub mod notes;
pub mod quiz;
pub mod result;
pub mod session;
pub mod topic;
