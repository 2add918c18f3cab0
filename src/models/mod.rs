// src/models/mod.rs

pub mod answer;
pub mod note;
pub mod quiz;
pub mod result;
pub mod student;
pub mod topic;
