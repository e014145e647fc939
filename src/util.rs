//! Shared utility modules used across apprec components.

pub mod matrix;
pub mod similarity;
