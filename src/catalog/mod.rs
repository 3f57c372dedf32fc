//! The project children catalog.
//!
//! Leaf first: [`kind`] selects which structure kinds to read, [`fetch`] reads one
//! kind's rows grouped by project, and [`aggregate`] merges the per-kind results
//! into one [`model::ProjectChildren`] per project.

pub mod aggregate;
pub mod cli;
pub mod fetch;
pub mod kind;
pub mod load;
pub mod model;
