//! Rule engine: categories, rule selection and name templates.

pub mod classifier;
pub mod matcher;
pub mod template;

pub use matcher::match_rule;
