//! Loading of draw configuration, fortune tables and name lists.

pub mod load;

pub use load::*;
