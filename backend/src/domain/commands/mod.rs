//! Command, query, and result types exchanged between frontends and the
//! domain services. Services validate commands; the types themselves
//! carry no behavior beyond convenience constructors.

pub mod categories;
pub mod completions;
pub mod habits;
pub mod lists;
pub mod overview;
