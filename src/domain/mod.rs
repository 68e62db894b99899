//! Checkout domain: pure types and rules, no I/O.
pub mod aggregates;
pub mod countdown;
pub mod dashboard;
pub mod events;
pub mod value_objects;
pub mod visitors;
