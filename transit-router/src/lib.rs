//! Transit routing engine.
//!
//! Loads a multi-line transit network, builds a graph of the transports the
//! user has enabled and answers: "what is the fastest way from here to
//! there, and what are the alternatives?"

pub mod domain;
pub mod network;
pub mod planner;
pub mod routing;
