//! # CLI Command Implementations
//!
//! `pinfetch` has a single command, [`fetch`]. It defines its arguments as a
//! `clap` `Args` struct and an `execute` function that turns them into a
//! [`pinfetch::config::RunConfig`] and drives the library.

pub mod fetch;
