//! Scripts for deploying the Xtatuz smart contracts and recording their
//! addresses per network.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod cli;
mod commands;
pub mod constants;
pub mod errors;
pub mod orchestrator;
pub mod plan;
pub mod registry;
pub mod resolver;
pub mod types;
pub mod utils;
