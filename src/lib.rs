//! currimap: rebuild captured curriculum trees and flatten them into
//! spreadsheet exports.
//!
//! The core pipeline is a single synchronous pass:
//! [`store::NodeStore`] -> [`builder::TreeBuilder`] -> [`extract::extract`]
//! -> [`flatten::flatten`] -> [`emit::emit`]. Everything operates on
//! in-memory data; only capture discovery and the emitters touch the
//! filesystem.

pub mod arena;
pub mod builder;
pub mod capture;
pub mod cli;
pub mod config;
pub mod display;
pub mod emit;
pub mod errors;
pub mod extract;
pub mod flatten;
pub mod record;
pub mod select;
pub mod store;
pub mod survey;
pub mod util;
