//! # class-dumper
//!
//! Reads compiled Java class files and reports every declared class, method and
//! field as one line of text.
//!
//! ## Architecture
//!
//! - **reader**: big-endian byte cursor over a class-file buffer
//! - **constant**: structural constant-pool walk with lazy modified-UTF-8 names
//! - **classfile**: declaration-level parser producing a `ClassDescriptor`
//! - **symbol**: `class:` / `method:` / `field:` line model and serializers
//! - **filter**: relative-path prefix filtering
//! - **scan**: directory and jar sources of candidate class files
//! - **dump**: the dump run, failure policy and run summary
//! - **cli** / **config**: command line and its resolution into a `DumpConfig`

pub mod classfile;
pub mod cli;
pub mod config;
pub mod constant;
pub mod dump;
pub mod error;
pub mod filter;
pub mod reader;
pub mod scan;
pub mod symbol;

#[cfg(test)]
mod testing;
