//! # EAD Indexer
//!
//! Indexes EAD finding aids into a Solr core. Extraction lives in
//! [`ead_indexer_core`]; this crate adds the I/O around it.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML settings and the Solr origin variable |
//! | [`solr`] | HTTP backend |
//! | [`transaction`] | delete → add* → commit with rollback |
//! | [`pipeline`] | one EAD file to one transaction |
//! | [`changeset`] | one git commit to a sequence of transactions |
//! | [`report`] | failure summary for the command line |

pub mod changeset;
pub mod config;
pub mod pipeline;
pub mod report;
pub mod solr;
pub mod transaction;
