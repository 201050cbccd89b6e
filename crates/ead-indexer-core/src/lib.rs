//! # EAD Indexer Core
//!
//! Pure logic for turning EAD finding aids into Solr documents: XML and
//! XPath helpers, inline-markup conversion, collection and component
//! extraction, update-message serialization, and the index backend trait.
//!
//! This crate contains no runtime, network, filesystem, or process I/O.

pub mod collection;
pub mod component;
pub mod container;
pub mod document;
pub mod error;
pub mod fields;
pub mod html;
pub mod index;
pub mod language;
pub mod text;
pub mod xml;
