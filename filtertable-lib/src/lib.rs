//! Filterable, paginated data tables.
//!
//! The crate is split into three layers:
//!
//! - [`form`] - a schema-driven filter form that emits the full filter value
//!   on every change
//! - [`table`] - a table widget embedding the form and a paginator, with a
//!   shared render surface
//! - [`orchestrator`] - binds a table to a [`provider::DataProvider`],
//!   turning filter and page changes into queries and discarding stale
//!   responses
//!
//! Supporting modules hold the data model ([`model`]), query composition
//! ([`query`]), event plumbing ([`events`]) and errors ([`error`]).

pub mod error;
pub mod events;
pub mod form;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod query;
pub mod table;
