//! Error types

mod form;
mod paging;
mod provider;
mod schema;

pub use form::*;
pub use paging::*;
pub use provider::*;
pub use schema::*;
