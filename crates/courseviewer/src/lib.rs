//! Course catalog model for the Advisor Assistant course viewer.
//!
//! Flat section records from the course service are grouped into a
//! [`catalog::Catalog`], narrowed with [`catalog::FilterCriteria`], and picked
//! into a [`selection::SelectionSet`]. [`session::Session`] ties them together
//! with the term load state machine.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod selection;
pub mod session;

pub use catalog::{build_catalog, filter_catalog, Catalog, Category, Course, FilterCriteria, Term};
pub use client::CatalogClient;
pub use config::ViewerConfig;
pub use error::CatalogError;
pub use selection::SelectionSet;
pub use session::{CatalogState, Completion, Session, TermRequest};
