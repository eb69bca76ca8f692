//! Administrative regions module.
//!
//! Owns the tehsil entity (an administrative sub-region of a district):
//! CRUD, id/name lookups for dropdowns, an association check used before
//! deletion, and server-side paginated grid queries over the tehsil table.
//!
//! The module follows the usual split: `domain` holds models, repository
//! traits and the service; `infra` holds the SeaORM entities, the repository
//! implementations and the schema migrations.

pub mod domain;
pub mod infra;

pub use domain::error::DomainError;
pub use domain::model::{Tehsil, TehsilRef, TehsilWrite};
pub use domain::service::TehsilService;
