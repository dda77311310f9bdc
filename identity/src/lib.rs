//! Rider identity services.
//!
//! - [`authorization`]: the single predicate that grants plaintext ID access.
//! - [`audit`]: the append-only trail every identity operation writes to.
//! - [`store`]: [`IdentityStore`], which is the only component that ever
//!   handles a plaintext national ID.

pub mod access;
pub mod audit;
pub mod authorization;
pub mod error;
pub mod format;
pub mod store;

pub use access::Access;
pub use audit::AuditLog;
pub use authorization::{authorize_id_access, authorize_review};
pub use error::IdentityError;
pub use format::IdFormat;
pub use store::{ExportedId, IdentityStore};
