//! Contact management: leads owned by an account.

mod model;
mod repository;

pub use model::{Contact, ContactFilters, ContactId, ContactUpdate, NewContact};
pub use repository::ContactRepository;
