//! Company management: organizations tracked by an account.

mod model;
mod repository;

pub use model::{Company, CompanyId, CompanyUpdate, NewCompany};
pub use repository::CompanyRepository;
