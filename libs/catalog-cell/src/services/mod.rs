pub mod availability;
pub mod catalog;

pub use availability::compute_availability;
pub use catalog::CatalogService;
