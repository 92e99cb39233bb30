pub mod catalog;
pub mod composition;
pub mod pricing;
pub mod state;
