pub mod entities;
pub mod catalog;
pub mod compositions;
pub mod pricing;
pub mod reports;
