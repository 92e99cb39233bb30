pub mod margin;
pub mod cost_engine;
pub mod catalog_service;
pub use catalog_service::CatalogService;
pub mod supplier_service;
pub use supplier_service::SupplierService;
pub mod pricing_service;
pub use pricing_service::PricingService;
pub mod simulation_service;
pub use simulation_service::SimulationService;
pub mod report_service;
pub use report_service::ReportService;
