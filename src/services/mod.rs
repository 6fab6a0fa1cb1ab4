pub mod admin_service;
pub mod auth_service;
pub mod product_service;
pub mod supplier_service;
