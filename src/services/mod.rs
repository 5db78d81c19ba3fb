pub mod attempt_service;
pub mod catalog_service;
pub mod progress;
