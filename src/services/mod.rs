pub mod tender_api;
pub mod report_service;
