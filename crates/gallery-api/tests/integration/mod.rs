//! Integration test modules.

pub mod artwork_tests;
pub mod common;
pub mod error_envelope_tests;
pub mod etl_tests;
pub mod exhibition_tests;
pub mod health_tests;
pub mod insurance_tests;
pub mod loan_tests;
pub mod report_tests;
pub mod restoration_tests;
pub mod staff_tests;
pub mod visitor_tests;
