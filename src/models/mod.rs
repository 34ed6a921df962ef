pub mod candidate;
pub mod import_report;
pub mod question;
