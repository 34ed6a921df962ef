pub mod csv_decoder;
pub mod import_service;
pub mod json_normalizer;
pub mod question_service;
pub mod question_validator;
pub mod quiz_service;
