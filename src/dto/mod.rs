pub mod import_dto;
