pub mod completion_service;
pub mod embedding_service;
