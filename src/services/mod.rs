pub mod coding_service;
pub mod extraction_service;
pub mod guideline_service;
pub mod json_extract;
pub mod pdf_service;
pub mod validation_service;

pub use coding_service::CodingService;
pub use extraction_service::ExtractionService;
pub use guideline_service::{chunk_texts, GuidelineService};
pub use pdf_service::PdfService;
pub use validation_service::ValidationService;
