pub mod pdf_loader;

pub use pdf_loader::discover_documents;
