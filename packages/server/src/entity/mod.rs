pub mod blob;
pub mod letter_pdf;
pub mod reference_pdf;
pub mod validation;
