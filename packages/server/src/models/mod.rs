pub mod pdf;
pub mod validation;
