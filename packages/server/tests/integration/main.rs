mod files;
mod letters;
mod pdfs;
mod validate;
