pub mod text_format;
