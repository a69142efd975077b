pub mod announcer;
pub mod text_source;
