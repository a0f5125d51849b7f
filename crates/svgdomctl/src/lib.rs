pub mod cmd_conform;
pub mod cmd_elements;
pub mod cmd_parse;
pub mod common;
