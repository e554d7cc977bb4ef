pub mod parser;

pub use parser::{LinePosition, parse_filepath_with_position};
