pub mod ops;
pub mod parser;

pub use ops::OperatorTable;
pub use parser::Parser;
