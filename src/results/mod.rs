mod normalize;
mod result_set;
mod row;

pub use normalize::{normalize_column_name, unique_column_names};
pub use result_set::{QueryOutput, Record, ResultSet};
pub use row::CustomDbRow;
