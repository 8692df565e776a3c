pub mod dvsa;

pub use dvsa::{DvsaParser, Parser, extract_title};
