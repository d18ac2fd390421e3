// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// CSV decoding and parsing for lead uploads

mod csv_parser;

pub use csv_parser::{CsvParser, CsvTable};
