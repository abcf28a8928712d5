pub mod csv_loader;

pub use csv_loader::{extract, extract_rows, load_csv_file, parse_line, Extraction};
