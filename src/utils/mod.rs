pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{download_file_name, is_fetchable_url, tail_segment};
