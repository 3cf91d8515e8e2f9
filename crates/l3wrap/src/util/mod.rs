pub mod progress;

pub use progress::{create_download_bar, create_spinner};
