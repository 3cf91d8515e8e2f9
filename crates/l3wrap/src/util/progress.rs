use indicatif::{ProgressBar, ProgressStyle};

/// A byte-counting bar for downloads; falls back to a spinner when the
/// length is unknown.
pub fn create_download_bar(total_bytes: Option<u64>, message: &str) -> ProgressBar {
    let pb = match total_bytes {
        Some(total) => {
            let pb = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        }
        None => create_spinner(message),
    };
    pb.set_message(message.to_string());
    pb
}

pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} {bytes}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner
}
