//! One-time setup of the L3 binaries.
//!
//! The binaries are distributed as a zip archive per platform. Setup is an
//! explicit call: nothing is downloaded unless `ensure_binaries` finds a
//! required file missing from `<data_dir>/bin`.

use crate::classifier::BIN_DIR;
use crate::error::{L3Error, Result};
use crate::util::progress::create_download_bar;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const REQUIRED_FILES: [&str; 6] = [
    "convertitoreRegCompatteNonCompatte",
    "DBcoverage",
    "fpMacroRulesClassiFiltriItem",
    "L3CFiltriItemClassifica",
    "L3CFiltriItemTrain",
    "leggiBin",
];

const URL_OSX: &str = "https://dbdmg.polito.it/wordpress/wp-content/uploads/2020/02/L3C_osx1015.zip";
const URL_LINUX: &str = "https://dbdmg.polito.it/wordpress/wp-content/uploads/2020/03/L3C_ubuntu1804.zip";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    AlreadyInstalled,
    Installed,
}

/// Archive URL for an operating system name as reported by
/// `std::env::consts::OS`.
pub fn archive_url(os: &str) -> Result<&'static str> {
    match os {
        "macos" => Ok(URL_OSX),
        "linux" => Ok(URL_LINUX),
        other => Err(L3Error::UnsupportedPlatform(other.to_string())),
    }
}

/// Required binaries absent from `<data_dir>/bin`.
pub fn missing_binaries<P: AsRef<Path>>(data_dir: P) -> Vec<&'static str> {
    let bin_dir = data_dir.as_ref().join(BIN_DIR);
    REQUIRED_FILES
        .iter()
        .copied()
        .filter(|name| !bin_dir.join(name).is_file())
        .collect()
}

/// Makes sure every required binary is present in `<data_dir>/bin`,
/// downloading the archive for the host platform if any is missing.
pub fn ensure_binaries<P: AsRef<Path>>(data_dir: P) -> Result<SetupOutcome> {
    let data_dir = data_dir.as_ref();

    let missing = missing_binaries(data_dir);
    if missing.is_empty() {
        log::info!("L3 binaries are present in {}", data_dir.join(BIN_DIR).display());
        return Ok(SetupOutcome::AlreadyInstalled);
    }

    let url = archive_url(std::env::consts::OS)?;
    log::info!("{} are missing, downloading {}", missing.join(","), url);

    std::fs::create_dir_all(data_dir).map_err(|e| {
        L3Error::Config(format!("Could not create {}: {}", data_dir.display(), e))
    })?;

    let archive = download(url, data_dir)?;
    extract_archive(&archive, data_dir)?;

    let still_missing = missing_binaries(data_dir);
    if !still_missing.is_empty() {
        return Err(L3Error::MissingDependency(format!(
            "archive {} did not provide {}",
            archive.display(),
            still_missing.join(",")
        )));
    }

    make_executable(&data_dir.join(BIN_DIR))?;
    log::info!("Download completed");

    Ok(SetupOutcome::Installed)
}

fn download(url: &str, data_dir: &Path) -> Result<PathBuf> {
    let filename = url.rsplit('/').next().unwrap_or("l3c.zip");
    let archive_path = data_dir.join(filename);

    let response = reqwest::blocking::get(url)?.error_for_status()?;
    let pb = create_download_bar(response.content_length(), "Downloading L3 binaries");

    let mut file = File::create(&archive_path)?;
    std::io::copy(&mut pb.wrap_read(response), &mut file)
        .map_err(|e| L3Error::Download(format!("Failed to write {}: {}", archive_path.display(), e)))?;
    pb.finish_and_clear();

    Ok(archive_path)
}

/// Extracts `archive` into `data_dir`.
pub fn extract_archive(archive: &Path, data_dir: &Path) -> Result<()> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)?;
    log::debug!("Extracting {} entries from {}", zip.len(), archive.display());
    zip.extract(data_dir)?;
    Ok(())
}

/// Gives the owner read, write and execute permission on the binaries.
#[cfg(unix)]
fn make_executable(bin_dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    for name in REQUIRED_FILES {
        std::fs::set_permissions(bin_dir.join(name), std::fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_bin_dir: &Path) -> Result<()> {
    Ok(())
}
