use std::fs;

use forge_core::{Download, DownloadKind};
use forge_engine::{ensure_output_dir, DownloadWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("downloads");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn saves_downloads_under_fixed_names() {
    let temp = TempDir::new().unwrap();
    let writer = DownloadWriter::new(temp.path().join("out"));

    let script = writer
        .save(&Download::new(DownloadKind::Script, "print('x')\n"))
        .unwrap();
    let csv = writer
        .save(&Download::new(DownloadKind::Csv, b"Title,URL,Image URL,Price\r\n".to_vec()))
        .unwrap();

    assert_eq!(script.file_name().unwrap(), "scraper_script.py");
    assert_eq!(csv.file_name().unwrap(), "scraped_data.csv");
    assert_eq!(fs::read_to_string(&script).unwrap(), "print('x')\n");
    assert_eq!(fs::read(&csv).unwrap(), b"Title,URL,Image URL,Price\r\n");
}

#[test]
fn later_download_replaces_earlier_one() {
    let temp = TempDir::new().unwrap();
    let writer = DownloadWriter::new(temp.path());

    let first = writer
        .save(&Download::new(DownloadKind::Script, "v1"))
        .unwrap();
    let second = writer
        .save(&Download::new(DownloadKind::Script, "v2"))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "v2");
    let entries = fs::read_dir(temp.path()).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn output_path_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = DownloadWriter::new(file_path.clone());
    let result = writer.save(&Download::new(DownloadKind::Csv, "data"));
    assert!(result.is_err());
    assert!(!file_path.with_file_name("scraped_data.csv").exists());
}
