use dotenv::dotenv;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

use resto_collegues::config::{ClientOptions, RestoConfig};
use resto_collegues::error::Error;
use resto_collegues::submission::ImageFile;

#[tokio::test]
async fn image_file_reads_bytes_and_guesses_type() {
    let mut file = tempfile::Builder::new()
        .prefix("terrasse")
        .suffix(".png")
        .tempfile()
        .unwrap();
    file.write_all(b"\x89PNG fake").unwrap();

    let image = ImageFile::from_path(file.path()).await.unwrap();
    assert_eq!(image.bytes, b"\x89PNG fake".to_vec());
    assert_eq!(image.content_type, "image/png");
    assert!(image.file_name.starts_with("terrasse"));
    assert!(image.file_name.ends_with(".png"));
}

#[tokio::test]
async fn missing_image_file_is_an_io_error() {
    let file = NamedTempFile::new().unwrap();
    let path = file.path().to_path_buf();
    drop(file);

    let result = ImageFile::from_path(&path).await;
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn config_from_env_or_explicit_values() {
    dotenv().ok();

    let config = RestoConfig::from_env().unwrap_or_else(|_| {
        RestoConfig::new("https://example.supabase.co/", "mock_anon_key".to_string()).unwrap()
    });
    assert!(!config.anon_key.is_empty());
    assert!(!config.base_url().ends_with('/'));
}

#[test]
fn options_can_point_elsewhere() {
    let options = ClientOptions::default()
        .with_restaurants_table("restos")
        .with_votes_table("votes")
        .with_image_bucket("photos")
        .with_request_timeout(Some(Duration::from_secs(5)));
    let config = RestoConfig::new("http://localhost:54321", "key".to_string())
        .unwrap()
        .with_options(options);

    assert_eq!(config.options.restaurants_table, "restos");
    assert_eq!(config.options.image_bucket, "photos");
    assert_eq!(config.base_url(), "http://localhost:54321");
}

#[test]
fn invalid_config_is_rejected() {
    assert!(matches!(
        RestoConfig::new("not a url", "key".to_string()),
        Err(Error::Url(_))
    ));
    assert!(matches!(
        RestoConfig::new("https://example.supabase.co", String::new()),
        Err(Error::Config(_))
    ));
}
