// Pipeline: optional grayscale conversion followed by an optional upload.

use crate::config::Config;
use crate::convert::convert_photo;
use crate::slack::PhotoUploader;
use anyhow::Result;
use log::info;
use std::path::PathBuf;

/// Run both stages for `config` and return the path of the profile photo
/// (the converted file when `gray` is set, the source otherwise).
///
/// Stops at the first error. Without a token no upload is attempted.
pub fn run(config: &Config, uploader: &dyn PhotoUploader) -> Result<PathBuf> {
    let mut target = config.photo_path.clone();
    if config.gray {
        target = convert_photo(&target)?;
    }
    info!("Profile photo path is: {}", target.display());

    match &config.slack_token {
        Some(token) => uploader.upload(token, &target)?,
        None => info!("No Slack token given, skipping upload"),
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::cell::RefCell;
    use std::path::Path;
    use tempfile::tempdir;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(String, PathBuf)>>,
    }

    impl PhotoUploader for Recorder {
        fn upload(&self, token: &str, path: &Path) -> Result<()> {
            self.calls.borrow_mut().push((token.to_string(), path.to_path_buf()));
            Ok(())
        }
    }

    struct Failing;

    impl PhotoUploader for Failing {
        fn upload(&self, _token: &str, _path: &Path) -> Result<()> {
            anyhow::bail!("connection refused")
        }
    }

    fn photo(dir: &Path) -> PathBuf {
        let path = dir.join("me.png");
        RgbImage::new(3, 2).save(&path).unwrap();
        path
    }

    #[test]
    fn no_token_no_upload() {
        let dir = tempdir().unwrap();
        let config = Config { gray: true, slack_token: None, photo_path: photo(dir.path()) };
        let recorder = Recorder::default();

        let target = run(&config, &recorder).unwrap();

        assert!(recorder.calls.borrow().is_empty());
        assert_eq!(target, dir.path().join("me_gray.png"));
        assert!(target.exists());
    }

    #[test]
    fn without_gray_uploads_source_path() {
        let dir = tempdir().unwrap();
        let source = photo(dir.path());
        let config = Config {
            gray: false,
            slack_token: Some("xoxp-1".into()),
            photo_path: source.clone(),
        };
        let recorder = Recorder::default();

        let target = run(&config, &recorder).unwrap();

        assert_eq!(target, source);
        assert_eq!(*recorder.calls.borrow(), vec![("xoxp-1".to_string(), source)]);
        assert!(!dir.path().join("me_gray.png").exists());
    }

    #[test]
    fn with_gray_uploads_converted_path() {
        let dir = tempdir().unwrap();
        let config = Config {
            gray: true,
            slack_token: Some("xoxp-1".into()),
            photo_path: photo(dir.path()),
        };
        let recorder = Recorder::default();

        run(&config, &recorder).unwrap();

        let calls = recorder.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, dir.path().join("me_gray.png"));
    }

    #[test]
    fn conversion_error_stops_before_upload() {
        let dir = tempdir().unwrap();
        let config = Config {
            gray: true,
            slack_token: Some("xoxp-1".into()),
            photo_path: dir.path().join("missing.jpg"),
        };
        let recorder = Recorder::default();

        assert!(run(&config, &recorder).is_err());
        assert!(recorder.calls.borrow().is_empty());
    }

    #[test]
    fn upload_error_is_returned() {
        let dir = tempdir().unwrap();
        let config = Config {
            gray: false,
            slack_token: Some("xoxp-1".into()),
            photo_path: photo(dir.path()),
        };
        let err = run(&config, &Failing).unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
