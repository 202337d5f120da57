// Command-line configuration: a clap parser for the flags and the plain
// `Config` value the pipeline stages receive.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// Long flags that may also be spelled with a single dash (`-gray`).
const LONG_FLAGS: [&str; 5] = ["gray", "slackToken", "slack-token", "photoPath", "photo-path"];

#[derive(Parser, Debug)]
#[command(name = "slack-gray-photo")]
#[command(version, about = "Convert a photo to grayscale and set it as Slack profile photo", long_about = None)]
pub struct Cli {
    /// Convert the photo to grayscale before uploading
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub gray: bool,

    /// Token for Slack (App); the upload is skipped when empty
    #[arg(long = "slackToken", alias = "slack-token", value_name = "TOKEN", default_value = "")]
    pub slack_token: String,

    /// Profile photo path
    #[arg(long = "photoPath", alias = "photo-path", value_name = "FILE")]
    pub photo_path: PathBuf,
}

/// Settings for one invocation, shared by the converter and the uploader.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub gray: bool,
    pub slack_token: Option<String>,
    /// Always absolute.
    pub photo_path: PathBuf,
}

impl Cli {
    /// Parse arguments, accepting Go-style single-dash long flags.
    pub fn parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Cli::try_parse_from(normalize_args(args))
    }
}

impl Config {
    /// Turn parsed flags into a `Config`, resolving the photo path against
    /// the current directory.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let photo_path = std::path::absolute(&cli.photo_path)
            .with_context(|| format!("Failed to resolve photo path {}", cli.photo_path.display()))?;
        let slack_token = Some(cli.slack_token).filter(|t| !t.is_empty());
        Ok(Config {
            gray: cli.gray,
            slack_token,
            photo_path,
        })
    }
}

/// Hide all but the last few characters of a token for log output.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}

/// Rewrite `-flag` / `-flag=value` into `--flag` / `--flag=value` for the
/// known long flags. Everything else is passed through untouched.
fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let rewritten = arg.to_str().and_then(|s| {
                let rest = s.strip_prefix('-').filter(|r| !r.starts_with('-'))?;
                let name = rest.split('=').next().unwrap_or(rest);
                LONG_FLAGS.contains(&name).then(|| OsString::from(format!("-{}", s)))
            });
            rewritten.unwrap_or(arg)
        })
        .collect()
}
