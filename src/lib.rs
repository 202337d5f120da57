// Library root
// -----------
// The binary (`main.rs`) wires these modules together:
// - `config`: flag parsing and the `Config` passed to every stage.
// - `convert`: grayscale conversion and PNG output.
// - `slack`: multipart upload to Slack's `users.setPhoto`.
// - `app`: runs conversion then upload for one `Config`.
pub mod app;
pub mod config;
pub mod convert;
pub mod slack;
