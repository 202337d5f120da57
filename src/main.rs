// Entrypoint for the CLI application.
// - Parses flags into a `Config`, builds the Slack client and runs the pipeline.
// - The only place that turns an error into a non-zero exit.

use log::{error, info};
use slack_gray_photo::{
    app,
    config::{mask_token, Cli, Config},
    slack::SlackClient,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match Cli::parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    info!("Flag gray: {}", cli.gray);
    info!("Flag slackToken: {}", mask_token(&cli.slack_token));
    info!("Flag photoPath: {}", cli.photo_path.display());

    if let Err(e) = try_main(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn try_main(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_cli(cli)?;
    let slack = SlackClient::from_env()?;
    app::run(&config, &slack)?;
    Ok(())
}
