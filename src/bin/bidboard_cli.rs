// src/bin/bidboard_cli.rs

use bidboard::app_config::AppConfig;
use bidboard::commands::cli::{execute_command, parse_cli_args};
use bidboard::initialize_environment;
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    initialize_environment();

    let args: Vec<String> = env::args().collect();
    let command = parse_cli_args(&args)?;
    let config = AppConfig::new()?;

    let mut stdout = std::io::stdout();
    execute_command(command, &config, &mut stdout).await
}
