use clap::Parser;

use readpulse::cli::Cli;
use readpulse::config::{get_config, init_config_from};
use readpulse::interfaces::cli::run_cli_command;
use readpulse::system::init_logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_from(&cli.config);

    let config = get_config();
    // guard 必须存活到进程结束，保证日志刷盘
    let log_guard = match init_logging(&config.logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("{}", e.format_colored());
            None
        }
    };

    if let Err(e) = run_cli_command(cli.command).await {
        eprintln!("{}", e.format_colored());
        drop(log_guard);
        std::process::exit(1);
    }
}
