use clap::Parser;

mod cli;
mod commands;
mod domain;
mod services;

use cli::{Cli, Commands};
use domain::models::{CheckError, ErrorBody, JsonErr};

fn run(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Headers(args) => commands::handle_headers(cli, args),
        Commands::Sizes(args) => commands::handle_sizes(cli, args),
    }
}

fn error_code(err: &anyhow::Error) -> String {
    err.downcast_ref::<CheckError>()
        .map(|e| e.code().to_string())
        .unwrap_or_else(|| "INTERNAL".to_string())
}

fn main() {
    let cli = Cli::parse();
    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            if cli.json {
                let envelope = JsonErr {
                    ok: false,
                    error: ErrorBody {
                        code: error_code(&e),
                        message: format!("{e:#}"),
                    },
                };
                match serde_json::to_string_pretty(&envelope) {
                    Ok(body) => println!("{body}"),
                    Err(_) => println!("{{\"ok\": false}}"),
                }
            } else {
                eprintln!("error: {e:#}");
            }
            1
        }
    };
    std::process::exit(code);
}
