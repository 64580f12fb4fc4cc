use clap::Parser;
use serde::Serialize;
use sipcalc::api::{Cli, Command, ProjectionMode, build_goal_response, build_project_response};
use sipcalc::core::EngineResult;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => {
            if let Err(e) = sipcalc::api::run_http_server(args.port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Project(args) => {
            emit(build_project_response(&args.to_input(), ProjectionMode::Level))
        }
        Command::StepUp(args) => {
            emit(build_project_response(&args.to_input(), ProjectionMode::StepUp))
        }
        Command::Goal(args) => emit(build_goal_response(&args.to_goal())),
    }
}

fn emit<T: Serialize>(result: EngineResult<T>) {
    let rendered = result
        .map_err(|e| e.to_string())
        .and_then(|body| serde_json::to_string_pretty(&body).map_err(|e| e.to_string()));
    match rendered {
        Ok(json) => println!("{json}"),
        Err(msg) => {
            eprintln!("Error: {msg}");
            std::process::exit(1);
        }
    }
}
