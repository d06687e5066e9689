//! mixmap CLI entry point

use clap::Parser;
use mixmap::config::{AnalyzeArgs, Cli, Command, ServerSettings, Settings};
use mixmap::{pipeline, server};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match &cli.command {
        Command::Analyze(args) => run_analyze(args, cli.quiet),
        Command::Serve(args) => run_serve(ServerSettings::from_args(args)),
    }
}

fn init_logging(cli: &Cli) {
    let default_level = cli.log_level().to_string().to_lowercase();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

fn run_analyze(args: &AnalyzeArgs, quiet: bool) -> ExitCode {
    if let Err(e) = validate_inputs(args) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let settings = Settings::from_args(args, quiet);
    match pipeline::run(&settings) {
        Ok(result) => {
            if !quiet {
                println!();
                println!(
                    "Summary: {} successful, {} failed, {} skipped (of {} total)",
                    result.successful, result.failed, result.skipped, result.total_files
                );
            }
            if result.failed > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_serve(settings: ServerSettings) -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Fatal error: failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(server::serve(settings)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn validate_inputs(args: &AnalyzeArgs) -> Result<(), String> {
    if !args.input.exists() {
        return Err(format!(
            "Input path does not exist: {}\n\n  Tip: Check the path is correct and accessible.\n  Examples:\n    mixmap analyze -i ~/Music/DJ -o ./analyzed\n    mixmap analyze -i ./track.mp3 -o ./output",
            args.input.display()
        ));
    }

    // The output directory itself is created later; its parent must exist
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(format!(
                "Output parent directory does not exist: {}\n\n  Tip: The output directory will be created automatically,\n  but its parent directory must exist.\n  Example: mkdir -p {}",
                parent.display(),
                parent.display()
            ));
        }
    }

    Ok(())
}
