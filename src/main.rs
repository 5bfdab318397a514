use clap::Parser;

use style_converter::cli::{self, Args, Command, CommandError, Context};

fn load_env() {
    // Load .env file, don't override existing env vars
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

fn run(args: Args) -> Result<(), CommandError> {
    let ctx = Context::load(args.config.as_deref(), args.server)?;

    match args.command {
        Command::Styles { category } => cli::list_styles(&ctx, category),
        Command::Convert {
            file,
            style,
            output,
        } => cli::convert_file(&ctx, &file, &style, &output),
        Command::Capture {
            style,
            camera,
            no_mirror,
            output,
        } => cli::capture_and_convert(&ctx, &style, camera, no_mirror, &output),
        Command::Config { action } => {
            cli::handle_config_action(&ctx, args.config.as_deref(), action)
        }
    }
}

fn main() {
    // Load .env file before anything else
    load_env();

    let args = Args::parse();

    match run(args) {
        Ok(()) => {}
        Err(CommandError::Alerted) => std::process::exit(1),
        Err(CommandError::Failed(message)) => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
    }
}
