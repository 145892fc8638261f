use clap::Parser;

use kookbc::application::launch::{Launcher, LoadingContext, DEFAULT_TWEAKER};
use kookbc::infrastructure::launch::builtin_catalog;
use kookbc::HostError;

#[derive(Parser, Debug)]
#[command(name = "kookbc")]
#[command(about = "Bot client host with a tweaker bootstrap chain", long_about = None)]
struct Cli {
    /// Tweak class(es) to load
    #[arg(long = "tweakClass", visible_alias = "tweak-class", value_name = "NAME", default_value = DEFAULT_TWEAKER)]
    tweak_class: Vec<String>,

    /// Arguments handed to every tweaker
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Unable to launch: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), HostError> {
    let mut launcher = Launcher::new(LoadingContext::new(builtin_catalog()));
    let report = launcher.launch(cli.tweak_class, &cli.args)?;
    tracing::debug!("Bootstrap finished with {} tweakers", report.tweakers.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_tweak_class() {
        let cli = Cli::try_parse_from(["kookbc"]).unwrap();
        assert_eq!(cli.tweak_class, vec![DEFAULT_TWEAKER]);
        assert!(cli.args.is_empty());
    }

    #[test]
    fn test_repeated_tweak_class_and_free_arguments() {
        let cli = Cli::try_parse_from([
            "kookbc",
            "--tweakClass",
            "a.First",
            "--tweak-class",
            "b.Second",
            "--config",
            "bot.yml",
        ])
        .unwrap();

        assert_eq!(cli.tweak_class, vec!["a.First", "b.Second"]);
        assert_eq!(cli.args, vec!["--config", "bot.yml"]);
    }

    #[test]
    fn test_unknown_tweak_class_fails_run() {
        let cli = Cli::try_parse_from(["kookbc", "--tweakClass", "nope.Missing"]).unwrap();
        assert!(matches!(run(cli), Err(HostError::Launch(_))));
    }
}
