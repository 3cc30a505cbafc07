#[path = "mailvalid-cli/args.rs"]
mod args;
#[path = "mailvalid-cli/output.rs"]
mod output;

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use anyhow::{Context, Result};
use mailvalid_lib::{DisposableRegistry, ValidationPipeline, disposable};
use tracing_subscriber::EnvFilter;

use args::Cli;

fn init_tracing(verbose: bool) {
    let default = if verbose { "mailvalid_lib=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn install_registry(cli: &Cli) -> Result<()> {
    let Some(path) = cli.disposable_list.as_ref() else {
        return Ok(());
    };
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let registry = DisposableRegistry::builtin()
        .extend_from_reader(BufReader::new(file))
        .with_context(|| format!("read {}", path.display()))?;
    tracing::debug!(domains = registry.len(), "disposable list loaded");
    disposable::install(registry).context("install disposable list")?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    install_registry(&cli)?;

    let emails: Vec<String> = if cli.stdin {
        let mut emails = Vec::new();
        for line in io::stdin().lock().lines() {
            let line = line.context("read stdin")?;
            let email = line.trim();
            if !email.is_empty() {
                emails.push(email.to_string());
            }
        }
        emails
    } else if let Some(email) = cli.email.clone() {
        vec![email]
    } else {
        Cli::clap_command().print_help()?;
        println!();
        return Ok(());
    };

    let pipeline = ValidationPipeline::new(cli.to_config()).context("invalid configuration")?;
    let reports = pipeline.validate_all(&emails);
    output::write_reports(&reports, &cli.format, pipeline.config())?;

    // codes de sortie : 0 valide, 1 invalide ou erreur
    if output::any_invalid(&reports) {
        std::process::exit(1);
    }
    Ok(())
}
