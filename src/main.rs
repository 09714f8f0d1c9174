//! mmconf CLI - Read and edit Mattermost server configuration by dotted path.

use clap::Parser;
use mmconf::cli::{Cli, Commands, ConfigCommands};
use mmconf::commands::{self, Output};
use mmconf::config::{
    ConfigOverrides, OutputFormat, ResolvedConfig, read_config, resolve_config, resolve_secrets,
};
use mmconf::docs::{DocsIndex, FileDocs, RemoteDocs};
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive when `-v` is not given.
const LOG_ENV: &str = "MMCONF_LOG";

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut human = cli.human_readable;
    let result = if matches!(
        cli.command,
        Commands::Config {
            command: ConfigCommands::Path
        }
    ) {
        // Locating config.kdl never depends on its contents
        commands::config_path().map(|result| output(&result, human))
    } else {
        load_settings(&cli).and_then(|config| {
            human = human || *config.output_format() == OutputFormat::Human;
            run_command(cli, &config, human)
        })
    };

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// Terminal filter: `-v` > MMCONF_LOG > "warn". Logs go to stderr so stdout
/// stays parseable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(cli: &Cli) -> Result<ResolvedConfig, mmconf::Error> {
    let file = read_config()?;
    let mut overrides = ConfigOverrides::new();
    if let Some(ref url) = cli.server {
        overrides = overrides.with_server_url(url.clone());
    }
    if cli.human_readable {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }
    Ok(resolve_config(&file, &overrides))
}

fn run_command(cli: Cli, config: &ResolvedConfig, human: bool) -> Result<(), mmconf::Error> {
    let secrets = resolve_secrets();
    let patterns = commands::mapping_patterns(config);
    let file = cli.file.as_deref();
    let user = cli.user.as_deref();

    match cli.command {
        Commands::Get { path } => {
            let source = commands::open_source(file, user, config, &secrets)?;
            let result = commands::get(source.as_ref(), &patterns, &path)?;
            output(&result, human);
        }

        Commands::Set {
            path,
            values,
            list,
            dry_run,
        } => {
            let source = commands::open_source(file, user, config, &secrets)?;
            let result = commands::set(source.as_ref(), &patterns, &path, values, list, dry_run)?;
            output(&result, human);
        }

        Commands::Paths {
            filter,
            resolve,
            docs_file,
        } => {
            let docs: Box<dyn DocsIndex> = match docs_file {
                Some(path) => Box::new(FileDocs::new(path)),
                None => Box::new(RemoteDocs::new(
                    config.docs_url.value.clone(),
                    config.timeout_secs(),
                )),
            };
            let result = if resolve {
                let source = commands::open_source(file, user, config, &secrets)?;
                commands::paths(
                    docs.as_ref(),
                    filter.as_deref(),
                    Some((source.as_ref(), &patterns)),
                )?
            } else {
                commands::paths(docs.as_ref(), filter.as_deref(), None)?
            };
            output(&result, human);
        }

        Commands::Explain { path } => {
            let explainer = commands::open_explainer(config, &secrets)?;
            let result = commands::explain(&explainer, &path)?;
            output(&result, human);
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let result = commands::config_show(config, &secrets);
                output(&result, human);
            }
            ConfigCommands::Set { key, values } => {
                let result = commands::config_set(&key, values)?;
                output(&result, human);
            }
            ConfigCommands::Path => {
                let result = commands::config_path()?;
                output(&result, human);
            }
        },
    }

    Ok(())
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
