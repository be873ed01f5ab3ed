//! Tabula - run spreadsheet command scripts against a cell engine

mod config;

use anyhow::{Context, bail};
use log::warn;
use std::env;
use std::io::Read;
use std::path::PathBuf;
use tabula_core::{Document, OutputMode};

fn print_usage() {
    eprintln!("Usage: tabula [OPTIONS] [SCRIPT]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [SCRIPT]                  Command script to run (reads stdin if omitted)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <CMD>       Run a single command (can be repeated)");
    eprintln!("  -o, --output <FILE>       Export the rendered sheet after running");
    eprintln!("  --texts                   Export cell texts instead of values");
    eprintln!("  --config <FILE>           Load configuration from FILE");
    eprintln!("  --no-config               Ignore the user configuration file");
    eprintln!("  -h, --help                Print help");
}

#[derive(Debug, Default)]
struct Options {
    script: Option<PathBuf>,
    commands: Vec<String>,
    output_file: Option<PathBuf>,
    texts: bool,
    config_file: Option<PathBuf>,
    no_config: bool,
}

fn parse_args(args: &[String]) -> anyhow::Result<Option<Options>> {
    let mut options = Options::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Ok(None),
            "-c" | "--command" => {
                i += 1;
                let Some(cmd) = args.get(i) else {
                    bail!("--command requires a value");
                };
                options.commands.push(cmd.clone());
            }
            "-o" | "--output" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    bail!("--output requires a file path");
                };
                options.output_file = Some(PathBuf::from(path));
            }
            "--config" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    bail!("--config requires a file path");
                };
                options.config_file = Some(PathBuf::from(path));
            }
            "--texts" => options.texts = true,
            "--no-config" => options.no_config = true,
            arg if arg.starts_with('-') => bail!("Unknown option: {}", arg),
            arg => {
                if options.script.is_some() {
                    bail!("Unexpected argument: {}", arg);
                }
                options.script = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }
    Ok(Some(options))
}

fn init_logging(level: Option<&str>) {
    let env = env_logger::Env::default().default_filter_or(level.unwrap_or("warn"));
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .init();
}

fn print_outputs(outputs: &[String]) {
    for text in outputs {
        if text.ends_with('\n') {
            print!("{}", text);
        } else {
            println!("{}", text);
        }
    }
}

fn run(options: Options) -> anyhow::Result<()> {
    let (config, warnings) = if options.no_config {
        (config::Config::default(), Vec::new())
    } else {
        config::load_config(options.config_file.as_ref())
    };
    init_logging(config.log_level.as_deref());
    for warning in warnings {
        warn!("{}", warning);
        eprintln!("Warning: {}", warning);
    }

    let mut doc = Document::with_render_options(config.render.clone());

    if let Some(path) = &options.script {
        let outputs = doc
            .run_script_file(path)
            .with_context(|| format!("Failed to run {}", path.display()))?;
        print_outputs(&outputs);
    }
    if !options.commands.is_empty() {
        let outputs = doc.run_script(&options.commands.join("\n"))?;
        print_outputs(&outputs);
    }
    if options.script.is_none() && options.commands.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read script from stdin")?;
        let outputs = doc.run_script(&input)?;
        print_outputs(&outputs);
    }

    if let Some(path) = &options.output_file {
        let mode = if options.texts {
            OutputMode::Texts
        } else {
            config.output
        };
        doc.export(path, mode)
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        eprintln!("Exported to {}", path.display());
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(options) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
