use anyhow::{Context, Result};
use clap::{Arg, Command};
use std::fs;
use swagger_pwsh::fetch::DefaultFetcher;
use swagger_pwsh::{Generator, GeneratorConfig};

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let matches = Command::new("dump_commands")
        .arg(Arg::new("document").long("document").required(true))
        .arg(Arg::new("out").long("out").required(true))
        .arg(Arg::new("prefix").long("prefix").default_value(""))
        .get_matches();

    let document = matches
        .get_one::<String>("document")
        .context("document uri missing")?;
    let out_path = matches
        .get_one::<String>("out")
        .context("out path missing")?;
    let prefix = matches
        .get_one::<String>("prefix")
        .cloned()
        .unwrap_or_default();

    let config = GeneratorConfig::new(prefix).with_env();
    let fetcher = DefaultFetcher::new(config.auth_token.clone(), config.headers.clone())?;
    let generator = Generator::new(config, fetcher);
    let session = generator
        .resolve(document)
        .with_context(|| format!("resolve {document}"))?;
    let tree = session.command_tree(&generator.config().cmdlet_prefix);
    let json = serde_json::to_string_pretty(&tree)?;
    fs::write(out_path, json).with_context(|| format!("write {out_path}"))?;
    Ok(())
}
