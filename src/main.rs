use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::Write;
use std::path::PathBuf;
use swagger_pwsh::command_tree::CommandTree;
use swagger_pwsh::config::split_key_value;
use swagger_pwsh::logging::init_tracing;
use swagger_pwsh::{DefaultFetcher, FileWriter, Generator, GeneratorConfig};

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let matches = build_cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    if let Some(matches) = matches.subcommand_matches("generate") {
        return handle_generate(matches);
    }
    if let Some(matches) = matches.subcommand_matches("list") {
        return handle_list(matches);
    }
    Err(anyhow!("subcommand required"))
}

fn build_cli() -> Command {
    let document = Arg::new("document")
        .required(true)
        .value_name("DOCUMENT_URI")
        .help("URL or local path of the Swagger 1.2 resource listing");

    Command::new("swagger-pwsh")
        .about("Generate PowerShell command modules from Swagger 1.2 descriptions")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("header")
                .long("header")
                .global(true)
                .action(ArgAction::Append)
                .value_name("NAME:VALUE")
                .help("Header sent when fetching documents (repeatable)"),
        )
        .arg(
            Arg::new("passthrough-model")
                .long("passthrough-model")
                .global(true)
                .action(ArgAction::Append)
                .value_name("NAME")
                .help("Model name emitted as a generic object (repeatable)"),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .global(true)
                .value_name("URL")
                .help("Base URI of generated calls instead of the document host"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log per-operation detail"),
        )
        .subcommand(
            Command::new("generate")
                .about("Write a PowerShell module for a description")
                .arg(document.clone())
                .arg(
                    Arg::new("prefix")
                        .long("prefix")
                        .required(true)
                        .value_name("PREFIX")
                        .help("Inserted between verb and noun of each command"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .required(true)
                        .value_name("PATH")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Module file to write"),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("Show the commands a description would produce")
                .arg(document)
                .arg(
                    Arg::new("prefix")
                        .long("prefix")
                        .default_value("")
                        .value_name("PREFIX"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Emit machine-readable JSON"),
                ),
        )
}

fn build_generator(matches: &ArgMatches) -> Result<Generator<DefaultFetcher>> {
    let prefix = matches.get_one::<String>("prefix").cloned().unwrap_or_default();
    let mut config = GeneratorConfig::new(prefix);
    config.api_base_override = matches.get_one::<String>("api-url").cloned();
    config.headers = parse_headers(matches.get_many::<String>("header"))?;
    if let Some(models) = matches.get_many::<String>("passthrough-model") {
        config.passthrough_models.extend(models.cloned());
    }
    let config = config.with_env();

    let fetcher = DefaultFetcher::new(config.auth_token.clone(), config.headers.clone())
        .context("build http client")?;
    Ok(Generator::new(config, fetcher))
}

fn handle_generate(matches: &ArgMatches) -> Result<()> {
    let document = matches
        .get_one::<String>("document")
        .ok_or_else(|| anyhow!("document URI required"))?;
    let out = matches
        .get_one::<PathBuf>("out")
        .ok_or_else(|| anyhow!("output path required"))?;

    let generator = build_generator(matches)?;
    generator
        .create_module(document, out, &mut FileWriter)
        .with_context(|| format!("generate module from {document}"))?;
    write_stdout_line(&out.display().to_string())?;
    Ok(())
}

fn handle_list(matches: &ArgMatches) -> Result<()> {
    let document = matches
        .get_one::<String>("document")
        .ok_or_else(|| anyhow!("document URI required"))?;

    let generator = build_generator(matches)?;
    let session = generator
        .resolve(document)
        .with_context(|| format!("resolve {document}"))?;
    let tree = session.command_tree(&generator.config().cmdlet_prefix);

    if matches.get_flag("json") {
        write_stdout_line(&serde_json::to_string_pretty(&tree)?)?;
        return Ok(());
    }
    print_tree(&tree)
}

fn print_tree(tree: &CommandTree) -> Result<()> {
    for command in &tree.commands {
        write_stdout_line(&command.name)?;
        for member in &command.members {
            write_stdout_line(&format!(
                "  {} {} [{}]",
                member.action.method(),
                member.endpoint,
                member.parameter_set_name
            ))?;
        }
    }
    Ok(())
}

fn parse_headers(values: Option<clap::parser::ValuesRef<String>>) -> Result<Vec<(String, String)>> {
    let mut headers = Vec::new();
    if let Some(values) = values {
        for value in values {
            let (k, v) = split_key_value(value).ok_or_else(|| anyhow!("invalid header {value}, expected NAME:VALUE"))?;
            headers.push((k.to_string(), v.to_string()));
        }
    }
    Ok(headers)
}

fn write_stdout_line(line: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(line.as_bytes())?;
    stdout.write_all(b"\n")?;
    Ok(())
}
