//! Material restore command line tool
//!
//! Restores `.mat` assets from JSON material dumps, lists the shaders a
//! project provides, and normalizes dumps.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use mat_restore::config::{Config, RestoreConfig, UnmatchedPolicy};
use mat_restore::description::{description_to_json, parse_description};
use mat_restore::foundation::logging;
use mat_restore::host::{AssetHost, ProjectAssetIndex};
use mat_restore::restore::{MaterialRestorer, RestoreRequest, ShaderMode, ShaderSelection};
use mat_restore::writer::MaterialWriter;

fn cli() -> Command {
    let project = Arg::new("project")
        .short('p')
        .long("project")
        .value_name("DIR")
        .help("Unity project root to index shaders and textures from")
        .value_parser(value_parser!(PathBuf));
    let config = Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .help("Restore configuration (.toml or .ron)")
        .value_parser(value_parser!(PathBuf));

    Command::new("mat_restore")
        .about("Restores Unity material assets from JSON material dumps")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log output (-v debug, -vv trace)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("restore")
                .about("Restore one .mat asset per input dump")
                .arg(
                    Arg::new("inputs")
                        .value_name("INPUT")
                        .help("JSON material dumps")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("mode")
                        .short('m')
                        .long("mode")
                        .help("Shader family to restore into")
                        .value_parser(["standard", "toon"])
                        .default_value("standard"),
                )
                .arg(
                    Arg::new("shader")
                        .short('s')
                        .long("shader")
                        .value_name("NAME")
                        .help("Use this exact shader instead of a mode")
                        .conflicts_with("mode"),
                )
                .arg(
                    Arg::new("out")
                        .short('o')
                        .long("out")
                        .value_name("DIR")
                        .help("Output folder (relative to the project when one is given)")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(project.clone())
                .arg(config.clone())
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .help("Fail when the shader does not declare a property")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("print")
                        .long("print")
                        .help("Print the material to stdout instead of writing it")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("shaders")
                .about("List the shaders available for restoring")
                .arg(project)
                .arg(config),
        )
        .subcommand(
            Command::new("dump")
                .about("Print a dump in normalized form")
                .arg(
                    Arg::new("input")
                        .value_name("INPUT")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let verbosity = matches.subcommand().map_or(0, |(_, sub)| sub.get_count("verbose"));
    logging::init(verbosity);

    match matches.subcommand() {
        Some(("restore", sub)) => run_restore(sub),
        Some(("shaders", sub)) => list_shaders(sub),
        Some(("dump", sub)) => dump(sub),
        _ => Err(anyhow!("No subcommand given")),
    }
}

fn load_config(sub: &ArgMatches) -> Result<RestoreConfig> {
    match sub.get_one::<PathBuf>("config") {
        Some(path) => RestoreConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(RestoreConfig::default()),
    }
}

fn open_host(sub: &ArgMatches, config: &RestoreConfig) -> Result<ProjectAssetIndex> {
    if let Some(root) = sub.get_one::<PathBuf>("project") {
        return ProjectAssetIndex::open(root, config)
            .with_context(|| format!("Failed to index project {}", root.display()));
    }

    log::warn!("No project given, only catalog shaders are available and textures are not bound");
    let catalog = ProjectAssetIndex::catalog_for(config).context("Failed to load shader catalog")?;
    Ok(ProjectAssetIndex::from_catalog(catalog))
}

fn shader_selection(sub: &ArgMatches) -> Result<ShaderSelection> {
    if let Some(name) = sub.get_one::<String>("shader") {
        return Ok(ShaderSelection::Custom(name.clone()));
    }

    let mode = match sub.get_one::<String>("mode") {
        Some(mode) => mode.parse::<ShaderMode>().map_err(anyhow::Error::msg)?,
        None => ShaderMode::default(),
    };
    Ok(ShaderSelection::Mode(mode))
}

fn output_folder(sub: &ArgMatches, config: &RestoreConfig) -> PathBuf {
    let folder = sub
        .get_one::<PathBuf>("out")
        .cloned()
        .unwrap_or_else(|| config.output_folder.clone());

    match sub.get_one::<PathBuf>("project") {
        Some(root) if folder.is_relative() && !folder.as_os_str().is_empty() => root.join(folder),
        _ => folder,
    }
}

fn run_restore(sub: &ArgMatches) -> Result<()> {
    let mut config = load_config(sub)?;
    if sub.get_flag("strict") {
        config.unmatched = UnmatchedPolicy::Reject;
    }

    let host = open_host(sub, &config)?;
    let selection = shader_selection(sub)?;
    let output_folder = output_folder(sub, &config);
    let print = sub.get_flag("print");
    let restorer = MaterialRestorer::new(&host, config);

    let inputs: Vec<&PathBuf> = sub.get_many::<PathBuf>("inputs").map(Iterator::collect).unwrap_or_default();
    let mut failed = 0usize;

    for input in &inputs {
        let request = RestoreRequest::new(input.as_path(), selection.clone(), output_folder.clone());
        let result = if print {
            print_material(&restorer, &request)
        } else {
            restorer.run(&request).map(|_| ()).map_err(anyhow::Error::from)
        };

        if let Err(e) = result {
            log::error!("{}: {:#}", input.display(), e);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(anyhow!("{} of {} material(s) failed", failed, inputs.len()));
    }
    Ok(())
}

fn print_material(restorer: &MaterialRestorer<'_>, request: &RestoreRequest) -> Result<()> {
    request.validate()?;
    let json = fs::read_to_string(&request.input)
        .with_context(|| format!("Failed to read {}", request.input.display()))?;

    let outcome = restorer.restore_str(&json, request)?;
    print!("{}", MaterialWriter::to_yaml(&outcome.material));
    Ok(())
}

fn list_shaders(sub: &ArgMatches) -> Result<()> {
    let config = load_config(sub)?;
    let host = open_host(sub, &config)?;

    for name in host.shader_names() {
        println!("{name}");
    }
    Ok(())
}

fn dump(sub: &ArgMatches) -> Result<()> {
    let input = sub
        .get_one::<PathBuf>("input")
        .ok_or_else(|| anyhow!("No input given"))?;

    println!("{}", normalized_dump(input)?);
    Ok(())
}

fn normalized_dump(input: &Path) -> Result<String> {
    let json = fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let description = parse_description(&json).with_context(|| format!("Failed to parse {}", input.display()))?;
    Ok(description_to_json(&description)?)
}
