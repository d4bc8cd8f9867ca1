#[macro_use]
extern crate clap;
use cfgcheck::cfg::ControlFlowGraph;
use cfgcheck::environment::{Environment, TypeErrorPolicy};
use cfgcheck::error::{Error, ErrorKind, Result};
use cfgcheck::loader;
use cfgcheck::pipeline;
use cfgcheck::util::{DumpToFile, RenderGraph};
use clap::{Arg, ArgMatches};
use colored::*;
use console::style;
use std::env;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let arguments = app_from_crate!()
        .arg(
            Arg::with_name("environment_file")
                .short("e")
                .long("env")
                .value_name("FILE")
                .help("Sets environment file to use")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("no_prune")
                .long("no-prune")
                .help("Keeps blocks which cannot reach the exit (overwrites environment)"),
        )
        .arg(
            Arg::with_name("no_type_check")
                .long("no-type-check")
                .help("Skips type checking (overwrites environment)"),
        )
        .arg(
            Arg::with_name("debug")
                .short("d")
                .long("debug")
                .help("Enables debug mode"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Increases log verbosity (-v debug, -vv trace)"),
        )
        .arg(
            Arg::with_name("dot_file")
                .long("dot")
                .value_name("FILE")
                .help("Prints CFG in DOT format into the file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("dump_file")
                .long("dump")
                .value_name("FILE")
                .help("Prints CFG in textual form into the file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("input_file")
                .value_name("FILE")
                .help("CFG description to be checked")
                .required(true)
                .index(1),
        )
        .get_matches();

    init_tracing(arguments.occurrences_of("verbose"));

    if let Err(e) = cfg_check(&arguments) {
        println!("{}", style(&e).bold().red());
        for cause in e.iter().skip(1) {
            println!("{} {}", "caused by:".dimmed(), cause);
        }
        process::exit(exit_code(&e));
    }
}

/// `RUST_LOG` wins over `-v`.
fn init_tracing(verbosity: u64) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = match env::var_os(EnvFilter::DEFAULT_ENV) {
        Some(_) => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level)),
        None => EnvFilter::new(default_level),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(error: &Error) -> i32 {
    match error.kind() {
        ErrorKind::TypeCheck(_) => 1,
        _ => -1,
    }
}

fn build_environment(arguments: &ArgMatches, input_file: &Path) -> Result<Environment> {
    let mut env = if let Some(file_path) = arguments.value_of("environment_file") {
        // Load given environment file
        let env_file = Path::new(file_path);
        if !env_file.is_file() {
            return Err(format!("Environment file '{}' does not exist", file_path).into());
        }
        Environment::from_file(env_file)?
    } else {
        // Try to find a environment file for the current input
        let env_file = Environment::companion_file(input_file);
        if env_file.is_file() {
            println!(
                "Using environment defined in '{}'",
                style(env_file.display()).yellow()
            );
            Environment::from_file(&env_file)?
        } else {
            Environment::default()
        }
    };

    if arguments.is_present("no_prune") {
        env.prune = false;
    }

    if arguments.is_present("no_type_check") {
        env.type_check = false;
    }

    if arguments.is_present("debug") {
        env.debug = true;
    }

    Ok(env)
}

fn write_outputs(arguments: &ArgMatches, cfg: &ControlFlowGraph) -> Result<()> {
    if let Some(path) = arguments.value_of("dot_file") {
        cfg.render_to_file(Path::new(path))?;
    }

    if let Some(path) = arguments.value_of("dump_file") {
        cfg.dump_to_file(Path::new(path))?;
    }

    Ok(())
}

fn cfg_check(arguments: &ArgMatches) -> Result<()> {
    let input_file = arguments
        .value_of("input_file")
        .ok_or("No input file given")?;

    let env = build_environment(arguments, Path::new(input_file))?;

    if env.debug {
        println!("{}:\n{}\n---", "Environment".bold(), style(&env).cyan());
    }

    println!(
        "{} Loading CFG '{}'",
        style("[1/2]").bold().dim(),
        input_file.yellow()
    );
    let mut cfg = loader::load_cfg(Path::new(input_file))?;

    if env.debug {
        println!("{}:\n{}\n---", "Loaded CFG".bold(), style(&cfg).cyan());
    }

    println!("{} Checking CFG", style("[2/2]").bold().dim());
    let result = pipeline::run_with_progress(&env, &mut cfg, |step, total, description| {
        println!(
            "-> {} {}",
            style(format!("[{}/{}]", step, total)).bold().dim(),
            description,
        )
    });

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            if let (ErrorKind::TypeCheck(_), TypeErrorPolicy::Report) =
                (e.kind(), env.on_type_error)
            {
                println!("{}", style(&e).bold().red());
                write_outputs(arguments, &cfg)?;
                process::exit(exit_code(&e));
            }
            return Err(e);
        }
    };

    for label in report.removed() {
        println!("-> removed block '{}'", label.as_str().yellow());
    }

    if env.debug && !report.removed().is_empty() {
        println!("{}:\n{}\n---", "Pruned CFG".bold(), style(&cfg).cyan());
    }

    write_outputs(arguments, &cfg)?;

    if report.type_checked() {
        println!("{}", "CFG is well-formed.".bold().green());
    } else {
        println!("{}", report);
    }

    Ok(())
}
