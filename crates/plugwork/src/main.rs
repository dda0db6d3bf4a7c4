mod cli;
mod demo;

use std::process::ExitCode;

use clap::Parser;
use log::{debug, error};
use plugwork_core::kernel::logging::level_for;
use plugwork_core::{Api, FinalizedApi, KernelError, Result};

use crate::cli::{CliArgs, Commands};
use crate::demo::{COMMAND, DemoApp, TextCommand};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("plugwork: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<()> {
    let plugin_dir = match &args.plugin_dir {
        Some(dir) => Some(std::path::absolute(dir).map_err(|e| KernelError::Other(e.to_string()))?),
        None => None,
    };
    let mut api = Api::new(DemoApp::new(plugin_dir));
    api.bootstrap_with_overrides(args.overrides())?;

    if let Err(e) = env_logger::Builder::new()
        .filter_level(level_for(api.env()))
        .format_timestamp(None)
        .try_init()
    {
        eprintln!("plugwork: failed to initialize logging: {}", e);
    }
    debug!("Command line overrides: {:?}", args.overrides());

    let finalized = api.finalize()?;

    match args.command.unwrap_or(Commands::Namespaces) {
        Commands::Namespaces => print_namespaces(&finalized),
        Commands::Plugins => print_plugins(&finalized),
        Commands::Env => {
            let env = finalized.env();
            for key in env.keys() {
                if let Some(value) = env.get::<serde_json::Value>(&key) {
                    println!("{} = {}", key, value);
                }
            }
        }
        Commands::Run { name } => {
            let instance = finalized[COMMAND]
                .get(&name)
                .ok_or_else(|| KernelError::Other(format!("unknown command: {}", name)))?;
            let command = instance
                .plugin::<TextCommand>()
                .ok_or_else(|| KernelError::Other(format!("{} is not runnable", instance)))?;
            println!("{}", instance.attr(&command.rendered)?);
        }
    }
    Ok(())
}

fn print_namespaces(api: &FinalizedApi) {
    for namespace in api.namespaces() {
        println!("{} ({})", namespace.name(), namespace.len());
        for member in namespace {
            println!("  {:<12} {}", member.name(), member.summary());
        }
    }
}

fn print_plugins(api: &FinalizedApi) {
    for info in api.plugins() {
        println!("{}: {}", info.plugin(), info.namespaces.join(", "));
    }
}
