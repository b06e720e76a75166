// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command-line interface for rendering JSON templates

use anyhow::{Context as _, Result};
use clap::{ArgAction, CommandFactory, Parser};
use colored::Colorize;
use rjson::loader::{load_config, load_context, load_template};
use rjson::registry::extension::builtin;
use rjson::{Context, ExtensionManager, RenderConfig, Renderer, RjsonError, Value};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "rjson")]
#[command(about = "Render JSON templates or run the built-in demo")]
#[command(version)]
#[command(author = "OctoFHIR Team <funyloony@gmail.com>")]
struct Cli {
    /// Template file to render; `.json` files are JSON, anything else YAML
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Object used as the initial context (JSON or YAML)
    #[arg(short, long)]
    context: Option<PathBuf>,

    /// Write output JSON to file instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Bundled extension to load; can be repeated
    #[arg(short = 'a', long = "addon")]
    addons: Vec<String>,

    /// List the bundled extensions and exit
    #[arg(long)]
    list_addons: bool,

    /// Run the built-in demo template
    #[arg(long)]
    demo: bool,

    /// Print compact JSON instead of indented JSON
    #[arg(long)]
    compact: bool,

    /// File with render limits and options (JSON or YAML)
    #[arg(long, env = "RJSON_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum template nesting depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Maximum number of repeat iterations
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Maximum nesting depth of one embedded expression
    #[arg(long)]
    max_expression_depth: Option<usize>,

    /// Enable comparison and conditional operators
    #[arg(long)]
    extended_operators: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress informational messages
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn render_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => RenderConfig::default(),
        };
        if let Some(max_depth) = self.max_depth {
            config = config.with_max_depth(max_depth);
        }
        if let Some(max_iterations) = self.max_iterations {
            config = config.with_max_iterations(max_iterations);
        }
        if let Some(depth) = self.max_expression_depth {
            config = config.with_max_expression_depth(depth);
        }
        if self.extended_operators {
            config = config.with_extended_operators(true);
        }
        Ok(config)
    }

    fn info(&self, message: impl AsRef<str>) {
        if !self.quiet {
            eprintln!("{}", message.as_ref());
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = match cli.verbose {
        0 if cli.quiet => log::LevelFilter::Error,
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("RJSON_LOG")
        .init();
}

fn load_addons(cli: &Cli, manager: &mut ExtensionManager, namespaces: &[String]) {
    for (namespace, outcome) in manager.load_builtins(namespaces) {
        match outcome {
            Ok(functions) => cli.info(format!(
                "{} addon {namespace}: {}",
                "Loaded".green(),
                functions.join(", ")
            )),
            Err(e) => eprintln!("{} addon {namespace}: {e}", "Failed to load".red()),
        }
    }
}

fn format_output(value: &Value, compact: bool) -> Result<String> {
    let json = serde_json::Value::from(value.clone());
    let text = if compact {
        serde_json::to_string(&json)?
    } else {
        serde_json::to_string_pretty(&json)?
    };
    Ok(text)
}

fn demo_template(manager: &ExtensionManager) -> Value {
    let greeting = if manager.registry().contains("shout") {
        "$shout('hello demo')"
    } else if manager.registry().contains("repeat") {
        "$repeat('x', 5)"
    } else {
        "Hello from rjson"
    };
    let mut template = rjson::model::Object::new();
    template.insert("greeting".to_string(), Value::from(greeting));
    Value::Object(template)
}

fn report(error: &anyhow::Error) {
    match error.downcast_ref::<RjsonError>() {
        Some(e) => eprintln!("{} {}: {e}", "error:".red().bold(), e.kind()),
        None => eprintln!("{} {error:#}", "error:".red().bold()),
    }
}

fn run(cli: &Cli, manager: &mut ExtensionManager) -> Result<ExitCode> {
    if cli.list_addons {
        for namespace in builtin::available() {
            let loaded = if manager.is_extension_loaded(namespace) {
                " (loaded)".dimmed().to_string()
            } else {
                String::new()
            };
            println!("{namespace}{loaded}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = cli.render_config()?;

    if cli.demo {
        let missing: Vec<String> = builtin::available()
            .into_iter()
            .filter(|namespace| !manager.is_extension_loaded(namespace))
            .map(str::to_string)
            .collect();
        load_addons(cli, manager, &missing);

        let template = demo_template(manager);
        let renderer = Renderer::new(manager.registry()).with_config(config);
        let rendered = renderer
            .render(&template, &Context::new())
            .unwrap_or_else(|e| {
                log::warn!("demo template failed, using static greeting: {e}");
                let mut fallback = rjson::model::Object::new();
                fallback.insert("greeting".to_string(), Value::from("Hello from rjson"));
                Value::Object(fallback)
            });
        println!("{}", format_output(&rendered, cli.compact)?);
        return Ok(ExitCode::SUCCESS);
    }

    let Some(file) = &cli.file else {
        Cli::command().print_help()?;
        return Ok(ExitCode::from(2));
    };

    let template = load_template(file)?;
    let context = match &cli.context {
        Some(path) => load_context(path)?,
        None => Context::new(),
    };

    let renderer = Renderer::new(manager.registry()).with_config(config);
    let rendered = renderer.render(&template, &context).map_err(RjsonError::from)?;
    let output = format_output(&rendered, cli.compact)?;

    match &cli.out {
        Some(path) => {
            fs::write(path, output)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            cli.info(format!("Wrote output to {}", path.display()));
        }
        None => println!("{output}"),
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(&cli);

    let mut manager = ExtensionManager::default();
    load_addons(&cli, &mut manager, &cli.addons);

    let status = run(&cli, &mut manager).unwrap_or_else(|error| {
        report(&error);
        ExitCode::FAILURE
    });

    for error in manager.teardown_all() {
        eprintln!("{} {error}", "warning:".yellow().bold());
    }

    status
}
