//! PhotoNodes CLI - Node Graph for Visual Image Editing
//!
//! A demonstration host for the PhotoNodes library: builds a graph from
//! command line options, loads an image into the source node and reports
//! what reaches the sink.

use anyhow::{bail, Context, Result};
use photonodes::prelude::*;
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("🎨 PhotoNodes - Node Graph Image Editing v{}", photonodes::VERSION);
    println!();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("photonodes");

    let Some(command) = args.get(1) else {
        print_usage(program);
        return Ok(());
    };

    match command.as_str() {
        "list" => list_operators(),
        "info" => {
            let Some(id) = args.get(2) else {
                bail!("please specify an operator ID");
            };
            operator_info(id)?;
        }
        "run" => {
            if args.len() < 3 {
                bail!("please specify an input image\nUsage: {program} run <image> [options]");
            }
            run_graph(&args[2..])?;
        }
        "help" | "--help" | "-h" => print_usage(program),
        other => {
            print_usage(program);
            bail!("unknown command: {other}");
        }
    }

    Ok(())
}

fn print_usage(program: &str) {
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  list                   List all available operators");
    println!("  info <operator>        Show detailed info about an operator");
    println!("  run <image> [options]  Evaluate a graph on an image");
    println!("  help                   Show this help message");
    println!();
    println!("Run options:");
    println!("  --brightness <factor>  Scale brightness (1.0 = unchanged)");
    println!("  --contrast <factor>    Scale contrast (1.0 = unchanged)");
    println!("  --blur <radius>        Apply Gaussian blur");
    println!("  --grayscale            Convert to grayscale");
    println!("  --invert               Invert colors");
    println!("  --config <file>        Load editor settings from a TOML file");
}

fn list_operators() {
    let registry = OperatorRegistry::with_builtins();
    let grouped = registry.grouped_by_category();

    println!("Available operators ({} total):", registry.len());
    println!();

    for (category, operators) in grouped {
        println!("  📁 {}", category.display_name());
        for metadata in operators {
            println!("      • {} - {}", metadata.id, metadata.description);
        }
        println!();
    }
}

fn operator_info(id: &str) -> Result<()> {
    let registry = OperatorRegistry::with_builtins();
    let Some(metadata) = registry.get_metadata(id) else {
        bail!("operator not found: {id} (use 'list' to see available operators)");
    };

    println!("Operator: {}", metadata.name);
    println!("ID: {}", metadata.id);
    println!("Category: {}", metadata.category.display_name());
    println!();
    println!("Description:");
    println!("  {}", metadata.description);
    println!();

    if !metadata.inputs.is_empty() {
        println!("Inputs:");
        for socket in &metadata.inputs {
            let literal = socket
                .literal
                .as_deref()
                .map(|text| format!(" = {text}"))
                .unwrap_or_default();
            println!("  • {} [{}]{}", socket.name, socket.socket_type, literal);
            if !socket.description.is_empty() {
                println!("    {}", socket.description);
            }
        }
        println!();
    }

    if !metadata.outputs.is_empty() {
        println!("Outputs:");
        for socket in &metadata.outputs {
            println!("  • {} [{}]", socket.name, socket.socket_type);
        }
    }

    Ok(())
}

/// Options of the `run` command.
#[derive(Debug, Default)]
struct RunOptions {
    input: PathBuf,
    brightness: Option<String>,
    contrast: Option<String>,
    blur: Option<String>,
    grayscale: bool,
    invert: bool,
    config: Option<PathBuf>,
}

fn parse_run_options(args: &[String]) -> Result<RunOptions> {
    let mut options = RunOptions {
        input: PathBuf::from(&args[0]),
        ..RunOptions::default()
    };

    let mut rest = args[1..].iter();
    while let Some(flag) = rest.next() {
        let mut value = || {
            rest.next()
                .cloned()
                .with_context(|| format!("{flag} expects a value"))
        };
        match flag.as_str() {
            "--brightness" => options.brightness = Some(value()?),
            "--contrast" => options.contrast = Some(value()?),
            "--blur" => options.blur = Some(value()?),
            "--config" => options.config = Some(PathBuf::from(value()?)),
            "--grayscale" => options.grayscale = true,
            "--invert" => options.invert = true,
            other => bail!("unknown option: {other}"),
        }
    }

    Ok(options)
}

fn run_graph(args: &[String]) -> Result<()> {
    let options = parse_run_options(args)?;
    let config = match &options.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => EditorConfig::default(),
    };

    let registry = OperatorRegistry::with_builtins();
    let mut graph = NodeGraph::with_config(&config);
    // Build with refresh off, evaluate once at the end
    graph.set_auto_refresh(false);

    let mut stages: Vec<(&str, Option<&str>)> = Vec::new();
    if let Some(factor) = &options.brightness {
        stages.push(("brightness", Some(factor.as_str())));
    }
    if let Some(factor) = &options.contrast {
        stages.push(("contrast", Some(factor.as_str())));
    }
    if let Some(radius) = &options.blur {
        stages.push(("gaussian_blur", Some(radius.as_str())));
    }
    if options.grayscale {
        stages.push(("grayscale", None));
    }
    if options.invert {
        stages.push(("invert", None));
    }

    let mut previous = graph.source();
    for (id, literal) in stages {
        let operator = registry
            .create(id)
            .with_context(|| format!("operator {id} is not available"))?;
        let node = graph.add_operator(operator);
        graph.connect(previous, 0, node, 0)?;
        if let Some(text) = literal {
            graph.set_literal(node, 1, text)?;
        }
        println!("   • Added: {}", graph.get_node(node)?.display_name());
        previous = node;
    }
    let sink = graph.sink();
    graph.connect(previous, 0, sink, 0)?;

    println!("⚙️  Loading {}", options.input.display());
    let image = ImageValue::from_path(&options.input)
        .with_context(|| format!("failed to read {}", options.input.display()))?;
    graph.load_source(Value::Image(image))?;

    let outcome = graph.refresh();
    if let Some(error) = &outcome.error {
        bail!("evaluation failed: {error}");
    }

    match outcome.value.as_image() {
        Some(image) => {
            let (width, height) = image.dimensions();
            println!("✅ Sink holds a {}x{} image", width, height);
        }
        None => println!("⚠️  Sink holds {}", outcome.value),
    }
    if let Some(stats) = &outcome.stats {
        println!(
            "   {} operator calls over {} nodes in {:?}",
            stats.operator_invocations, stats.nodes_visited, stats.duration
        );
    }

    Ok(())
}
