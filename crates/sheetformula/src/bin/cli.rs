//! Thin smoke-test CLI: evaluate one formula against `name=value` bindings
//! passed on the command line (SPEC_FULL §4.3: "a host shell/CLI is out of
//! scope as a feature surface... but the workspace still carries one thin,
//! demonstrative binary").

use std::collections::HashMap;

use clap::Parser as ClapParser;
use sheetformula::{evaluate, Value};

#[derive(ClapParser)]
#[command(about = "Evaluate a spreadsheet formula against optional cell bindings")]
struct Cli {
    /// Formula text, e.g. "SUM(a1, a2) * 2"
    formula: String,

    /// Cell or variable bindings as name=value, e.g. a1=2 a2=4
    #[arg(value_parser = parse_binding)]
    bindings: Vec<(String, Value)>,
}

fn parse_binding(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {raw:?}"))?;
    let value = match value.parse::<f64>() {
        Ok(n) => Value::Number(n),
        Err(_) => Value::Text(value.to_string()),
    };
    Ok((name.to_string(), value))
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let bindings: HashMap<String, Value> = cli.bindings.into_iter().collect();
    let result = evaluate(&cli.formula, &bindings);
    println!("{result}");
}
