//! Add ruby annotations to a Word document.
//!
//! Usage:
//!   ruby_annotate novel.docx --mode per_page -r 運命=さだめ -r 鍵=かぎ
//!   ruby_annotate novel.docx --rules rules.json -o out.docx -v

use clap::Parser;
use ruby_oxide::{default_output_path, Error, Mode, RubyAnnotator, RubyConfig, RubyRule, RubyStyle};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "ruby_annotate", version, about = "Insert ruby annotations into a DOCX file")]
struct Cli {
    /// Input DOCX file
    input: PathBuf,

    /// Output DOCX file (default: <input stem>_ruby.docx next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Repetition mode: once, per_page or all (overrides the rule file)
    #[arg(short, long)]
    mode: Option<String>,

    /// Rule as WORD=READING; may be repeated
    #[arg(short = 'r', long = "rule", value_name = "WORD=READING")]
    rules: Vec<String>,

    /// JSON rule file: {"mode": "...", "rules": [{"word": "...", "reading": "..."}]}
    #[arg(long = "rules", value_name = "FILE")]
    rule_file: Option<PathBuf>,

    /// Write explicit Japanese ruby sizing (hps 10 / hpsRaise 20 / hpsBaseText 21 / ja-JP)
    #[arg(long)]
    japanese_style: bool,

    /// Do not annotate paragraphs inside tables and content controls
    #[arg(long)]
    no_tables: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn build_config(cli: &Cli) -> Result<RubyConfig, Error> {
    let mode = cli.mode.as_deref().map(str::parse::<Mode>).transpose()?;

    let mut config = match &cli.rule_file {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            RubyConfig::from_json_with_mode(&json, mode)?
        },
        None => RubyConfig::new(Vec::new(), mode.ok_or(Error::MissingMode)?),
    };

    for pair in &cli.rules {
        // a pair without '=' becomes a rule with an empty reading and is
        // reported by validation
        let rule = RubyRule::parse_pair(pair).unwrap_or_else(|| RubyRule::new(pair.as_str(), ""));
        config.rules.push(rule);
    }
    if cli.japanese_style {
        config.style = RubyStyle {
            align: config.style.align.clone(),
            inherit_run_formatting: config.style.inherit_run_formatting,
            ..RubyStyle::japanese()
        };
    }
    if cli.no_tables {
        config.include_tables = false;
    }

    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli) -> Result<(), Error> {
    let config = build_config(cli)?;
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    let annotator = RubyAnnotator::new(config)?;
    let report = annotator.annotate_file(&cli.input, &output)?;

    print!("{}", report);
    println!("Saved: {}", output.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}
