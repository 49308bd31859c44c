use clap::Parser;
use fflowc::config::Config;
use fflowc::Format;
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(
    name = "fflowc",
    about = "Fountain-Flow transpiler: convert branching scripts between FFlow, Twee, and Ren'Py"
)]
struct Cli {
    /// Input script (.fflow, .twee, .tw, .rpy)
    input: PathBuf,

    /// Target format: twee, renpy or fflow (defaults to fflow for
    /// Twee/Ren'Py input)
    #[arg(long)]
    to: Option<String>,

    /// Output file (default: input filename with the target extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Spaces per indent level in generated Ren'Py
    #[arg(long)]
    indent_width: Option<usize>,

    /// Variable sigil used in generated Twee
    #[arg(long)]
    sigil: Option<String>,
}

fn die(msg: &str) -> ! {
    eprintln!("error: {}", msg);
    process::exit(1);
}

fn load_config(path: &PathBuf) -> Config {
    let text =
        fs::read_to_string(path).unwrap_or_else(|e| die(&format!("cannot read config: {}", e)));
    serde_json::from_str(&text).unwrap_or_else(|e| die(&format!("invalid config JSON: {}", e)))
}

fn main() {
    let cli = Cli::parse();

    let mut config = if let Some(ref config_path) = cli.config {
        load_config(config_path)
    } else {
        let defaults = ["fflowc.config.json", "config/fflowc.config.json"];
        let mut loaded = None;
        for p in &defaults {
            let path = PathBuf::from(p);
            if path.is_file() {
                loaded = Some(load_config(&path));
                break;
            }
        }
        loaded.unwrap_or_default()
    };

    if let Some(w) = cli.indent_width {
        config.indent_width = w;
    }
    if let Some(ref s) = cli.sigil {
        config.variable_sigil = s.clone();
    }

    let from = cli
        .input
        .extension()
        .and_then(|e| e.to_str())
        .and_then(Format::from_extension)
        .unwrap_or_else(|| {
            die(&format!(
                "unknown input format '{}' (supported: .fflow, .twee, .tw, .rpy)",
                cli.input.display()
            ))
        });

    let to = match cli.to.as_deref() {
        Some("twee") => Format::Twee,
        Some("renpy") => Format::Renpy,
        Some("fflow") => Format::FFlow,
        Some(other) => die(&format!(
            "unknown target format '{}' (supported: twee, renpy, fflow)",
            other
        )),
        None if from == Format::FFlow => {
            die("FFlow input needs an explicit target: --to [twee|renpy]")
        }
        None => Format::FFlow,
    };

    let text = fs::read_to_string(&cli.input)
        .unwrap_or_else(|e| die(&format!("cannot read {}: {}", cli.input.display(), e)));

    let ir = fflowc::parse(&text, from);
    for d in fflowc::lint::check(&ir) {
        eprintln!("warning: {}", d);
    }
    let result = fflowc::generate(&ir, to, &config);

    let out_path = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension(to.extension()));
    if out_path == cli.input {
        die("derived output path equals the input; pass --output");
    }
    fs::write(&out_path, &result)
        .unwrap_or_else(|e| die(&format!("cannot write {}: {}", out_path.display(), e)));

    eprintln!(
        "parsed {} nodes ({}) -> {} ({})",
        ir.len(),
        from.name(),
        out_path.display(),
        to.name()
    );
}
