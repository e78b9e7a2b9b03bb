//! billpress – command-line invoice renderer.
//!
//! Usage:
//!   billpress --layout layout.json --invoice invoice.json [output.pdf]
//!   billpress --layout layout.json --preview [output.pdf]
//!
//! Renders the invoice (or the canonical sample data with `--preview`)
//! against the layout and writes the PDF. Without an output path the
//! artifact stays at its temp location and the path is printed.

use std::{env, fs, path::PathBuf, process};

use billpress::layout_spec::LayoutSpec;
use billpress::pipeline::{preview, render_invoice_json};
use billpress::PipelineError;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut layout_path: Option<PathBuf> = None;
    let mut invoice_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut use_preview = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--layout" | "-l" => layout_path = iter.next().map(PathBuf::from),
            "--invoice" | "-i" => invoice_path = iter.next().map(PathBuf::from),
            "--preview" | "-p" => use_preview = true,
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if output_path.is_some() {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                output_path = Some(PathBuf::from(path));
            }
        }
    }

    let Some(layout_path) = layout_path else {
        eprintln!("Error: --layout is required.");
        print_usage(&args[0]);
        process::exit(1);
    };

    let layout_json = read_json(&layout_path);

    let result = if use_preview {
        match LayoutSpec::from_json(&layout_json) {
            Ok(spec) => preview(&spec),
            Err(e) => {
                eprintln!("Error in layout '{}': {e}", layout_path.display());
                process::exit(1);
            }
        }
    } else {
        let Some(invoice_path) = invoice_path else {
            eprintln!("Error: either --invoice or --preview is required.");
            print_usage(&args[0]);
            process::exit(1);
        };
        let invoice_json = read_json(&invoice_path);
        render_invoice_json(&invoice_json, &layout_json)
    };

    match result {
        Ok(artifact) => {
            let final_path = match output_path {
                Some(out) => {
                    if let Err(e) = fs::rename(&artifact.path, &out)
                        .or_else(|_| {
                            // Rename fails across filesystems; fall back to copy.
                            fs::copy(&artifact.path, &out)
                                .and_then(|_| fs::remove_file(&artifact.path))
                        })
                    {
                        eprintln!("Error writing '{}': {e}", out.display());
                        process::exit(1);
                    }
                    out
                }
                None => artifact.path,
            };
            eprintln!(
                "Wrote '{}' ({} bytes)",
                final_path.display(),
                artifact.bytes.len()
            );
        }
        Err(e) => {
            let kind = match &e {
                PipelineError::Layout(_) => "layout",
                PipelineError::Context(_) => "input",
                PipelineError::Render(_) => "render",
                _ => "internal",
            };
            eprintln!("Error ({kind}): {e}");
            process::exit(1);
        }
    }
}

fn read_json(path: &PathBuf) -> serde_json::Value {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", path.display());
            process::exit(1);
        }
    };
    match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error parsing '{}': {e}", path.display());
            process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("billpress – layout-driven invoice PDF renderer");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} --layout layout.json --invoice invoice.json [output.pdf]");
    eprintln!("  {prog} --layout layout.json --preview [output.pdf]");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --layout,  -l   Layout spec JSON (colors, fonts, columns, header/footer)");
    eprintln!("  --invoice, -i   Invoice record JSON");
    eprintln!("  --preview, -p   Render the canonical sample invoice instead of live data");
    eprintln!("  --help          Print this message");
}
