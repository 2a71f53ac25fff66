//! # Folio CLI
//!
//! Usage:
//!   folio report.json -o report.html
//!   echo '{ ... }' | folio > report.html
//!   folio --example > report.json

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;

#[derive(Parser)]
#[command(name = "folio", about = "Lay out a JSON report as a streaming HTML page")]
struct Args {
    /// Input document (JSON). Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Output file. Writes to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a sample document and exit.
    #[arg(long)]
    example: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if args.example {
        print!("{}", example_report_json());
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("✗ {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), folio::Error> {
    let input = match &args.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let document: folio::model::Document = serde_json::from_str(&input)?;

    match &args.output {
        Some(path) => {
            let file = BufWriter::new(File::create(path)?);
            folio::render_to(&document, file)?;
            eprintln!("✓ Written {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut out = folio::render_to(&document, BufWriter::new(stdout.lock()))?;
            out.flush()?;
        }
    }
    Ok(())
}

fn example_report_json() -> &'static str {
    r##"{
  "title": "Descendants of Anna Berg",
  "geometry": {
    "size": "A4",
    "orientation": "portrait",
    "direction": "ltr"
  },
  "styles": [
    { "name": "title", "font": "dejavusans", "size": 16, "style": "B" },
    { "name": "text", "font": "dejavusans", "size": 10 },
    { "name": "label", "font": "dejavusans", "size": 10, "style": "B", "color": "#333333" },
    { "name": "footnote", "font": "dejavusans", "size": 8, "style": "I" },
    { "name": "footnotenum", "font": "dejavusans", "size": 6 },
    { "name": "genby", "font": "dejavusans", "size": 7, "color": "#777777" }
  ],
  "defaultStyle": "text",
  "attribution": {
    "text": "Generated by Folio",
    "url": "https://example.org/folio"
  },
  "pageHeader": [
    { "type": "Cell", "style": "text", "align": "R", "border": "B", "text": "Page #PAGENUM#" }
  ],
  "header": [
    { "type": "Cell", "style": "title", "align": "C", "text": "Descendants of Anna Berg" }
  ],
  "body": [
    { "type": "Cell", "width": 120, "style": "label", "flow": "beside", "text": "Born" },
    { "type": "Cell", "style": "text", "text": "12 March 1850, Oslo" },
    { "type": "TextBox", "newline": true, "padding": true, "elements": [
      { "type": "Text", "style": "text", "text": "Baptised in «Oslo domkirke» the same month." },
      { "type": "Footnote", "text": "Church book 1848-1855, folio 112." }
    ]},
    { "type": "Image", "src": "media/anna.jpg", "width": 80, "height": 100, "nextLine": true },
    { "type": "Line" },
    { "type": "PageBreak" },
    { "type": "Text", "style": "text", "text": "Married 1872." },
    { "type": "Footnote", "text": "Church book 1848-1855, folio 112." },
    { "type": "FlushFootnotes" }
  ],
  "footer": [
    { "type": "Cell", "style": "text", "align": "C", "text": "Berg family archive" }
  ]
}
"##
}
