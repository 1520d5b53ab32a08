//! vsplice - convert markup fragments and splice them into pages

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use clap::{Parser, Subcommand};

use vsplice::dom::Document;
use vsplice::markup::{self, MarkupMode, MarkupParser, StandardParser};
use vsplice::replace::{CommitOutcome, Registry};
use vsplice::vdom;

#[derive(Parser)]
#[command(name = "vsplice")]
#[command(version, about = "Convert markup fragments to virtual-DOM trees", long_about = None)]
#[command(after_help = "EXAMPLES:
    vsplice tree card.html                           Print the tree as JSON
    vsplice tree icon.svg --xml                      Parse as XML, propagate xmlns
    vsplice replace page.html --id x --fragment card.html
                                                     Replace #x and print the page")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the virtual-DOM tree of a fragment as JSON
    Tree {
        /// Fragment file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Parse as XML instead of HTML
        #[arg(short, long)]
        xml: bool,
    },

    /// Replace an element of a page with a fragment
    Replace {
        /// HTML page containing the placeholder
        #[arg(value_name = "PAGE")]
        page: PathBuf,

        /// ID of the placeholder element
        #[arg(long)]
        id: String,

        /// Fragment file to render in place of the placeholder
        #[arg(short, long, value_name = "FILE")]
        fragment: PathBuf,

        /// Replacement method (preact, preact-xml)
        #[arg(short, long, default_value = "preact")]
        method: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Tree { file, xml } => print_tree(&file, xml),
        Command::Replace {
            page,
            id,
            fragment,
            method,
        } => replace(&page, &id, &fragment, &method),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_tree(path: &Path, xml: bool) -> Result<ExitCode, String> {
    let text = markup::read_markup(path).map_err(|e| e.to_string())?;
    let mode = if xml { MarkupMode::Xml } else { MarkupMode::Html };

    let fragment = StandardParser::new()
        .parse(&text, mode)
        .map_err(|e| e.to_string())?;
    let tree = vdom::convert(&fragment);

    let json = serde_json::to_string_pretty(&tree).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}

fn replace(page: &Path, id: &str, fragment: &Path, method: &str) -> Result<ExitCode, String> {
    let page_text = markup::read_markup(page).map_err(|e| e.to_string())?;
    let fragment_text = markup::read_markup(fragment).map_err(|e| e.to_string())?;

    let mut document = Document::parse_html(&page_text);
    let placeholder = document
        .get_by_id(id)
        .ok_or_else(|| format!("no element with id {id:?} in {}", page.display()))?;

    let diagnostics = Rc::new(RefCell::new(Vec::<String>::new()));
    let mut methods = Registry::standard_with_sink(diagnostics.clone());
    let outcome = methods
        .replace(method, &mut document, placeholder, &fragment_text)
        .map_err(|e| e.to_string())?;

    match outcome {
        CommitOutcome::Committed { .. } => {
            println!("{}", document.to_html());
            Ok(ExitCode::SUCCESS)
        }
        CommitOutcome::Violated(_) => {
            for message in diagnostics.borrow().iter() {
                eprintln!("{message}");
            }
            Ok(ExitCode::from(2))
        }
    }
}
