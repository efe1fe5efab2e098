use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use docweave_core::{
    Diagnostic, ErrorLevel, ExternalXrefSpec, HtmlContext, HtmlNode, HtmlRewriteOptions, Located,
    ResolvedXref, SourceInfo, XREF_NOT_FOUND, XrefMap, XrefResolver, count_words,
    create_html_meta_tags, get_bookmarks, transform_html, try_extract_title,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Parser)]
#[command(
    name = "docweave",
    version,
    about = "Rewrite, resolve and sanitize HTML fragments of a documentation build"
)]
struct Args {
    /// Fragment to rewrite. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// JSON file with rewrite options, a link map, xref specs and page metadata.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip output-only adjustments.
    #[arg(long)]
    dry_run: bool,

    /// Warn about embedded <script>, <link> and <style>.
    #[arg(long)]
    report_embedded: bool,

    /// Keep elements and attributes outside the allow-lists.
    #[arg(long)]
    no_sanitize: bool,

    /// Tag links with data-linktype and localize absolute paths.
    #[arg(long)]
    locale: Option<String>,

    /// Source file reported in diagnostics.
    #[arg(long)]
    file: Option<String>,

    #[arg(long, value_enum)]
    diagnostics: Option<DiagnosticsMode>,

    /// Print word count, bookmarks, title and meta tags as JSON instead of HTML.
    #[arg(long)]
    scan: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DiagnosticsMode {
    Json,
    Pretty,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Config {
    options: HtmlRewriteOptions,
    /// Raw link target to published target.
    links: HashMap<String, String>,
    xrefs: Vec<ExternalXrefSpec>,
    file: Option<String>,
    metadata: Map<String, Value>,
    hidden_metadata: HashSet<String>,
    metadata_names: HashMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to read stdin: {0}")]
    Stdin(#[source] io::Error),

    #[error("failed to write scan report: {0}")]
    Report(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanReport {
    word_count: u64,
    bookmarks: Vec<String>,
    title: Option<String>,
    raw_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta_tags: Option<String>,
}

/// Resolves against the configured specs and remembers what it could not find.
struct ReportingXrefs {
    map: XrefMap<ExternalXrefSpec>,
    missing: Vec<Diagnostic>,
}

impl XrefResolver for ReportingXrefs {
    fn resolve_xref(
        &mut self,
        href: Option<&Located<String>>,
        uid: Option<&Located<String>>,
        is_shorthand: bool,
    ) -> ResolvedXref {
        let resolved = self.map.resolve_xref(href, uid, is_shorthand);
        if resolved.href.as_deref().is_none_or(str::is_empty) {
            if let Some(target) = uid.or(href) {
                self.missing.push(Diagnostic::warning(
                    XREF_NOT_FOUND,
                    format!("Cross reference not found: '{}'.", target.value),
                    target.source.clone(),
                ));
            }
        }
        resolved
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(false) => {}
        Ok(true) => process::exit(1),
        Err(err) => {
            eprintln!("docweave: {}", err);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

/// Returns whether an error-level diagnostic was reported.
fn run(args: Args) -> Result<bool, CliError> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    let source = read_input(args.input.as_deref())?;

    if args.scan {
        let report = scan(&source, &config);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(false);
    }

    let Config {
        mut options,
        links,
        xrefs,
        file,
        ..
    } = config;
    options.dry_run |= args.dry_run;
    options.report_embedded |= args.report_embedded;
    options.sanitize &= !args.no_sanitize;
    if args.locale.is_some() {
        options.locale = args.locale;
    }
    let file = args
        .file
        .or(file)
        .or_else(|| args.input.as_ref().map(|path| path.display().to_string()))
        .unwrap_or_default();

    let mut resolve_link =
        |href: &str, _column: usize| links.get(href).cloned().unwrap_or_default();
    let mut xrefs = ReportingXrefs {
        map: XrefMap::new(xrefs),
        missing: Vec::new(),
    };
    log::debug!("{} link targets, {} xref specs", links.len(), xrefs.map.len());

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut context = HtmlContext {
        source: Some(SourceInfo::new(file, 1, 1)),
        links: &mut resolve_link,
        xrefs: &mut xrefs,
        diagnostics: &mut diagnostics,
    };
    let html = transform_html(&source, &options, &mut context);
    diagnostics.append(&mut xrefs.missing);

    print!("{}", html);
    if let Some(mode) = args.diagnostics {
        emit_diagnostics(&diagnostics, mode);
    }
    Ok(diagnostics
        .iter()
        .any(|diagnostic| diagnostic.level == ErrorLevel::Error))
}

fn load_config(path: &Path) -> Result<Config, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_input(input: Option<&Path>) -> Result<String, CliError> {
    match input {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(CliError::Stdin)?;
            Ok(buffer)
        }
    }
}

fn scan(source: &str, config: &Config) -> ScanReport {
    let mut root = HtmlNode::parse(source);
    let word_count = count_words(&root);
    let bookmarks: BTreeSet<String> = get_bookmarks(&root).into_iter().collect();
    let title = try_extract_title(&mut root).unwrap_or_default();
    let meta_tags = (!config.metadata.is_empty()).then(|| {
        create_html_meta_tags(
            &config.metadata,
            &config.hidden_metadata,
            &config.metadata_names,
        )
    });
    ScanReport {
        word_count,
        bookmarks: bookmarks.into_iter().collect(),
        title: title.title,
        raw_title: title.raw_title,
        meta_tags,
    }
}

fn emit_diagnostics(diagnostics: &[Diagnostic], mode: DiagnosticsMode) {
    match mode {
        DiagnosticsMode::Json => match serde_json::to_string_pretty(diagnostics) {
            Ok(json) => eprintln!("{}", json),
            Err(err) => log::error!("failed to serialize diagnostics: {}", err),
        },
        DiagnosticsMode::Pretty => {
            for diagnostic in diagnostics {
                eprintln!("{}", diagnostic);
            }
        }
    }
}
