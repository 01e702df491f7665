use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use lyric_core::ingest::{open_source, DEFAULT_TEXT_FIELD};
use lyric_core::{Index, IngestOptions, SearchHit, SourceFormat, TOP_K};
use tracing_subscriber::{fmt, EnvFilter};

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const EXIT_COMMAND: &str = "exit";

#[derive(Parser)]
#[command(name = "lyric")]
#[command(about = "Rank documents of a text corpus against free-text queries (lnc.ltn)", long_about = None)]
struct Cli {
    #[command(flatten)]
    corpus: CorpusArgs,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct CorpusArgs {
    /// Corpus path: one document per line, or a CSV file with a header row
    #[arg(long, env = "LYRIC_CORPUS")]
    corpus: PathBuf,
    /// Input format (lines|csv); guessed from the file extension when omitted
    #[arg(long)]
    format: Option<SourceFormat>,
    /// CSV column holding the document text
    #[arg(long, default_value = DEFAULT_TEXT_FIELD)]
    text_field: String,
    /// Drop the first token of every document (leading identifiers)
    #[arg(long, default_value_t = false)]
    strip_leading_token: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Read queries from stdin until `exit` (the default)
    Repl,
    /// Run a single query
    Search {
        query: String,
        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the document frequency of a term
    Df { term: String },
    /// Print the highest weighted (term, document, weight) entries
    TopTerms {
        #[arg(short, long, default_value_t = 20)]
        n: usize,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();
    let index = load_index(&cli.corpus)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => run_repl(&index, io::stdin().lock(), &mut out)?,
        Commands::Search { query, json } => {
            let hits = index.hits(&index.search(&query));
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&hits)?)?;
            } else {
                print_hits(&mut out, &hits)?;
            }
        }
        Commands::Df { term } => writeln!(out, "{}", index.document_frequency(&term))?,
        Commands::TopTerms { n, json } => {
            let top = index.top_terms(n);
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&top)?)?;
            } else {
                for t in top {
                    writeln!(out, "{:.6}\t{}\t{}", t.weight, t.doc_id, t.term)?;
                }
            }
        }
    }
    Ok(())
}

fn load_index(args: &CorpusArgs) -> Result<Index> {
    let format = args.format.unwrap_or_else(|| SourceFormat::from_path(&args.corpus));
    let options = IngestOptions { strip_leading_token: args.strip_leading_token };
    let mut source = open_source(&args.corpus, format, &args.text_field)
        .with_context(|| format!("opening corpus {}", args.corpus.display()))?;
    let index = Index::build(&mut source, options)
        .with_context(|| format!("reading corpus {}", args.corpus.display()))?;
    let stats = index.stats();
    tracing::info!(corpus = %args.corpus.display(), documents = stats.documents, terms = stats.terms, skipped = stats.skipped, "corpus loaded");
    Ok(index)
}

/// Prompt for queries until `exit` or end of input, printing up to
/// [`TOP_K`] hits per query.
fn run_repl<R: BufRead, W: Write>(index: &Index, input: R, out: &mut W) -> Result<()> {
    let mut lines = input.lines();
    loop {
        write!(out, "Query: ")?;
        out.flush()?;
        let Some(line) = lines.next() else { break };
        let query = line?;
        let query = query.trim();
        if query == EXIT_COMMAND {
            break;
        }
        let hits = index.hits(&index.search(query));
        print_hits(out, &hits)?;
    }
    writeln!(out)?;
    Ok(())
}

fn print_hits<W: Write>(out: &mut W, hits: &[SearchHit]) -> Result<()> {
    if hits.is_empty() {
        writeln!(out, "no results")?;
        return Ok(());
    }
    debug_assert!(hits.len() <= TOP_K);
    for hit in hits {
        match &hit.meta {
            Some(meta) => writeln!(out, "{:.4}\t{} - {}", hit.score, meta.artist, meta.title)?,
            None => writeln!(out, "{:.4}\tdoc {}", hit.score, hit.doc_id)?,
        }
    }
    Ok(())
}
