//! Command-line argument grammar (`spec.md` §6 "CLI surface").

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Local retrieval-augmented generation engine.
#[derive(Debug, Parser)]
#[command(name = "ragrs", version, about)]
pub struct Cli {
    /// Directory holding the vector store, manifest, and eval outputs.
    #[arg(long, global = true, default_value = ".rag_index")]
    pub index_dir: PathBuf,

    /// Base URL of the Ollama-compatible server.
    #[arg(long, global = true, env = "OLLAMA_URL", default_value = crate::config::DEFAULT_OLLAMA_URL)]
    pub ollama_url: String,

    /// Embedding model name.
    #[arg(long, global = true, default_value = crate::config::DEFAULT_EMBEDDING_MODEL)]
    pub embedding_model: String,

    /// Chat model name.
    #[arg(long, global = true, default_value = crate::config::DEFAULT_CHAT_MODEL)]
    pub chat_model: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level verbs.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Index one or more source files.
    Index {
        /// Source file paths to load, chunk, embed, and store.
        paths: Vec<PathBuf>,
        /// Skip unchanged sources and reindex only changed/new ones.
        #[arg(long)]
        incremental: bool,
        /// Chunking strategy: `recursive` or `semantic`.
        #[arg(long, default_value = "recursive")]
        chunk_strategy: String,
        /// Chunk size (characters, or tokens with `--use-tokens`).
        #[arg(long, default_value_t = 1000)]
        chunk_size: usize,
        /// Overlap between consecutive chunks.
        #[arg(long, default_value_t = 200)]
        overlap: usize,
        /// Measure `chunk_size`/`overlap` in approximate tokens.
        #[arg(long)]
        use_tokens: bool,
        /// Embed each file's chunks across a thread pool instead of sequentially.
        #[arg(long)]
        parallel: bool,
    },
    /// Ask a question against the indexed documents.
    Query(QueryArgs),
    /// Ask a question with web search forced on.
    Research(QueryArgs),
    /// Evaluate retrieval+generation against a labeled dataset.
    Eval {
        /// Path to a JSONL dataset of `{question, expected}` rows.
        dataset: PathBuf,
        /// Optional path to append an external-scorer TSV to.
        #[arg(long)]
        scorer_tsv: Option<PathBuf>,
    },
}

/// Shared flags for `query` and `research`.
#[derive(Debug, clap::Args)]
pub struct QueryArgs {
    /// The question to ask.
    pub question: String,
    /// Disable the result cache for this call.
    #[arg(long)]
    pub no_cache: bool,
    /// Regex-anchored prefix filter on the source path.
    #[arg(long)]
    pub filter_source: Option<String>,
    /// Exact-match filter on the file type.
    #[arg(long)]
    pub filter_type: Option<String>,
    /// Print extracted citations after the answer.
    #[arg(long)]
    pub citations: bool,
    /// Include web search context alongside document context.
    #[arg(long)]
    pub web: bool,
    /// Skip the chat call and print only the assembled context.
    #[arg(long)]
    pub context_only: bool,
    /// Disable reranking of fused candidates.
    #[arg(long)]
    pub no_rerank: bool,
    /// Generate and fuse alternative query phrasings before retrieval.
    #[arg(long)]
    pub expand: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_with_flags() {
        let cli = Cli::parse_from([
            "ragrs",
            "query",
            "what is rust",
            "--citations",
            "--filter-type",
            "md",
        ]);
        match cli.command {
            Commands::Query(args) => {
                assert_eq!(args.question, "what is rust");
                assert!(args.citations);
                assert_eq!(args.filter_type.as_deref(), Some("md"));
            }
            _ => unreachable!("expected query command"),
        }
    }

    #[test]
    fn parses_index_with_defaults() {
        let cli = Cli::parse_from(["ragrs", "index", "a.txt", "b.md"]);
        match cli.command {
            Commands::Index {
                paths,
                incremental,
                chunk_size,
                ..
            } => {
                assert_eq!(paths.len(), 2);
                assert!(!incremental);
                assert_eq!(chunk_size, 1000);
            }
            _ => unreachable!("expected index command"),
        }
    }
}
