//! CLI command implementations (`spec.md` §6 "CLI surface").

use std::path::PathBuf;

use serde_json::json;

use crate::alert::AlertSink;
use crate::answer::{self, AnswerRequest};
use crate::cache::{self, InProcessCache, ResultCache};
use crate::chat::OllamaChatBackend;
use crate::chunking::ChunkStrategy;
use crate::cli::output;
use crate::cli::parser::{Cli, Commands, QueryArgs};
use crate::config::RagConfig;
use crate::embedding::OllamaEmbeddingBackend;
use crate::error::{RagError, Result};
use crate::eval;
use crate::expansion;
use crate::indexer::{self, IndexOptions};
use crate::loader::PlainTextLoader;
use crate::logging::{Logger, default_log_path};
use crate::rerank::{HeuristicReranker, Reranker};
use crate::search::{self, SearchConfig};
use crate::vectorstore::{MetadataFilter, SqliteVectorStore};
use crate::web::{self, DuckDuckGoSearchProvider, HttpUrlFetcher};

/// Executes the parsed CLI invocation, returning the text to print.
///
/// # Errors
///
/// Returns an error for usage problems, missing sources, or terminal
/// failures per §7's propagation policy.
pub fn execute(cli: &Cli) -> Result<String> {
    let config = RagConfig::builder()
        .ollama_url(cli.ollama_url.clone())
        .index_dir(cli.index_dir.clone())
        .embedding_model(cli.embedding_model.clone())
        .chat_model(cli.chat_model.clone())
        .from_env()
        .build();

    let logger = Logger::open(
        &default_log_path("ragrs"),
        std::env::var("RAG_VERBOSE").is_ok(),
        AlertSink::from_config(config.alert_webhook.as_deref(), config.alert_latency_ms),
    )
    .map_err(|e| RagError::io("opening log file", e))?;

    match &cli.command {
        Commands::Index {
            paths,
            incremental,
            chunk_strategy,
            chunk_size,
            overlap,
            use_tokens,
            parallel,
        } => cmd_index(
            &config,
            &logger,
            paths,
            *incremental,
            chunk_strategy,
            *chunk_size,
            *overlap,
            *use_tokens,
            *parallel,
        ),
        Commands::Query(args) => cmd_query(&config, &logger, args, false),
        Commands::Research(args) => cmd_query(&config, &logger, args, true),
        Commands::Eval {
            dataset,
            scorer_tsv,
        } => cmd_eval(&config, &logger, dataset, scorer_tsv.as_deref()),
    }
}

fn parse_chunk_strategy(name: &str, chunk_size: usize, overlap: usize, use_tokens: bool) -> ChunkStrategy {
    match name {
        "semantic" => ChunkStrategy::Semantic {
            chunk_size_tokens: chunk_size,
            overlap_ratio: if chunk_size == 0 {
                0.0
            } else {
                overlap as f32 / chunk_size as f32
            },
        },
        _ => ChunkStrategy::Recursive {
            chunk_size,
            overlap,
            use_tokens,
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_index(
    config: &RagConfig,
    logger: &Logger,
    paths: &[PathBuf],
    incremental: bool,
    chunk_strategy: &str,
    chunk_size: usize,
    overlap: usize,
    use_tokens: bool,
    parallel: bool,
) -> Result<String> {
    let store = SqliteVectorStore::open(&config.index_dir)?;
    let embedder = OllamaEmbeddingBackend::new(config.ollama_url.clone());
    let loader = PlainTextLoader;
    let options = IndexOptions {
        strategy: parse_chunk_strategy(chunk_strategy, chunk_size, overlap, use_tokens),
        embedding_model: config.embedding_model.clone(),
        incremental,
        parallel,
    };

    let sources = indexer::index_paths(
        &store,
        search::COLLECTION_NAME,
        &embedder,
        &config.index_dir,
        paths,
        &loader,
        &options,
    )?;

    logger.event(
        "index_complete",
        json!({"files": sources.len(), "chunks": sources.iter().map(|s| s.chunk_count).sum::<usize>()}),
    );
    Ok(output::format_index_summary(&sources))
}

fn cmd_query(config: &RagConfig, logger: &Logger, args: &QueryArgs, force_web: bool) -> Result<String> {
    let store = SqliteVectorStore::open(&config.index_dir)?;
    let embedder = OllamaEmbeddingBackend::new(config.ollama_url.clone());
    let chat = OllamaChatBackend::new(config.ollama_url.clone());
    let reranker: Option<&dyn Reranker> = if args.no_rerank {
        None
    } else {
        Some(&HeuristicReranker)
    };

    let filter = build_filter(args.filter_source.as_deref(), args.filter_type.as_deref());
    let use_web = force_web || args.web;

    let documents = if args.expand {
        expansion::expanded_search(
            &store,
            &embedder,
            &config.embedding_model,
            &chat,
            &config.chat_model,
            reranker,
            &args.question,
            &filter,
            !args.no_rerank,
            Some(logger),
        )
        .unwrap_or_default()
    } else {
        let search_config = SearchConfig {
            use_rerank: !args.no_rerank,
            ..SearchConfig::default()
        };
        search::hybrid_search(
            &store,
            &embedder,
            &config.embedding_model,
            reranker,
            &args.question,
            &filter,
            &search_config,
            Some(logger),
        )
        .unwrap_or_default()
    };

    if documents.is_empty() && !use_web {
        return Err(RagError::SourceMissing {
            message: "no document context retrieved and web search is disabled".to_string(),
        });
    }

    let document_context = documents.join("\n\n---\n\n");
    let web_context = if use_web {
        let search_provider = DuckDuckGoSearchProvider::new();
        let fetcher = HttpUrlFetcher::new();
        web::build_web_context(&search_provider, &fetcher, &args.question, config.use_jina)
    } else {
        String::new()
    };

    if document_context.is_empty() && web_context.is_empty() {
        return Err(RagError::SourceMissing {
            message: "no document context retrieved and web search returned nothing".to_string(),
        });
    }

    if args.context_only {
        let mut combined = document_context.clone();
        if !web_context.is_empty() {
            if !combined.is_empty() {
                combined.push_str("\n\n---\n\n");
            }
            combined.push_str(&web_context);
        }
        return Ok(output::format_context_only(&combined));
    }

    let cache: Box<dyn ResultCache> = if args.no_cache {
        Box::new(InProcessCache::new())
    } else {
        cache::build_cache(config.redis_url.as_deref())
    };
    let key = if force_web {
        cache::research_cache_key(&args.question, args.filter_source.as_deref(), args.filter_type.as_deref())
    } else {
        cache::cache_key(
            &args.question,
            args.filter_source.as_deref(),
            args.filter_type.as_deref(),
            use_web,
        )
    };

    let result = answer::answer(
        &chat,
        &config.chat_model,
        cache.as_ref(),
        &key,
        &AnswerRequest {
            query: &args.question,
            document_context: Some(&document_context),
            web_context: if use_web { Some(&web_context) } else { None },
        },
    )?;

    logger.event(
        "query_complete",
        json!({"cached": result.cached, "citations": result.citations.len()}),
    );
    Ok(output::format_answer(&result, args.citations))
}

fn cmd_eval(config: &RagConfig, logger: &Logger, dataset: &std::path::Path, scorer_tsv: Option<&std::path::Path>) -> Result<String> {
    let cases = eval::read_dataset(dataset)?;
    let store = SqliteVectorStore::open(&config.index_dir)?;
    let embedder = OllamaEmbeddingBackend::new(config.ollama_url.clone());
    let chat = OllamaChatBackend::new(config.ollama_url.clone());
    let cache = InProcessCache::new();

    let mut records = Vec::new();
    for case in &cases {
        let documents = search::hybrid_search(
            &store,
            &embedder,
            &config.embedding_model,
            Some(&HeuristicReranker),
            &case.question,
            &MetadataFilter::All,
            &SearchConfig::default(),
            Some(logger),
        )
        .unwrap_or_default();
        let document_context = documents.join("\n\n---\n\n");

        let key = cache::cache_key(&case.question, None, None, false);
        let answer_result = answer::answer(
            &chat,
            &config.chat_model,
            &cache,
            &key,
            &AnswerRequest {
                query: &case.question,
                document_context: Some(&document_context),
                web_context: None,
            },
        );

        match answer_result {
            Ok(result) => {
                let record = eval::build_record(case, &result.answer, result.citations.len());
                if let Some(tsv_path) = scorer_tsv {
                    eval::append_tsv_row(tsv_path, &case.question, &document_context, &result.answer)?;
                }
                records.push(record);
            }
            Err(e) => {
                logger.event("eval_row_error", json!({"question": case.question, "error": e.to_string()}));
                records.push(eval::build_error_record(case, &e.to_string()));
            }
        }
    }

    eval::write_results(&config.index_dir, &records)?;
    logger.event_simple("eval_complete");
    Ok(output::format_eval_summary(&records))
}

fn build_filter(filter_source: Option<&str>, filter_type: Option<&str>) -> MetadataFilter {
    let source_filter = filter_source.and_then(|prefix| {
        regex::Regex::new(&format!("^{}", regex::escape(prefix)))
            .ok()
            .map(|pattern| MetadataFilter::Regex {
                field: "source",
                pattern,
            })
    });
    let type_filter = filter_type.map(|value| MetadataFilter::Equals {
        field: "file_type",
        value: value.to_string(),
    });

    match (source_filter, type_filter) {
        (Some(s), Some(t)) => MetadataFilter::And(Box::new(s), Box::new(t)),
        (Some(s), None) => s,
        (None, Some(t)) => t,
        (None, None) => MetadataFilter::All,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_filter_with_no_flags_is_all() {
        assert!(matches!(build_filter(None, None), MetadataFilter::All));
    }

    #[test]
    fn build_filter_combines_both_flags_with_and() {
        assert!(matches!(
            build_filter(Some("/docs/"), Some("md")),
            MetadataFilter::And(_, _)
        ));
    }
}
