//! Multi-threaded fan-out of a file-system search.
//!
//! Files are split into contiguous chunks. Chunk 0 runs on the calling
//! thread and takes the larger share; every other chunk runs on its own
//! `sift-worker-<n>` thread and reports back over a channel. Results are
//! concatenated in chunk order.

use std::any::Any;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::mpsc;
use std::thread;

use sift_core::{SearchResults, ThreadingConfig};

use super::{FileSystemSearchArgs, QueryInput, compile_queries, search_in_file_system};
use crate::adapter::adapter_by_name;
use crate::error::SearchFailure;
use crate::text_search::TextQuery;

/// Splits `file_count` files into contiguous chunks.
///
/// Searching fewer than `threshold` files is not worth a thread, so the
/// number of chunks is bounded both by `max_chunks` and by
/// `file_count / threshold`. The first chunk receives up to `threshold`
/// files even when the others get fewer.
#[must_use]
pub fn plan_chunks(file_count: usize, threshold: usize, max_chunks: usize) -> Vec<Range<usize>> {
    let per_chunk = threshold.max(1);
    if file_count <= per_chunk || max_chunks <= 1 {
        return vec![0..file_count];
    }

    let chunk_count = file_count.div_ceil(per_chunk).min(max_chunks);
    let first = file_count.div_ceil(chunk_count).max(per_chunk).min(file_count);
    let worker_count = chunk_count.saturating_sub(1).max(1);
    let worker_share = file_count
        .saturating_sub(first)
        .div_ceil(worker_count)
        .max(1);

    let mut chunks = vec![0..first];
    let mut start = first;
    while start < file_count {
        let end = start.saturating_add(worker_share).min(file_count);
        chunks.push(start..end);
        start = end;
    }
    chunks
}

fn chunk_limit(limit: usize, chunk_len: usize, total: usize) -> usize {
    limit
        .checked_mul(chunk_len)
        .and_then(|scaled| scaled.checked_div(total).map(|share| (share, scaled)))
        .map_or(limit, |(share, scaled)| {
            if share.saturating_mul(total) < scaled {
                share.saturating_add(1)
            } else {
                share
            }
        })
}

/// Keeps only the queries a worker should run.
///
/// Queries that failed to compile are reported once, by chunk 0.
fn worker_queries(args: &FileSystemSearchArgs) -> QueryInput {
    match &args.queries {
        QueryInput::Parsed(parsed) => {
            QueryInput::Parsed(parsed.iter().filter(|query| query.node().is_some()).cloned().collect())
        }
        QueryInput::Codes(codes) => QueryInput::Codes(
            codes
                .iter()
                .filter(|code| TextQuery::compile(code, args.case_insensitive).is_ok())
                .cloned()
                .collect(),
        ),
    }
}

fn chunk_args(
    args: &FileSystemSearchArgs,
    range: Range<usize>,
    total: usize,
    queries: &QueryInput,
) -> FileSystemSearchArgs {
    let mut chunk = args.clone();
    chunk.file_paths = args.file_paths.get(range).map(<[_]>::to_vec).unwrap_or_default();
    chunk.max_results_limit = args
        .max_results_limit
        .map(|limit| chunk_limit(limit, chunk.file_paths.len(), total));
    chunk.queries = queries.clone();
    chunk
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "worker panicked".to_owned())
}

struct Worker {
    index: usize,
    receiver: mpsc::Receiver<Result<SearchResults, SearchFailure>>,
    handle: thread::JoinHandle<()>,
}

fn spawn_worker(index: usize, args: FileSystemSearchArgs) -> Result<Worker, SearchFailure> {
    let (sender, receiver) = mpsc::channel();
    let handle = thread::Builder::new()
        .name(format!("sift-worker-{index}"))
        .spawn(move || {
            tracing::debug!(target: "sift::search", chunk = index, files = args.file_paths.len(), "worker started");
            let outcome = search_in_file_system(&args);
            if sender.send(outcome).is_err() {
                tracing::debug!(target: "sift::search", chunk = index, "result receiver dropped");
            }
        })
        .map_err(|error| SearchFailure::worker_failed(index, error.to_string()))?;
    Ok(Worker {
        index,
        receiver,
        handle,
    })
}

fn collect_worker(worker: Worker, args: &FileSystemSearchArgs) -> Result<SearchResults, SearchFailure> {
    let Worker {
        index,
        receiver,
        handle,
    } = worker;
    if let Ok(outcome) = receiver.recv() {
        if handle.join().is_err() {
            tracing::warn!(target: "sift::search", chunk = index, "worker panicked after reporting");
        }
        return outcome;
    }

    let message = handle.join().err().map_or_else(
        || "worker exited without reporting".to_owned(),
        |payload| panic_message(payload.as_ref()),
    );
    if args.is_stopped() {
        tracing::debug!(target: "sift::search", chunk = index, %message, "worker ended after stop");
        return Ok(SearchResults::default());
    }
    Err(SearchFailure::worker_failed(index, message))
}

/// Searches files on disk, fanning out across threads when worthwhile.
///
/// Structural queries are compiled once on the calling thread and shared
/// with every worker. A raised [`HardStopFlag`](crate::HardStopFlag) makes
/// every outstanding chunk resolve with empty results.
///
/// # Errors
///
/// Returns a [`SearchFailure`] for an unknown parser, a broken adapter or a
/// worker that failed while no stop was requested.
pub fn search_multi_thread(
    args: &FileSystemSearchArgs,
    config: &ThreadingConfig,
) -> Result<SearchResults, SearchFailure> {
    let cores = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    let max_chunks = config.max_threads.map_or(cores, |limit| limit.min(cores));
    let chunks = plan_chunks(args.file_paths.len(), config.threshold_for(args.mode), max_chunks);
    search_chunks(args, &chunks)
}

/// Runs the first chunk on the calling thread and every other chunk on a
/// worker thread, then concatenates the results in chunk order.
fn search_chunks(
    args: &FileSystemSearchArgs,
    chunks: &[Range<usize>],
) -> Result<SearchResults, SearchFailure> {
    let Some((first, rest)) = chunks.split_first() else {
        return search_in_file_system(args);
    };
    if rest.is_empty() {
        return search_in_file_system(args);
    }

    let mut shared = args.clone();
    if args.mode.is_structural() {
        let adapter = adapter_by_name(&args.parser)?;
        shared.queries = QueryInput::Parsed(compile_queries(args, adapter));
    }
    let total = shared.file_paths.len();
    let for_workers = worker_queries(&shared);
    tracing::debug!(
        target: "sift::search",
        files = total,
        chunks = chunks.len(),
        "starting multi-threaded search"
    );

    let workers = rest
        .iter()
        .enumerate()
        .map(|(offset, range)| {
            let index = offset.saturating_add(1);
            spawn_worker(index, chunk_args(&shared, range.clone(), total, &for_workers))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut results = search_in_file_system(&chunk_args(&shared, first.clone(), total, &shared.queries))?;
    for worker in workers {
        results.append(collect_worker(worker, &shared)?);
    }

    if let Some(limit) = shared.max_results_limit {
        results.matches.truncate(limit);
    }
    if shared.is_stopped() {
        return Ok(SearchResults::default());
    }
    Ok(results)
}
