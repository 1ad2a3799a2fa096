//! Greedy fixed-size text chunker.
//!
//! Splits document text into [`Chunk`]s of at most `max_chars` characters.
//! Each chunk is a contiguous slice of the document, so its original
//! spacing is kept. Splits prefer paragraph boundaries (`\n\n`), then line
//! breaks, then spaces, and fall back to a hard cut at the character limit.
//! Consecutive chunks may share up to `overlap_chars` characters of
//! trailing context.
//!
//! Each chunk receives a random UUID plus a SHA-256 hash of its text.
//!
//! # Algorithm
//!
//! 1. Break the text into pieces no longer than `max_chars`, splitting on
//!    the coarsest separator that works and recursing into oversized
//!    pieces with the next finer one.
//! 2. Greedily pack consecutive pieces into a buffer until the span from
//!    the buffer's first piece to the next piece would exceed `max_chars`.
//! 3. On flush, keep the trailing pieces whose combined length fits in
//!    `overlap_chars` as the start of the next buffer.
//!
//! # Example
//!
//! ```rust
//! use quote_desk::chunk::chunk_text;
//! use std::path::Path;
//!
//! let chunks = chunk_text(Path::new("a.txt"), "Hello world.\n\nSecond paragraph.", 500, 0);
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].chunk_index, 0);
//! ```

use sha2::{Digest, Sha256};
use std::path::Path;
use uuid::Uuid;

use crate::config::ChunkingConfig;
use crate::models::{Chunk, Document};

const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Chunk every document, preserving document order.
pub fn chunk_documents(docs: &[Document], config: &ChunkingConfig) -> Vec<Chunk> {
    docs.iter()
        .flat_map(|doc| chunk_document(doc, config))
        .collect()
}

pub fn chunk_document(doc: &Document, config: &ChunkingConfig) -> Vec<Chunk> {
    chunk_text(&doc.source, &doc.body, config.max_chars, config.overlap_chars)
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Whitespace-only text yields no chunks; any other text yields at least
/// one. Every chunk is a contiguous slice of `text` with surrounding
/// whitespace trimmed. Chunk indices are contiguous starting at 0.
pub fn chunk_text(source: &Path, text: &str, max_chars: usize, overlap_chars: usize) -> Vec<Chunk> {
    let max_chars = max_chars.max(1);
    let overlap_chars = overlap_chars.min(max_chars - 1);

    let mut pieces = Vec::new();
    split_recursive(text, 0, max_chars, 0, &mut pieces);

    let span = |start: usize, end: usize| char_len(&text[start..end]);
    let mut chunks = Vec::new();
    // Byte ranges of the pieces in the current chunk, in text order.
    let mut window: Vec<(usize, usize)> = Vec::new();

    for (start, end) in pieces {
        if let Some(&(first, _)) = window.first() {
            if span(first, end) > max_chars {
                let last = window[window.len() - 1].1;
                push_chunk(&mut chunks, source, &text[first..last]);

                // Drop from the front until what's left fits the overlap and
                // still leaves room for the incoming piece.
                while let Some(&(first, _)) = window.first() {
                    if span(first, last) > overlap_chars || span(first, end) > max_chars {
                        window.remove(0);
                    } else {
                        break;
                    }
                }
            }
        }
        window.push((start, end));
    }

    if let (Some(&(first, _)), Some(&(_, last))) = (window.first(), window.last()) {
        push_chunk(&mut chunks, source, &text[first..last]);
    }

    chunks
}

/// Break `text` (found at byte `offset` of the document) into trimmed,
/// non-empty pieces of at most `max_chars` characters, as byte ranges of
/// the document.
fn split_recursive(
    text: &str,
    offset: usize,
    max_chars: usize,
    level: usize,
    out: &mut Vec<(usize, usize)>,
) {
    let Some(sep) = SEPARATORS.get(level).copied() else {
        hard_split(text, offset, max_chars, out);
        return;
    };

    let mut cursor = offset;
    for part in text.split(sep) {
        let part_start = cursor;
        cursor += part.len() + sep.len();

        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        let start = part_start + (part.len() - part.trim_start().len());
        if char_len(trimmed) <= max_chars {
            out.push((start, start + trimmed.len()));
        } else {
            split_recursive(trimmed, start, max_chars, level + 1, out);
        }
    }
}

/// Cut at exact character boundaries when no separator is available.
fn hard_split(text: &str, offset: usize, max_chars: usize, out: &mut Vec<(usize, usize)>) {
    let mut start = 0;
    while start < text.len() {
        let cut = text[start..]
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| start + i)
            .unwrap_or(text.len());
        out.push((offset + start, offset + cut));
        start = cut;
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn push_chunk(chunks: &mut Vec<Chunk>, source: &Path, text: &str) {
    let index = chunks.len();
    chunks.push(make_chunk(source, index, text));
}

fn make_chunk(source: &Path, index: usize, text: &str) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Chunk {
        id: Uuid::new_v4().to_string(),
        source: source.to_path_buf(),
        chunk_index: index,
        text: text.to_string(),
        hash,
    }
}
