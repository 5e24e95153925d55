//! Budget-constrained prompt assembly from ranked chunks.

use std::fmt::Write;

use crate::chunk::RetrievedChunk;

/// Rough characters-per-token estimate used for context window budgeting.
const CHARS_PER_TOKEN: usize = 4;

/// Default token budget for the assembled context.
pub const DEFAULT_MAX_TOKENS: usize = 150_000;

/// Render ranked chunks into one prompt-ready string.
///
/// Chunks are assumed pre-ranked, best first. Each becomes a file-reference
/// header plus a fenced code block; blocks are appended in order until the
/// next one would exceed the character budget, then assembly stops. Greedy
/// prefix, not best-fit: nothing after the first rejected block is
/// considered.
#[must_use]
pub fn context_for_llm(chunks: &[RetrievedChunk], max_tokens: usize) -> String {
    let budget = max_tokens * CHARS_PER_TOKEN;
    let mut used = 0;
    let mut sections: Vec<String> = Vec::new();

    for chunk in chunks {
        let block = render_block(chunk);
        if used + block.len() > budget {
            break;
        }
        used += block.len();
        sections.push(block);
    }

    sections.join("\n\n")
}

fn render_block(chunk: &RetrievedChunk) -> String {
    let mut block = String::new();
    block.push_str(&chunk.file_path);

    if let (Some(start), Some(end)) = (chunk.start_line, chunk.end_line)
        && start > 0
    {
        let _ = write!(block, ":{start}-{end}");
    }

    let language = chunk.language.as_deref().unwrap_or("");
    let _ = write!(block, "\n```{language}\n{}\n```", chunk.content);
    block
}
