use crate::error::ConfigError;

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1_000,
            overlap: 200,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidChunking(
                "chunk_size must be nonzero".to_string(),
            ));
        }
        // Boundary cuts land in the second half of the window, so the
        // overlap must fit inside the shortest possible chunk.
        if self.overlap > self.chunk_size / 2 {
            return Err(ConfigError::InvalidChunking(format!(
                "overlap {} must not exceed half the chunk size {}",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Splits text into overlapping windows of at most `chunk_size` characters,
/// preferring paragraph, sentence, and word boundaries over hard cuts.
/// Deterministic: identical input yields byte-identical chunks.
#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    config: ChunkingConfig,
}

impl TextSplitter {
    pub fn new(config: ChunkingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.config.overlap
    }

    /// Whitespace-only input yields no chunks; input no longer than
    /// `chunk_size` yields exactly one. Consecutive chunks share exactly
    /// `overlap` characters, and the final chunk may be shorter.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= self.config.chunk_size {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut start = 0usize;

        loop {
            let window_end = (start + self.config.chunk_size).min(chars.len());
            let end = if window_end == chars.len() {
                window_end
            } else {
                cut_point(&chars, start, window_end)
            };

            chunks.push(chars[start..end].iter().collect());

            if end == chars.len() {
                break;
            }

            // Step back by the overlap; the guard keeps degenerate configs
            // from stalling.
            start = end.saturating_sub(self.config.overlap).max(start + 1);
        }

        chunks
    }
}

/// Latest natural boundary in the second half of the window, falling back
/// to a hard cut at the window edge when none exists.
fn cut_point(chars: &[char], start: usize, window_end: usize) -> usize {
    let floor = start + (window_end - start) / 2;

    find_break(chars, floor, window_end, is_paragraph_break)
        .or_else(|| find_break(chars, floor, window_end, is_sentence_end))
        .or_else(|| find_break(chars, floor, window_end, is_word_break))
        .unwrap_or(window_end)
}

fn find_break(
    chars: &[char],
    floor: usize,
    window_end: usize,
    predicate: fn(&[char], usize) -> bool,
) -> Option<usize> {
    (floor..window_end)
        .rev()
        .find(|&position| predicate(chars, position))
        .map(|position| position + 1)
}

fn is_paragraph_break(chars: &[char], position: usize) -> bool {
    position > 0 && chars[position] == '\n' && chars[position - 1] == '\n'
}

fn is_sentence_end(chars: &[char], position: usize) -> bool {
    matches!(chars[position], '.' | '!' | '?')
        && chars
            .get(position + 1)
            .is_some_and(|next| next.is_whitespace())
}

fn is_word_break(chars: &[char], position: usize) -> bool {
    chars[position].is_whitespace()
}
