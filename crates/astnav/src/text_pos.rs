use lsp_types::Position;

pub fn byte_offset_from_position(
    source: &str,
    position: Position,
) -> Option<usize> {
    let line_idx = position.line as usize;
    let mut lines = source.split('\n');
    let mut byte_offset = 0usize;

    for _ in 0..line_idx {
        let line = lines.next()?;
        byte_offset += line.len() + 1;
    }

    let line = lines.next()?;
    let mut utf16_offset = 0u32;
    let mut char_offset = 0usize;
    for ch in line.chars() {
        if utf16_offset >= position.character {
            break;
        }
        utf16_offset += ch.len_utf16() as u32;
        char_offset += ch.len_utf8();
    }

    Some(byte_offset + char_offset)
}

pub fn position_from_byte_offset(
    source: &str,
    byte_offset: usize,
) -> Position {
    let mut remaining = byte_offset.min(source.len());

    for (line_index, line) in source.split('\n').enumerate() {
        let line_len = line.len();
        if remaining <= line_len {
            let mut utf16_col = 0u32;
            let mut byte_count = 0usize;
            for ch in line.chars() {
                if byte_count >= remaining {
                    break;
                }
                utf16_col += ch.len_utf16() as u32;
                byte_count += ch.len_utf8();
            }
            return Position::new(line_index as u32, utf16_col);
        }
        remaining = remaining.saturating_sub(line_len + 1);
    }

    Position::new(0, 0)
}

/// Byte-offset line table. Used for whole-line arithmetic (disabled-region
/// block ranges); anything column-precise goes through the UTF-16-aware
/// conversions above instead.
pub struct LineIndex {
    line_starts: Box<[usize]>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut starts = Vec::with_capacity(source.len() / 40);
        starts.push(0usize);
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        Self {
            line_starts: starts.into_boxed_slice(),
            len: source.len(),
        }
    }

    pub fn line_col(
        &self,
        byte_offset: usize,
    ) -> (u32, u32) {
        let off = byte_offset;
        let line = match self.line_starts.binary_search(&off) {
            Ok(exact) => exact,
            Err(ins) => ins.saturating_sub(1),
        };
        let col = off.saturating_sub(self.line_starts[line]);
        (line as u32, col as u32)
    }

    /// Byte offset of the first character of `line`, clamped to the end of
    /// the source for out-of-range lines.
    pub fn line_start(
        &self,
        line: u32,
    ) -> usize {
        self.line_starts.get(line as usize).copied().unwrap_or(self.len)
    }

    /// Byte offset just past the last character of `line`, excluding the
    /// trailing newline.
    pub fn line_end(
        &self,
        line: u32,
    ) -> usize {
        match self.line_starts.get(line as usize + 1) {
            Some(next_start) => next_start.saturating_sub(1),
            None => self.len,
        }
    }

    pub fn offset(
        &self,
        line: u32,
        col: u32,
    ) -> usize {
        (self.line_start(line) + col as usize).min(self.len)
    }
}

#[cfg(test)]
#[path = "../tests/src/text_pos_tests.rs"]
mod tests;
