//! Line classification: strips comments and blank lines, recognises section
//! headers and groups the remaining lines by section.

/// Marker that starts a comment, either for a whole line or inline.
pub const COMMENT_MARKER: char = ';';

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RawLine {
    pub number: usize, // 1-based line number in the source
    pub content: String,
}

impl RawLine {
    pub fn new(number: usize, content: &str) -> Self {
        Self {
            number,
            content: content.to_string(),
        }
    }

    pub fn is_comment(&self) -> bool {
        self.content.starts_with(COMMENT_MARKER)
    }
}

/// The trimmed data lines of one section, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    pub name: String,
    pub lines: Vec<RawLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedLines {
    /// Sections in order of first appearance. A repeated header appends to
    /// the section opened by its first occurrence.
    pub sections: Vec<RawSection>,
    /// Data lines seen while no section was open.
    pub orphans: Vec<RawLine>,
}

impl ClassifiedLines {
    pub fn section(&self, name: &str) -> Option<&RawSection> {
        self.sections.iter().find(|s| s.name == name)
    }
}

/// Returns the section name if `line` is a header such as `[ atoms ]`.
///
/// The line must start with `[` and contain a later `]`; the name is the
/// trimmed text up to the last `]`. Anything else is a data line.
pub fn section_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    let close = rest.rfind(']')?;
    if close == 0 {
        return None;
    }
    Some(rest[..close].trim())
}

/// Groups the lines of a topology file by section.
///
/// Blank lines and comment-only lines are discarded. Header lines switch the
/// current section and are not stored. A header whose name is blank (`[ ]`)
/// closes the current section, so the lines after it become orphans.
pub fn classify<I, S>(lines: I) -> ClassifiedLines
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut classified = ClassifiedLines::default();
    let mut current: Option<usize> = None;

    for (idx, line) in lines.into_iter().enumerate() {
        let trimmed = line.as_ref().trim();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
            continue;
        }

        if let Some(name) = section_header(trimmed) {
            current = if name.is_empty() {
                None
            } else {
                Some(open_section(&mut classified.sections, name))
            };
            continue;
        }

        let raw = RawLine::new(idx + 1, trimmed);
        match current {
            Some(pos) => classified.sections[pos].lines.push(raw),
            None => classified.orphans.push(raw),
        }
    }

    classified
}

fn open_section(sections: &mut Vec<RawSection>, name: &str) -> usize {
    if let Some(pos) = sections.iter().position(|s| s.name == name) {
        return pos;
    }
    sections.push(RawSection {
        name: name.to_string(),
        lines: Vec::new(),
    });
    sections.len() - 1
}
