//! Idempotent registration of entries in hand-maintained project files.
//!
//! Entries are kept inside a marked region:
//!
//! ```text
//! // modforge:begin routes
//! // modforge:entry job-openings
//! Route::middleware(['auth', 'verified'])->resource('job-openings', ...);
//! // modforge:end routes
//! ```
//!
//! The region is created at an [`Anchor`] the first time, later entries are
//! appended before its end marker. An entry whose presence marker is already
//! found anywhere in the file is left alone, so hand-written registrations
//! are respected too.

mod anchor;

pub use anchor::*;

use std::path::PathBuf;

use tracing::debug;

use crate::Error;

/// Prefix of every marker comment
pub const MARKER_PREFIX: &str = "// modforge:";

/// How an existing registration is recognised
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Presence {
    /// The text occurs anywhere in the file
    Contains(String),
    /// The text occurs as a whole word, bounded only at the ends that are
    /// word characters
    Word(String),
}

impl Presence {
    pub fn found_in(&self, content: &str) -> bool {
        match self {
            Self::Contains(text) => content.contains(text.as_str()),
            Self::Word(word) => contains_word(content, word),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn contains_word(content: &str, word: &str) -> bool {
    let bounded_start = word.chars().next().is_some_and(is_word_char);
    let bounded_end = word.chars().next_back().is_some_and(is_word_char);
    content.match_indices(word).any(|(at, _)| {
        let before = content[..at].chars().next_back();
        let after = content[at + word.len()..].chars().next();
        !(bounded_start && before.is_some_and(is_word_char))
            && !(bounded_end && after.is_some_and(is_word_char))
    })
}

/// One registration inside a region
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub lines: Vec<String>,
    pub presence: Presence,
}

/// An entry destined for a region of a shared file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    /// Relative to the project root
    pub file: PathBuf,
    pub region: String,
    pub anchor: Anchor,
    pub entry: Entry,
}

/// Result of splicing one entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Spliced {
    Inserted,
    AlreadyPresent,
    /// The file has no region yet and the anchor was not found
    AnchorNotFound,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Region {
    begin: usize,
    end: usize,
    indent: String,
}

/// A shared file held as lines while entries are spliced in
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryFile {
    lines: Vec<String>,
    trailing_newline: bool,
}

fn begin_marker(region: &str) -> String {
    format!("{MARKER_PREFIX}begin {region}")
}

fn end_marker(region: &str) -> String {
    format!("{MARKER_PREFIX}end {region}")
}

fn entry_marker(key: &str) -> String {
    format!("{MARKER_PREFIX}entry {key}")
}

impl RegistryFile {
    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.lines().map(str::to_owned).collect(),
            trailing_newline: content.ends_with('\n') || content.is_empty(),
        }
    }

    pub fn render(&self) -> String {
        let mut content = self.lines.join("\n");
        if self.trailing_newline {
            content.push('\n');
        }
        content
    }

    fn region(&self, name: &str) -> Option<Region> {
        let (begin_text, end_text) = (begin_marker(name), end_marker(name));
        let begin = self
            .lines
            .iter()
            .position(|line| line.trim() == begin_text)?;
        let end = self.lines[begin..]
            .iter()
            .position(|line| line.trim() == end_text)?
            + begin;
        let indent = self.lines[begin]
            .chars()
            .take_while(|c| c.is_whitespace())
            .collect();
        Some(Region { begin, end, indent })
    }

    fn contains(&self, entry: &Entry) -> bool {
        let content = self.lines.join("\n");
        let marker = entry_marker(&entry.key);
        content.lines().any(|line| line.trim() == marker) || entry.presence.found_in(&content)
    }

    fn entry_lines(entry: &Entry, indent: &str) -> Vec<String> {
        std::iter::once(entry_marker(&entry.key))
            .chain(entry.lines.iter().cloned())
            .map(|line| {
                if line.is_empty() {
                    line
                } else {
                    format!("{indent}{line}")
                }
            })
            .collect()
    }

    /// Splice the entry of `registration` in, creating its region if needed
    pub fn insert(&mut self, registration: &Registration) -> Result<Spliced, Error> {
        let entry = &registration.entry;
        if self.contains(entry) {
            debug!("`{}` already registered", entry.key);
            return Ok(Spliced::AlreadyPresent);
        }

        if let Some(region) = self.region(&registration.region) {
            debug_assert!(region.begin < region.end);
            let lines = Self::entry_lines(entry, &region.indent);
            self.lines.splice(region.end..region.end, lines);
            return Ok(Spliced::Inserted);
        }

        let Some(insertion) = registration.anchor.locate(&self.render())? else {
            return Ok(Spliced::AnchorNotFound);
        };
        let indent = insertion.indent;
        let mut block = vec![format!("{indent}{}", begin_marker(&registration.region))];
        block.extend(Self::entry_lines(entry, &indent));
        block.push(format!("{indent}{}", end_marker(&registration.region)));
        let at = insertion.line.min(self.lines.len());
        self.lines.splice(at..at, block);
        Ok(Spliced::Inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const ROUTES: &str = indoc! {"
        <?php

        use Illuminate\\Support\\Facades\\Route;

        Route::get('/', fn () => inertia('welcome'))->name('home');

        require __DIR__.'/settings.php';
        require __DIR__.'/auth.php';
    "};

    fn route(key: &str) -> Registration {
        Registration {
            file: PathBuf::from("routes/web.php"),
            region: "routes".to_owned(),
            anchor: Anchor::before(r"(?m)^[ \t]*require\s+__DIR__\s*\.\s*'/(?:settings|auth)\.php';"),
            entry: Entry {
                key: key.to_owned(),
                lines: vec![format!("Route::resource('{key}', Controller::class);")],
                presence: Presence::Contains(format!("resource('{key}'")),
            },
        }
    }

    #[test]
    fn region_is_created_then_extended() {
        let mut file = RegistryFile::parse(ROUTES);
        assert_eq!(file.insert(&route("tickets")).unwrap(), Spliced::Inserted);
        assert_eq!(file.insert(&route("assets")).unwrap(), Spliced::Inserted);
        assert_eq!(
            file.render(),
            indoc! {"
                <?php

                use Illuminate\\Support\\Facades\\Route;

                Route::get('/', fn () => inertia('welcome'))->name('home');

                // modforge:begin routes
                // modforge:entry tickets
                Route::resource('tickets', Controller::class);
                // modforge:entry assets
                Route::resource('assets', Controller::class);
                // modforge:end routes
                require __DIR__.'/settings.php';
                require __DIR__.'/auth.php';
            "}
        );
    }

    #[test]
    fn second_insert_is_a_no_op() {
        let mut file = RegistryFile::parse(ROUTES);
        file.insert(&route("tickets")).unwrap();
        let once = file.render();
        assert_eq!(file.insert(&route("tickets")).unwrap(), Spliced::AlreadyPresent);
        assert_eq!(file.render(), once);
    }

    #[test]
    fn hand_written_registration_is_respected() {
        let content = format!("{ROUTES}Route::resource('tickets', TicketController::class);\n");
        let mut file = RegistryFile::parse(&content);
        assert_eq!(file.insert(&route("tickets")).unwrap(), Spliced::AlreadyPresent);
        assert_eq!(file.render(), content);
    }

    #[test]
    fn missing_anchor_is_reported() {
        let mut file = RegistryFile::parse("<?php\n");
        assert_eq!(file.insert(&route("tickets")).unwrap(), Spliced::AnchorNotFound);
        assert_eq!(file.render(), "<?php\n");
    }

    #[test]
    fn words_match_whole_identifiers() {
        let presence = Presence::Word("Users".to_owned());
        assert!(presence.found_in("import { LayoutGrid, Users } from 'lucide-react';"));
        assert!(!presence.found_in("import { UsersRound } from 'lucide-react';"));
    }

    #[test]
    fn trailing_punctuation_is_not_a_boundary() {
        let presence = Presence::Word("Ticket::factory(".to_owned());
        assert!(presence.found_in("\\App\\Models\\Ticket::factory(10)->create();"));
        assert!(presence.found_in("Ticket::factory()->count(10)->create();"));
        assert!(!presence.found_in("SupportTicket::factory(5)->create();"));
    }
}
