use regex::Regex;

use crate::Error;

/// Which side of the anchor a new region goes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// On the line before the one where the match starts
    Before,
    /// On the line after the one where the match ends
    After,
}

/// Where a region is created in a file that has none yet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Anchor {
    pattern: String,
    placement: Placement,
    nested: bool,
    last: bool,
}

/// A line position plus the indentation of what is inserted there
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Insertion {
    pub line: usize,
    pub indent: String,
}

const INDENT_UNIT: &str = "    ";

impl Anchor {
    pub fn before(pattern: impl Into<String>) -> Self {
        Self::new(pattern, Placement::Before)
    }

    pub fn after(pattern: impl Into<String>) -> Self {
        Self::new(pattern, Placement::After)
    }

    fn new(pattern: impl Into<String>, placement: Placement) -> Self {
        Self {
            pattern: pattern.into(),
            placement,
            nested: false,
            last: false,
        }
    }

    /// Indent the region one level deeper than the anchor line
    pub fn nested(mut self) -> Self {
        self.nested = true;
        self
    }

    /// Use the last match instead of the first
    pub fn last(mut self) -> Self {
        self.last = true;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Find where the region goes in `content`, `None` when nothing matches
    pub fn locate(&self, content: &str) -> Result<Option<Insertion>, Error> {
        let regex = Regex::new(&self.pattern).map_err(|e| Error::InvalidAnchor {
            pattern: self.pattern.clone(),
            reason: e.to_string(),
        })?;
        let found = if self.last {
            regex.find_iter(content).last()
        } else {
            regex.find(content)
        };
        let Some(found) = found else {
            return Ok(None);
        };

        let offset = match self.placement {
            Placement::Before => found.start(),
            Placement::After => found.end().saturating_sub(1).max(found.start()),
        };
        let anchor_line = content[..offset].matches('\n').count();
        let line_text = content.lines().nth(anchor_line).unwrap_or_default();
        let mut indent: String = line_text
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect();
        if self.nested {
            indent.push_str(INDENT_UNIT);
        }
        let line = match self.placement {
            Placement::Before => anchor_line,
            Placement::After => anchor_line + 1,
        };
        Ok(Some(Insertion { line, indent }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SEEDER: &str = "class PermissionSeeder\n{\n    public function run(): void\n    {\n        $permissions = [\n            'users.manage',\n        ];\n    }\n}\n";

    #[test]
    fn after_nested() {
        let anchor = Anchor::after(r"\$permissions\s*=\s*\[").nested();
        assert_eq!(
            anchor.locate(SEEDER).unwrap(),
            Some(Insertion {
                line: 5,
                indent: "            ".to_owned()
            })
        );
    }

    #[test]
    fn before_last_match() {
        let anchor = Anchor::before(r"(?m)^\}[ \t]*$").last().nested();
        assert_eq!(
            anchor.locate(SEEDER).unwrap(),
            Some(Insertion {
                line: 8,
                indent: "    ".to_owned()
            })
        );
    }

    #[test]
    fn missing_anchor_and_bad_pattern() {
        assert_eq!(Anchor::after("nowhere").locate(SEEDER).unwrap(), None);
        assert!(matches!(
            Anchor::after("(unclosed").locate(SEEDER),
            Err(Error::InvalidAnchor { .. })
        ));
    }
}
