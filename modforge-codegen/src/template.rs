use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{ArtifactKind, Error, Placeholder};

/// Token delimiter, `%%modelName%%`
pub const DELIMITER: &str = "%%";

/// Where artifact templates are read from
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TemplateSource {
    /// The stubs compiled into the binary
    #[default]
    Embedded,
    /// Only the stubs found in a directory
    Directory(PathBuf),
    /// Stubs in a directory, falling back to the embedded ones
    Overlay(PathBuf),
}

impl TemplateSource {
    pub fn load(&self, kind: ArtifactKind) -> Result<Cow<'static, str>, Error> {
        match self {
            Self::Embedded => Ok(Cow::Borrowed(embedded(kind))),
            Self::Directory(dir) => read_stub(dir, kind)?
                .map(Cow::Owned)
                .ok_or_else(|| Error::TemplateNotFound(kind.stub_name().to_owned())),
            Self::Overlay(dir) => Ok(read_stub(dir, kind)?
                .map(Cow::Owned)
                .unwrap_or(Cow::Borrowed(embedded(kind)))),
        }
    }
}

fn read_stub(dir: &Path, kind: ArtifactKind) -> Result<Option<String>, Error> {
    let path = dir.join(kind.stub_name());
    if !path.is_file() {
        debug!("No stub at `{}`", path.display());
        return Ok(None);
    }
    fs::read_to_string(&path)
        .map(Some)
        .map_err(|e| Error::io(path, e))
}

fn embedded(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Migration => include_str!("../templates/migration.php.stub"),
        ArtifactKind::Model => include_str!("../templates/model.php.stub"),
        ArtifactKind::Controller => include_str!("../templates/controller.php.stub"),
        ArtifactKind::StoreRequest => include_str!("../templates/store_request.php.stub"),
        ArtifactKind::UpdateRequest => include_str!("../templates/update_request.php.stub"),
        ArtifactKind::Factory => include_str!("../templates/factory.php.stub"),
        ArtifactKind::IndexPage => include_str!("../templates/index.tsx.stub"),
        ArtifactKind::CreatePage => include_str!("../templates/create.tsx.stub"),
        ArtifactKind::EditPage => include_str!("../templates/edit.tsx.stub"),
        ArtifactKind::Types => include_str!("../templates/types.ts.stub"),
        ArtifactKind::DetailModal => include_str!("../templates/detail_modal.tsx.stub"),
        ArtifactKind::DetailPage => include_str!("../templates/detail_page.tsx.stub"),
    }
}

/// Replace every `%%token%%` of `template` with its resolved value
///
/// A token standing alone on its line is a block: its value is indented to
/// the token's column, and the line disappears when the value is empty.
/// Tokens that name no [`Placeholder`] are kept verbatim.
pub fn substitute<F>(template: &str, mut resolve: F) -> String
where
    F: FnMut(Placeholder) -> String,
{
    let mut output = String::with_capacity(template.len() * 2);
    for line in template.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        let trimmed = body.trim();
        let block = trimmed
            .strip_prefix(DELIMITER)
            .and_then(|rest| rest.strip_suffix(DELIMITER))
            .and_then(|name| parse_token(name));

        match block {
            Some(placeholder) => {
                let value = resolve(placeholder);
                if value.is_empty() {
                    continue;
                }
                let prefix = &body[..body.len() - body.trim_start().len()];
                output.push_str(&crate::util::indent(&value, prefix));
                output.push_str(&line[body.len()..]);
            }
            None => substitute_inline(line, &mut resolve, &mut output),
        }
    }
    output
}

fn substitute_inline<F>(line: &str, resolve: &mut F, output: &mut String)
where
    F: FnMut(Placeholder) -> String,
{
    let mut rest = line;
    while let Some(start) = rest.find(DELIMITER) {
        let after = &rest[start + DELIMITER.len()..];
        let Some(end) = after.find(DELIMITER) else {
            break;
        };
        output.push_str(&rest[..start]);
        match parse_token(&after[..end]) {
            Some(placeholder) => {
                output.push_str(&resolve(placeholder));
                rest = &after[end + DELIMITER.len()..];
            }
            None => {
                // keep the opening delimiter, the closing one may open a token
                output.push_str(DELIMITER);
                rest = after;
            }
        }
    }
    output.push_str(rest);
}

fn parse_token(name: &str) -> Option<Placeholder> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    let parsed = name.parse().ok();
    if parsed.is_none() {
        warn!("Unknown placeholder `{DELIMITER}{name}{DELIMITER}` left in place");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn block_tokens_are_indented_or_dropped() {
        let template = "return [\n    %%fillable%%\n    %%casts%%\n];\n";
        let output = substitute(template, |placeholder| match placeholder {
            Placeholder::Fillable => "'title',\n'status',".to_owned(),
            _ => String::new(),
        });
        assert_eq!(output, "return [\n    'title',\n    'status',\n];\n");
    }

    #[test]
    fn inline_tokens() {
        let output = substitute("class %%modelName%%Controller {}", |_| "Ticket".to_owned());
        assert_eq!(output, "class TicketController {}");
    }

    #[test]
    fn unknown_and_foreign_tokens_survive() {
        let template = "%%nope%% 100%% done %%modelName%%";
        let output = substitute(template, |_| "Ticket".to_owned());
        assert_eq!(output, "%%nope%% 100%% done Ticket");
    }

    #[test]
    fn every_artifact_has_an_embedded_stub() {
        use strum::IntoEnumIterator;
        for kind in ArtifactKind::iter() {
            let stub = TemplateSource::Embedded.load(kind).unwrap();
            assert!(stub.contains(DELIMITER), "{kind} has no placeholder");
        }
    }

    #[test]
    fn directory_source_reports_missing_stub() {
        let dir = tempfile::tempdir().unwrap();
        let source = TemplateSource::Directory(dir.path().to_owned());
        assert!(matches!(
            source.load(ArtifactKind::Model),
            Err(Error::TemplateNotFound(name)) if name == "model.php.stub"
        ));

        fs::write(dir.path().join("model.php.stub"), "custom %%modelName%%").unwrap();
        assert_eq!(source.load(ArtifactKind::Model).unwrap(), "custom %%modelName%%");

        let overlay = TemplateSource::Overlay(dir.path().to_owned());
        assert!(overlay.load(ArtifactKind::Factory).unwrap().contains("Factory"));
    }
}
