//! Writing rendered files and registering the module in the host project.

mod shared;

pub use shared::*;

use std::{
    fs,
    path::{Path, PathBuf},
};

use modforge::BuildPlan;
use tracing::{debug, info, instrument, warn};

use crate::{ArtifactKind, Error, OutputFile, Registration, RegistryFile, RenderOutput, Spliced};

/// Timestamp prefix of a new migration, `2025_01_31_120000`
const MIGRATION_TIMESTAMP: &str = "%Y_%m_%d_%H%M%S";

/// Locations of the shared files, relative to the project root
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub routes: PathBuf,
    pub permission_seeder: PathBuf,
    pub navigation: PathBuf,
    pub database_seeder: PathBuf,
    /// Where application models live, used for related models
    pub models_dir: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            routes: "routes/web.php".into(),
            permission_seeder: "database/seeders/PermissionSeeder.php".into(),
            navigation: "resources/js/config/navigation.ts".into(),
            database_seeder: "database/seeders/DatabaseSeeder.php".into(),
            models_dir: "app/Models".into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpliceStatus {
    Inserted,
    AlreadyPresent,
}

/// What happened to one shared-file entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpliceOutcome {
    pub file: PathBuf,
    pub key: String,
    pub status: SpliceStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarningReason {
    AnchorNotFound,
    FileNotFound,
}

/// An entry that could not be registered; the module still works once it
/// is wired by hand
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpliceWarning {
    pub file: PathBuf,
    pub key: String,
    pub reason: WarningReason,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Files created or overwritten, relative to the project root
    pub written: Vec<PathBuf>,
    pub splices: Vec<SpliceOutcome>,
    pub warnings: Vec<SpliceWarning>,
}

impl MaterializeReport {
    pub fn inserted(&self) -> usize {
        self.splices
            .iter()
            .filter(|splice| splice.status == SpliceStatus::Inserted)
            .count()
    }
}

#[derive(Clone, Debug)]
pub struct Materializer {
    root: PathBuf,
    layout: Layout,
    dry_run: bool,
}

impl Materializer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            layout: Layout::default(),
            dry_run: false,
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Compute everything, write nothing
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    #[instrument(skip_all, fields(module = %plan.names.model, dry_run = self.dry_run))]
    pub fn materialize(
        &self,
        plan: &BuildPlan,
        output: &RenderOutput,
    ) -> Result<MaterializeReport, Error> {
        let mut report = MaterializeReport::default();
        for file in &output.files {
            let path = self.target_path(file)?;
            self.write(&path, &file.content)?;
            report.written.push(path);
        }

        let mut pending: Vec<Registration> = registrations(plan, &self.layout);
        for accessor in reverse_accessors(plan) {
            let found = model_candidates(plan, &self.layout, &accessor.target)
                .into_iter()
                .find(|candidate| self.root.join(candidate).is_file());
            match found {
                Some(file) => pending.push(accessor.registration(file)),
                None => {
                    warn!("No model file for `{}`, skipping its accessor", accessor.target);
                    report.warnings.push(SpliceWarning {
                        file: self.layout.models_dir.join(format!("{}.php", accessor.target)),
                        key: accessor.entry.key,
                        reason: WarningReason::FileNotFound,
                    });
                }
            }
        }

        // one read and one write per shared file, in first-seen order
        let mut files: Vec<&Path> = Vec::new();
        for registration in &pending {
            if !files.contains(&registration.file.as_path()) {
                files.push(&registration.file);
            }
        }
        for file in files {
            let registrations: Vec<&Registration> = pending
                .iter()
                .filter(|registration| registration.file == file)
                .collect();
            self.splice_file(file, &registrations, &mut report)?;
        }

        info!(
            "{} files written, {} entries registered, {} warnings",
            report.written.len(),
            report.inserted(),
            report.warnings.len()
        );
        Ok(report)
    }

    /// Path of a rendered file, migrations keep the name of an earlier run
    fn target_path(&self, file: &OutputFile) -> Result<PathBuf, Error> {
        if file.kind != ArtifactKind::Migration {
            return Ok(file.path.clone());
        }
        let dir = file.path.parent().unwrap_or(Path::new(""));
        let name = file
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let pattern = self.root.join(dir).join(format!("*_{name}"));
        let existing = glob::glob(&pattern.to_string_lossy())
            .map_err(|e| Error::Config(e.to_string()))?
            .filter_map(Result::ok)
            .min();
        match existing.as_deref().and_then(Path::file_name) {
            Some(existing) => {
                debug!("Reusing migration `{}`", existing.to_string_lossy());
                Ok(dir.join(existing))
            }
            None => {
                let stamp = chrono::Local::now().format(MIGRATION_TIMESTAMP);
                Ok(dir.join(format!("{stamp}_{name}")))
            }
        }
    }

    fn write(&self, relative: &Path, content: &str) -> Result<(), Error> {
        if self.dry_run {
            info!("Would write `{}`", relative.display());
            return Ok(());
        }
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(&path, content).map_err(|e| Error::io(&path, e))?;
        info!("Wrote `{}`", relative.display());
        Ok(())
    }

    fn splice_file(
        &self,
        relative: &Path,
        registrations: &[&Registration],
        report: &mut MaterializeReport,
    ) -> Result<(), Error> {
        let path = self.root.join(relative);
        if !path.is_file() {
            warn!("Shared file `{}` not found", relative.display());
            report
                .warnings
                .extend(registrations.iter().map(|registration| SpliceWarning {
                    file: relative.to_owned(),
                    key: registration.entry.key.clone(),
                    reason: WarningReason::FileNotFound,
                }));
            return Ok(());
        }

        let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let mut file = RegistryFile::parse(&content);
        for registration in registrations {
            let key = registration.entry.key.clone();
            let status = match file.insert(registration)? {
                Spliced::Inserted => SpliceStatus::Inserted,
                Spliced::AlreadyPresent => SpliceStatus::AlreadyPresent,
                Spliced::AnchorNotFound => {
                    warn!(
                        "No anchor `{}` in `{}`, `{key}` not registered",
                        registration.anchor.pattern(),
                        relative.display()
                    );
                    report.warnings.push(SpliceWarning {
                        file: relative.to_owned(),
                        key,
                        reason: WarningReason::AnchorNotFound,
                    });
                    continue;
                }
            };
            report.splices.push(SpliceOutcome {
                file: relative.to_owned(),
                key,
                status,
            });
        }

        let updated = file.render();
        if updated == content || self.dry_run {
            return Ok(());
        }
        // keep a copy of the original until the new content is written
        let backup = path.with_extension(
            path.extension()
                .map(|ext| format!("{}.bak", ext.to_string_lossy()))
                .unwrap_or_else(|| "bak".to_owned()),
        );
        fs::copy(&path, &backup).map_err(|e| Error::io(&backup, e))?;
        fs::write(&path, updated).map_err(|e| Error::io(&path, e))?;
        fs::remove_file(&backup).map_err(|e| Error::io(&backup, e))?;
        info!("Registered module in `{}`", relative.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Renderer;
    use modforge::{GenerateOptions, PlanBuilder};
    use pretty_assertions::assert_eq;

    fn plan() -> BuildPlan {
        PlanBuilder::new(&GenerateOptions {
            display_name: "Ticket".into(),
            fields: "name".into(),
            ..Default::default()
        })
        .build()
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan();
        let output = Renderer::default().render(&plan);
        let report = Materializer::new(dir.path())
            .dry_run(true)
            .materialize(&plan, &output)
            .unwrap();
        assert_eq!(report.written.len(), output.files.len());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
        // no shared files in an empty project
        assert!(report
            .warnings
            .iter()
            .all(|warning| warning.reason == WarningReason::FileNotFound));
    }

    #[test]
    fn migration_name_is_stable_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let migrations = dir.path().join("database/migrations");
        fs::create_dir_all(&migrations).unwrap();
        fs::write(migrations.join("2024_05_01_090000_create_tickets_table.php"), "").unwrap();

        let plan = plan();
        let output = Renderer::default().render(&plan);
        let materializer = Materializer::new(dir.path());
        let migration = output.file(ArtifactKind::Migration).unwrap();
        assert_eq!(
            materializer.target_path(migration).unwrap(),
            PathBuf::from("database/migrations/2024_05_01_090000_create_tickets_table.php")
        );
    }

    #[test]
    fn new_migration_gets_a_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan();
        let output = Renderer::default().render(&plan);
        let migration = output.file(ArtifactKind::Migration).unwrap();
        let path = Materializer::new(dir.path()).target_path(migration).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("_create_tickets_table.php"));
        assert_eq!(name.len(), "2024_05_01_090000_create_tickets_table.php".len());
    }
}
