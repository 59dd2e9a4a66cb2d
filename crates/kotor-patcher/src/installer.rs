use crate::mods::install::InstallFolder;
use crate::mods::nss::ScriptCompiler;
use crate::mods::{Destination, OverrideType, PatchTarget};
use crate::store::{FileStore, ResourceStore};
use crate::{PatchLogger, PatcherConfig, PatcherMemory, Result};
use kotor_gff::{bytes_gff, read_gff};
use kotor_ssf::SoundSet;
use kotor_tlk::Talktable;
use kotor_twoda::TwoDA;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// The folder a mod ships in: the one holding its `tslpatchdata` folder.
fn mod_root(mod_path: &Path) -> &Path {
    mod_path
        .ancestors()
        .find(|dir| dir.join("tslpatchdata").is_dir())
        .unwrap_or(mod_path)
}

/// `old_<name>`, or `old_<stem> (<n>).<ext>` for the `n`th attempt.
fn renamed(filename: &str, attempt: usize) -> String {
    if attempt < 2 {
        return format!("old_{}", filename);
    }
    match filename.rsplit_once('.') {
        Some((stem, extension)) => format!("old_{} ({}).{}", stem, attempt, extension),
        None => format!("old_{} ({})", filename, attempt),
    }
}

/// Runs a [`PatcherConfig`] against a game installation.
///
/// Resources are patched one at a time, in a fixed order: the talk table, plain file
/// installs, 2DA tables, sound sets, GFF resources, scripts, and finally compiled script
/// patches. A resource that cannot be read, patched or written is logged as an error and
/// skipped; the install always runs to the end.
pub struct ModInstaller<S: ResourceStore = FileStore> {
    store: S,
    logger: PatchLogger,
    compiler: Option<Box<dyn ScriptCompiler>>,
}

impl ModInstaller<FileStore> {
    /// Install the mod in `mod_path` into the game in `game_path`.
    pub fn new(mod_path: impl Into<PathBuf>, game_path: impl Into<PathBuf>) -> Self {
        Self::with_store(FileStore::new(mod_path, game_path))
    }

    /// Write patched resources below `output_path` instead of the game folder.
    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.store = self.store.with_output_path(output_path);
        self
    }

    /// Copy every game file into `backup/<timestamp>` next to the mod before it is first
    /// overwritten.
    ///
    /// A leftover `uninstall` folder from an earlier install is removed, since it no longer
    /// matches the game.
    pub fn with_backups(mut self) -> Self {
        let root = mod_root(self.store.mod_path()).to_path_buf();
        let uninstall = root.join("uninstall");
        if uninstall.is_dir() {
            if let Err(err) = fs::remove_dir_all(&uninstall) {
                self.logger
                    .add_warning(format!("Could not initialize backup folder: {}", err));
            }
        }
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        let backup_path = root.join("backup").join(timestamp.to_string());
        self.logger.add_note(format!(
            "Using backup directory: '{}'",
            backup_path.display()
        ));
        self.store = self.store.with_backup_path(backup_path);
        self
    }
}

impl<S: ResourceStore> ModInstaller<S> {
    /// Install through a custom resource store.
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            logger: PatchLogger::new(),
            compiler: None,
        }
    }

    /// Record progress into `logger`.
    pub fn with_logger(mut self, logger: PatchLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Compile scripts with `compiler`. Without one, script patches are skipped.
    pub fn with_compiler(mut self, compiler: impl ScriptCompiler + 'static) -> Self {
        self.compiler = Some(Box::new(compiler));
        self
    }

    /// The progress log.
    pub fn logger(&self) -> &PatchLogger {
        &self.logger
    }

    /// The resource store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give up the installer, keeping its store and log.
    pub fn into_parts(self) -> (S, PatchLogger) {
        (self.store, self.logger)
    }

    /// Run every patch in `config`. Returns the token memory as it was at the end of the run.
    pub fn install(&mut self, config: &PatcherConfig) -> PatcherMemory {
        let mut memory = PatcherMemory::new();

        if !config.patches_tlk.modifiers.is_empty() {
            let target = PatchTarget::new(config.patches_tlk.filename.as_str())
                .with_destination(Destination::Folder(".".to_string()));
            self.logger.add_note(format!(
                "Applying {} patches to '{}'...",
                config.patches_tlk.modifiers.len(),
                target.saveas
            ));
            self.run_patch(&target, &mut memory, |data, memory, logger| {
                let mut dialog = Talktable::read_from(Cursor::new(data))?;
                config.patches_tlk.apply(&mut dialog, memory, logger);
                let mut bytes = vec![];
                dialog.write_to(&mut bytes)?;
                Ok(bytes)
            });
        }

        for folder in &config.files_to_install() {
            self.install_folder(folder);
        }

        for patch in &config.patches_2da {
            self.logger
                .add_note(format!("Patching '{}'...", patch.target.saveas));
            let done = self.run_patch(&patch.target, &mut memory, |data, memory, logger| {
                let mut twoda = TwoDA::read_from(data)?;
                patch.apply(&mut twoda, memory, logger);
                Ok(twoda.to_bytes()?)
            });
            self.complete(done);
        }

        for patch in &config.patches_ssf {
            self.logger
                .add_note(format!("Patching '{}'...", patch.target.saveas));
            let done = self.run_patch(&patch.target, &mut memory, |data, memory, logger| {
                let mut ssf = SoundSet::read_from(Cursor::new(data))?;
                patch.apply(&mut ssf, memory, logger);
                let mut bytes = vec![];
                ssf.write_to(&mut bytes)?;
                Ok(bytes)
            });
            self.complete(done);
        }

        for patch in &config.patches_gff {
            self.logger.add_note(format!(
                "Patching '{}' in '{}'...",
                patch.target.saveas, patch.target.destination
            ));
            let done = self.run_patch(&patch.target, &mut memory, |data, memory, logger| {
                let mut gff = read_gff(data)?;
                patch.apply(&mut gff, memory, logger);
                Ok(bytes_gff(&gff)?)
            });
            self.complete(done);
        }

        let compiler = self.compiler.take();
        for patch in &config.patches_nss {
            let compiler = match &compiler {
                Some(compiler) => compiler.as_ref(),
                None => {
                    self.logger.add_error(format!(
                        "Could not compile '{}': no script compiler is configured",
                        patch.target.sourcefile
                    ));
                    continue;
                }
            };
            let done = self.run_patch(&patch.target, &mut memory, |data, memory, logger| {
                patch.apply(data, memory, compiler, logger)
            });
            self.complete(done);
        }
        self.compiler = compiler;

        for patch in &config.patches_ncs {
            let done = self.run_patch(&patch.target, &mut memory, |data, memory, logger| {
                let mut ncs = data.to_vec();
                patch.apply(&mut ncs, memory, logger)?;
                Ok(ncs)
            });
            self.complete(done);
        }

        let errors = self.logger.errors().count();
        let warnings = self.logger.warnings().count();
        self.logger.add_note(format!(
            "Completed {} of {} patches with {} errors and {} warnings.",
            self.logger.patches_completed(),
            config.patch_count(),
            errors,
            warnings
        ));
        memory
    }

    fn complete(&mut self, done: bool) {
        if done {
            self.logger.complete_patch();
        }
    }

    /// Find the data a patch starts from.
    ///
    /// A replacing patch starts from the mod's copy of the file. Otherwise the copy at the
    /// destination is patched, falling back to the mod's copy when the destination lacks it.
    fn load_base(&self, target: &PatchTarget) -> Result<Option<Vec<u8>>> {
        if target.replace_file {
            return self.store.fetch_mod_file(&target.sourcefile);
        }
        match self.store.fetch(&target.destination, &target.saveas)? {
            Some(data) => Ok(Some(data)),
            None => self.store.fetch_mod_file(&target.sourcefile),
        }
    }

    /// Load, patch and store one resource. Returns whether the patched resource was written.
    fn run_patch<F>(&mut self, target: &PatchTarget, memory: &mut PatcherMemory, patch: F) -> bool
    where
        F: FnOnce(&[u8], &mut PatcherMemory, &mut PatchLogger) -> Result<Vec<u8>>,
    {
        if !self.check_capsule(&target.destination, &target.sourcefile, "patch") {
            return false;
        }
        self.backup(&target.destination, &target.saveas);

        let base = match self.load_base(target) {
            Ok(Some(base)) => base,
            Ok(None) => {
                self.logger.add_error(format!(
                    "Didn't patch '{}' because it could not be found in '{}' or in the mod folder.",
                    target.saveas, target.destination
                ));
                return false;
            }
            Err(err) => {
                self.logger
                    .add_error(format!("Could not read '{}': {}", target.sourcefile, err));
                return false;
            }
        };

        let patched = match patch(&base, memory, &mut self.logger) {
            Ok(patched) => patched,
            Err(err) => {
                self.logger
                    .add_error(format!("Could not patch '{}': {}", target.saveas, err));
                return false;
            }
        };

        if target.destination.is_capsule() {
            self.handle_override_type(target);
        }

        match self
            .store
            .store(&target.destination, &target.saveas, &patched, true)
        {
            Ok(_) => {
                self.logger.add_verbose(format!(
                    "Saved '{}' to '{}'",
                    target.saveas, target.destination
                ));
                true
            }
            Err(err) => {
                self.logger.add_error(format!(
                    "Could not write '{}' to '{}': {}",
                    target.saveas, target.destination, err
                ));
                false
            }
        }
    }

    /// Whether `destination` can be written to. Logs an error when it cannot.
    fn check_capsule(&mut self, destination: &Destination, filename: &str, action: &str) -> bool {
        match self.store.container_exists(destination) {
            Ok(true) => true,
            Ok(false) => {
                self.logger.add_error(format!(
                    "The capsule '{}' did not exist when attempting to {} '{}'. Skipping file...",
                    destination, action, filename
                ));
                false
            }
            Err(err) => {
                self.logger
                    .add_error(format!("Could not open '{}': {}", destination, err));
                false
            }
        }
    }

    /// Back up what is about to be overwritten. A failed backup does not stop the install.
    fn backup(&mut self, destination: &Destination, filename: &str) {
        match self.store.backup(destination, filename) {
            Ok(Some(copy)) => self
                .logger
                .add_verbose(format!("Backed up '{}' to '{}'", filename, copy)),
            Ok(None) => {}
            Err(err) => self.logger.add_warning(format!(
                "Could not back up '{}' from '{}': {}",
                filename, destination, err
            )),
        }
    }

    /// Deal with a copy in `Override` that would hide a resource patched into an archive.
    fn handle_override_type(&mut self, target: &PatchTarget) {
        if target.override_type == OverrideType::Ignore {
            return;
        }
        let override_dir = Destination::default();
        match self.store.exists(&override_dir, &target.saveas) {
            Ok(true) => {}
            Ok(false) => return,
            Err(err) => {
                self.logger.add_error(format!(
                    "Could not check '{}' in the Override folder: {}",
                    target.saveas, err
                ));
                return;
            }
        }

        if target.override_type == OverrideType::Warn {
            self.logger.add_warning(format!(
                "A resource named '{}' in the Override folder is shadowing this mod's changes in '{}'!",
                target.saveas, target.destination
            ));
            return;
        }

        let mut attempt = 1;
        let new_name = loop {
            let candidate = renamed(&target.saveas, attempt);
            match self.store.exists(&override_dir, &candidate) {
                Ok(false) => break candidate,
                Ok(true) => attempt += 1,
                Err(err) => {
                    self.logger.add_error(format!(
                        "Could not check '{}' in the Override folder: {}",
                        candidate, err
                    ));
                    return;
                }
            }
        };
        match self.store.rename(&override_dir, &target.saveas, &new_name) {
            Ok(_) => self.logger.add_warning(format!(
                "Renamed '{}' to '{}' in the Override folder so it does not shadow '{}'",
                target.saveas, new_name, target.destination
            )),
            Err(err) => self.logger.add_error(format!(
                "Could not rename '{}' to '{}' in the Override folder: {}",
                target.saveas, new_name, err
            )),
        }
    }

    fn install_folder(&mut self, folder: &InstallFolder) {
        for file in &folder.files {
            if !self.check_capsule(&folder.destination, &file.filename, "copy") {
                continue;
            }
            let data = match self.store.fetch_mod_file(&file.filename) {
                Ok(Some(data)) => data,
                Ok(None) => {
                    self.logger.add_error(format!(
                        "Could not find '{}' in the mod folder",
                        file.filename
                    ));
                    continue;
                }
                Err(err) => {
                    self.logger
                        .add_error(format!("Could not read '{}': {}", file.filename, err));
                    continue;
                }
            };
            if file.replace_existing {
                self.backup(&folder.destination, &file.filename);
            }
            match self.store.store(
                &folder.destination,
                &file.filename,
                &data,
                file.replace_existing,
            ) {
                Ok(true) => {
                    self.logger.add_note(format!(
                        "Copied '{}' to '{}'",
                        file.filename, folder.destination
                    ));
                    self.logger.complete_patch();
                }
                Ok(false) => self.logger.add_warning(format!(
                    "A file named '{}' already exists in '{}'. Skipping file...",
                    file.filename, folder.destination
                )),
                Err(err) => self.logger.add_error(format!(
                    "Could not copy '{}' to '{}': {}",
                    file.filename, folder.destination, err
                )),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_candidates() {
        assert_eq!(renamed("p_bastila.utc", 1), "old_p_bastila.utc");
        assert_eq!(renamed("p_bastila.utc", 2), "old_p_bastila (2).utc");
        assert_eq!(renamed("readme", 3), "old_readme (3)");
    }

    #[test]
    fn backups_go_next_to_the_mod() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("kotor-patcher-mod-{}", std::process::id()));
        let mod_path = root.join("tslpatchdata");
        fs::create_dir_all(&mod_path)?;
        fs::create_dir_all(root.join("uninstall"))?;
        assert_eq!(mod_root(&mod_path), root.as_path());

        let installer = ModInstaller::new(&mod_path, root.join("game")).with_backups();
        assert!(!root.join("uninstall").exists());
        let backup_path = installer.store().backup_path().map(Path::to_path_buf);
        assert_eq!(
            backup_path.as_deref().and_then(Path::parent),
            Some(root.join("backup").as_path())
        );
        assert!(installer
            .logger()
            .notes()
            .any(|note| note.starts_with("Using backup directory")));

        fs::remove_dir_all(&root)?;
        Ok(())
    }
}
