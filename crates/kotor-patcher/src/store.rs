//! Where resources are read from and written to during an install.

use crate::mods::Destination;
use crate::{PatchError, Result};
use kotor_erf::{Erf, ResourceIdentifier};
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Access to the files a mod supplies and to the game installation it patches.
pub trait ResourceStore {
    /// Read a file supplied by the mod. Returns `None` if the mod does not have it.
    fn fetch_mod_file(&self, filename: &str) -> Result<Option<Vec<u8>>>;

    /// Read a resource from a folder or archive of the game. Returns `None` if it does not
    /// exist.
    fn fetch(&self, destination: &Destination, filename: &str) -> Result<Option<Vec<u8>>>;

    /// Write a resource into a folder or archive of the game.
    ///
    /// An existing resource is only overwritten when `replace` is set. Returns whether the
    /// resource was written. Folders are created as needed, but writing into an archive that
    /// does not exist fails with [`PatchError::MissingCapsule`].
    fn store(
        &mut self,
        destination: &Destination,
        filename: &str,
        data: &[u8],
        replace: bool,
    ) -> Result<bool>;

    /// Whether a resource exists in a folder or archive of the game.
    fn exists(&self, destination: &Destination, filename: &str) -> Result<bool> {
        Ok(self.fetch(destination, filename)?.is_some())
    }

    /// Whether resources can be written to `destination`. Folders always can.
    fn container_exists(&self, destination: &Destination) -> Result<bool>;

    /// Rename a resource within a folder or archive. Returns `false` if it does not exist.
    fn rename(&mut self, destination: &Destination, from: &str, to: &str) -> Result<bool>;

    /// Keep a copy of what is about to be overwritten at `destination`.
    ///
    /// Each file or archive is copied at most once per install. Returns a description of where
    /// the copy went, or `None` if nothing was copied.
    fn backup(&mut self, _destination: &Destination, _filename: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Find `name` in `dir`, ignoring ASCII case.
fn find_case_insensitive(dir: &Path, name: &str) -> io::Result<Option<PathBuf>> {
    let exact = dir.join(name);
    if exact.exists() {
        return Ok(Some(exact));
    }
    if !dir.is_dir() {
        return Ok(None);
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().eq_ignore_ascii_case(name) {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}

/// Resolve a relative path one component at a time, ignoring ASCII case.
fn resolve_path(root: &Path, relative: &str) -> io::Result<Option<PathBuf>> {
    let mut path = root.to_path_buf();
    for component in relative.split('/').filter(|c| !c.is_empty() && *c != ".") {
        match find_case_insensitive(&path, component)? {
            Some(found) => path = found,
            None => return Ok(None),
        }
    }
    Ok(Some(path))
}

/// Resources on disk: a mod folder to read from, and a game folder to patch.
#[derive(Debug, Clone)]
pub struct FileStore {
    mod_path: PathBuf,
    game_path: PathBuf,
    output_path: PathBuf,
    backup_path: Option<PathBuf>,
    backed_up: HashSet<PathBuf>,
}

impl FileStore {
    /// Read mod files from `mod_path`, and patch the game at `game_path` in place.
    pub fn new(mod_path: impl Into<PathBuf>, game_path: impl Into<PathBuf>) -> Self {
        let game_path = game_path.into();
        Self {
            mod_path: mod_path.into(),
            output_path: game_path.clone(),
            game_path,
            backup_path: None,
            backed_up: HashSet::new(),
        }
    }

    /// Copy game files into `backup_path` before they are first overwritten.
    pub fn with_backup_path(mut self, backup_path: impl Into<PathBuf>) -> Self {
        self.backup_path = Some(backup_path.into());
        self
    }

    /// The folder mod files are read from.
    pub fn mod_path(&self) -> &Path {
        &self.mod_path
    }

    /// The folder backups are written to, if backups are enabled.
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup_path.as_deref()
    }

    /// Write patched resources below `output_path` instead of the game folder.
    ///
    /// Resources are still read from the game folder when the output folder lacks them.
    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    fn read_archive(path: &Path) -> Result<Erf> {
        let mut input = BufReader::new(File::open(path)?);
        Ok(Erf::read_from(&mut input)?)
    }

    /// Find the archive for `destination`, preferring the output folder over the game.
    fn find_capsule(&self, destination: &Destination) -> Result<Option<PathBuf>> {
        for root in [&self.output_path, &self.game_path] {
            if let Some(path) = resolve_path(root, destination.path())? {
                if path.is_file() {
                    return Ok(Some(path));
                }
            }
        }
        Ok(None)
    }

    fn fetch_from(root: &Path, destination: &Destination, filename: &str) -> Result<Option<Vec<u8>>> {
        let path = match resolve_path(root, destination.path())? {
            Some(path) => path,
            None => return Ok(None),
        };
        match destination {
            Destination::Folder(_) => match find_case_insensitive(&path, filename)? {
                Some(file) => Ok(Some(fs::read(file)?)),
                None => Ok(None),
            },
            Destination::Capsule(_) => {
                if !path.is_file() {
                    return Ok(None);
                }
                let ident = ResourceIdentifier::from_filename(filename)?;
                Ok(Self::read_archive(&path)?.get(&ident).map(<[u8]>::to_vec))
            }
        }
    }
}

impl ResourceStore for FileStore {
    fn fetch_mod_file(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        match resolve_path(&self.mod_path, &filename.replace('\\', "/"))? {
            Some(path) if path.is_file() => Ok(Some(fs::read(path)?)),
            _ => Ok(None),
        }
    }

    fn fetch(&self, destination: &Destination, filename: &str) -> Result<Option<Vec<u8>>> {
        if let Some(data) = Self::fetch_from(&self.output_path, destination, filename)? {
            return Ok(Some(data));
        }
        if self.output_path != self.game_path {
            return Self::fetch_from(&self.game_path, destination, filename);
        }
        Ok(None)
    }

    fn store(
        &mut self,
        destination: &Destination,
        filename: &str,
        data: &[u8],
        replace: bool,
    ) -> Result<bool> {
        let path = match resolve_path(&self.output_path, destination.path())? {
            Some(path) => path,
            None => self.output_path.join(destination.path()),
        };
        match destination {
            Destination::Folder(_) => {
                fs::create_dir_all(&path)?;
                let target = find_case_insensitive(&path, filename)?;
                if target.is_some() && !replace {
                    return Ok(false);
                }
                let target = target.unwrap_or_else(|| path.join(filename));
                log::debug!("writing {}", target.display());
                fs::write(target, data)?;
            }
            Destination::Capsule(capsule) => {
                let ident = ResourceIdentifier::from_filename(filename)?;
                let source = self
                    .find_capsule(destination)?
                    .ok_or_else(|| PatchError::MissingCapsule(capsule.clone()))?;
                let mut erf = Self::read_archive(&source)?;
                if erf.contains(&ident) && !replace {
                    return Ok(false);
                }
                erf.set(ident, data.to_vec());
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                log::debug!("writing {} into {}", filename, path.display());
                let mut output = BufWriter::new(File::create(&path)?);
                erf.write_to(&mut output)?;
            }
        }
        Ok(true)
    }

    fn container_exists(&self, destination: &Destination) -> Result<bool> {
        match destination {
            Destination::Folder(_) => Ok(true),
            Destination::Capsule(_) => Ok(self.find_capsule(destination)?.is_some()),
        }
    }

    fn rename(&mut self, destination: &Destination, from: &str, to: &str) -> Result<bool> {
        let path = match resolve_path(&self.output_path, destination.path())? {
            Some(path) => path,
            None => return Ok(false),
        };
        match destination {
            Destination::Folder(_) => match find_case_insensitive(&path, from)? {
                Some(source) => {
                    log::debug!("renaming {} to {}", source.display(), to);
                    fs::rename(source, path.join(to))?;
                    Ok(true)
                }
                None => Ok(false),
            },
            Destination::Capsule(_) => {
                if !path.is_file() {
                    return Ok(false);
                }
                let mut erf = Self::read_archive(&path)?;
                let data = match erf.remove(&ResourceIdentifier::from_filename(from)?) {
                    Some(data) => data,
                    None => return Ok(false),
                };
                erf.set(ResourceIdentifier::from_filename(to)?, data);
                let mut output = BufWriter::new(File::create(&path)?);
                erf.write_to(&mut output)?;
                Ok(true)
            }
        }
    }

    fn backup(&mut self, destination: &Destination, filename: &str) -> Result<Option<String>> {
        let backup_path = match &self.backup_path {
            Some(backup_path) => backup_path,
            None => return Ok(None),
        };
        // Archives are backed up whole, next to their folder in the backup.
        let (source, target) = match destination {
            Destination::Folder(folder) => {
                let source = match resolve_path(&self.output_path, folder)? {
                    Some(dir) => find_case_insensitive(&dir, filename)?,
                    None => None,
                };
                (source, backup_path.join(folder).join(filename))
            }
            Destination::Capsule(capsule) => (
                resolve_path(&self.output_path, capsule)?.filter(|path| path.is_file()),
                backup_path.join(capsule),
            ),
        };
        let source = match source {
            Some(source) if !self.backed_up.contains(&source) => source,
            _ => return Ok(None),
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        log::debug!("backing up {} to {}", source.display(), target.display());
        fs::copy(&source, &target)?;
        self.backed_up.insert(source);
        Ok(Some(target.display().to_string()))
    }
}

/// Resources held in memory, for tests and dry runs.
///
/// Archives are not encoded: a capsule destination is just another namespace of files.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    mod_files: HashMap<String, Vec<u8>>,
    files: HashMap<(String, String), Vec<u8>>,
    capsules: HashSet<String>,
    backups: Option<HashMap<(String, String), Vec<u8>>>,
}

fn key(destination: &Destination, filename: &str) -> (String, String) {
    (
        destination.path().to_ascii_lowercase(),
        filename.to_ascii_lowercase(),
    )
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file the mod supplies.
    pub fn add_mod_file(&mut self, filename: &str, data: impl Into<Vec<u8>>) {
        self.mod_files
            .insert(filename.to_ascii_lowercase(), data.into());
    }

    /// Add a game resource. Adding a resource to an archive also creates the archive.
    pub fn add_file(&mut self, destination: &Destination, filename: &str, data: impl Into<Vec<u8>>) {
        if destination.is_capsule() {
            self.add_capsule(destination);
        }
        self.files.insert(key(destination, filename), data.into());
    }

    /// Add an empty archive.
    pub fn add_capsule(&mut self, destination: &Destination) {
        self.capsules
            .insert(destination.path().to_ascii_lowercase());
    }

    /// Keep a copy of every resource before it is first overwritten.
    pub fn with_backups(mut self) -> Self {
        self.backups = Some(HashMap::new());
        self
    }

    /// The backed up copy of a resource, if one was made.
    pub fn backup_of(&self, destination: &Destination, filename: &str) -> Option<&[u8]> {
        self.backups
            .as_ref()?
            .get(&key(destination, filename))
            .map(Vec::as_slice)
    }

    /// Get a game resource.
    pub fn get(&self, destination: &Destination, filename: &str) -> Option<&[u8]> {
        self.files
            .get(&key(destination, filename))
            .map(Vec::as_slice)
    }
}

impl ResourceStore for MemoryStore {
    fn fetch_mod_file(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.mod_files.get(&filename.to_ascii_lowercase()).cloned())
    }

    fn fetch(&self, destination: &Destination, filename: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.get(destination, filename).map(<[u8]>::to_vec))
    }

    fn store(
        &mut self,
        destination: &Destination,
        filename: &str,
        data: &[u8],
        replace: bool,
    ) -> Result<bool> {
        if !self.container_exists(destination)? {
            return Err(PatchError::MissingCapsule(destination.path().to_string()));
        }
        let key = key(destination, filename);
        if self.files.contains_key(&key) && !replace {
            return Ok(false);
        }
        self.files.insert(key, data.to_vec());
        Ok(true)
    }

    fn container_exists(&self, destination: &Destination) -> Result<bool> {
        Ok(!destination.is_capsule()
            || self
                .capsules
                .contains(&destination.path().to_ascii_lowercase()))
    }

    fn rename(&mut self, destination: &Destination, from: &str, to: &str) -> Result<bool> {
        match self.files.remove(&key(destination, from)) {
            Some(data) => {
                self.files.insert(key(destination, to), data);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn backup(&mut self, destination: &Destination, filename: &str) -> Result<Option<String>> {
        let backups = match &mut self.backups {
            Some(backups) => backups,
            None => return Ok(None),
        };
        let key = key(destination, filename);
        if backups.contains_key(&key) {
            return Ok(None);
        }
        match self.files.get(&key) {
            Some(data) => {
                backups.insert(key, data.clone());
                Ok(Some(format!("backup/{}/{}", destination, filename)))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kotor_erf::ErfType;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("kotor-patcher-{}-{}", name, std::process::id()))
    }

    #[test]
    fn memory_store_respects_replace() {
        let override_dir = Destination::default();
        let mut store = MemoryStore::new();
        assert!(store.store(&override_dir, "a.2da", b"1", false).unwrap());
        assert!(!store.store(&override_dir, "A.2DA", b"2", false).unwrap());
        assert_eq!(store.get(&override_dir, "a.2da"), Some(&b"1"[..]));
        assert!(store.store(&override_dir, "a.2da", b"3", true).unwrap());
        assert_eq!(store.fetch(&override_dir, "A.2da").unwrap(), Some(b"3".to_vec()));
        assert!(store.fetch(&Destination::parse("modules/x.mod"), "a.2da").unwrap().is_none());
    }

    #[test]
    fn memory_store_needs_capsules() {
        let capsule = Destination::parse("modules/x.mod");
        let mut store = MemoryStore::new();
        assert!(!store.container_exists(&capsule).unwrap());
        assert!(matches!(
            store.store(&capsule, "a.utc", b"1", true),
            Err(PatchError::MissingCapsule(_))
        ));
        store.add_capsule(&Destination::parse("Modules\\X.MOD"));
        assert!(store.container_exists(&capsule).unwrap());
        assert!(store.store(&capsule, "a.utc", b"1", true).unwrap());
    }

    #[test]
    fn memory_store_backs_up_once() {
        let override_dir = Destination::default();
        let mut store = MemoryStore::new().with_backups();
        store.add_file(&override_dir, "a.2da", b"old".to_vec());
        assert!(store.backup(&override_dir, "missing.2da").unwrap().is_none());
        assert!(store.backup(&override_dir, "a.2da").unwrap().is_some());
        store.store(&override_dir, "a.2da", b"new", true).unwrap();
        assert!(store.backup(&override_dir, "a.2da").unwrap().is_none());
        assert_eq!(store.backup_of(&override_dir, "A.2DA"), Some(&b"old"[..]));

        assert!(store.rename(&override_dir, "a.2da", "old_a.2da").unwrap());
        assert!(!store.rename(&override_dir, "a.2da", "old_a.2da").unwrap());
        assert_eq!(store.get(&override_dir, "old_a.2da"), Some(&b"new"[..]));
    }

    #[test]
    fn file_store_round_trip() -> anyhow::Result<()> {
        let root = scratch_dir("store");
        let mod_path = root.join("tslpatchdata");
        let game_path = root.join("game");
        fs::create_dir_all(&mod_path)?;
        fs::create_dir_all(game_path.join("Override"))?;
        fs::create_dir_all(game_path.join("modules"))?;
        fs::write(mod_path.join("Spells.2da"), b"mod")?;
        fs::write(game_path.join("Override").join("Existing.UTC"), b"game")?;

        let mut store = FileStore::new(&mod_path, &game_path);
        assert_eq!(store.fetch_mod_file("spells.2da")?, Some(b"mod".to_vec()));
        assert_eq!(store.fetch_mod_file("missing.2da")?, None);

        let override_dir = Destination::parse("override");
        assert_eq!(store.fetch(&override_dir, "existing.utc")?, Some(b"game".to_vec()));
        assert!(!store.store(&override_dir, "existing.utc", b"new", false)?);
        assert!(store.store(&override_dir, "existing.utc", b"new", true)?);
        assert_eq!(
            fs::read(game_path.join("Override").join("Existing.UTC"))?,
            b"new".to_vec()
        );

        let capsule = Destination::parse("modules\\test.mod");
        assert!(!store.container_exists(&capsule)?);
        assert!(matches!(
            store.store(&capsule, "p_bastila.utc", b"utc", false),
            Err(PatchError::MissingCapsule(_))
        ));
        assert!(!game_path.join("modules").join("test.mod").exists());

        let mut output = BufWriter::new(File::create(game_path.join("modules").join("test.mod"))?);
        Erf::new(ErfType::Mod).write_to(&mut output)?;
        drop(output);

        assert!(store.container_exists(&capsule)?);
        assert_eq!(store.fetch(&capsule, "p_bastila.utc")?, None);
        assert!(store.store(&capsule, "p_bastila.utc", b"utc", false)?);
        assert!(!store.store(&capsule, "p_bastila.utc", b"other", false)?);
        assert_eq!(store.fetch(&capsule, "P_Bastila.utc")?, Some(b"utc".to_vec()));

        fs::remove_dir_all(&root)?;
        Ok(())
    }

    #[test]
    fn file_store_backs_up_and_renames() -> anyhow::Result<()> {
        let root = scratch_dir("backup");
        let game_path = root.join("game");
        let backup_path = root.join("backup").join("1");
        fs::create_dir_all(game_path.join("Override"))?;
        fs::create_dir_all(game_path.join("modules"))?;
        fs::write(game_path.join("Override").join("Spells.2da"), b"old")?;
        let mut erf = Erf::new(ErfType::Mod);
        erf.set(ResourceIdentifier::from_filename("n_man.utc")?, b"utc".to_vec());
        let mut output = BufWriter::new(File::create(game_path.join("modules").join("a.mod"))?);
        erf.write_to(&mut output)?;
        drop(output);

        let mut store = FileStore::new(root.join("tslpatchdata"), &game_path)
            .with_backup_path(&backup_path);
        assert_eq!(store.backup_path(), Some(backup_path.as_path()));

        let override_dir = Destination::default();
        assert!(store.backup(&override_dir, "spells.2da")?.is_some());
        store.store(&override_dir, "spells.2da", b"new", true)?;
        assert!(store.backup(&override_dir, "spells.2da")?.is_none());
        assert_eq!(
            fs::read(backup_path.join("Override").join("spells.2da"))?,
            b"old".to_vec()
        );
        assert!(store.backup(&override_dir, "absent.2da")?.is_none());

        let capsule = Destination::parse("modules/a.mod");
        assert!(store.backup(&capsule, "n_man.utc")?.is_some());
        assert!(backup_path.join("modules").join("a.mod").is_file());

        assert!(store.rename(&override_dir, "SPELLS.2da", "old_spells.2da")?);
        assert!(game_path.join("Override").join("old_spells.2da").is_file());
        assert!(!store.exists(&override_dir, "spells.2da")?);
        assert!(!store.rename(&override_dir, "spells.2da", "old_spells.2da")?);

        fs::remove_dir_all(&root)?;
        Ok(())
    }
}
