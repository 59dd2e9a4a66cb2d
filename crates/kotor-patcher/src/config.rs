use crate::mods::gff::ModificationsGff;
use crate::mods::install::{InstallFile, InstallFolder};
use crate::mods::ncs::ModificationsNcs;
use crate::mods::nss::ModificationsNss;
use crate::mods::ssf::ModificationsSsf;
use crate::mods::tlk::ModificationsTlk;
use crate::mods::twoda::Modifications2DA;
use crate::mods::Destination;

/// Script that external compilers need next to any script they compile.
const NWSCRIPT: &str = "nwscript.nss";

/// Everything one mod install does, in the order the installer runs it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PatcherConfig {
    /// Talk table entries to append or replace.
    pub patches_tlk: ModificationsTlk,
    /// Files copied as-is.
    pub install_list: Vec<InstallFolder>,
    /// 2DA tables to patch.
    pub patches_2da: Vec<Modifications2DA>,
    /// Sound sets to patch.
    pub patches_ssf: Vec<ModificationsSsf>,
    /// GFF resources to patch.
    pub patches_gff: Vec<ModificationsGff>,
    /// Scripts to compile.
    pub patches_nss: Vec<ModificationsNss>,
    /// Compiled scripts to patch.
    pub patches_ncs: Vec<ModificationsNcs>,
}

impl PatcherConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// The files an install copies: the install list, plus `nwscript.nss` into `Override`
    /// whenever there are scripts to compile.
    pub fn files_to_install(&self) -> Vec<InstallFolder> {
        let mut install_list = self.install_list.clone();
        if !self.patches_nss.is_empty() {
            add_nwscript(&mut install_list);
        }
        install_list
    }

    /// The number of patches an install performs when everything succeeds.
    ///
    /// Talk table entries and copied files count one each; every other resource counts once,
    /// however many instructions it has.
    pub fn patch_count(&self) -> usize {
        self.patches_tlk.modifiers.len()
            + self
                .files_to_install()
                .iter()
                .map(|folder| folder.files.len())
                .sum::<usize>()
            + self.patches_2da.len()
            + self.patches_ssf.len()
            + self.patches_gff.len()
            + self.patches_nss.len()
            + self.patches_ncs.len()
    }
}

/// Make sure `nwscript.nss` is installed to `Override` alongside the scripts.
fn add_nwscript(install_list: &mut Vec<InstallFolder>) {
    let override_dir = Destination::default();
    let folder = match install_list
        .iter_mut()
        .position(|folder| folder.destination.path().eq_ignore_ascii_case(override_dir.path()))
    {
        Some(index) => &mut install_list[index],
        None => {
            install_list.push(InstallFolder::new(override_dir.path()));
            let last = install_list.len() - 1;
            &mut install_list[last]
        }
    };
    if !folder.contains(NWSCRIPT) {
        folder.files.push(InstallFile::new(NWSCRIPT, true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mods::tlk::ModifyTlk;
    use crate::mods::PatchTarget;

    #[test]
    fn counts_patches() {
        let mut config = PatcherConfig::new();
        assert_eq!(config.patch_count(), 0);
        config.patches_tlk.modifiers.push(ModifyTlk::append(0, "a", ""));
        config.patches_tlk.modifiers.push(ModifyTlk::append(1, "b", ""));
        config
            .install_list
            .push(InstallFolder::new("Override").file("a.tga", false).file("b.tga", true));
        config
            .patches_2da
            .push(Modifications2DA::new(PatchTarget::new("spells.2da")));
        config
            .patches_nss
            .push(ModificationsNss::new("k_mod.nss"));
        // The script also installs nwscript.nss.
        assert_eq!(config.patch_count(), 7);

        config.install_list[0] = config.install_list[0].clone().file("NWScript.nss", true);
        assert_eq!(config.patch_count(), 7);
    }

    #[test]
    fn nwscript_added_once() {
        let mut list = vec![InstallFolder::new("streamwaves").file("a.wav", false)];
        add_nwscript(&mut list);
        add_nwscript(&mut list);
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].destination.path(), "Override");
        assert_eq!(list[1].files.len(), 1);

        let mut list = vec![InstallFolder::new("override").file("nwscript.nss", false)];
        add_nwscript(&mut list);
        assert_eq!(list[0].files.len(), 1);
    }
}
