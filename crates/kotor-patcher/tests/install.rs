use kotor_gff::{bytes_gff, read_gff, FieldType, Gff};
use kotor_patcher::mods::gff::{AddField, FieldSource, ModificationsGff};
use kotor_patcher::mods::install::InstallFolder;
use kotor_patcher::mods::nss::ModificationsNss;
use kotor_patcher::mods::tlk::ModifyTlk;
use kotor_patcher::mods::twoda::{AddRow, Modifications2DA, RowValue};
use kotor_patcher::mods::{Destination, OverrideType, PatchTarget};
use kotor_patcher::{MemoryStore, ModInstaller, PatcherConfig};
use kotor_tlk::Talktable;
use kotor_twoda::TwoDA;
use std::io::Cursor;

fn dialog_bytes() -> Vec<u8> {
    let mut dialog = Talktable::new(0);
    dialog.add("Bad Strref", "");
    let mut bytes = vec![];
    dialog.write_to(&mut bytes).unwrap();
    bytes
}

fn appearance_bytes() -> Vec<u8> {
    let mut twoda = TwoDA::new(vec!["label", "race"]);
    twoda
        .add_row(None, vec![("label", "Bastila"), ("race", "P_BastilaBB")])
        .unwrap();
    twoda.to_bytes().unwrap()
}

fn creature_bytes() -> Vec<u8> {
    let mut gff = Gff::new(*b"UTC ");
    gff.root.set("Tag", "p_bastila");
    bytes_gff(&gff).unwrap()
}

fn game() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.add_file(&Destination::Folder(".".into()), "dialog.tlk", dialog_bytes());
    store.add_file(&Destination::default(), "appearance.2da", appearance_bytes());
    store.add_mod_file("p_newnpc.utc", creature_bytes());
    store
}

fn config() -> PatcherConfig {
    let mut config = PatcherConfig::new();
    config
        .patches_tlk
        .modifiers
        .push(ModifyTlk::append(0, "New NPC", ""));

    let mut appearance = Modifications2DA::new(PatchTarget::new("appearance.2da"));
    appearance.push(
        AddRow::new("new_npc", Some("label"), None)
            .cell("label", "NewNPC")
            .cell("race", RowValue::MemoryStr(0))
            .store(5, RowValue::RowIndex),
    );
    config.patches_2da.push(appearance);

    let mut creature = ModificationsGff::new(PatchTarget::new("p_newnpc.utc"));
    creature.modifiers = vec![
        AddField::new("", "Appearance_Type", FieldType::UInt16, FieldSource::Memory2DA(5)).into(),
        AddField::new("", "FirstName", FieldType::UInt32, FieldSource::MemoryStr(0)).into(),
    ];
    config.patches_gff.push(creature);
    config
}

#[test]
fn tokens_flow_between_resources() {
    let mut installer = ModInstaller::with_store(game());
    let memory = installer.install(&config());
    assert_eq!(memory.get_str(0).unwrap(), 1);
    assert_eq!(memory.get_2da(5).unwrap(), "1");

    let (store, logger) = installer.into_parts();
    assert_eq!(logger.errors().count(), 0);
    assert_eq!(logger.patches_completed(), 3);

    let dialog = store.get(&Destination::Folder(".".into()), "dialog.tlk").unwrap();
    let dialog = Talktable::read_from(Cursor::new(dialog)).unwrap();
    assert_eq!(dialog.len(), 2);
    assert_eq!(dialog.get(1).unwrap().text, "New NPC");

    let appearance = store.get(&Destination::default(), "appearance.2da").unwrap();
    let appearance = TwoDA::read_from(appearance).unwrap();
    assert_eq!(appearance.height(), 2);
    assert_eq!(appearance.get_cell(1, "race"), Some("1"));

    let creature = store.get(&Destination::default(), "p_newnpc.utc").unwrap();
    let creature = read_gff(creature).unwrap();
    assert_eq!(creature.root.get_u16("Appearance_Type"), Some(1));
    assert_eq!(creature.root.get_u32("FirstName"), Some(1));
    assert_eq!(creature.root.get_string("Tag").as_deref(), Some("p_bastila"));
}

#[test]
fn second_install_edits_exclusive_row() {
    let mut installer = ModInstaller::with_store(game());
    installer.install(&config());
    let (store, _) = installer.into_parts();

    let mut installer = ModInstaller::with_store(store);
    let memory = installer.install(&config());
    assert_eq!(memory.get_2da(5).unwrap(), "1");
    let appearance = installer
        .store()
        .get(&Destination::default(), "appearance.2da")
        .unwrap();
    assert_eq!(TwoDA::read_from(appearance).unwrap().height(), 2);
}

#[test]
fn missing_resource_is_skipped() {
    let mut config = config();
    config
        .patches_2da
        .push(Modifications2DA::new(PatchTarget::new("missing.2da")));
    let mut installer = ModInstaller::with_store(game());
    installer.install(&config);

    let logger = installer.logger();
    assert_eq!(logger.errors().count(), 1);
    assert!(logger.errors().any(|e| e.contains("missing.2da")));
    assert_eq!(logger.patches_completed(), 3);
}

#[test]
fn install_list_respects_existing_files() {
    let mut store = game();
    store.add_mod_file("g_w_blstrpstl01.uti", b"new".to_vec());
    store.add_mod_file("n_newnpc.wav", b"wave".to_vec());
    store.add_file(&Destination::default(), "g_w_blstrpstl01.uti", b"old".to_vec());

    let mut config = PatcherConfig::new();
    config.install_list.push(
        InstallFolder::new("Override")
            .file("g_w_blstrpstl01.uti", false)
            .file("n_newnpc.wav", false),
    );
    let mut installer = ModInstaller::with_store(store);
    installer.install(&config);

    let logger = installer.logger();
    assert_eq!(logger.warnings().count(), 1);
    assert_eq!(logger.patches_completed(), 1);
    let store = installer.store();
    assert_eq!(
        store.get(&Destination::default(), "g_w_blstrpstl01.uti"),
        Some(&b"old"[..])
    );
    assert_eq!(store.get(&Destination::default(), "n_newnpc.wav"), Some(&b"wave"[..]));
}

#[test]
fn scripts_need_a_compiler() {
    let mut store = game();
    store.add_mod_file("k_inc_npc.nss", b"int n = #2DAMEMORY5#;".to_vec());
    store.add_mod_file("nwscript.nss", b"// engine".to_vec());
    let mut config = config();
    config.patches_nss.push(ModificationsNss::new("k_inc_npc.nss"));

    let mut installer = ModInstaller::with_store(store.clone());
    installer.install(&config);
    assert!(installer
        .logger()
        .errors()
        .any(|e| e.contains("no script compiler")));
    assert!(installer.store().get(&Destination::default(), "k_inc_npc.ncs").is_none());
    assert!(installer.store().get(&Destination::default(), "nwscript.nss").is_some());

    let mut installer = ModInstaller::with_store(store).with_compiler(
        |_name: &str, source: &str| -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(source.as_bytes().to_vec())
        },
    );
    installer.install(&config);
    assert_eq!(installer.logger().errors().count(), 0);
    assert_eq!(
        installer.store().get(&Destination::default(), "k_inc_npc.ncs"),
        Some(&b"int n = 1;"[..])
    );
    // nwscript.nss counts as one of the patches.
    assert!(installer
        .logger()
        .notes()
        .any(|note| note.starts_with("Completed 5 of 5 patches")));
}

fn module() -> Destination {
    Destination::parse("modules/danm13.mod")
}

fn capsule_config(override_type: OverrideType) -> PatcherConfig {
    let mut config = PatcherConfig::new();
    let target = PatchTarget::new("p_newnpc.utc")
        .with_destination(module())
        .with_override_type(override_type);
    let mut creature = ModificationsGff::new(target);
    creature.modifiers = vec![AddField::new("", "Plot", FieldType::UInt8, 1u8).into()];
    config.patches_gff.push(creature);
    config
}

#[test]
fn missing_capsule_is_skipped() {
    let mut store = game();
    store.add_mod_file("n_newnpc.wav", b"wave".to_vec());
    let mut config = capsule_config(OverrideType::Ignore);
    config
        .install_list
        .push(InstallFolder::new("modules\\danm13.mod").file("n_newnpc.wav", true));

    let mut installer = ModInstaller::with_store(store.clone());
    installer.install(&config);
    let logger = installer.logger();
    assert_eq!(logger.errors().count(), 2);
    assert!(logger.errors().all(|e| e.contains("did not exist") && e.ends_with("Skipping file...")));
    assert_eq!(logger.patches_completed(), 0);
    assert!(installer.store().get(&module(), "p_newnpc.utc").is_none());

    store.add_capsule(&module());
    let mut installer = ModInstaller::with_store(store);
    installer.install(&config);
    assert_eq!(installer.logger().errors().count(), 0);
    assert_eq!(installer.logger().patches_completed(), 2);
    let creature = read_gff(installer.store().get(&module(), "p_newnpc.utc").unwrap()).unwrap();
    assert_eq!(creature.root.get_u8("Plot"), Some(1));
}

#[test]
fn override_copy_is_reported() {
    let mut store = game();
    store.add_capsule(&module());
    store.add_file(&Destination::default(), "p_newnpc.utc", b"shadow".to_vec());

    let mut installer = ModInstaller::with_store(store.clone());
    installer.install(&capsule_config(OverrideType::Ignore));
    assert_eq!(installer.logger().warnings().count(), 0);

    let mut installer = ModInstaller::with_store(store);
    installer.install(&capsule_config(OverrideType::Warn));
    let logger = installer.logger();
    assert_eq!(logger.warnings().count(), 1);
    assert!(logger.warnings().any(|w| w.contains("shadowing")));
    assert_eq!(
        installer.store().get(&Destination::default(), "p_newnpc.utc"),
        Some(&b"shadow"[..])
    );
    assert!(installer.store().get(&module(), "p_newnpc.utc").is_some());
}

#[test]
fn override_copy_is_renamed() {
    let mut store = game();
    store.add_capsule(&module());
    store.add_file(&Destination::default(), "p_newnpc.utc", b"shadow".to_vec());
    store.add_file(&Destination::default(), "old_p_newnpc.utc", b"older".to_vec());

    let mut installer = ModInstaller::with_store(store);
    installer.install(&capsule_config(OverrideType::Rename));
    assert_eq!(installer.logger().errors().count(), 0);
    let store = installer.store();
    assert!(store.get(&Destination::default(), "p_newnpc.utc").is_none());
    assert_eq!(
        store.get(&Destination::default(), "old_p_newnpc.utc"),
        Some(&b"older"[..])
    );
    assert_eq!(
        store.get(&Destination::default(), "old_p_newnpc (2).utc"),
        Some(&b"shadow"[..])
    );
    assert!(store.get(&module(), "p_newnpc.utc").is_some());
}

#[test]
fn overwritten_files_are_backed_up() {
    let mut installer = ModInstaller::with_store(game().with_backups());
    installer.install(&config());

    let store = installer.store();
    assert_eq!(
        store.backup_of(&Destination::default(), "appearance.2da"),
        Some(&appearance_bytes()[..])
    );
    assert_eq!(
        store.backup_of(&Destination::Folder(".".into()), "dialog.tlk"),
        Some(&dialog_bytes()[..])
    );
    assert!(store.backup_of(&Destination::default(), "p_newnpc.utc").is_none());
    assert_ne!(
        store.get(&Destination::default(), "appearance.2da"),
        Some(&appearance_bytes()[..])
    );
}
