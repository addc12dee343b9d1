//! `config` reaches `nic` only through `require!(nic from nic)`. Nothing in
//! this file names the `nic` crate.

use config::Settings;

#[test]
fn required_unit_is_linked() {
    assert!(config::validate(&Settings::DEFAULT));

    let nic = fw_object::find("nic").expect("nic linked in through config");
    assert_eq!(nic.name(), "nic");
}

#[test]
fn both_units_are_listed_once() {
    let mut names: Vec<&str> = fw_object::objects().map(|o| o.name()).collect();
    names.sort_unstable();
    assert_eq!(names, ["config", "nic"]);
}

#[cfg(target_os = "linux")]
mod symbols {
    use fw_image::{markers, Binding, SymbolKind};

    fn own_markers() -> fw_image::MarkerReport {
        let path = std::env::current_exe().expect("test binary path");
        let bytes = std::fs::read(path).expect("readable test binary");
        markers(&bytes).expect("ELF with symbols")
    }

    #[test]
    fn need_marker_refers_to_the_linked_object() {
        let report = own_markers();

        let need = report
            .iter()
            .find(|s| s.name == "need_nic")
            .expect("need_nic in symbol table");
        assert_eq!(need.kind, SymbolKind::Need);
        assert_eq!(need.binding, Binding::Local);
        assert!(need.defined);

        let object = report
            .iter()
            .find(|s| s.name == "obj_nic")
            .expect("obj_nic in symbol table");
        assert_eq!(object.binding, Binding::Global);
        assert_eq!(need.target, Some(object.value));
    }

    #[test]
    fn both_object_markers_are_present() {
        let report = own_markers();
        let mut ids: Vec<&str> = report.objects().collect();
        ids.sort_unstable();
        ids.dedup();
        assert!(ids.contains(&"config"));
        assert!(ids.contains(&"nic"));
    }
}
