/// First release where `TypeId::of` is usable in const contexts, `TypeInfo::new` turns const from it on
const CONST_TYPE_ID_SINCE: &str = "1.91.0";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rustc-check-cfg=cfg(const_type_id)");

    if version_check::is_min_version(CONST_TYPE_ID_SINCE).unwrap_or(false) {
        println!("cargo:rustc-cfg=const_type_id");
    }
}
