use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};

// Fingerprints static/ so stylesheet URLs change whenever an asset does.
fn main() {
    println!("cargo:rerun-if-changed=static/");
    println!("cargo:rerun-if-changed=templates/");
    println!("cargo:rerun-if-changed=migrations/");

    let mut hasher = DefaultHasher::new();

    let mut assets: Vec<_> = fs::read_dir("static")
        .map(|dir| dir.filter_map(|e| e.ok()).collect())
        .unwrap_or_default();
    assets.sort_by_key(|e| e.file_name());

    for asset in assets {
        let path = asset.path();
        if let Ok(contents) = fs::read(&path) {
            asset.file_name().to_string_lossy().hash(&mut hasher);
            contents.hash(&mut hasher);
        }
    }

    let hash = format!("{:016x}", hasher.finish());
    println!("cargo:rustc-env=STATIC_HASH={}", &hash[..8]);
}
