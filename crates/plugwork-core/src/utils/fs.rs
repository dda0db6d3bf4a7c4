use std::fs;
use std::path::Path;

/// Initializer module names that never hold plugins
const INITIALIZER_MODULES: [&str; 2] = ["__init__", "mod"];

/// Find the plugin module names in `dir`.
///
/// A module is a file (or a symlink to one) whose name ends with `suffix`;
/// its name is the file name without the suffix. Initializer modules are
/// left out. Yields nothing for a relative path, a path that is not a
/// directory, or a symlinked directory. Names are sorted.
pub fn find_modules_in_dir<P: AsRef<Path>>(dir: P, suffix: &str) -> Vec<String> {
    let dir = dir.as_ref();
    if !dir.is_absolute() {
        return Vec::new();
    }
    match fs::symlink_metadata(dir) {
        Ok(metadata) if metadata.is_dir() => {}
        _ => return Vec::new(),
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            log::debug!("cannot read module directory {}: {}", dir.display(), err);
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let file_name = entry.file_name().into_string().ok()?;
            let module = file_name.strip_suffix(suffix)?;
            if module.is_empty() || INITIALIZER_MODULES.contains(&module) {
                return None;
            }
            Some(module.to_string())
        })
        .collect();
    names.sort();
    names.dedup();
    names
}
