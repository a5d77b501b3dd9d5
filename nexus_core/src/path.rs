use std::path::Path;

pub const PACK_SEPARATOR: char = ':';

/// Given the domains root and a file inside it, returns the pack the file belongs to and the asset name.
///
/// For instance, with root `demos/domains`:
/// `demos/domains/core/models/Jazz Dancing.obj` becomes `("core:models", "Jazz Dancing")`
///
/// Files sitting directly in the root belong to no pack and yield `None`.
pub fn pack_and_name(root: &Path, file: &Path) -> Option<(String, String)> {
    let relative = file.strip_prefix(root).ok()?;
    let name = relative.file_stem()?.to_str()?.to_string();

    let segments = relative
        .parent()?
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;

    if segments.is_empty() {
        return None;
    }

    Some((segments.join(&PACK_SEPARATOR.to_string()), name))
}
