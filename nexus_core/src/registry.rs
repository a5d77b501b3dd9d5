use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::animation::AnimationMapComponent;
use crate::assets::{Asset, AssetKind};
use crate::component::{MeshComponent, TextureComponent};
use crate::error::{LoadError, Result, SceneError};
use crate::path::{self as path_pkg, PACK_SEPARATOR};

/// Catalog of assets addressed by qualified references such as `core:models:Jazz Dancing`.
pub trait AssetRegistry {
    fn get(&self, reference: &str, kind: AssetKind) -> Result<&Asset>;

    fn mesh(&self, reference: &str) -> Result<MeshComponent> {
        match self.get(reference, AssetKind::Mesh)? {
            Asset::Mesh(mesh) => Ok(mesh.to_component()),
            _ => Err(not_found(reference, AssetKind::Mesh)),
        }
    }

    fn texture(&self, reference: &str) -> Result<TextureComponent> {
        match self.get(reference, AssetKind::Image)? {
            Asset::Image(image) => Ok(image.to_component()),
            _ => Err(not_found(reference, AssetKind::Image)),
        }
    }

    fn animation_map(&self, reference: &str) -> Result<AnimationMapComponent> {
        match self.get(reference, AssetKind::Animation)? {
            Asset::Animation(animation) => Ok(animation.to_component()),
            _ => Err(not_found(reference, AssetKind::Animation)),
        }
    }
}

fn not_found(reference: &str, kind: AssetKind) -> SceneError {
    SceneError::AssetNotFound { reference: reference.to_string(), kind }
}

/// A reference split into the pack it lives in and the asset name, which is always the last segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetRef<'a> {
    pub pack: &'a str,
    pub name: &'a str,
}

impl<'a> AssetRef<'a> {
    pub fn parse(reference: &'a str) -> Result<AssetRef<'a>> {
        let invalid = || SceneError::InvalidReference { reference: reference.to_string() };

        let (pack, name) = reference.rsplit_once(PACK_SEPARATOR).ok_or_else(invalid)?;
        if name.is_empty() || pack.split(PACK_SEPARATOR).any(str::is_empty) {
            return Err(invalid());
        }

        Ok(AssetRef { pack, name })
    }
}

/// A registered asset. Discovered assets start with only a path and get their data on `load_all`.
#[derive(Debug)]
struct Slot {
    path: Option<PathBuf>,
    asset: Option<Asset>,
}

#[derive(Debug, Default)]
struct Pack {
    assets: HashMap<AssetKind, HashMap<String, Slot>>,
}

#[derive(Debug, Default)]
pub struct Registry {
    packs: HashMap<String, Pack>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Registers, without loading, every asset file below `root`. A file's pack is its directory relative to the
    /// root, its name is the file stem.
    pub fn discover<P: AsRef<Path>>(root: P) -> std::result::Result<Registry, LoadError> {
        let root = root.as_ref();
        let mut registry = Registry::new();
        registry.walk(root, root)?;
        Ok(registry)
    }

    fn walk(&mut self, root: &Path, dir: &Path) -> std::result::Result<(), LoadError> {
        let io_err = |source| LoadError::Io { path: dir.to_path_buf(), source };

        for entry in fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let path = entry.path();

            if entry.file_type().map_err(io_err)?.is_dir() {
                self.walk(root, &path)?;
                continue;
            }

            let kind = match path.extension().and_then(|ext| ext.to_str()).and_then(AssetKind::from_extension) {
                Some(kind) => kind,
                None => {
                    debug!("skipping {}, not an asset", path.display());
                    continue;
                }
            };

            let (pack, name) = match path_pkg::pack_and_name(root, &path) {
                Some(pair) => pair,
                None => {
                    warn!("skipping {}, it is not inside a pack", path.display());
                    continue;
                }
            };

            if !self.register(&pack, &name, kind, path.clone()) {
                warn!("{} asset {}:{} already registered, ignoring {}", kind, pack, name, path.display());
            }
        }

        Ok(())
    }

    fn slots_mut(&mut self, pack: &str, kind: AssetKind) -> &mut HashMap<String, Slot> {
        self.packs
            .entry(pack.to_string())
            .or_default()
            .assets
            .entry(kind)
            .or_default()
    }

    /// Registers an asset file to be loaded later. Returns false if the pack already has an asset of this kind and
    /// name.
    pub fn register(&mut self, pack: &str, name: &str, kind: AssetKind, path: PathBuf) -> bool {
        let slots = self.slots_mut(pack, kind);
        if slots.contains_key(name) {
            return false;
        }

        slots.insert(name.to_string(), Slot { path: Some(path), asset: None });
        true
    }

    /// Adds an already loaded asset. Returns false if the pack already has an asset of this kind and name.
    pub fn put(&mut self, pack: &str, name: &str, asset: Asset) -> bool {
        let slots = self.slots_mut(pack, asset.kind());
        if slots.contains_key(name) {
            return false;
        }

        slots.insert(name.to_string(), Slot { path: None, asset: Some(asset) });
        true
    }

    /// Loads every registered asset of the given kinds that isn't loaded yet (all kinds when `kinds` is empty).
    /// Assets that fail to load are logged and stay unloaded. Returns how many were loaded.
    pub fn load_all(&mut self, kinds: &[AssetKind]) -> usize {
        let kinds = if kinds.is_empty() { &AssetKind::ALL[..] } else { kinds };
        let mut loaded = 0;

        for &kind in kinds {
            let mut loaded_kind = 0;

            for (pack_name, pack) in self.packs.iter_mut() {
                let slots = match pack.assets.get_mut(&kind) {
                    Some(slots) => slots,
                    None => continue,
                };

                for (name, slot) in slots.iter_mut() {
                    let path = match (&slot.asset, &slot.path) {
                        (None, Some(path)) => path,
                        _ => continue,
                    };

                    let reference = format!("{}{}{}", pack_name, PACK_SEPARATOR, name);
                    match Asset::load(kind, &reference, path) {
                        Ok(asset) => {
                            slot.asset = Some(asset);
                            loaded_kind += 1;
                        }
                        Err(err) => warn!("failed to load {} asset {}: {}", kind, reference, err),
                    }
                }
            }

            info!("[{}] total {} assets loaded", loaded_kind, kind);
            loaded += loaded_kind;
        }

        loaded
    }

    /// Drops the data of every asset that can be reloaded from disk. Returns how many were unloaded.
    pub fn unload_all(&mut self) -> usize {
        let mut unloaded = 0;

        for slot in self.packs.values_mut().flat_map(|p| p.assets.values_mut()).flat_map(|s| s.values_mut()) {
            if slot.path.is_some() && slot.asset.take().is_some() {
                unloaded += 1;
            }
        }

        unloaded
    }

    /// Number of registered assets of the given kind, loaded or not.
    pub fn count(&self, kind: AssetKind) -> usize {
        self.packs
            .values()
            .filter_map(|p| p.assets.get(&kind))
            .map(HashMap::len)
            .sum()
    }

    pub fn packs(&self) -> impl Iterator<Item = &str> {
        self.packs.keys().map(String::as_str)
    }
}

impl AssetRegistry for Registry {
    fn get(&self, reference: &str, kind: AssetKind) -> Result<&Asset> {
        let AssetRef { pack, name } = AssetRef::parse(reference)?;

        let slot = self.packs
            .get(pack)
            .and_then(|p| p.assets.get(&kind))
            .and_then(|slots| slots.get(name))
            .ok_or_else(|| not_found(reference, kind))?;

        slot.asset
            .as_ref()
            .ok_or_else(|| SceneError::AssetNotLoaded { reference: reference.to_string() })
    }
}
