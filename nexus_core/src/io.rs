use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::animation::AnimationFile;
use crate::config::EngineConfig;
use crate::error::LoadError;
use crate::resource::Mesh;

pub trait Serializable: Sized {
    fn save<P: AsRef<Path>>(&self, at: P) -> Result<(), LoadError>;
    fn load<P: AsRef<Path>>(at: P) -> Result<Self, LoadError>;
}

fn io_err(at: &Path) -> impl FnOnce(std::io::Error) -> LoadError + '_ {
    move |source| LoadError::Io { path: at.to_path_buf(), source }
}

fn save_bytes<T: Serialize>(self_: &T, at: &Path) -> Result<(), LoadError> {
    let writer = BufWriter::new(File::create(at).map_err(io_err(at))?);

    bincode::serialize_into(writer, self_)
        .map_err(|source| LoadError::Bincode { path: at.to_path_buf(), source })
}

fn save_text<T: Serialize>(self_: &T, at: &Path) -> Result<(), LoadError> {
    let writer = BufWriter::new(File::create(at).map_err(io_err(at))?);

    serde_json::to_writer_pretty(writer, self_)
        .map_err(|source| LoadError::Json { path: at.to_path_buf(), source })
}

fn load_bytes<T: DeserializeOwned>(at: &Path) -> Result<T, LoadError> {
    let reader = BufReader::new(File::open(at).map_err(io_err(at))?);

    bincode::deserialize_from(reader)
        .map_err(|source| LoadError::Bincode { path: at.to_path_buf(), source })
}

fn load_text<T: DeserializeOwned>(at: &Path) -> Result<T, LoadError> {
    let reader = BufReader::new(File::open(at).map_err(io_err(at))?);

    serde_json::from_reader(reader)
        .map_err(|source| LoadError::Json { path: at.to_path_buf(), source })
}

impl Serializable for Mesh {
    fn save<P: AsRef<Path>>(&self, at: P) -> Result<(), LoadError> {
        save_bytes(self, at.as_ref())
    }

    fn load<P: AsRef<Path>>(at: P) -> Result<Self, LoadError> {
        load_bytes(at.as_ref())
    }
}

impl Serializable for AnimationFile {
    fn save<P: AsRef<Path>>(&self, at: P) -> Result<(), LoadError> {
        save_text(self, at.as_ref())
    }

    fn load<P: AsRef<Path>>(at: P) -> Result<Self, LoadError> {
        load_text(at.as_ref())
    }
}

impl Serializable for EngineConfig {
    fn save<P: AsRef<Path>>(&self, at: P) -> Result<(), LoadError> {
        save_text(self, at.as_ref())
    }

    fn load<P: AsRef<Path>>(at: P) -> Result<Self, LoadError> {
        load_text(at.as_ref())
    }
}
