use crate::PolicyError;
use log::info;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};

const PREFIX: &str = "params_";
const EXT: &str = "bincode";

/// Location of saved policy parameters.
///
/// A checkpoint directory holds one file `params_<step>.bincode` per saved
/// training step. Without an explicit step, the latest one is used.
#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint {
    /// Checkpoint directory.
    pub dir: PathBuf,

    /// Training step to load, the latest if `None`.
    pub step: Option<usize>,
}

impl Checkpoint {
    /// Checkpoint at training step `step` in `dir`, the latest step if `None`.
    pub fn new(dir: impl AsRef<Path>, step: Option<usize>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            step,
        }
    }

    /// Path of the parameter file of `step` in `dir`.
    pub fn path_of(dir: impl AsRef<Path>, step: usize) -> PathBuf {
        dir.as_ref().join(format!("{}{}.{}", PREFIX, step, EXT))
    }

    /// Steps available in the directory, in ascending order.
    pub fn steps(&self) -> Result<Vec<usize>, PolicyError> {
        let mut steps = vec![];
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map_or(true, |e| e != EXT) {
                continue;
            }
            let step = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_prefix(PREFIX))
                .and_then(|s| s.parse::<usize>().ok());
            if let Some(step) = step {
                steps.push(step);
            }
        }
        steps.sort_unstable();
        Ok(steps)
    }

    /// Resolves the step to load and the path of its parameter file.
    pub fn resolve(&self) -> Result<(usize, PathBuf), PolicyError> {
        match self.step {
            Some(step) => {
                let path = Self::path_of(&self.dir, step);
                if path.is_file() {
                    Ok((step, path))
                } else {
                    Err(PolicyError::NotFound {
                        dir: self.dir.clone(),
                        step,
                    })
                }
            }
            None => {
                if !self.dir.is_dir() {
                    return Err(PolicyError::NoCheckpoints(self.dir.clone()));
                }
                let step = *self
                    .steps()?
                    .last()
                    .ok_or_else(|| PolicyError::NoCheckpoints(self.dir.clone()))?;
                Ok((step, Self::path_of(&self.dir, step)))
            }
        }
    }

    /// Loads parameters, returning them with the resolved step.
    pub fn restore<T: DeserializeOwned>(&self) -> Result<(T, usize), PolicyError> {
        let (step, path) = self.resolve()?;
        let mut file = fs::OpenOptions::new().read(true).open(&path)?;
        let mut buf = Vec::<u8>::new();
        file.read_to_end(&mut buf)?;
        let params = bincode::deserialize(&buf[..])?;
        Ok((params, step))
    }

    /// Saves parameters of `step` into `dir`, creating it if necessary.
    pub fn save<T: Serialize>(
        dir: impl AsRef<Path>,
        step: usize,
        params: &T,
    ) -> Result<PathBuf, PolicyError> {
        fs::create_dir_all(dir.as_ref())?;
        let path = Self::path_of(dir, step);
        let buf = bincode::serialize(params)?;
        let mut file = fs::File::create(&path)?;
        file.write_all(&buf)?;
        info!("Saved parameters in {:?}", path);
        Ok(path)
    }
}
