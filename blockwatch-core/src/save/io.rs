use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;

use crate::error::{Error, ParseError, Result};

/// Read a gzip compressed NBT file.
pub(crate) fn read_nbt<T: DeserializeOwned>(path: &Path) -> Result<T> {
  let file = File::open(path).map_err(|e| Error::io(path, e))?;

  let mut bytes = Vec::new();
  GzDecoder::new(file)
    .read_to_end(&mut bytes)
    .map_err(|e| Error::io(path, e))?;

  fastnbt::from_bytes(&bytes).map_err(|source| {
    ParseError::Nbt {
      path: path.to_path_buf(),
      source,
    }
    .into()
  })
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
  let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;

  serde_json::from_slice(&bytes).map_err(|source| {
    ParseError::Json {
      path: path.to_path_buf(),
      source,
    }
    .into()
  })
}
