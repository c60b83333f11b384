//! Bundle packing and unpacking
//!
//! Bundles are flat zip archives: one entry per asset, named by the
//! asset's output name, no directory structure. This is the container
//! exchanged at the storage boundary in both directions.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::asset::AudioAsset;

/// Bundle I/O errors
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("archive error on {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> BundleError + '_ {
    move |source| BundleError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn zip_err(path: &Path) -> impl FnOnce(zip::result::ZipError) -> BundleError + '_ {
    move |source| BundleError::Archive {
        path: path.to_path_buf(),
        source,
    }
}

/// Write `outputs` into a flat archive at `dest`, one entry per asset
/// named by the asset id.
pub fn pack(outputs: &[AudioAsset], dest: &Path) -> Result<(), BundleError> {
    log::debug!("packing {} assets into {}", outputs.len(), dest.display());
    let file = File::create(dest).map_err(io_err(dest))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for asset in outputs {
        writer
            .start_file(asset.id(), options)
            .map_err(zip_err(dest))?;
        let mut input = File::open(asset.path()).map_err(io_err(asset.path()))?;
        io::copy(&mut input, &mut writer).map_err(io_err(asset.path()))?;
    }

    writer.finish().map_err(zip_err(dest))?;
    Ok(())
}

/// Extract every entry of the archive at `src` into `dest_dir`.
pub fn unpack(src: &Path, dest_dir: &Path) -> Result<(), BundleError> {
    log::debug!("unpacking {} into {}", src.display(), dest_dir.display());
    let file = File::open(src).map_err(io_err(src))?;
    let mut archive = ZipArchive::new(file).map_err(zip_err(src))?;
    archive.extract(dest_dir).map_err(zip_err(src))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::write_sine_wav;

    #[test]
    fn test_pack_unpack_flat_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut outputs = Vec::new();
        for name in ["cello.wav", "viola.wav", "all.wav"] {
            let path = dir.path().join(name);
            write_sine_wav(&path, 440.0, 0.3, 0.1);
            outputs.push(AudioAsset::new(&path));
        }

        let archive = dir.path().join("bundle.zip");
        pack(&outputs, &archive).unwrap();

        let extracted = dir.path().join("extracted");
        std::fs::create_dir_all(&extracted).unwrap();
        unpack(&archive, &extracted).unwrap();

        for name in ["cello.wav", "viola.wav", "all.wav"] {
            assert!(extracted.join(name).is_file(), "missing {}", name);
        }
    }

    #[test]
    fn test_unpack_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let err = unpack(&dir.path().join("nope.zip"), dir.path()).unwrap_err();
        assert!(matches!(err, BundleError::Io { .. }));
    }
}
