use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::artifact::ModelArtifact;
use super::ProfitModel;
use crate::error::{ModelLoadError, ServiceError};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Read and decode the artifact at `path`.
///
/// A missing file is [`ServiceError::ModelUnavailable`]; the caller should
/// prompt for an upload. Any other read or decode failure is
/// [`ServiceError::ModelLoad`].
pub fn load_model(path: &Path) -> Result<Arc<dyn ProfitModel>, ServiceError> {
    // One read of the whole file: a concurrent replace swaps the directory
    // entry, so this sees either the old or the new artifact in full.
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Model artifact not found: {}", path.display());
            return Err(ServiceError::ModelUnavailable {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(load_error(path, e.into())),
    };

    let model = ModelArtifact::from_slice(&bytes)
        .and_then(ModelArtifact::into_model)
        .map_err(|e| load_error(path, e))?;
    log::info!("Loaded model from {} ({} bytes)", path.display(), bytes.len());
    Ok(model)
}

/// Persist an uploaded artifact at `path`.
///
/// The bytes go to a temporary file in the same directory, are flushed and
/// synced, then renamed over `path`. On any failure the temporary file is
/// removed and the existing artifact is left as it was.
pub fn replace_model(bytes: &[u8], path: &Path) -> Result<(), ServiceError> {
    let write_error = |source: io::Error| ServiceError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_error)?;

    let temp_path = temp_path_for(dir, path);
    if let Err(e) = write_synced(&temp_path, bytes) {
        discard(&temp_path);
        log::error!("Failed to write model upload: {e}");
        return Err(write_error(e));
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        discard(&temp_path);
        log::error!("Failed to replace model file: {e}");
        return Err(write_error(e));
    }

    log::info!("Stored model upload at {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

fn write_synced(temp_path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()
}

fn discard(temp_path: &Path) {
    if let Err(e) = fs::remove_file(temp_path) {
        if e.kind() != io::ErrorKind::NotFound {
            log::warn!("Failed to clean up {}: {e}", temp_path.display());
        }
    }
}

fn temp_path_for(dir: &Path, path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    dir.join(format!(".{name}.{}.{n}.tmp", std::process::id()))
}

fn load_error(path: &Path, source: ModelLoadError) -> ServiceError {
    log::error!("Failed to load model {}: {source}", path.display());
    ServiceError::ModelLoad {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Query;

    const PIPE: &[u8] = br#"{"kind":"linear","intercept":10.0,"rd_spend":1.0,"administration":0.0,"marketing_spend":0.0,"states":{"Florida":0.0}}"#;

    #[test]
    fn missing_artifact_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_model(&dir.path().join("pipe.json")).err().unwrap();
        assert!(matches!(err, ServiceError::ModelUnavailable { .. }));
    }

    #[test]
    fn corrupt_artifact_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipe.json");
        fs::write(&path, b"not a model").unwrap();
        let err = load_model(&path).err().unwrap();
        assert!(matches!(
            err,
            ServiceError::ModelLoad {
                source: ModelLoadError::Decode(_),
                ..
            }
        ));
    }

    #[test]
    fn replace_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model").join("pipe.json");
        replace_model(PIPE, &path).unwrap();

        let model = load_model(&path).unwrap();
        let q = Query::new(5.0, 0.0, 0.0, "Florida");
        assert_eq!(model.predict(&q), Ok(15.0));
    }

    #[test]
    fn replace_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipe.json");
        replace_model(b"old", &path).unwrap();
        replace_model(PIPE, &path).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("pipe.json")]);
        assert_eq!(fs::read(&path).unwrap(), PIPE);
    }

    #[test]
    fn failed_replace_keeps_existing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipe.json");
        replace_model(PIPE, &path).unwrap();

        // a directory squatting on the destination makes the rename fail
        let blocked = dir.path().join("blocked");
        fs::create_dir_all(blocked.join("inner")).unwrap();
        let err = replace_model(b"new", &blocked).unwrap_err();
        assert!(matches!(err, ServiceError::Write { .. }));

        assert_eq!(fs::read(&path).unwrap(), PIPE);
        assert!(blocked.join("inner").is_dir());
    }
}
