use std::io::{BufWriter, Write};
use std::path::Path;

use super::model::KdeModel;
use crate::error::{Error, Result};

impl KdeModel {
    /// Save the model, including any trained reference tree, to a JSON file.
    ///
    /// The file is written to a temporary sibling first and then renamed into
    /// place, so an interrupted save never leaves a truncated model behind.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the file cannot be written or the model
    /// cannot be serialized.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let parent = path.parent().unwrap_or(Path::new("."));
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));

        let file = std::fs::File::create(&tmp_path).map_err(|e| Error::Storage(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        let written = serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| Error::Storage(e.to_string()))
            .and_then(|()| writer.flush().map_err(|e| Error::Storage(e.to_string())));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e);
        }
        drop(writer);
        if let Err(e) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(Error::Storage(e.to_string()));
        }

        trace_debug!(path = %path.display(), "saved KDE model");
        Ok(())
    }

    /// Load a model written by [`save`](Self::save).
    ///
    /// Kernel, metric and reference tree of the loaded estimator are owned.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| Error::Storage(e.to_string()))?;
        serde_json::from_reader(std::io::BufReader::new(file)).map_err(|e| Error::Storage(e.to_string()))
    }
}
