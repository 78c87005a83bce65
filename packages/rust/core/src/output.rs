//! Report file output.

use std::path::Path;

use tracing::{debug, instrument};

use benchtable_shared::{BenchTableError, Result};

/// Write `content` to `path` in one step: the text goes to a temp file next
/// to the target, which is then renamed over it. Readers never see a
/// partially written report. Missing parent directories are created.
#[instrument(skip(content), fields(path = %path.display(), bytes = content.len()))]
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        std::fs::create_dir_all(parent).map_err(|e| BenchTableError::io(parent, e))?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| BenchTableError::config(format!("{} is not a file path", path.display())))?
        .to_string_lossy();
    let temp_name = format!(".{file_name}.{}.tmp", uuid::Uuid::now_v7());
    let temp = match parent {
        Some(parent) => parent.join(temp_name),
        None => Path::new(&temp_name).to_path_buf(),
    };

    std::fs::write(&temp, content).map_err(|e| BenchTableError::io(&temp, e))?;

    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(BenchTableError::io(path, e));
    }

    debug!("report written");
    Ok(())
}
