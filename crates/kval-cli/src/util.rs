use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const TABLE_EXTENSIONS: [&str; 5] = ["csv", "xlsx", "tsv", "txt", "json"];

pub fn validate_table_file(path: &str) -> Result<()> {
    let pb = PathBuf::from(path);

    let ext = pb
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some(ext) if TABLE_EXTENSIONS.contains(&ext) => {}
        _ => anyhow::bail!(
            "File must have a .csv, .xlsx, .tsv, .txt or .json extension: {}",
            path
        ),
    }

    if !pb.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }

    Ok(())
}

/// Create `dir` (and parents) if needed and return it as a path.
pub fn ensure_output_dir(dir: &str) -> Result<PathBuf> {
    let path = Path::new(dir);
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create output directory: {}", path.display()))?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsupported_or_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let parquet = dir.path().join("data.parquet");
        std::fs::write(&parquet, "").unwrap();
        assert!(validate_table_file(parquet.to_str().unwrap()).is_err());

        let missing = dir.path().join("missing.csv");
        assert!(validate_table_file(missing.to_str().unwrap()).is_err());

        let csv = dir.path().join("data.CSV");
        std::fs::write(&csv, "a,b\n").unwrap();
        assert!(validate_table_file(csv.to_str().unwrap()).is_ok());

        let xlsx = dir.path().join("data.xlsx");
        std::fs::write(&xlsx, "").unwrap();
        assert!(validate_table_file(xlsx.to_str().unwrap()).is_ok());
    }

    #[test]
    fn creates_nested_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        let out = ensure_output_dir(nested.to_str().unwrap()).unwrap();
        assert!(out.is_dir());
    }
}
