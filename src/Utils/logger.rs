use crate::numerical::errors::{CollocationError, CollocationResult};
use csv::Writer;
use log::info;
use nalgebra::DVector;
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::path::Path;

/// Console logger, plus a file logger when `log_file` is given.
/// A second call keeps the logger installed by the first one.
pub fn init_logger(level: LevelFilter, log_file: Option<&Path>) -> CollocationResult<()> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));
    if let Some(path) = log_file {
        let file = File::create(path)?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    let _ = CombinedLogger::init(loggers);
    Ok(())
}

/// Writes equally long vectors as named csv columns
pub fn save_vectors_to_csv<P: AsRef<Path>>(
    headers: &[&str],
    columns: &[&DVector<f64>],
    filename: P,
) -> CollocationResult<()> {
    if headers.len() != columns.len() {
        return Err(CollocationError::dimension("csv headers", columns.len(), headers.len()));
    }
    let rows = columns.first().map_or(0, |c| c.len());
    for column in columns {
        if column.len() != rows {
            return Err(CollocationError::dimension("csv column", rows, column.len()));
        }
    }
    let mut writer = Writer::from_path(filename.as_ref())?;
    writer.write_record(headers)?;
    for i in 0..rows {
        writer.write_record(columns.iter().map(|c| c[i].to_string()))?;
    }
    writer.flush()?;
    info!(
        "{} rows of {:?} saved to {}",
        rows,
        headers,
        filename.as_ref().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_vectors_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaling.csv");
        let scale = DVector::from_vec(vec![8.0, 2.0, 4.0]);
        let shift = DVector::from_vec(vec![6.0, 0.0, 2.5]);
        save_vectors_to_csv(&["scale", "shift"], &[&scale, &shift], &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["scale", "shift"]);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].get(1), Some("2.5"));
        assert_eq!(rows[0][0].parse::<f64>().unwrap(), 8.0);
    }

    #[test]
    fn test_save_vectors_to_csv_rejects_ragged_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        let a = DVector::from_vec(vec![1.0, 2.0]);
        let b = DVector::from_vec(vec![1.0]);
        assert!(save_vectors_to_csv(&["a", "b"], &[&a, &b], &path).is_err());
        assert!(save_vectors_to_csv(&["a"], &[&a, &b], &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_init_logger_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collo.log");
        init_logger(LevelFilter::Warn, Some(&path)).unwrap();
        assert!(path.exists());
        // the logger is already installed; the call still succeeds
        init_logger(LevelFilter::Info, None).unwrap();
    }
}
