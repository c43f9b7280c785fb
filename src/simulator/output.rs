use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};

use super::RunConfig;
use crate::error::QNoiseError;

/// Conventional output file name, `qNoise_{tau}_{h}_{q}_{n}.txt`.
pub fn default_file_name(config: &RunConfig) -> PathBuf {
    PathBuf::from(format!(
        "qNoise_{}_{}_{}_{}.txt",
        config.tau, config.h, config.q, config.n
    ))
}

/// Write one value per line to `writer`.
pub fn write_series_to<W: Write>(writer: W, values: &[f64]) -> Result<(), QNoiseError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    for value in values {
        wtr.write_record([value.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write one value per line to the file at `path`, replacing it if it exists.
pub fn write_series(path: impl AsRef<Path>, values: &[f64]) -> Result<(), QNoiseError> {
    let file = File::create(path.as_ref())?;
    write_series_to(file, values)?;
    tracing::debug!(path = %path.as_ref().display(), samples = values.len(), "series written");
    Ok(())
}

/// Read a series written by [`write_series_to`].
pub fn read_series_from<R: Read>(reader: R) -> Result<Vec<f64>, QNoiseError> {
    let mut rdr = ReaderBuilder::new().has_headers(false).from_reader(reader);
    let mut values = Vec::new();
    for record in rdr.deserialize::<f64>() {
        values.push(record?);
    }
    Ok(values)
}

/// Read a series file from disk.
pub fn read_series(path: impl AsRef<Path>) -> Result<Vec<f64>, QNoiseError> {
    let file = File::open(path)?;
    read_series_from(BufReader::new(file))
}
