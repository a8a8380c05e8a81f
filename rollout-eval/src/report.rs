//! CSV report of an evaluation run.
use anyhow::Result;
use csv::{Writer, WriterBuilder};
use log::warn;
use rollout_core::record::{Record, Recorder};
use serde::Serialize;
use std::{convert::TryFrom, fs::File, path::Path};

/// A row of the report.
#[derive(Debug, Serialize, PartialEq)]
pub struct EpisodeRow {
    pub episode: usize,
    #[serde(rename = "return")]
    pub ret: f32,
    pub length: usize,
}

impl TryFrom<&Record> for EpisodeRow {
    type Error = anyhow::Error;

    fn try_from(record: &Record) -> Result<Self> {
        Ok(Self {
            episode: record.get_scalar("episode")? as _,
            ret: record.get_scalar("return")?,
            length: record.get_scalar("length")? as _,
        })
    }
}

/// Writes a row `episode,return,length` per episode record.
pub struct CsvRecorder {
    wtr: Writer<File>,
}

impl CsvRecorder {
    /// Creates the report file and missing parent directories.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let wtr = WriterBuilder::new().from_writer(File::create(path)?);
        Ok(Self { wtr })
    }

    /// Flushes buffered rows to the file.
    pub fn flush(&mut self) -> Result<()> {
        self.wtr.flush()?;
        Ok(())
    }
}

impl Recorder for CsvRecorder {
    fn write(&mut self, record: Record) {
        let res = EpisodeRow::try_from(&record)
            .and_then(|row| self.wtr.serialize(row).map_err(anyhow::Error::from));
        if let Err(e) = res {
            warn!("Failed to write a report row: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollout_core::record::RecordValue;
    use tempdir::TempDir;

    #[test]
    fn test_rows() -> Result<()> {
        let dir = TempDir::new("report")?;
        let path = dir.path().join("out/report.csv");
        let mut recorder = CsvRecorder::create(&path)?;
        for (ix, ret) in [1.5f32, -2.0].iter().enumerate() {
            recorder.write(Record::from_slice(&[
                ("episode", RecordValue::Scalar(ix as f32)),
                ("return", RecordValue::Scalar(*ret)),
                ("length", RecordValue::Scalar(200.0)),
            ]));
        }
        // Ignored: no return
        recorder.write(Record::from_scalar("episode", 2.0));
        recorder.flush()?;

        let text = std::fs::read_to_string(&path)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["episode,return,length", "0,1.5,200", "1,-2.0,200"]);
        Ok(())
    }
}
