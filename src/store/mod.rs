//! Compressed on-disk storage for brand embedding vectors.
//!
//! A store file holds exactly two named datasets: `features`, an M x D
//! float matrix compressed with DEFLATE at the fastest setting, and
//! `brand_map`, the M labels aligned row-for-row with the matrix, stored
//! exactly and uncompressed. The layout is fixed; dataset names and the
//! row-count alignment are load-bearing for any reader.
//!
//! Features are downcast to half precision by default. The format is lossy
//! by design, trading float fidelity for footprint; callers that need full
//! precision must save with [`Precision::Full`].

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use half::f16;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

use crate::core::errors::{PipelineError, PipelineResult};

/// Dataset name of the feature matrix.
const FEATURES_DATASET: &str = "features";
/// Dataset name of the label sequence.
const BRAND_MAP_DATASET: &str = "brand_map";

/// Longest dataset name the reader will accept.
const MAX_DATASET_NAME_LEN: u16 = 64;

/// Floating point width used for stored features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// 16-bit floats. Lossy; roughly halves the uncompressed payload.
    #[default]
    Half,
    /// 32-bit floats, stored exactly.
    Full,
}

impl Precision {
    fn element_width(self) -> u8 {
        match self {
            Precision::Half => 2,
            Precision::Full => 4,
        }
    }

    fn from_element_width(width: u8) -> Option<Self> {
        match width {
            2 => Some(Precision::Half),
            4 => Some(Precision::Full),
            _ => None,
        }
    }
}

/// Writes labels and their feature matrix to a store file at `path`.
///
/// Any existing file at `path` is overwritten. Rows of `features` must
/// align one-to-one with `labels`.
///
/// # Arguments
///
/// * `path` - Destination file
/// * `labels` - One label per feature row
/// * `features` - M x D feature matrix
/// * `precision` - Stored float width; [`Precision::Half`] is lossy
///
/// # Errors
///
/// Returns [`PipelineError::InvalidInput`] when the label count does not
/// match the matrix row count, and [`PipelineError::Io`] when the file
/// cannot be created or written.
pub fn save_features(
    path: impl AsRef<Path>,
    labels: &[String],
    features: &Array2<f32>,
    precision: Precision,
) -> PipelineResult<()> {
    let path = path.as_ref();
    if labels.len() != features.nrows() {
        return Err(PipelineError::invalid_input(format!(
            "label count {} does not match feature rows {}",
            labels.len(),
            features.nrows()
        )));
    }

    let start = Instant::now();
    let mut writer = BufWriter::new(File::create(path)?);

    write_dataset_name(&mut writer, FEATURES_DATASET)?;
    writer.write_u8(precision.element_width())?;
    writer.write_u64::<LittleEndian>(features.nrows() as u64)?;
    writer.write_u64::<LittleEndian>(features.ncols() as u64)?;

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::fast());
    match precision {
        Precision::Half => {
            for &value in features.iter() {
                encoder.write_u16::<LittleEndian>(f16::from_f32(value).to_bits())?;
            }
        }
        Precision::Full => {
            for &value in features.iter() {
                encoder.write_f32::<LittleEndian>(value)?;
            }
        }
    }
    let payload = encoder.finish()?;
    writer.write_u64::<LittleEndian>(payload.len() as u64)?;
    writer.write_all(&payload)?;

    write_dataset_name(&mut writer, BRAND_MAP_DATASET)?;
    writer.write_u64::<LittleEndian>(labels.len() as u64)?;
    for label in labels {
        writer.write_u32::<LittleEndian>(label.len() as u32)?;
        writer.write_all(label.as_bytes())?;
    }
    writer.flush()?;

    debug!(
        rows = features.nrows(),
        cols = features.ncols(),
        ?precision,
        path = %path.display(),
        elapsed = ?start.elapsed(),
        "saved feature store"
    );
    Ok(())
}

/// Reads labels and their feature matrix back from a store file.
///
/// Features come back at the precision they were stored with; a store
/// saved at [`Precision::Half`] does not round-trip exactly.
///
/// # Arguments
///
/// * `path` - Store file to read
///
/// # Returns
///
/// The label sequence and the M x D feature matrix, row-aligned.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] when `path` is missing or unreadable, and
/// [`PipelineError::CorruptStore`] when the file is present but
/// structurally invalid: truncated, wrong dataset names, or a label count
/// that disagrees with the matrix row count.
pub fn load_features(path: impl AsRef<Path>) -> PipelineResult<(Vec<String>, Array2<f32>)> {
    let path = path.as_ref();
    let start = Instant::now();
    let mut reader = BufReader::new(File::open(path)?);

    expect_dataset_name(&mut reader, FEATURES_DATASET, path)?;
    let width = read_u8(&mut reader, path)?;
    let precision = Precision::from_element_width(width).ok_or_else(|| {
        PipelineError::corrupt_store(path, format!("unsupported element width {width}"))
    })?;
    let rows = read_u64(&mut reader, path)? as usize;
    let cols = read_u64(&mut reader, path)? as usize;
    let count = rows.checked_mul(cols).ok_or_else(|| {
        PipelineError::corrupt_store(path, format!("feature shape {rows}x{cols} overflows"))
    })?;

    let payload_len = read_u64(&mut reader, path)? as usize;
    let mut payload = vec![0u8; payload_len];
    reader
        .read_exact(&mut payload)
        .map_err(|e| map_read_error(e, path))?;

    let mut decoder = DeflateDecoder::new(&payload[..]);
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        let value = match precision {
            Precision::Half => {
                let bits = decoder
                    .read_u16::<LittleEndian>()
                    .map_err(|e| corrupt_payload(e, path))?;
                f16::from_bits(bits).to_f32()
            }
            Precision::Full => decoder
                .read_f32::<LittleEndian>()
                .map_err(|e| corrupt_payload(e, path))?,
        };
        values.push(value);
    }
    let features = Array2::from_shape_vec((rows, cols), values)
        .map_err(|e| PipelineError::corrupt_store(path, e.to_string()))?;

    expect_dataset_name(&mut reader, BRAND_MAP_DATASET, path)?;
    let label_count = read_u64(&mut reader, path)? as usize;
    if label_count != rows {
        return Err(PipelineError::corrupt_store(
            path,
            format!("brand_map length {label_count} does not match feature rows {rows}"),
        ));
    }
    let mut labels = Vec::with_capacity(label_count);
    for _ in 0..label_count {
        let len = read_u32(&mut reader, path)? as usize;
        let mut bytes = vec![0u8; len];
        reader
            .read_exact(&mut bytes)
            .map_err(|e| map_read_error(e, path))?;
        let label = String::from_utf8(bytes).map_err(|_| {
            PipelineError::corrupt_store(path, "brand_map label is not valid UTF-8")
        })?;
        labels.push(label);
    }

    debug!(
        rows,
        cols,
        ?precision,
        path = %path.display(),
        elapsed = ?start.elapsed(),
        "loaded feature store"
    );
    Ok((labels, features))
}

fn write_dataset_name(writer: &mut impl Write, name: &str) -> PipelineResult<()> {
    writer.write_u16::<LittleEndian>(name.len() as u16)?;
    writer.write_all(name.as_bytes())?;
    Ok(())
}

fn expect_dataset_name(reader: &mut impl Read, expected: &str, path: &Path) -> PipelineResult<()> {
    let len = read_u16(reader, path)?;
    if len > MAX_DATASET_NAME_LEN {
        return Err(PipelineError::corrupt_store(
            path,
            format!("dataset name length {len} out of range"),
        ));
    }
    let mut bytes = vec![0u8; len as usize];
    reader
        .read_exact(&mut bytes)
        .map_err(|e| map_read_error(e, path))?;
    if bytes != expected.as_bytes() {
        let found = String::from_utf8_lossy(&bytes).into_owned();
        return Err(PipelineError::corrupt_store(
            path,
            format!("expected dataset '{expected}', found '{found}'"),
        ));
    }
    Ok(())
}

/// Truncation shows up as UnexpectedEof; that is a structural defect of
/// the file, not an environment failure.
fn map_read_error(error: std::io::Error, path: &Path) -> PipelineError {
    if error.kind() == ErrorKind::UnexpectedEof {
        PipelineError::corrupt_store(path, "unexpected end of file")
    } else {
        PipelineError::Io(error)
    }
}

fn corrupt_payload(error: std::io::Error, path: &Path) -> PipelineError {
    PipelineError::corrupt_store(path, format!("feature payload: {error}"))
}

fn read_u8(reader: &mut impl Read, path: &Path) -> PipelineResult<u8> {
    reader.read_u8().map_err(|e| map_read_error(e, path))
}

fn read_u16(reader: &mut impl Read, path: &Path) -> PipelineResult<u16> {
    reader
        .read_u16::<LittleEndian>()
        .map_err(|e| map_read_error(e, path))
}

fn read_u32(reader: &mut impl Read, path: &Path) -> PipelineResult<u32> {
    reader
        .read_u32::<LittleEndian>()
        .map_err(|e| map_read_error(e, path))
}

fn read_u64(reader: &mut impl Read, path: &Path) -> PipelineResult<u64> {
    reader
        .read_u64::<LittleEndian>()
        .map_err(|e| map_read_error(e, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_store() -> (Vec<String>, Array2<f32>) {
        let labels = vec!["acme".to_string(), "globex".to_string(), "initech".to_string()];
        let features = array![
            [0.125, -1.5, 3.25, 0.0],
            [10.0625, 0.0073, -0.875, 2.5],
            [-7.125, 0.5, 1.0, -0.25],
        ];
        (labels, features)
    }

    #[test]
    fn test_round_trip_half_precision_within_tolerance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brands.lfs");
        let (labels, features) = sample_store();

        save_features(&path, &labels, &features, Precision::Half).unwrap();
        let (loaded_labels, loaded) = load_features(&path).unwrap();

        assert_eq!(loaded_labels, labels);
        assert_eq!(loaded.dim(), features.dim());
        for (a, b) in features.iter().zip(loaded.iter()) {
            // Half precision carries 11 significand bits.
            assert!((a - b).abs() <= 1e-3 * (1.0 + a.abs()), "{a} vs {b}");
        }
    }

    #[test]
    fn test_round_trip_full_precision_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brands.lfs");
        let (labels, features) = sample_store();

        save_features(&path, &labels, &features, Precision::Full).unwrap();
        let (_, loaded) = load_features(&path).unwrap();
        assert_eq!(loaded, features);
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brands.lfs");
        let (labels, features) = sample_store();

        save_features(&path, &labels, &features, Precision::Full).unwrap();
        let one_row = features.slice(ndarray::s![0..1, ..]).to_owned();
        save_features(&path, &labels[0..1], &one_row, Precision::Full).unwrap();

        let (loaded_labels, loaded) = load_features(&path).unwrap();
        assert_eq!(loaded_labels.len(), 1);
        assert_eq!(loaded.nrows(), 1);
    }

    #[test]
    fn test_save_rejects_misaligned_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brands.lfs");
        let (labels, features) = sample_store();

        let result = save_features(&path, &labels[0..2], &features, Precision::Half);
        assert!(matches!(result, Err(PipelineError::InvalidInput { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_load_missing_file_is_io_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.lfs");

        match load_features(&path) {
            Err(PipelineError::Io(e)) => assert_eq!(e.kind(), ErrorKind::NotFound),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_truncated_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brands.lfs");
        let (labels, features) = sample_store();
        save_features(&path, &labels, &features, Precision::Half).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        let result = load_features(&path);
        assert!(matches!(result, Err(PipelineError::CorruptStore { .. })));
    }

    #[test]
    fn test_load_wrong_dataset_name_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brands.lfs");
        let (labels, features) = sample_store();
        save_features(&path, &labels, &features, Precision::Half).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        // First dataset name starts right after its u16 length prefix.
        bytes[2] = b'x';
        std::fs::write(&path, &bytes).unwrap();

        match load_features(&path) {
            Err(PipelineError::CorruptStore { reason, .. }) => {
                assert!(reason.contains("features"), "{reason}");
            }
            other => panic!("expected CorruptStore, got {other:?}"),
        }
    }

    #[test]
    fn test_load_garbage_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brands.lfs");
        std::fs::write(&path, b"not a feature store at all").unwrap();

        let result = load_features(&path);
        assert!(matches!(result, Err(PipelineError::CorruptStore { .. })));
    }

    #[test]
    fn test_empty_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brands.lfs");
        let labels: Vec<String> = Vec::new();
        let features = Array2::<f32>::zeros((0, 128));

        save_features(&path, &labels, &features, Precision::Half).unwrap();
        let (loaded_labels, loaded) = load_features(&path).unwrap();
        assert!(loaded_labels.is_empty());
        assert_eq!(loaded.dim(), (0, 128));
    }
}
