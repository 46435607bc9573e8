//! Input stage: raw bytes of one delimited file → an immutable [`Dataset`].
//!
//! Parsing and per-column type inference are done by the polars CSV reader.
//! The inferred dtypes are mapped once, at load time, onto a [`ColumnKind`]
//! tag that drives which columns are offered for which charts.

use polars::prelude::*;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::PerformanceConfig;
use crate::{CompressionFormat, OpenOptions};

/// Semantic column type used for chart selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
    /// Dates, booleans and anything else; never offered for charts
    Other,
}

impl ColumnKind {
    pub fn from_dtype(dtype: &DataType) -> Self {
        match dtype {
            DataType::String => ColumnKind::Categorical,
            dt if dt.is_primitive_numeric() => ColumnKind::Numeric,
            _ => ColumnKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: DataType,
    pub kind: ColumnKind,
}

/// Errors surfaced to the user when a file cannot become a Dataset
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file type: {0} (expected .csv, .tsv, .psv or .txt)")]
    UnsupportedFormat(String),

    #[error("Could not decompress {format:?} data: {source}")]
    Decompress {
        format: CompressionFormat,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse file: {0}")]
    Parse(#[from] PolarsError),

    #[error("File too large: {size_mb}MB (max {max_mb}MB)")]
    TooLarge { size_mb: u64, max_mb: u64 },

    #[error("Too many rows: {rows} (max {max_rows})")]
    TooManyRows { rows: usize, max_rows: usize },

    #[error("No columns found")]
    NoColumns,
}

/// The full uploaded table. Immutable once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
    columns: Vec<ColumnInfo>,
    source: Option<PathBuf>,
}

impl Dataset {
    /// Wrap an already-built frame, computing the column classification
    pub fn new(df: DataFrame) -> Self {
        let columns = df
            .schema()
            .iter()
            .map(|(name, dtype)| ColumnInfo {
                name: name.to_string(),
                dtype: dtype.clone(),
                kind: ColumnKind::from_dtype(dtype),
            })
            .collect();

        Self {
            df,
            columns,
            source: None,
        }
    }

    /// Read, decompress and parse a file from disk
    pub fn from_path(
        path: &Path,
        options: &OpenOptions,
        limits: &PerformanceConfig,
    ) -> Result<Self, LoadError> {
        let delimiter = match options.delimiter {
            Some(delimiter) => delimiter,
            None => delimiter_for_path(path).ok_or_else(|| {
                LoadError::UnsupportedFormat(
                    path.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string()),
                )
            })?,
        };

        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };

        let size = std::fs::metadata(path).map_err(io_err)?.len();
        check_size(size, limits)?;

        let mut bytes = Vec::with_capacity(size as usize);
        File::open(path)
            .and_then(|mut f| f.read_to_end(&mut bytes))
            .map_err(io_err)?;

        let compression = options
            .compression
            .or_else(|| CompressionFormat::from_extension(path));

        let mut dataset = Self::from_bytes(bytes, delimiter, compression, options, limits)?;
        dataset.source = Some(path.to_path_buf());
        Ok(dataset)
    }

    /// Parse raw (possibly compressed) delimited bytes
    pub fn from_bytes(
        bytes: Vec<u8>,
        delimiter: u8,
        compression: Option<CompressionFormat>,
        options: &OpenOptions,
        limits: &PerformanceConfig,
    ) -> Result<Self, LoadError> {
        let bytes = match compression {
            Some(format) => decompress(&bytes, format)?,
            None => bytes,
        };
        check_size(bytes.len() as u64, limits)?;

        let mut read_options = CsvReadOptions::default().with_infer_schema_length(None);
        if let Some(skip_rows) = options.skip_rows {
            read_options.skip_rows = skip_rows;
        }
        if let Some(has_header) = options.has_header {
            read_options.has_header = has_header;
        }
        read_options = read_options.map_parse_options(|opts| opts.with_separator(delimiter));

        let df = CsvReader::new(Cursor::new(bytes))
            .with_options(read_options)
            .finish()?;

        if df.width() == 0 {
            return Err(LoadError::NoColumns);
        }
        if df.height() > limits.max_rows {
            return Err(LoadError::TooManyRows {
                rows: df.height(),
                max_rows: limits.max_rows,
            });
        }

        Ok(Self::new(df))
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Numeric columns in schema order
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns_of_kind(ColumnKind::Numeric)
    }

    /// Categorical (text) columns in schema order
    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns_of_kind(ColumnKind::Categorical)
    }

    fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name.clone())
            .collect()
    }
}

fn check_size(bytes: u64, limits: &PerformanceConfig) -> Result<(), LoadError> {
    let max_bytes = limits.max_file_size_mb.saturating_mul(1024 * 1024);
    if bytes > max_bytes {
        return Err(LoadError::TooLarge {
            size_mb: bytes / (1024 * 1024),
            max_mb: limits.max_file_size_mb,
        });
    }
    Ok(())
}

fn decompress(bytes: &[u8], format: CompressionFormat) -> Result<Vec<u8>, LoadError> {
    let mut out = Vec::new();
    let result = match format {
        CompressionFormat::Gzip => flate2::read::MultiGzDecoder::new(bytes).read_to_end(&mut out),
        CompressionFormat::Zstd => zstd::stream::read::Decoder::new(bytes)
            .and_then(|mut decoder| decoder.read_to_end(&mut out)),
        CompressionFormat::Bzip2 => bzip2::read::BzDecoder::new(bytes).read_to_end(&mut out),
        CompressionFormat::Xz => xz2::read::XzDecoder::new(bytes).read_to_end(&mut out),
    };
    result.map_err(|source| LoadError::Decompress { format, source })?;
    Ok(out)
}

/// Delimiter implied by the file extension, looking through a compression suffix
/// (`data.tsv.gz` → tab)
pub fn delimiter_for_path(path: &Path) -> Option<u8> {
    let name = path.file_name()?.to_str()?.to_lowercase();
    let name = if CompressionFormat::from_extension(path).is_some() {
        Path::new(&name).file_stem()?.to_str()?.to_string()
    } else {
        name
    };
    let ext = Path::new(&name).extension()?.to_str()?;
    format_extension_delimiter(ext)
}

fn format_extension_delimiter(ext: &str) -> Option<u8> {
    match ext {
        "csv" | "txt" => Some(b','),
        "tsv" | "tab" => Some(b'\t'),
        "psv" => Some(b'|'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn limits() -> PerformanceConfig {
        PerformanceConfig::default()
    }

    fn parse(text: &str) -> Result<Dataset, LoadError> {
        Dataset::from_bytes(
            text.as_bytes().to_vec(),
            b',',
            None,
            &OpenOptions::default(),
            &limits(),
        )
    }

    #[test]
    fn test_classification_from_inferred_types() {
        let ds = parse("id,city,score,flag\n1,NY,1.5,true\n2,LA,2.5,false\n").unwrap();
        assert_eq!(ds.height(), 2);
        assert_eq!(ds.numeric_columns(), vec!["id", "score"]);
        assert_eq!(ds.categorical_columns(), vec!["city"]);
        assert_eq!(ds.column("flag").unwrap().kind, ColumnKind::Other);
    }

    #[test]
    fn test_every_integer_width_is_numeric() {
        for dtype in [
            DataType::Int8,
            DataType::Int16,
            DataType::Int32,
            DataType::Int64,
            DataType::UInt8,
            DataType::UInt16,
            DataType::UInt32,
            DataType::UInt64,
            DataType::Float32,
        ] {
            assert_eq!(ColumnKind::from_dtype(&dtype), ColumnKind::Numeric, "{}", dtype);
        }
        assert_eq!(ColumnKind::from_dtype(&DataType::Boolean), ColumnKind::Other);
    }

    #[test]
    fn test_small_int_frame_keeps_numeric_columns() {
        let df = DataFrame::new(vec![
            Series::new("a".into(), &[1i8, 2]).into(),
            Series::new("b".into(), &[1i16, 2]).into(),
            Series::new("c".into(), &[1u8, 2]).into(),
            Series::new("d".into(), &[1u16, 2]).into(),
            Series::new("e".into(), &["x", "y"]).into(),
        ])
        .unwrap();
        let ds = Dataset::new(df);
        assert_eq!(ds.numeric_columns(), vec!["a", "b", "c", "d"]);
        assert_eq!(ds.categorical_columns(), vec!["e"]);
    }

    #[test]
    fn test_header_only_file_is_empty_dataset() {
        let ds = parse("a,b,c\n").unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.width(), 3);
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        assert!(parse("").is_err());
    }

    #[test]
    fn test_row_cap() {
        let mut limits = limits();
        limits.max_rows = 2;
        let err = Dataset::from_bytes(
            b"a\n1\n2\n3\n".to_vec(),
            b',',
            None,
            &OpenOptions::default(),
            &limits,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::TooManyRows { rows: 3, max_rows: 2 }));
    }

    #[test]
    fn test_gzip_input() {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::fast());
        encoder.write_all(b"x,y\n1,a\n2,b\n").unwrap();
        let compressed = encoder.finish().unwrap();
        let ds = Dataset::from_bytes(
            compressed,
            b',',
            Some(CompressionFormat::Gzip),
            &OpenOptions::default(),
            &limits(),
        )
        .unwrap();
        assert_eq!(ds.height(), 2);
        assert_eq!(ds.column_names(), vec!["x", "y"]);
    }

    #[test]
    fn test_delimiter_for_path() {
        assert_eq!(delimiter_for_path(Path::new("data.csv")), Some(b','));
        assert_eq!(delimiter_for_path(Path::new("DATA.TSV")), Some(b'\t'));
        assert_eq!(delimiter_for_path(Path::new("data.psv.gz")), Some(b'|'));
        assert_eq!(delimiter_for_path(Path::new("data.csv.zst")), Some(b','));
        assert_eq!(delimiter_for_path(Path::new("data.parquet")), None);
        assert_eq!(delimiter_for_path(Path::new("data")), None);
    }
}
