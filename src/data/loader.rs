use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use ndarray::Array3;
use num_complex::Complex64;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{Dataset, InputStacks, ReflectivityVolume};

/// Schema metadata keys holding the JSON-encoded label sequences of a stack file.
pub const SLC_FILES_KEY: &str = "slc_files";
pub const PHASE_FILES_KEY: &str = "phase_files";
pub const KZ_FILES_KEY: &str = "kz_files";

/// Largest number of cells a Parquet file may expand to.
pub const MAX_CELLS: usize = 1 << 28;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load input stacks or a reflectivity volume from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – long format, one row per pixel / voxel (recommended)
/// * `.json`    – `{ "kind": "stacks" | "volume", ... }` with row-major arrays
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (arrays are row-major, `null` reads as NaN):
///
/// ```json
/// { "kind": "volume",
///   "absolute":   { "shape": [az, rg, h], "data": [...] },
///   "normalized": { "shape": [az, rg, h], "data": [...] } }
///
/// { "kind": "stacks",
///   "slc_files": ["..."], "phase_files": ["..."], "kz_files": ["..."],
///   "slc":   { "shape": [rows, cols, frames], "re": [...], "im": [...] },
///   "phase": { "shape": [rows, cols, frames], "data": [...] },
///   "kz":    { "shape": [rows, cols, frames], "data": [...] } }
/// ```
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum JsonDocument {
    Stacks(JsonStacks),
    Volume(JsonVolume),
}

#[derive(Debug, Deserialize)]
struct JsonStacks {
    slc_files: Vec<String>,
    phase_files: Vec<String>,
    kz_files: Vec<String>,
    slc: JsonComplexArray,
    phase: JsonArray,
    kz: JsonArray,
}

#[derive(Debug, Deserialize)]
struct JsonVolume {
    absolute: JsonArray,
    normalized: JsonArray,
}

#[derive(Debug, Deserialize)]
struct JsonArray {
    shape: [usize; 3],
    data: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct JsonComplexArray {
    shape: [usize; 3],
    re: Vec<Option<f64>>,
    im: Vec<Option<f64>>,
}

fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let doc: JsonDocument = serde_json::from_str(&text).context("parsing JSON")?;

    match doc {
        JsonDocument::Volume(v) => Ok(Dataset::Volume(ReflectivityVolume {
            absolute: json_to_array3(v.absolute, "absolute")?,
            normalized: json_to_array3(v.normalized, "normalized")?,
        })),
        JsonDocument::Stacks(s) => {
            let [rows, cols, frames] = s.slc.shape;
            if s.slc.re.len() != s.slc.im.len() {
                bail!(
                    "slc: re has {} values but im has {}",
                    s.slc.re.len(),
                    s.slc.im.len()
                );
            }
            let values: Vec<Complex64> = s
                .slc
                .re
                .iter()
                .zip(s.slc.im.iter())
                .map(|(re, im)| Complex64::new(re.unwrap_or(f64::NAN), im.unwrap_or(f64::NAN)))
                .collect();
            let slc = Array3::from_shape_vec((rows, cols, frames), values)
                .with_context(|| format!("slc: data does not fit shape {:?}", s.slc.shape))?;

            Ok(Dataset::Stacks(InputStacks {
                slc_files: s.slc_files,
                phase_files: s.phase_files,
                kz_files: s.kz_files,
                slc,
                phase: json_to_array3(s.phase, "phase")?,
                kz: json_to_array3(s.kz, "kz")?,
            }))
        }
    }
}

fn json_to_array3(arr: JsonArray, name: &str) -> Result<Array3<f64>> {
    let [a, b, c] = arr.shape;
    let values: Vec<f64> = arr.data.iter().map(|v| v.unwrap_or(f64::NAN)).collect();
    Array3::from_shape_vec((a, b, c), values)
        .with_context(|| format!("{name}: data does not fit shape {:?}", arr.shape))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a long-format Parquet file.
///
/// Volume schema: `azimuth`, `range`, `height` (Int32/Int64) and `absolute`,
/// `normalized` (Float32/Float64).
///
/// Stack schema: `frame`, `row`, `col` (Int32/Int64) and `slc_re`, `slc_im`,
/// `phase`, `kz` (Float32/Float64). The label sequences live in the schema
/// metadata under `slc_files`, `phase_files` and `kz_files` as JSON arrays.
///
/// The array shape is the largest index per axis plus one; cells absent from
/// the file are NaN.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let schema = builder.schema().clone();
    let metadata = schema.metadata().clone();
    let has_column = |name: &str| schema.index_of(name).is_ok();

    let reader = builder.build().context("building parquet reader")?;
    let batches: Vec<RecordBatch> = reader
        .collect::<std::result::Result<_, _>>()
        .context("reading parquet record batch")?;

    if has_column("absolute") {
        read_volume(&batches).map(Dataset::Volume)
    } else if has_column("slc_re") {
        read_stacks(&batches, &metadata).map(Dataset::Stacks)
    } else {
        bail!("Parquet file has neither an 'absolute' nor an 'slc_re' column")
    }
}

fn read_volume(batches: &[RecordBatch]) -> Result<ReflectivityVolume> {
    let mut index = Vec::new();
    let mut absolute = Vec::new();
    let mut normalized = Vec::new();

    for batch in batches {
        let az = index_column(batch, "azimuth")?;
        let rg = index_column(batch, "range")?;
        let h = index_column(batch, "height")?;
        index.extend(az.into_iter().zip(rg).zip(h).map(|((a, r), h)| [a, r, h]));
        absolute.extend(float_column(batch, "absolute")?);
        normalized.extend(float_column(batch, "normalized")?);
    }

    let shape = shape_of(&index).context("sizing reflectivity volume")?;
    let mut abs_arr = Array3::from_elem(shape, f64::NAN);
    let mut norm_arr = Array3::from_elem(shape, f64::NAN);
    for ((idx, a), n) in index.iter().zip(absolute).zip(normalized) {
        abs_arr[*idx] = a;
        norm_arr[*idx] = n;
    }

    Ok(ReflectivityVolume {
        absolute: abs_arr,
        normalized: norm_arr,
    })
}

fn read_stacks(batches: &[RecordBatch], metadata: &HashMap<String, String>) -> Result<InputStacks> {
    let slc_files = label_metadata(metadata, SLC_FILES_KEY)?;
    let phase_files = label_metadata(metadata, PHASE_FILES_KEY)?;
    let kz_files = label_metadata(metadata, KZ_FILES_KEY)?;

    let mut index = Vec::new();
    let mut slc = Vec::new();
    let mut phase = Vec::new();
    let mut kz = Vec::new();

    for batch in batches {
        let frame = index_column(batch, "frame")?;
        let row = index_column(batch, "row")?;
        let col = index_column(batch, "col")?;
        index.extend(row.into_iter().zip(col).zip(frame).map(|((r, c), f)| [r, c, f]));

        let re = float_column(batch, "slc_re")?;
        let im = float_column(batch, "slc_im")?;
        slc.extend(re.into_iter().zip(im).map(|(re, im)| Complex64::new(re, im)));
        phase.extend(float_column(batch, "phase")?);
        kz.extend(float_column(batch, "kz")?);
    }

    let shape = shape_of(&index).context("sizing input stacks")?;
    let mut slc_arr = Array3::from_elem(shape, Complex64::new(f64::NAN, f64::NAN));
    let mut phase_arr = Array3::from_elem(shape, f64::NAN);
    let mut kz_arr = Array3::from_elem(shape, f64::NAN);
    for (i, idx) in index.iter().enumerate() {
        slc_arr[*idx] = slc[i];
        phase_arr[*idx] = phase[i];
        kz_arr[*idx] = kz[i];
    }

    Ok(InputStacks {
        slc_files,
        phase_files,
        kz_files,
        slc: slc_arr,
        phase: phase_arr,
        kz: kz_arr,
    })
}

// -- Parquet / Arrow helpers --

/// Largest index per axis plus one, refusing shapes over [`MAX_CELLS`].
fn shape_of(index: &[[usize; 3]]) -> Result<(usize, usize, usize)> {
    let mut shape = [0usize; 3];
    for idx in index {
        for (extent, &i) in shape.iter_mut().zip(idx) {
            let len = i.checked_add(1).context("index overflows")?;
            *extent = (*extent).max(len);
        }
    }
    let cells = shape
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .filter(|&n| n <= MAX_CELLS);
    if cells.is_none() {
        bail!("shape {shape:?} exceeds {MAX_CELLS} cells");
    }
    Ok((shape[0], shape[1], shape[2]))
}

fn label_metadata(metadata: &HashMap<String, String>, key: &str) -> Result<Vec<String>> {
    let raw = metadata
        .get(key)
        .with_context(|| format!("Parquet schema metadata missing '{key}'"))?;
    serde_json::from_str(raw).with_context(|| format!("parsing '{key}' metadata as a JSON string array"))
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .with_context(|| format!("Parquet file missing '{name}' column"))
}

/// Extract a non-negative integer index column (Int32 or Int64).
fn index_column(batch: &RecordBatch, name: &str) -> Result<Vec<usize>> {
    let col = column(batch, name)?;
    let values: Vec<Option<i64>> = match col.data_type() {
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            arr.iter().collect()
        }
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            arr.iter().map(|v| v.map(i64::from)).collect()
        }
        other => bail!("Column '{name}' is {other:?}, expected Int32 or Int64"),
    };

    values
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            let v = v.with_context(|| format!("Row {row}: '{name}' is null"))?;
            usize::try_from(v)
                .with_context(|| format!("Row {row}: '{name}' must be a non-negative index, got {v}"))
        })
        .collect()
}

/// Extract a float column (Float32 or Float64), nulls read as NaN.
fn float_column(batch: &RecordBatch, name: &str) -> Result<Vec<f64>> {
    let col = column(batch, name)?;
    if let Some(f64_arr) = col.as_any().downcast_ref::<Float64Array>() {
        Ok(f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(f32_arr) = col.as_any().downcast_ref::<Float32Array>() {
        Ok(f32_arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect())
    } else {
        bail!(
            "Column '{name}' is {:?}, expected Float64 or Float32",
            col.data_type()
        )
    }
}
