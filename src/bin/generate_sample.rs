use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 64;
const COLS: usize = 80;
const FRAMES: usize = 12;

const AZIMUTH: usize = 60;
const RANGE: usize = 80;
const HALF_HEIGHT: i64 = 40;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }
}

/// Terrain height (metres) under an image position, both axes normalised to [0, 1].
fn terrain(u: f64, v: f64) -> f64 {
    -20.0 + 8.0 * (PI * u).sin() * (PI * v).cos()
}

/// Whether a position is covered by forest.
fn forest(u: f64, v: f64) -> bool {
    (u - 0.55).powi(2) + (v - 0.4).powi(2) < 0.09
}

fn write_parquet(path: &str, schema: Schema, columns: Vec<ArrayRef>) -> Result<()> {
    let schema = Arc::new(schema);
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// SLC speckle over a bright-forest scene, a topographic phase ramp that
/// steepens with the baseline, and a per-frame wavenumber.
fn write_stacks(rng: &mut SimpleRng, path: &str) -> Result<()> {
    let n = ROWS * COLS * FRAMES;
    let mut frame = Vec::with_capacity(n);
    let mut row = Vec::with_capacity(n);
    let mut col = Vec::with_capacity(n);
    let mut slc_re = Vec::with_capacity(n);
    let mut slc_im = Vec::with_capacity(n);
    let mut phase = Vec::with_capacity(n);
    let mut kz = Vec::with_capacity(n);

    for f in 0..FRAMES {
        let baseline = f as f64 - (FRAMES / 2) as f64;
        for r in 0..ROWS {
            for c in 0..COLS {
                let u = r as f64 / ROWS as f64;
                let v = c as f64 / COLS as f64;
                let base = if forest(u, v) { 3.0 } else { 1.0 };
                let backscatter = base + gaussian(v, 0.8, 0.03, 6.0);
                let sigma = backscatter.sqrt() / 2f64.sqrt();
                let k = 0.01 * baseline * (1.0 + 0.3 * v);
                let topo = k * terrain(u, v);

                frame.push(f as i64);
                row.push(r as i64);
                col.push(c as i64);
                slc_re.push(rng.gauss(0.0, sigma));
                slc_im.push(rng.gauss(0.0, sigma));
                phase.push((topo + PI).rem_euclid(2.0 * PI) - PI);
                kz.push(k);
            }
        }
    }

    let dates: Vec<String> = (0..FRAMES)
        .map(|f| format!("2019{:02}{:02}", 1 + f / 2, 1 + 12 * (f % 2)))
        .collect();
    let labels = |prefix: &str| -> Result<String> {
        let files: Vec<String> = dates
            .iter()
            .map(|d| format!("stack/{prefix}/{prefix}_{d}.tif"))
            .collect();
        serde_json::to_string(&files).context("encoding labels")
    };
    let metadata = HashMap::from([
        ("slc_files".to_string(), labels("slc")?),
        ("phase_files".to_string(), labels("phase")?),
        ("kz_files".to_string(), labels("kz")?),
    ]);

    let int = |name: &str| Field::new(name, DataType::Int64, false);
    let float = |name: &str| Field::new(name, DataType::Float64, false);
    let schema = Schema::new(vec![
        int("frame"),
        int("row"),
        int("col"),
        float("slc_re"),
        float("slc_im"),
        float("phase"),
        float("kz"),
    ])
    .with_metadata(metadata);

    write_parquet(
        path,
        schema,
        vec![
            Arc::new(Int64Array::from(frame)),
            Arc::new(Int64Array::from(row)),
            Arc::new(Int64Array::from(col)),
            Arc::new(Float64Array::from(slc_re)),
            Arc::new(Float64Array::from(slc_im)),
            Arc::new(Float64Array::from(phase)),
            Arc::new(Float64Array::from(kz)),
        ],
    )
}

/// Ground return following the terrain plus a canopy layer over the forest.
/// The normalized volume divides every height layer by its maximum.
fn write_volume(rng: &mut SimpleRng, path: &str) -> Result<()> {
    let n_height = (2 * HALF_HEIGHT + 1) as usize;
    let mut absolute = vec![0.0; AZIMUTH * RANGE * n_height];
    let idx = |a: usize, r: usize, h: usize| (a * RANGE + r) * n_height + h;

    for a in 0..AZIMUTH {
        for r in 0..RANGE {
            let u = a as f64 / AZIMUTH as f64;
            let v = r as f64 / RANGE as f64;
            let ground = terrain(u, v);
            for h in 0..n_height {
                // Height index 0 is the top of the volume.
                let z = (HALF_HEIGHT - h as i64) as f64;
                let mut value = gaussian(z, ground, 2.5, 1.0);
                if forest(u, v) {
                    value += gaussian(z, ground + 25.0, 6.0, 0.6);
                }
                absolute[idx(a, r, h)] = (value + rng.gauss(0.0, 0.02)).abs();
            }
        }
    }

    let mut layer_max = vec![0.0_f64; n_height];
    for (i, v) in absolute.iter().enumerate() {
        let h = i % n_height;
        layer_max[h] = layer_max[h].max(*v);
    }
    let normalized: Vec<f64> = absolute
        .iter()
        .enumerate()
        .map(|(i, v)| v / layer_max[i % n_height].max(f64::EPSILON))
        .collect();

    let mut azimuth = Vec::with_capacity(absolute.len());
    let mut range = Vec::with_capacity(absolute.len());
    let mut height = Vec::with_capacity(absolute.len());
    for a in 0..AZIMUTH {
        for r in 0..RANGE {
            for h in 0..n_height {
                azimuth.push(a as i64);
                range.push(r as i64);
                height.push(h as i64);
            }
        }
    }

    let schema = Schema::new(vec![
        Field::new("azimuth", DataType::Int64, false),
        Field::new("range", DataType::Int64, false),
        Field::new("height", DataType::Int64, false),
        Field::new("absolute", DataType::Float64, false),
        Field::new("normalized", DataType::Float64, false),
    ]);

    write_parquet(
        path,
        schema,
        vec![
            Arc::new(Int64Array::from(azimuth)),
            Arc::new(Int64Array::from(range)),
            Arc::new(Int64Array::from(height)),
            Arc::new(Float64Array::from(absolute)),
            Arc::new(Float64Array::from(normalized)),
        ],
    )
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let stacks_path = "sample_stacks.parquet";
    write_stacks(&mut rng, stacks_path)?;
    println!("Wrote {FRAMES} frames of {ROWS}×{COLS} pixels to {stacks_path}");

    let volume_path = "sample_volume.parquet";
    write_volume(&mut rng, volume_path)?;
    println!(
        "Wrote {AZIMUTH}×{RANGE}×{} voxels to {volume_path}",
        2 * HALF_HEIGHT + 1
    );
    Ok(())
}
