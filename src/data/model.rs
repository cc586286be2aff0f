use std::path::Path;

use ndarray::Array3;
use num_complex::Complex64;

// ---------------------------------------------------------------------------
// InputStacks – the co-registered inputs of a tomographic inversion
// ---------------------------------------------------------------------------

/// SLC, topographic phase and vertical wavenumber stacks, indexed
/// `[row, column, frame]`, together with the file labels of each frame.
#[derive(Debug, Clone)]
pub struct InputStacks {
    /// Source file paths of the SLC frames.
    pub slc_files: Vec<String>,
    /// Source file paths of the topographic phase frames.
    pub phase_files: Vec<String>,
    /// Source file paths of the wavenumber frames.
    pub kz_files: Vec<String>,
    /// Complex SLC stack.
    pub slc: Array3<Complex64>,
    /// Topographic phase stack.
    pub phase: Array3<f64>,
    /// Vertical wavenumber stack.
    pub kz: Array3<f64>,
}

impl InputStacks {
    /// Number of frames along the stack axis of the SLC stack.
    pub fn n_frames(&self) -> usize {
        self.slc.dim().2
    }
}

// ---------------------------------------------------------------------------
// ReflectivityVolume – output of the beamforming inversion
// ---------------------------------------------------------------------------

/// Absolute and normalized reflectivity, indexed `[azimuth, range, height]`.
///
/// Height index 0 holds the topmost layer. The two arrays are expected to
/// share one shape, which is checked when an explorer is built from them.
#[derive(Debug, Clone)]
pub struct ReflectivityVolume {
    pub absolute: Array3<f64>,
    pub normalized: Array3<f64>,
}

// ---------------------------------------------------------------------------
// Dataset – whatever a file contained
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Dataset {
    Stacks(InputStacks),
    Volume(ReflectivityVolume),
}

impl Dataset {
    /// Short human readable summary for the log and status line.
    pub fn describe(&self) -> String {
        match self {
            Dataset::Stacks(s) => {
                let (rows, cols, frames) = s.slc.dim();
                format!("input stacks: {frames} frames of {rows}×{cols} pixels")
            }
            Dataset::Volume(v) => {
                let (az, rg, h) = v.absolute.dim();
                format!("reflectivity volume: {az} azimuth × {rg} range × {h} height")
            }
        }
    }
}

/// The final path component of a label, or the label itself when it has none.
pub fn basename(label: &str) -> String {
    Path::new(label)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename_strips_directories() {
        assert_eq!(basename("/data/stack/slc_20190101.tif"), "slc_20190101.tif");
        assert_eq!(basename("relative/kz_03.tif"), "kz_03.tif");
        assert_eq!(basename("plain.tif"), "plain.tif");
    }

    #[test]
    fn test_describe_volume() {
        let ds = Dataset::Volume(ReflectivityVolume {
            absolute: Array3::zeros((4, 5, 9)),
            normalized: Array3::zeros((4, 5, 9)),
        });
        assert_eq!(
            ds.describe(),
            "reflectivity volume: 4 azimuth × 5 range × 9 height"
        );
    }
}
