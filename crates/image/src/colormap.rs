#![allow(clippy::excessive_precision)]

use std::{fmt, str::FromStr};

/// Perceptually uniform sequential palettes for scalar visualization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Colormap {
    #[default]
    Magma,
    Inferno,
    Plasma,
    Viridis,
}

impl Colormap {
    pub const ALL: [Self; 4] = [Self::Magma, Self::Inferno, Self::Plasma, Self::Viridis];

    /// Map a normalized value to sRGB. Values outside [0, 1] are clamped.
    ///
    /// The value is first quantized to one of [`LUT_SIZE`] bins, the same
    /// way matplotlib indexes its colormap tables, so `map` and
    /// [`Colormap::lut`] always agree.
    pub fn map(&self, t: f32) -> [u8; 3] {
        self.entry(lut_index(t))
    }

    /// Color of table entry `index`, the colormap sampled at `index / 255`.
    pub fn entry(&self, index: usize) -> [u8; 3] {
        let t = index.min(LUT_SIZE - 1) as f32 / (LUT_SIZE - 1) as f32;
        let coeffs = match self {
            Colormap::Magma => &MAGMA,
            Colormap::Inferno => &INFERNO,
            Colormap::Plasma => &PLASMA,
            Colormap::Viridis => &VIRIDIS,
        };
        horner(coeffs, t)
    }

    /// Precompute the full table for per-pixel lookups.
    pub fn lut(&self) -> ColormapLut {
        let mut entries = [[0u8; 3]; LUT_SIZE];
        for (index, entry) in entries.iter_mut().enumerate() {
            *entry = self.entry(index);
        }
        ColormapLut(entries)
    }
}

pub const LUT_SIZE: usize = 256;

// int(t * 256) clamped to the last entry
fn lut_index(t: f32) -> usize {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    ((t * LUT_SIZE as f32) as usize).min(LUT_SIZE - 1)
}

/// Precomputed 256-entry colormap table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColormapLut([[u8; 3]; LUT_SIZE]);

impl ColormapLut {
    pub fn map(&self, t: f32) -> [u8; 3] {
        self.0[lut_index(t)]
    }

    pub fn entries(&self) -> &[[u8; 3]; LUT_SIZE] {
        &self.0
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Colormap::Magma => write!(f, "magma"),
            Colormap::Inferno => write!(f, "inferno"),
            Colormap::Plasma => write!(f, "plasma"),
            Colormap::Viridis => write!(f, "viridis"),
        }
    }
}

impl FromStr for Colormap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown colormap: {s} (expected magma, inferno, plasma or viridis)"))
    }
}

// Degree 6 polynomials fitted to the matplotlib colormaps, one row per power
// of t, columns r, g, b. Source: https://www.shadertoy.com/view/WlfXRN (CC0).
type Coefficients = [[f32; 3]; 7];

const MAGMA: Coefficients = [
    [-0.002136485053939, -0.000749655052795, -0.005386127855323],
    [0.2516605407371642, 0.6775232436837668, 2.494026599312351],
    [8.353717279216625, -3.577719514958484, 0.3144679030132573],
    [-27.66873308576866, 14.26473078096533, -13.64921318813922],
    [52.17613981234068, -27.94360607168351, 12.94416944238394],
    [-50.76852536473588, 29.04658282127291, 4.23415299384598],
    [18.65570506591883, -11.48977351997711, -5.601961508734096],
];

const INFERNO: Coefficients = [
    [0.00021894036911922, 0.0016510046310010, -0.019480898437091],
    [0.1065134194856116, 0.5639564367884091, 3.932712388889277],
    [11.60249308247187, -3.972853965665698, -15.9423941062914],
    [-41.70399613139459, 17.43639888205313, 44.35414519872813],
    [77.162935699427, -33.40235894210092, -81.80730925738993],
    [-71.31942824499214, 32.62606426397723, 73.20951985803202],
    [25.13112622477341, -12.24266895238567, -23.07032500287172],
];

const PLASMA: Coefficients = [
    [0.05873234392399702, 0.02333670892565664, 0.5433401826748754],
    [2.176514634195958, 0.2383834171260182, 0.7539604599784036],
    [-2.689460476458034, -7.455851135738909, 3.110799939717086],
    [6.130348345893603, 42.3461881477227, -28.51885465332158],
    [-11.10743619062271, -82.66631109428045, 60.13984767418263],
    [10.02306557647065, 71.41361770095349, -54.07218655560067],
    [-3.658713842777788, -22.93153465461149, 18.19190778539828],
];

const VIRIDIS: Coefficients = [
    [0.2777273272234177, 0.005407344544966578, 0.3340998053353061],
    [0.1050930431085774, 1.404613529898575, 1.384590162594685],
    [-0.3308618287255563, 0.214847559468213, 0.09509516302823659],
    [-4.634230498983486, -5.799100973351585, -19.33244095627987],
    [6.228269936347081, 14.17993336680509, 56.69055260068105],
    [4.776384997670288, -13.74514537774601, -65.35303263337234],
    [-5.435455855934631, 4.645852612178535, 26.3124352495832],
];

fn horner(coeffs: &Coefficients, t: f32) -> [u8; 3] {
    let mut rgb = [0u8; 3];
    for (channel, out) in rgb.iter_mut().enumerate() {
        let value = coeffs
            .iter()
            .rev()
            .fold(0.0f32, |acc, row| acc * t + row[channel]);
        *out = (value * 255.0).clamp(0.0, 255.0) as u8;
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luminance(c: [u8; 3]) -> f32 {
        0.2126 * c[0] as f32 + 0.7152 * c[1] as f32 + 0.0722 * c[2] as f32
    }

    #[test]
    fn test_magma_endpoints() {
        // matplotlib magma: #000004 at 0, #fcfdbf at 1
        let low = Colormap::Magma.map(0.0);
        let high = Colormap::Magma.map(1.0);
        assert!(low.iter().all(|&v| v <= 6), "{low:?}");
        assert!(high[0] >= 245 && high[1] >= 245 && high[2] >= 180, "{high:?}");
    }

    #[test]
    fn test_sequential_maps_increase_in_luminance() {
        for colormap in [Colormap::Magma, Colormap::Inferno, Colormap::Viridis] {
            let mut previous = -1.0;
            for i in 0..=10 {
                let l = luminance(colormap.map(i as f32 / 10.0));
                assert!(l > previous, "{colormap} not monotonic at {i}");
                previous = l;
            }
        }
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(Colormap::Magma.map(-3.0), Colormap::Magma.map(0.0));
        assert_eq!(Colormap::Magma.map(7.5), Colormap::Magma.map(1.0));
        assert_eq!(Colormap::Magma.map(f32::NAN), Colormap::Magma.map(0.0));
    }

    #[test]
    fn test_values_are_binned_like_matplotlib() {
        let lut = Colormap::Magma.lut();
        // int(0.5 * 256) = 128, int(0.503 * 256) = 128, int(0.505 * 256) = 129
        assert_eq!(lut.map(0.5), lut.entries()[128]);
        assert_eq!(lut.map(0.503), lut.entries()[128]);
        assert_eq!(lut.map(0.505), lut.entries()[129]);
        assert_eq!(lut.map(1.0 / 256.0 - 1e-4), lut.entries()[0]);
        assert_eq!(lut.map(1.0), lut.entries()[255]);
        for index in [0usize, 1, 17, 128, 254, 255] {
            assert_eq!(lut.map(index as f32 / 255.0), lut.entries()[index], "entry {index}");
        }
    }

    #[test]
    fn test_lut_agrees_with_map() {
        for colormap in Colormap::ALL {
            let lut = colormap.lut();
            for i in 0..=1000 {
                let t = i as f32 / 1000.0;
                assert_eq!(lut.map(t), colormap.map(t), "{colormap} at {t}");
            }
        }
    }

    #[test]
    fn test_parse_round_trips_names() {
        for colormap in Colormap::ALL {
            assert_eq!(colormap.to_string().parse::<Colormap>().unwrap(), colormap);
        }
        assert_eq!("MAGMA".parse::<Colormap>().unwrap(), Colormap::Magma);
        assert!("jet".parse::<Colormap>().is_err());
    }
}
