use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

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
}

/// One release file: header line, then one value per line.
fn write_column(path: &Path, header: &str, values: &[f64]) -> Result<()> {
    let mut text = format!("{header}\n");
    for v in values {
        writeln!(text, "{v:>14.7}")?;
    }
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let root = Path::new("sample_library");
    let mut rng = SimpleRng::new(42);

    // Two wavelength grids: ASD (shared by ASDFR/ASDHR/ASDNG) and BECK.
    let asd: Vec<f64> = (0..216).map(|i| 0.35 + i as f64 * 0.01).collect();
    let beck: Vec<f64> = (0..140).map(|i| 0.2 + i as f64 * 0.02).collect();

    fs::create_dir_all(root.join("errorbars"))?;
    let calibration = [
        ("splib07a_Wavenumbers_ASD.txt", "splib07a Record=1: Wavenumbers ASD 2151 channels", asd.iter().map(|w| 1.0e4 / w).collect::<Vec<_>>()),
        ("splib07a_Wavelengths_ASD_0.35-2.5_microns.txt", "splib07a Record=2: Wavelengths ASD 0.35-2.5 microns", asd.clone()),
        ("splib07a_Wavelengths_BECK_Beckman_0.2-3.0_microns.txt", "splib07a Record=3: Wavelengths BECK Beckman 0.2-3.0 microns", beck.clone()),
        ("splib07a_Bandpass_(FWHM)_ASDFR_StandardResolution.txt", "splib07a Record=4: Bandpass (FWHM) ASDFR StandardResolution", vec![0.01; asd.len()]),
        ("splib07a_Bandpass_(FWHM)_ASDHR_HighResolution.txt", "splib07a Record=5: Bandpass (FWHM) ASDHR HighResolution", vec![0.005; asd.len()]),
        ("splib07a_Bandpass_(FWHM)_BECK_Beckman.txt", "splib07a Record=6: Bandpass (FWHM) BECK Beckman", vec![0.02; beck.len()]),
    ];
    for (name, header, values) in &calibration {
        write_column(&root.join(name), header, values)?;
    }

    let samples = [
        ("ChapterM_Minerals", "Actinolite", "HS116.3B", "ASDFRb", 1.05),
        ("ChapterM_Minerals", "Albite", "GDS30", "BECKa", 0.55),
        ("ChapterM_Minerals", "Quartz", "GDS31", "ASDHRa", 2.2),
        ("ChapterV_Vegetation", "Grass_Golden_Dry", "GDS480", "ASDFRa", 1.45),
    ];

    let mut record = 100;
    for (folder, label, sample, instrument, band) in samples {
        let dir = root.join(folder);
        fs::create_dir_all(&dir)?;
        let grid = if instrument.starts_with("BECK") { &beck } else { &asd };
        let reflectance: Vec<f64> = grid
            .iter()
            .map(|&w| 0.6 - gaussian(w, band, 0.08, 0.3) + (rng.next_f64() - 0.5) * 0.01)
            .collect();
        let header = format!("splib07a Record={record}: {label} {sample} {instrument} AREF");
        let file = format!("splib07a_{label}_{sample}_{instrument}_AREF.txt");
        write_column(&dir.join(file), &header, &reflectance)?;
        record += 1;
    }

    println!("Wrote sample library to {}", root.display());
    Ok(())
}
