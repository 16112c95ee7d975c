//! Writes synthetic GPC export files (`*.rst`) for trying out the viewer.
//!
//! Usage: `generate_sample [OUT_DIR] [COUNT]`, writing `COUNT` files per sample.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser)]
#[command(name = "generate_sample")]
#[command(about = "Write synthetic GPC exports (*.rst) for the viewer")]
#[command(version)]
struct Args {
    /// Directory the export files are written into
    #[arg(default_value = "datapath")]
    out_dir: PathBuf,

    /// Files written per sample
    #[arg(default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    count: u32,
}

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    /// Uniform jitter in `[-scale, scale]`.
    fn jitter(&mut self, scale: f64) -> f64 {
        (self.next_f64() * 2.0 - 1.0) * scale
    }
}

/// One slice of a synthetic chromatogram.
struct Slice {
    log_m: f64,
    signal: f64,
}

/// Peak described by its centre and width in log10(M).
struct PeakShape {
    log_mp: f64,
    sigma: f64,
    amplitude: f64,
}

fn peak_slices(shape: &PeakShape, rng: &mut SimpleRng) -> Vec<Slice> {
    let step = 0.02;
    let lo = shape.log_mp - 4.0 * shape.sigma;
    let n = ((8.0 * shape.sigma) / step) as usize;
    (0..n)
        .map(|i| {
            let log_m = lo + i as f64 * step;
            let noise = 1.0 + rng.jitter(0.01);
            Slice {
                log_m,
                signal: gaussian(log_m, shape.log_mp, shape.sigma, shape.amplitude) * noise,
            }
        })
        .collect()
}

/// Mp, Mn, Mw, Mz, Mz+1, Mv, PD of one peak.
fn averages(slices: &[Slice]) -> [f64; 7] {
    let mut sums = [0.0f64; 5]; // Σw/M, Σw, ΣwM, ΣwM², ΣwM³
    let mut mv_sum = 0.0;
    let a = 0.725;
    let mut mp = (0.0, f64::MIN);
    for s in slices {
        let m = 10f64.powf(s.log_m);
        let w = s.signal;
        sums[0] += w / m;
        sums[1] += w;
        sums[2] += w * m;
        sums[3] += w * m * m;
        sums[4] += w * m * m * m;
        mv_sum += w * m.powf(a);
        if w > mp.1 {
            mp = (m, w);
        }
    }
    let mn = sums[1] / sums[0];
    let mw = sums[2] / sums[1];
    let mz = sums[3] / sums[2];
    let mz1 = sums[4] / sums[3];
    let mv = (mv_sum / sums[1]).powf(1.0 / a);
    [mp.0, mn, mw, mz, mz1, mv, mw / mn]
}

fn render_export(sample: &str, shapes: &[PeakShape], rng: &mut SimpleRng) -> Result<String> {
    let peaks: Vec<Vec<Slice>> = shapes.iter().map(|s| peak_slices(s, rng)).collect();
    let total: f64 = peaks.iter().flatten().map(|s| s.signal).sum();

    let mut out = String::new();
    writeln!(out, "Sample Name\t{sample}\t")?;
    writeln!(out, "Instrument\tSynthetic GPC")?;
    writeln!(out)?;
    writeln!(out, "<MW_Averages>")?;
    writeln!(out, "Peak\tMp\tMn\tMw\tMz\tMz+1\tMv\tPD")?;
    writeln!(out, "\t(g/mol)\t(g/mol)\t(g/mol)\t(g/mol)\t(g/mol)\t(g/mol)\t")?;
    for (i, slices) in peaks.iter().enumerate() {
        let [mp, mn, mw, mz, mz1, mv, pd] = averages(slices);
        writeln!(
            out,
            "{}\t{mp:.0}\t{mn:.0}\t{mw:.0}\t{mz:.0}\t{mz1:.0}\t{mv:.0}\t{pd:.3}",
            i + 1
        )?;
    }
    writeln!(out, "</MW_Averages>")?;
    writeln!(out)?;
    writeln!(out, "<Slice_Table>")?;
    for (i, slices) in peaks.iter().enumerate() {
        writeln!(out, "Peak {}", i + 1)?;
        writeln!(out, "RT (min)\tHeight\tNorm. Area\tlog M\tM\tlog M\tdw/dlogM\t")?;
        for s in slices {
            let rt = 25.0 - 2.0 * s.log_m;
            writeln!(
                out,
                "{rt:.4}\t{:.4}\t{:.6e}\t{:.4}\t{:.1}\t{:.4}\t{:.6}\t",
                s.signal * 100.0,
                s.signal / total,
                s.log_m,
                10f64.powf(s.log_m),
                s.log_m,
                s.signal
            )?;
        }
    }
    writeln!(out, "</Slice_Table>")?;
    Ok(out)
}

fn main() -> Result<()> {
    env_logger::init();

    let Args { out_dir, count } = Args::parse();

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    let samples: Vec<(&str, Vec<(f64, f64, f64)>)> = vec![
        ("PE-HD", vec![(5.1, 0.35, 1.0)]),
        ("PP-Random", vec![(5.5, 0.30, 0.9), (3.4, 0.15, 0.2)]),
        ("PS-Std", vec![(4.7, 0.08, 1.2)]),
    ];

    let mut written = 0;
    for (name, shapes) in &samples {
        for run in 0..count {
            let shapes: Vec<PeakShape> = shapes
                .iter()
                .map(|&(log_mp, sigma, amplitude)| PeakShape {
                    log_mp: log_mp + rng.jitter(0.02),
                    sigma,
                    amplitude,
                })
                .collect();
            let text = render_export(name, &shapes, &mut rng)?;
            let path = out_dir.join(format!("{name}_{}.rst", run + 1));
            std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
            log::debug!("wrote {}", path.display());
            written += 1;
        }
    }

    println!("Wrote {written} export files to {}", out_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn arguments_default_to_datapath_and_two() {
        let args = Args::try_parse_from(["generate_sample"]).unwrap();
        assert_eq!(args.out_dir, PathBuf::from("datapath"));
        assert_eq!(args.count, 2);
    }

    #[test]
    fn help_is_not_taken_as_a_directory() {
        let err = Args::try_parse_from(["generate_sample", "--help"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn count_must_be_a_positive_number() {
        assert!(Args::try_parse_from(["generate_sample", "out", "x"]).is_err());
        assert!(Args::try_parse_from(["generate_sample", "out", "0"]).is_err());
        let args = Args::try_parse_from(["generate_sample", "out", "5"]).unwrap();
        assert_eq!(args.count, 5);
    }

    #[test]
    fn rendered_export_parses_back() {
        let mut rng = SimpleRng::new(7);
        let shapes = [PeakShape {
            log_mp: 4.5,
            sigma: 0.2,
            amplitude: 1.0,
        }];
        let text = render_export("PS-Test", &shapes, &mut rng).unwrap();
        let doc = rusty_gpc::data::model::Document::from_text("t.rst", &text);
        let file = rusty_gpc::data::loader::parse_document(&doc).unwrap();
        assert_eq!(file.sample_name, "PS-Test");
        assert_eq!(file.averages.len(), 1);
        assert_eq!(file.peaks.len(), 1);
    }
}
