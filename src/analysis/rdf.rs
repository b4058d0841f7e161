use std::f64::consts::PI;
use std::io::{Seek, SeekFrom, Write};
use std::sync::Arc;

use ndarray::Array1;

use crate::Error;
use crate::categories::Category;
use crate::systems::System;

use super::{AnalysisBase, Sampler, Output, GroupMatch};

/// Parameters of a radial distribution function analysis
#[derive(Debug, Clone)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
pub struct RadialDistributionParameters {
    /// width of the histogram bins
    pub bin_size: f64,
    /// sampling period, in trajectory frames
    pub period: usize,
}

/// Radial distribution function g(r): a histogram of pair distances up to
/// the category cutoff, normalized by the ideal gas density when written
/// out.
///
/// Pairs are only counted between the two selection groups of the analysis
/// (or between all particles when unspecialized), and each pair is counted
/// once.
#[derive(serde::Serialize)]
pub struct RadialDistribution {
    parameters: RadialDistributionParameters,
    /// cutoff of the underlying category, also the upper end of the
    /// histogram range
    cutoff: f64,
    /// per-bin pair counts
    hist: Array1<u64>,
    sampler: Sampler,
}

impl RadialDistribution {
    /// Create a new RDF analysis reading from `category` and writing to
    /// `output`.
    ///
    /// The histogram range is bound to the category cutoff, so the category
    /// must expose one; this fails with [`Error::MissingCutoff`] otherwise.
    pub fn new(
        category: Arc<dyn Category>,
        parameters: RadialDistributionParameters,
        output: Output,
    ) -> Result<RadialDistribution, Error> {
        let cutoff = match category.cutoff() {
            Some(cutoff) => cutoff,
            None => {
                return Err(Error::MissingCutoff(format!(
                    "can not compute a radial distribution over the '{}' category",
                    category.name()
                )));
            }
        };

        if !(parameters.bin_size > 0.0 && parameters.bin_size.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "bin size must be positive and finite, got {}", parameters.bin_size
            )));
        }

        let n_bins = f64::ceil(cutoff / parameters.bin_size) as usize;
        let sampler = Sampler::new(category, parameters.period, output)?;

        return Ok(RadialDistribution {
            parameters: parameters,
            cutoff: cutoff,
            hist: Array1::zeros(n_bins),
            sampler: sampler,
        });
    }

    /// Get the raw per-bin pair counts accumulated so far
    pub fn histogram(&self) -> &Array1<u64> {
        &self.hist
    }
}

impl AnalysisBase for RadialDistribution {
    fn name(&self) -> String {
        "radial distribution function".into()
    }

    fn parameters(&self) -> String {
        serde_json::to_string(&self.parameters).expect("failed to serialize to JSON")
    }

    fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    fn sampler_mut(&mut self) -> &mut Sampler {
        &mut self.sampler
    }

    #[time_graph::instrument(name = "RadialDistribution::do_update")]
    fn do_update(&mut self, system: &dyn System) -> Result<(), Error> {
        let category = Arc::clone(self.sampler.category());

        for i in 0..system.size()? {
            let mask = match self.sampler.filter().group(i) {
                GroupMatch::Skip => continue,
                GroupMatch::Complement(mask) => mask,
            };

            for vector in category.neighbor_vectors(i, system, mask)? {
                // count each pair once; synthetic neighbors never qualify
                if let Some(j) = vector.neighbor {
                    if i < j {
                        let bin = f64::floor(vector.distance / self.parameters.bin_size) as usize;
                        if bin < self.hist.len() {
                            self.hist[bin] += 1;
                        }
                    }
                }
            }
        }

        return Ok(());
    }

    fn write(&mut self) -> Result<(), Error> {
        let total = self.hist.sum() as f64;
        let density = total / (4.0 / 3.0 * PI * self.cutoff * self.cutoff * self.cutoff);

        let file = self.sampler.output_mut().handle()?;
        // overwrite in place, repeated writes of the same state must produce
        // the same file
        file.seek(SeekFrom::Start(0))?;

        for (bin, count) in self.hist.iter().enumerate() {
            let inner = bin as f64 * self.parameters.bin_size;
            let outer = inner + self.parameters.bin_size;
            let radius = 0.5 * (inner + outer);

            let gr = if density > 0.0 {
                3.0 * (*count as f64) / (density * 4.0 * PI * (outer.powi(3) - inner.powi(3)))
            } else {
                0.0
            };

            writeln!(file, "{:10} {:10}", radius, gr)?;
        }

        let position = file.stream_position()?;
        file.set_len(position)?;
        file.flush()?;

        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use crate::analysis::Analysis;
    use crate::categories::{CategoryRegistry, Global};
    use crate::systems::test_utils::test_system;
    use crate::Vector3D;

    use super::*;

    fn rdf(category: Arc<dyn Category>, bin_size: f64, period: usize, path: &std::path::Path) -> RadialDistribution {
        RadialDistribution::new(
            category,
            RadialDistributionParameters { bin_size, period },
            Output::new(path),
        ).unwrap()
    }

    #[test]
    fn name_and_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let registry = CategoryRegistry::new();

        let analysis = Analysis::from(Box::new(rdf(
            registry.pairwise(1.5).unwrap(),
            0.5,
            1,
            &dir.path().join("rdf.dat"),
        )) as Box<dyn AnalysisBase>);

        assert_eq!(analysis.name(), "radial distribution function");
        assert_eq!(analysis.parameters(), "{\"bin_size\":0.5,\"period\":1}");
    }

    #[test]
    fn missing_cutoff() {
        let dir = tempfile::tempdir().unwrap();
        let result = RadialDistribution::new(
            Arc::new(Global::new(Vector3D::new(0.0, 0.0, 1.0))),
            RadialDistributionParameters { bin_size: 0.1, period: 1 },
            Output::new(dir.path().join("rdf.dat")),
        );

        assert!(matches!(result, Err(Error::MissingCutoff(_))));
    }

    #[test]
    fn invalid_bin_size() {
        let dir = tempfile::tempdir().unwrap();
        let registry = CategoryRegistry::new();
        let result = RadialDistribution::new(
            registry.pairwise(1.5).unwrap(),
            RadialDistributionParameters { bin_size: 0.0, period: 1 },
            Output::new(dir.path().join("rdf.dat")),
        );

        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn histogram_accumulation() {
        let dir = tempfile::tempdir().unwrap();
        let registry = CategoryRegistry::new();
        let system = test_system("line");

        let category = registry.pairwise(1.5).unwrap();
        category.setup(&system).unwrap();

        // 3 pairs at distance 1.0 per sampled frame, all in bin 2
        let mut analysis = rdf(category, 0.5, 2, &dir.path().join("rdf.dat"));
        analysis.sampler_mut().attach(&system).unwrap();

        // period 2: frames 0 and 2 are sampled, frames 1 and 3 are not
        for _ in 0..4 {
            if analysis.sampler_mut().tick() {
                analysis.do_update(&system).unwrap();
            }
        }

        assert_eq!(analysis.histogram().as_slice().unwrap(), [0, 0, 6]);
    }

    #[test]
    fn type_specialization() {
        let dir = tempfile::tempdir().unwrap();
        let registry = CategoryRegistry::new();
        let system = test_system("water");

        let mut analysis = Analysis::from(Box::new(rdf(
            registry.pairwise(2.0).unwrap(),
            0.25,
            1,
            &dir.path().join("rdf.dat"),
        )) as Box<dyn AnalysisBase>);

        analysis.specialize_types(Some("OW"), Some("HW"));
        analysis.attach(&system).unwrap();
        analysis.update(&system).unwrap();
        analysis.write().unwrap();

        // only O-H pairs are counted, not H-H, so some bins are non-zero
        let content = std::fs::read_to_string(dir.path().join("rdf.dat")).unwrap();
        let counted: f64 = content.lines()
            .map(|line| {
                line.split_whitespace().last().unwrap().parse::<f64>().unwrap()
            })
            .sum();
        assert!(counted > 0.0);
    }

    #[test]
    fn write_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rdf.dat");
        let registry = CategoryRegistry::new();
        let system = test_system("line");

        let mut analysis = Analysis::from(Box::new(rdf(
            registry.pairwise(1.5).unwrap(),
            0.5,
            1,
            &path,
        )) as Box<dyn AnalysisBase>);

        analysis.attach(&system).unwrap();
        analysis.update(&system).unwrap();

        analysis.write().unwrap();
        let first = std::fs::read_to_string(&path).unwrap();

        analysis.write().unwrap();
        let second = std::fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.lines().count(), 3);
    }
}
