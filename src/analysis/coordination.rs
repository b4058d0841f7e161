use std::io::{Seek, SeekFrom, Write};
use std::sync::Arc;

use log::warn;

use crate::Error;
use crate::categories::Category;
use crate::systems::System;

use super::{AnalysisBase, Sampler, Output, GroupMatch};

/// Parameters of a coordination number analysis
#[derive(Debug, Clone)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
pub struct CoordinationNumberParameters {
    /// coordination radius, pairs closer than this distance are counted
    pub r0: f64,
    /// sampling period, in trajectory frames
    pub period: usize,
}

/// Mean coordination number of the selected particles: the average number
/// of neighbors closer than `r0`, computed from the latest sampled frame
/// only.
#[derive(serde::Serialize)]
pub struct CoordinationNumber {
    parameters: CoordinationNumberParameters,
    /// value from the latest sampled frame
    coordination: f64,
    sampler: Sampler,
}

impl CoordinationNumber {
    pub fn new(
        category: Arc<dyn Category>,
        parameters: CoordinationNumberParameters,
        output: Output,
    ) -> Result<CoordinationNumber, Error> {
        if !(parameters.r0 > 0.0 && parameters.r0.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "coordination radius must be positive and finite, got {}", parameters.r0
            )));
        }

        if let Some(cutoff) = category.cutoff() {
            if parameters.r0 > cutoff {
                warn!(
                    "coordination radius ({}) is larger than the '{}' category cutoff, \
                     pairs between {} and {} will never be counted",
                    parameters.r0, category.name(), cutoff, parameters.r0
                );
            }
        }

        let sampler = Sampler::new(category, parameters.period, output)?;

        return Ok(CoordinationNumber {
            parameters: parameters,
            coordination: 0.0,
            sampler: sampler,
        });
    }

    /// Get the coordination number from the latest sampled frame
    pub fn coordination(&self) -> f64 {
        self.coordination
    }
}

impl AnalysisBase for CoordinationNumber {
    fn name(&self) -> String {
        "coordination number".into()
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

    #[time_graph::instrument(name = "CoordinationNumber::do_update")]
    fn do_update(&mut self, system: &dyn System) -> Result<(), Error> {
        let category = Arc::clone(self.sampler.category());

        let mut pairs = 0;
        let mut contributors = 0;
        for i in 0..system.size()? {
            let mask = match self.sampler.filter().group(i) {
                GroupMatch::Skip => continue,
                GroupMatch::Complement(mask) => mask,
            };
            contributors += 1;

            for vector in category.neighbor_vectors(i, system, mask)? {
                if let Some(j) = vector.neighbor {
                    if i < j && vector.distance < self.parameters.r0 {
                        pairs += 1;
                    }
                }
            }
        }

        // each pair was counted once but coordinates two particles
        self.coordination = if contributors == 0 {
            0.0
        } else {
            2.0 * pairs as f64 / contributors as f64
        };

        return Ok(());
    }

    fn write(&mut self) -> Result<(), Error> {
        let file = self.sampler.output_mut().handle()?;
        file.seek(SeekFrom::Start(0))?;

        writeln!(file, "{:10}", self.coordination)?;

        let position = file.stream_position()?;
        file.set_len(position)?;
        file.flush()?;

        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use crate::analysis::Analysis;
    use crate::categories::CategoryRegistry;
    use crate::systems::test_utils::test_system;

    use super::*;

    fn coordination(
        category: Arc<dyn Category>,
        r0: f64,
        period: usize,
        path: &std::path::Path,
    ) -> CoordinationNumber {
        CoordinationNumber::new(
            category,
            CoordinationNumberParameters { r0, period },
            Output::new(path),
        ).unwrap()
    }

    #[test]
    fn name_and_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let registry = CategoryRegistry::new();

        let analysis = Analysis::from(Box::new(coordination(
            registry.pairwise(1.5).unwrap(),
            1.1,
            1,
            &dir.path().join("cn.dat"),
        )) as Box<dyn AnalysisBase>);

        assert_eq!(analysis.name(), "coordination number");
        assert_eq!(analysis.parameters(), "{\"r0\":1.1,\"period\":1}");
    }

    #[test]
    fn invalid_radius() {
        let dir = tempfile::tempdir().unwrap();
        let registry = CategoryRegistry::new();
        let result = CoordinationNumber::new(
            registry.pairwise(1.5).unwrap(),
            CoordinationNumberParameters { r0: -1.0, period: 1 },
            Output::new(dir.path().join("cn.dat")),
        );

        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn atoms_on_a_line() {
        let dir = tempfile::tempdir().unwrap();
        let registry = CategoryRegistry::new();
        let system = test_system("line");

        let category = registry.pairwise(1.5).unwrap();
        category.setup(&system).unwrap();

        // 3 pairs at distance 1.0 between 4 contributing atoms
        let mut analysis = coordination(category, 1.1, 1, &dir.path().join("cn.dat"));
        analysis.sampler_mut().attach(&system).unwrap();
        analysis.do_update(&system).unwrap();

        assert_eq!(analysis.coordination(), 2.0 * 3.0 / 4.0);
    }

    #[test]
    fn radius_below_all_distances() {
        let dir = tempfile::tempdir().unwrap();
        let registry = CategoryRegistry::new();
        let system = test_system("line");

        let category = registry.pairwise(1.5).unwrap();
        category.setup(&system).unwrap();

        let mut analysis = coordination(category, 0.5, 1, &dir.path().join("cn.dat"));
        analysis.sampler_mut().attach(&system).unwrap();
        analysis.do_update(&system).unwrap();

        assert_eq!(analysis.coordination(), 0.0);
    }

    #[test]
    fn latest_frame_only() {
        let dir = tempfile::tempdir().unwrap();
        let registry = CategoryRegistry::new();
        let mut system = test_system("line");

        let category = registry.pairwise(1.5).unwrap();
        category.setup(&system).unwrap();

        let mut analysis = Analysis::from(Box::new(coordination(
            registry.shared_pairwise().unwrap(),
            1.1,
            1,
            &dir.path().join("cn.dat"),
        )) as Box<dyn AnalysisBase>);
        analysis.attach(&system).unwrap();
        analysis.update(&system).unwrap();

        // rebuild the neighbor list after moving an atom out of range
        system.positions_mut()[3] = crate::Vector3D::new(100.0, 0.0, 0.0);
        analysis.category().teardown();
        analysis.update(&system).unwrap();
        analysis.write().unwrap();

        // 2 remaining pairs, 4 contributors, not averaged over the
        // previous frames
        let content = std::fs::read_to_string(dir.path().join("cn.dat")).unwrap();
        let value: f64 = content.trim().parse().unwrap();
        assert_eq!(value, 2.0 * 2.0 / 4.0);
    }

    #[test]
    fn no_contributors() {
        let dir = tempfile::tempdir().unwrap();
        let registry = CategoryRegistry::new();
        let system = test_system("line");

        let category = registry.pairwise(1.5).unwrap();
        category.setup(&system).unwrap();

        let mut analysis = Analysis::from(Box::new(coordination(
            category,
            1.1,
            1,
            &dir.path().join("cn.dat"),
        )) as Box<dyn AnalysisBase>);
        analysis.specialize_types(Some("OW"), Some("OW"));
        analysis.attach(&system).unwrap();
        analysis.update(&system).unwrap();
        analysis.write().unwrap();

        let content = std::fs::read_to_string(dir.path().join("cn.dat")).unwrap();
        let value: f64 = content.trim().parse().unwrap();
        assert_eq!(value, 0.0);
    }
}
