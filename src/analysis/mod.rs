//! Periodic sampling analyses consuming the neighbor vector streams of
//! interaction categories.
//!
//! Concrete analyses implement [`AnalysisBase`] and are driven through the
//! [`Analysis`] wrapper: the orchestrating code calls
//! [`Analysis::attach`] once the trajectory context is available, then
//! [`Analysis::update`] once per trajectory frame and [`Analysis::write`]
//! whenever output is wanted. Frames are subsampled with a fixed stride, an
//! analysis with period N does real work every Nth frame.

use std::sync::Arc;

use crate::{Error, System};
use crate::categories::Category;

mod selection;
pub use self::selection::{TypeFilter, GroupMatch};

mod output;
pub use self::output::Output;

mod rdf;
pub use self::rdf::{RadialDistribution, RadialDistributionParameters};

mod coordination;
pub use self::coordination::{CoordinationNumber, CoordinationNumberParameters};

/// State shared by all analyses: the interaction category supplying neighbor
/// vectors, the sampling stride, the type/state filter and the output
/// destination.
#[derive(serde::Serialize)]
pub struct Sampler {
    #[serde(skip)]
    category: Arc<dyn Category>,
    period: usize,
    update_counts: usize,
    filter: TypeFilter,
    output: Output,
}

impl Sampler {
    /// Create a new sampler reading from `category` every `period` frames
    /// and writing to `output`
    pub fn new(category: Arc<dyn Category>, period: usize, output: Output) -> Result<Sampler, Error> {
        if period == 0 {
            return Err(Error::InvalidParameter("sampling period can not be zero".into()));
        }

        return Ok(Sampler {
            category: category,
            period: period,
            update_counts: 0,
            filter: TypeFilter::new(),
            output: output,
        });
    }

    /// Build the selection masks against the given system. Idempotent, masks
    /// are built once per analysis lifetime.
    pub fn attach(&mut self, system: &dyn System) -> Result<(), Error> {
        self.filter.build_masks(system)
    }

    /// Record one trajectory frame, and check whether it falls on the
    /// sampling stride. The frame counter always advances, whether or not
    /// the frame is sampled.
    pub fn tick(&mut self) -> bool {
        let due = self.update_counts % self.period == 0;
        self.update_counts += 1;
        return due;
    }

    /// Get the category this sampler reads neighbor vectors from
    pub fn category(&self) -> &Arc<dyn Category> {
        &self.category
    }

    /// Get the sampling period, in trajectory frames
    pub fn period(&self) -> usize {
        self.period
    }

    /// Get the number of frames seen so far
    pub fn update_counts(&self) -> usize {
        self.update_counts
    }

    /// Get the type/state filter of this analysis
    pub fn filter(&self) -> &TypeFilter {
        &self.filter
    }

    /// Get mutable access to the type/state filter, to specialize it before
    /// the analysis is attached
    pub fn filter_mut(&mut self) -> &mut TypeFilter {
        &mut self.filter
    }

    /// Get mutable access to the output destination
    pub fn output_mut(&mut self) -> &mut Output {
        &mut self.output
    }
}

/// Trait implemented by all analyses.
///
/// The methods here cover the analysis-specific parts: the statistic
/// accumulation itself and its serialization to the output destination. The
/// shared mechanics (stride gating, mask construction, lazily setting up the
/// category) live in [`Sampler`] and the [`Analysis`] wrapper.
pub trait AnalysisBase: Send + Sync {
    /// Get the name of this analysis
    fn name(&self) -> String;

    /// Get the parameters used to create this analysis as a JSON string
    fn parameters(&self) -> String;

    /// Get the shared analysis state
    fn sampler(&self) -> &Sampler;

    /// Get mutable access to the shared analysis state
    fn sampler_mut(&mut self) -> &mut Sampler;

    /// Accumulate the statistic over one sampled frame. The category is
    /// guaranteed to be set up when this is called.
    fn do_update(&mut self, system: &dyn System) -> Result<(), Error>;

    /// Serialize the current accumulated statistic to the output destination
    fn write(&mut self) -> Result<(), Error>;
}

/// Driver wrapper around a concrete [`AnalysisBase`] implementation.
pub struct Analysis {
    implementation: Box<dyn AnalysisBase>,
}

impl From<Box<dyn AnalysisBase>> for Analysis {
    fn from(implementation: Box<dyn AnalysisBase>) -> Analysis {
        Analysis { implementation }
    }
}

impl Analysis {
    /// Get the name of this analysis
    pub fn name(&self) -> String {
        self.implementation.name()
    }

    /// Get the parameters used to create this analysis as a JSON string
    pub fn parameters(&self) -> String {
        self.implementation.parameters()
    }

    /// Get the category this analysis reads neighbor vectors from
    pub fn category(&self) -> Arc<dyn Category> {
        Arc::clone(self.implementation.sampler().category())
    }

    /// Restrict this analysis to pairs between two type selection groups.
    /// Must be called before [`Analysis::attach`] to have any effect.
    pub fn specialize_types(&mut self, sel1: Option<&str>, sel2: Option<&str>) {
        self.implementation.sampler_mut().filter_mut().specialize_types(sel1, sel2);
    }

    /// Restrict this analysis to pairs between two per-particle state masks
    pub fn specialize_states(
        &mut self,
        mask1: Vec<bool>,
        mask2: Vec<bool>,
        name1: Option<&str>,
        name2: Option<&str>,
    ) {
        self.implementation.sampler_mut().filter_mut().specialize_states(mask1, mask2, name1, name2);
    }

    /// Attach this analysis to a trajectory: build the selection masks once
    /// the system is available. Analyses without selection filtering accept
    /// all pairs.
    pub fn attach(&mut self, system: &dyn System) -> Result<(), Error> {
        self.implementation.sampler_mut().attach(system)
    }

    /// Record one trajectory frame. The frame counter always advances; the
    /// accumulation itself only runs on frames falling on the sampling
    /// stride, after lazily setting up the category's neighbor structure.
    pub fn update(&mut self, system: &dyn System) -> Result<(), Error> {
        if self.implementation.sampler_mut().tick() {
            let category = Arc::clone(self.implementation.sampler().category());
            category.setup(system)?;
            self.implementation.do_update(system)?;
        }
        return Ok(());
    }

    /// Serialize the current accumulated statistic to the output destination
    pub fn write(&mut self) -> Result<(), Error> {
        self.implementation.write()
    }
}
