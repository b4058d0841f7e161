use std::sync::Arc;

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::Error;
use crate::systems::{System, anchored};

/// Result of looking up which selection group an atom belongs to
#[derive(Debug, Clone, Copy)]
pub enum GroupMatch<'a> {
    /// the atom is in neither selection group
    Skip,
    /// the atom is in a group; its neighbors should be filtered with the
    /// complementary group's mask (`None` accepts all neighbors)
    Complement(Option<&'a [bool]>),
}

/// Type and state specialization of an analysis.
///
/// An analysis can be restricted to pairs between two selection groups,
/// defined either by type patterns (resolved against the system when the
/// analysis is attached) or by caller-supplied per-particle state masks.
/// Without any specialization all pairs are accepted.
#[derive(Debug, Default)]
#[derive(serde::Serialize)]
pub struct TypeFilter {
    sel1: Option<String>,
    sel2: Option<String>,
    /// human-readable description of the pairing
    label: Option<String>,
    mask1: Option<Arc<[bool]>>,
    mask2: Option<Arc<[bool]>>,
    #[serde(skip)]
    regex1: OnceCell<Regex>,
    #[serde(skip)]
    regex2: OnceCell<Regex>,
}

impl TypeFilter {
    /// Create a new filter accepting all pairs
    pub fn new() -> TypeFilter {
        TypeFilter::default()
    }

    /// Restrict this filter to pairs between atoms with types matching
    /// `sel1` and atoms with types matching `sel2`. A missing `sel2` means
    /// "same group as `sel1`".
    pub fn specialize_types(&mut self, sel1: Option<&str>, sel2: Option<&str>) {
        self.sel1 = sel1.map(Into::into);
        self.sel2 = sel2.map(Into::into);
        self.label = Some(format!(
            "[{}] -- [{}]",
            sel1.unwrap_or("*"),
            sel2.unwrap_or("*"),
        ));
    }

    /// Restrict this filter to pairs between the particles flagged in
    /// `mask1` and the particles flagged in `mask2`, bypassing type
    /// selection. The optional names only show up in the filter label.
    pub fn specialize_states(
        &mut self,
        mask1: Vec<bool>,
        mask2: Vec<bool>,
        name1: Option<&str>,
        name2: Option<&str>,
    ) {
        self.mask1 = Some(mask1.into());
        self.mask2 = Some(mask2.into());
        self.label = Some(format!(
            "[state {}] -- [state {}]",
            name1.unwrap_or("?"),
            name2.unwrap_or("?"),
        ));
    }

    /// Get a description of the pairing this filter selects, if it was
    /// specialized
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Resolve the type selections into per-particle masks against the given
    /// system. This is idempotent: masks already built (or supplied through
    /// [`TypeFilter::specialize_states`]) are never rebuilt.
    pub fn build_masks(&mut self, system: &dyn System) -> Result<(), Error> {
        if self.mask1.is_none() {
            self.mask1 = Some(match &self.sel1 {
                Some(sel) => selection_mask(system, sel)?,
                None => vec![true; system.size()?].into(),
            });
        }

        if self.mask2.is_none() {
            self.mask2 = match &self.sel2 {
                Some(sel) => Some(selection_mask(system, sel)?),
                // no second selection: same group as the first one. The mask
                // is aliased, both masks are immutable from here on.
                None => self.mask1.clone(),
            };
        }

        return Ok(());
    }

    /// Check whether masks were built already
    pub fn has_masks(&self) -> bool {
        self.mask1.is_some() && self.mask2.is_some()
    }

    /// Find which selection group the atom at index `atom` belongs to, and
    /// get the mask its neighbors should be filtered with.
    ///
    /// Before masks are built this accepts everything, analyses without
    /// selection filtering do not need masks.
    pub fn group(&self, atom: usize) -> GroupMatch<'_> {
        match (&self.mask1, &self.mask2) {
            (Some(mask1), Some(mask2)) => {
                if mask1[atom] {
                    GroupMatch::Complement(Some(mask2))
                } else if mask2[atom] {
                    GroupMatch::Complement(Some(mask1))
                } else {
                    GroupMatch::Skip
                }
            }
            _ => GroupMatch::Complement(None),
        }
    }

    /// Check whether the two type names match the type specialization, in
    /// either ordering. If no type selections are set, all pairs are valid.
    ///
    /// Callers are expected to resolve whatever entity they hold (an atom, a
    /// bead, ...) to its type name before calling.
    pub fn valid_pair(&self, type1: &str, type2: &str) -> Result<bool, Error> {
        let (sel1, sel2) = match (&self.sel1, &self.sel2) {
            (Some(sel1), Some(sel2)) => (sel1, sel2),
            _ => return Ok(true),
        };

        let regex1 = self.regex1.get_or_try_init(|| anchored(sel1))?;
        let regex2 = self.regex2.get_or_try_init(|| anchored(sel2))?;

        let matches = (regex1.is_match(type1) && regex2.is_match(type2))
            || (regex2.is_match(type1) && regex1.is_match(type2));
        return Ok(matches);
    }
}

fn selection_mask(system: &dyn System, pattern: &str) -> Result<Arc<[bool]>, Error> {
    let mut mask = vec![false; system.size()?];
    for atom in system.select(pattern)? {
        mask[atom] = true;
    }
    return Ok(mask.into());
}
