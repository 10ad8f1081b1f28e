//! Variant Set Manager
//!
//! Keeps the ordered variant list of one test. Edits never fail because the
//! set is "not ready": weight sums and missing controls are surfaced through
//! [`VariantSet::warnings`] and only block at the launch gate.

use crate::error::VariantSetError;
use abtest_model::{
    ContentItemId, TestType, TrafficWeight, Variant, VariantConfiguration, VariantId,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Name given to the first variant
pub const CONTROL_NAME: &str = "Control (Original)";

/// Weight assigned to new variants
pub const DEFAULT_WEIGHT: i64 = 50;

/// Result of a control designation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlChange {
    /// Variant is control and its configuration now mirrors the live baseline
    BaselineApplied,
    /// Variant is control but no baseline was available
    BaselineRequired,
    /// Control flag removed
    Cleared,
}

/// Non-fatal advisory about the current set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariantWarning {
    TooFewVariants { count: usize },
    NoControl,
    MultipleControls { count: usize },
    WeightSum { total: u32 },
    BaselineRequired { variant: VariantId, name: String },
}

impl fmt::Display for VariantWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewVariants { count } => {
                write!(f, "add at least 2 variants (currently {count})")
            }
            Self::NoControl => f.write_str("no variant is marked as the control"),
            Self::MultipleControls { count } => {
                write!(f, "{count} variants are marked as control; keep exactly one")
            }
            Self::WeightSum { total } => {
                write!(f, "traffic weights total {total}%, expected 100%")
            }
            Self::BaselineRequired { name, .. } => {
                write!(f, "control '{name}' has no baseline configuration")
            }
        }
    }
}

/// Ordered variants of one test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSet {
    test_type: TestType,
    variants: Vec<Variant>,
    /// Controls designated without a baseline
    baseline_pending: BTreeSet<VariantId>,
}

impl VariantSet {
    /// Create an empty set
    #[inline]
    #[must_use]
    pub fn new(test_type: TestType) -> Self {
        Self {
            test_type,
            variants: Vec::new(),
            baseline_pending: BTreeSet::new(),
        }
    }

    /// Control plus one challenger, split 50/50
    #[must_use]
    pub fn with_defaults(test_type: TestType) -> Self {
        let mut set = Self::new(test_type);
        set.add_variant();
        set.add_variant();
        set
    }

    /// Adopt existing variants
    ///
    /// # Errors
    /// - [`VariantSetError::DuplicateId`] if two variants share an id
    /// - [`VariantSetError::ConfigurationMismatch`] if any variant carries
    ///   configuration of another test type
    pub fn from_variants(
        test_type: TestType,
        variants: Vec<Variant>,
    ) -> Result<Self, VariantSetError> {
        let mut seen = BTreeSet::new();
        for variant in &variants {
            if !seen.insert(&variant.id) {
                return Err(VariantSetError::DuplicateId(variant.id.clone()));
            }
            check_type(test_type, &variant.configuration)?;
        }
        Ok(Self {
            test_type,
            variants,
            baseline_pending: BTreeSet::new(),
        })
    }

    /// Append a variant with default name and weight
    ///
    /// The first variant becomes the control.
    pub fn add_variant(&mut self) -> VariantId {
        let index = self.variants.len();
        let name = if index == 0 {
            CONTROL_NAME.to_string()
        } else {
            format!("Variant {}", variant_letters(index))
        };

        let id = VariantId::generate();
        self.variants.push(Variant::new(
            id.clone(),
            name,
            self.test_type,
            TrafficWeight::clamped(DEFAULT_WEIGHT),
            index == 0,
        ));
        debug!(variant = %id, count = self.variants.len(), "variant added");
        id
    }

    /// Remove a variant
    ///
    /// The only control cannot be removed while other variants remain.
    ///
    /// # Errors
    /// - [`VariantSetError::UnknownVariant`] for an unknown id
    /// - [`VariantSetError::SoleControl`] for the sole control of a larger set
    pub fn remove_variant(&mut self, id: &VariantId) -> Result<Variant, VariantSetError> {
        let pos = self.position(id)?;
        let is_sole_control = self.variants[pos].is_control
            && !self.variants.iter().any(|v| v.is_control && v.id != *id);

        if is_sole_control && self.variants.len() > 1 {
            return Err(VariantSetError::SoleControl(id.clone()));
        }

        self.baseline_pending.remove(id);
        let removed = self.variants.remove(pos);
        debug!(variant = %id, count = self.variants.len(), "variant removed");
        Ok(removed)
    }

    /// Set or clear the control flag
    ///
    /// Setting the flag clears it everywhere else. A baseline of the set's
    /// test type replaces the variant's configuration; without one the
    /// configuration is kept and a baseline warning is recorded.
    ///
    /// # Errors
    /// - [`VariantSetError::UnknownVariant`] for an unknown id
    /// - [`VariantSetError::ConfigurationMismatch`] for a foreign baseline
    pub fn set_control(
        &mut self,
        id: &VariantId,
        is_control: bool,
        baseline: Option<&VariantConfiguration>,
    ) -> Result<ControlChange, VariantSetError> {
        let pos = self.position(id)?;

        if !is_control {
            self.variants[pos].is_control = false;
            self.baseline_pending.remove(id);
            return Ok(ControlChange::Cleared);
        }

        if let Some(baseline) = baseline {
            check_type(self.test_type, baseline)?;
        }

        for variant in &mut self.variants {
            variant.is_control = variant.id == *id;
        }
        self.baseline_pending.clear();

        match baseline {
            Some(baseline) => {
                self.variants[pos].configuration = baseline.clone();
                debug!(variant = %id, "control set from baseline");
                Ok(ControlChange::BaselineApplied)
            }
            None => {
                self.baseline_pending.insert(id.clone());
                debug!(variant = %id, "control set without baseline");
                Ok(ControlChange::BaselineRequired)
            }
        }
    }

    /// Set a traffic weight, clamped to 0..=100
    ///
    /// Other weights are left alone.
    ///
    /// # Errors
    /// Returns [`VariantSetError::UnknownVariant`] for an unknown id
    pub fn update_weight(
        &mut self,
        id: &VariantId,
        value: i64,
    ) -> Result<TrafficWeight, VariantSetError> {
        let weight = TrafficWeight::clamped(value);
        self.variant_mut(id)?.traffic_weight = weight;
        Ok(weight)
    }

    /// Split 100% evenly, remainder to the earliest variants
    pub fn distribute_evenly(&mut self) {
        let count = self.variants.len();
        if count == 0 {
            return;
        }
        let base = 100 / count;
        let remainder = 100 % count;
        for (i, variant) in self.variants.iter_mut().enumerate() {
            let share = base + usize::from(i < remainder);
            variant.traffic_weight = TrafficWeight::clamped(share as i64);
        }
    }

    /// Rename a variant
    ///
    /// # Errors
    /// Returns [`VariantSetError::UnknownVariant`] for an unknown id
    pub fn rename(&mut self, id: &VariantId, name: impl Into<String>) -> Result<(), VariantSetError> {
        self.variant_mut(id)?.name = name.into();
        Ok(())
    }

    /// Set a variant's description
    ///
    /// # Errors
    /// Returns [`VariantSetError::UnknownVariant`] for an unknown id
    pub fn set_description(
        &mut self,
        id: &VariantId,
        description: impl Into<String>,
    ) -> Result<(), VariantSetError> {
        self.variant_mut(id)?.description = description.into();
        Ok(())
    }

    /// Point a variant at existing content
    ///
    /// # Errors
    /// Returns [`VariantSetError::UnknownVariant`] for an unknown id
    pub fn set_content_item(
        &mut self,
        id: &VariantId,
        content_item_id: Option<ContentItemId>,
    ) -> Result<(), VariantSetError> {
        self.variant_mut(id)?.content_item_id = content_item_id;
        Ok(())
    }

    /// Replace a variant's configuration
    ///
    /// An explicit configuration satisfies a pending baseline warning.
    ///
    /// # Errors
    /// - [`VariantSetError::UnknownVariant`] for an unknown id
    /// - [`VariantSetError::ConfigurationMismatch`] for a foreign configuration
    pub fn set_configuration(
        &mut self,
        id: &VariantId,
        configuration: VariantConfiguration,
    ) -> Result<(), VariantSetError> {
        check_type(self.test_type, &configuration)?;
        self.variant_mut(id)?.configuration = configuration;
        self.baseline_pending.remove(id);
        Ok(())
    }

    /// Switch test type, resetting every configuration
    pub fn set_test_type(&mut self, test_type: TestType) {
        if test_type == self.test_type {
            return;
        }
        self.test_type = test_type;
        for variant in &mut self.variants {
            variant.configuration = VariantConfiguration::empty(test_type);
        }
        self.baseline_pending.clear();
        debug!(%test_type, "variant configurations reset for new test type");
    }

    /// Advisories for the current state
    #[must_use]
    pub fn warnings(&self) -> Vec<VariantWarning> {
        let mut warnings = Vec::new();

        if self.variants.len() < 2 {
            warnings.push(VariantWarning::TooFewVariants {
                count: self.variants.len(),
            });
        }

        match self.control_count() {
            0 => warnings.push(VariantWarning::NoControl),
            1 => {}
            count => warnings.push(VariantWarning::MultipleControls { count }),
        }

        let total = self.total_weight();
        if total != 100 {
            warnings.push(VariantWarning::WeightSum { total });
        }

        for variant in &self.variants {
            if self.baseline_pending.contains(&variant.id) {
                warnings.push(VariantWarning::BaselineRequired {
                    variant: variant.id.clone(),
                    name: variant.name.clone(),
                });
            }
        }

        warnings
    }

    /// Sum of all weights
    #[must_use]
    pub fn total_weight(&self) -> u32 {
        self.variants
            .iter()
            .map(|v| u32::from(v.traffic_weight.get()))
            .sum()
    }

    /// Number of control-flagged variants
    #[must_use]
    pub fn control_count(&self) -> usize {
        self.variants.iter().filter(|v| v.is_control).count()
    }

    /// Control-flagged variants
    pub fn controls(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter().filter(|v| v.is_control)
    }

    /// Look up a variant
    #[must_use]
    pub fn get(&self, id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == *id)
    }

    /// Iterate in order
    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter()
    }

    /// Variants as a slice
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Variant] {
        &self.variants
    }

    /// Number of variants
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// True if there are no variants
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Test type all configurations belong to
    #[inline]
    #[must_use]
    pub fn test_type(&self) -> TestType {
        self.test_type
    }

    /// Consume into the variant list
    #[must_use]
    pub fn into_variants(self) -> Vec<Variant> {
        self.variants
    }

    fn position(&self, id: &VariantId) -> Result<usize, VariantSetError> {
        self.variants
            .iter()
            .position(|v| v.id == *id)
            .ok_or_else(|| VariantSetError::UnknownVariant(id.clone()))
    }

    fn variant_mut(&mut self, id: &VariantId) -> Result<&mut Variant, VariantSetError> {
        let pos = self.position(id)?;
        Ok(&mut self.variants[pos])
    }
}

fn check_type(expected: TestType, configuration: &VariantConfiguration) -> Result<(), VariantSetError> {
    configuration
        .ensure_type(expected)
        .map_err(|_| VariantSetError::ConfigurationMismatch {
            expected,
            found: configuration.test_type(),
        })
}

/// Spreadsheet-style letters: 0 → A, 25 → Z, 26 → AA
fn variant_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(char::from(b'A' + (index % 26) as u8));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use abtest_model::HeroOverrides;

    fn hero_baseline() -> VariantConfiguration {
        VariantConfiguration::Hero(HeroOverrides {
            headline: Some("Live headline".into()),
            ..HeroOverrides::default()
        })
    }

    #[test]
    fn default_names_and_control() {
        let mut set = VariantSet::new(TestType::Hero);
        let a = set.add_variant();
        let b = set.add_variant();
        let c = set.add_variant();

        assert_eq!(set.get(&a).unwrap().name, CONTROL_NAME);
        assert!(set.get(&a).unwrap().is_control);
        assert_eq!(set.get(&b).unwrap().name, "Variant B");
        assert!(!set.get(&b).unwrap().is_control);
        assert_eq!(set.get(&c).unwrap().name, "Variant C");
        assert_eq!(set.get(&c).unwrap().traffic_weight.get(), 50);
    }

    fn shared_id(is_control: bool) -> Variant {
        Variant::new(
            VariantId::new("a").unwrap(),
            if is_control { CONTROL_NAME } else { "Variant B" }.to_string(),
            TestType::Hero,
            TrafficWeight::clamped(50),
            is_control,
        )
    }

    #[test]
    fn repeated_ids_are_refused() {
        let result = VariantSet::from_variants(TestType::Hero, vec![shared_id(true), shared_id(false)]);
        assert!(matches!(result, Err(VariantSetError::DuplicateId(id)) if id.as_str() == "a"));
    }

    #[test]
    fn letters_continue_past_z() {
        assert_eq!(variant_letters(1), "B");
        assert_eq!(variant_letters(25), "Z");
        assert_eq!(variant_letters(26), "AA");
        assert_eq!(variant_letters(27), "AB");
    }

    #[test]
    fn sole_control_cannot_be_removed() {
        let mut set = VariantSet::with_defaults(TestType::Hero);
        let control = set.controls().next().unwrap().id.clone();

        assert!(matches!(
            set.remove_variant(&control),
            Err(VariantSetError::SoleControl(_))
        ));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn only_variant_can_be_removed_even_if_control() {
        let mut set = VariantSet::new(TestType::Cta);
        let only = set.add_variant();
        assert!(set.remove_variant(&only).is_ok());
        assert!(set.is_empty());
    }

    #[test]
    fn non_control_can_be_removed() {
        let mut set = VariantSet::with_defaults(TestType::Hero);
        let challenger = set.iter().nth(1).unwrap().id.clone();
        let removed = set.remove_variant(&challenger).unwrap();
        assert_eq!(removed.name, "Variant B");
    }

    #[test]
    fn set_control_is_exclusive() {
        let mut set = VariantSet::with_defaults(TestType::Hero);
        let challenger = set.iter().nth(1).unwrap().id.clone();

        let change = set.set_control(&challenger, true, None).unwrap();
        assert_eq!(change, ControlChange::BaselineRequired);
        assert_eq!(set.control_count(), 1);
        assert!(set.get(&challenger).unwrap().is_control);
        assert!(set
            .warnings()
            .iter()
            .any(|w| matches!(w, VariantWarning::BaselineRequired { .. })));
    }

    #[test]
    fn baseline_overwrites_configuration() {
        let mut set = VariantSet::with_defaults(TestType::Hero);
        let control = set.controls().next().unwrap().id.clone();

        let change = set.set_control(&control, true, Some(&hero_baseline())).unwrap();
        assert_eq!(change, ControlChange::BaselineApplied);
        assert_eq!(set.get(&control).unwrap().configuration, hero_baseline());
        assert!(set.warnings().is_empty());
    }

    #[test]
    fn foreign_baseline_rejected_without_side_effects() {
        let mut set = VariantSet::with_defaults(TestType::Hero);
        let challenger = set.iter().nth(1).unwrap().id.clone();
        let foreign = VariantConfiguration::empty(TestType::Layout);

        assert!(matches!(
            set.set_control(&challenger, true, Some(&foreign)),
            Err(VariantSetError::ConfigurationMismatch { .. })
        ));
        assert!(!set.get(&challenger).unwrap().is_control);
    }

    #[test]
    fn clearing_control_leaves_none() {
        let mut set = VariantSet::with_defaults(TestType::Hero);
        let control = set.controls().next().unwrap().id.clone();

        assert_eq!(
            set.set_control(&control, false, None).unwrap(),
            ControlChange::Cleared
        );
        assert_eq!(set.warnings(), vec![VariantWarning::NoControl]);
    }

    #[test]
    fn weight_is_clamped_not_normalized() {
        let mut set = VariantSet::with_defaults(TestType::Hero);
        let control = set.controls().next().unwrap().id.clone();

        assert_eq!(set.update_weight(&control, 140).unwrap().get(), 100);
        assert_eq!(set.total_weight(), 150);
        assert!(set
            .warnings()
            .contains(&VariantWarning::WeightSum { total: 150 }));
    }

    #[test]
    fn distribute_evenly_sums_to_100() {
        let mut set = VariantSet::with_defaults(TestType::Hero);
        set.add_variant();
        set.distribute_evenly();

        let weights: Vec<u8> = set.iter().map(|v| v.traffic_weight.get()).collect();
        assert_eq!(weights, vec![34, 33, 33]);
        assert_eq!(set.total_weight(), 100);
    }

    #[test]
    fn test_type_switch_resets_configuration() {
        let mut set = VariantSet::with_defaults(TestType::Hero);
        let control = set.controls().next().unwrap().id.clone();
        set.set_configuration(&control, hero_baseline()).unwrap();

        set.set_test_type(TestType::CardOrder);
        assert!(set
            .iter()
            .all(|v| v.configuration == VariantConfiguration::empty(TestType::CardOrder)));
    }

    #[test]
    fn explicit_configuration_clears_baseline_warning() {
        let mut set = VariantSet::with_defaults(TestType::Hero);
        let control = set.controls().next().unwrap().id.clone();
        set.set_control(&control, true, None).unwrap();

        set.set_configuration(&control, hero_baseline()).unwrap();
        assert!(set.warnings().is_empty());
    }

    #[test]
    fn unknown_variant_reported() {
        let mut set = VariantSet::with_defaults(TestType::Hero);
        let ghost = VariantId::generate();
        assert!(matches!(
            set.update_weight(&ghost, 10),
            Err(VariantSetError::UnknownVariant(_))
        ));
    }
}
