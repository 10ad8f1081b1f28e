use abtest_core::{
    is_ready, Availability, ReadinessIssue, Targeting, TargetingMode, TargetingSelector,
    VariantSet, VariantSetError,
};
use abtest_model::{
    FunnelStage, Persona, SegmentKey, TestType, TrafficWeight, Variant, VariantId,
};
use proptest::prelude::*;

fn variant(weight: u8, control: bool) -> Variant {
    Variant::new(
        VariantId::generate(),
        "v",
        TestType::Cta,
        TrafficWeight::new(weight).unwrap(),
        control,
    )
}

/// Weights in 0..=100 that total exactly 100, at least two of them
fn weights_summing_to_100() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..=100, 1..8).prop_map(|mut cuts| {
        cuts.sort_unstable();
        let mut weights = Vec::with_capacity(cuts.len() + 1);
        let mut previous = 0;
        for cut in cuts {
            weights.push(cut - previous);
            previous = cut;
        }
        weights.push(100 - previous);
        weights
    })
}

fn targeting_strategy() -> impl Strategy<Value = Targeting> {
    let persona = prop::option::of(prop::sample::select(Persona::ALL.to_vec()));
    let stage = prop::option::of(prop::sample::select(FunnelStage::ALL.to_vec()));
    (persona, stage).prop_map(|(persona, stage)| Targeting::Single { persona, stage })
}

#[test]
fn documented_examples() {
    let ready = is_ready(&[variant(60, true), variant(40, false)], &Targeting::everyone());
    assert!(ready.ready);

    let no_control = is_ready(&[variant(50, false), variant(40, false)], &Targeting::everyone());
    assert!(!no_control.ready);
    assert!(no_control
        .reason_messages()
        .iter()
        .any(|r| r.contains("control")));

    let single = is_ready(&[variant(70, true)], &Targeting::everyone());
    assert!(!single.ready);
    assert!(single.reason_messages().iter().any(|r| r.contains("≥2 variants")));
}

#[test]
fn sole_control_removal_rules() {
    let mut set = VariantSet::with_defaults(TestType::Messaging);
    let control = set.controls().next().unwrap().id.clone();
    let other = set.iter().nth(1).unwrap().id.clone();

    assert!(matches!(
        set.remove_variant(&control),
        Err(VariantSetError::SoleControl(_))
    ));

    set.remove_variant(&other).unwrap();
    assert!(set.remove_variant(&control).is_ok());
}

proptest! {
    #[test]
    fn prop_valid_sets_are_ready(
        weights in weights_summing_to_100(),
        control_index in any::<prop::sample::Index>(),
        targeting in targeting_strategy(),
    ) {
        let control = control_index.index(weights.len());
        let variants: Vec<Variant> = weights
            .iter()
            .enumerate()
            .map(|(i, w)| variant(*w, i == control))
            .collect();

        let readiness = is_ready(&variants, &targeting);
        prop_assert!(readiness.ready);
        prop_assert!(readiness.reasons.is_empty());
    }

    #[test]
    fn prop_missing_control_always_reported(
        weights in prop::collection::vec(0u8..=100, 0..8),
    ) {
        let variants: Vec<Variant> = weights.iter().map(|w| variant(*w, false)).collect();
        let readiness = is_ready(&variants, &Targeting::everyone());

        prop_assert!(!readiness.ready);
        let expected = ReadinessIssue::ControlCount { found: 0 };
        prop_assert!(readiness.reasons.contains(&expected));
    }

    #[test]
    fn prop_set_control_leaves_exactly_one(
        flags in prop::collection::vec(any::<bool>(), 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let variants: Vec<Variant> = flags.iter().map(|c| variant(10, *c)).collect();
        let mut set = VariantSet::from_variants(TestType::Cta, variants).unwrap();
        let ids: Vec<VariantId> = set.iter().map(|v| v.id.clone()).collect();

        let target = ids[pick.index(ids.len())].clone();
        set.set_control(&target, true, None).unwrap();

        prop_assert_eq!(set.control_count(), 1);
        prop_assert!(set.get(&target).unwrap().is_control);
    }

    #[test]
    fn prop_reach_monotonic_in_allocation(
        persona in prop::option::of(prop::sample::select(Persona::ALL.to_vec())),
        stage in prop::option::of(prop::sample::select(FunnelStage::ALL.to_vec())),
        low in 10u8..=100,
        high in 10u8..=100,
        multi in any::<bool>(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..20),
    ) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };

        let mut selector = TargetingSelector::new();
        selector.set_availability(Availability::all());
        if multi {
            selector.set_mode(TargetingMode::Multi);
            let keys: Vec<SegmentKey> = SegmentKey::all().collect();
            for pick in picks {
                let key = keys[pick.index(keys.len())];
                if !selector.targeting().applies_to(key) {
                    selector.toggle(key).unwrap();
                }
            }
        } else {
            selector.set_persona(persona).unwrap();
            selector.set_stage(stage).unwrap();
        }

        selector.set_allocation(low).unwrap();
        let at_low = selector.estimate_reach().percent();
        selector.set_allocation(high).unwrap();
        let at_high = selector.estimate_reach().percent();

        prop_assert!(at_low <= at_high);
        prop_assert!((0.0..=100.0).contains(&at_high));
    }
}
