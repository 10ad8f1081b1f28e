//! Launch orchestration
//!
//! Drives a [`Wizard`] against the admin API: availability refresh, control
//! designation with baseline lookup, and submission. Every failure leaves the
//! wizard usable.

use crate::api::{BaselineKey, ContentItem, CreatedTest, ExperimentApi};
use crate::error::{ApiError, LaunchError};
use abtest_core::{ControlChange, Targeting, Wizard};
use abtest_model::{SegmentKey, TestType, VariantId};
use tracing::{info, instrument, warn};

/// Wizard operations that need the backend
#[derive(Debug, Clone)]
pub struct LaunchService<A> {
    api: A,
}

impl<A: ExperimentApi> LaunchService<A> {
    /// Create a service over an API implementation
    #[inline]
    #[must_use]
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Underlying API
    #[inline]
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Reload which combinations have content
    ///
    /// Returns segments dropped from the selection because they lost content.
    ///
    /// # Errors
    /// Returns the API failure; the wizard keeps its previous availability
    #[instrument(skip_all)]
    pub async fn refresh_availability(
        &self,
        wizard: &mut Wizard,
    ) -> Result<Vec<SegmentKey>, ApiError> {
        let availability = self.api.available_combinations().await?;
        let dropped = wizard
            .draft_mut()
            .targeting
            .set_availability(availability);

        if !dropped.is_empty() {
            warn!(count = dropped.len(), "selected segments no longer have content");
        }
        Ok(dropped)
    }

    /// Active content items a variant can point at
    ///
    /// # Errors
    /// Returns the API failure
    pub async fn content_options(&self, test_type: TestType) -> Result<Vec<ContentItem>, ApiError> {
        let mut items = self.api.content_items(test_type).await?;
        items.retain(|item| item.is_active);
        Ok(items)
    }

    /// Mark a variant as the control, copying the live baseline when known
    ///
    /// The baseline is looked up only when the draft targets one specific
    /// persona and stage. If that lookup fails the flag is still set, the
    /// variant is marked as needing a baseline, and the failure is returned.
    ///
    /// # Errors
    /// - [`LaunchError::Wizard`] for an unknown variant
    /// - [`LaunchError::Api`] if the baseline lookup failed
    #[instrument(skip(self, wizard), fields(variant = %id))]
    pub async fn designate_control(
        &self,
        wizard: &mut Wizard,
        id: &VariantId,
    ) -> Result<ControlChange, LaunchError> {
        let Some(key) = baseline_key(wizard) else {
            return Ok(wizard.draft_mut().variants.set_control(id, true, None)?);
        };

        match self.api.baseline(key).await {
            Ok(baseline) => Ok(wizard
                .draft_mut()
                .variants
                .set_control(id, true, baseline.as_ref())?),
            Err(err) => {
                warn!(error = %err, "baseline lookup failed; control needs a baseline");
                wizard.draft_mut().variants.set_control(id, true, None)?;
                Err(err.into())
            }
        }
    }

    /// Submit the draft
    ///
    /// On success the wizard resets to a fresh draft. On failure it is left
    /// at review so the same draft can be resubmitted.
    ///
    /// # Errors
    /// - [`LaunchError::Wizard`] if the launch gate refuses the draft
    /// - [`LaunchError::Api`] if the backend rejected or never saw it
    #[instrument(skip_all, fields(name = %wizard.draft().name))]
    pub async fn launch(&self, wizard: &mut Wizard) -> Result<CreatedTest, LaunchError> {
        let config = wizard.submission()?;

        match self.api.create_test(&config).await {
            Ok(created) => {
                info!(test = %created.id, "test created");
                wizard.finish_launch();
                Ok(created)
            }
            Err(err) => {
                warn!(error = %err, retryable = err.is_retryable(), "launch failed; draft kept");
                Err(err.into())
            }
        }
    }
}

fn baseline_key(wizard: &Wizard) -> Option<BaselineKey> {
    let draft = wizard.draft();
    match draft.targeting.targeting() {
        Targeting::Single {
            persona: Some(persona),
            stage: Some(stage),
        } => Some(BaselineKey::new(*persona, *stage, draft.test_type())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockExperimentApi;
    use abtest_core::{Availability, WizardError, WizardStep};
    use abtest_model::{
        ContentItemId, CtaOverrides, FunnelStage, Persona, TestId, VariantConfiguration,
    };
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    fn targeted_wizard() -> Wizard {
        let mut wizard = Wizard::new();
        wizard.set_name("Donate button copy");
        wizard.set_test_type(TestType::Cta);
        let targeting = &mut wizard.draft_mut().targeting;
        targeting.set_persona(Some(Persona::Donor)).unwrap();
        targeting.set_stage(Some(FunnelStage::Decision)).unwrap();
        wizard
    }

    fn to_review(wizard: &mut Wizard) {
        while wizard.step() != WizardStep::Review {
            wizard.next().unwrap();
        }
    }

    fn first_id(wizard: &Wizard) -> VariantId {
        wizard.draft().variants.as_slice()[0].id.clone()
    }

    fn live_cta() -> VariantConfiguration {
        VariantConfiguration::Cta(CtaOverrides {
            text: Some("Give today".into()),
            ..CtaOverrides::default()
        })
    }

    #[tokio::test]
    async fn designate_copies_baseline() {
        let mut mock = MockExperimentApi::new();
        mock.expect_baseline()
            .with(eq(BaselineKey::new(
                Persona::Donor,
                FunnelStage::Decision,
                TestType::Cta,
            )))
            .times(1)
            .returning(|_| Ok(Some(live_cta())));

        let service = LaunchService::new(mock);
        let mut wizard = targeted_wizard();
        let id = first_id(&wizard);

        let change = service.designate_control(&mut wizard, &id).await.unwrap();
        assert_eq!(change, ControlChange::BaselineApplied);
        let variant = wizard.draft().variants.get(&id).unwrap();
        assert!(variant.is_control);
        assert_eq!(variant.configuration, live_cta());
    }

    #[tokio::test]
    async fn broad_targeting_skips_lookup() {
        let mut mock = MockExperimentApi::new();
        mock.expect_baseline().never();

        let service = LaunchService::new(mock);
        let mut wizard = Wizard::new();
        let id = first_id(&wizard);

        let change = service.designate_control(&mut wizard, &id).await.unwrap();
        assert_eq!(change, ControlChange::BaselineRequired);
    }

    #[tokio::test]
    async fn failed_lookup_still_sets_control() {
        let mut mock = MockExperimentApi::new();
        mock.expect_baseline()
            .returning(|_| Err(ApiError::Transport("timed out".into())));

        let service = LaunchService::new(mock);
        let mut wizard = targeted_wizard();
        let id = wizard.draft().variants.as_slice()[1].id.clone();

        let err = service.designate_control(&mut wizard, &id).await.unwrap_err();
        assert!(matches!(err, LaunchError::Api(ApiError::Transport(_))));
        assert_eq!(wizard.draft().variants.control_count(), 1);
        assert!(wizard.draft().variants.get(&id).unwrap().is_control);
    }

    #[tokio::test]
    async fn launch_resets_on_success() {
        let mut mock = MockExperimentApi::new();
        mock.expect_create_test()
            .withf(|config| config.name == "Donate button copy")
            .times(1)
            .returning(|_| {
                Ok(CreatedTest {
                    id: TestId::new("t-1").unwrap(),
                    status: "active".into(),
                })
            });

        let service = LaunchService::new(mock);
        let mut wizard = targeted_wizard();
        to_review(&mut wizard);

        let created = service.launch(&mut wizard).await.unwrap();
        assert_eq!(created.id.as_str(), "t-1");
        assert_eq!(wizard.step(), WizardStep::Discover);
        assert!(wizard.draft().name.is_empty());
    }

    #[tokio::test]
    async fn launch_failure_keeps_draft() {
        let mut mock = MockExperimentApi::new();
        mock.expect_create_test().returning(|_| {
            Err(ApiError::Server {
                status: 502,
                message: "bad gateway".into(),
            })
        });

        let service = LaunchService::new(mock);
        let mut wizard = targeted_wizard();
        to_review(&mut wizard);
        let before = wizard.clone();

        let err = service.launch(&mut wizard).await.unwrap_err();
        assert!(matches!(err, LaunchError::Api(ref api) if api.is_retryable()));
        assert_eq!(wizard, before);
    }

    #[tokio::test]
    async fn gate_refusal_never_reaches_backend() {
        let mut mock = MockExperimentApi::new();
        mock.expect_create_test().never();

        let service = LaunchService::new(mock);
        let mut wizard = targeted_wizard();
        let id = first_id(&wizard);
        wizard.draft_mut().variants.update_weight(&id, 10).unwrap();
        to_review(&mut wizard);

        let err = service.launch(&mut wizard).await.unwrap_err();
        assert!(matches!(
            err,
            LaunchError::Wizard(WizardError::LaunchBlocked { .. })
        ));
        assert_eq!(
            err.blocking_reasons(),
            vec!["weights must sum to 100 (currently 60)".to_string()]
        );
    }

    #[tokio::test]
    async fn refresh_prunes_selection() {
        let keep = SegmentKey::new(Persona::Student, FunnelStage::Awareness);
        let lost = SegmentKey::new(Persona::Donor, FunnelStage::Retention);

        let mut mock = MockExperimentApi::new();
        mock.expect_available_combinations()
            .returning(move || Ok(std::iter::once(keep).collect::<Availability>()));

        let service = LaunchService::new(mock);
        let mut wizard = Wizard::new();
        let targeting = &mut wizard.draft_mut().targeting;
        targeting.set_availability(Availability::all());
        targeting.set_mode(abtest_core::TargetingMode::Multi);
        targeting.toggle(keep).unwrap();
        targeting.toggle(lost).unwrap();

        let dropped = service.refresh_availability(&mut wizard).await.unwrap();
        assert_eq!(dropped, vec![lost]);
        assert_eq!(wizard.draft().targeting.selected_count(), 1);
    }

    #[tokio::test]
    async fn content_options_hide_inactive() {
        let mut mock = MockExperimentApi::new();
        mock.expect_content_items()
            .with(eq(TestType::Hero))
            .returning(|_| {
                Ok(vec![
                    ContentItem {
                        id: ContentItemId::new("c1").unwrap(),
                        title: "Live".into(),
                        content_type: "hero".into(),
                        persona: None,
                        funnel_stage: None,
                        is_active: true,
                    },
                    ContentItem {
                        id: ContentItemId::new("c2").unwrap(),
                        title: "Archived".into(),
                        content_type: "hero".into(),
                        persona: None,
                        funnel_stage: None,
                        is_active: false,
                    },
                ])
            });

        let service = LaunchService::new(mock);
        let items = service.content_options(TestType::Hero).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Live");
    }
}
