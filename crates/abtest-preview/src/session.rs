//! Preview session lifecycle
//!
//! ```text
//! new ──load──▶ loaded ──edit──▶ dirty ──apply──▶ loaded
//!                  ▲                                │
//!                  └──────────────reset─────────────┘
//! ```
//!
//! Edits stay pending until [`PreviewSession::apply`] persists them. The site
//! only ever sees applied overrides.

use crate::error::PreviewError;
use crate::overrides::PreviewOverrides;
use crate::store::SessionStore;
use abtest_model::{ActiveTest, FunnelStage, Persona, TestId, VariantId};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// One admin's preview state over a [`SessionStore`]
#[derive(Debug)]
pub struct PreviewSession<S> {
    store: S,
    applied: PreviewOverrides,
    pending: PreviewOverrides,
    loaded: bool,
}

impl<S: SessionStore> PreviewSession<S> {
    /// Unloaded session; call [`Self::load`] before applying
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            applied: PreviewOverrides::default(),
            pending: PreviewOverrides::default(),
            loaded: false,
        }
    }

    /// Read stored overrides
    ///
    /// A corrupt store is logged and treated as empty so the session stays
    /// usable; the next apply or reset overwrites it.
    ///
    /// # Errors
    /// Returns [`PreviewError::Io`] if the store cannot be read
    pub fn load(&mut self) -> Result<&PreviewOverrides, PreviewError> {
        let stored = match self.store.load() {
            Ok(stored) => stored.unwrap_or_default(),
            Err(err) if err.is_corrupt_state() => {
                warn!(error = %err, "discarding unreadable preview overrides");
                PreviewOverrides::default()
            }
            Err(err) => return Err(err),
        };

        debug!(empty = stored.is_empty(), "preview session loaded");
        self.pending = stored.clone();
        self.applied = stored;
        self.loaded = true;
        Ok(&self.applied)
    }

    /// Whether [`Self::load`] has run
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Preview as a persona; `None` for the visitor's own
    pub fn set_persona(&mut self, persona: Option<Persona>) {
        self.pending.persona = persona;
    }

    /// Preview at a funnel stage; `None` for the visitor's own
    pub fn set_stage(&mut self, stage: Option<FunnelStage>) {
        self.pending.stage = stage;
    }

    /// Pin a running test to one of its variants
    ///
    /// # Errors
    /// Returns [`PreviewError::UnknownVariant`] if `variant` is not in `test`
    pub fn force_variant(
        &mut self,
        test: &ActiveTest,
        variant: VariantId,
    ) -> Result<(), PreviewError> {
        if test.variant(&variant).is_none() {
            return Err(PreviewError::UnknownVariant {
                test: test.id.clone(),
                variant,
            });
        }
        self.pending.forced_variants.insert(test.id.clone(), variant);
        Ok(())
    }

    /// Stop forcing a test; returns the variant that was forced
    pub fn unforce(&mut self, test: &TestId) -> Option<VariantId> {
        self.pending.forced_variants.remove(test)
    }

    /// Drop forced variants for tests no longer running
    ///
    /// Returns the dropped test ids.
    pub fn retain_active(&mut self, active: &[ActiveTest]) -> Vec<TestId> {
        let mut dropped = Vec::new();
        self.pending.forced_variants.retain(|test, variant| {
            let live = active
                .iter()
                .any(|t| t.id == *test && t.variant(variant).is_some());
            if !live {
                dropped.push(test.clone());
            }
            live
        });
        dropped
    }

    /// Persist pending overrides, stamped now
    ///
    /// # Errors
    /// - [`PreviewError::NotLoaded`] before [`Self::load`]
    /// - a store error; pending edits are kept
    pub fn apply(&mut self) -> Result<&PreviewOverrides, PreviewError> {
        self.apply_at(Utc::now())
    }

    /// Persist pending overrides with an explicit timestamp
    ///
    /// # Errors
    /// Same as [`Self::apply`]
    pub fn apply_at(&mut self, now: DateTime<Utc>) -> Result<&PreviewOverrides, PreviewError> {
        if !self.is_loaded() {
            return Err(PreviewError::NotLoaded);
        }

        let mut next = self.pending.clone();
        next.applied_at = Some(now);
        self.store.save(&next)?;

        info!(
            persona = ?next.persona,
            stage = ?next.stage,
            forced = next.forced_variants.len(),
            "preview overrides applied"
        );
        self.pending = next.clone();
        self.applied = next;
        Ok(&self.applied)
    }

    /// Clear the store and both in-memory copies
    ///
    /// # Errors
    /// Returns a store error; in-memory state is untouched in that case
    pub fn reset(&mut self) -> Result<(), PreviewError> {
        self.store.clear()?;
        self.applied = PreviewOverrides::default();
        self.pending = PreviewOverrides::default();
        self.loaded = true;
        info!("preview overrides reset");
        Ok(())
    }

    /// Variant the site serves for a test under applied overrides
    #[must_use]
    pub fn effective_variant(&self, test: &TestId) -> Option<&VariantId> {
        self.applied.forced_variants.get(test)
    }

    /// True if pending edits differ from what is applied
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.pending.same_selection(&self.applied)
    }

    /// Overrides in effect
    #[inline]
    #[must_use]
    pub fn applied(&self) -> &PreviewOverrides {
        &self.applied
    }

    /// Overrides being edited
    #[inline]
    #[must_use]
    pub fn pending(&self) -> &PreviewOverrides {
        &self.pending
    }

    /// Backing store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}
