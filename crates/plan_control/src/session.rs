use std::collections::BTreeMap;

use plan_core::{
    aggregate_progress, category_progress, restore_plan, save_plan, semester_loads, total_ects,
    Catalog, CategoryProgress, CategoryRequirement, DeselectionPlan, InstanceId, ModuleCode,
    ModuleDef, ModuleInstance, PlannerConfig, ProgramId, SelectMode, SelectOutcome,
    SelectionError, SelectionSet, SelectionStatus, Semester, SemesterLoad, SubjectArea,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{CatalogProvider, PlannerError, RequirementsProvider, SelectionStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CatalogState {
    Empty,
    Ready,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeselectOutcome {
    /// Everything removed, target first.
    Removed(Vec<InstanceId>),
    /// Dependents would go too; nothing changed.
    NeedsConfirmation(DeselectionPlan),
}

/// Owns the catalog and the selection set for one planning session and
/// persists the set through `S` after every mutation.
pub struct PlanSession<S: SelectionStore> {
    config: PlannerConfig,
    store: S,
    rng: ChaCha8Rng,
    catalog: Option<Catalog>,
    load_failure: Option<String>,
    requirements: Vec<CategoryRequirement>,
    selection: SelectionSet,
}

impl<S: SelectionStore> PlanSession<S> {
    pub fn new(config: PlannerConfig, store: S, seed: u64) -> Self {
        Self {
            config,
            store,
            rng: ChaCha8Rng::seed_from_u64(seed),
            catalog: None,
            load_failure: None,
            requirements: Vec::new(),
            selection: SelectionSet::new(),
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn requirements(&self) -> &[CategoryRequirement] {
        &self.requirements
    }

    pub fn catalog_state(&self) -> CatalogState {
        match (&self.catalog, &self.load_failure) {
            (Some(_), _) => CatalogState::Ready,
            (None, Some(reason)) => CatalogState::Failed {
                reason: reason.clone(),
            },
            (None, None) => CatalogState::Empty,
        }
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Fetches a fresh catalog, replacing the current one, and restores the
    /// stored plan against it. Entries that no longer resolve or no longer
    /// satisfy the invariants are dropped and the repaired plan is saved.
    ///
    /// A failed fetch leaves the session without a catalog. The stored plan
    /// is not touched, so a later successful load picks it up again.
    pub fn load_catalog(
        &mut self,
        provider: &impl CatalogProvider,
        program: Option<&ProgramId>,
    ) -> Result<(), PlannerError> {
        let snapshot = match provider.fetch_catalog(program) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(%reason, "catalog load failed");
                self.catalog = None;
                self.selection = SelectionSet::new();
                self.load_failure = Some(reason.clone());
                return Err(PlannerError::CatalogLoadFailure(reason));
            }
        };

        let catalog = Catalog::build(snapshot, &self.config, &mut self.rng);
        info!(
            content_version = catalog.content_version(),
            modules = catalog.defs().len(),
            instances = catalog.instances().len(),
            "catalog loaded"
        );
        self.load_failure = None;
        self.selection = SelectionSet::new();
        self.catalog = Some(catalog);
        self.hydrate();
        Ok(())
    }

    fn hydrate(&mut self) {
        let Some(saved) = self.store.load() else {
            return;
        };
        let Some(catalog) = &self.catalog else {
            return;
        };
        let restored = restore_plan(catalog, &saved, &self.config);
        if restored.stale {
            warn!(
                saved = %saved.content_version,
                current = catalog.content_version(),
                "saved plan was made against another catalog version"
            );
        }
        for (semester, code) in &restored.unresolved {
            warn!(%code, semester, "saved selection no longer offered; dropped");
        }
        for code in &restored.pruned {
            warn!(%code, "saved selection violates prerequisites or conflicts; dropped");
        }
        let repaired = !restored.unresolved.is_empty() || !restored.pruned.is_empty();
        info!(selected = restored.selection.len(), "plan restored");
        self.selection = restored.selection;
        if repaired {
            self.persist();
        }
    }

    pub fn load_requirements(
        &mut self,
        provider: &impl RequirementsProvider,
        program: &ProgramId,
    ) -> Result<(), PlannerError> {
        match provider.fetch_requirements(program) {
            Ok(requirements) => {
                debug!(%program, categories = requirements.len(), "requirements loaded");
                self.requirements = requirements;
                Ok(())
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(%program, %reason, "requirements load failed");
                self.requirements.clear();
                Err(PlannerError::RequirementsLoadFailure(reason))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    fn ready(&self) -> Result<&Catalog, PlannerError> {
        self.catalog.as_ref().ok_or(PlannerError::CatalogNotLoaded)
    }

    fn lookup(&self, id: &InstanceId) -> Result<(&Catalog, &ModuleInstance), PlannerError> {
        let catalog = self.ready()?;
        let instance = catalog
            .instance(id)
            .ok_or(SelectionError::UnknownInstance(*id))?;
        Ok((catalog, instance))
    }

    pub fn status(&self, id: &InstanceId) -> Result<SelectionStatus, PlannerError> {
        let (catalog, instance) = self.lookup(id)?;
        Ok(plan_core::instance_status(
            catalog,
            instance,
            &self.selection,
            &self.config,
        ))
    }

    /// Every instance offered in `semester` with its definition and status.
    pub fn offerings_in(
        &self,
        semester: Semester,
    ) -> Vec<(&ModuleInstance, &ModuleDef, SelectionStatus)> {
        let Some(catalog) = &self.catalog else {
            return Vec::new();
        };
        catalog
            .instances_in(semester)
            .filter_map(|inst| {
                let def = catalog.def(&inst.code)?;
                let status =
                    plan_core::instance_status(catalog, inst, &self.selection, &self.config);
                Some((inst, def, status))
            })
            .collect()
    }

    /// The selected instance of `code`, if any.
    pub fn selected_instance_of(&self, code: &ModuleCode) -> Option<&ModuleInstance> {
        self.catalog
            .as_ref()?
            .instances_of(code)
            .find(|inst| self.selection.contains(&inst.id))
    }

    pub fn can_select(&self, id: &InstanceId, semester: Semester, mode: SelectMode) -> bool {
        self.lookup(id).is_ok_and(|(catalog, instance)| {
            plan_core::can_select(
                catalog,
                instance,
                semester,
                &self.selection,
                mode,
                &self.config,
            )
        })
    }

    pub fn progress(&self) -> Vec<CategoryProgress> {
        match &self.catalog {
            Some(catalog) => category_progress(catalog, &self.selection, &self.requirements),
            None => Vec::new(),
        }
    }

    /// Per-area totals, including areas no requirement names.
    pub fn totals(&self) -> BTreeMap<SubjectArea, u32> {
        match &self.catalog {
            Some(catalog) => aggregate_progress(catalog, &self.selection, &self.requirements),
            None => BTreeMap::new(),
        }
    }

    pub fn total_ects(&self) -> u32 {
        self.catalog
            .as_ref()
            .map_or(0, |catalog| total_ects(catalog, &self.selection))
    }

    pub fn semester_loads(&self) -> Vec<SemesterLoad> {
        match &self.catalog {
            Some(catalog) => semester_loads(catalog, &self.selection, &self.config),
            None => Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub fn select(
        &mut self,
        id: &InstanceId,
        semester: Semester,
        mode: SelectMode,
    ) -> Result<SelectOutcome, PlannerError> {
        let (catalog, instance) = self.lookup(id)?;
        let outcome = match plan_core::select(
            catalog,
            instance,
            semester,
            &self.selection,
            mode,
            &self.config,
        ) {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(%err, "selection refused");
                return Err(err.into());
            }
        };
        info!(
            code = %instance.code,
            semester,
            replaced = outcome.replaced.is_some(),
            invalidated = outcome.invalidated.len(),
            "module selected"
        );

        self.selection = outcome.selection.clone();
        self.persist();
        Ok(outcome)
    }

    pub fn request_deselect(&self, id: &InstanceId) -> Result<DeselectionPlan, PlannerError> {
        let (catalog, instance) = self.lookup(id)?;
        Ok(plan_core::request_deselect(
            catalog,
            instance,
            &self.selection,
        ))
    }

    /// Applies a plan from `request_deselect`. Returns the ids actually removed.
    pub fn apply_deselection(&mut self, plan: &DeselectionPlan) -> Vec<InstanceId> {
        let removed: Vec<InstanceId> = plan
            .all()
            .filter(|id| self.selection.contains(id))
            .copied()
            .collect();
        if removed.is_empty() {
            return removed;
        }
        self.selection = plan_core::apply_deselection(plan, &self.selection);
        info!(removed = removed.len(), "modules deselected");
        self.persist();
        removed
    }

    /// Deselects `id`. With dependents and no confirmation the plan comes back
    /// unapplied.
    pub fn deselect(
        &mut self,
        id: &InstanceId,
        confirmed: bool,
    ) -> Result<DeselectOutcome, PlannerError> {
        let plan = self.request_deselect(id)?;
        if plan.needs_confirmation() && !confirmed {
            debug!(dependents = plan.dependents.len(), "deselection needs confirmation");
            return Ok(DeselectOutcome::NeedsConfirmation(plan));
        }
        Ok(DeselectOutcome::Removed(self.apply_deselection(&plan)))
    }

    pub fn clear(&mut self) {
        self.selection = SelectionSet::new();
        info!("selection cleared");
        self.persist();
    }

    fn persist(&mut self) {
        let Some(catalog) = &self.catalog else {
            return;
        };
        let plan = save_plan(catalog, &self.selection);
        self.store.save(&plan);
    }
}
