use ahash::AHashMap;
use rand::Rng;
use smallvec::SmallVec;

use crate::id::generate_instance_id;
use crate::{
    CatalogSnapshot, InstanceId, ModuleCode, ModuleDef, ModuleInstance, Offering, PlannerConfig,
    Semester, SelectionSet,
};

/// Module definitions plus the instances derived from them for one session.
///
/// Built once per fetch and never patched: a fresh fetch builds a fresh
/// catalog with fresh instance ids.
#[derive(Debug, Clone)]
pub struct Catalog {
    content_version: String,
    defs: Vec<ModuleDef>,
    def_index: AHashMap<ModuleCode, usize>,
    instances: Vec<ModuleInstance>,
    instance_index: AHashMap<InstanceId, usize>,
    by_code: AHashMap<ModuleCode, SmallVec<[usize; 4]>>,
}

/// Semesters within the planning horizon in which `def` is offered,
/// ascending. An empty `offered` list means every semester.
pub fn offered_semesters(def: &ModuleDef, config: &PlannerConfig) -> Vec<Semester> {
    config
        .semesters()
        .filter(|semester| {
            def.offered.is_empty()
                || def.offered.iter().any(|offering| match offering {
                    Offering::Semester(n) => n == semester,
                    Offering::Term(term) => config.term_of(*semester) == *term,
                })
        })
        .collect()
}

impl Catalog {
    /// Derives one instance per (definition, offered semester). Definitions
    /// repeating an earlier code are skipped; the first one wins.
    pub fn build(snapshot: CatalogSnapshot, config: &PlannerConfig, rng: &mut impl Rng) -> Self {
        let mut catalog = Catalog {
            content_version: snapshot.content_version,
            defs: Vec::with_capacity(snapshot.modules.len()),
            def_index: AHashMap::new(),
            instances: Vec::new(),
            instance_index: AHashMap::new(),
            by_code: AHashMap::new(),
        };

        for def in snapshot.modules {
            if catalog.def_index.contains_key(&def.code) {
                continue;
            }
            for semester in offered_semesters(&def, config) {
                let instance = ModuleInstance {
                    id: generate_instance_id(rng),
                    code: def.code.clone(),
                    semester,
                };
                let slot = catalog.instances.len();
                catalog.instance_index.insert(instance.id, slot);
                catalog
                    .by_code
                    .entry(def.code.clone())
                    .or_default()
                    .push(slot);
                catalog.instances.push(instance);
            }
            catalog
                .def_index
                .insert(def.code.clone(), catalog.defs.len());
            catalog.defs.push(def);
        }
        catalog
    }

    pub fn content_version(&self) -> &str {
        &self.content_version
    }

    pub fn defs(&self) -> &[ModuleDef] {
        &self.defs
    }

    pub fn def(&self, code: &ModuleCode) -> Option<&ModuleDef> {
        self.def_index.get(code).map(|&slot| &self.defs[slot])
    }

    pub fn instances(&self) -> &[ModuleInstance] {
        &self.instances
    }

    pub fn instance(&self, id: &InstanceId) -> Option<&ModuleInstance> {
        self.instance_index.get(id).map(|&slot| &self.instances[slot])
    }

    pub fn instances_of<'a>(
        &'a self,
        code: &ModuleCode,
    ) -> impl Iterator<Item = &'a ModuleInstance> + 'a {
        self.by_code
            .get(code)
            .into_iter()
            .flatten()
            .map(move |&slot| &self.instances[slot])
    }

    pub fn instance_at(&self, code: &ModuleCode, semester: Semester) -> Option<&ModuleInstance> {
        self.instances_of(code).find(|inst| inst.semester == semester)
    }

    pub fn instances_in(&self, semester: Semester) -> impl Iterator<Item = &ModuleInstance> {
        self.instances
            .iter()
            .filter(move |inst| inst.semester == semester)
    }

    /// Credits of the instance's definition, 0 for ids this catalog does not know.
    pub fn ects_of(&self, id: &InstanceId) -> u32 {
        self.instance(id)
            .and_then(|inst| self.def(&inst.code))
            .map_or(0, |def| def.ects)
    }

    /// Semester in which some instance of `code` is selected, if any.
    pub fn selected_semester_of(
        &self,
        code: &ModuleCode,
        selection: &SelectionSet,
    ) -> Option<Semester> {
        self.instances_of(code)
            .find_map(|inst| selection.semester_of(&inst.id))
    }

    /// Selected instances with their definitions, in ascending semester
    /// order. Ids unknown to this catalog are skipped.
    pub fn selected<'a>(
        &'a self,
        selection: &'a SelectionSet,
    ) -> impl Iterator<Item = (Semester, &'a ModuleInstance, &'a ModuleDef)> + 'a {
        selection.iter().filter_map(move |(semester, id)| {
            let inst = self.instance(id)?;
            let def = self.def(&inst.code)?;
            Some((semester, inst, def))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
