//! Content loading and validation shared by the CLI and tests.
//!
//! A content directory holds `planner.json`, `modules.json` and
//! `requirements.json`. `ContentDir` serves the last two through the
//! provider traits from `plan_control`.

use anyhow::{bail, Context, Result};
use plan_control::{CatalogProvider, RequirementsProvider};
use plan_core::{
    offered_semesters, prerequisite_cycles, CatalogSnapshot, CategoryRequirement, ModuleCode,
    ModuleDef, Offering, PlannerConfig, ProgramId, Semester, SubjectArea,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct ModulesFile {
    content_version: String,
    modules: Vec<ModuleDef>,
}

#[derive(Deserialize)]
struct RequirementsFile {
    programs: Vec<ProgramRequirements>,
}

/// Credit bounds of one study program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramRequirements {
    pub id: ProgramId,
    pub name: String,
    pub categories: Vec<CategoryRequirement>,
}

fn read_json<T: serde::de::DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let json =
        std::fs::read_to_string(dir.join(file)).with_context(|| format!("reading {file}"))?;
    serde_json::from_str(&json).with_context(|| format!("parsing {file}"))
}

/// Reads `planner.json`. A missing file gives the default configuration.
pub fn load_config(content_dir: &Path) -> Result<PlannerConfig> {
    if !content_dir.join("planner.json").exists() {
        tracing::debug!(dir = %content_dir.display(), "no planner.json, using defaults");
        return Ok(PlannerConfig::default());
    }
    let config: PlannerConfig = read_json(content_dir, "planner.json")?;
    if config.semester_count == 0 {
        bail!("planner.json: semester_count must be at least 1");
    }
    Ok(config)
}

/// File-backed catalog and requirements source.
#[derive(Debug, Clone)]
pub struct ContentDir {
    root: PathBuf,
}

impl ContentDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> Result<PlannerConfig> {
        load_config(&self.root)
    }

    /// Every module in `modules.json`, unfiltered.
    pub fn snapshot(&self) -> Result<CatalogSnapshot> {
        let file: ModulesFile = read_json(&self.root, "modules.json")?;
        Ok(CatalogSnapshot {
            content_version: file.content_version,
            modules: file.modules,
        })
    }

    pub fn programs(&self) -> Result<Vec<ProgramRequirements>> {
        let file: RequirementsFile = read_json(&self.root, "requirements.json")?;
        Ok(file.programs)
    }
}

impl CatalogProvider for ContentDir {
    fn fetch_catalog(&self, program: Option<&ProgramId>) -> Result<CatalogSnapshot> {
        let mut snapshot = self.snapshot()?;
        if let Some(program) = program {
            snapshot
                .modules
                .retain(|def| def.programs.is_empty() || def.programs.contains(program));
        }
        Ok(snapshot)
    }
}

impl RequirementsProvider for ContentDir {
    fn fetch_requirements(&self, program: &ProgramId) -> Result<Vec<CategoryRequirement>> {
        self.programs()?
            .into_iter()
            .find(|p| p.id == *program)
            .map(|p| p.categories)
            .with_context(|| format!("requirements.json has no program '{program}'"))
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// An authoring problem in the content files. None of these stop loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentIssue {
    DuplicateCode(ModuleCode),
    UnknownPrerequisite {
        module: ModuleCode,
        prerequisite: ModuleCode,
    },
    SelfPrerequisite(ModuleCode),
    PrerequisiteCycle(Vec<ModuleCode>),
    ZeroCredits(ModuleCode),
    OfferedOutsideHorizon {
        module: ModuleCode,
        semester: Semester,
    },
    NeverOffered(ModuleCode),
    InvertedBounds {
        program: ProgramId,
        category: SubjectArea,
        min_credits: u32,
        max_credits: u32,
    },
}

impl fmt::Display for ContentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateCode(code) => write!(f, "module '{code}' is defined more than once"),
            Self::UnknownPrerequisite {
                module,
                prerequisite,
            } => write!(
                f,
                "module '{module}' prereq '{prerequisite}' is not a known module"
            ),
            Self::SelfPrerequisite(code) => write!(f, "module '{code}' requires itself"),
            Self::PrerequisiteCycle(codes) => {
                let path: Vec<&str> = codes.iter().map(|c| c.0.as_str()).collect();
                write!(f, "prerequisite cycle: {}", path.join(" -> "))
            }
            Self::ZeroCredits(code) => write!(f, "module '{code}' is worth 0 ECTS"),
            Self::OfferedOutsideHorizon { module, semester } => write!(
                f,
                "module '{module}' is offered in semester {semester}, outside the planning horizon"
            ),
            Self::NeverOffered(code) => {
                write!(f, "module '{code}' has no offering inside the planning horizon")
            }
            Self::InvertedBounds {
                program,
                category,
                min_credits,
                max_credits,
            } => write!(
                f,
                "program '{program}' category '{category}' has min {min_credits} above max {max_credits}"
            ),
        }
    }
}

/// Checks cross-references and ranges in loaded content. Every issue is
/// logged as a warning and returned.
pub fn validate_catalog(
    snapshot: &CatalogSnapshot,
    programs: &[ProgramRequirements],
    config: &PlannerConfig,
) -> Vec<ContentIssue> {
    let mut issues = Vec::new();
    let mut seen: HashSet<&ModuleCode> = HashSet::new();
    let codes: HashSet<&ModuleCode> = snapshot.modules.iter().map(|d| &d.code).collect();

    for def in &snapshot.modules {
        if !seen.insert(&def.code) {
            issues.push(ContentIssue::DuplicateCode(def.code.clone()));
            continue;
        }
        for prereq in &def.prerequisite_codes {
            if *prereq == def.code {
                issues.push(ContentIssue::SelfPrerequisite(def.code.clone()));
            } else if !codes.contains(prereq) {
                issues.push(ContentIssue::UnknownPrerequisite {
                    module: def.code.clone(),
                    prerequisite: prereq.clone(),
                });
            }
        }
        if def.ects == 0 {
            issues.push(ContentIssue::ZeroCredits(def.code.clone()));
        }
        for offering in &def.offered {
            if let Offering::Semester(n) = offering {
                if *n == 0 || *n > config.semester_count {
                    issues.push(ContentIssue::OfferedOutsideHorizon {
                        module: def.code.clone(),
                        semester: *n,
                    });
                }
            }
        }
        if offered_semesters(def, config).is_empty() {
            issues.push(ContentIssue::NeverOffered(def.code.clone()));
        }
    }

    // Self-prerequisites are already reported above.
    issues.extend(
        prerequisite_cycles(&snapshot.modules)
            .into_iter()
            .filter(|cycle| cycle.len() > 1)
            .map(ContentIssue::PrerequisiteCycle),
    );

    for program in programs {
        for req in &program.categories {
            if req.min_credits > req.max_credits {
                issues.push(ContentIssue::InvertedBounds {
                    program: program.id.clone(),
                    category: req.category.clone(),
                    min_credits: req.min_credits,
                    max_credits: req.max_credits,
                });
            }
        }
    }

    for issue in &issues {
        tracing::warn!("content: {issue}");
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan_core::test_fixtures::{code, module, requirement};
    use plan_core::Term;

    fn snapshot_of(modules: Vec<ModuleDef>) -> CatalogSnapshot {
        CatalogSnapshot {
            content_version: "test".to_string(),
            modules,
        }
    }

    fn program(id: &str, categories: Vec<CategoryRequirement>) -> ProgramRequirements {
        ProgramRequirements {
            id: ProgramId(id.to_string()),
            name: id.to_uppercase(),
            categories,
        }
    }

    #[test]
    fn clean_content_has_no_issues() {
        let snapshot = snapshot_of(vec![module("A", 5, &[]), module("B", 5, &["A"])]);
        let programs = vec![program("cs", vec![requirement("X", 10, 20)])];
        assert!(validate_catalog(&snapshot, &programs, &PlannerConfig::default()).is_empty());
    }

    #[test]
    fn duplicate_code_reported_once() {
        let snapshot = snapshot_of(vec![
            module("A", 5, &[]),
            module("A", 6, &[]),
            module("A", 7, &[]),
        ]);
        let issues = validate_catalog(&snapshot, &[], &PlannerConfig::default());
        assert_eq!(
            issues,
            vec![
                ContentIssue::DuplicateCode(code("A")),
                ContentIssue::DuplicateCode(code("A")),
            ]
        );
    }

    #[test]
    fn unknown_and_self_prerequisites() {
        let snapshot = snapshot_of(vec![module("A", 5, &["A", "GHOST"])]);
        let issues = validate_catalog(&snapshot, &[], &PlannerConfig::default());
        assert_eq!(
            issues,
            vec![
                ContentIssue::SelfPrerequisite(code("A")),
                ContentIssue::UnknownPrerequisite {
                    module: code("A"),
                    prerequisite: code("GHOST"),
                },
            ]
        );
    }

    #[test]
    fn cycle_reported() {
        let snapshot = snapshot_of(vec![module("A", 5, &["B"]), module("B", 5, &["A"])]);
        let issues = validate_catalog(&snapshot, &[], &PlannerConfig::default());
        assert_eq!(
            issues,
            vec![ContentIssue::PrerequisiteCycle(vec![code("A"), code("B")])]
        );
        assert_eq!(issues[0].to_string(), "prerequisite cycle: A -> B");
    }

    #[test]
    fn range_problems_reported() {
        let mut late = module("L", 5, &[]);
        late.offered = vec![Offering::Semester(9)];
        let mut winter = module("W", 5, &[]);
        winter.offered = vec![Offering::Term(Term::Winter), Offering::Semester(0)];
        let snapshot = snapshot_of(vec![module("Z", 0, &[]), late, winter]);
        let programs = vec![program("cs", vec![requirement("X", 30, 20)])];

        let issues = validate_catalog(&snapshot, &programs, &PlannerConfig::default());
        assert_eq!(
            issues,
            vec![
                ContentIssue::ZeroCredits(code("Z")),
                ContentIssue::OfferedOutsideHorizon {
                    module: code("L"),
                    semester: 9,
                },
                ContentIssue::NeverOffered(code("L")),
                ContentIssue::OfferedOutsideHorizon {
                    module: code("W"),
                    semester: 0,
                },
                ContentIssue::InvertedBounds {
                    program: ProgramId("cs".to_string()),
                    category: plan_core::test_fixtures::area("X"),
                    min_credits: 30,
                    max_credits: 20,
                },
            ]
        );
    }

    #[test]
    fn missing_planner_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config(dir.path()).unwrap(), PlannerConfig::default());
    }

    #[test]
    fn planner_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("planner.json"),
            r#"{ "semester_count": 4, "first_term": "summer", "conflict_rule": "replace" }"#,
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.semester_count, 4);
        assert_eq!(config.first_term, Term::Summer);
        assert_eq!(config.conflict_rule, plan_core::ConflictRule::Replace);
        assert_eq!(
            config.prerequisite_rule,
            plan_core::PrerequisiteRule::StrictlyEarlier
        );
    }

    #[test]
    fn zero_semester_horizon_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("planner.json"), r#"{ "semester_count": 0 }"#).unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(err.to_string().contains("semester_count"), "{err}");
    }

    #[test]
    fn program_filter_keeps_shared_modules() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("modules.json"),
            r#"{
                "content_version": "t1",
                "modules": [
                    { "code": "SHARED", "name": "Shared", "ects": 5 },
                    { "code": "CS_ONLY", "name": "CS", "ects": 5, "programs": ["cs"] },
                    { "code": "MATH_ONLY", "name": "Math", "ects": 5, "programs": ["math"] }
                ]
            }"#,
        )
        .unwrap();
        let content = ContentDir::new(dir.path());

        let all = content.fetch_catalog(None).unwrap();
        assert_eq!(all.modules.len(), 3);

        let cs = content
            .fetch_catalog(Some(&ProgramId("cs".to_string())))
            .unwrap();
        let codes: Vec<&str> = cs.modules.iter().map(|d| d.code.0.as_str()).collect();
        assert_eq!(codes, vec!["SHARED", "CS_ONLY"]);
    }

    #[test]
    fn unknown_program_requirements_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("requirements.json"),
            r#"{ "programs": [ { "id": "cs", "name": "CS", "categories": [] } ] }"#,
        )
        .unwrap();
        let content = ContentDir::new(dir.path());
        assert!(content
            .fetch_requirements(&ProgramId("cs".to_string()))
            .unwrap()
            .is_empty());
        let err = content
            .fetch_requirements(&ProgramId("law".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("law"), "{err}");
    }

    #[test]
    fn missing_modules_file_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContentDir::new(dir.path()).fetch_catalog(None).unwrap_err();
        assert!(format!("{err:#}").contains("modules.json"), "{err:#}");
    }
}
