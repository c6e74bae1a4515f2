use crate::config::PlannerConfig;
use crate::graph::CourseGraph;
use crate::models::{RiskCategory, RiskFactor, RiskLevel, StudentProfile, Term};
use crate::schedule::slot_ceiling_for_term;

/// Post-processing pass over a finished plan. Each rule is evaluated
/// independently and appends its own factors; the plan itself is untouched.
pub fn analyze_plan(
    terms: &[Term],
    student: &StudentProfile,
    graph: &CourseGraph,
    config: &PlannerConfig,
) -> Vec<RiskFactor> {
    let mut factors = Vec::new();
    factors.extend(difficulty_clusters(terms, config));
    factors.extend(workload_conflicts(terms, student, config));
    factors.extend(style_mismatches(terms, config));
    factors.extend(prerequisite_bottlenecks(terms, graph, config));
    factors
}

/// Runs of consecutive High-difficulty terms at or past the configured
/// length, one factor per maximal run.
fn difficulty_clusters(terms: &[Term], config: &PlannerConfig) -> Vec<RiskFactor> {
    let mut factors = Vec::new();
    let mut run_start: Option<usize> = None;

    for (idx, term) in terms.iter().enumerate() {
        if term.risk_level == RiskLevel::High {
            run_start.get_or_insert(idx);
            continue;
        }
        if let Some(start) = run_start.take() {
            if idx - start >= config.difficulty_cluster_run {
                factors.push(cluster_factor(&terms[start..idx]));
            }
        }
    }
    if let Some(start) = run_start {
        if terms.len() - start >= config.difficulty_cluster_run {
            factors.push(cluster_factor(&terms[start..]));
        }
    }
    factors
}

fn cluster_factor(run: &[Term]) -> RiskFactor {
    let first = run.first().map(|t| t.number).unwrap_or(0);
    let last = run.last().map(|t| t.number).unwrap_or(0);
    RiskFactor {
        category: RiskCategory::DifficultyCluster,
        severity: RiskLevel::Medium,
        description: format!(
            "Terms {first} through {last} are consecutively rated High difficulty"
        ),
        recommendation: "Consider spreading difficult courses across more terms".to_string(),
    }
}

/// Terms whose course count exceeds the work-hour-implied ceiling. The
/// scheduler should never produce one; this catches externally-forced
/// overloads fed back through the plan.
fn workload_conflicts(
    terms: &[Term],
    student: &StudentProfile,
    config: &PlannerConfig,
) -> Vec<RiskFactor> {
    terms
        .iter()
        .filter(|term| {
            term.courses.len() as u32 > slot_ceiling_for_term(student, term.term_type, config)
        })
        .map(|term| RiskFactor {
            category: RiskCategory::WorkloadConflict,
            severity: RiskLevel::High,
            description: format!(
                "Term {} schedules {} courses while working {} hours per week",
                term.number,
                term.courses.len(),
                student.work_hours_per_week
            ),
            recommendation:
                "Consider reducing course load or work hours during this term".to_string(),
        })
        .collect()
}

/// Terms where most scheduled courses fall under the style-match threshold.
fn style_mismatches(terms: &[Term], config: &PlannerConfig) -> Vec<RiskFactor> {
    terms
        .iter()
        .filter_map(|term| {
            let mismatched = term
                .courses
                .iter()
                .filter(|c| c.style_match < config.style_mismatch_threshold)
                .count();
            if mismatched * 2 <= term.courses.len() {
                return None;
            }
            Some(RiskFactor {
                category: RiskCategory::LearningStyleMismatch,
                severity: RiskLevel::Low,
                description: format!(
                    "{} of {} courses in term {} may not align with your learning style",
                    mismatched,
                    term.courses.len(),
                    term.number
                ),
                recommendation:
                    "Seek additional support or alternative sections for these courses"
                        .to_string(),
            })
        })
        .collect()
}

/// Scheduled courses sitting atop prerequisite chains deeper than the
/// configured threshold: a repeated or failed upstream course delays all of
/// them.
fn prerequisite_bottlenecks(
    terms: &[Term],
    graph: &CourseGraph,
    config: &PlannerConfig,
) -> Vec<RiskFactor> {
    let fragile: Vec<&str> = terms
        .iter()
        .flat_map(|t| t.courses.iter())
        .filter(|c| graph.prerequisite_depth(&c.course_id) > config.bottleneck_depth)
        .map(|c| c.course_id.as_str())
        .collect();

    if fragile.is_empty() {
        return Vec::new();
    }
    vec![RiskFactor {
        category: RiskCategory::PrerequisiteBottleneck,
        severity: RiskLevel::Medium,
        description: format!(
            "Long prerequisite chains feed into: {}",
            fragile.join(", ")
        ),
        recommendation:
            "Plan carefully to avoid delays if any upstream course is repeated or failed"
                .to_string(),
    }]
}
