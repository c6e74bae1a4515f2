use std::fmt::Write;

use chrono::{Duration, NaiveDate};

use crate::graph::CourseGraph;
use crate::models::{CourseRecord, EnrollmentStatus, PlanOutcome, StudentProfile, TermPlan};

const DAYS_PER_TERM: i64 = 120;

fn grade_points(grade: &str) -> Option<f64> {
    match grade {
        "A" => Some(4.0),
        "A-" => Some(3.7),
        "B+" => Some(3.3),
        "B" => Some(3.0),
        "B-" => Some(2.7),
        "C+" => Some(2.3),
        "C" => Some(2.0),
        "C-" => Some(1.7),
        "D+" => Some(1.3),
        "D" => Some(1.0),
        "F" => Some(0.0),
        _ => None,
    }
}

/// Credit-weighted GPA over completed, graded transcript rows. None when no
/// graded credits exist.
pub fn gpa(records: &[CourseRecord]) -> Option<f64> {
    let mut points = 0.0;
    let mut credits = 0u32;
    for record in records {
        if record.status != EnrollmentStatus::Completed {
            continue;
        }
        // Pass/fail and transfer rows carry no letter grade; they don't
        // count toward the average.
        let Some(grade) = record.grade.as_deref().and_then(grade_points) else {
            continue;
        };
        points += grade * record.credits as f64;
        credits += record.credits;
    }
    if credits == 0 {
        return None;
    }
    Some(points / credits as f64)
}

/// Rough graduation date: four months per remaining term, counted from the
/// supplied date so the estimate stays a pure function.
pub fn estimate_graduation(from: NaiveDate, term_count: usize) -> NaiveDate {
    from + Duration::days(term_count as i64 * DAYS_PER_TERM)
}

pub fn build_report(
    student: &StudentProfile,
    records: &[CourseRecord],
    plan: &TermPlan,
    graph: &CourseGraph,
    today: NaiveDate,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Degree Pathway Report");
    let _ = writeln!(
        output,
        "Generated for {} ({}) on {}",
        student.name, student.email, today
    );
    let _ = writeln!(
        output,
        "Learning style: {}. Preferred load: {} courses per term. Work: {} hours per week.",
        student.learning_style.as_tag(),
        student.preferred_load,
        student.work_hours_per_week
    );
    if let Some(value) = gpa(records) {
        let _ = writeln!(output, "Current GPA: {value:.2}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Plan Summary");
    match &plan.outcome {
        PlanOutcome::Complete => {
            if plan.terms.is_empty() {
                let _ = writeln!(output, "All degree requirements are already satisfied.");
            } else {
                let _ = writeln!(
                    output,
                    "{} terms to graduation, {} total credits. Estimated completion: {}.",
                    plan.terms.len(),
                    plan.total_credits(),
                    estimate_graduation(today, plan.terms.len())
                );
            }
        }
        PlanOutcome::Stalled { unresolved } => {
            let _ = writeln!(
                output,
                "Plan stalled after {} terms. No eligible course unlocks the remaining requirements.",
                plan.terms.len()
            );
            let mut satisfied = student.taken_or_enrolled();
            for term in &plan.terms {
                for course in &term.courses {
                    satisfied.insert(course.course_id.clone());
                }
            }
            for course_id in unresolved {
                let missing: Vec<String> = graph
                    .prerequisites_of(course_id)
                    .into_iter()
                    .filter(|p| !satisfied.contains(p))
                    .collect();
                if missing.is_empty() {
                    let _ = writeln!(output, "- {course_id}: blocked by another stalled course");
                } else {
                    let _ = writeln!(
                        output,
                        "- {course_id}: missing prerequisites {}",
                        missing.join(", ")
                    );
                }
            }
        }
    }

    for term in &plan.terms {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "## Term {} ({}) - {} credits, {} risk",
            term.number,
            term.term_type.as_tag(),
            term.total_credits,
            term.risk_level.as_tag()
        );
        for course in &term.courses {
            let _ = writeln!(
                output,
                "- {} {} ({} credits, difficulty {:.1}, score {:.2})",
                course.course_id, course.name, course.credits, course.difficulty, course.score
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Factors");
    if plan.risk_factors.is_empty() {
        let _ = writeln!(output, "No risk factors identified for this plan.");
    } else {
        for factor in &plan.risk_factors {
            let _ = writeln!(
                output,
                "- [{}] {}: {}. {}.",
                factor.severity.as_tag(),
                factor.category.as_tag(),
                factor.description,
                factor.recommendation
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        LearningStyle, RiskCategory, RiskFactor, RiskLevel, ScoredCourse, Term, TermType,
    };
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn record(course_id: &str, credits: u32, grade: Option<&str>) -> CourseRecord {
        CourseRecord {
            course_id: course_id.to_string(),
            credits,
            status: EnrollmentStatus::Completed,
            grade: grade.map(|g| g.to_string()),
        }
    }

    fn sample_student() -> StudentProfile {
        StudentProfile {
            id: Uuid::new_v4(),
            name: "Avery Lee".to_string(),
            email: "avery@example.edu".to_string(),
            learning_style: LearningStyle::Visual,
            preferred_load: 4,
            work_hours_per_week: 10,
            completed: BTreeSet::new(),
            enrolled: BTreeSet::new(),
            remaining_required: BTreeSet::new(),
            last_term: None,
            target_graduation: None,
        }
    }

    fn sample_plan() -> TermPlan {
        TermPlan {
            terms: vec![Term {
                number: 1,
                term_type: TermType::Fall,
                courses: vec![ScoredCourse {
                    course_id: "CS101".to_string(),
                    name: "Intro to Computing".to_string(),
                    credits: 4,
                    level: 100,
                    difficulty: 2.0,
                    score: 2.1,
                    unlock_impact: 0.8,
                    style_match: 1.0,
                    ease: 0.6,
                    success_rate: 0.9,
                }],
                total_credits: 4,
                mean_difficulty: 2.0,
                risk_level: RiskLevel::Medium,
            }],
            outcome: PlanOutcome::Complete,
            risk_factors: vec![RiskFactor {
                category: RiskCategory::WorkloadConflict,
                severity: RiskLevel::High,
                description: "Term 1 schedules 5 courses while working 30 hours per week"
                    .to_string(),
                recommendation: "Consider reducing course load".to_string(),
            }],
        }
    }

    #[test]
    fn gpa_is_credit_weighted() {
        let records = vec![record("A", 4, Some("A")), record("B", 2, Some("C"))];
        let value = gpa(&records).expect("gpa");
        let expected = (4.0 * 4.0 + 2.0 * 2.0) / 6.0;
        assert!((value - expected).abs() < 1e-9);
    }

    #[test]
    fn gpa_absent_without_graded_credits() {
        assert!(gpa(&[]).is_none());
    }

    #[test]
    fn graduation_estimate_counts_terms() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).expect("date");
        let estimated = estimate_graduation(today, 3);
        assert_eq!(estimated, today + Duration::days(360));
    }

    fn catalog() -> CourseGraph {
        let course = |id: &str, prereqs: &[&str]| crate::models::Course {
            id: id.to_string(),
            name: format!("Course {id}"),
            credits: 3,
            level: 300,
            difficulty: 3.0,
            success_rate: 0.8,
            learning_style: LearningStyle::Visual,
            prerequisites: prereqs.iter().map(|p| p.to_string()).collect(),
        };
        CourseGraph::load(vec![course("CS301", &[]), course("CS401", &["CS301"])])
            .expect("load")
    }

    #[test]
    fn report_renders_terms_and_risks() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).expect("date");
        let report = build_report(&sample_student(), &[], &sample_plan(), &catalog(), today);
        assert!(report.contains("# Degree Pathway Report"));
        assert!(report.contains("## Term 1 (Fall) - 4 credits, Medium risk"));
        assert!(report.contains("CS101 Intro to Computing"));
        assert!(report.contains("[High] Workload Conflict"));
    }

    #[test]
    fn stalled_report_names_missing_prerequisites() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).expect("date");
        let mut plan = sample_plan();
        plan.outcome = PlanOutcome::Stalled {
            unresolved: ["CS401".to_string()].into_iter().collect(),
        };
        let report = build_report(&sample_student(), &[], &plan, &catalog(), today);
        assert!(report.contains("Plan stalled after 1 terms"));
        assert!(report.contains("- CS401: missing prerequisites CS301"));
    }
}
