use std::collections::BTreeSet;

use crate::config::PlannerConfig;
use crate::eligibility::eligible_courses;
use crate::graph::CourseGraph;
use crate::models::{PlanOutcome, StudentProfile, Term, TermPlan, TermType};
use crate::risk;
use crate::score::{score_and_rank, term_risk_level};

/// Full multi-term plan with attached risk factors. One synchronous pass
/// over value snapshots; the graph and profile are never mutated.
pub fn optimize(
    graph: &CourseGraph,
    student: &StudentProfile,
    config: &PlannerConfig,
) -> TermPlan {
    let (terms, outcome) = build_terms(graph, student, config);
    let risk_factors = risk::analyze_plan(&terms, student, graph, config);
    TermPlan {
        terms,
        outcome,
        risk_factors,
    }
}

/// Term-by-term state machine. Each step recomputes the eligible frontier,
/// ranks it, and greedily fills the term under the slot and credit ceilings.
/// Every non-terminal step schedules at least one course, so the loop ends
/// in Complete or Stalled within |remaining| terms.
fn build_terms(
    graph: &CourseGraph,
    student: &StudentProfile,
    config: &PlannerConfig,
) -> (Vec<Term>, PlanOutcome) {
    let mut taken = student.taken_or_enrolled();
    // Requirements already covered by the transcript are treated as met.
    let mut remaining: BTreeSet<String> = student
        .remaining_required
        .difference(&taken)
        .cloned()
        .collect();

    let mut terms = Vec::new();
    let mut term_number = 1u32;
    let mut term_type = student
        .last_term
        .map(|t| t.next())
        .unwrap_or(TermType::Fall);

    let outcome = loop {
        if remaining.is_empty() {
            break PlanOutcome::Complete;
        }
        let eligible = eligible_courses(graph, &taken, &remaining);
        if eligible.is_empty() {
            break PlanOutcome::Stalled {
                unresolved: remaining.clone(),
            };
        }

        let ranked = score_and_rank(&eligible, student, graph, config);
        let slots = slot_ceiling_for_term(student, term_type, config);
        let credit_ceiling = (slots * config.credits_per_slot).min(config.max_term_credits);

        let mut selected = Vec::new();
        let mut credits = 0u32;
        for course in ranked {
            if selected.len() as u32 >= slots {
                break;
            }
            // The top-ranked course is always admitted; a term never goes
            // out empty while the frontier is non-empty.
            if !selected.is_empty() && credits + course.credits > credit_ceiling {
                continue;
            }
            credits += course.credits;
            selected.push(course);
        }

        let mean_difficulty =
            selected.iter().map(|c| c.difficulty).sum::<f64>() / selected.len() as f64;

        for course in &selected {
            taken.insert(course.course_id.clone());
            remaining.remove(&course.course_id);
        }

        terms.push(Term {
            number: term_number,
            term_type,
            courses: selected,
            total_credits: credits,
            mean_difficulty,
            risk_level: term_risk_level(mean_difficulty, config),
        });
        term_number += 1;
        term_type = term_type.next();
    };

    (terms, outcome)
}

/// Slot ceiling for one term: preferred load less the work-hour reduction,
/// with the Summer cap applied on top. Never below one.
pub fn slot_ceiling_for_term(
    student: &StudentProfile,
    term_type: TermType,
    config: &PlannerConfig,
) -> u32 {
    let slots = config.slot_ceiling(student.preferred_load, student.work_hours_per_week);
    if term_type == TermType::Summer {
        slots.min(config.summer_slot_cap.max(1))
    } else {
        slots
    }
}
