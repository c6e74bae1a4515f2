use std::collections::BTreeSet;

use crate::config::PlannerConfig;
use crate::graph::CourseGraph;
use crate::models::{Course, RiskLevel, ScoredCourse, StudentProfile};

/// Desirability of one course for one student: four sub-scores, each
/// normalized to [0, 1], combined as a weighted sum. The aggregate is a
/// relative ranking signal only.
pub fn score_course(
    course: &Course,
    student: &StudentProfile,
    graph: &CourseGraph,
    config: &PlannerConfig,
) -> ScoredCourse {
    let max_transitive = graph.max_transitive_dependents();
    let unlock_impact = if max_transitive == 0 {
        0.0
    } else {
        graph.transitive_dependents_count(&course.id) as f64 / max_transitive as f64
    };

    let style_match = config.style_affinity(student.learning_style, course.learning_style);
    let ease = (1.0 - course.difficulty / config.difficulty_scale).clamp(0.0, 1.0);
    let success_rate = course.success_rate.clamp(0.0, 1.0);

    let weights = &config.weights;
    let score = weights.unlock_impact * unlock_impact
        + weights.style_match * style_match
        + weights.ease * ease
        + weights.success_rate * success_rate;

    ScoredCourse {
        course_id: course.id.clone(),
        name: course.name.clone(),
        credits: course.credits,
        level: course.level,
        difficulty: course.difficulty,
        score,
        unlock_impact,
        style_match,
        ease,
        success_rate,
    }
}

/// Score every course in the set and rank best-first. Ties break by
/// ascending course id so identical inputs always order identically.
pub fn score_and_rank(
    course_ids: &BTreeSet<String>,
    student: &StudentProfile,
    graph: &CourseGraph,
    config: &PlannerConfig,
) -> Vec<ScoredCourse> {
    let mut scored: Vec<ScoredCourse> = course_ids
        .iter()
        .filter_map(|id| graph.course(id))
        .map(|course| score_course(course, student, graph, config))
        .collect();
    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.course_id.cmp(&b.course_id))
    });
    scored
}

/// Mean difficulty of scheduled courses, mapped to a term risk level by the
/// configured thresholds.
pub fn term_risk_level(mean_difficulty: f64, config: &PlannerConfig) -> RiskLevel {
    if mean_difficulty < config.low_difficulty_below {
        RiskLevel::Low
    } else if mean_difficulty < config.medium_difficulty_below {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LearningStyle;
    use uuid::Uuid;

    fn course(id: &str, difficulty: f64, success_rate: f64, prereqs: &[&str]) -> Course {
        Course {
            id: id.to_string(),
            name: format!("Course {id}"),
            credits: 3,
            level: 200,
            difficulty,
            success_rate,
            learning_style: LearningStyle::Visual,
            prerequisites: prereqs.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn student(style: LearningStyle) -> StudentProfile {
        StudentProfile {
            id: Uuid::new_v4(),
            name: "Avery Lee".to_string(),
            email: "avery@example.edu".to_string(),
            learning_style: style,
            preferred_load: 4,
            work_hours_per_week: 0,
            completed: BTreeSet::new(),
            enrolled: BTreeSet::new(),
            remaining_required: BTreeSet::new(),
            last_term: None,
            target_graduation: None,
        }
    }

    #[test]
    fn sub_scores_are_normalized() {
        let graph = CourseGraph::load(vec![
            course("A", 2.5, 0.9, &[]),
            course("B", 2.5, 0.9, &["A"]),
        ])
        .expect("load");
        let scored = score_course(
            graph.course("A").unwrap(),
            &student(LearningStyle::Visual),
            &graph,
            &PlannerConfig::default(),
        );
        assert_eq!(scored.unlock_impact, 1.0);
        assert_eq!(scored.style_match, 1.0);
        assert!((scored.ease - 0.5).abs() < 1e-9);
        assert_eq!(scored.success_rate, 0.9);
    }

    #[test]
    fn unlock_impact_guards_zero_maximum() {
        let graph = CourseGraph::load(vec![course("A", 3.0, 0.8, &[])]).expect("load");
        let scored = score_course(
            graph.course("A").unwrap(),
            &student(LearningStyle::Visual),
            &graph,
            &PlannerConfig::default(),
        );
        assert_eq!(scored.unlock_impact, 0.0);
    }

    #[test]
    fn equal_scores_order_by_ascending_id() {
        let graph = CourseGraph::load(vec![
            course("B2", 3.0, 0.8, &[]),
            course("A1", 3.0, 0.8, &[]),
        ])
        .expect("load");
        let ids: BTreeSet<String> = ["A1", "B2"].iter().map(|s| s.to_string()).collect();
        let ranked = score_and_rank(
            &ids,
            &student(LearningStyle::Visual),
            &graph,
            &PlannerConfig::default(),
        );
        assert_eq!(ranked[0].course_id, "A1");
        assert_eq!(ranked[1].course_id, "B2");
        assert_eq!(ranked[0].score, ranked[1].score);
    }

    #[test]
    fn higher_success_rate_ranks_first() {
        let graph = CourseGraph::load(vec![
            course("A", 3.0, 0.5, &[]),
            course("B", 3.0, 0.95, &[]),
        ])
        .expect("load");
        let ids: BTreeSet<String> = ["A", "B"].iter().map(|s| s.to_string()).collect();
        let ranked = score_and_rank(
            &ids,
            &student(LearningStyle::Visual),
            &graph,
            &PlannerConfig::default(),
        );
        assert_eq!(ranked[0].course_id, "B");
    }

    #[test]
    fn risk_levels_follow_thresholds() {
        let config = PlannerConfig::default();
        assert_eq!(term_risk_level(1.2, &config), RiskLevel::Low);
        assert_eq!(term_risk_level(2.0, &config), RiskLevel::Medium);
        assert_eq!(term_risk_level(3.4, &config), RiskLevel::Medium);
        assert_eq!(term_risk_level(3.5, &config), RiskLevel::High);
        assert_eq!(term_risk_level(4.8, &config), RiskLevel::High);
    }
}
