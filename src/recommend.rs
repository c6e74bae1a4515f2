use crate::config::PlannerConfig;
use crate::eligibility::eligible_courses;
use crate::graph::CourseGraph;
use crate::models::{PeerMatch, ScoredCourse, StudentProfile};

/// Ranked "what next" view: the current eligible frontier, scored and cut to
/// the configured limit. Independent of any full optimizer run.
pub fn recommend_next_term(
    graph: &CourseGraph,
    student: &StudentProfile,
    config: &PlannerConfig,
) -> Vec<ScoredCourse> {
    let taken = student.taken_or_enrolled();
    let eligible = eligible_courses(graph, &taken, &student.remaining_required);
    let mut ranked = crate::score::score_and_rank(&eligible, student, graph, config);
    ranked.truncate(config.recommendation_limit);
    ranked
}

/// Peers ranked by similarity to the target: learning-style affinity blended
/// with completed-course overlap (Jaccard). Deterministic for identical
/// snapshots.
pub fn similar_students(
    students: &[StudentProfile],
    target: &StudentProfile,
    config: &PlannerConfig,
) -> Vec<PeerMatch> {
    let mut matches: Vec<PeerMatch> = students
        .iter()
        .filter(|s| s.id != target.id)
        .map(|peer| {
            let style = config.style_affinity(target.learning_style, peer.learning_style);
            let shared = target.completed.intersection(&peer.completed).count();
            let union = target.completed.union(&peer.completed).count();
            let overlap = if union == 0 {
                0.0
            } else {
                shared as f64 / union as f64
            };
            PeerMatch {
                student_id: peer.id,
                name: peer.name.clone(),
                learning_style: peer.learning_style,
                similarity: 0.5 * style + 0.5 * overlap,
                shared_courses: shared,
                completed_count: peer.completed.len(),
            }
        })
        .collect();

    matches.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    matches
}
