//! Insight selection.

use std::collections::BTreeMap;

use crate::model::InsightRecord;

/// Maximum number of insights shown per student.
pub const MAX_INSIGHTS: usize = 5;

/// Order a student's insights by rank (1 first) and keep at most
/// [`MAX_INSIGHTS`]. Ties keep their input order.
pub fn select_insights(mut insights: Vec<InsightRecord>) -> Vec<InsightRecord> {
    insights.sort_by_key(|i| i.insight_rank);
    insights.truncate(MAX_INSIGHTS);
    insights
}

/// Split a flat `(student_id, insight)` list into per-student lists.
pub fn group_by_student<I>(entries: I) -> BTreeMap<String, Vec<InsightRecord>>
where
    I: IntoIterator<Item = (String, InsightRecord)>,
{
    let mut grouped: BTreeMap<String, Vec<InsightRecord>> = BTreeMap::new();
    for (student_id, insight) in entries {
        grouped.entry(student_id).or_default().push(insight);
    }
    grouped
}
