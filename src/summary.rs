use crate::models::{SetLog, SummaryItem, SummarySet, WorkoutItem, WorkoutSummary};

const WEIGHT_PLACEHOLDER: &str = "—";
const NO_SETS_LOGGED: &str = "no sets logged";

/// Groups logs under their items in plan order. Items without logs are kept
/// with an empty set list; logs for items no longer in the plan come last.
pub fn build_summary(workout_name: &str, items: &[WorkoutItem], logs: &[SetLog]) -> WorkoutSummary {
    let mut summary = WorkoutSummary {
        workout_name: workout_name.to_string(),
        ..WorkoutSummary::default()
    };

    for item in items {
        summary.items.push(SummaryItem {
            item_id: item.id.clone(),
            name: item.name.clone(),
            sets: Vec::new(),
        });
    }

    for log in logs {
        let index = match summary.items.iter().position(|entry| entry.item_id == log.item_id) {
            Some(index) => index,
            None => {
                summary.items.push(SummaryItem {
                    item_id: log.item_id.clone(),
                    name: log.item_id.clone(),
                    sets: Vec::new(),
                });
                summary.items.len() - 1
            }
        };
        let confirmed = log.actual_reps.is_some();
        summary.items[index].sets.push(SummarySet {
            set_number: log.set_number,
            line: format_set_line(log),
            confirmed,
        });
        summary.sets_logged = summary.sets_logged.saturating_add(1);
        if confirmed {
            summary.sets_confirmed = summary.sets_confirmed.saturating_add(1);
        }
    }

    summary
}

pub fn format_set_line(log: &SetLog) -> String {
    let mut parts = Vec::with_capacity(3);
    let work = match (log.is_timed, log.actual_reps) {
        (false, Some(reps)) => format!("{reps}/{} reps", log.target),
        (false, None) => format!("target {} reps", log.target),
        (true, Some(reps)) => format!("{reps} reps in {}s", log.target),
        (true, None) => format!("target {}s", log.target),
    };
    parts.push(work);
    if log.weight.is_empty() {
        parts.push(WEIGHT_PLACEHOLDER.to_string());
    } else {
        parts.push(log.weight.clone());
    }
    if !log.notes.is_empty() {
        parts.push(log.notes.clone());
    }
    format!("Set {}: {}", log.set_number, parts.join(" · "))
}

/// Plain-text rendering, one heading per item followed by its set lines.
pub fn render_summary(summary: &WorkoutSummary) -> Vec<String> {
    let mut lines = Vec::new();
    let title = if summary.workout_name.is_empty() {
        "Workout complete".to_string()
    } else {
        format!("{} complete", summary.workout_name)
    };
    lines.push(title);
    for item in &summary.items {
        lines.push(item.name.clone());
        if item.sets.is_empty() {
            lines.push(format!("  {NO_SETS_LOGGED}"));
            continue;
        }
        for set in &item.sets {
            lines.push(format!("  {}", set.line));
        }
    }
    lines.push(format!(
        "{} sets logged, {} confirmed",
        summary.sets_logged, summary.sets_confirmed
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::{build_summary, format_set_line, render_summary};
    use crate::models::{CompletedBy, SetLog, WorkoutItem};

    fn sample_log(item_id: &str, set_number: u32, actual_reps: Option<u32>) -> SetLog {
        SetLog {
            item_id: item_id.to_string(),
            exercise_id: None,
            set_number,
            queue_index: 0,
            is_timed: false,
            target: 10,
            actual_reps,
            weight: String::new(),
            notes: String::new(),
            completed_by: CompletedBy::SetComplete,
        }
    }

    #[test]
    fn groups_logs_in_plan_order_and_keeps_empty_items() {
        let items = vec![
            WorkoutItem::new("a", "Push-up"),
            WorkoutItem::new("b", "Row"),
            WorkoutItem::new("c", "Plank"),
        ];
        let logs = vec![
            sample_log("b", 1, Some(8)),
            sample_log("a", 1, None),
            sample_log("b", 2, Some(7)),
        ];

        let summary = build_summary("Upper", &items, &logs);

        let ids: Vec<&str> = summary.items.iter().map(|item| item.item_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(summary.items[0].sets.len(), 1);
        assert_eq!(summary.items[1].sets.len(), 2);
        assert!(summary.items[2].sets.is_empty());
        assert_eq!(summary.sets_logged, 3);
        assert_eq!(summary.sets_confirmed, 2);

        let rendered = render_summary(&summary);
        assert_eq!(rendered[0], "Upper complete");
        assert!(rendered.contains(&"  no sets logged".to_string()));
    }

    #[test]
    fn logs_for_removed_items_are_appended() {
        let items = vec![WorkoutItem::new("a", "Push-up")];
        let logs = vec![sample_log("gone", 1, Some(5))];

        let summary = build_summary("", &items, &logs);

        assert_eq!(summary.items.len(), 2);
        assert_eq!(summary.items[1].item_id, "gone");
        assert_eq!(summary.items[1].sets.len(), 1);
    }

    #[test]
    fn formats_target_fallback_and_details() {
        let mut log = sample_log("a", 2, None);
        assert_eq!(format_set_line(&log), "Set 2: target 10 reps · —");

        log.actual_reps = Some(9);
        log.weight = "24 kg".to_string();
        log.notes = "last rep slow".to_string();
        assert_eq!(format_set_line(&log), "Set 2: 9/10 reps · 24 kg · last rep slow");

        log.is_timed = true;
        log.target = 45;
        log.actual_reps = None;
        log.notes.clear();
        assert_eq!(format_set_line(&log), "Set 2: target 45s · 24 kg");
    }
}
