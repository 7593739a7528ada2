use crate::models::Exercise;

/// Read-only exercise library keyed by id.
pub trait ExerciseCatalog {
    fn exercise(&self, id: &str) -> Option<&Exercise>;
    fn exercises(&self) -> &[Exercise];
    fn group_label(&self, group_id: &str) -> Option<&str>;
    fn tag_label(&self, tag_id: &str) -> Option<&str>;

    /// Group label for display, falling back to the raw id.
    fn group_display<'a>(&'a self, group_id: &'a str) -> &'a str {
        self.group_label(group_id).unwrap_or(group_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    exercises: Vec<Exercise>,
    groups: Vec<(String, String)>,
    tags: Vec<(String, String)>,
}

impl MemoryCatalog {
    pub fn new(
        exercises: Vec<Exercise>,
        groups: Vec<(String, String)>,
        tags: Vec<(String, String)>,
    ) -> Self {
        Self {
            exercises,
            groups,
            tags,
        }
    }

    /// Small bundled library of strength movements and mobility drills.
    pub fn builtin() -> Self {
        let groups = [
            ("legs", "Legs"),
            ("push", "Push"),
            ("pull", "Pull"),
            ("core", "Core"),
            ("thoracic", "Upper / Mid Back (Thoracic)"),
            ("hips", "Hips (Flexors / Glutes)"),
        ];
        let tags = [
            ("strength", "Strength"),
            ("bodyweight", "Bodyweight"),
            ("mobility", "Mobility"),
            ("isometric", "Isometric"),
        ];
        let exercises = vec![
            exercise(
                "goblet-squat",
                "Goblet Squat",
                "legs",
                &["strength"],
                &["kettlebell"],
                &[
                    "Hold the bell at your chest, feet shoulder width.",
                    "Sit down between your heels keeping the chest tall.",
                    "Drive through mid-foot to stand.",
                ],
                &["Knees track toes", "Brace before each rep"],
            ),
            exercise(
                "push-up",
                "Push-up",
                "push",
                &["bodyweight", "strength"],
                &[],
                &[
                    "Hands under shoulders, body in one line.",
                    "Lower until the chest nearly touches the floor.",
                    "Press back up without sagging the hips.",
                ],
                &["Elbows about 45 degrees", "Squeeze glutes"],
            ),
            exercise(
                "one-arm-row",
                "One-arm Dumbbell Row",
                "pull",
                &["strength"],
                &["dumbbell", "bench"],
                &[
                    "Support one hand and knee on a bench.",
                    "Pull the dumbbell toward the hip.",
                    "Lower under control.",
                ],
                &["Keep the torso still", "Lead with the elbow"],
            ),
            exercise(
                "plank",
                "Front Plank",
                "core",
                &["bodyweight", "isometric"],
                &[],
                &[
                    "Forearms under shoulders, legs straight.",
                    "Hold a straight line from head to heels.",
                ],
                &["Ribs down", "Breathe slowly"],
            ),
            exercise(
                "cat-cow",
                "Cat-Cow",
                "thoracic",
                &["mobility"],
                &[],
                &[
                    "Start on hands and knees.",
                    "Round the spine toward the ceiling, then let it sag gently.",
                    "Move slowly with the breath.",
                ],
                &["Smooth range", "No pain"],
            ),
            exercise(
                "hip-flexor-stretch",
                "Half-kneeling Hip Flexor Stretch",
                "hips",
                &["mobility"],
                &["mat"],
                &[
                    "Kneel on one knee with the other foot forward.",
                    "Tuck the pelvis and shift forward until the front of the hip stretches.",
                ],
                &["Squeeze the back glute", "Do not arch the low back"],
            ),
        ];
        Self::new(exercises, labels(&groups), labels(&tags))
    }
}

impl ExerciseCatalog for MemoryCatalog {
    fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|exercise| exercise.id == id)
    }

    fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    fn group_label(&self, group_id: &str) -> Option<&str> {
        find_label(&self.groups, group_id)
    }

    fn tag_label(&self, tag_id: &str) -> Option<&str> {
        find_label(&self.tags, tag_id)
    }
}

fn find_label<'a>(labels: &'a [(String, String)], id: &str) -> Option<&'a str> {
    labels
        .iter()
        .find(|(key, _)| key == id)
        .map(|(_, label)| label.as_str())
}

fn labels(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(id, label)| (id.to_string(), label.to_string()))
        .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn exercise(
    id: &str,
    name: &str,
    group: &str,
    tags: &[&str],
    equipment: &[&str],
    steps: &[&str],
    cues: &[&str],
) -> Exercise {
    Exercise {
        id: id.to_string(),
        name: name.to_string(),
        group: group.to_string(),
        tags: strings(tags),
        equipment: strings(equipment),
        level: "beginner".to_string(),
        steps: strings(steps),
        cues: strings(cues),
    }
}
