use super::MoodLabel;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MoodDistribution {
    pub mood_label: MoodLabel,
    pub count: i64,
    pub percentage: f64,
}

crate::impl_entity!(MoodDistribution {
    mood_label: column("mood_label"),
    count: column("count"),
    percentage: column("percentage"),
});

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TagDistribution {
    pub tag: String,
    pub count: i64,
    pub percentage: f64,
}

crate::impl_entity!(TagDistribution {
    tag: column("tag"),
    count: column("count"),
    percentage: column("percentage"),
});

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: i64,
}

crate::impl_entity!(TagCount {
    tag: column("tag"),
    count: column("count"),
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub distribution: Vec<MoodDistribution>,
    pub tags: Vec<TagCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagReport {
    pub tag: String,
    pub distribution: Vec<MoodDistribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodReport {
    pub mood_label: MoodLabel,
    pub distribution: Vec<TagDistribution>,
}
