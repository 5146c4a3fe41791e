use serde::Serialize;

use crate::board::RelatedInsight;

use super::VisualType;

const TITLE_PLACEHOLDER: &str = "{title}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpCategory {
    Trend,
    Comparison,
    Distribution,
    Correlation,
    Tabular,
    Informational,
}

impl FollowUpCategory {
    /// Category of the AI-facing type, before any canvas remapping.
    pub fn for_visual_type(visual_type: &VisualType) -> Self {
        match visual_type {
            VisualType::LineChart | VisualType::AreaChart => Self::Trend,
            VisualType::BarChart
            | VisualType::ComposedChart
            | VisualType::Comparison
            | VisualType::RadarChart => Self::Comparison,
            VisualType::PieChart
            | VisualType::DonutChart
            | VisualType::Treemap
            | VisualType::Heatmap => Self::Distribution,
            VisualType::ScatterPlot => Self::Correlation,
            VisualType::Table => Self::Tabular,
            VisualType::Text | VisualType::SourceInfo => Self::Informational,
            VisualType::Other(_) => Self::Trend,
        }
    }

    fn templates(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Trend => &[
                (
                    "Explore how {title} has changed over time",
                    "What factors are driving the trend shown in {title}?",
                ),
                (
                    "Project where {title} is heading next",
                    "How is {title} likely to evolve over the next few years?",
                ),
            ],
            Self::Comparison => &[
                (
                    "Compare the leading and lagging groups in {title}",
                    "What explains the differences highlighted in {title}?",
                ),
                (
                    "Break down the largest gap in {title}",
                    "Which segment in {title} is outperforming, and why?",
                ),
            ],
            Self::Distribution => &[
                (
                    "Examine how concentrated {title} is",
                    "What drives the distribution shown in {title}?",
                ),
                (
                    "Look at the smallest slices of {title}",
                    "Which underrepresented segments in {title} are worth watching?",
                ),
            ],
            Self::Correlation => &[
                (
                    "Test the relationship shown in {title}",
                    "Is the relationship in {title} causal or coincidental?",
                ),
                (
                    "Find the outliers in {title}",
                    "Which outliers in {title} break the overall pattern?",
                ),
            ],
            Self::Tabular => &[
                (
                    "Summarize the key rows of {title}",
                    "What are the most important takeaways from {title}?",
                ),
                (
                    "Chart the data behind {title}",
                    "Which visualization would best represent {title}?",
                ),
            ],
            Self::Informational => &[
                (
                    "Dig deeper into {title}",
                    "Can you expand on the details behind {title}?",
                ),
                (
                    "Check the sources behind {title}",
                    "How reliable are the sources cited in {title}?",
                ),
            ],
        }
    }

    pub fn follow_ups(self, title: &str) -> Vec<RelatedInsight> {
        self.templates()
            .iter()
            .map(|(text, question)| {
                RelatedInsight::new(
                    text.replace(TITLE_PLACEHOLDER, title),
                    question.replace(TITLE_PLACEHOLDER, title),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::FollowUpCategory;
    use crate::research::VisualType;

    #[test]
    fn category_follows_original_visual_type_not_canvas_kind() {
        assert_eq!(
            FollowUpCategory::for_visual_type(&VisualType::ScatterPlot),
            FollowUpCategory::Correlation
        );
        assert_eq!(
            FollowUpCategory::for_visual_type(&VisualType::RadarChart),
            FollowUpCategory::Comparison
        );
        assert_eq!(
            FollowUpCategory::for_visual_type(&VisualType::Heatmap),
            FollowUpCategory::Distribution
        );
        assert_eq!(
            FollowUpCategory::for_visual_type(&VisualType::SourceInfo),
            FollowUpCategory::Informational
        );
    }

    #[test]
    fn follow_ups_substitute_title_everywhere() {
        let follow_ups = FollowUpCategory::Distribution.follow_ups("Sector Mix");
        assert_eq!(follow_ups.len(), 2);
        for follow_up in follow_ups {
            assert!(follow_up.text.contains("Sector Mix"));
            assert!(follow_up.question.contains("Sector Mix"));
            assert!(!follow_up.question.contains("{title}"));
        }
    }
}
