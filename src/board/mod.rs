use std::fmt::{Display, Formatter};
use std::ops::Sub;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::registry::ChartKind;
use crate::research::VisualizationDraft;

pub const TEXT_NOTE_SIZE: Size = Size {
    width: 300.0,
    height: 180.0,
};
pub const CHART_SIZE: Size = Size {
    width: 600.0,
    height: 420.0,
};
pub const MIN_ITEM_WIDTH: f32 = 200.0;
pub const MIN_ITEM_HEIGHT: f32 = 120.0;
pub const DEFAULT_DRAFT_POSITION: Point = Point { x: 100.0, y: 100.0 };

pub type Record = Map<String, Value>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out strictly increasing ids, seeded from wall-clock milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub fn starting_at(first: u64) -> Self {
        Self {
            last: first.saturating_sub(1),
        }
    }

    pub fn next_id(&mut self) -> ItemId {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();
        self.next_after(now_ms)
    }

    fn next_after(&mut self, clock_ms: u64) -> ItemId {
        let candidate = clock_ms.max(self.last.saturating_add(1));
        self.last = candidate;
        ItemId(candidate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Clamps both coordinates to be non-negative. NaN becomes 0.
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.max(0.0),
            y: self.y.max(0.0),
        }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn default_for(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Text => TEXT_NOTE_SIZE,
            _ => CHART_SIZE,
        }
    }

    pub fn clamped(self) -> Self {
        Self {
            width: self.width.max(MIN_ITEM_WIDTH),
            height: self.height.max(MIN_ITEM_HEIGHT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemData {
    Records(Vec<Record>),
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Text {
        content: String,
    },
}

impl ItemData {
    pub fn record_count(&self) -> usize {
        match self {
            Self::Records(records) => records.len(),
            Self::Table { rows, .. } => rows.len(),
            Self::Text { .. } => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedInsight {
    pub text: String,
    pub question: String,
}

impl RelatedInsight {
    pub fn new(text: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            question: question.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub target_id: ItemId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardItem {
    pub id: ItemId,
    pub kind: ChartKind,
    pub title: String,
    pub position: Point,
    pub size: Size,
    pub data: ItemData,
    #[serde(default)]
    pub related_insights: Vec<RelatedInsight>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl BoardItem {
    /// Builds a chart item with the default declared size for its kind.
    pub fn chart(
        id: ItemId,
        kind: ChartKind,
        title: impl Into<String>,
        position: Point,
        data: ItemData,
        related_insights: Vec<RelatedInsight>,
    ) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            position: position.clamped(),
            size: Size::default_for(kind),
            data,
            related_insights,
            connections: Vec::new(),
            description: None,
            source: None,
            source_url: None,
        }
    }

    pub fn from_draft(id: ItemId, draft: VisualizationDraft, position: Option<Point>) -> Self {
        let kind = draft.kind;
        let related_insights = if kind == ChartKind::Text {
            Vec::new()
        } else {
            draft.related_insights
        };

        Self {
            id,
            kind,
            title: draft.title,
            position: position.unwrap_or(DEFAULT_DRAFT_POSITION).clamped(),
            size: Size::default_for(kind),
            data: draft.data,
            related_insights,
            connections: Vec::new(),
            description: draft.description,
            source: draft.source,
            source_url: draft.source_url,
        }
    }

    pub fn text_note(id: ItemId, sequence: u32, position: Point) -> Self {
        Self {
            id,
            kind: ChartKind::Text,
            title: format!("Note {sequence}"),
            position: position.clamped(),
            size: TEXT_NOTE_SIZE,
            data: ItemData::Text {
                content: format!("Text Box {sequence}"),
            },
            related_insights: Vec::new(),
            connections: Vec::new(),
            description: None,
            source: None,
            source_url: None,
        }
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.data {
            ItemData::Text { content } => Some(content),
            _ => None,
        }
    }

    pub fn has_connection_to(&self, target_id: ItemId) -> bool {
        self.connections
            .iter()
            .any(|connection| connection.target_id == target_id)
    }
}
