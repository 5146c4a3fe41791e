use crate::board::{BoardItem, ItemId, Point, Size};
use tracing::debug;

/// Inset of the connector dot from an item's bottom-right corner.
pub const CONNECTOR_INSET: f32 = 14.0;
/// Vertical drop of the Bézier control points below each anchor.
pub const CURVE_SAG: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemRect {
    pub id: ItemId,
    pub min: Point,
    pub size: Size,
}

impl ItemRect {
    pub fn of(item: &BoardItem) -> Self {
        Self {
            id: item.id,
            min: item.position,
            size: item.size,
        }
    }

    pub fn max(&self) -> Point {
        self.min.offset(self.size.width, self.size.height)
    }

    pub fn contains(&self, point: Point) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.x <= max.x && point.y >= self.min.y && point.y <= max.y
    }

    /// Where connectors attach: the bottom-right corner, inset.
    pub fn connector_anchor(&self) -> Point {
        self.max().offset(-CONNECTOR_INSET, -CONNECTOR_INSET)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorCurve {
    pub source_id: ItemId,
    pub target_id: ItemId,
    pub from: Point,
    pub control_from: Point,
    pub control_to: Point,
    pub to: Point,
}

impl ConnectorCurve {
    pub fn between(source: &ItemRect, target: &ItemRect) -> Self {
        let from = source.connector_anchor();
        let to = target.connector_anchor();
        Self {
            source_id: source.id,
            target_id: target.id,
            from,
            control_from: from.offset(0.0, CURVE_SAG),
            control_to: to.offset(0.0, CURVE_SAG),
            to,
        }
    }

    pub fn point_at(&self, t: f32) -> Point {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let w0 = u * u * u;
        let w1 = 3.0 * u * u * t;
        let w2 = 3.0 * u * t * t;
        let w3 = t * t * t;
        Point {
            x: w0 * self.from.x + w1 * self.control_from.x + w2 * self.control_to.x + w3 * self.to.x,
            y: w0 * self.from.y + w1 * self.control_from.y + w2 * self.control_to.y + w3 * self.to.y,
        }
    }

    /// Polyline approximation with `segments + 1` points, endpoints included.
    pub fn sample(&self, segments: usize) -> Vec<Point> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|step| self.point_at(step as f32 / segments as f32))
            .collect()
    }
}

/// Curves for every connection whose target still exists. Dangling
/// connections are skipped.
pub fn connector_geometry(items: &[BoardItem]) -> Vec<ConnectorCurve> {
    let mut curves = Vec::new();
    for item in items {
        let source = ItemRect::of(item);
        for connection in &item.connections {
            let Some(target) = items.iter().find(|candidate| candidate.id == connection.target_id)
            else {
                debug!(
                    source_id = %item.id,
                    target_id = %connection.target_id,
                    "skipping dangling connection"
                );
                continue;
            };
            curves.push(ConnectorCurve::between(&source, &ItemRect::of(target)));
        }
    }
    curves
}

/// Topmost item under `point`; later items in the collection draw on top.
pub fn hit_test(items: &[BoardItem], point: Point) -> Option<ItemId> {
    items
        .iter()
        .rev()
        .map(ItemRect::of)
        .find(|rect| rect.contains(point))
        .map(|rect| rect.id)
}
