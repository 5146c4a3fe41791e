use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Vec2};

use crate::board::{BoardItem, ItemData, ItemId, Point};
use crate::canvas::CanvasController;
use crate::canvas::geometry::{ConnectorCurve, ItemRect};
use crate::registry::{ChartPrimitive, RenderStrategy, resolve};

use super::charts::{chart_data, show_chart};

const HEADER_HEIGHT: f32 = 28.0;
const DELETE_BUTTON_SIZE: f32 = 18.0;
const HANDLE_RADIUS: f32 = 6.0;
const HANDLE_HIT_RADIUS: f32 = 10.0;
const BODY_PADDING: f32 = 10.0;
const CURVE_SEGMENTS: usize = 32;
const BOARD_MARGIN: f32 = 200.0;
const MAX_TABLE_ROWS: usize = 12;

const CONNECTOR_COLOR: Color32 = Color32::from_rgb(90, 110, 160);
const PREVIEW_COLOR: Color32 = Color32::from_rgb(0, 136, 254);

/// What a board-space point lands on, topmost item first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoardHit {
    DeleteButton(ItemId),
    ConnectorHandle { id: ItemId, anchor: Point },
    Header(ItemId),
    Body(ItemId),
}

pub fn classify_point(items: &[BoardItem], point: Point) -> Option<BoardHit> {
    let item = items
        .iter()
        .rev()
        .find(|item| ItemRect::of(item).contains(point))?;
    let rect = ItemRect::of(item);
    let max = rect.max();

    let anchor = rect.connector_anchor();
    let (dx, dy) = (point.x - anchor.x, point.y - anchor.y);
    if dx * dx + dy * dy <= HANDLE_HIT_RADIUS * HANDLE_HIT_RADIUS {
        return Some(BoardHit::ConnectorHandle {
            id: item.id,
            anchor,
        });
    }

    if point.y <= rect.min.y + HEADER_HEIGHT {
        let delete_min_x = max.x - DELETE_BUTTON_SIZE - 6.0;
        if point.x >= delete_min_x {
            return Some(BoardHit::DeleteButton(item.id));
        }
        return Some(BoardHit::Header(item.id));
    }

    Some(BoardHit::Body(item.id))
}

fn to_screen(origin: Pos2, point: Point) -> Pos2 {
    Pos2::new(origin.x + point.x, origin.y + point.y)
}

fn to_board(origin: Pos2, pos: Pos2) -> Point {
    Point::new(pos.x - origin.x, pos.y - origin.y)
}

fn screen_rect(origin: Pos2, item: &BoardItem) -> Rect {
    Rect::from_min_size(
        to_screen(origin, item.position),
        Vec2::new(item.size.width, item.size.height),
    )
}

fn board_extent(items: &[BoardItem], available: Vec2) -> Vec2 {
    items.iter().fold(available, |extent, item| {
        let max = ItemRect::of(item).max();
        Vec2::new(
            extent.x.max(max.x + BOARD_MARGIN),
            extent.y.max(max.y + BOARD_MARGIN),
        )
    })
}

/// Paints the board and routes pointer gestures into `canvas`.
pub fn render_board(
    ui: &mut egui::Ui,
    canvas: &mut CanvasController,
    selected: &mut Option<ItemId>,
) {
    let extent = board_extent(canvas.items(), ui.available_size());
    let (response, painter) = ui.allocate_painter(extent, Sense::click_and_drag());
    let origin = response.rect.min;

    painter.rect_filled(response.rect, 0.0, Color32::from_rgb(246, 247, 250));

    for curve in canvas.connectors() {
        paint_curve(&painter, origin, &curve);
    }

    let mut text_changes = Vec::new();
    for item in canvas.items() {
        let rect = screen_rect(origin, item);
        let strategy = resolve(item.kind);
        paint_item(&painter, rect, item, &strategy, *selected == Some(item.id));

        let body = body_rect(rect);
        match (&item.data, strategy.primitive) {
            (_, ChartPrimitive::Placeholder) => paint_message(&painter, body, strategy.label),
            (ItemData::Text { content }, ChartPrimitive::TextNote) => {
                let mut edited = content.clone();
                let edit = ui.put(
                    body,
                    egui::TextEdit::multiline(&mut edited)
                        .frame(false)
                        .desired_width(body.width()),
                );
                if edit.changed() {
                    text_changes.push((item.id, edited));
                }
            }
            (_, ChartPrimitive::TextNote) => {}
            (ItemData::Table { headers, rows }, _) => paint_table(&painter, body, headers, rows),
            (data, primitive) => match chart_data(&strategy, data) {
                Some(chart) => show_chart(ui, body, item.id, primitive, &chart),
                None => paint_message(&painter, body, "No plottable data"),
            },
        }
    }

    if let Some(preview) = canvas.link_preview() {
        painter.line_segment(
            [to_screen(origin, preview.from), to_screen(origin, preview.to)],
            Stroke::new(2.0, PREVIEW_COLOR),
        );
    }

    for (id, content) in text_changes {
        canvas.update_text_content(id, content);
    }

    route_pointer(ui, &response, origin, canvas, selected);
}

fn route_pointer(
    ui: &egui::Ui,
    response: &egui::Response,
    origin: Pos2,
    canvas: &mut CanvasController,
    selected: &mut Option<ItemId>,
) {
    if response.clicked()
        && let Some(pos) = response.interact_pointer_pos()
    {
        match classify_point(canvas.items(), to_board(origin, pos)) {
            Some(BoardHit::DeleteButton(id)) => {
                canvas.delete_item(id);
                if *selected == Some(id) {
                    *selected = None;
                }
            }
            Some(
                BoardHit::Header(id) | BoardHit::Body(id) | BoardHit::ConnectorHandle { id, .. },
            ) => *selected = Some(id),
            None => *selected = None,
        }
    }

    if response.drag_started()
        && let Some(start) = ui.input(|input| input.pointer.press_origin())
    {
        let point = to_board(origin, start);
        match classify_point(canvas.items(), point) {
            Some(BoardHit::ConnectorHandle { id, anchor }) => {
                canvas.begin_link(id, anchor);
            }
            Some(BoardHit::Header(id) | BoardHit::Body(id)) => {
                canvas.begin_drag(id, point);
                *selected = Some(id);
            }
            Some(BoardHit::DeleteButton(_)) | None => {}
        }
    }

    let Some(pos) = response.interact_pointer_pos() else {
        return;
    };
    let pointer = to_board(origin, pos);

    if response.dragged() {
        canvas.on_drag_move(pointer);
        canvas.on_link_move(pointer);
    }

    if response.drag_stopped() {
        canvas.end_drag();
        let target = canvas.item_at(pointer);
        canvas.end_link(pointer, |_| target);
    }
}

fn paint_curve(painter: &egui::Painter, origin: Pos2, curve: &ConnectorCurve) {
    let points = curve
        .sample(CURVE_SEGMENTS)
        .into_iter()
        .map(|point| to_screen(origin, point))
        .collect::<Vec<_>>();
    painter.add(Shape::line(points, Stroke::new(2.0, CONNECTOR_COLOR)));
    painter.circle_filled(to_screen(origin, curve.to), 4.0, CONNECTOR_COLOR);
}

/// Content area below the header, clear of the connector handle.
fn body_rect(rect: Rect) -> Rect {
    Rect::from_min_max(
        rect.min + Vec2::new(BODY_PADDING, HEADER_HEIGHT + BODY_PADDING),
        rect.max - Vec2::new(BODY_PADDING, BODY_PADDING + 2.0 * HANDLE_HIT_RADIUS),
    )
}

fn paint_item(
    painter: &egui::Painter,
    rect: Rect,
    item: &BoardItem,
    strategy: &RenderStrategy,
    selected: bool,
) {
    let border = if selected {
        PREVIEW_COLOR
    } else {
        Color32::from_rgb(214, 218, 226)
    };

    painter.rect_filled(rect.expand(if selected { 2.0 } else { 1.0 }), 6.0, border);
    painter.rect_filled(rect, 6.0, Color32::WHITE);

    let header = Rect::from_min_size(rect.min, Vec2::new(rect.width(), HEADER_HEIGHT));
    painter.rect_filled(header, 6.0, Color32::from_rgb(236, 239, 245));
    painter.text(
        header.left_center() + Vec2::new(BODY_PADDING, 0.0),
        Align2::LEFT_CENTER,
        &item.title,
        FontId::proportional(13.0),
        Color32::from_rgb(33, 37, 41),
    );
    painter.text(
        Pos2::new(header.right() - 6.0 - DELETE_BUTTON_SIZE / 2.0, header.center().y),
        Align2::CENTER_CENTER,
        "×",
        FontId::proportional(16.0),
        Color32::from_rgb(140, 40, 40),
    );

    if !strategy.is_placeholder() && !strategy.shape.accepts(&item.data) {
        painter.text(
            Pos2::new(rect.left() + BODY_PADDING, rect.bottom() - BODY_PADDING / 2.0),
            Align2::LEFT_BOTTOM,
            "data does not match chart type",
            FontId::proportional(10.0),
            Color32::from_rgb(200, 110, 0),
        );
    }

    let anchor = ItemRect::of(item).connector_anchor();
    let anchor = Pos2::new(
        rect.min.x + (anchor.x - item.position.x),
        rect.min.y + (anchor.y - item.position.y),
    );
    painter.circle_filled(anchor, HANDLE_RADIUS, CONNECTOR_COLOR);
}

fn paint_message(painter: &egui::Painter, body: Rect, message: &str) {
    painter.text(
        body.center(),
        Align2::CENTER_CENTER,
        message,
        FontId::proportional(13.0),
        Color32::GRAY,
    );
}

fn paint_table(painter: &egui::Painter, body: Rect, headers: &[String], rows: &[Vec<String>]) {
    let row_height = 18.0;
    let lines = std::iter::once(headers.join(" | ")).chain(
        rows.iter()
            .take(MAX_TABLE_ROWS)
            .map(|row| row.join(" | ")),
    );
    for (index, line) in lines.enumerate() {
        let y = body.top() + index as f32 * row_height;
        if y + row_height > body.bottom() {
            break;
        }
        painter.text(
            Pos2::new(body.left(), y),
            Align2::LEFT_TOP,
            line,
            FontId::monospace(11.0),
            if index == 0 {
                Color32::from_rgb(33, 37, 41)
            } else {
                Color32::from_rgb(73, 80, 87)
            },
        );
    }
}
