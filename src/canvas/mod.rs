use tracing::{debug, info, warn};

use crate::board::{BoardItem, Connection, IdGenerator, ItemData, ItemId, Point, Size};
use crate::dashboards::{DashboardSelection, items_for};
use crate::registry::ChartKind;
use crate::research::VisualizationDraft;

pub mod geometry;
pub mod interaction;

use self::geometry::{ConnectorCurve, connector_geometry, hit_test};
use self::interaction::{
    Interaction, InteractionHost, InteractionMode, LinkOutcome, LinkPreview, LoggingHost,
};

pub const TEXT_NOTE_POSITION: Point = Point { x: 400.0, y: 300.0 };
pub const VISUALIZATION_POSITION: Point = Point { x: 100.0, y: 100.0 };

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    AddTextNote,
    AddVisualization { draft: VisualizationDraft },
    DeleteItem { id: ItemId },
    UpdateTextContent { id: ItemId, content: String },
    ResizeItem { id: ItemId, size: Size },
    MoveToDashboard { selection: DashboardSelection },
}

/// Owns the board items of the active dashboard and every mutation on them.
pub struct CanvasController {
    selection: DashboardSelection,
    items: Vec<BoardItem>,
    note_counter: u32,
    ids: IdGenerator,
    interaction: Interaction,
    host: Box<dyn InteractionHost>,
}

impl CanvasController {
    pub fn new(selection: DashboardSelection) -> Self {
        Self::with_host(selection, Box::new(LoggingHost))
    }

    pub fn with_host(selection: DashboardSelection, host: Box<dyn InteractionHost>) -> Self {
        let items = items_for(selection);
        info!(
            folder_id = selection.folder_id,
            dashboard_id = selection.dashboard_id,
            item_count = items.len(),
            "canvas initialized"
        );
        Self {
            selection,
            items,
            note_counter: 1,
            ids: IdGenerator::default(),
            interaction: Interaction::Idle,
            host,
        }
    }

    /// Replaces the id source; used to make generated ids deterministic.
    pub fn with_id_generator(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    pub fn selection(&self) -> DashboardSelection {
        self.selection
    }

    pub fn items(&self) -> &[BoardItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&BoardItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn link_preview(&self) -> Option<LinkPreview> {
        match self.interaction {
            Interaction::Linking {
                source_id,
                anchor,
                pointer,
            } => Some(LinkPreview {
                source_id,
                from: anchor,
                to: pointer,
            }),
            _ => None,
        }
    }

    pub fn connectors(&self) -> Vec<ConnectorCurve> {
        connector_geometry(&self.items)
    }

    pub fn item_at(&self, point: Point) -> Option<ItemId> {
        hit_test(&self.items, point)
    }

    pub fn apply(&mut self, op: CanvasOp) {
        match op {
            CanvasOp::AddTextNote => {
                let id = self.fresh_id();
                let note = BoardItem::text_note(id, self.note_counter, TEXT_NOTE_POSITION);
                self.note_counter = self.note_counter.saturating_add(1);
                debug!(item_id = %id, title = %note.title, "added text note");
                self.items.push(note);
            }
            CanvasOp::AddVisualization { draft } => {
                let id = self.fresh_id();
                let item = BoardItem::from_draft(id, draft, Some(VISUALIZATION_POSITION));
                if item.kind == ChartKind::Unknown {
                    warn!(
                        item_id = %id,
                        title = %item.title,
                        "added visualization of unknown kind; it renders as a placeholder"
                    );
                }
                debug!(item_id = %id, kind = %item.kind, title = %item.title, "added visualization");
                self.items.push(item);
            }
            CanvasOp::DeleteItem { id } => {
                let before = self.items.len();
                self.items.retain(|item| item.id != id);
                if self.items.len() == before {
                    debug!(item_id = %id, "delete ignored; no such item");
                } else {
                    debug!(item_id = %id, "deleted item");
                }
            }
            CanvasOp::UpdateTextContent { id, content } => {
                match self.items.iter_mut().find(|item| item.id == id) {
                    Some(item) => item.data = ItemData::Text { content },
                    None => debug!(item_id = %id, "text update ignored; no such item"),
                }
            }
            CanvasOp::ResizeItem { id, size } => {
                match self.items.iter_mut().find(|item| item.id == id) {
                    Some(item) => item.size = size.clamped(),
                    None => debug!(item_id = %id, "resize ignored; no such item"),
                }
            }
            CanvasOp::MoveToDashboard { selection } => {
                self.release_interaction();
                self.selection = selection;
                self.items = items_for(selection);
                info!(
                    folder_id = selection.folder_id,
                    dashboard_id = selection.dashboard_id,
                    item_count = self.items.len(),
                    "switched dashboard"
                );
            }
        }
    }

    pub fn add_text_note(&mut self) {
        self.apply(CanvasOp::AddTextNote);
    }

    pub fn add_visualization(&mut self, draft: VisualizationDraft) {
        self.apply(CanvasOp::AddVisualization { draft });
    }

    pub fn delete_item(&mut self, id: ItemId) {
        self.apply(CanvasOp::DeleteItem { id });
    }

    pub fn update_text_content(&mut self, id: ItemId, content: impl Into<String>) {
        self.apply(CanvasOp::UpdateTextContent {
            id,
            content: content.into(),
        });
    }

    pub fn resize_item(&mut self, id: ItemId, size: Size) {
        self.apply(CanvasOp::ResizeItem { id, size });
    }

    pub fn move_to_dashboard(&mut self, selection: DashboardSelection) {
        self.apply(CanvasOp::MoveToDashboard { selection });
    }

    /// Returns `false` when another interaction is active or `id` is unknown.
    pub fn begin_drag(&mut self, id: ItemId, pointer_start: Point) -> bool {
        if !self.interaction.is_idle() {
            debug!(item_id = %id, "drag rejected; another interaction is active");
            return false;
        }
        let Some(item) = self.item(id) else {
            return false;
        };

        self.interaction = Interaction::Dragging {
            item_id: id,
            grab_offset: pointer_start - item.position,
        };
        self.host.acquire(InteractionMode::Drag);
        true
    }

    pub fn on_drag_move(&mut self, pointer: Point) {
        let Interaction::Dragging {
            item_id,
            grab_offset,
        } = self.interaction
        else {
            return;
        };
        if let Some(item) = self.items.iter_mut().find(|item| item.id == item_id) {
            item.position = (pointer - grab_offset).clamped();
        }
    }

    pub fn end_drag(&mut self) {
        if let Interaction::Dragging { item_id, .. } = self.interaction {
            if let Some(item) = self.item(item_id) {
                debug!(
                    item_id = %item_id,
                    x = item.position.x,
                    y = item.position.y,
                    "drag committed"
                );
            }
            self.release_interaction();
        }
    }

    /// Returns `false` when another interaction is active or `id` is unknown.
    pub fn begin_link(&mut self, id: ItemId, anchor: Point) -> bool {
        if !self.interaction.is_idle() {
            debug!(item_id = %id, "link rejected; another interaction is active");
            return false;
        }
        if self.item(id).is_none() {
            return false;
        }

        self.interaction = Interaction::Linking {
            source_id: id,
            anchor,
            pointer: anchor,
        };
        self.host.acquire(InteractionMode::Link);
        true
    }

    pub fn on_link_move(&mut self, pointer_current: Point) {
        if let Interaction::Linking { pointer, .. } = &mut self.interaction {
            *pointer = pointer_current;
        }
    }

    /// Completes the gesture. `hit_test` resolves the release point to the
    /// topmost item under it, if any.
    pub fn end_link<F>(&mut self, pointer: Point, hit_test: F) -> LinkOutcome
    where
        F: FnOnce(Point) -> Option<ItemId>,
    {
        let Interaction::Linking { source_id, .. } = self.interaction else {
            return LinkOutcome::Cancelled;
        };
        self.release_interaction();

        let Some(target_id) = hit_test(pointer).filter(|target| *target != source_id) else {
            debug!(source_id = %source_id, "link cancelled; no target");
            return LinkOutcome::Cancelled;
        };
        if self.item(target_id).is_none() {
            debug!(source_id = %source_id, target_id = %target_id, "link cancelled; target gone");
            return LinkOutcome::Cancelled;
        }
        let Some(source) = self.items.iter_mut().find(|item| item.id == source_id) else {
            return LinkOutcome::Cancelled;
        };

        if source.has_connection_to(target_id) {
            return LinkOutcome::AlreadyConnected {
                source_id,
                target_id,
            };
        }
        source.connections.push(Connection { target_id });
        info!(source_id = %source_id, target_id = %target_id, "connected items");
        LinkOutcome::Connected {
            source_id,
            target_id,
        }
    }

    fn release_interaction(&mut self) {
        if let Some(mode) = self.interaction.mode() {
            self.host.release(mode);
        }
        self.interaction = Interaction::Idle;
    }

    fn fresh_id(&mut self) -> ItemId {
        loop {
            let id = self.ids.next_id();
            if self.item(id).is_none() {
                return id;
            }
        }
    }
}

impl Drop for CanvasController {
    fn drop(&mut self) {
        self.release_interaction();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing::Level;

    use super::geometry::ItemRect;
    use super::interaction::{Interaction, InteractionHost, InteractionMode, LinkOutcome};
    use super::{CanvasController, CanvasOp, TEXT_NOTE_POSITION};
    use crate::board::{Connection, IdGenerator, ItemData, ItemId, Point, Size};
    use crate::dashboards::DashboardSelection;
    use crate::registry::{ChartKind, resolve};
    use crate::research::normalize_response;
    use crate::test_support::CapturedLogs;

    const EMPTY: DashboardSelection = DashboardSelection {
        folder_id: 9,
        dashboard_id: 99,
    };
    const TRENDS: DashboardSelection = DashboardSelection {
        folder_id: 1,
        dashboard_id: 1,
    };
    const REGIONAL: DashboardSelection = DashboardSelection {
        folder_id: 3,
        dashboard_id: 5,
    };

    #[derive(Clone, Default)]
    struct RecordingHost {
        events: Arc<Mutex<Vec<(&'static str, InteractionMode)>>>,
    }

    impl InteractionHost for RecordingHost {
        fn acquire(&mut self, mode: InteractionMode) {
            self.events.lock().expect("lock").push(("acquire", mode));
        }

        fn release(&mut self, mode: InteractionMode) {
            self.events.lock().expect("lock").push(("release", mode));
        }
    }

    #[test]
    fn unknown_selection_starts_empty_and_notes_count_up() {
        let mut canvas = controller(EMPTY);
        assert!(canvas.items().is_empty());

        canvas.add_text_note();
        canvas.add_text_note();
        let titles = canvas
            .items()
            .iter()
            .map(|item| item.title.as_str())
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["Note 1", "Note 2"]);
        assert_eq!(canvas.items()[0].position, TEXT_NOTE_POSITION);
        assert_ne!(canvas.items()[0].id, canvas.items()[1].id);
    }

    #[test]
    fn linking_twice_adds_one_connection() {
        let mut canvas = controller(EMPTY);
        let (a, b) = two_notes_apart(&mut canvas);

        for _ in 0..2 {
            assert!(canvas.begin_link(a, anchor_of(&canvas, a)));
            canvas.on_link_move(Point::new(800.0, 400.0));
            canvas.end_link(Point::new(800.0, 400.0), |_| Some(b));
        }

        let source = canvas.item(a).expect("source should exist");
        assert_eq!(source.connections, vec![Connection { target_id: b }]);
        assert!(canvas.item(b).expect("target").connections.is_empty());
    }

    #[test]
    fn second_identical_link_reports_already_connected() {
        let mut canvas = controller(EMPTY);
        let (a, b) = two_notes_apart(&mut canvas);

        canvas.begin_link(a, anchor_of(&canvas, a));
        let first = canvas.end_link(Point::default(), |_| Some(b));
        canvas.begin_link(a, anchor_of(&canvas, a));
        let second = canvas.end_link(Point::default(), |_| Some(b));

        assert_eq!(first, LinkOutcome::Connected { source_id: a, target_id: b });
        assert_eq!(
            second,
            LinkOutcome::AlreadyConnected { source_id: a, target_id: b }
        );
    }

    #[test]
    fn releasing_on_source_or_empty_space_cancels() {
        let mut canvas = controller(EMPTY);
        let (a, _) = two_notes_apart(&mut canvas);

        canvas.begin_link(a, anchor_of(&canvas, a));
        assert_eq!(
            canvas.end_link(Point::new(10.0, 10.0), |_| Some(a)),
            LinkOutcome::Cancelled
        );
        canvas.begin_link(a, anchor_of(&canvas, a));
        assert_eq!(
            canvas.end_link(Point::new(5_000.0, 5_000.0), |_| None),
            LinkOutcome::Cancelled
        );
        canvas.begin_link(a, anchor_of(&canvas, a));
        assert_eq!(
            canvas.end_link(Point::default(), |_| Some(ItemId(424_242))),
            LinkOutcome::Cancelled
        );

        assert!(canvas.item(a).expect("source").connections.is_empty());
        assert!(canvas.interaction().is_idle());
        assert!(canvas.link_preview().is_none());
    }

    #[test]
    fn link_preview_tracks_pointer_while_linking() {
        let mut canvas = controller(EMPTY);
        let (a, _) = two_notes_apart(&mut canvas);
        let anchor = anchor_of(&canvas, a);

        canvas.begin_link(a, anchor);
        canvas.on_link_move(Point::new(700.0, 20.0));
        let preview = canvas.link_preview().expect("preview while linking");
        assert_eq!(preview.from, anchor);
        assert_eq!(preview.to, Point::new(700.0, 20.0));
    }

    #[test]
    fn drag_keeps_grab_offset_and_clamps_to_origin() {
        let mut canvas = controller(EMPTY);
        canvas.add_text_note();
        let id = canvas.items()[0].id;

        assert!(canvas.begin_drag(id, Point::new(410.0, 305.0)));
        canvas.on_drag_move(Point::new(510.0, 355.0));
        assert_eq!(canvas.item(id).expect("item").position, Point::new(500.0, 350.0));

        let trajectory = [
            Point::new(-300.0, 200.0),
            Point::new(5.0, -40.0),
            Point::new(-1.0e6, -1.0e6),
        ];
        for pointer in trajectory {
            canvas.on_drag_move(pointer);
            let position = canvas.item(id).expect("item").position;
            assert!(position.x >= 0.0 && position.y >= 0.0, "{position:?}");
        }
        canvas.on_drag_move(Point::new(20.0, 15.0));
        canvas.end_drag();

        assert_eq!(canvas.item(id).expect("item").position, Point::new(10.0, 10.0));
        assert!(canvas.interaction().is_idle());
        canvas.on_drag_move(Point::new(900.0, 900.0));
        assert_eq!(canvas.item(id).expect("item").position, Point::new(10.0, 10.0));
    }

    #[test]
    fn drag_and_link_are_mutually_exclusive() {
        let mut canvas = controller(EMPTY);
        let (a, b) = two_notes_apart(&mut canvas);

        assert!(canvas.begin_drag(a, Point::new(1.0, 1.0)));
        assert!(!canvas.begin_link(b, anchor_of(&canvas, b)));
        assert!(!canvas.begin_drag(b, Point::new(1.0, 1.0)));
        canvas.end_drag();

        assert!(canvas.begin_link(b, anchor_of(&canvas, b)));
        assert!(!canvas.begin_drag(a, Point::new(1.0, 1.0)));
        assert!(matches!(canvas.interaction(), Interaction::Linking { .. }));
    }

    #[test]
    fn host_scope_is_released_for_every_acquire() {
        let host = RecordingHost::default();
        let events = host.events.clone();
        let mut canvas = CanvasController::with_host(EMPTY, Box::new(host))
            .with_id_generator(IdGenerator::starting_at(1));
        let (a, b) = two_notes_apart(&mut canvas);

        canvas.begin_drag(a, Point::default());
        canvas.end_drag();
        canvas.begin_link(a, Point::default());
        canvas.end_link(Point::default(), |_| Some(b));
        canvas.begin_drag(b, Point::default());
        canvas.move_to_dashboard(TRENDS);
        assert!(canvas.interaction().is_idle());

        let recorded = events.lock().expect("lock").clone();
        assert_eq!(
            recorded,
            vec![
                ("acquire", InteractionMode::Drag),
                ("release", InteractionMode::Drag),
                ("acquire", InteractionMode::Drag),
                ("release", InteractionMode::Drag),
                ("acquire", InteractionMode::Link),
                ("release", InteractionMode::Link),
                ("acquire", InteractionMode::Drag),
                ("release", InteractionMode::Drag),
            ]
        );
    }

    #[test]
    fn deleting_target_leaves_dangling_edge_that_draws_nothing() {
        let mut canvas = controller(EMPTY);
        let (a, b) = two_notes_apart(&mut canvas);
        canvas.begin_link(a, anchor_of(&canvas, a));
        canvas.end_link(Point::default(), |_| Some(b));
        assert_eq!(canvas.connectors().len(), 1);

        canvas.delete_item(b);

        let source = canvas.item(a).expect("source survives");
        assert_eq!(source.connections, vec![Connection { target_id: b }]);
        assert!(canvas.connectors().is_empty());
    }

    #[test]
    fn mutations_on_missing_ids_are_no_ops() {
        let mut canvas = controller(TRENDS);
        let before = canvas.items().to_vec();

        canvas.delete_item(ItemId(777));
        canvas.update_text_content(ItemId(777), "nope");
        canvas.apply(CanvasOp::ResizeItem {
            id: ItemId(777),
            size: Size {
                width: 10.0,
                height: 10.0,
            },
        });
        assert!(!canvas.begin_drag(ItemId(777), Point::default()));
        assert!(!canvas.begin_link(ItemId(777), Point::default()));

        assert_eq!(canvas.items(), before.as_slice());
    }

    #[test]
    fn text_content_and_resize_update_in_place() {
        let mut canvas = controller(EMPTY);
        canvas.add_text_note();
        let id = canvas.items()[0].id;

        canvas.update_text_content(id, "Follow up with LPs");
        canvas.resize_item(
            id,
            Size {
                width: 50.0,
                height: 400.0,
            },
        );

        let item = canvas.item(id).expect("note");
        assert_eq!(item.text_content(), Some("Follow up with LPs"));
        assert_eq!(item.size.width, 200.0);
        assert_eq!(item.size.height, 400.0);
    }

    #[test]
    fn switching_dashboards_discards_notes_edits_and_links() {
        let mut canvas = controller(TRENDS);
        let pristine = canvas.items().to_vec();
        assert_eq!(pristine.len(), 5);

        canvas.add_text_note();
        let (first, second) = (pristine[0].id, pristine[1].id);
        canvas.begin_link(first, anchor_of(&canvas, first));
        canvas.end_link(Point::default(), |_| Some(second));
        canvas.begin_drag(second, Point::default());
        canvas.on_drag_move(Point::new(1_500.0, 1_500.0));
        canvas.end_drag();

        canvas.move_to_dashboard(REGIONAL);
        assert_eq!(canvas.selection(), REGIONAL);
        assert_eq!(canvas.items().len(), 5);
        canvas.move_to_dashboard(TRENDS);

        assert_eq!(canvas.items(), pristine.as_slice());
    }

    #[test]
    fn normalized_drafts_land_at_default_position() {
        let mut canvas = controller(EMPTY);
        canvas.add_text_note();
        let note = canvas.items()[0].id;
        assert!(canvas.begin_drag(note, Point::new(400.0, 300.0)));

        let normalized = normalize_response(
            r#"{"insights": [], "visualizations": [{"visualType": "treemap", "title": "Mix", "data": [{"sector": "AI", "value": 2.5}]}]}"#,
        )
        .expect("response should normalize");
        for draft in normalized.drafts {
            canvas.add_visualization(draft);
        }

        canvas.on_drag_move(Point::new(420.0, 330.0));
        canvas.end_drag();

        let added = &canvas.items()[1];
        assert_eq!(added.kind, ChartKind::TopSectors);
        assert_eq!(added.position, Point::new(100.0, 100.0));
        assert!(matches!(added.data, ItemData::Records(ref records) if records.len() == 1));
        assert_eq!(canvas.items()[0].position, Point::new(420.0, 330.0));
    }

    #[test]
    fn unknown_kind_warns_once_when_added() {
        let mut canvas = controller(EMPTY);
        let mut draft = normalize_response(
            r#"{"insights": [], "visualizations": [{"visualType": "table", "title": "Mystery", "data": []}]}"#,
        )
        .expect("response should normalize")
        .drafts
        .remove(0);
        draft.kind = ChartKind::Unknown;

        let logs = CapturedLogs::default();
        logs.capture(Level::WARN, || {
            canvas.add_visualization(draft);
            for item in canvas.items() {
                assert!(resolve(item.kind).is_placeholder());
                assert!(resolve(item.kind).is_placeholder());
            }
        });

        let output = logs.contents();
        assert_eq!(output.matches("unknown kind").count(), 1, "got: {output}");
        assert!(output.contains("Mystery"));
    }

    fn controller(selection: DashboardSelection) -> CanvasController {
        CanvasController::new(selection).with_id_generator(IdGenerator::starting_at(1_000))
    }

    fn two_notes_apart(canvas: &mut CanvasController) -> (ItemId, ItemId) {
        canvas.add_text_note();
        canvas.add_text_note();
        let count = canvas.items().len();
        let a = canvas.items()[count - 2].id;
        let b = canvas.items()[count - 1].id;
        canvas.begin_drag(b, TEXT_NOTE_POSITION);
        canvas.on_drag_move(Point::new(900.0, 300.0));
        canvas.end_drag();
        (a, b)
    }

    fn anchor_of(canvas: &CanvasController, id: ItemId) -> Point {
        ItemRect::of(canvas.item(id).expect("item should exist")).connector_anchor()
    }
}
