use eframe::egui::{
    self, Align, Color32, CursorIcon, FontId, Layout, Pos2, Rect, Rounding, Sense, Stroke, Vec2,
};

use crate::board::{BoardConfig, BoardManager};
use crate::geometry::Anchor;
use crate::interaction::HitTarget;
use crate::storage::Storage;
use crate::theme;

/// Side length of a resize handle, in points.
const HANDLE_SIZE: f32 = 10.0;
const BOX_ROUNDING: f32 = 4.0;

/// The board window: a theme toggle in the top bar and a full-window canvas
/// of draggable, resizable text boxes.
pub struct BoardApp {
    manager: BoardManager,
    storage: Storage,
}

#[derive(Clone, Copy)]
struct PointerFrame {
    press_origin: Option<Pos2>,
    latest: Option<Pos2>,
    pressed: bool,
    released: bool,
}

impl BoardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: &BoardConfig, storage: Storage) -> Self {
        theme::init(&cc.egui_ctx, &storage);
        let manager = BoardManager::new(config, &storage);
        Self { manager, storage }
    }

    fn top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Pinboard");
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    let icon = theme::toggle_icon(ctx);
                    if ui
                        .button(icon)
                        .on_hover_text("Toggle light/dark theme")
                        .clicked()
                    {
                        theme::toggle(ctx, &mut self.storage);
                    }
                });
            });
        });
    }

    fn board_ui(&mut self, ui: &mut egui::Ui) {
        let canvas = ui.available_rect_before_wrap();
        let pointer = ui.input(|i| PointerFrame {
            press_origin: i.pointer.press_origin(),
            latest: i.pointer.latest_pos(),
            pressed: i.pointer.any_pressed(),
            released: i.pointer.any_released(),
        });

        // Registered before the boxes so any box press wins over it; a press
        // that lands here is outside every box and clears the selection.
        let background = ui.interact(canvas, ui.id().with("board"), Sense::click_and_drag());
        if background.is_pointer_button_down_on() && pointer.pressed {
            self.manager.deselect_all();
        }

        for index in 0..self.manager.len() {
            self.box_ui(ui, index, canvas, pointer);
        }
    }

    fn box_ui(&mut self, ui: &mut egui::Ui, index: usize, canvas: Rect, pointer: PointerFrame) {
        let Some(controller) = self.manager.get(index) else {
            return;
        };
        let rect = controller.geometry.to_canvas(canvas);
        let selected = controller.selected;
        let active = controller.state.is_active();
        let spec = controller.spec().clone();

        let id = ui.id().with(("box", spec.key()));
        let body = ui
            .interact(rect, id, Sense::click_and_drag())
            .on_hover_cursor(CursorIcon::Move);

        let mut target = body.is_pointer_button_down_on().then_some(HitTarget::Body);

        // Handles are registered after the body, so a press on one never
        // doubles as a body drag.
        if selected {
            for anchor in Anchor::ALL {
                let handle_rect =
                    Rect::from_center_size(anchor.handle_pos(rect), Vec2::splat(HANDLE_SIZE));
                let handle = ui
                    .interact(handle_rect, id.with(anchor.as_str()), Sense::drag())
                    .on_hover_cursor(anchor_cursor(anchor));
                if handle.is_pointer_button_down_on() {
                    target = Some(HitTarget::Handle(anchor));
                }
            }
        }

        if let (Some(target), Some(press)) = (target, pointer.press_origin) {
            if !active {
                self.manager.select_only(index);
                if let Some(controller) = self.manager.get_mut(index) {
                    controller.pointer_down(press, target);
                }
            }
        }

        if let Some(controller) = self.manager.get_mut(index) {
            if controller.state.is_active() {
                if let Some(pos) = pointer.latest {
                    controller.pointer_moved(pos, canvas);
                }
                if pointer.released && controller.pointer_up() {
                    self.manager.save_box_state(index, &mut self.storage);
                }
            }
        }

        if spec.is_link() && body.clicked() {
            let release = body.interact_pointer_pos().or(pointer.latest);
            let suppressed = match (release, self.manager.get(index)) {
                (Some(pos), Some(controller)) => controller.suppresses_click(pos),
                _ => false,
            };
            if !suppressed {
                if let Some(href) = &spec.href {
                    tracing::info!("opening {href}");
                    if let Err(err) = open::that(href) {
                        tracing::warn!("failed to open {href}: {err}");
                    }
                }
            }
        }

        self.paint_box(ui, index, canvas);
    }

    fn paint_box(&self, ui: &egui::Ui, index: usize, canvas: Rect) {
        let Some(controller) = self.manager.get(index) else {
            return;
        };
        let rect = controller.geometry.to_canvas(canvas);
        let spec = controller.spec();
        let visuals = ui.visuals();
        let painter = ui.painter();

        painter.rect_filled(
            rect,
            Rounding::same(BOX_ROUNDING),
            box_fill(&spec.tags, visuals.dark_mode),
        );
        let stroke = if controller.state.is_active() {
            Stroke::new(2.0, visuals.selection.stroke.color)
        } else if controller.selected {
            visuals.selection.stroke
        } else {
            visuals.widgets.noninteractive.bg_stroke
        };
        painter.rect_stroke(rect, Rounding::same(BOX_ROUNDING), stroke);

        let text_color = if spec.is_link() {
            visuals.hyperlink_color
        } else {
            visuals.text_color()
        };
        let padding = 6.0;
        let wrap_width = (rect.width() - 2.0 * padding).max(0.0);
        let galley = painter.layout(
            spec.text.clone(),
            FontId::proportional(14.0),
            text_color,
            wrap_width,
        );
        painter
            .with_clip_rect(rect.shrink(padding / 2.0))
            .galley(rect.min + Vec2::splat(padding), galley, text_color);

        if controller.selected {
            for anchor in Anchor::ALL {
                let handle_rect =
                    Rect::from_center_size(anchor.handle_pos(rect), Vec2::splat(HANDLE_SIZE));
                painter.rect_filled(handle_rect, Rounding::same(2.0), visuals.selection.bg_fill);
                painter.rect_stroke(handle_rect, Rounding::same(2.0), visuals.selection.stroke);
            }
        }
    }
}

impl eframe::App for BoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.top_bar(ctx);
        egui::CentralPanel::default().show(ctx, |ui| self.board_ui(ui));
    }
}

fn anchor_cursor(anchor: Anchor) -> CursorIcon {
    match anchor {
        Anchor::Nw => CursorIcon::ResizeNorthWest,
        Anchor::N => CursorIcon::ResizeNorth,
        Anchor::Ne => CursorIcon::ResizeNorthEast,
        Anchor::E => CursorIcon::ResizeEast,
        Anchor::Se => CursorIcon::ResizeSouthEast,
        Anchor::S => CursorIcon::ResizeSouth,
        Anchor::Sw => CursorIcon::ResizeSouthWest,
        Anchor::W => CursorIcon::ResizeWest,
    }
}

fn box_fill(tags: &[String], dark: bool) -> Color32 {
    match tags.first().map(String::as_str) {
        Some("accent") => {
            if dark {
                Color32::from_rgb(44, 74, 110)
            } else {
                Color32::from_rgb(189, 215, 246)
            }
        }
        Some("link") => {
            if dark {
                Color32::from_rgb(38, 66, 58)
            } else {
                Color32::from_rgb(198, 233, 215)
            }
        }
        _ => {
            if dark {
                Color32::from_rgb(50, 50, 56)
            } else {
                Color32::from_rgb(244, 240, 222)
            }
        }
    }
}
