use eframe::egui;
use nqueens_puzzle::board::{is_threatened, Position, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use nqueens_puzzle::config::{Settings, Theme};
use nqueens_puzzle::cue::{Cue, CuePlayer, LogCuePlayer};
use nqueens_puzzle::export;
use nqueens_puzzle::game::{GameCommand, GameController, TICK_INTERVAL};
use nqueens_puzzle::record::{format_time, GameRecord};
use nqueens_puzzle::store::{MemoryStore, RecordStore};
use nqueens_puzzle::worker::{RecordJob, RecordReply, RecordWorker};
use nqueens_puzzle::BoardSize;

struct Particle {
    pos: egui::Pos2,
    vel: egui::Vec2,
    color: egui::Color32,
    life: f32, // 1.0 down to 0.0
    size: f32,
}

pub struct NQueensApp {
    game: GameController,
    worker: RecordWorker,
    cues: LogCuePlayer,
    settings: Settings,
    theme: Theme,

    input_size: String,
    showing_size_dialog: bool,
    showing_win_dialog: bool,
    showing_best_times: bool,

    best_time: Option<f64>,
    is_new_record: bool,
    records: Vec<GameRecord>,

    board_rect: egui::Rect,
    particles: Vec<Particle>,
}

#[cfg(not(target_arch = "wasm32"))]
fn open_worker(_storage: Option<&dyn eframe::Storage>) -> RecordWorker {
    use nqueens_puzzle::store::JsonFileStore;

    let store: Box<dyn RecordStore> = match nqueens_puzzle::config::records_path() {
        Some(path) => {
            let store = JsonFileStore::open(path);
            log::info!("best times are kept in {}", store.path().display());
            Box::new(store)
        }
        None => {
            log::warn!("no storage directory; best times will not be saved");
            Box::new(MemoryStore::new())
        }
    };
    RecordWorker::spawn(store).unwrap_or_else(|e| {
        log::error!("could not start record worker: {}", e);
        RecordWorker::inline(Box::new(MemoryStore::new()))
    })
}

#[cfg(target_arch = "wasm32")]
fn open_worker(storage: Option<&dyn eframe::Storage>) -> RecordWorker {
    let records: Vec<GameRecord> = storage
        .and_then(|s| eframe::get_value(s, nqueens_puzzle::config::RECORDS_KEY))
        .unwrap_or_default();
    log::info!("loaded {} records from browser storage", records.len());
    RecordWorker::inline(Box::new(MemoryStore::from_records(records)))
}

impl NQueensApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::load(cc.storage);
        let theme = Theme::named(&settings.theme);
        apply_visuals(&cc.egui_ctx, &theme);

        Self {
            game: GameController::default(),
            worker: open_worker(cc.storage),
            cues: LogCuePlayer::default(),
            input_size: settings.board_size().to_string(),
            settings,
            theme,
            showing_size_dialog: true,
            showing_win_dialog: false,
            showing_best_times: false,
            best_time: None,
            is_new_record: false,
            records: Vec::new(),
            board_rect: egui::Rect::NOTHING,
            particles: Vec::new(),
        }
    }

    fn start_game(&mut self, input: &str) {
        match self.game.start_from_input(input) {
            Ok(size) => {
                self.settings.last_size = size.get();
                self.showing_size_dialog = false;
                self.after_reset();
            }
            Err(e) => log::warn!("{}", e),
        }
    }

    fn new_game(&mut self) {
        self.game.reset();
        self.after_reset();
    }

    fn after_reset(&mut self) {
        self.showing_win_dialog = false;
        self.is_new_record = false;
        self.best_time = None;
        self.records.clear();
    }

    fn open_best_times(&mut self) {
        self.showing_best_times = true;
        if let Some(size) = self.game.size() {
            self.worker.submit(RecordJob::LoadResults { size: size.get() });
        }
    }

    fn run_commands(&mut self, ctx: &egui::Context) {
        for command in self.game.take_commands() {
            match command {
                GameCommand::PlayCue(cue) => {
                    self.cues.play(cue);
                    if cue == Cue::Victory {
                        self.showing_win_dialog = true;
                        self.is_new_record = false;
                        let center = if self.board_rect.is_positive() {
                            self.board_rect.center()
                        } else {
                            ctx.screen_rect().center()
                        };
                        self.spawn_particles(center, self.theme.accent_color);
                    }
                }
                GameCommand::RecordResult { size, time } => {
                    self.worker.submit(RecordJob::Complete {
                        size: size.get(),
                        time,
                    });
                }
                GameCommand::LoadBestTime { size } => {
                    self.worker.submit(RecordJob::LoadBest { size: size.get() });
                }
            }
        }
    }

    fn take_replies(&mut self) {
        let current = self.game.size().map(BoardSize::get);
        let won = self.game.is_won();
        for reply in self.worker.poll() {
            if !reply.applies_to(current, won) {
                continue;
            }
            match reply {
                RecordReply::Completed { is_new_record, .. } => self.is_new_record = is_new_record,
                RecordReply::BestTime { time, .. } => self.best_time = time,
                RecordReply::Results { records, .. } => self.records = records,
            }
        }
    }

    fn spawn_particles(&mut self, pos: egui::Pos2, color: egui::Color32) {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        for _ in 0..40 {
            let angle: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
            let speed: f32 = rng.gen_range(100.0..500.0);
            self.particles.push(Particle {
                pos,
                vel: egui::vec2(angle.cos() * speed, angle.sin() * speed - 200.0),
                color,
                life: 1.0,
                size: rng.gen_range(3.0..7.0),
            });
        }
    }

    fn panel_frame(&self) -> egui::Frame {
        egui::Frame::none()
            .fill(self.theme.panel_background)
            .inner_margin(12.0)
            .rounding(10.0)
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_black_alpha(20)))
    }

    fn top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui
                .button(egui::RichText::new("🏆").size(22.0))
                .on_hover_text("Best times")
                .clicked()
            {
                self.open_best_times();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .button(egui::RichText::new("⚙").size(22.0))
                    .on_hover_text("Board size")
                    .clicked()
                {
                    self.showing_size_dialog = true;
                }
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new("♛ N-Queens")
                            .size(26.0)
                            .strong()
                            .color(self.theme.text_color),
                    );
                });
            });
        });
    }

    fn info_panel(&self, ui: &mut egui::Ui) {
        let n = self.game.size().map_or(0, BoardSize::get);
        let placed = self.game.queens_count();
        self.panel_frame().show(ui, |ui| {
            ui.horizontal(|ui| {
                stat(ui, "Size", format!("{}×{}", n, n), self.theme.text_color);
                ui.separator();
                let color = if n > 0 && placed == n {
                    egui::Color32::from_rgb(34, 160, 70)
                } else {
                    self.theme.text_color
                };
                stat(ui, "Queens", format!("{}/{}", placed, n), color);
                if let Some(best) = self.best_time {
                    ui.separator();
                    stat(ui, "Best", format_time(best, 2, true), self.theme.accent_color);
                }
            });
        });
    }

    fn timer(&self, ui: &mut egui::Ui) {
        let color = if self.game.is_running() {
            self.theme.text_color
        } else {
            self.theme.text_color.linear_multiply(0.5)
        };
        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new(format_time(self.game.elapsed().as_secs_f64(), 1, true))
                    .size(44.0)
                    .strong()
                    .monospace()
                    .color(color),
            );
        });
    }

    fn board(&mut self, ui: &mut egui::Ui) {
        let Some(size) = self.game.size() else {
            return;
        };
        let n = size.get();
        let available = ui.available_size();
        let side = (available.x.min(available.y) - 40.0).max(120.0);
        let (response, painter) =
            ui.allocate_painter(egui::vec2(available.x, side + 20.0), egui::Sense::click());
        let board_rect =
            egui::Rect::from_center_size(response.rect.center(), egui::vec2(side, side));
        self.board_rect = board_rect;
        let cell_size = side / n as f32;

        painter.rect_filled(
            board_rect.expand(4.0),
            4.0,
            self.theme.text_color.linear_multiply(0.2),
        );

        let cell_rect = |row: usize, col: usize| {
            egui::Rect::from_min_size(
                board_rect.min + egui::vec2(col as f32 * cell_size, row as f32 * cell_size),
                egui::vec2(cell_size, cell_size),
            )
        };

        for cell in self.game.cells() {
            let rect = cell_rect(cell.row, cell.col);
            let color = if cell.is_light {
                self.theme.board_light
            } else {
                self.theme.board_dark
            };
            painter.rect_filled(rect, 0.0, color);

            if self.settings.show_threats
                && !cell.has_queen
                && is_threatened(cell.position(), self.game.queens())
            {
                painter.rect_filled(
                    rect.shrink(2.0),
                    2.0,
                    self.theme.conflict_color.linear_multiply(0.15),
                );
            }

            if cell.has_queen {
                if cell.is_conflict {
                    painter.rect_filled(
                        rect.shrink(1.0),
                        2.0,
                        self.theme.conflict_color.linear_multiply(0.45),
                    );
                }
                let queen_color = if cell.is_conflict {
                    self.theme.conflict_color
                } else {
                    self.theme.queen_color
                };
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "♛",
                    egui::FontId::proportional(cell_size * 0.7),
                    queen_color,
                );
            }
        }

        if self.game.allow_playing() && !self.showing_win_dialog {
            if let Some(pointer) = response.hover_pos().filter(|p| board_rect.contains(*p)) {
                let rel = pointer - board_rect.min;
                let pos = Position::new(
                    ((rel.y / cell_size) as usize).min(n - 1),
                    ((rel.x / cell_size) as usize).min(n - 1),
                );
                painter.rect_stroke(
                    cell_rect(pos.row, pos.col).shrink(1.0),
                    2.0,
                    egui::Stroke::new(2.0, self.theme.accent_color),
                );
                if response.clicked() {
                    self.game.place_or_remove(pos.row, pos.col);
                } else {
                    response.on_hover_text(pos.label());
                }
            }
        }
    }

    fn size_dialog(&mut self, ctx: &egui::Context) {
        let valid = BoardSize::parse(&self.input_size).is_ok();
        let mut start = false;
        let mut cancel = false;
        egui::Window::new("Choose Board Size")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!(
                    "Select board size from {} to {}",
                    MIN_BOARD_SIZE, MAX_BOARD_SIZE
                ));
                let resp = ui.add(
                    egui::TextEdit::singleline(&mut self.input_size)
                        .hint_text("Enter size")
                        .desired_width(80.0),
                );
                let enter = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if !valid {
                    ui.colored_label(self.theme.conflict_color, "⚠ Invalid input");
                }
                ui.horizontal(|ui| {
                    cancel = ui.button("Cancel").clicked();
                    start = ui.add_enabled(valid, egui::Button::new("Start Game")).clicked()
                        || (valid && enter);
                });
            });

        if start {
            let input = self.input_size.clone();
            self.start_game(&input);
        } else if cancel {
            self.showing_size_dialog = false;
            if !self.game.has_game() {
                self.input_size = BoardSize::default().to_string();
                self.start_game(&BoardSize::default().to_string());
            }
        }
    }

    fn win_dialog(&mut self, ctx: &egui::Context) {
        let n = self.game.size().map_or(0, BoardSize::get);
        let time = format_time(self.game.elapsed().as_secs_f64(), 0, true);
        let mut new_game = false;
        let mut view_records = false;
        let mut dismiss = false;
        egui::Window::new("Victory! 🎉")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!(
                    "Congratulations! You successfully placed all {} queens!",
                    n
                ));
                ui.label(format!("Time: {}", time));
                if self.is_new_record {
                    ui.label(
                        egui::RichText::new("🎉 New Personal Best!")
                            .strong()
                            .color(self.theme.accent_color),
                    );
                }
                ui.horizontal(|ui| {
                    new_game = ui.button("New Game").clicked();
                    view_records = ui.button("View Records").clicked();
                    dismiss = ui.button("Continue").clicked();
                });
            });

        if new_game {
            self.new_game();
        } else if view_records {
            self.showing_win_dialog = false;
            self.open_best_times();
        } else if dismiss {
            self.showing_win_dialog = false;
        }
    }

    fn best_times_window(&mut self, ctx: &egui::Context) {
        let n = self.game.size().map_or(0, BoardSize::get);
        let mut open = self.showing_best_times;
        let mut done = false;
        egui::Window::new(format!("Best Times - {}×{}", n, n))
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                if self.records.is_empty() {
                    ui.vertical_centered(|ui| {
                        ui.label(egui::RichText::new("⏱ No Results Yet").strong().size(18.0));
                        ui.label("Complete a game to see your best times here");
                    });
                } else {
                    egui::Grid::new("best_times_grid")
                        .striped(true)
                        .spacing([16.0, 6.0])
                        .show(ui, |ui| {
                            for (index, record) in self.records.iter().enumerate() {
                                let color = rank_color(index, self.theme.text_color);
                                let rank = if index < 3 {
                                    format!("#{} 🏅", index + 1)
                                } else {
                                    format!("#{}", index + 1)
                                };
                                ui.label(egui::RichText::new(rank).strong().color(color));
                                ui.label(egui::RichText::new(record.formatted_time()).strong());
                                ui.label(egui::RichText::new(record.formatted_date()).small());
                                ui.end_row();
                            }
                        });
                    ui.add_space(8.0);
                    if ui.button("Export to CSV").clicked() {
                        export_records(&self.records, n);
                    }
                }
                ui.add_space(8.0);
                done = ui.button("Done").clicked();
            });
        self.showing_best_times = open && !done;
    }

    fn settings_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.checkbox(&mut self.settings.show_threats, "Show threatened squares");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let before = self.theme.name;
                egui::ComboBox::from_id_salt("theme_picker")
                    .selected_text(self.theme.name)
                    .show_ui(ui, |ui| {
                        for preset in Theme::presets() {
                            let name = preset.name;
                            ui.selectable_value(&mut self.theme, preset, name);
                        }
                    });
                if before != self.theme.name {
                    self.settings.theme = self.theme.name.to_owned();
                    apply_visuals(ui.ctx(), &self.theme);
                }
            });
        });
    }
}

impl eframe::App for NQueensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.game.tick();
        self.run_commands(ctx);
        self.take_replies();

        let dt = ctx.input(|i| i.stable_dt);
        self.particles.retain_mut(|p| {
            p.pos += p.vel * dt;
            p.vel.y += 800.0 * dt; // Gravity
            p.life -= dt * 1.5;
            p.life > 0.0
        });
        if !self.particles.is_empty() {
            ctx.request_repaint();
        } else if self.game.is_running() {
            ctx.request_repaint_after(TICK_INTERVAL);
        }

        egui::TopBottomPanel::bottom("controls")
            .frame(self.panel_frame().inner_margin(egui::Margin::symmetric(16.0, 10.0)))
            .show(ctx, |ui| {
                self.settings_row(ui);
                ui.add_space(6.0);
                let enabled = self.game.has_game();
                if ui
                    .add_enabled(
                        enabled,
                        egui::Button::new("⟳ New Game").min_size(egui::vec2(ui.available_width(), 36.0)),
                    )
                    .clicked()
                {
                    self.new_game();
                }
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.background).inner_margin(12.0))
            .show(ctx, |ui| {
                self.top_bar(ui);
                ui.add_space(8.0);
                self.info_panel(ui);
                ui.add_space(4.0);
                self.timer(ui);
                self.board(ui);
            });

        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("particles"),
        ));
        for p in &self.particles {
            painter.circle_filled(p.pos, p.size, p.color.linear_multiply(p.life));
        }

        if self.showing_size_dialog {
            self.size_dialog(ctx);
        } else if self.showing_win_dialog {
            self.win_dialog(ctx);
        }
        if self.showing_best_times {
            self.best_times_window(ctx);
        }

        // Moves made this frame (clicks, dialogs) are dispatched right away.
        self.run_commands(ctx);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.settings.save(storage);
        if let Some(records) = self.worker.snapshot() {
            eframe::set_value(storage, nqueens_puzzle::config::RECORDS_KEY, &records);
        }
    }
}

fn apply_visuals(ctx: &egui::Context, theme: &Theme) {
    let mut visuals = if theme.is_dark() {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };
    visuals.window_fill = theme.panel_background;
    visuals.panel_fill = theme.background;
    visuals.selection.bg_fill = theme.accent_color;
    ctx.set_visuals(visuals);
}

fn stat(ui: &mut egui::Ui, caption: &str, value: String, color: egui::Color32) {
    ui.vertical(|ui| {
        ui.label(egui::RichText::new(caption).small().weak());
        ui.label(egui::RichText::new(value).size(20.0).strong().color(color));
    });
}

fn rank_color(index: usize, default: egui::Color32) -> egui::Color32 {
    match index {
        0 => egui::Color32::from_rgb(212, 175, 55),
        1 => egui::Color32::from_rgb(160, 160, 170),
        2 => egui::Color32::from_rgb(205, 127, 50),
        _ => default,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn export_records(records: &[GameRecord], size: usize) {
    let Some(path) = rfd::FileDialog::new()
        .add_filter("CSV", &["csv"])
        .set_file_name(export::file_name(size))
        .save_file()
    else {
        return;
    };
    let written = std::fs::File::create(&path)
        .map_err(csv::Error::from)
        .and_then(|file| export::write_csv(records, file));
    match written {
        Ok(()) => log::info!("exported {} records to {}", records.len(), path.display()),
        Err(e) => log::warn!("could not export best times: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn export_records(records: &[GameRecord], size: usize) {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::JsValue;

    let csv_content = match export::to_csv_string(records) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("could not export best times: {}", e);
            return;
        }
    };
    let download = || -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let parts = js_sys::Array::of1(&JsValue::from_str(&csv_content));
        let options = web_sys::BlobPropertyBag::new();
        options.set_type("text/csv");
        let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)?;
        let a = document
            .create_element("a")?
            .dyn_into::<web_sys::HtmlAnchorElement>()?;
        a.set_href(&url);
        a.set_download(&export::file_name(size));
        a.click();
        web_sys::Url::revoke_object_url(&url)
    };
    if let Err(e) = download() {
        log::warn!("could not export best times: {:?}", e);
    }
}
