use crate::config::Config;
use crate::palette;
use crate::stats_view::StatsView;
use crate::storage::JsonFileStore;
use chrono::Utc;
use eframe::egui;
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};
use tracing::info;
use tt_core::persist::{self, Autosave};
use tt_core::settings::{DEFAULT_MAX_NUMBER, DEFAULT_MIN_NUMBER};
use tt_core::{PracticeAttempt, PracticeSession, SessionPhase};

/// Factors offered by the bucket selectors.
pub const BUCKETS: RangeInclusive<u32> = DEFAULT_MIN_NUMBER..=DEFAULT_MAX_NUMBER;

const FEEDBACK_FADE: Duration = Duration::from_millis(300);
const PAD_BUTTON: [f32; 2] = [64.0, 44.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Practice,
    Stats,
}

#[derive(Debug)]
struct Feedback {
    is_correct: bool,
    message: String,
    shown_at: Instant,
}

impl Feedback {
    fn for_attempt(attempt: &PracticeAttempt) -> Self {
        let message = if attempt.is_correct {
            "Correct! Well done!".to_string()
        } else {
            format!("Incorrect. The answer is {}.", attempt.correct_answer)
        };
        Self {
            is_correct: attempt.is_correct,
            message,
            shown_at: Instant::now(),
        }
    }
}

pub struct PracticeApp {
    session: PracticeSession,
    autosave: Option<Autosave<JsonFileStore>>,
    tab: Tab,
    answer_input: String,
    feedback: Option<Feedback>,
    feedback_for: Duration,
    max_answer_digits: usize,
    stats: StatsView,
}

impl PracticeApp {
    pub fn new(config: Config, store: Option<JsonFileStore>) -> Self {
        let state = store
            .as_ref()
            .map(|s| persist::load_or_default(s))
            .unwrap_or_default();
        let session = PracticeSession::restore(state);
        let debounce = chrono::Duration::milliseconds(config.autosave_debounce_ms as i64);
        let autosave = store.map(|s| Autosave::new(s, debounce, session.revision()));

        Self {
            session,
            autosave,
            tab: Tab::Practice,
            answer_input: String::new(),
            feedback: None,
            feedback_for: Duration::from_millis(config.feedback_ms),
            max_answer_digits: config.max_answer_digits,
            stats: StatsView::default(),
        }
    }

    /// Input is locked while the result of the last answer is on screen.
    fn is_locked(&self) -> bool {
        self.feedback.is_some()
    }

    fn feedback_visible(&self) -> bool {
        self.feedback
            .as_ref()
            .is_some_and(|f| f.shown_at.elapsed() < self.feedback_for)
    }

    fn tick_feedback(&mut self) {
        let done = self
            .feedback
            .as_ref()
            .is_some_and(|f| f.shown_at.elapsed() >= self.feedback_for + FEEDBACK_FADE);
        if done {
            self.feedback = None;
        }
    }

    fn ensure_problem(&mut self) {
        if self.session.phase() == SessionPhase::Idle && !self.is_locked() {
            self.session.generate_problem();
            self.answer_input.clear();
        }
    }

    fn push_digit(&mut self, digit: char) {
        if !self.is_locked() && self.answer_input.len() < self.max_answer_digits {
            self.answer_input.push(digit);
        }
    }

    fn delete_digit(&mut self) {
        if !self.is_locked() {
            self.answer_input.pop();
        }
    }

    fn sanitize_input(&mut self) {
        self.answer_input.retain(|c| c.is_ascii_digit());
        self.answer_input.truncate(self.max_answer_digits);
    }

    fn submit_answer(&mut self) {
        if self.is_locked() || self.answer_input.is_empty() {
            return;
        }

        let answer: u64 = match self.answer_input.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                self.answer_input.clear();
                return;
            }
        };

        if let Some(attempt) = self.session.submit_answer(answer) {
            self.feedback = Some(Feedback::for_attempt(&attempt));
            self.answer_input.clear();
        }
    }

    fn clear_history(&mut self) {
        info!(attempts = self.session.attempts().len(), "clearing history");
        self.session.clear_history();
    }

    fn practice_ui(&mut self, ui: &mut egui::Ui) {
        let locked = self.is_locked();

        ui.label(egui::RichText::new("Include multiplication tables:").strong());
        ui.horizontal_wrapped(|ui| {
            let random = egui::SelectableLabel::new(self.session.settings().is_random(), "Random");
            if ui.add_enabled(!locked, random).clicked() {
                let patch = self.session.settings().clear_included();
                self.session.update_settings(patch);
            }
            for n in BUCKETS {
                let selected = self.session.settings().is_included(n);
                let option = egui::SelectableLabel::new(selected, format!("{n}'s"));
                if ui.add_enabled(!locked, option).clicked() {
                    let patch = self.session.settings().toggle_included(n);
                    self.session.update_settings(patch);
                }
            }
        });

        ui.add_space(8.0);
        ui.label(egui::RichText::new("Exclude multiplication tables:").strong());
        ui.horizontal_wrapped(|ui| {
            for n in BUCKETS {
                let selected = self.session.settings().is_excluded(n);
                let mut option = egui::Button::new(format!("{n}'s"));
                if selected {
                    option = option.fill(palette::ERROR);
                }
                if ui.add_enabled(!locked, option).clicked() {
                    let patch = self.session.settings().toggle_excluded(n);
                    self.session.update_settings(patch);
                }
            }
        });

        ui.add_space(16.0);

        if let (true, Some(feedback)) = (self.feedback_visible(), &self.feedback) {
            let color = if feedback.is_correct {
                palette::SUCCESS
            } else {
                palette::ERROR
            };
            egui::Frame::none()
                .fill(color.gamma_multiply(0.2))
                .stroke(egui::Stroke::new(1.0, color))
                .rounding(12.0)
                .inner_margin(12.0)
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.label(egui::RichText::new(&feedback.message).size(16.0));
                    });
                });
            ui.add_space(12.0);
        }

        ui.vertical_centered(|ui| {
            if let Some(current) = self.session.current_problem() {
                egui::Frame::none()
                    .fill(palette::CARD)
                    .stroke(egui::Stroke::new(1.0, palette::BORDER))
                    .rounding(16.0)
                    .inner_margin(20.0)
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(current.problem.display())
                                .size(42.0)
                                .strong(),
                        );
                    });
            }

            ui.add_space(16.0);

            let response = ui.add_enabled(
                !locked,
                egui::TextEdit::singleline(&mut self.answer_input)
                    .hint_text("0")
                    .font(egui::TextStyle::Heading)
                    .desired_width(150.0)
                    .horizontal_align(egui::Align::Center),
            );
            if response.changed() {
                self.sanitize_input();
            }
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                self.submit_answer();
            }
            if !locked {
                response.request_focus();
            }

            ui.add_space(12.0);
            self.number_pad(ui, locked);
        });
    }

    fn number_pad(&mut self, ui: &mut egui::Ui, locked: bool) {
        egui::Grid::new("number_pad")
            .spacing([8.0, 8.0])
            .show(ui, |ui| {
                for row in [['1', '2', '3'], ['4', '5', '6'], ['7', '8', '9']] {
                    for digit in row {
                        let button = egui::Button::new(digit.to_string()).min_size(PAD_BUTTON.into());
                        if ui.add_enabled(!locked, button).clicked() {
                            self.push_digit(digit);
                        }
                    }
                    ui.end_row();
                }

                let delete = egui::Button::new("⌫").min_size(PAD_BUTTON.into());
                if ui.add_enabled(!locked, delete).clicked() {
                    self.delete_digit();
                }
                let zero = egui::Button::new("0").min_size(PAD_BUTTON.into());
                if ui.add_enabled(!locked, zero).clicked() {
                    self.push_digit('0');
                }
                let can_submit = !locked && !self.answer_input.is_empty();
                let submit = egui::Button::new("✔")
                    .fill(palette::PRIMARY)
                    .min_size(PAD_BUTTON.into());
                if ui.add_enabled(can_submit, submit).clicked() {
                    self.submit_answer();
                }
                ui.end_row();
            });
    }

    fn autosave_tick(&mut self, ctx: &egui::Context) {
        let Some(autosave) = self.autosave.as_mut() else {
            return;
        };

        if ctx.input(|i| i.viewport().close_requested()) {
            autosave.flush(&self.session);
            return;
        }

        let now = Utc::now();
        autosave.poll(&self.session, now);
        if let Some(due) = autosave.due_in(now) {
            ctx.request_repaint_after(due.to_std().unwrap_or_default());
        }
    }
}

impl eframe::App for PracticeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.tick_feedback();
        self.ensure_problem();

        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.tab, Tab::Practice, "Practice");
                ui.selectable_value(&mut self.tab, Tab::Stats, "Stats");
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match self.tab {
                Tab::Practice => self.practice_ui(ui),
                Tab::Stats => {
                    if self.stats.show(ui, self.session.attempts()) {
                        self.clear_history();
                    }
                }
            });
        });

        if let Some(feedback) = &self.feedback {
            let remaining = (self.feedback_for + FEEDBACK_FADE).saturating_sub(feedback.shown_at.elapsed());
            ctx.request_repaint_after(remaining);
        }

        self.autosave_tick(ctx);
    }
}

impl Drop for PracticeApp {
    fn drop(&mut self) {
        if let Some(autosave) = self.autosave.as_mut() {
            autosave.flush(&self.session);
        }
    }
}
