use std::{collections::HashSet, path::PathBuf};

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{
    domain::{Post, PostId},
    protocol::PostPayload,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::thumbnails::ThumbnailCache;

/// Advisory only; the picker still lets users choose any file.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Upload,
}

/// Text buffers behind a post form. The image is whatever the backend last
/// reported, since file reads happen on the worker.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct FormBuffers {
    title: String,
    description: String,
    image: Option<String>,
    attached_file: Option<String>,
}

impl FormBuffers {
    fn seeded(fields: &PostPayload, attached_file: Option<String>) -> Self {
        Self {
            title: fields.title.clone(),
            description: fields.description.clone(),
            image: fields.image.clone(),
            attached_file,
        }
    }

    fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.description.is_empty()
    }

    fn payload(&self) -> PostPayload {
        PostPayload::new(
            self.title.clone(),
            self.description.clone(),
            self.image.clone(),
        )
    }
}

enum FormAction {
    PickImage,
    Submit,
    Cancel,
}

enum CardAction {
    Edit(PostId),
    Delete(PostId),
}

pub struct PostboardApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    page: Page,
    status: String,
    last_error: Option<UiError>,
    items: Vec<Post>,
    editing: Option<PostId>,
    edit_form: FormBuffers,
    draft_form: FormBuffers,
    thumbnails: ThumbnailCache,
}

impl PostboardApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            page: Page::Home,
            status: "Loading posts...".to_string(),
            last_error: None,
            items: Vec::new(),
            editing: None,
            edit_form: FormBuffers::default(),
            draft_form: FormBuffers::default(),
            thumbnails: ThumbnailCache::default(),
        };
        app.dispatch(BackendCommand::RefreshPosts);
        app
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Info(message) => {
                self.status = message;
                self.last_error = None;
            }
            UiEvent::Error(err) => {
                self.status = err.status_line();
                self.last_error = Some(err);
            }
            UiEvent::ListingUpdated { items, editing } => {
                self.items = items;
                match editing {
                    Some(session) if self.editing.as_ref() == Some(&session.target) => {
                        // Same session: keep what the user typed, take the new image.
                        self.edit_form.image = session.working_copy.image;
                        self.edit_form.attached_file = session.attached_file;
                    }
                    Some(session) => {
                        self.edit_form =
                            FormBuffers::seeded(&session.working_copy, session.attached_file);
                        self.editing = Some(session.target);
                    }
                    None => {
                        self.editing = None;
                        self.edit_form = FormBuffers::default();
                    }
                }
                if self.last_error.is_none() && self.status == "Loading posts..." {
                    self.status = format!("{} posts", self.items.len());
                }
                let live: HashSet<String> = self
                    .items
                    .iter()
                    .map(|post| post_slot(&post.id))
                    .collect();
                self.thumbnails.retain_slots(|slot| {
                    slot == "draft" || slot == "edit" || live.contains(slot)
                });
            }
            UiEvent::DraftUpdated {
                draft,
                attached_file,
            } => {
                if draft.is_empty() {
                    self.draft_form = FormBuffers::default();
                } else {
                    self.draft_form.image = draft.image;
                    self.draft_form.attached_file = attached_file;
                }
            }
        }
    }

    fn show_nav(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("page_nav").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.page, Page::Home, "Home Page");
                ui.selectable_value(&mut self.page, Page::Upload, "Upload");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Refresh").clicked() {
                        self.dispatch(BackendCommand::RefreshPosts);
                    }
                });
            });
        });
    }

    fn show_status(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let text = egui::RichText::new(&self.status);
            if self.last_error.is_some() {
                ui.small(text.color(ui.visuals().error_fg_color));
            } else {
                ui.small(text.weak());
            }
        });
    }

    fn show_home(&mut self, ui: &mut egui::Ui) {
        ui.heading("Home Page");
        ui.add_space(8.0);

        if self.editing.is_some() {
            let action = post_form(ui, &mut self.edit_form, &mut self.thumbnails, "edit", "Save");
            match action {
                Some(FormAction::PickImage) => {
                    if let Some(path) = pick_image_file() {
                        self.dispatch(BackendCommand::AttachEditImage { path });
                    }
                }
                Some(FormAction::Submit) => {
                    let working_copy = self.edit_form.payload();
                    self.dispatch(BackendCommand::SubmitEdit { working_copy });
                }
                Some(FormAction::Cancel) => self.dispatch(BackendCommand::CancelEdit),
                None => {}
            }
            return;
        }

        if self.items.is_empty() {
            ui.weak("No posts yet.");
            return;
        }

        let ctx = ui.ctx().clone();
        let mut action = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for post in &self.items {
                ui.group(|ui| {
                    ui.set_width(ui.available_width());
                    if let Some(image) = &post.image {
                        if let Some(texture) =
                            self.thumbnails.get_or_load(&ctx, &post_slot(&post.id), image)
                        {
                            ui.add(egui::Image::new(texture));
                        }
                    }
                    ui.label(egui::RichText::new(&post.title).strong().size(16.0));
                    ui.label(&post.description);
                    ui.horizontal(|ui| {
                        if ui.button("Edit").clicked() {
                            action = Some(CardAction::Edit(post.id.clone()));
                        }
                        if ui.button("Delete").clicked() {
                            action = Some(CardAction::Delete(post.id.clone()));
                        }
                    });
                });
                ui.add_space(6.0);
            }
        });

        match action {
            Some(CardAction::Edit(post_id)) => self.dispatch(BackendCommand::BeginEdit { post_id }),
            Some(CardAction::Delete(post_id)) => {
                self.dispatch(BackendCommand::DeletePost { post_id })
            }
            None => {}
        }
    }

    fn show_upload(&mut self, ui: &mut egui::Ui) {
        ui.heading("Share your Posts!");
        ui.add_space(8.0);

        let action = post_form(ui, &mut self.draft_form, &mut self.thumbnails, "draft", "Submit");
        match action {
            Some(FormAction::PickImage) => {
                if let Some(path) = pick_image_file() {
                    self.dispatch(BackendCommand::AttachImage { path });
                }
            }
            Some(FormAction::Submit) => {
                let draft = self.draft_form.payload();
                self.dispatch(BackendCommand::SubmitDraft { draft });
            }
            Some(FormAction::Cancel) => {
                self.draft_form = FormBuffers::default();
                self.dispatch(BackendCommand::CancelDraft);
            }
            None => {}
        }
    }
}

fn post_slot(id: &PostId) -> String {
    format!("post:{id}")
}

fn pick_image_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()
}

fn post_form(
    ui: &mut egui::Ui,
    form: &mut FormBuffers,
    thumbnails: &mut ThumbnailCache,
    slot: &str,
    submit_label: &str,
) -> Option<FormAction> {
    let mut action = None;

    ui.label(egui::RichText::new("Title").strong());
    ui.add(egui::TextEdit::singleline(&mut form.title).desired_width(f32::INFINITY));
    ui.add_space(6.0);

    ui.label(egui::RichText::new("Description").strong());
    ui.add(
        egui::TextEdit::multiline(&mut form.description)
            .desired_rows(3)
            .desired_width(f32::INFINITY),
    );
    ui.add_space(6.0);

    if let Some(image) = &form.image {
        let ctx = ui.ctx().clone();
        if let Some(texture) = thumbnails.get_or_load(&ctx, slot, image) {
            ui.add(egui::Image::new(texture));
        }
    }
    ui.horizontal(|ui| {
        if ui.button("Choose image...").clicked() {
            action = Some(FormAction::PickImage);
        }
        match &form.attached_file {
            Some(name) => ui.small(name.as_str()),
            None => ui.small(egui::RichText::new("No file chosen").weak()),
        };
    });
    ui.add_space(10.0);

    ui.horizontal(|ui| {
        if ui
            .add_enabled(form.is_complete(), egui::Button::new(submit_label))
            .clicked()
        {
            action = Some(FormAction::Submit);
        }
        if ui.button("Cancel").clicked() {
            action = Some(FormAction::Cancel);
        }
    });

    action
}

impl eframe::App for PostboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_nav(ctx);
        self.show_status(ctx);
        egui::CentralPanel::default().show(ctx, |ui| match self.page {
            Page::Home => self.show_home(ui),
            Page::Upload => self.show_upload(ui),
        });

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
