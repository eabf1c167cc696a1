//! Backend worker: owns both page controllers and runs their requests on tokio.

use std::{sync::Arc, thread};

use client_core::{
    ClientSettings, CreationController, DataUrlFileReader, EditOutcome, HttpPostService,
    ListingController, LocalFileReader, PostService,
};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(settings: ClientSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let service = match HttpPostService::from_settings(&settings) {
            Ok(service) => service,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    err.to_string(),
                )));
                tracing::error!("invalid post service settings: {err}");
                return;
            }
        };
        tracing::info!(base_url = %service.base_url(), "backend worker ready");

        let mut worker = BackendWorker::new(Arc::new(service), Arc::new(DataUrlFileReader), ui_tx);
        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                worker.handle(cmd).await;
            }
            tracing::debug!("ui command queue closed; backend worker exiting");
        });
    });
}

/// Single writer for controller state; commands are handled strictly in order.
pub struct BackendWorker {
    listing: ListingController,
    creation: CreationController,
    ui_tx: Sender<UiEvent>,
}

impl BackendWorker {
    pub fn new(
        service: Arc<dyn PostService>,
        file_reader: Arc<dyn LocalFileReader>,
        ui_tx: Sender<UiEvent>,
    ) -> Self {
        Self {
            listing: ListingController::new(service.clone(), file_reader.clone()),
            creation: CreationController::new(service, file_reader),
            ui_tx,
        }
    }

    pub async fn handle(&mut self, cmd: BackendCommand) {
        match cmd {
            BackendCommand::RefreshPosts => match self.listing.refresh().await {
                Ok(()) => self.emit_listing(),
                Err(err) => self.report(UiErrorContext::LoadPosts, err),
            },
            BackendCommand::BeginEdit { post_id } => {
                match self.listing.post(&post_id).cloned() {
                    Some(post) => {
                        self.listing.begin_edit(&post);
                        self.emit_listing();
                    }
                    None => self.emit(UiEvent::Info(format!(
                        "Post {post_id} is no longer listed"
                    ))),
                }
            }
            BackendCommand::AttachEditImage { path } => {
                match self.listing.attach_edit_image(Some(&path)).await {
                    Ok(()) => self.emit_listing(),
                    Err(err) => self.report(UiErrorContext::SavePost, err),
                }
            }
            BackendCommand::SubmitEdit { working_copy } => {
                match self.listing.submit_edit(working_copy).await {
                    Ok(EditOutcome::NoSession) => self.emit_listing(),
                    Ok(EditOutcome::Saved) => {
                        self.emit_listing();
                        self.emit(UiEvent::Info("Post updated".to_string()));
                    }
                    Ok(EditOutcome::SavedWithStaleListing(err)) => {
                        self.emit_listing();
                        self.report(UiErrorContext::LoadPosts, err);
                    }
                    Err(err) => self.report(UiErrorContext::SavePost, err),
                }
            }
            BackendCommand::CancelEdit => {
                self.listing.cancel_edit();
                self.emit_listing();
            }
            BackendCommand::DeletePost { post_id } => {
                match self.listing.delete_post(&post_id).await {
                    Ok(()) => {
                        self.emit_listing();
                        self.emit(UiEvent::Info("Post deleted".to_string()));
                    }
                    Err(err) => self.report(UiErrorContext::DeletePost, err),
                }
            }
            BackendCommand::AttachImage { path } => {
                match self.creation.attach_image(Some(&path)).await {
                    Ok(()) => self.emit_draft(),
                    Err(err) => self.report(UiErrorContext::CreatePost, err),
                }
            }
            BackendCommand::SubmitDraft { draft } => match self.creation.submit(draft).await {
                Ok(_) => {
                    self.emit_draft();
                    self.emit(UiEvent::Info("Post uploaded".to_string()));
                    match self.listing.refresh().await {
                        Ok(()) => self.emit_listing(),
                        Err(err) => self.report(UiErrorContext::LoadPosts, err),
                    }
                }
                Err(err) => self.report(UiErrorContext::CreatePost, err),
            },
            BackendCommand::CancelDraft => {
                self.creation.cancel();
                self.emit_draft();
            }
        }
    }

    fn emit(&self, event: UiEvent) {
        if self.ui_tx.try_send(event).is_err() {
            tracing::warn!("dropping backend event; ui queue full or closed");
        }
    }

    fn emit_listing(&self) {
        self.emit(UiEvent::ListingUpdated {
            items: self.listing.items().to_vec(),
            editing: self.listing.editing().cloned(),
        });
    }

    fn emit_draft(&self) {
        self.emit(UiEvent::DraftUpdated {
            draft: self.creation.draft().clone(),
            attached_file: self.creation.attached_file().map(str::to_string),
        });
    }

    fn report(&self, context: UiErrorContext, err: client_core::ControllerError) {
        self.emit(UiEvent::Error(UiError::from_controller(context, &err)));
    }
}
