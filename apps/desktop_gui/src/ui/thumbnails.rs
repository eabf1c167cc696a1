//! Decodes `data:` URL images into egui textures for post cards and forms.

use std::{
    collections::{hash_map::DefaultHasher, HashMap},
    hash::{Hash, Hasher},
};

use client_core::file_reader::decode_data_url;
use eframe::egui;
use egui::TextureHandle;

pub const CARD_THUMBNAIL_MAX: u32 = 240;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

/// Decodes and downsizes an embedded image. `None` for anything that is not a
/// base64 `data:` URL of a supported raster format.
pub fn decode_thumbnail(data_url: &str, max_dimension: u32) -> Option<Thumbnail> {
    let (_, bytes) = decode_data_url(data_url)?;
    let decoded = image::load_from_memory(&bytes).ok()?;
    let decoded = if decoded.width() > max_dimension || decoded.height() > max_dimension {
        decoded.thumbnail(max_dimension, max_dimension)
    } else {
        decoded
    };
    let rgba = decoded.to_rgba8();
    Some(Thumbnail {
        width: rgba.width() as usize,
        height: rgba.height() as usize,
        rgba: rgba.into_raw(),
    })
}

struct CachedThumbnail {
    source_hash: u64,
    texture: Option<(TextureHandle, egui::Vec2)>,
}

/// Textures keyed by slot name (`post:<id>`, `draft`, `edit`), reloaded when
/// the slot's source image changes.
#[derive(Default)]
pub struct ThumbnailCache {
    entries: HashMap<String, CachedThumbnail>,
}

impl ThumbnailCache {
    pub fn get_or_load(
        &mut self,
        ctx: &egui::Context,
        slot: &str,
        data_url: &str,
    ) -> Option<(egui::TextureId, egui::Vec2)> {
        let source_hash = hash_source(data_url);
        let stale = self
            .entries
            .get(slot)
            .map_or(true, |cached| cached.source_hash != source_hash);
        if stale {
            let texture = decode_thumbnail(data_url, CARD_THUMBNAIL_MAX).map(|thumb| {
                let size = egui::vec2(thumb.width as f32, thumb.height as f32);
                let color_image =
                    egui::ColorImage::from_rgba_unmultiplied([thumb.width, thumb.height], &thumb.rgba);
                let handle = ctx.load_texture(
                    format!("thumbnail:{slot}"),
                    color_image,
                    egui::TextureOptions::LINEAR,
                );
                (handle, size)
            });
            if texture.is_none() {
                tracing::debug!(slot, "image could not be decoded for preview");
            }
            self.entries.insert(
                slot.to_string(),
                CachedThumbnail {
                    source_hash,
                    texture,
                },
            );
        }

        self.entries
            .get(slot)
            .and_then(|cached| cached.texture.as_ref())
            .map(|(handle, size)| (handle.id(), *size))
    }

    /// Drops slots not in `keep`, releasing their textures.
    pub fn retain_slots(&mut self, keep: impl Fn(&str) -> bool) {
        self.entries.retain(|slot, _| keep(slot));
    }
}

fn hash_source(data_url: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    data_url.hash(&mut hasher);
    hasher.finish()
}
