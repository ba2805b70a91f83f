use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use eframe::egui;
use rayon::prelude::*;

/// Decoded slide images, uploaded to the GPU on first use.
pub struct ImageCache {
    base_path: PathBuf,
    decoded: HashMap<String, egui::ColorImage>,
    textures: HashMap<String, egui::TextureHandle>,
    pending: Option<Receiver<HashMap<String, egui::ColorImage>>>,
}

impl ImageCache {
    /// Decode every image in `paths` in parallel. Images that fail to load are
    /// logged and left out; their slides render without them.
    pub fn preload(base_path: &Path, paths: &[String]) -> Self {
        Self {
            base_path: base_path.to_path_buf(),
            decoded: decode_all(base_path, paths),
            textures: HashMap::new(),
            pending: None,
        }
    }

    #[cfg(test)]
    pub fn contains(&self, path: &str) -> bool {
        self.decoded.contains_key(path)
    }

    pub fn size(&self, path: &str) -> Option<[usize; 2]> {
        self.decoded.get(path).map(|image| image.size)
    }

    /// Texture for `path`, uploading it the first time it is drawn.
    pub fn texture(&mut self, ctx: &egui::Context, path: &str) -> Option<egui::TextureHandle> {
        if let Some(texture) = self.textures.get(path) {
            return Some(texture.clone());
        }
        let image = self.decoded.get(path)?.clone();
        let texture = ctx.load_texture(path, image, egui::TextureOptions::LINEAR);
        self.textures.insert(path.to_string(), texture.clone());
        Some(texture)
    }

    /// Decode a new set of images on the rayon pool. The current images stay
    /// in use until [`ImageCache::poll`] swaps the new set in.
    pub fn reload(&mut self, paths: &[String]) {
        let (tx, rx) = mpsc::channel();
        let base_path = self.base_path.clone();
        let paths = paths.to_vec();
        rayon::spawn(move || {
            let _ = tx.send(decode_all(&base_path, &paths));
        });
        self.pending = Some(rx);
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Swap in a finished background reload. Returns true when the set changed.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        match rx.try_recv() {
            Ok(decoded) => self.install(decoded),
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                tracing::warn!("image reload worker exited without a result");
            }
        }
        self.pending = None;
        true
    }

    fn install(&mut self, decoded: HashMap<String, egui::ColorImage>) {
        self.decoded = decoded;
        self.textures.clear();
    }
}

fn decode_all(base_path: &Path, paths: &[String]) -> HashMap<String, egui::ColorImage> {
    let decoded: HashMap<String, egui::ColorImage> = paths
        .par_iter()
        .filter_map(|path| match decode(&base_path.join(path)) {
            Ok(image) => Some((path.clone(), image)),
            Err(e) => {
                tracing::warn!("failed to preload image {path}: {e}");
                None
            }
        })
        .collect();
    tracing::debug!(loaded = decoded.len(), requested = paths.len(), "images decoded");
    decoded
}

fn decode(path: &Path) -> anyhow::Result<egui::ColorImage> {
    let image = image::open(path)?.into_rgba8();
    let (w, h) = image.dimensions();
    Ok(egui::ColorImage::from_rgba_unmultiplied(
        [w as usize, h as usize],
        image.as_raw(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("slidectl-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_preload_decodes_existing_images() {
        let dir = scratch_dir("preload");
        let pixels = vec![255u8; 4 * 3 * 2];
        image::save_buffer(dir.join("dot.png"), &pixels, 3, 2, image::ColorType::Rgba8).unwrap();

        let cache = ImageCache::preload(&dir, &["dot.png".to_string(), "missing.png".to_string()]);
        assert!(cache.contains("dot.png"));
        assert_eq!(cache.size("dot.png"), Some([3, 2]));
        assert!(!cache.contains("missing.png"), "missing images are skipped");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_preload_nothing() {
        let cache = ImageCache::preload(Path::new("."), &[]);
        assert!(!cache.contains("anything.png"));
        assert!(!cache.is_loading());
    }

    #[test]
    fn test_reload_decodes_off_thread_then_swaps() {
        let dir = scratch_dir("reload");
        let pixels = vec![255u8; 4 * 2 * 2];
        image::save_buffer(dir.join("a.png"), &pixels, 2, 2, image::ColorType::Rgba8).unwrap();
        image::save_buffer(dir.join("b.png"), &pixels, 2, 2, image::ColorType::Rgba8).unwrap();

        let mut cache = ImageCache::preload(&dir, &["a.png".to_string()]);
        cache.reload(&["b.png".to_string()]);
        assert!(cache.is_loading());
        assert!(cache.contains("a.png"), "old images stay until the swap");

        let rx = cache.pending.take().unwrap();
        let decoded = rx.recv_timeout(std::time::Duration::from_secs(10)).unwrap();
        cache.install(decoded);
        assert!(cache.contains("b.png"));
        assert!(!cache.contains("a.png"));
        assert!(!cache.poll(), "nothing left to swap in");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
