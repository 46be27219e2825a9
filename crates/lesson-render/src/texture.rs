//! Texture wrapper
//!
//! Owns at most one GPU texture and exposes a load / query / render /
//! release contract. The wrapper is generic over the handle type so the
//! lifetime rules can be exercised without a GPU:
//!
//! - a handle is held if and only if [`Texture::is_loaded`] is true
//! - width and height are zero unless a handle is held
//! - loading always releases the previous handle first
//! - dropping the wrapper releases the handle

use crate::error::RenderError;
use crate::sprite::Rect;
use image::RgbaImage;
use std::path::Path;
use tracing::{debug, error, warn};

/// Something that can turn decoded pixels into a texture handle
pub trait TextureFactory {
    type Handle;

    fn create_texture(&self, image: &RgbaImage, label: &str) -> Result<Self::Handle, RenderError>;
}

/// Something textures can be drawn into
pub trait DrawTarget<H> {
    fn draw(&mut self, handle: &H, dst: Rect);
}

/// A loaded-or-empty texture
#[derive(Debug)]
pub struct Texture<H> {
    handle: Option<H>,
    width: u32,
    height: u32,
}

impl<H> Texture<H> {
    /// An empty wrapper
    pub fn new() -> Self {
        Self {
            handle: None,
            width: 0,
            height: 0,
        }
    }

    /// Decode the image at `path` and upload it through `factory`
    ///
    /// Any previously held texture is released before decoding starts.
    /// On failure the wrapper is left empty.
    pub fn load_from_file<F>(&mut self, path: impl AsRef<Path>, factory: &F) -> Result<(), RenderError>
    where
        F: TextureFactory<Handle = H>,
    {
        let path = path.as_ref();
        self.destroy();

        let decoded = image::open(path).map_err(|e| {
            let err = RenderError::decode(path, e);
            error!("{}", err);
            err
        })?;
        let pixels = decoded.to_rgba8();
        drop(decoded);

        let label = path.display().to_string();
        let handle = factory.create_texture(&pixels, &label).map_err(|err| {
            error!("{}", err);
            err
        })?;

        self.width = pixels.width();
        self.height = pixels.height();
        self.handle = Some(handle);

        debug!("Loaded {} ({}x{})", label, self.width, self.height);
        Ok(())
    }

    /// Release the held texture, if any
    pub fn destroy(&mut self) {
        if self.handle.take().is_some() {
            debug!("Released {}x{} texture", self.width, self.height);
        }
        self.width = 0;
        self.height = 0;
    }

    /// Queue a draw at `(x, y)` using the texture's native size
    ///
    /// Returns false, without drawing, when nothing is loaded.
    pub fn render<T>(&self, target: &mut T, x: f32, y: f32) -> bool
    where
        T: DrawTarget<H> + ?Sized,
    {
        match &self.handle {
            Some(handle) => {
                let dst = Rect::new(x, y, self.width as f32, self.height as f32);
                target.draw(handle, dst);
                true
            }
            None => {
                warn!("Render called on an unloaded texture");
                false
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }
}

impl<H> Default for Texture<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Tracks how many handles are alive and the most that ever were
    #[derive(Default)]
    struct Ledger {
        live: Cell<usize>,
        peak: Cell<usize>,
        created: Cell<usize>,
    }

    struct FakeHandle {
        id: usize,
        ledger: Rc<Ledger>,
    }

    impl Drop for FakeHandle {
        fn drop(&mut self) {
            self.ledger.live.set(self.ledger.live.get() - 1);
        }
    }

    #[derive(Default)]
    struct FakeFactory {
        ledger: Rc<Ledger>,
        fail: bool,
    }

    impl TextureFactory for FakeFactory {
        type Handle = FakeHandle;

        fn create_texture(&self, _image: &RgbaImage, _label: &str) -> Result<FakeHandle, RenderError> {
            if self.fail {
                return Err(RenderError::Upload("out of memory".into()));
            }
            let ledger = &self.ledger;
            ledger.live.set(ledger.live.get() + 1);
            ledger.peak.set(ledger.peak.get().max(ledger.live.get()));
            ledger.created.set(ledger.created.get() + 1);
            Ok(FakeHandle {
                id: ledger.created.get(),
                ledger: ledger.clone(),
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        draws: Vec<(usize, Rect)>,
    }

    impl DrawTarget<FakeHandle> for Recorder {
        fn draw(&mut self, handle: &FakeHandle, dst: Rect) {
            self.draws.push((handle.id, dst));
        }
    }

    fn write_png(dir: &tempfile::TempDir, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.path().join(name);
        RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_new_texture_is_empty() {
        let texture: Texture<FakeHandle> = Texture::new();
        assert!(!texture.is_loaded());
        assert_eq!((texture.width(), texture.height()), (0, 0));
    }

    #[test]
    fn test_load_valid_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "loaded.png", 64, 48);
        let factory = FakeFactory::default();

        let mut texture = Texture::new();
        texture.load_from_file(&path, &factory).unwrap();

        assert!(texture.is_loaded());
        assert_eq!(texture.width(), 64);
        assert_eq!(texture.height(), 48);
        assert_eq!(factory.ledger.live.get(), 1);
    }

    #[test]
    fn test_load_missing_file_leaves_texture_empty() {
        let dir = tempfile::tempdir().unwrap();
        let factory = FakeFactory::default();

        let mut texture = Texture::new();
        let result = texture.load_from_file(dir.path().join("missing.png"), &factory);

        assert!(matches!(result, Err(RenderError::ImageDecode { .. })));
        assert!(!texture.is_loaded());
        assert_eq!((texture.width(), texture.height()), (0, 0));
        assert_eq!(factory.ledger.created.get(), 0);
    }

    #[test]
    fn test_failed_reload_releases_previous_texture() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "a.png", 8, 8);
        let factory = FakeFactory::default();

        let mut texture = Texture::new();
        texture.load_from_file(&path, &factory).unwrap();
        assert!(texture.load_from_file(dir.path().join("nope.png"), &factory).is_err());

        assert!(!texture.is_loaded());
        assert_eq!(factory.ledger.live.get(), 0);
    }

    #[test]
    fn test_upload_failure_leaves_texture_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "a.png", 8, 8);
        let factory = FakeFactory {
            fail: true,
            ..Default::default()
        };

        let mut texture = Texture::new();
        let result = texture.load_from_file(&path, &factory);

        assert!(matches!(result, Err(RenderError::Upload(_))));
        assert!(!texture.is_loaded());
        assert_eq!((texture.width(), texture.height()), (0, 0));
    }

    #[test]
    fn test_reload_releases_first_handle_before_second() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_png(&dir, "first.png", 16, 16);
        let second = write_png(&dir, "second.png", 32, 8);
        let factory = FakeFactory::default();

        let mut texture = Texture::new();
        texture.load_from_file(&first, &factory).unwrap();
        texture.load_from_file(&second, &factory).unwrap();

        assert_eq!(factory.ledger.created.get(), 2);
        assert_eq!(factory.ledger.peak.get(), 1);
        assert_eq!(factory.ledger.live.get(), 1);
        assert_eq!((texture.width(), texture.height()), (32, 8));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "a.png", 4, 4);
        let factory = FakeFactory::default();

        let mut texture = Texture::new();
        texture.load_from_file(&path, &factory).unwrap();
        texture.destroy();
        texture.destroy();

        assert!(!texture.is_loaded());
        assert_eq!((texture.width(), texture.height()), (0, 0));
        assert_eq!(factory.ledger.live.get(), 0);
    }

    #[test]
    fn test_drop_releases_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "a.png", 4, 4);
        let factory = FakeFactory::default();

        {
            let mut texture = Texture::new();
            texture.load_from_file(&path, &factory).unwrap();
            assert_eq!(factory.ledger.live.get(), 1);
        }
        assert_eq!(factory.ledger.live.get(), 0);
    }

    #[test]
    fn test_render_uses_native_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "a.png", 20, 10);
        let factory = FakeFactory::default();
        let mut recorder = Recorder::default();

        let mut texture = Texture::new();
        texture.load_from_file(&path, &factory).unwrap();

        assert!(texture.render(&mut recorder, 5.0, 7.0));
        assert_eq!(recorder.draws.len(), 1);
        assert_eq!(recorder.draws[0].1, Rect::new(5.0, 7.0, 20.0, 10.0));
    }

    #[test]
    fn test_render_unloaded_is_noop() {
        let texture: Texture<FakeHandle> = Texture::new();
        let mut recorder = Recorder::default();

        assert!(!texture.render(&mut recorder, 0.0, 0.0));
        assert!(recorder.draws.is_empty());
    }
}
