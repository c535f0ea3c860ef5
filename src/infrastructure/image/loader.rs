//! Async image loading orchestrator.
//!
//! Three tiers: Memory -> Disk -> Network. Raw bytes are cached on disk once
//! per URL; each decoded variant (thumbnail or full) is cached in memory.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{RwLock, Semaphore, mpsc};
use tracing::{debug, error, warn};

use crate::domain::entities::{ImageId, ImageSource, ImageVariant, LoadedImage};
use crate::domain::ports::{CacheError, CacheResult, ImageCachePort};
use crate::infrastructure::config::ImagesConfig;

use super::disk_cache::DiskImageCache;
use super::memory_cache::{CacheStats, DEFAULT_MAX_BYTES, MemoryImageCache};

/// Longest edge of images decoded for the viewer.
pub const FULL_MAX_DIMENSION: u32 = 2048;

/// One image to load, in one variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRequest {
    /// Source URL.
    pub url: String,
    /// Decoded form wanted.
    pub variant: ImageVariant,
}

impl ImageRequest {
    #[must_use]
    pub fn thumbnail(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            variant: ImageVariant::Thumbnail,
        }
    }

    #[must_use]
    pub fn full(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            variant: ImageVariant::Full,
        }
    }

    /// Memory cache key of the decoded variant.
    #[must_use]
    pub fn id(&self) -> ImageId {
        ImageId::for_variant(&self.url, self.variant)
    }
}

/// Message sent when an image finishes loading.
#[derive(Debug, Clone)]
pub struct ImageLoadedEvent {
    /// Source URL.
    pub url: String,
    /// Variant that was decoded.
    pub variant: ImageVariant,
    /// Memory cache key.
    pub id: ImageId,
    /// The loaded image, or the failure reason.
    pub result: Result<LoadedImage, String>,
}

/// Configuration for the image loader.
#[derive(Debug, Clone)]
pub struct ImageLoaderConfig {
    /// Maximum images in memory cache.
    pub memory_cache_size: usize,
    /// Maximum decoded bytes in memory cache.
    pub memory_cache_bytes: u64,
    /// Maximum concurrent downloads.
    pub max_concurrent_downloads: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Thumbnail width in pixels.
    pub thumbnail_width: u32,
}

impl Default for ImageLoaderConfig {
    fn default() -> Self {
        Self::from(&ImagesConfig::default())
    }
}

impl From<&ImagesConfig> for ImageLoaderConfig {
    fn from(config: &ImagesConfig) -> Self {
        Self {
            memory_cache_size: config.memory_cache_size,
            memory_cache_bytes: DEFAULT_MAX_BYTES,
            max_concurrent_downloads: config.max_concurrent_downloads.max(1),
            timeout_secs: config.timeout_secs,
            thumbnail_width: config.thumbnail_width.max(1),
        }
    }
}

/// Orchestrates image loading from memory, disk, and network.
pub struct ImageLoader {
    memory_cache: Arc<MemoryImageCache>,
    fetcher: Fetcher,
    request_tx: mpsc::UnboundedSender<LoaderCommand>,
    config: ImageLoaderConfig,
}

#[derive(Debug)]
enum LoaderCommand {
    Load(ImageRequest),
    Cancel(ImageRequest),
    CancelAll,
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Downloads raw bytes through the disk cache.
#[derive(Clone)]
struct Fetcher {
    disk_cache: Arc<DiskImageCache>,
    http_client: reqwest::Client,
}

impl Fetcher {
    /// Returns cached bytes, or downloads and stores them.
    async fn bytes(&self, url: &str) -> CacheResult<(Bytes, ImageSource)> {
        let disk_id = ImageId::from_url(url);
        if let Some(cached) = self.disk_cache.read(&disk_id).await {
            return Ok((Bytes::from(cached), ImageSource::DiskCache));
        }

        debug!(url = %url, "Downloading image");
        let bytes = self.download(url).await?;

        let disk_cache = self.disk_cache.clone();
        let for_disk = bytes.clone();
        tokio::spawn(async move {
            if let Err(e) = disk_cache.write(&disk_id, &for_disk).await {
                warn!(id = %disk_id, error = %e, "Failed to cache image on disk");
            }
        });

        Ok((bytes, ImageSource::Network))
    }

    async fn download(&self, url: &str) -> CacheResult<Bytes> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| CacheError::NetworkError(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(CacheError::NetworkError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| CacheError::NetworkError(format!("Failed to read body: {e}")))
    }
}

/// State for the background worker loop.
struct WorkerState {
    memory_cache: Arc<MemoryImageCache>,
    fetcher: Fetcher,
    in_flight: Arc<RwLock<HashSet<ImageRequest>>>,
    event_tx: mpsc::UnboundedSender<ImageLoadedEvent>,
    semaphore: Arc<Semaphore>,
    request_rx: mpsc::UnboundedReceiver<LoaderCommand>,
    thumbnail_width: u32,
}

impl ImageLoader {
    /// Creates a loader and spawns its worker.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(
        config: ImageLoaderConfig,
        event_tx: &mpsc::UnboundedSender<ImageLoadedEvent>,
        disk_cache: Arc<DiskImageCache>,
    ) -> CacheResult<Self> {
        let memory_cache = Arc::new(MemoryImageCache::new(
            config.memory_cache_size,
            config.memory_cache_bytes,
        ));

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CacheError::NetworkError(format!("Failed to create HTTP client: {e}")))?;

        let fetcher = Fetcher {
            disk_cache,
            http_client,
        };

        let (request_tx, request_rx) = mpsc::unbounded_channel();

        let worker_state = WorkerState {
            memory_cache: memory_cache.clone(),
            fetcher: fetcher.clone(),
            in_flight: Arc::new(RwLock::new(HashSet::new())),
            event_tx: event_tx.clone(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_downloads)),
            request_rx,
            thumbnail_width: config.thumbnail_width,
        };

        tokio::spawn(Self::run_worker_loop(worker_state));

        Ok(Self {
            memory_cache,
            fetcher,
            request_tx,
            config,
        })
    }

    /// Creates a loader whose disk cache lives in the platform cache dir.
    ///
    /// # Errors
    /// Returns error if disk cache or HTTP client cannot be created.
    pub async fn from_config(
        images: &ImagesConfig,
        disk_cache_bytes: u64,
        event_tx: &mpsc::UnboundedSender<ImageLoadedEvent>,
    ) -> CacheResult<Self> {
        let disk_cache = Arc::new(DiskImageCache::default_location(disk_cache_bytes).await?);
        Self::new(ImageLoaderConfig::from(images), event_tx, disk_cache)
    }

    /// Worker loop: queues requests newest-first and throttles downloads.
    async fn run_worker_loop(mut state: WorkerState) {
        let mut queue: VecDeque<ImageRequest> = VecDeque::new();

        loop {
            tokio::select! {
                cmd = state.request_rx.recv() => {
                    match cmd {
                        Some(LoaderCommand::Load(request)) => {
                            if !queue.contains(&request) {
                                queue.push_front(request);
                            }
                        }
                        Some(LoaderCommand::Cancel(request)) => {
                            queue.retain(|queued| *queued != request);
                        }
                        Some(LoaderCommand::CancelAll) => {
                            queue.clear();
                        }
                        None => break,
                    }
                }
                Ok(permit) = state.semaphore.clone().acquire_owned(), if !queue.is_empty() => {
                    let Some(request) = queue.pop_front() else {
                        continue;
                    };

                    {
                        let mut in_flight = state.in_flight.write().await;
                        if !in_flight.insert(request.clone()) {
                            continue;
                        }
                    }

                    let memory_cache = state.memory_cache.clone();
                    let fetcher = state.fetcher.clone();
                    let in_flight = state.in_flight.clone();
                    let event_tx = state.event_tx.clone();
                    let thumbnail_width = state.thumbnail_width;

                    tokio::spawn(async move {
                        let result =
                            load_request(&memory_cache, &fetcher, &request, thumbnail_width)
                                .await
                                .map_err(|e| e.to_string());

                        in_flight.write().await.remove(&request);
                        drop(permit);

                        if let Err(e) = &result {
                            warn!(url = %request.url, error = %e, "Image load failed");
                        }

                        let event = ImageLoadedEvent {
                            id: request.id(),
                            url: request.url,
                            variant: request.variant,
                            result,
                        };
                        let _ = event_tx.send(event);
                    });
                }
            }
        }
    }

    /// Queues a load; the result arrives on the event channel.
    pub fn load_async(&self, request: ImageRequest) {
        if let Err(e) = self.request_tx.send(LoaderCommand::Load(request)) {
            error!("Failed to send load request: {}", e);
        }
    }

    /// Drops a queued load. Downloads already running complete normally.
    pub fn cancel(&self, request: ImageRequest) {
        debug!(url = %request.url, "Cancelled image load");
        if let Err(e) = self.request_tx.send(LoaderCommand::Cancel(request)) {
            error!("Failed to send cancel request: {}", e);
        }
    }

    /// Drops every queued load.
    pub fn cancel_all(&self) {
        if let Err(e) = self.request_tx.send(LoaderCommand::CancelAll) {
            error!("Failed to send cancel all request: {}", e);
        }
    }

    /// Writes the original bytes of an image to a temporary file so an
    /// external viewer can open it.
    ///
    /// # Errors
    /// Returns error if download fails or file I/O fails.
    pub async fn export_for_viewing(&self, url: &str) -> CacheResult<PathBuf> {
        let (bytes, _) = self.fetcher.bytes(url).await?;
        let ext = extension_for(&bytes, url);

        let temp_dir = view_dir();
        tokio::fs::create_dir_all(&temp_dir)
            .await
            .map_err(|e| CacheError::IoError(format!("Failed to create temp view dir: {e}")))?;

        let path = temp_dir.join(format!("{}.{ext}", ImageId::from_url(url)));
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| CacheError::IoError(format!("Failed to write export file: {e}")))?;

        debug!(path = %path.display(), "Exported image for viewing");
        Ok(path)
    }

    /// Returns memory cache statistics.
    #[must_use]
    pub fn memory_cache_stats(&self) -> CacheStats {
        self.memory_cache.stats()
    }

}

async fn load_request(
    memory_cache: &MemoryImageCache,
    fetcher: &Fetcher,
    request: &ImageRequest,
    thumbnail_width: u32,
) -> CacheResult<LoadedImage> {
    let id = request.id();
    if let Some(image) = memory_cache.get(&id).await {
        return Ok(LoadedImage {
            id,
            image,
            source: ImageSource::MemoryCache,
        });
    }

    let (bytes, source) = fetcher.bytes(&request.url).await?;
    let variant = request.variant;

    let decoded = tokio::task::spawn_blocking(move || decode(&bytes, variant, thumbnail_width))
        .await
        .map_err(|e| CacheError::DecodeError(format!("Decode task panicked: {e}")))??;

    let image = Arc::new(decoded);
    memory_cache.put(id.clone(), image.clone()).await;

    debug!(id = %id, source = %source, "Image loaded");

    Ok(LoadedImage { id, image, source })
}

/// Decodes bytes and scales them to the variant's bounds.
fn decode(
    bytes: &[u8],
    variant: ImageVariant,
    thumbnail_width: u32,
) -> CacheResult<image::DynamicImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| CacheError::DecodeError(format!("Failed to decode image: {e}")))?;

    Ok(match variant {
        ImageVariant::Thumbnail if img.width() > thumbnail_width => {
            let height = scaled_height(img.width(), img.height(), thumbnail_width);
            img.resize(
                thumbnail_width,
                height,
                image::imageops::FilterType::Triangle,
            )
        }
        ImageVariant::Full if img.width().max(img.height()) > FULL_MAX_DIMENSION => img.resize(
            FULL_MAX_DIMENSION,
            FULL_MAX_DIMENSION,
            image::imageops::FilterType::Lanczos3,
        ),
        _ => img,
    })
}

fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    let scaled = u64::from(height) * u64::from(target_width) / u64::from(width.max(1));
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

/// Picks a file extension from the image's magic bytes, then the URL.
fn extension_for(bytes: &[u8], url: &str) -> &'static str {
    if let Ok(format) = image::guess_format(bytes)
        && let Some(ext) = format.extensions_str().first()
    {
        return *ext;
    }
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    ["jpg", "jpeg", "png", "gif", "webp"]
        .into_iter()
        .find(|ext| path.ends_with(&format!(".{ext}")))
        .unwrap_or("jpg")
}

fn view_dir() -> PathBuf {
    std::env::temp_dir().join("beer-gallery").join("view")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        image::DynamicImage::new_rgb8(width, height)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    async fn loader_with_cache() -> (
        ImageLoader,
        Arc<DiskImageCache>,
        mpsc::UnboundedReceiver<ImageLoadedEvent>,
        tempfile::TempDir,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let temp_dir = tempfile::TempDir::new().unwrap();
        let disk_cache = Arc::new(
            DiskImageCache::new(temp_dir.path().to_path_buf(), 1024 * 1024)
                .await
                .unwrap(),
        );
        let loader =
            ImageLoader::new(ImageLoaderConfig::default(), &tx, disk_cache.clone()).unwrap();
        (loader, disk_cache, rx, temp_dir)
    }

    #[test]
    fn test_request_ids_differ_per_variant() {
        let url = "https://cdn.example.com/a.jpg";
        assert_ne!(ImageRequest::thumbnail(url).id(), ImageRequest::full(url).id());
    }

    #[test]
    fn test_config_from_images_config() {
        let images = ImagesConfig {
            max_concurrent_downloads: 0,
            thumbnail_width: 320,
            ..ImagesConfig::default()
        };
        let config = ImageLoaderConfig::from(&images);
        assert_eq!(config.max_concurrent_downloads, 1);
        assert_eq!(config.thumbnail_width, 320);
    }

    #[test]
    fn test_thumbnail_is_downscaled() {
        let img = decode(&png_bytes(800, 600), ImageVariant::Thumbnail, 400).unwrap();
        assert_eq!((img.width(), img.height()), (400, 300));
    }

    #[test]
    fn test_small_thumbnail_is_kept() {
        let img = decode(&png_bytes(200, 100), ImageVariant::Thumbnail, 400).unwrap();
        assert_eq!((img.width(), img.height()), (200, 100));
    }

    #[test]
    fn test_full_variant_is_bounded() {
        let img = decode(&png_bytes(4096, 1024), ImageVariant::Full, 400).unwrap();
        assert_eq!((img.width(), img.height()), (2048, 512));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode(b"not an image", ImageVariant::Full, 400),
            Err(CacheError::DecodeError(_))
        ));
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for(&png_bytes(1, 1), "https://x/y.jpg"), "png");
        assert_eq!(extension_for(b"??", "https://x/y.WEBP?sig=1"), "webp");
        assert_eq!(extension_for(b"??", "https://x/y"), "jpg");
    }

    #[tokio::test]
    async fn test_load_served_from_disk_cache() {
        let (loader, disk_cache, mut rx, _temp) = loader_with_cache().await;
        let url = "https://cdn.example.com/beer.png";
        disk_cache
            .write(&ImageId::from_url(url), &png_bytes(800, 400))
            .await
            .unwrap();

        loader.load_async(ImageRequest::thumbnail(url));
        let event = rx.recv().await.unwrap();

        assert_eq!(event.url, url);
        assert_eq!(event.variant, ImageVariant::Thumbnail);
        let loaded = event.result.unwrap();
        assert_eq!(loaded.source, ImageSource::DiskCache);
        assert_eq!(loaded.image.width(), 400);

        let thumbnail_id = ImageRequest::thumbnail(url).id();
        assert!(loader.memory_cache.peek(&thumbnail_id).await.is_some());
        let full_id = ImageRequest::full(url).id();
        assert!(loader.memory_cache.peek(&full_id).await.is_none());
    }

    #[tokio::test]
    async fn test_export_writes_cached_bytes() {
        let (loader, disk_cache, _rx, _temp) = loader_with_cache().await;
        let url = "https://cdn.example.com/export-test.png";
        let bytes = png_bytes(4, 4);
        disk_cache.write(&ImageId::from_url(url), &bytes).await.unwrap();

        let path = loader.export_for_viewing(url).await.unwrap();

        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
        let _ = std::fs::remove_file(path);
    }
}
