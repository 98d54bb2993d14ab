use crate::random::RandomSource;
use crate::types::{Category, ImageRef, PipelineMode};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::debug;
use url::Url;

pub const MIN_AUTHOR_CHARS: usize = 3;

/// Appended to every fallback pool image.
pub const POOL_IMAGE_SIZING: &str = "?auto=format&fit=crop&w=1200&q=80";

/// Feed thumbnails carry their width as a path segment; swap it for a large rendition.
pub const THUMBNAIL_TOKEN: &str = "/240/";
pub const LARGE_IMAGE_TOKEN: &str = "/1024/";

pub const VIEWS_RANGE: RangeInclusive<i64> = 120..=4800;
pub const LIKES_RANGE: RangeInclusive<i64> = 8..=350;

const BACKUP_AUTHORS: &[&str] = &[
    "Sarah Mitchell",
    "James Carter",
    "Priya Raman",
    "Daniel Okafor",
    "Elena Petrova",
    "Marcus Lee",
    "Hannah Brooks",
    "Tomás Alvarez",
    "Aisha Khan",
    "Oliver Grant",
];

const TECHNOLOGY_IMAGES: &[&str] = &[
    "https://images.unsplash.com/photo-1518770660439-4636190af475",
    "https://images.unsplash.com/photo-1488590528505-98d2b5aba04b",
    "https://images.unsplash.com/photo-1451187580459-43490279c0fa",
    "https://images.unsplash.com/photo-1550751827-4bd374c3f58b",
    "https://images.unsplash.com/photo-1485827404703-89b55fcc595e",
];

const WORLD_IMAGES: &[&str] = &[
    "https://images.unsplash.com/photo-1524661135-423995f22d0b",
    "https://images.unsplash.com/photo-1526778548025-fa2f459cd5c1",
    "https://images.unsplash.com/photo-1477959858617-67f85cf4f1df",
    "https://images.unsplash.com/photo-1529107386315-e1a2ed48a620",
];

const SPORTS_IMAGES: &[&str] = &[
    "https://images.unsplash.com/photo-1461896836934-ffe607ba8211",
    "https://images.unsplash.com/photo-1579952363873-27f3bade9f55",
    "https://images.unsplash.com/photo-1546519638-68e109498ffc",
    "https://images.unsplash.com/photo-1517649763962-0c623066013b",
];

const BUSINESS_IMAGES: &[&str] = &[
    "https://images.unsplash.com/photo-1486406146926-c627a92ad1ab",
    "https://images.unsplash.com/photo-1460925895917-afdab827c52f",
    "https://images.unsplash.com/photo-1507679799987-c73779587ccf",
    "https://images.unsplash.com/photo-1554224155-6726b3ff858f",
];

const HEALTH_IMAGES: &[&str] = &[
    "https://images.unsplash.com/photo-1505751172876-fa1923c5c528",
    "https://images.unsplash.com/photo-1576091160399-112ba8d25d1d",
    "https://images.unsplash.com/photo-1571019613454-1cb2f99b2d8b",
    "https://images.unsplash.com/photo-1532938911079-1b06ac7ceec7",
];

const ENTERTAINMENT_IMAGES: &[&str] = &[
    "https://images.unsplash.com/photo-1489599849927-2ee91cede3ba",
    "https://images.unsplash.com/photo-1514525253161-7a46d19cd819",
    "https://images.unsplash.com/photo-1603190287605-e6ade32fa852",
    "https://images.unsplash.com/photo-1470229722913-7c0e2dbbafd3",
];

pub fn default_image_pools() -> HashMap<Category, Vec<String>> {
    let pool = |urls: &[&str]| urls.iter().map(|u| u.to_string()).collect::<Vec<_>>();
    HashMap::from([
        (Category::Technology, pool(TECHNOLOGY_IMAGES)),
        (Category::World, pool(WORLD_IMAGES)),
        (Category::Sports, pool(SPORTS_IMAGES)),
        (Category::Business, pool(BUSINESS_IMAGES)),
        (Category::Health, pool(HEALTH_IMAGES)),
        (Category::Entertainment, pool(ENTERTAINMENT_IMAGES)),
    ])
}

/// Fills in author, cover image and display counters when the source does not.
pub struct Enricher {
    random: Arc<RandomSource>,
    backup_authors: Vec<String>,
    image_pools: HashMap<Category, Vec<String>>,
}

impl Enricher {
    pub fn new(random: Arc<RandomSource>) -> Self {
        Self {
            random,
            backup_authors: BACKUP_AUTHORS.iter().map(|a| a.to_string()).collect(),
            image_pools: default_image_pools(),
        }
    }

    pub fn with_image_pools(mut self, pools: HashMap<Category, Vec<String>>) -> Self {
        self.image_pools = pools;
        self
    }

    pub fn with_backup_authors(mut self, authors: Vec<String>) -> Self {
        self.backup_authors = authors;
        self
    }

    pub fn author(&self, raw: Option<&str>) -> String {
        if let Some(name) = raw.map(str::trim).filter(|name| is_plausible_name(name)) {
            return name.to_string();
        }

        let picked = self
            .random
            .pick(&self.backup_authors)
            .cloned()
            .unwrap_or_else(|| "Staff Writer".to_string());
        debug!(raw = ?raw, picked = %picked, "Using backup author");
        picked
    }

    pub fn image(&self, category: Category, image: Option<&ImageRef>) -> String {
        if let Some(url) = image.and_then(usable_image) {
            return url;
        }

        let pool = self
            .image_pools
            .get(&category)
            .filter(|pool| !pool.is_empty())
            .or_else(|| self.image_pools.get(&Category::Technology))
            .map(Vec::as_slice)
            .unwrap_or_default();

        let base = self
            .random
            .pick(pool)
            .map(String::as_str)
            .unwrap_or(TECHNOLOGY_IMAGES[0]);
        format!("{}{}", base, POOL_IMAGE_SIZING)
    }

    /// `(views_count, likes_count)` for a new post.
    pub fn counters(&self, mode: PipelineMode) -> (i64, i64) {
        match mode {
            PipelineMode::Published => (
                self.random.in_range(VIEWS_RANGE),
                self.random.in_range(LIKES_RANGE),
            ),
            PipelineMode::Draft => (0, 0),
        }
    }
}

pub fn is_plausible_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && !name.contains("http") && name.chars().count() >= MIN_AUTHOR_CHARS
}

fn usable_image(image: &ImageRef) -> Option<String> {
    match image {
        ImageRef::Media(url) => Some(url.clone()).filter(|u| !u.trim().is_empty()),
        ImageRef::Thumbnail(url) => Some(url.replacen(THUMBNAIL_TOKEN, LARGE_IMAGE_TOKEN, 1)),
        ImageRef::Api(url) => Url::parse(url)
            .ok()
            .filter(|parsed| parsed.scheme() == "https")
            .map(|_| url.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enricher() -> Enricher {
        Enricher::new(Arc::new(RandomSource::seeded(42)))
    }

    #[test]
    fn valid_author_passes_through_trimmed() {
        assert_eq!(enricher().author(Some("  Jane Doe ")), "Jane Doe");
    }

    #[test]
    fn implausible_authors_come_from_backup_pool() {
        let e = enricher();
        for raw in [Some(""), Some("https://example.com/staff"), Some("AB"), Some("   "), None] {
            let name = e.author(raw);
            assert!(BACKUP_AUTHORS.contains(&name.as_str()), "{:?} -> {}", raw, name);
        }
    }

    #[test]
    fn media_image_used_verbatim() {
        let url = "https://cdn.example.com/a.jpg";
        assert_eq!(
            enricher().image(Category::World, Some(&ImageRef::Media(url.to_string()))),
            url
        );
    }

    #[test]
    fn thumbnail_is_upscaled() {
        let thumb = ImageRef::Thumbnail("https://ichef.example.com/ace/standard/240/pic.jpg".into());
        assert_eq!(
            enricher().image(Category::World, Some(&thumb)),
            "https://ichef.example.com/ace/standard/1024/pic.jpg"
        );
    }

    #[test]
    fn insecure_api_image_falls_back_to_pool() {
        let insecure = ImageRef::Api("http://news.example.com/pic.jpg".into());
        let image = enricher().image(Category::Sports, Some(&insecure));
        assert!(image.ends_with(POOL_IMAGE_SIZING));
        assert!(SPORTS_IMAGES.iter().any(|base| image.starts_with(base)));

        let secure = ImageRef::Api("https://news.example.com/pic.jpg".into());
        assert_eq!(
            enricher().image(Category::Sports, Some(&secure)),
            "https://news.example.com/pic.jpg"
        );
    }

    #[test]
    fn missing_image_uses_category_pool() {
        let image = enricher().image(Category::Health, None);
        assert!(HEALTH_IMAGES.iter().any(|base| image == format!("{}{}", base, POOL_IMAGE_SIZING)));
    }

    #[test]
    fn category_without_pool_uses_technology() {
        let mut pools = default_image_pools();
        pools.remove(&Category::Entertainment);
        let e = enricher().with_image_pools(pools);

        let image = e.image(Category::Entertainment, None);
        assert!(TECHNOLOGY_IMAGES.iter().any(|base| image == format!("{}{}", base, POOL_IMAGE_SIZING)));
    }

    #[test]
    fn counters_follow_mode() {
        let e = enricher();
        assert_eq!(e.counters(PipelineMode::Draft), (0, 0));
        let (views, likes) = e.counters(PipelineMode::Published);
        assert!(VIEWS_RANGE.contains(&views));
        assert!(LIKES_RANGE.contains(&likes));
    }
}
