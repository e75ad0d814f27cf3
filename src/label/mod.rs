mod badging;
mod patterns;

pub use badging::BadgingSource;

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::detect::{AppId, Foreground};

/// Labels known without asking the device.
pub const BUILTIN_LABELS: &[(&str, &str)] = &[
    ("com.tencent.mm", "微信"),
    ("com.tencent.mobileqq", "QQ"),
    ("com.ss.android.ugc.aweme", "抖音"),
    ("tv.danmaku.bili", "哔哩哔哩"),
    ("com.android.launcher3", "桌面启动器"),
    ("com.miui.home", "小米桌面"),
];

/// In-memory id -> label map
#[derive(Debug, Default, Clone)]
pub struct LabelCache {
    labels: HashMap<AppId, String>,
}

impl LabelCache {
    /// Cache seeded with [`BUILTIN_LABELS`].
    pub fn with_builtin() -> Self {
        let mut cache = Self::default();
        for (id, label) in BUILTIN_LABELS {
            cache.insert(AppId::new(*id), *label);
        }
        cache
    }

    pub fn insert(&mut self, id: AppId, label: impl Into<String>) {
        self.labels.insert(id, label.into());
    }

    pub fn get(&self, id: &AppId) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }
}

impl Extend<(AppId, String)> for LabelCache {
    fn extend<T: IntoIterator<Item = (AppId, String)>>(&mut self, iter: T) {
        self.labels.extend(iter);
    }
}

/// One way of finding a label for an app the cache doesn't know.
#[async_trait]
pub trait LabelSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// `None` when this source cannot tell; never an error.
    async fn lookup(&self, id: &AppId) -> Option<String>;
}

/// Cache first, then each source in order, then the id itself.
pub struct LabelResolver {
    cache: LabelCache,
    sources: Vec<Box<dyn LabelSource>>,
    /// Keep labels found by sources for the rest of the process lifetime
    remember: bool,
}

impl LabelResolver {
    pub fn new(cache: LabelCache, sources: Vec<Box<dyn LabelSource>>, remember: bool) -> Self {
        Self {
            cache,
            sources,
            remember,
        }
    }

    pub fn cache(&self) -> &LabelCache {
        &self.cache
    }

    pub async fn resolve(&mut self, foreground: &Foreground) -> String {
        let id = match foreground {
            Foreground::App(id) => id,
            other => return other.to_string(),
        };

        if let Some(label) = self.cache.get(id) {
            return label.trim().to_string();
        }

        for source in &self.sources {
            debug!(source = source.name(), %id, "label not cached, asking source");
            if let Some(label) = source.lookup(id).await {
                let label = label.trim().to_string();
                info!(source = source.name(), %id, %label, "resolved label");
                if self.remember {
                    self.cache.insert(id.clone(), label.clone());
                }
                return label;
            }
        }

        warn!(%id, "no label found, using package name");
        id.as_str().trim().to_string()
    }
}
