//! Startup font registration.
//!
//! Candidate font files are probed in priority order and the first one that
//! loads is registered as the substitute for the canonical family that name
//! font descriptors refer to (e.g. "Arial"). System fonts are the fallback when
//! no candidate exists. A fallback font without glyphs for a name's script
//! renders it as boxes or not at all; in non-strict mode that is only logged.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::models::FontSettings;

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("No usable font among {0} candidates (strict mode)")]
    NoCandidate(usize),
}

/// The candidate font that was registered at startup
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredFont {
    pub path: PathBuf,
    pub family: String,
}

pub struct FontRegistry {
    fontdb: Arc<fontdb::Database>,
    canonical_family: String,
    registered: Option<RegisteredFont>,
}

static SHARED: Mutex<Option<Arc<FontRegistry>>> = Mutex::new(None);

impl FontRegistry {
    /// Probe candidates and build the font database
    pub fn probe(settings: &FontSettings) -> Result<Self, FontError> {
        let mut db = fontdb::Database::new();

        let registered = settings
            .candidates
            .iter()
            .find_map(|path| load_candidate(&mut db, path));

        match &registered {
            Some(font) => {
                db.set_sans_serif_family(font.family.clone());
                tracing::info!(
                    path = %font.path.display(),
                    family = %font.family,
                    canonical = %settings.canonical_family,
                    "Registered certificate font"
                );
            }
            None if settings.strict => {
                return Err(FontError::NoCandidate(settings.candidates.len()));
            }
            None => {
                tracing::warn!(
                    candidates = settings.candidates.len(),
                    canonical = %settings.canonical_family,
                    "No certificate font found, falling back to system fonts; \
                     names in some scripts may not render"
                );
            }
        }

        if settings.load_system_fonts {
            db.load_system_fonts();
        }

        tracing::debug!(font_count = db.len(), "Font database ready");

        Ok(Self {
            fontdb: Arc::new(db),
            canonical_family: settings.canonical_family.clone(),
            registered,
        })
    }

    /// Process-wide registry, probed on first use only
    pub fn shared(settings: &FontSettings) -> Result<Arc<Self>, FontError> {
        get_or_probe(&SHARED, || Self::probe(settings))
    }

    /// A registry with no fonts at all
    pub fn empty() -> Self {
        Self {
            fontdb: Arc::new(fontdb::Database::new()),
            canonical_family: "Arial".to_string(),
            registered: None,
        }
    }

    pub fn fontdb(&self) -> Arc<fontdb::Database> {
        self.fontdb.clone()
    }

    pub fn registered(&self) -> Option<&RegisteredFont> {
        self.registered.as_ref()
    }

    /// Expand a descriptor's family list for SVG `font-family`.
    ///
    /// The registered font is inserted right after the canonical family so it
    /// stands in for it when the canonical font itself is not installed.
    pub fn family_list(&self, requested: &[String]) -> Vec<String> {
        let mut families = Vec::with_capacity(requested.len() + 2);
        for family in requested {
            push_unique(&mut families, family);
            if family.eq_ignore_ascii_case(&self.canonical_family) {
                if let Some(font) = &self.registered {
                    push_unique(&mut families, &font.family);
                }
            }
        }
        if let Some(font) = &self.registered {
            push_unique(&mut families, &font.family);
        }
        push_unique(&mut families, "sans-serif");
        families
    }
}

/// The slot stays locked while probing, so concurrent first callers wait for
/// one probe instead of each running their own. A failed probe leaves the slot
/// empty for the next caller.
fn get_or_probe(
    slot: &Mutex<Option<Arc<FontRegistry>>>,
    probe: impl FnOnce() -> Result<FontRegistry, FontError>,
) -> Result<Arc<FontRegistry>, FontError> {
    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(existing) = slot.as_ref() {
        return Ok(existing.clone());
    }
    let registry = Arc::new(probe()?);
    *slot = Some(registry.clone());
    Ok(registry)
}

fn push_unique(families: &mut Vec<String>, family: &str) {
    if !families.iter().any(|f| f.eq_ignore_ascii_case(family)) {
        families.push(family.to_string());
    }
}

fn load_candidate(db: &mut fontdb::Database, path: &Path) -> Option<RegisteredFont> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(_) => {
            tracing::trace!(path = %path.display(), "Font candidate not present");
            return None;
        }
    };

    let ids = db.load_font_source(fontdb::Source::Binary(Arc::new(data)));
    let family = ids
        .iter()
        .filter_map(|id| db.face(*id))
        .find_map(|face| face.families.first().map(|(name, _)| name.clone()));

    match family {
        Some(family) => Some(RegisteredFont {
            path: path.to_path_buf(),
            family,
        }),
        None => {
            tracing::warn!(path = %path.display(), "Font candidate could not be parsed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use tempfile::TempDir;

    fn settings(candidates: Vec<PathBuf>, strict: bool) -> FontSettings {
        FontSettings {
            candidates,
            load_system_fonts: false,
            strict,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_candidates_soft_mode() {
        let dir = TempDir::new().unwrap();
        let registry =
            FontRegistry::probe(&settings(vec![dir.path().join("missing.ttf")], false)).unwrap();
        assert!(registry.registered().is_none());
        assert_eq!(registry.fontdb().len(), 0);
    }

    #[test]
    fn test_no_candidates_strict_mode_fails() {
        let dir = TempDir::new().unwrap();
        let result = FontRegistry::probe(&settings(vec![dir.path().join("missing.ttf")], true));
        assert!(matches!(result, Err(FontError::NoCandidate(1))));
    }

    #[test]
    fn test_unparseable_candidate_is_skipped() {
        let dir = TempDir::new().unwrap();
        let bogus = dir.path().join("bogus.ttf");
        std::fs::write(&bogus, b"not a font").unwrap();

        let registry = FontRegistry::probe(&settings(vec![bogus], false)).unwrap();
        assert!(registry.registered().is_none());
    }

    #[test]
    fn test_family_list_without_registered_font() {
        let registry = FontRegistry::empty();
        assert_eq!(
            registry.family_list(&["Arial".to_string()]),
            vec!["Arial".to_string(), "sans-serif".to_string()]
        );
    }

    #[test]
    fn test_family_list_substitutes_after_canonical() {
        let registry = FontRegistry {
            registered: Some(RegisteredFont {
                path: PathBuf::from("/fonts/DejaVuSans-Bold.ttf"),
                family: "DejaVu Sans".to_string(),
            }),
            ..FontRegistry::empty()
        };

        assert_eq!(
            registry.family_list(&["arial".to_string(), "Georgia".to_string()]),
            vec!["arial", "DejaVu Sans", "Georgia", "sans-serif"]
        );
        assert_eq!(
            registry.family_list(&["Georgia".to_string()]),
            vec!["Georgia", "DejaVu Sans", "sans-serif"]
        );
    }

    #[test]
    fn test_concurrent_first_use_probes_once() {
        let slot = Mutex::new(None);
        let probes = AtomicUsize::new(0);
        let barrier = Barrier::new(8);

        let (slot_ref, probes_ref, barrier_ref) = (&slot, &probes, &barrier);
        let registries: Vec<Arc<FontRegistry>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(move || {
                        barrier_ref.wait();
                        get_or_probe(slot_ref, || {
                            probes_ref.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(20));
                            Ok(FontRegistry::empty())
                        })
                        .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(probes.load(Ordering::SeqCst), 1);
        assert!(registries.iter().all(|r| Arc::ptr_eq(r, &registries[0])));
    }

    #[test]
    fn test_failed_probe_is_retried() {
        let slot = Mutex::new(None);
        let first = get_or_probe(&slot, || Err(FontError::NoCandidate(2)));
        assert!(matches!(first, Err(FontError::NoCandidate(2))));

        let second = get_or_probe(&slot, || Ok(FontRegistry::empty())).unwrap();
        let third = get_or_probe(&slot, || Err(FontError::NoCandidate(2))).unwrap();
        assert!(Arc::ptr_eq(&second, &third));
    }
}
