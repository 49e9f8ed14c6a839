use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Id of the designated overview sentinel. Entering it zooms the camera out;
/// it carries no content and is excluded from opacity mutation.
pub const OVERVIEW_ID: &str = "overview";

/// Id of the title slide, the default active slide at startup.
pub const TITLE_ID: &str = "title";

/// One entry in the curated navigation list (mini-map order).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideDescriptor {
    pub id: String,
    pub display_name: String,
    pub icon_ref: String,
}

/// Placement of a slide on the spatial canvas. Rotation hints are optional
/// and skipped individually when absent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
}

/// A project link shown on a project slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectLink {
    pub kind: String,
    pub url: String,
    pub text: String,
    /// "owner/repo" used for metadata enrichment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_repo: Option<String>,
}

/// Content of one project slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default)]
    pub links: Vec<ProjectLink>,
    pub placement: Placement,
}

/// Ordered sequence of slide descriptors. Defines traversal order, lookup by
/// id, and the mini-map sequence. Pure data, no behavior beyond lookup.
#[derive(Debug, Clone, Default)]
pub struct NavigationMap {
    entries: Vec<SlideDescriptor>,
}

impl NavigationMap {
    pub fn new(entries: Vec<SlideDescriptor>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SlideDescriptor] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of `id` in traversal order. Unknown ids are a lookup miss,
    /// never a panic; callers clamp to 0 where an index is required.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&SlideDescriptor> {
        self.entries.get(index)
    }

    /// Id one position forward, wrapping past the last entry to the first.
    pub fn next_id(&self, id: &str) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let idx = self.index_of(id).unwrap_or(0);
        Some(self.entries[(idx + 1) % self.entries.len()].id.as_str())
    }

    /// Id one position backward, wrapping before the first entry to the last.
    pub fn prev_id(&self, id: &str) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let len = self.entries.len();
        let idx = self.index_of(id).unwrap_or(0);
        Some(self.entries[(idx + len - 1) % len].id.as_str())
    }
}

/// The full deck: curated navigation map plus the project content behind it.
#[derive(Debug, Clone)]
pub struct Deck {
    pub map: NavigationMap,
    pub projects: Vec<Project>,
}

impl Deck {
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// All step ids in engine order: content slides followed by the overview
    /// sentinel. The sentinel is not part of the curated map.
    pub fn step_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.map.entries.iter().map(|e| e.id.clone()).collect();
        ids.push(OVERVIEW_ID.to_string());
        ids
    }

    pub fn placement(&self, id: &str) -> Placement {
        if id == OVERVIEW_ID {
            return Placement {
                scale: Some(4.5),
                ..Placement::default()
            };
        }
        if id == TITLE_ID {
            return Placement::default();
        }
        self.project(id).map(|p| p.placement).unwrap_or_default()
    }
}

/// On-disk deck format for `--deck file.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DeckFile {
    #[serde(default)]
    map: Vec<SlideDescriptor>,
    #[serde(default)]
    projects: Vec<Project>,
}

pub fn load(path: &Path) -> Result<Deck> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read deck file {}: {e}", path.display()))?;
    let file: DeckFile = serde_yaml::from_str(&contents)?;
    if file.map.is_empty() {
        anyhow::bail!("Deck file {} defines no slides", path.display());
    }
    Ok(Deck {
        map: NavigationMap::new(file.map),
        projects: file.projects,
    })
}

fn descriptor(id: &str, name: &str, icon: &str) -> SlideDescriptor {
    SlideDescriptor {
        id: id.to_string(),
        display_name: name.to_string(),
        icon_ref: icon.to_string(),
    }
}

/// The built-in portfolio deck.
pub fn builtin() -> Deck {
    let map = NavigationMap::new(vec![
        descriptor(TITLE_ID, "Intro", "home"),
        descriptor("homepage", "Personal homepage", "globe"),
        descriptor("profile", "Profile card", "user"),
        descriptor("gallery", "Animated gallery", "images"),
        descriptor("termfolio", "Terminal portfolio", "terminal"),
    ]);

    let projects = vec![
        Project {
            id: "homepage".to_string(),
            name: "HomePage".to_string(),
            title: "HomePage - a modern personal site".to_string(),
            description: "Single-page personal homepage with animated sections \
                          and a responsive layout."
                .to_string(),
            tech: vec!["TypeScript".to_string(), "Vite".to_string()],
            links: vec![ProjectLink {
                kind: "code".to_string(),
                url: "https://github.com/foliodeck/homepage".to_string(),
                text: "Source".to_string(),
                github_repo: Some("foliodeck/homepage".to_string()),
            }],
            placement: Placement {
                x: 1200.0,
                y: -400.0,
                z: 0.0,
                rotate: Some(10.0),
                rotate_y: None,
                scale: None,
            },
        },
        Project {
            id: "profile".to_string(),
            name: "Profile".to_string(),
            title: "Profile - shareable profile cards".to_string(),
            description: "Profile card generator with live preview and \
                          one-click export."
                .to_string(),
            tech: vec!["React".to_string(), "CSS".to_string()],
            links: vec![ProjectLink {
                kind: "demo".to_string(),
                url: "https://foliodeck.github.io/profile".to_string(),
                text: "Live demo".to_string(),
                github_repo: None,
            }],
            placement: Placement {
                x: 2400.0,
                y: 300.0,
                z: -600.0,
                rotate: None,
                rotate_y: Some(30.0),
                scale: None,
            },
        },
        Project {
            id: "gallery".to_string(),
            name: "Gallery".to_string(),
            title: "Gallery - animated photo wall".to_string(),
            description: "Scroll-driven photo wall with staggered entrance \
                          animations."
                .to_string(),
            tech: vec!["JavaScript".to_string(), "GSAP".to_string()],
            links: vec![ProjectLink {
                kind: "code".to_string(),
                url: "https://github.com/foliodeck/gallery".to_string(),
                text: "Source".to_string(),
                github_repo: Some("foliodeck/gallery".to_string()),
            }],
            placement: Placement {
                x: 1800.0,
                y: 1400.0,
                z: 200.0,
                rotate: Some(-15.0),
                rotate_y: None,
                scale: None,
            },
        },
        Project {
            id: "termfolio".to_string(),
            name: "Termfolio".to_string(),
            title: "Termfolio - a portfolio in your terminal".to_string(),
            description: "Terminal-styled portfolio with a command prompt \
                          interface and typed output."
                .to_string(),
            tech: vec!["Rust".to_string(), "ratatui".to_string()],
            links: vec![ProjectLink {
                kind: "code".to_string(),
                url: "https://github.com/foliodeck/termfolio".to_string(),
                text: "Source".to_string(),
                github_repo: Some("foliodeck/termfolio".to_string()),
            }],
            placement: Placement {
                x: 600.0,
                y: 2000.0,
                z: -300.0,
                rotate: None,
                rotate_y: Some(-25.0),
                scale: None,
            },
        },
    ];

    Deck {
        map,
        projects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_indices_are_unique_and_stable() {
        let deck = builtin();
        let mut seen = std::collections::HashSet::new();
        for entry in deck.map.entries() {
            let idx = deck.map.index_of(&entry.id).unwrap();
            assert!(seen.insert(idx), "duplicate index {idx} for {}", entry.id);
            // Stable across repeated calls.
            assert_eq!(deck.map.index_of(&entry.id), Some(idx));
        }
        assert_eq!(seen.len(), deck.map.len());
    }

    #[test]
    fn unknown_id_is_a_lookup_miss() {
        let deck = builtin();
        assert_eq!(deck.map.index_of("nope"), None);
        assert_eq!(deck.map.index_of(OVERVIEW_ID), None);
    }

    #[test]
    fn next_and_prev_wrap_cyclically() {
        let deck = builtin();
        let map = &deck.map;
        let last = &map.entries()[map.len() - 1].id;
        assert_eq!(map.next_id(last), Some(TITLE_ID));
        assert_eq!(map.prev_id(TITLE_ID), Some(last.as_str()));
        assert_eq!(map.next_id(TITLE_ID), Some("homepage"));
    }

    #[test]
    fn step_ids_append_the_overview_sentinel() {
        let deck = builtin();
        let steps = deck.step_ids();
        assert_eq!(steps.len(), deck.map.len() + 1);
        assert_eq!(steps.last().map(String::as_str), Some(OVERVIEW_ID));
    }

    #[test]
    fn overview_placement_is_scaled_out() {
        let deck = builtin();
        let p = deck.placement(OVERVIEW_ID);
        assert_eq!(p.scale, Some(4.5));
    }
}
