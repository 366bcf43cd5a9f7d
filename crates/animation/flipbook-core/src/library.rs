//! Name-scoped clip lookup owned by each animator.

use indexmap::IndexMap;

use crate::data::{Clip, ClipRef};
use crate::error::FlipbookError;
use crate::Result;

/// Insertion-ordered table of clips keyed by name.
/// The first inserted clip is the autoplay clip.
#[derive(Clone, Debug, Default)]
pub struct ClipLibrary {
    clips: IndexMap<String, ClipRef>,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from shared handles, rejecting duplicate names.
    pub fn from_refs<I>(clips: I) -> Result<Self>
    where
        I: IntoIterator<Item = ClipRef>,
    {
        let mut lib = Self::new();
        for clip in clips {
            lib.insert(clip)?;
        }
        Ok(lib)
    }

    /// Build from owned clips, wrapping each into a fresh handle.
    pub fn from_clips<I>(clips: I) -> Result<Self>
    where
        I: IntoIterator<Item = Clip>,
    {
        Self::from_refs(clips.into_iter().map(Clip::into_ref))
    }

    pub fn insert(&mut self, clip: ClipRef) -> Result<()> {
        if self.clips.contains_key(clip.name()) {
            return Err(FlipbookError::DuplicateClipName {
                name: clip.name().to_string(),
            });
        }
        self.clips.insert(clip.name().to_string(), clip);
        Ok(())
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&ClipRef> {
        self.clips.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    pub fn first(&self) -> Option<&ClipRef> {
        self.clips.first().map(|(_, clip)| clip)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClipRef> {
        self.clips.values()
    }

    pub fn clear(&mut self) {
        self.clips.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{same_clip, Frame};

    fn clip(name: &str) -> Clip {
        Clip::new(name, vec![Frame::new(0)])
    }

    #[test]
    fn keeps_insertion_order() {
        let lib = ClipLibrary::from_clips([clip("Idle"), clip("Walk"), clip("Jump")]).unwrap();
        let names: Vec<_> = lib.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, ["Idle", "Walk", "Jump"]);
        assert_eq!(lib.first().map(|c| c.name()), Some("Idle"));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = ClipLibrary::from_clips([clip("Idle"), clip("Idle")]).unwrap_err();
        assert_eq!(
            err,
            FlipbookError::DuplicateClipName {
                name: "Idle".into()
            }
        );
    }

    #[test]
    fn shares_handles() {
        let walk = clip("Walk").into_ref();
        let lib = ClipLibrary::from_refs([walk.clone()]).unwrap();
        assert!(same_clip(lib.get("Walk").unwrap(), &walk));
        assert!(lib.get("Run").is_none());
    }
}
