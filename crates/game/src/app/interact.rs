use engine::Vec2;
use tracing::debug;

/// A proximity-triggered point of interest. `action` is whatever payload the
/// owning room wants back when the entry activates.
#[derive(Debug, Clone)]
pub(crate) struct Interactable<A> {
    pub id: &'static str,
    pub position: Vec2,
    pub radius: f32,
    pub prompt: String,
    pub action: A,
}

/// Room-scoped registry of interactables. `update` recomputes the single
/// nearest in-range entry every call (O(n); rooms register tens at most) and
/// `activate` hands back that entry's action, if any.
#[derive(Debug)]
pub(crate) struct InteractRegistry<A> {
    entries: Vec<Interactable<A>>,
    nearest: Option<usize>,
}

impl<A> Default for InteractRegistry<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            nearest: None,
        }
    }
}

impl<A: Clone> InteractRegistry<A> {
    /// Registers an interactable. Re-registering an id overwrites the
    /// earlier entry in place.
    pub(crate) fn register(&mut self, interactable: Interactable<A>) {
        debug!(
            id = interactable.id,
            x = interactable.position.x,
            y = interactable.position.y,
            radius = interactable.radius,
            "interactable_registered"
        );
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.id == interactable.id)
        {
            Some(existing) => *existing = interactable,
            None => self.entries.push(interactable),
        }
        self.nearest = None;
    }

    pub(crate) fn unregister(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.nearest = None;
        before != self.entries.len()
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Recomputes the nearest entry whose circle contains the player. Ties
    /// go to the strictly closer entry; equal distances keep the earlier
    /// registration.
    pub(crate) fn update(&mut self, player: Vec2) {
        let mut best: Option<(usize, f32)> = None;
        for (index, entry) in self.entries.iter().enumerate() {
            let dist_sq = entry.position.distance_sq(player);
            if dist_sq > entry.radius * entry.radius {
                continue;
            }
            match best {
                Some((_, best_sq)) if best_sq <= dist_sq => {}
                _ => best = Some((index, dist_sq)),
            }
        }
        self.nearest = best.map(|(index, _)| index);
    }

    /// Prompt of the current nearest in-range entry, for the HUD.
    pub(crate) fn prompt(&self) -> Option<&str> {
        self.nearest
            .and_then(|index| self.entries.get(index))
            .map(|entry| entry.prompt.as_str())
    }

    /// Clones the nearest in-range entry's action, or reports that no
    /// activation occurred. Exactly one entry activates per call.
    pub(crate) fn activate(&self) -> Option<A> {
        let entry = self.nearest.and_then(|index| self.entries.get(index))?;
        debug!(id = entry.id, "interactable_activated");
        Some(entry.action.clone())
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.nearest = None;
    }
}
