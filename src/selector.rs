use crate::catalog::{Catalog, Prompt};
use crate::history::{HistoryRing, HistoryStore, SelectionEvent};
use chrono::Local;
use rand::Rng;
use tracing::{info, warn};

/// Source of uniformly distributed indices in `[0, len)`.
pub trait IndexSource: Send {
    fn pick(&mut self, len: usize) -> usize;
}

pub struct ThreadRngSource;

impl IndexSource for ThreadRngSource {
    fn pick(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Wall clock rendered as a human-readable local time.
pub trait Clock: Send {
    fn now(&self) -> String;
}

pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> String {
        Local::now().format("%-I:%M:%S %p").to_string()
    }
}

pub struct Selector {
    catalog: Catalog,
    current: usize,
    ring: HistoryRing,
    store: Box<dyn HistoryStore>,
    rng: Box<dyn IndexSource>,
    clock: Box<dyn Clock>,
}

impl Selector {
    /// The ring is seeded from `store`; the current prompt starts at the
    /// first catalog entry.
    pub fn new(
        catalog: Catalog,
        store: Box<dyn HistoryStore>,
        rng: Box<dyn IndexSource>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let ring = store.load();
        Self {
            catalog,
            current: 0,
            ring,
            store,
            rng,
            clock,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &'static Prompt {
        // `current` only ever holds an index drawn from the catalog
        &self.catalog.prompts()[self.current]
    }

    pub fn history(&self) -> &HistoryRing {
        &self.ring
    }

    pub fn spin(&mut self) -> (&'static Prompt, &HistoryRing) {
        let index = self.rng.pick(self.catalog.len()) % self.catalog.len();
        self.current = index;
        let prompt = self.current();

        self.ring.push(SelectionEvent {
            label: prompt.label.to_string(),
            time: self.clock.now(),
        });
        if let Err(e) = self.store.save(&self.ring) {
            warn!("Failed to persist prompt history: {}", e);
        }

        info!("Spun prompt #{}: {}", index + 1, prompt.label);
        (prompt, &self.ring)
    }

    pub fn clear_history(&mut self) {
        self.ring.clear();
        if let Err(e) = self.store.clear() {
            warn!("Failed to remove persisted prompt history: {}", e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::history::MemoryHistoryStore;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Replays a fixed list of indices, cycling when exhausted.
    pub struct ScriptedSource(pub VecDeque<usize>);

    impl IndexSource for ScriptedSource {
        fn pick(&mut self, _len: usize) -> usize {
            let next = self.0.pop_front().unwrap_or(0);
            self.0.push_back(next);
            next
        }
    }

    /// Produces `t1`, `t2`, ... so ordering is observable.
    #[derive(Default)]
    pub struct TickClock(AtomicUsize);

    impl Clock for TickClock {
        fn now(&self) -> String {
            format!("t{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    /// Store whose contents stay inspectable after being boxed.
    #[derive(Clone, Default)]
    pub struct SharedStore(pub Arc<Mutex<MemoryHistoryStore>>);

    impl HistoryStore for SharedStore {
        fn load(&self) -> HistoryRing {
            self.0.lock().unwrap().load()
        }
        fn save(&mut self, ring: &HistoryRing) -> io::Result<()> {
            self.0.lock().unwrap().save(ring)
        }
        fn clear(&mut self) -> io::Result<()> {
            self.0.lock().unwrap().clear()
        }
    }

    struct FailingStore;

    impl HistoryStore for FailingStore {
        fn load(&self) -> HistoryRing {
            HistoryRing::new()
        }
        fn save(&mut self, _ring: &HistoryRing) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
        fn clear(&mut self) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
    }

    pub fn scripted(indices: &[usize], store: SharedStore) -> Selector {
        Selector::new(
            Catalog::builtin(),
            Box::new(store),
            Box::new(ScriptedSource(indices.iter().copied().collect())),
            Box::new(TickClock::default()),
        )
    }

    #[test]
    fn persisted_ring_tracks_most_recent_spins() {
        let store = SharedStore::default();
        let indices = [0, 1, 2, 3, 4, 5, 6, 7];
        let mut selector = scripted(&indices, store.clone());
        let catalog = Catalog::builtin();

        for n in 1..=indices.len() {
            selector.spin();
            let persisted = store.load();
            assert_eq!(persisted.len(), n.min(5));
            let expected: Vec<&str> = indices[..n]
                .iter()
                .rev()
                .take(5)
                .map(|&i| catalog.get(i).unwrap().label)
                .collect();
            assert_eq!(persisted.labels(), expected);
            assert_eq!(&persisted, selector.history());
        }
    }

    #[test]
    fn spin_sets_current_and_stamps_time() {
        let mut selector = scripted(&[3], SharedStore::default());
        assert_eq!(selector.current().label, "Bounce");

        let (prompt, ring) = selector.spin();
        assert_eq!(prompt.label, "Isolations");
        let first = ring.iter().next().unwrap();
        assert_eq!(first.label, "Isolations");
        assert_eq!(first.time, "t1");
        assert_eq!(selector.current_index(), 3);
    }

    #[test]
    fn history_is_seeded_from_store() {
        let store = SharedStore::default();
        {
            let mut selector = scripted(&[1, 2], store.clone());
            selector.spin();
            selector.spin();
        }
        let selector = scripted(&[0], store);
        assert_eq!(selector.history().labels(), vec!["Groove", "Waves"]);
    }

    #[test]
    fn malformed_store_seeds_empty_ring() {
        let store = SharedStore(Arc::new(Mutex::new(MemoryHistoryStore::with_raw("[{]"))));
        let selector = scripted(&[0], store);
        assert!(selector.history().is_empty());
    }

    #[test]
    fn clear_history_empties_memory_and_storage() {
        let store = SharedStore::default();
        let mut selector = scripted(&[4, 5], store.clone());
        selector.spin();
        selector.spin();
        assert!(store.0.lock().unwrap().raw().is_some());

        selector.clear_history();
        assert!(selector.history().is_empty());
        assert!(store.0.lock().unwrap().raw().is_none());

        selector.clear_history();
        assert!(selector.history().is_empty());
        assert!(store.0.lock().unwrap().raw().is_none());
    }

    #[test]
    fn storage_failures_do_not_interrupt_spins() {
        let mut selector = Selector::new(
            Catalog::builtin(),
            Box::new(FailingStore),
            Box::new(ScriptedSource(VecDeque::from(vec![2]))),
            Box::new(TickClock::default()),
        );
        let (prompt, ring) = selector.spin();
        assert_eq!(prompt.label, "Groove");
        assert_eq!(ring.len(), 1);
        selector.clear_history();
        assert!(selector.history().is_empty());
    }

    #[test]
    fn thread_rng_selection_is_roughly_uniform() {
        let catalog = Catalog::builtin();
        let mut selector = Selector::new(
            catalog,
            Box::new(MemoryHistoryStore::new()),
            Box::new(ThreadRngSource),
            Box::new(LocalClock),
        );
        let trials = 10_000;
        let mut counts = vec![0usize; catalog.len()];
        for _ in 0..trials {
            selector.spin();
            counts[selector.current_index()] += 1;
        }
        // expected 1000 per entry, sd ~30; allow five sigma
        let expected = trials / catalog.len();
        for (i, count) in counts.iter().enumerate() {
            assert!(
                count.abs_diff(expected) <= 150,
                "prompt {} picked {} times",
                i,
                count
            );
        }
    }

    #[test]
    fn local_clock_renders_time_of_day() {
        let now = LocalClock.now();
        assert!(now.ends_with("AM") || now.ends_with("PM"), "{}", now);
        assert_eq!(now.matches(':').count(), 2);
    }
}
