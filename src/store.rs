//! Observable state shared between the data layer and the map UI.
//!
//! There are no globals: the caller creates a [`MapState`] and passes it by
//! reference to whatever reads or updates it.

use crate::color::ColorScale;
use crate::layout::TooltipScale;
use crate::models::StateFeature;
use std::fmt;

/// Handle returned by [`Writable::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Box<dyn FnMut(&T)>;

/// A value whose changes are pushed to subscribers.
///
/// Subscribers are called immediately on subscription with the current value,
/// then after every `set`/`update`, in subscription order.
pub struct Writable<T> {
    value: T,
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
    next_id: u64,
}

impl<T: fmt::Debug> fmt::Debug for Writable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writable")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<T: Default> Default for Writable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Writable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        self.notify();
    }

    /// Mutate the value in place, then notify.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.notify();
    }

    pub fn subscribe(&mut self, mut callback: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        callback(&self.value);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn notify(&mut self) {
        for (_, s) in self.subscribers.iter_mut() {
            s(&self.value);
        }
    }
}

/// Set a new numeric domain on a color scale container.
pub fn update_color_scale_domain(store: &mut Writable<ColorScale>, domain: [f64; 2]) {
    store.update(|scale| scale.set_domain(domain));
}

/// UI state owned by the caller: state shapes, park color scale, tooltip scale.
#[derive(Debug, Default)]
pub struct MapState {
    pub states: Writable<Vec<StateFeature>>,
    pub color_scale: Writable<ColorScale>,
    pub tooltip: TooltipScale,
}

impl MapState {
    /// Empty states list, default color scale over `[0, 1]`, tooltip factor 1.
    pub fn new() -> Self {
        Self::default()
    }
}
