use npsmap::color::ColorScale;
use npsmap::layout::{LayoutProbe, MAP_WRAPPER, StaticLayout, update_scale};
use npsmap::store::{Writable, update_color_scale_domain};
use npsmap::{Client, MapState, Source};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

#[test]
fn color_domain_round_trips() {
    let mut state = MapState::new();
    update_color_scale_domain(&mut state.color_scale, [0.0, 5.0]);
    assert_eq!(state.color_scale.get().domain(), [0.0, 5.0]);
}

#[test]
fn color_scale_subscribers_are_notified() {
    let domains = Rc::new(RefCell::new(Vec::new()));
    let mut store = Writable::new(ColorScale::default());
    let sink = Rc::clone(&domains);
    store.subscribe(move |s: &ColorScale| sink.borrow_mut().push(s.domain()));
    update_color_scale_domain(&mut store, [10.0, 20.0]);
    assert_eq!(*domains.borrow(), vec![[0.0, 1.0], [10.0, 20.0]]);
    assert_eq!(store.subscriber_count(), 1);
}

#[test]
fn states_list_can_be_filled_from_pipeline() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let client = Client::default()
        .with_topology(Source::Path(dir.join("states.json")))
        .with_parks(Source::Path(dir.join("parks.csv")));
    let layer = client.fetch_states().unwrap();

    let mut state = MapState::new();
    let count = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&count);
    state.states.subscribe(move |v| *sink.borrow_mut() = v.len());
    assert_eq!(*count.borrow(), 0);
    state.states.set(layer.states);
    assert_eq!(*count.borrow(), 2);
}

struct NoDocument;

impl LayoutProbe for NoDocument {
    fn element_width(&self, _selector: &str) -> Option<f64> {
        None
    }
}

#[test]
fn scale_factor_without_wrapper_is_unchanged() {
    let mut state = MapState::new();
    assert!(update_scale(&mut state.tooltip, &StaticLayout::new().with(MAP_WRAPPER, 1500.0)));
    assert_eq!(state.tooltip.factor, 1.5);
    assert!(!update_scale(&mut state.tooltip, &NoDocument));
    assert_eq!(state.tooltip.factor, 1.5);
}
