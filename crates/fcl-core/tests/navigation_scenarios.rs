//! End-to-end scenarios: folded text in, key presses through the key map,
//! navigator state out.

use fcl_core::event::{KeyCode, KeyEvent};
use fcl_core::label::{self, Emphasis};
use fcl_core::record::parse_folded_str;
use fcl_core::{Dispatch, KeyMap, LayoutEngine, Navigator};

fn viewer(input: &str, width: u16, height: u16) -> Navigator {
    let records = parse_folded_str(input).expect("valid folded input");
    Navigator::new(records, LayoutEngine::default(), width, height)
}

fn press(nav: &mut Navigator, keys: &str) -> Vec<Dispatch> {
    let map = KeyMap::standard();
    keys.chars()
        .map(|c| {
            let action = map
                .resolve(&KeyEvent::new(KeyCode::Char(c)))
                .unwrap_or_else(|| panic!("unbound key {c:?}"));
            nav.dispatch(action)
        })
        .collect()
}

fn selected_title(nav: &Navigator) -> String {
    let band = nav.selected_band().expect("a selection");
    nav.frames().frame(band.frames()[0]).title().to_owned()
}

fn labels(nav: &Navigator) -> Vec<String> {
    nav.bands()
        .iter()
        .map(|b| label::band_label(nav.frames(), b))
        .collect()
}

#[test]
fn main_foo_bar_baz_renders_and_navigates() {
    let mut nav = viewer("main;foo;bar 100\nmain;foo;baz 50\n", 10, 24);
    assert_eq!(
        labels(&nav),
        vec!["[main----]", "[foo-----]", "[bar-]", "[b]"]
    );

    press(&mut nav, "jj");
    assert_eq!(selected_title(&nav), "bar");
    press(&mut nav, "l");
    assert_eq!(selected_title(&nav), "baz");
    assert_eq!(nav.status_lines(), vec!["baz (50 samples, 33.33%)"]);
    press(&mut nav, "k");
    assert_eq!(selected_title(&nav), "foo");
}

#[test]
fn exclude_sole_leaf_removes_its_parent() {
    let mut nav = viewer("top;mid;leaf 5\ntop;side 5\n", 20, 24);
    press(&mut nav, "jj");
    assert_eq!(selected_title(&nav), "leaf");
    assert_eq!(press(&mut nav, "x"), vec![Dispatch::Redraw]);

    let frames = nav.frames();
    assert_eq!(frames.total_excluded(), 5);
    assert_eq!(frames.original_total(), 10);
    let titles: Vec<_> = frames
        .live_frames()
        .into_iter()
        .map(|id| frames.frame(id).title().to_owned())
        .collect();
    assert_eq!(titles, vec!["top", "side"]);
    assert_eq!(selected_title(&nav), "top");
    assert_eq!(nav.excluded_warning().as_deref(), Some("50.00% samples excluded"));
}

#[test]
fn hard_focus_merges_occurrences() {
    let mut nav = viewer("a;b;c 10\nx;b;d 5\n", 30, 24);
    press(&mut nav, "j");
    assert_eq!(selected_title(&nav), "b");
    press(&mut nav, "F");

    let frames = nav.frames();
    assert_eq!(frames.roots().len(), 1);
    let root = frames.frame(frames.roots()[0]);
    assert_eq!((root.title(), root.samples()), ("b", 15));
    let kids: Vec<_> = root
        .children()
        .iter()
        .map(|&c| (frames.frame(c).title(), frames.frame(c).samples()))
        .collect();
    assert_eq!(kids, vec![("c", 10), ("d", 5)]);
    assert_eq!(frames.total_excluded(), frames.original_total() - 15);

    // `R` brings everything back.
    press(&mut nav, "R");
    assert_eq!(nav.frames().total_excluded(), 0);
    assert_eq!(nav.frames().roots().len(), 2);
}

#[test]
fn inversion_then_hard_focus_answers_who_calls() {
    let mut nav = viewer("main;alloc 3\nworker;alloc 2\nmain;io 1\n", 30, 24);
    press(&mut nav, "I");
    assert!(nav.is_inverted());
    // `main` is still selected, now below its callee.
    assert_eq!(selected_title(&nav), "main");
    press(&mut nav, "k");
    assert_eq!(selected_title(&nav), "alloc");
    press(&mut nav, "F");
    let frames = nav.frames();
    let root = frames.frame(frames.roots()[0]);
    assert_eq!(root.samples(), 5);
    let callers: Vec<_> = root
        .children()
        .iter()
        .map(|&c| frames.frame(c).title())
        .collect();
    assert_eq!(callers, vec!["main", "worker"]);
}

#[test]
fn highlight_cycles_with_n_and_shift_n() {
    let mut nav = viewer("a;lock 4\nb;lock 4\nc;lock 2\n", 30, 24);
    press(&mut nav, "j");
    assert_eq!(selected_title(&nav), "lock");
    let members = nav.highlight().members().to_vec();
    assert_eq!(members.len(), 3);
    for &m in &members[1..] {
        assert_eq!(nav.emphasis(m), Emphasis::Highlighted);
    }

    press(&mut nav, "n");
    assert_eq!(nav.selection(), Some(members[1]));
    press(&mut nav, "NN");
    assert_eq!(nav.selection(), Some(members[2]));
    assert_eq!(nav.highlight().members(), members.as_slice());
}

#[test]
fn focus_pin_and_reset() {
    let mut nav = viewer("main;mid;leaf 6\nmain;other 2\n", 16, 24);
    press(&mut nav, "jj");
    press(&mut nav, "f");
    assert_eq!(selected_title(&nav), "leaf");
    assert_eq!(nav.selected_band().unwrap().width, 16);
    assert_eq!(nav.selected_band().unwrap().y, 2);

    press(&mut nav, "k");
    press(&mut nav, "p");
    assert_eq!(selected_title(&nav), "mid");
    assert_eq!(nav.selected_band().unwrap().y, 0);

    assert_eq!(press(&mut nav, "r"), vec![Dispatch::Redraw]);
    assert_eq!(nav.focus(), None);
    assert_eq!(selected_title(&nav), "mid");
    assert_eq!(press(&mut nav, "r"), vec![Dispatch::Ignored]);
}

#[test]
fn failed_search_changes_nothing() {
    let mut nav = viewer("a;b 1\nc 1\n", 10, 24);
    assert_eq!(press(&mut nav, "/"), vec![Dispatch::PromptSearch]);
    let before = nav.selection();
    assert!(!nav.search("zzz"));
    assert_eq!(nav.selection(), before);
    assert!(nav.search("b"));
    assert_eq!(selected_title(&nav), "b");
}

#[test]
fn tiny_terminal_clips_chart() {
    let nav = viewer("a;b;c;d;e 1\n", 10, 3);
    assert_eq!(nav.split().chart_rows, 2);
    assert_eq!(nav.split().status_rows, 1);
    assert_eq!(nav.bands().len(), 2);
    assert!(nav.bands()[1].truncated);
}

#[test]
fn quit_key() {
    let mut nav = viewer("a 1\n", 10, 24);
    assert_eq!(press(&mut nav, "q"), vec![Dispatch::Quit]);
}
