//! Black-box checks of the dataset contract

use quadforest_core::{Quad, QuadPattern, Term};
use quadforest_dataset::{CachedDataset, Dataset, IsolatedForestDataset};

fn ex(local: &str) -> Term {
    Term::named_node(format!("http://example.org/{local}"))
}

fn quad_in(s: &str, p: &str, o: &str, g: Term) -> Quad<Term> {
    Quad::new(ex(s), ex(p), ex(o), g)
}

fn quad(s: &str, p: &str, o: &str) -> Quad<Term> {
    quad_in(s, p, o, Term::default_graph())
}

#[test]
fn shared_subject_quads_match_by_position() {
    // Two quads sharing a subject and predicate, differing in object.
    let mut ds: CachedDataset = CachedDataset::new();
    ds.add(&quad("s", "p", "o1")).add(&quad("s", "p", "o2"));

    assert_eq!(ds.size(), 2);
    assert_eq!(
        ds.match_pattern(&QuadPattern::new(Some(ex("s")), None, None, None))
            .size(),
        2
    );
    assert_eq!(
        ds.match_pattern(&QuadPattern::new(None, None, Some(ex("o2")), None))
            .size(),
        1
    );
}

#[test]
fn delete_matches_by_predicate_empties_the_dataset() {
    let mut ds: CachedDataset = CachedDataset::new();
    for o in ["o1", "o2", "o3", "o4"] {
        ds.add(&quad("s", "p", o));
    }
    assert_eq!(ds.size(), 4);

    ds.delete_matches(&QuadPattern::new(None, Some(ex("p")), None, None));
    assert_eq!(ds.size(), 0);
}

#[test]
fn default_graph_deletion_leaves_named_graphs_alone() {
    let mut ds: CachedDataset = CachedDataset::new();
    ds.add(&quad("s", "p", "o"));
    ds.add(&quad_in("s", "p", "o", ex("g")));
    assert_eq!(ds.size(), 2);

    ds.delete_matches(&QuadPattern::new(
        None,
        None,
        None,
        Some(Term::default_graph()),
    ));
    assert_eq!(ds.size(), 1);
    assert!(ds.has(&quad_in("s", "p", "o", ex("g"))));
    assert!(!ds.has(&quad("s", "p", "o")));
}

#[test]
fn every_added_quad_round_trips_exactly_once() {
    let mut ds: CachedDataset = CachedDataset::new();
    let quads = vec![quad("a", "p", "x"), quad("b", "p", "y"), quad("c", "q", "z")];
    for q in &quads {
        ds.add(q);
    }

    for q in &quads {
        assert!(ds.has(q));
        let seen = ds
            .to_array()
            .unwrap()
            .iter()
            .filter(|candidate| *candidate == q)
            .count();
        assert_eq!(seen, 1);
    }
}

#[test]
fn count_quads_agrees_with_match_size() {
    let mut ds: CachedDataset = CachedDataset::new();
    ds.add(&quad("a", "p", "x"))
        .add(&quad("a", "p", "y"))
        .add(&quad("b", "q", "x"))
        .add(&quad_in("a", "p", "x", ex("g")));

    let patterns = vec![
        QuadPattern::any(),
        QuadPattern::new(Some(ex("a")), None, None, None),
        QuadPattern::new(None, Some(ex("p")), None, None),
        QuadPattern::new(None, None, Some(ex("x")), None),
        QuadPattern::new(None, None, None, Some(ex("g"))),
        QuadPattern::new(Some(ex("a")), Some(ex("p")), Some(ex("x")), None),
        QuadPattern::new(Some(ex("nobody")), None, None, None),
    ];
    for pattern in patterns {
        assert_eq!(
            ds.count_quads(&pattern),
            ds.match_pattern(&pattern).size(),
            "{:?}",
            pattern
        );
    }
}

#[test]
fn filter_agrees_with_filtering_the_array() {
    let mut ds: CachedDataset = CachedDataset::new();
    ds.add(&quad("a", "p", "x"))
        .add(&quad("b", "p", "y"))
        .add(&quad("c", "q", "z"));

    let pred = |q: &Quad<Term>| q.predicate == ex("p");
    let filtered = ds.filter(pred).unwrap();

    let mut expected: Vec<_> = ds.to_array().unwrap().into_iter().filter(pred).collect();
    let mut got = filtered.to_array().unwrap();
    let key = |q: &Quad<Term>| format!("{q}");
    expected.sort_by_key(key);
    got.sort_by_key(key);
    assert_eq!(got, expected);
}

#[test]
fn isolated_forest_variant_detaches_derived_results() {
    let mut parent: IsolatedForestDataset = IsolatedForestDataset::new();
    parent
        .add(&quad("a", "p", "1"))
        .add(&quad("a", "p", "2"))
        .add(&quad("b", "q", "3"));

    let mut derived = parent.match_pattern(&QuadPattern::new(Some(ex("a")), None, None, None));
    assert_eq!(derived.size(), 2);
    assert!(!parent.same_interner(&derived));

    // The derived facade keeps answering after the parent is gone.
    drop(parent);
    assert!(derived.has(&quad("a", "p", "1")));
    assert_eq!(derived.to_quads().unwrap().len(), 2);
}

#[test]
fn trait_object_shape_covers_the_contract() {
    fn drive<D: Dataset<Term = Term>>(ds: &mut D) {
        ds.add(&quad("s", "p", "o"));
        assert_eq!(ds.size(), 1);
        assert!(ds.has(&quad("s", "p", "o")));

        let derived = ds.match_pattern(&QuadPattern::any());
        assert_eq!(derived.size(), 1);

        ds.delete(&quad("s", "p", "o"));
        assert_eq!(ds.to_quads().unwrap().len(), 0);
    }

    drive::<CachedDataset>(&mut CachedDataset::new());
    drive::<IsolatedForestDataset>(&mut IsolatedForestDataset::new());
}

#[test]
fn ensure_index_for_is_an_observable_noop() {
    let mut ds: CachedDataset = CachedDataset::new();
    ds.add(&quad("a", "p", "x")).add(&quad("b", "p", "y"));

    ds.ensure_index_for(false, true, false, false);
    assert_eq!(
        ds.match_pattern(&QuadPattern::new(None, Some(ex("p")), None, None))
            .size(),
        2
    );
    assert_eq!(ds.size(), 2);
}
