use kinship_core::{
    Connection, ConnectionDraft, DirectedConnection, Direction, Person, PersonId,
    RelationshipType,
};
use kinship_graph::{
    Canvas, FamilyLayouter, LayoutKind, LayoutSettings, build_hierarchy, calculate_generations,
    connection_exists, describe_for_viewpoint, generation_layers, layouter_for, prepare_write,
};

fn person(id: &str, name: &str) -> Person {
    Person::new(id, name)
}

/// Three generations plus a donor, a partnership and a sibling pair.
fn family() -> (Vec<Person>, Vec<Connection>) {
    let persons = vec![
        person("gran", "Grandparent"),
        person("p1", "Parent1"),
        person("p2", "Parent2"),
        person("c1", "Child1"),
        person("c2", "Child2"),
        person("c3", "Child3"),
        person("gc", "Grandchild"),
        person("donor", "Donor"),
    ];
    let connections = vec![
        Connection::new("e1", "gran", "p1", RelationshipType::Parent),
        Connection::new("e2", "p1", "p2", RelationshipType::Partner),
        Connection::new("e3", "p1", "c1", RelationshipType::Parent),
        Connection::new("e4", "p1", "c2", RelationshipType::Parent),
        Connection::new("e5", "p2", "c3", RelationshipType::Parent),
        Connection::new("e6", "c1", "c2", RelationshipType::Sibling),
        Connection::new("e7", "donor", "c1", RelationshipType::Donor),
        Connection::new("e8", "c1", "gc", RelationshipType::Parent),
    ];
    (persons, connections)
}

#[test]
fn test_generations_for_reference_family() {
    let (persons, connections) = family();
    let generations = calculate_generations(&persons, &connections);
    let level = |id: &str| generations[&PersonId::from(id)].generation;

    assert_eq!(level("gran"), 0);
    assert_eq!(level("p1"), 1);
    assert_eq!(level("p2"), 0);
    assert_eq!(level("c1"), 2);
    assert_eq!(level("c2"), 2);
    assert_eq!(level("c3"), 1);
    assert_eq!(level("gc"), 3);
    assert_eq!(level("donor"), 0);

    let layers = generation_layers(&persons, &generations);
    let depths: Vec<i32> = layers.iter().map(|(g, _)| *g).collect();
    assert_eq!(depths, vec![0, 1, 2, 3]);
    assert_eq!(layers[0].1.len(), 3);
}

#[test]
fn test_hierarchy_contains_everyone_once() {
    let (persons, connections) = family();
    let tree = build_hierarchy(&persons, &connections).unwrap();
    assert_eq!(tree.person.id.as_str(), "gran");
    assert_eq!(tree.flatten().len(), persons.len());
    assert_eq!(tree.descendant_count(), persons.len() - 1);
}

#[test]
fn test_incoming_view_of_stored_parent_edge() {
    let (persons, connections) = family();
    let child = persons.iter().find(|p| p.id.as_str() == "c1").unwrap();
    let edge = connections.iter().find(|c| c.id.as_str() == "e3").unwrap();

    let label = describe_for_viewpoint(
        child,
        &DirectedConnection::new(edge.clone(), Direction::Incoming),
        &persons,
    );
    assert_eq!(label.label, "Child");
    assert_eq!(label.description, "Child1 is Parent1's child");
}

#[test]
fn test_write_path_rejects_reversed_duplicate() {
    let (_, connections) = family();
    let draft = ConnectionDraft::new("p2", "p1", "partner");
    let candidate = prepare_write(&draft).unwrap();
    assert!(connection_exists(&connections, &candidate));

    let fresh = prepare_write(&ConnectionDraft::new("c2", "c3", "sibling")).unwrap();
    assert!(!connection_exists(&connections, &fresh));
}

#[test]
fn test_every_engine_handles_empty_and_single() {
    let settings = LayoutSettings::default();
    let canvas = Canvas::new(900.0, 700.0);
    for kind in LayoutKind::ALL {
        let layouter = layouter_for(kind, &settings);
        assert!(layouter.layout(&[], &[], canvas).is_empty(), "{kind}");

        let solo = vec![person("solo", "Solo")];
        let layout = layouter.layout(&solo, &[], canvas);
        assert_eq!(layout.nodes.len(), 1, "{kind}");
        assert_eq!(layout.nodes[0].position, canvas.center(), "{kind}");
    }
}

#[test]
fn test_every_engine_is_idempotent_and_complete() {
    let (persons, connections) = family();
    let settings = LayoutSettings::default();
    let canvas = Canvas::default();
    for kind in LayoutKind::ALL {
        let layouter = layouter_for(kind, &settings);
        let first = layouter.layout(&persons, &connections, canvas);
        let second = layouter.layout(&persons, &connections, canvas);
        assert_eq!(first, second, "{kind}");
        assert_eq!(first.nodes.len(), persons.len(), "{kind}");
        assert_eq!(first.links.len(), connections.len(), "{kind}");
        for node in &first.nodes {
            assert!(node.position.x.is_finite() && node.position.y.is_finite());
        }
    }
}

#[test]
fn test_cyclic_input_lays_out_with_every_engine() {
    let persons = vec![person("a", "A"), person("b", "B"), person("c", "C")];
    let connections = vec![
        Connection::new("e1", "a", "b", RelationshipType::Parent),
        Connection::new("e2", "b", "c", RelationshipType::Parent),
        Connection::new("e3", "c", "a", RelationshipType::Parent),
    ];
    let settings = LayoutSettings::default();
    for kind in LayoutKind::ALL {
        let layout = layouter_for(kind, &settings).layout(&persons, &connections, Canvas::default());
        assert_eq!(layout.nodes.len(), 3, "{kind}");
    }
}
