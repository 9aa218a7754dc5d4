use kinship_core::{Connection, Person, RelationshipType};
use kinship_project::FamilyProject;
use tempfile::TempDir;

/// A family `depth` generations deep where every couple has `fanout` children.
///
/// Each person past the first generation gets a partner, every child links to
/// both parents and siblings are linked pairwise to the next-born.
pub fn generate_family(depth: usize, fanout: usize) -> (Vec<Person>, Vec<Connection>) {
    let mut persons = Vec::new();
    let mut connections = Vec::new();
    let mut next_edge = 0usize;
    let mut edge = |from: &str, to: &str, kind: RelationshipType| {
        next_edge += 1;
        Connection::new(format!("e{next_edge}"), from, to, kind)
    };

    persons.push(Person::new("root", "Root"));
    persons.push(Person::new("root_partner", "Root Partner"));
    connections.push(edge("root", "root_partner", RelationshipType::Partner));
    let mut couples = vec![("root".to_string(), "root_partner".to_string())];

    for generation in 1..depth {
        let mut next_couples = Vec::new();
        for (couple, (a, b)) in couples.iter().enumerate() {
            let mut previous: Option<String> = None;
            for child in 0..fanout {
                let id = format!("g{generation}_c{couple}_{child}");
                persons.push(Person::new(id.as_str(), format!("Person {id}")));
                connections.push(edge(a, &id, RelationshipType::Parent));
                connections.push(edge(b, &id, RelationshipType::Parent));
                if let Some(prev) = &previous {
                    connections.push(edge(prev, &id, RelationshipType::Sibling));
                }

                let partner = format!("{id}_p");
                persons.push(Person::new(partner.as_str(), format!("Partner of {id}")));
                connections.push(edge(&id, &partner, RelationshipType::Partner));
                next_couples.push((id.clone(), partner));
                previous = Some(id);
            }
        }
        couples = next_couples;
    }

    (persons, connections)
}

/// Writes a generated family to a family file in a fresh temp dir.
pub fn write_family_project(depth: usize, fanout: usize) -> anyhow::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let (persons, connections) = generate_family(depth, fanout);
    let mut project = FamilyProject::open(temp_dir.path())?;
    project.file.people = persons;
    project.file.connections = connections;
    project.save()?;
    Ok(temp_dir)
}
