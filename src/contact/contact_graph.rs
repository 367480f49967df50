use crate::contact::{Contact, ContactFixture};
use crate::utils::SortedPair;
use hashbrown::HashMap;
use slab::Slab;

/// Handle of a contact stored in a [`ContactGraph`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContactHandle(usize);

impl ContactHandle {
    /// The index of the contact in the graph arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// An edge of the contact graph, as seen from one of the two bodies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ContactEdge {
    /// The contact.
    pub contact: ContactHandle,
    /// The other body attached to the contact.
    pub other: usize,
}

/// Identifies one child of one fixture.
type FixtureKey = (usize, usize);

fn fixture_key(fixture: &ContactFixture) -> FixtureKey {
    (fixture.id, fixture.child)
}

/// The contact graph: bodies are nodes and contacts are edges.
///
/// Contacts live in an arena and are named by handles. Each body keeps the list of its
/// edges, and contacts can be looked up by their pair of fixture children.
#[derive(Clone, Debug, Default)]
pub struct ContactGraph {
    contacts: Slab<Contact>,
    body_edges: Vec<Vec<ContactEdge>>,
    pairs: HashMap<SortedPair<FixtureKey>, ContactHandle>,
}

impl ContactGraph {
    /// An empty contact graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of contacts.
    #[inline]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Does this graph contain no contact?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Inserts a contact and connects it to its two bodies.
    ///
    /// Panics if a contact between the same fixture children already exists.
    pub fn insert(&mut self, contact: Contact) -> ContactHandle {
        let key = SortedPair::new(
            fixture_key(contact.fixture_a()),
            fixture_key(contact.fixture_b()),
        );
        assert!(
            !self.pairs.contains_key(&key),
            "a contact already exists between these fixtures"
        );

        let body_a = contact.fixture_a().body;
        let body_b = contact.fixture_b().body;
        let handle = ContactHandle(self.contacts.insert(contact));

        let needed = body_a.max(body_b) + 1;
        if self.body_edges.len() < needed {
            self.body_edges.resize_with(needed, Vec::new);
        }

        self.body_edges[body_a].push(ContactEdge {
            contact: handle,
            other: body_b,
        });
        self.body_edges[body_b].push(ContactEdge {
            contact: handle,
            other: body_a,
        });
        let _ = self.pairs.insert(key, handle);

        handle
    }

    /// Removes a contact and disconnects it from its bodies.
    ///
    /// Returns `None` if the handle does not name a contact of this graph.
    pub fn remove(&mut self, handle: ContactHandle) -> Option<Contact> {
        let contact = self.contacts.try_remove(handle.0)?;

        for body in [contact.fixture_a().body, contact.fixture_b().body] {
            let edges = &mut self.body_edges[body];
            if let Some(pos) = edges.iter().position(|edge| edge.contact == handle) {
                let _ = edges.swap_remove(pos);
            }
        }

        let key = SortedPair::new(
            fixture_key(contact.fixture_a()),
            fixture_key(contact.fixture_b()),
        );
        let _ = self.pairs.remove(&key);

        Some(contact)
    }

    /// The contact named by `handle`.
    #[inline]
    pub fn get(&self, handle: ContactHandle) -> Option<&Contact> {
        self.contacts.get(handle.0)
    }

    /// The contact named by `handle`, mutably.
    #[inline]
    pub fn get_mut(&mut self, handle: ContactHandle) -> Option<&mut Contact> {
        self.contacts.get_mut(handle.0)
    }

    /// Finds the contact between two fixture children, in any order.
    pub fn find(&self, fixture_a: &ContactFixture, fixture_b: &ContactFixture) -> Option<ContactHandle> {
        let key = SortedPair::new(fixture_key(fixture_a), fixture_key(fixture_b));
        self.pairs.get(&key).copied()
    }

    /// The edges attached to `body`.
    pub fn body_edges(&self, body: usize) -> &[ContactEdge] {
        self.body_edges.get(body).map(|e| &e[..]).unwrap_or(&[])
    }

    /// Iterates through the contacts attached to `body`.
    pub fn contacts_with(&self, body: usize) -> impl Iterator<Item = (ContactHandle, &Contact)> {
        self.body_edges(body)
            .iter()
            .map(move |edge| (edge.contact, &self.contacts[edge.contact.0]))
    }

    /// Iterates through all the contacts.
    pub fn iter(&self) -> impl Iterator<Item = (ContactHandle, &Contact)> {
        self.contacts
            .iter()
            .map(|(id, contact)| (ContactHandle(id), contact))
    }

    /// Iterates mutably through all the contacts.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ContactHandle, &mut Contact)> {
        self.contacts
            .iter_mut()
            .map(|(id, contact)| (ContactHandle(id), contact))
    }

    /// Removes every contact attached to `body`, returning them.
    pub fn remove_body_contacts(&mut self, body: usize) -> Vec<Contact> {
        let handles: Vec<_> = self.body_edges(body).iter().map(|e| e.contact).collect();
        handles
            .into_iter()
            .filter_map(|handle| self.remove(handle))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::ContactGraph;
    use crate::contact::{Contact, ContactDispatcher, ContactFixture, Manifold};
    use crate::math::{Isometry, Real};
    use crate::shape::{Ball, Shape, ShapeType};

    fn nothing(
        _: &mut Manifold,
        _: &Shape,
        _: &Isometry<Real>,
        _: usize,
        _: &Shape,
        _: &Isometry<Real>,
        _: usize,
    ) {
    }

    fn contact(fixture_a: usize, body_a: usize, fixture_b: usize, body_b: usize) -> Contact {
        let mut dispatcher = ContactDispatcher::new();
        let _ = dispatcher.register(ShapeType::Ball, ShapeType::Ball, nothing);
        let ball: Shape = Ball::new(1.0).into();
        Contact::new(
            &dispatcher,
            ContactFixture::new(fixture_a, body_a, 0, 0.5, 0.0),
            &ball,
            ContactFixture::new(fixture_b, body_b, 0, 0.5, 0.0),
            &ball,
        )
        .unwrap()
    }

    #[test]
    fn insert_find_and_remove() {
        let mut graph = ContactGraph::new();
        let c01 = graph.insert(contact(10, 0, 11, 1));
        let c12 = graph.insert(contact(11, 1, 12, 2));
        let c02 = graph.insert(contact(10, 0, 12, 2));
        assert_eq!(graph.len(), 3);

        let f10 = ContactFixture::new(10, 0, 0, 0.5, 0.0);
        let f12 = ContactFixture::new(12, 2, 0, 0.5, 0.0);
        assert_eq!(graph.find(&f12, &f10), Some(c02));

        let mut others: Vec<_> = graph.body_edges(1).iter().map(|e| e.other).collect();
        others.sort();
        assert_eq!(others, vec![0, 2]);
        assert_eq!(graph.contacts_with(2).count(), 2);

        assert!(graph.remove(c01).is_some());
        assert!(graph.remove(c01).is_none());
        assert!(graph.get(c01).is_none());
        assert_eq!(graph.body_edges(0).len(), 1);
        assert_eq!(graph.body_edges(1)[0].contact, c12);

        let removed = graph.remove_body_contacts(2);
        assert_eq!(removed.len(), 2);
        assert!(graph.is_empty());
        assert!(graph.body_edges(7).is_empty());
    }

    #[test]
    #[should_panic]
    fn duplicate_pairs_are_rejected() {
        let mut graph = ContactGraph::new();
        let _ = graph.insert(contact(1, 0, 2, 1));
        let _ = graph.insert(contact(2, 1, 1, 0));
    }
}
