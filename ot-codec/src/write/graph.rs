//! A graph for resolving table offsets
//!
//! A [`TableData`] tree is flattened into objects, one per distinct
//! subtable, so identical subtables are written once. Packing then looks
//! for an order of the objects in which every offset fits in its field.

use std::cmp::Reverse;
use std::collections::{hash_map::Entry, BinaryHeap, HashMap, VecDeque};

use super::{FieldValue, TableData};
use crate::error::EncodeError;

/// The number of times shared subtables are split before giving up.
const MAX_ROUNDS: usize = 32;

/// An identifier for an object in the graph.
#[derive(Debug, Clone, Copy, PartialOrd, Ord, Hash, PartialEq, Eq)]
struct ObjectId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
enum OffsetLen {
    Offset16 = 2,
    Offset32 = 4,
}

impl OffsetLen {
    /// The maximum value for an offset of this length.
    const fn max_value(self) -> usize {
        match self {
            Self::Offset16 => u16::MAX as usize,
            Self::Offset32 => u32::MAX as usize,
        }
    }
}

/// An offset from one object to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Link {
    /// position of the offset in the parent's bytes
    pos: usize,
    len: OffsetLen,
    object: ObjectId,
    field: &'static str,
}

/// A table's own bytes, with its offsets zeroed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Object {
    name: &'static str,
    bytes: Vec<u8>,
    links: Vec<Link>,
}

/// A record of an offset that does not fit in its field.
#[derive(Debug, Clone, Copy)]
struct Overflow {
    parent: ObjectId,
    /// index into the parent's links
    link: usize,
    offset: usize,
}

/// The objects of a table, and the order they will be written in.
#[derive(Debug)]
pub(crate) struct Graph {
    objects: Vec<Object>,
    root: ObjectId,
    order: Vec<ObjectId>,
    /// position of each object, indexed by id
    positions: Vec<usize>,
}

#[derive(Default)]
struct Flattener {
    objects: Vec<Object>,
    ids: HashMap<Object, ObjectId>,
}

impl Flattener {
    /// Add a table and its subtables, returning the id of the table.
    ///
    /// Children get their ids before their parents, so a parent is only
    /// equal to another if their subtables are too.
    fn add(&mut self, table: &TableData) -> ObjectId {
        let mut bytes = Vec::with_capacity(table.header_size());
        let mut links = Vec::new();
        for field in table.fields() {
            let (len, child) = match &field.value {
                FieldValue::Offset16(Some(child)) => (OffsetLen::Offset16, child),
                FieldValue::Offset32(Some(child)) => (OffsetLen::Offset32, child),
                other => {
                    other.write_scalar(&mut bytes);
                    continue;
                }
            };
            let object = self.add(child);
            links.push(Link {
                pos: bytes.len(),
                len,
                object,
                field: field.name,
            });
            bytes.resize(bytes.len() + len as usize, 0);
        }

        let object = Object {
            name: table.name(),
            bytes,
            links,
        };
        match self.ids.entry(object) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let id = ObjectId(self.objects.len());
                self.objects.push(entry.key().clone());
                *entry.insert(id)
            }
        }
    }
}

impl Graph {
    pub(crate) fn new(table: &TableData) -> Self {
        let mut flattener = Flattener::default();
        let root = flattener.add(table);
        log::trace!(
            "{}: {} distinct objects",
            table.name(),
            flattener.objects.len()
        );
        Graph {
            objects: flattener.objects,
            root,
            order: Vec::new(),
            positions: Vec::new(),
        }
    }

    /// Find an order in which every offset can be resolved.
    ///
    /// The first attempt writes each table's subtables directly after it,
    /// depth first. If that overflows, objects are instead ordered by their
    /// distance from the root, with anything reachable only through 32-bit
    /// offsets written after everything reachable through 16-bit ones.
    /// Shared subtables that are still out of reach are then split, one
    /// copy per overflowing parent, until everything fits.
    pub(crate) fn pack(&mut self) -> Result<(), EncodeError> {
        self.sort_depth_first();
        if self.find_overflows().is_empty() {
            return Ok(());
        }
        log::debug!(
            "{}: depth-first layout overflows, repacking {} objects",
            self.objects[self.root.0].name,
            self.objects.len()
        );

        let mut rounds = 0;
        loop {
            self.sort_shortest_distance();
            let overflows = self.find_overflows();
            let Some(first) = overflows.first() else {
                return Ok(());
            };
            log::trace!("round {rounds}: {} overflows", overflows.len());
            if rounds == MAX_ROUNDS || !self.duplicate_shared_children(&overflows) {
                return Err(self.overflow_error(first));
            }
            rounds += 1;
        }
    }

    /// Write out the packed graph.
    ///
    /// Must only be called after [`Graph::pack`] has succeeded.
    pub(crate) fn serialize(&self) -> Vec<u8> {
        let len = self.objects.iter().map(|obj| obj.bytes.len()).sum();
        let mut out = Vec::with_capacity(len);
        for id in &self.order {
            out.extend_from_slice(&self.objects[id.0].bytes);
        }

        for id in &self.order {
            let start = self.positions[id.0];
            for link in &self.objects[id.0].links {
                // range checked when packing
                let offset = self.positions[link.object.0] - start;
                let at = &mut out[start + link.pos..][..link.len as usize];
                match link.len {
                    OffsetLen::Offset16 => at.copy_from_slice(&(offset as u16).to_be_bytes()),
                    OffsetLen::Offset32 => at.copy_from_slice(&(offset as u32).to_be_bytes()),
                }
            }
        }
        out
    }

    fn in_degrees(&self) -> Vec<usize> {
        let mut result = vec![0; self.objects.len()];
        for link in self.objects.iter().flat_map(|obj| obj.links.iter()) {
            result[link.object.0] += 1;
        }
        result
    }

    /// Topological sort that keeps each subtree together.
    ///
    /// For a tree this is the preorder: a table, then each subtable in
    /// field order. Shared tables follow the last table that uses them.
    fn sort_depth_first(&mut self) {
        let mut in_degree = self.in_degrees();
        let mut stack = vec![self.root];
        self.order.clear();

        while let Some(id) = stack.pop() {
            self.order.push(id);
            for link in self.objects[id.0].links.iter().rev() {
                let remaining = &mut in_degree[link.object.0];
                *remaining -= 1;
                if *remaining == 0 {
                    stack.push(link.object);
                }
            }
        }
        self.update_positions();
    }

    /// Topological sort that prefers objects close to the root.
    fn sort_shortest_distance(&mut self) {
        let spaces = self.assign_spaces();
        let distances = self.distances();
        let mut in_degree = self.in_degrees();
        let mut queue = BinaryHeap::new();
        let mut tie_break = 0usize;
        self.order.clear();

        let root = self.root;
        queue.push(Reverse((spaces[root.0], distances[root.0], tie_break, root)));
        while let Some(Reverse((_, _, _, id))) = queue.pop() {
            self.order.push(id);
            for link in &self.objects[id.0].links {
                let child = link.object;
                in_degree[child.0] -= 1;
                if in_degree[child.0] == 0 {
                    tie_break += 1;
                    queue.push(Reverse((
                        spaces[child.0],
                        distances[child.0],
                        tie_break,
                        child,
                    )));
                }
            }
        }
        self.update_positions();
    }

    /// Group objects into spaces, which are packed in ascending order.
    ///
    /// Space 0 is everything reachable from the root through 16-bit offsets.
    /// Each target of a 32-bit offset that is not already placed starts a
    /// new space, along with whatever it reaches through 16-bit offsets.
    fn assign_spaces(&self) -> Vec<usize> {
        let mut spaces = vec![usize::MAX; self.objects.len()];
        let mut roots = VecDeque::from([self.root]);
        let mut next_space = 0;

        while let Some(root) = roots.pop_front() {
            if spaces[root.0] != usize::MAX {
                continue;
            }
            let space = next_space;
            next_space += 1;
            spaces[root.0] = space;
            let mut queue = VecDeque::from([root]);
            while let Some(id) = queue.pop_front() {
                for link in &self.objects[id.0].links {
                    if spaces[link.object.0] != usize::MAX {
                        continue;
                    }
                    match link.len {
                        OffsetLen::Offset16 => {
                            spaces[link.object.0] = space;
                            queue.push_back(link.object);
                        }
                        OffsetLen::Offset32 => roots.push_back(link.object),
                    }
                }
            }
        }
        spaces
    }

    /// The shortest distance from the root to the end of each object.
    fn distances(&self) -> Vec<usize> {
        let mut distances = vec![usize::MAX; self.objects.len()];
        distances[self.root.0] = 0;
        let mut queue = BinaryHeap::from([Reverse((0, self.root))]);

        while let Some(Reverse((distance, id))) = queue.pop() {
            if distance > distances[id.0] {
                continue;
            }
            for link in &self.objects[id.0].links {
                let child = distance + self.objects[link.object.0].bytes.len();
                if child < distances[link.object.0] {
                    distances[link.object.0] = child;
                    queue.push(Reverse((child, link.object)));
                }
            }
        }
        distances
    }

    fn update_positions(&mut self) {
        self.positions = vec![0; self.objects.len()];
        let mut pos = 0;
        for id in &self.order {
            self.positions[id.0] = pos;
            pos += self.objects[id.0].bytes.len();
        }
    }

    fn find_overflows(&self) -> Vec<Overflow> {
        let mut result = Vec::new();
        for parent in &self.order {
            for (i, link) in self.objects[parent.0].links.iter().enumerate() {
                // children are always placed after their parents
                let offset = self.positions[link.object.0].saturating_sub(self.positions[parent.0]);
                if offset > link.len.max_value() {
                    result.push(Overflow {
                        parent: *parent,
                        link: i,
                        offset,
                    });
                }
            }
        }
        result
    }

    /// Give each overflowing link to a shared object its own copy.
    ///
    /// Returns `false` if no overflowing link points to a shared object.
    fn duplicate_shared_children(&mut self, overflows: &[Overflow]) -> bool {
        let mut in_degree = self.in_degrees();
        let mut changed = false;
        for overflow in overflows {
            let child = self.objects[overflow.parent.0].links[overflow.link].object;
            if in_degree[child.0] < 2 {
                continue;
            }
            let copy = self.objects[child.0].clone();
            for link in &copy.links {
                in_degree[link.object.0] += 1;
            }
            let copy_id = ObjectId(self.objects.len());
            self.objects.push(copy);
            in_degree.push(1);
            in_degree[child.0] -= 1;
            self.objects[overflow.parent.0].links[overflow.link].object = copy_id;
            changed = true;
        }
        if changed {
            log::trace!("split shared objects, now {}", self.objects.len());
        }
        changed
    }

    fn overflow_error(&self, overflow: &Overflow) -> EncodeError {
        let parent = &self.objects[overflow.parent.0];
        EncodeError::OffsetOverflow {
            table: parent.name,
            field: parent.links[overflow.link].field,
            offset: overflow.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::{dump_table, FontWrite, TableWriter};
    use super::*;

    struct Leaf(u16);

    impl FontWrite for Leaf {
        fn write_into(&self, writer: &mut TableWriter) {
            writer.write("value", self.0);
        }
    }

    struct Pair(Leaf, Leaf);

    impl FontWrite for Pair {
        fn write_into(&self, writer: &mut TableWriter) {
            writer.write_offset16("first", Some(&self.0));
            writer.write_offset16("second", Some(&self.1));
        }
    }

    fn read_u16(bytes: &[u8], pos: usize) -> usize {
        u16::from_be_bytes([bytes[pos], bytes[pos + 1]]) as usize
    }

    fn read_u32(bytes: &[u8], pos: usize) -> usize {
        u32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]]) as usize
    }

    #[test]
    fn identical_subtables_are_shared() {
        let bytes = dump_table(&Pair(Leaf(0xaaaa), Leaf(0xaaaa))).unwrap();
        assert_eq!(bytes, vec![0, 4, 0, 4, 0xaa, 0xaa]);

        let bytes = dump_table(&Pair(Leaf(0xaaaa), Leaf(0xbbbb))).unwrap();
        assert_eq!(bytes, vec![0, 4, 0, 6, 0xaa, 0xaa, 0xbb, 0xbb]);
    }

    struct TwoPairs(Pair, Pair);

    impl FontWrite for TwoPairs {
        fn write_into(&self, writer: &mut TableWriter) {
            writer.write_offset16("a", Some(&self.0));
            writer.write_offset16("b", Some(&self.1));
        }
    }

    #[test]
    fn shared_child_follows_last_parent() {
        let table = TwoPairs(Pair(Leaf(1), Leaf(2)), Pair(Leaf(2), Leaf(3)));
        let bytes = dump_table(&table).unwrap();
        assert_eq!(
            bytes,
            vec![
                0, 4, 0, 10, // root
                0, 4, 0, 10, // first pair
                0, 1, //
                0, 4, 0, 6, // second pair
                0, 2, // shared
                0, 3,
            ]
        );
    }

    struct Blob(Vec<u8>);

    impl FontWrite for Blob {
        fn write_into(&self, writer: &mut TableWriter) {
            writer.write_bytes("data", &self.0);
        }
    }

    struct Payload {
        fill: u8,
    }

    impl FontWrite for Payload {
        fn write_into(&self, writer: &mut TableWriter) {
            writer.write_offset16("leaf", Some(&Blob(vec![self.fill; 4])));
            writer.write_bytes("data", &vec![self.fill; 30_000]);
        }
    }

    struct Ext(Payload);

    impl FontWrite for Ext {
        fn write_into(&self, writer: &mut TableWriter) {
            writer.write("format", 1u16);
            writer.write_offset32("payload", Some(&self.0));
        }
    }

    struct ExtList(Vec<Ext>);

    impl FontWrite for ExtList {
        fn write_into(&self, writer: &mut TableWriter) {
            writer.write_offset16_list("count", "exts", &self.0);
        }
    }

    #[test]
    fn long_offset_subgraphs_are_packed_last() {
        let list = ExtList((1..=4).map(|fill| Ext(Payload { fill })).collect());
        let bytes = dump_table(&list).unwrap();
        assert_eq!(bytes.len(), 10 + 4 * 6 + 4 * (30_002 + 4));

        for (i, fill) in (1..=4u8).enumerate() {
            let ext = read_u16(&bytes, 2 + 2 * i);
            assert!(ext < 34, "ext {i} at {ext}");
            assert_eq!(read_u16(&bytes, ext), 1);
            let payload = ext + read_u32(&bytes, ext + 2);
            assert_eq!(bytes[payload + 2], fill);
            let leaf = payload + read_u16(&bytes, payload);
            assert_eq!(&bytes[leaf..leaf + 4], &[fill; 4]);
        }
    }

    struct Holder(u8);

    impl FontWrite for Holder {
        fn write_into(&self, writer: &mut TableWriter) {
            writer.write_offset16("child", Some(&Leaf(0xcccc)));
            writer.write_bytes("pad", &[self.0; 8]);
        }
    }

    struct Spread;

    impl FontWrite for Spread {
        fn write_into(&self, writer: &mut TableWriter) {
            writer.write_offset16("near", Some(&Holder(1)));
            writer.write_offset32("filler", Some(&Blob(vec![0; 70_000])));
            writer.write_offset32("far", Some(&Holder(2)));
        }
    }

    #[test]
    fn shared_subtable_is_split_when_out_of_reach() {
        let bytes = dump_table(&Spread).unwrap();
        // one extra copy of the shared leaf
        assert_eq!(bytes.len(), 10 + 10 + 2 + 70_000 + 10 + 2);

        let near = read_u16(&bytes, 0);
        let near_child = near + read_u16(&bytes, near);
        assert_eq!(read_u16(&bytes, near_child), 0xcccc);

        let far = read_u32(&bytes, 6);
        let far_child = far + read_u16(&bytes, far);
        assert_eq!(read_u16(&bytes, far_child), 0xcccc);
        assert_ne!(near_child, far_child);
    }

    #[test]
    fn overflow_names_the_field() {
        let table = Pair(Leaf(1), Leaf(2));
        let mut data = TableWriter::write_table(&table, "Pair").unwrap();
        data.push("tail", FieldValue::Bytes(vec![0; 0x10000]));
        let mut graph = Graph::new(&data);
        assert_eq!(
            graph.pack().unwrap_err(),
            EncodeError::OffsetOverflow {
                table: "Pair",
                field: "first",
                offset: 0x10004,
            }
        );
    }
}
