#[derive(Clone, Debug, PartialEq)]
struct Entry {
    key: i64,
    value: i64,
}

impl Entry {
    fn new(key: i64, value: i64) -> Entry {
        Entry { key, value }
    }

    fn key(key: i64) -> Entry {
        Entry { key, value: 0 }
    }
}

impl Item for Entry {
    fn less(&self, other: &Self) -> bool {
        self.key < other.key
    }
}

struct RefNodes {
    entries: Vec<Option<i64>>,
}

impl RefNodes {
    fn new(capacity: usize) -> RefNodes {
        RefNodes {
            entries: vec![None; capacity],
        }
    }

    fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    fn get(&self, key: i64) -> Option<Entry> {
        self.entries[key as usize].map(|value| Entry::new(key, value))
    }

    fn create(&mut self, key: i64, value: i64) -> bool {
        let entry = &mut self.entries[key as usize];
        if entry.is_some() {
            false
        } else {
            *entry = Some(value);
            true
        }
    }

    fn upsert(&mut self, key: i64, value: i64) -> Option<Entry> {
        let old_value = self.entries[key as usize].replace(value);
        old_value.map(|value| Entry::new(key, value))
    }

    fn delete(&mut self, key: i64) -> Option<Entry> {
        let old_value = self.entries[key as usize].take();
        old_value.map(|value| Entry::new(key, value))
    }

    fn iter(&self) -> std::vec::IntoIter<Entry> {
        self.range(Bound::Unbounded, Bound::Unbounded)
    }

    fn range(&self, low: Bound<i64>, high: Bound<i64>) -> std::vec::IntoIter<Entry> {
        let low = match low {
            Bound::Included(low) => low,
            Bound::Excluded(low) => low + 1,
            Bound::Unbounded => 0,
        };
        let high = match high {
            Bound::Included(high) => high + 1,
            Bound::Excluded(high) => high,
            Bound::Unbounded => self.entries.len() as i64,
        };
        (low.max(0)..high.min(self.entries.len() as i64))
            .filter_map(|key| self.get(key))
            .collect::<Vec<Entry>>()
            .into_iter()
    }
}

fn random_low_high(size: usize) -> (Bound<i64>, Bound<i64>) {
    let size = size as u64;
    let low = (random::<u64>() % size) as i64;
    let high = (random::<u64>() % size) as i64;
    let low = match random::<u8>() % 3 {
        0 => Bound::Included(low),
        1 => Bound::Excluded(low),
        _ => Bound::Unbounded,
    };
    let high = match random::<u8>() % 3 {
        0 => Bound::Included(high),
        1 => Bound::Excluded(high),
        _ => Bound::Unbounded,
    };
    (low, high)
}

fn to_entry_bound(bound: Bound<i64>) -> Bound<Entry> {
    match bound {
        Bound::Included(key) => Bound::Included(Entry::key(key)),
        Bound::Excluded(key) => Bound::Excluded(Entry::key(key)),
        Bound::Unbounded => Bound::Unbounded,
    }
}
